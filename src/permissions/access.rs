use super::policy::{can_access_as_user, Requester};
use crate::error::{StorefrontError, StorefrontResult};

/// Endpoint-level requirement, checked before any object is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    AllowAny,
    /// Any resolvable identity, anonymous sessions included
    HasUser,
    /// A logged-in user
    IsAuthenticated,
    /// Staff only
    IsAdminUser,
}

impl Access {
    pub fn permits(self, requester: Option<&Requester>) -> bool {
        match self {
            Access::AllowAny => true,
            Access::HasUser => can_access_as_user(requester),
            Access::IsAuthenticated => requester.is_some_and(Requester::is_authenticated),
            Access::IsAdminUser => requester.is_some_and(Requester::is_privileged),
        }
    }

    /// Like [`Access::permits`], but explains a refusal. Requests without a
    /// logged-in user get 401; logged-in users lacking privileges get 403.
    pub fn check(self, requester: Option<&Requester>) -> StorefrontResult<()> {
        if self.permits(requester) {
            return Ok(());
        }
        match requester {
            Some(r) if r.is_authenticated() => Err(StorefrontError::PermissionDenied(
                "You do not have permission to perform this action.".to_string(),
            )),
            _ => Err(StorefrontError::NotAuthenticated(
                "Authentication credentials were not provided.".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_against_each_identity() {
        let anon = Requester::anonymous();
        let user = Requester::user(1, false);
        let staff = Requester::user(2, true);

        let cases = [
            (Access::AllowAny, [true, true, true, true]),
            (Access::HasUser, [false, true, true, true]),
            (Access::IsAuthenticated, [false, false, true, true]),
            (Access::IsAdminUser, [false, false, false, true]),
        ];
        for (access, expected) in cases {
            let got = [
                access.permits(None),
                access.permits(Some(&anon)),
                access.permits(Some(&user)),
                access.permits(Some(&staff)),
            ];
            assert_eq!(got, expected, "{:?}", access);
        }
    }

    #[test]
    fn refusal_status_depends_on_login() {
        let user = Requester::user(1, false);
        assert!(matches!(
            Access::IsAdminUser.check(Some(&user)),
            Err(StorefrontError::PermissionDenied(_))
        ));
        assert!(matches!(
            Access::IsAdminUser.check(Some(&Requester::anonymous())),
            Err(StorefrontError::NotAuthenticated(_))
        ));
        assert!(matches!(
            Access::HasUser.check(None),
            Err(StorefrontError::NotAuthenticated(_))
        ));
    }
}
