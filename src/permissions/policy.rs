use crate::models::{Basket, BasketId, BasketLine, User, UserId, WishList, WishListLine};

/// The kind of identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// A session without a logged-in user
    Anonymous,
    User(UserId),
}

/// The identity making the current request.
///
/// A request with no resolvable identity at all is represented by the absence
/// of a `Requester` (`Option<&Requester>` is `None`), not by a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    identity: Identity,
    is_privileged: bool,
}

impl Requester {
    pub fn anonymous() -> Self {
        Self {
            identity: Identity::Anonymous,
            is_privileged: false,
        }
    }

    pub fn user(id: UserId, is_privileged: bool) -> Self {
        Self {
            identity: Identity::User(id),
            is_privileged,
        }
    }

    pub fn from_user(user: &User) -> Self {
        Self::user(user.id, user.is_staff)
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self.identity {
            Identity::User(id) => Some(id),
            Identity::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id().is_some()
    }

    pub fn is_privileged(&self) -> bool {
        self.is_privileged
    }
}

/// The baskets bound to the current request's session.
///
/// Built by the session layer before any decision is taken and passed
/// explicitly to every basket-scoped check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    baskets: Vec<BasketId>,
}

impl SessionContext {
    /// A context with no bound basket.
    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn bound_to(baskets: impl IntoIterator<Item = BasketId>) -> Self {
        let mut baskets: Vec<BasketId> = baskets.into_iter().collect();
        baskets.sort_unstable();
        baskets.dedup();
        Self { baskets }
    }

    pub fn contains_basket(&self, basket: BasketId) -> bool {
        self.baskets.binary_search(&basket).is_ok()
    }

    pub fn contains_line(&self, line: &BasketLine) -> bool {
        self.contains_basket(line.basket)
    }

    pub fn baskets(&self) -> &[BasketId] {
        &self.baskets
    }
}

/// Who a resource belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Owned by a user account
    User(UserId),
    /// Owned by whichever session the basket is bound to
    Session(BasketId),
}

/// Capability of resources that have exactly one owner.
pub trait Owned {
    fn owner(&self) -> Owner;
}

impl Owned for Basket {
    fn owner(&self) -> Owner {
        Owner::Session(self.id)
    }
}

impl Owned for BasketLine {
    fn owner(&self) -> Owner {
        Owner::Session(self.basket)
    }
}

impl Owned for WishList {
    fn owner(&self) -> Owner {
        Owner::User(self.owner)
    }
}

/// A wishlist line resolved together with its parent wishlist.
#[derive(Debug, Clone, Copy)]
pub struct ParentedWishListLine<'a> {
    pub line: &'a WishListLine,
    pub wishlist: &'a WishList,
}

impl<'a> ParentedWishListLine<'a> {
    /// `None` when `wishlist` is not the line's parent.
    pub fn new(line: &'a WishListLine, wishlist: &'a WishList) -> Option<Self> {
        (line.wishlist == wishlist.id).then_some(Self { line, wishlist })
    }
}

impl Owned for ParentedWishListLine<'_> {
    fn owner(&self) -> Owner {
        self.wishlist.owner()
    }
}

/// Object-level decision shared by every owned resource: privileged
/// requesters always pass, everyone else must own the resource.
pub fn may_access<O: Owned + ?Sized>(
    requester: &Requester,
    resource: &O,
    session: &SessionContext,
) -> bool {
    if requester.is_privileged() {
        return true;
    }
    match resource.owner() {
        Owner::User(owner) => requester.user_id() == Some(owner),
        Owner::Session(basket) => session.contains_basket(basket),
    }
}

/// True for anonymous and authenticated sessions alike; false only when no
/// identity could be resolved.
pub fn can_access_as_user(requester: Option<&Requester>) -> bool {
    requester.is_some()
}

pub fn can_access_basket(requester: &Requester, basket: &Basket, session: &SessionContext) -> bool {
    may_access(requester, basket, session)
}

pub fn can_access_basket_line(
    requester: &Requester,
    line: &BasketLine,
    session: &SessionContext,
) -> bool {
    may_access(requester, line, session)
}

pub fn can_access_wishlist(requester: &Requester, wishlist: &WishList) -> bool {
    may_access(requester, wishlist, &SessionContext::unbound())
}

pub fn can_access_wishlist_line(
    requester: &Requester,
    line: &WishListLine,
    wishlist: &WishList,
) -> bool {
    if requester.is_privileged() {
        return true;
    }
    ParentedWishListLine::new(line, wishlist)
        .map(|parented| may_access(requester, &parented, &SessionContext::unbound()))
        .unwrap_or(false)
}
