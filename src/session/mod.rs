//! Session resolution.
//!
//! Clients identify their session with a `Session-Id` header of the form
//! `SID:<ANON|AUTH>:<realm>:<id>`. The header is never stored as is: the
//! storage key is a SHA-256 digest of the uri salted with the server secret.

pub mod credentials;

use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{BasketId, User, UserId};
use crate::permissions::Requester;
use crate::store::{Entity, Store};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Anon,
    Auth,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Anon => "ANON",
            SessionKind::Auth => "AUTH",
        }
    }
}

/// Parsed `Session-Id` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUri {
    pub kind: SessionKind,
    pub realm: String,
    pub session_id: String,
}

impl FromStr for SessionUri {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StorefrontError::Validation(format!("Invalid session uri '{}'", s));
        let mut parts = s.trim().splitn(4, ':');
        if parts.next() != Some("SID") {
            return Err(invalid());
        }
        let kind = match parts.next() {
            Some("ANON") => SessionKind::Anon,
            Some("AUTH") => SessionKind::Auth,
            _ => return Err(invalid()),
        };
        let realm = parts.next().filter(|r| !r.is_empty()).ok_or_else(invalid)?;
        let session_id = parts.next().filter(|i| !i.is_empty()).ok_or_else(invalid)?;
        Ok(Self {
            kind,
            realm: realm.to_string(),
            session_id: session_id.to_string(),
        })
    }
}

impl fmt::Display for SessionUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SID:{}:{}:{}", self.kind.as_str(), self.realm, self.session_id)
    }
}

impl SessionUri {
    /// The same session promoted to an authenticated one.
    pub fn upgraded(&self) -> Self {
        Self {
            kind: SessionKind::Auth,
            ..self.clone()
        }
    }

    pub fn storage_key(&self, secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_string().as_bytes());
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Server-side state of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub key: String,
    #[serde(default)]
    pub user: Option<UserId>,
    /// Basket of an anonymous session
    #[serde(default)]
    pub basket: Option<BasketId>,
    pub created_at: DateTime<Utc>,
}

impl Entity for SessionRecord {
    type Id = String;
    const TREE: &'static str = "sessions";
    const KIND: &'static str = "session";

    fn id(&self) -> String {
        self.key.clone()
    }

    fn set_id(&mut self, id: String) {
        self.key = id;
    }
}

impl SessionRecord {
    fn new(key: String, user: Option<UserId>) -> Self {
        Self {
            key,
            user,
            basket: None,
            created_at: Utc::now(),
        }
    }
}

/// A session uri together with its stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSession {
    pub uri: SessionUri,
    pub record: SessionRecord,
}

/// Resolve the session named by a `Session-Id` header.
///
/// No header means no session. Anonymous sessions are created on first use;
/// authenticated sessions must already exist.
pub fn resolve_session(
    store: &Store,
    secret: &str,
    header: Option<&str>,
) -> StorefrontResult<Option<ResolvedSession>> {
    let Some(header) = header else {
        return Ok(None);
    };
    let uri: SessionUri = header.parse()?;
    let key = uri.storage_key(secret);

    let record = match (store.get::<SessionRecord>(&key)?, uri.kind) {
        (Some(record), _) => record,
        (None, SessionKind::Anon) => {
            let record = SessionRecord::new(key, None);
            store.save(&record)?;
            log::debug!("Started anonymous session in realm {}", uri.realm);
            record
        }
        (None, SessionKind::Auth) => {
            return Err(StorefrontError::NotAuthenticated(
                "Session not found".to_string(),
            ))
        }
    };
    Ok(Some(ResolvedSession { uri, record }))
}

/// Identity behind a resolved session.
pub fn resolve_requester(
    store: &Store,
    session: Option<&ResolvedSession>,
) -> StorefrontResult<Option<Requester>> {
    let Some(session) = session else {
        return Ok(None);
    };
    match session.record.user {
        None => Ok(Some(Requester::anonymous())),
        Some(user_id) => match store.get::<User>(&user_id)? {
            Some(user) if user.is_active => Ok(Some(Requester::from_user(&user))),
            _ => Err(StorefrontError::NotAuthenticated(
                "User inactive or deleted".to_string(),
            )),
        },
    }
}

/// Bind `user` to the session, upgrading an anonymous session in place.
///
/// The anonymous record is deleted and a fresh record is stored under the
/// authenticated key of the same uri. Returns the new session and the basket
/// the anonymous session was using, which the caller merges into the user's
/// basket.
pub fn login(
    store: &Store,
    secret: &str,
    session: &ResolvedSession,
    user: &User,
) -> StorefrontResult<(ResolvedSession, Option<BasketId>)> {
    match session.uri.kind {
        SessionKind::Anon => {
            store.remove::<SessionRecord>(&session.record.key)?;
            let uri = session.uri.upgraded();
            let record = SessionRecord::new(uri.storage_key(secret), Some(user.id));
            store.save(&record)?;
            log::info!("User {} logged in, session upgraded", user.username);
            Ok((ResolvedSession { uri, record }, session.record.basket))
        }
        SessionKind::Auth => match session.record.user {
            Some(current) if current == user.id => Ok((session.clone(), None)),
            Some(_) => Err(StorefrontError::MethodNotAllowed(
                "Session is in use, log out first".to_string(),
            )),
            None => {
                let mut record = session.record.clone();
                record.user = Some(user.id);
                store.save(&record)?;
                Ok((
                    ResolvedSession {
                        uri: session.uri.clone(),
                        record,
                    },
                    session.record.basket,
                ))
            }
        },
    }
}

/// Forget the session entirely.
pub fn logout(store: &Store, session: &ResolvedSession) -> StorefrontResult<()> {
    store.remove::<SessionRecord>(&session.record.key)?;
    Ok(())
}

/// Remember which basket an anonymous session is using.
pub fn bind_basket(
    store: &Store,
    session: &mut ResolvedSession,
    basket: BasketId,
) -> StorefrontResult<()> {
    session.record.basket = Some(basket);
    store.save(&session.record)
}
