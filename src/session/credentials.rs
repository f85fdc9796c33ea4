//! Password hashing and verification for user accounts.

use crate::error::{StorefrontError, StorefrontResult};
use crate::models::User;
use crate::store::Store;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use rand::RngCore;

/// Length of the random salt in bytes
pub const SALT_LENGTH: usize = 16;

/// Hash a password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> StorefrontResult<String> {
    let mut salt_bytes = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| StorefrontError::Config(format!("Failed to encode salt: {}", e)))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StorefrontError::Config(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Look up an active user by username and check the password.
pub fn authenticate(store: &Store, username: &str, password: &str) -> StorefrontResult<User> {
    let invalid = || StorefrontError::NotAuthenticated("Invalid username or password".to_string());
    let user = store
        .filter(|u: &User| u.username == username)?
        .into_iter()
        .next()
        .ok_or_else(invalid)?;
    if !verify_password(password, &user.password) {
        log::warn!("Failed login attempt for {}", username);
        return Err(invalid());
    }
    if !user.is_active {
        return Err(StorefrontError::NotAuthenticated(
            "User account is disabled".to_string(),
        ));
    }
    Ok(user)
}

/// Create a user with a hashed password. Usernames are unique.
pub fn create_user(store: &Store, mut user: User, password: &str) -> StorefrontResult<User> {
    if !store.filter(|u: &User| u.username == user.username)?.is_empty() {
        return Err(StorefrontError::Validation(format!(
            "A user named '{}' already exists",
            user.username
        )));
    }
    user.password = hash_password(password)?;
    store.create(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-hash"));
    }

    #[test]
    fn authenticate_checks_password_and_activity() {
        let store = Store::temporary().unwrap();
        let user = create_user(&store, User::new("dave"), "pw").unwrap();

        assert_eq!(authenticate(&store, "dave", "pw").unwrap().id, user.id);
        assert!(authenticate(&store, "dave", "nope").is_err());
        assert!(authenticate(&store, "nobody", "pw").is_err());

        let mut disabled = user;
        disabled.is_active = false;
        store.save(&disabled).unwrap();
        assert!(authenticate(&store, "dave", "pw").is_err());
    }

    #[test]
    fn usernames_are_unique() {
        let store = Store::temporary().unwrap();
        create_user(&store, User::new("erin"), "a").unwrap();
        assert!(create_user(&store, User::new("erin"), "b").is_err());
    }
}
