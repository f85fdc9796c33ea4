use crate::store::numeric_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default = "active")]
    pub is_active: bool,
    /// Argon2 PHC string; never presented over HTTP
    #[serde(default)]
    pub password: String,
    #[serde(default = "Utc::now")]
    pub date_joined: DateTime<Utc>,
}
numeric_entity!(User, "users", "user");

fn active() -> bool {
    true
}

impl User {
    pub fn new(username: &str) -> Self {
        Self {
            id: 0,
            username: username.to_string(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_staff: false,
            is_active: true,
            password: String::new(),
            date_joined: Utc::now(),
        }
    }

    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }
}
