use super::catalogue::ProductId;
use super::user::UserId;
use crate::store::numeric_entity;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type WishListId = u64;
pub type WishListLineId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Visibility {
    Private,
    Shared,
    Public,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishList {
    #[serde(default)]
    pub id: WishListId,
    pub owner: UserId,
    #[serde(default = "default_name")]
    pub name: String,
    /// Short token used for sharing links
    #[serde(default)]
    pub key: String,
    #[serde(default = "private")]
    pub visibility: Visibility,
    #[serde(default = "Utc::now")]
    pub date_created: DateTime<Utc>,
}
numeric_entity!(WishList, "wishlists", "wishlist");

fn default_name() -> String {
    "Default".to_string()
}

fn private() -> Visibility {
    Visibility::Private
}

impl WishList {
    pub fn new(owner: UserId) -> Self {
        let key: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        Self {
            id: 0,
            owner,
            name: default_name(),
            key,
            visibility: Visibility::Private,
            date_created: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishListLine {
    #[serde(default)]
    pub id: WishListLineId,
    pub wishlist: WishListId,
    /// Cleared when the product is removed from the catalogue
    #[serde(default)]
    pub product: Option<ProductId>,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub title: String,
}
numeric_entity!(WishListLine, "wishlist_lines", "wishlist line");

fn one() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wishlist_is_private_with_key() {
        let w = WishList::new(3);
        assert_eq!(w.visibility, Visibility::Private);
        assert_eq!(w.key.len(), 6);
        assert_eq!(w.name, "Default");
    }
}
