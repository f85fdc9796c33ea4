//! Persisted entities of the catalogue, basket and wishlist domain.

pub mod address;
pub mod basket;
pub mod catalogue;
pub mod price;
pub mod shipping;
pub mod user;
pub mod wishlist;

pub use address::{Country, ShippingAddress};
pub use basket::{Basket, BasketId, BasketLine, BasketStatus, LineAttribute, LineId};
pub use catalogue::{
    Category, CategoryId, OptionType, Product, ProductId, ProductOption, StockRecord,
    StockRecordId,
};
pub use price::Price;
pub use shipping::ShippingMethod;
pub use user::{User, UserId};
pub use wishlist::{Visibility, WishList, WishListId, WishListLine};
