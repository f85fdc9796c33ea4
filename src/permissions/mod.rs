// permissions module

pub mod access;
pub mod policy;
pub use access::Access;
pub use policy::{
    can_access_as_user, can_access_basket, can_access_basket_line, can_access_wishlist,
    can_access_wishlist_line, may_access, Identity, Owned, Owner, ParentedWishListLine, Requester,
    SessionContext,
};
