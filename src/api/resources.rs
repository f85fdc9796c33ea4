use super::generic::{permission_denied, ListQuery, Resource};
use crate::basket_ops;
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{
    Basket, BasketLine, Category, CategoryId, Country, LineAttribute, Product, ProductOption,
    ShippingMethod, StockRecord, User, WishList, WishListLine,
};
use crate::permissions::{
    can_access_basket, can_access_basket_line, can_access_wishlist, can_access_wishlist_line,
    Access, Requester, SessionContext,
};
use crate::storefront::Storefront;
use serde_json::{json, Value};
use std::collections::HashSet;

fn with_fields(mut doc: Value, extra: Value) -> Value {
    if let (Value::Object(fields), Value::Object(extra)) = (&mut doc, extra) {
        fields.extend(extra);
    }
    doc
}

impl Resource for Country {
    const LIST_ACCESS: Access = Access::AllowAny;
    const DETAIL_ACCESS: Access = Access::AllowAny;
}

impl Resource for ShippingMethod {
    const LIST_ACCESS: Access = Access::AllowAny;
    const DETAIL_ACCESS: Access = Access::AllowAny;
}

impl Resource for ProductOption {
    const LIST_ACCESS: Access = Access::AllowAny;
    const DETAIL_ACCESS: Access = Access::AllowAny;
}

impl Resource for StockRecord {
    const LIST_ACCESS: Access = Access::AllowAny;
    const DETAIL_ACCESS: Access = Access::AllowAny;
}

impl Resource for User {
    const LIST_ACCESS: Access = Access::IsAdminUser;
    const DETAIL_ACCESS: Access = Access::IsAdminUser;

    fn present(&self, _storefront: &Storefront) -> StorefrontResult<Value> {
        let mut doc = serde_json::to_value(self)?;
        if let Value::Object(fields) = &mut doc {
            fields.remove("password");
        }
        Ok(doc)
    }
}

/// `root` and every category below it.
pub fn category_with_descendants(all: &[Category], root: CategoryId) -> HashSet<CategoryId> {
    let mut found = HashSet::from([root]);
    let mut frontier = vec![root];
    while let Some(parent) = frontier.pop() {
        for child in all.iter().filter(|c| c.parent == Some(parent)) {
            if found.insert(child.id) {
                frontier.push(child.id);
            }
        }
    }
    found
}

impl Resource for Category {
    const LIST_ACCESS: Access = Access::AllowAny;
    const DETAIL_ACCESS: Access = Access::AllowAny;

    fn present(&self, storefront: &Storefront) -> StorefrontResult<Value> {
        let mut names = vec![self.name.clone()];
        let mut seen = HashSet::from([self.id]);
        let mut parent = self.parent;
        while let Some(id) = parent.filter(|id| seen.insert(*id)) {
            let Some(category) = storefront.store.get::<Category>(&id)? else {
                break;
            };
            names.push(category.name);
            parent = category.parent;
        }
        names.reverse();
        Ok(with_fields(
            serde_json::to_value(self)?,
            json!({ "full_name": names.join(" > ") }),
        ))
    }
}

impl Resource for Product {
    const LIST_ACCESS: Access = Access::AllowAny;
    const DETAIL_ACCESS: Access = Access::AllowAny;

    /// `?category=` takes a slug or an id and includes subcategories.
    fn filter_list(
        storefront: &Storefront,
        items: Vec<Self>,
        query: &ListQuery,
    ) -> StorefrontResult<Vec<Self>> {
        let Some(wanted) = query.get("category") else {
            return Ok(items);
        };
        let categories = storefront.store.all::<Category>()?;
        let root = categories
            .iter()
            .find(|c| c.slug == *wanted || c.id.to_string() == *wanted);
        let Some(root) = root else {
            return Ok(Vec::new());
        };
        let ids = category_with_descendants(&categories, root.id);
        Ok(items
            .into_iter()
            .filter(|p| p.categories.iter().any(|c| ids.contains(c)))
            .collect())
    }

    fn present(&self, _storefront: &Storefront) -> StorefrontResult<Value> {
        Ok(with_fields(
            serde_json::to_value(self)?,
            json!({
                "price": format!("/api/products/{}/price/", self.id),
                "availability": format!("/api/products/{}/availability/", self.id),
                "stockrecords": format!("/api/products/{}/stockrecords/", self.id),
            }),
        ))
    }
}

impl Resource for Basket {
    const LIST_ACCESS: Access = Access::IsAdminUser;
    const DETAIL_ACCESS: Access = Access::HasUser;
    const READ_ONLY_FIELDS: &'static [&'static str] =
        &["id", "owner", "date_created", "date_merged", "date_submitted"];
    const RELATED_FIELDS: &'static [(&'static str, &'static str)] = &[("owner", "users")];

    fn has_object_permission(
        &self,
        _storefront: &Storefront,
        requester: Option<&Requester>,
        session: &SessionContext,
    ) -> StorefrontResult<bool> {
        Ok(requester.is_some_and(|r| can_access_basket(r, self, session)))
    }

    fn present(&self, storefront: &Storefront) -> StorefrontResult<Value> {
        basket_ops::present(storefront, self)
    }

    fn on_destroy(&self, storefront: &Storefront) -> StorefrontResult<()> {
        basket_ops::clear(&storefront.store, self.id)
    }
}

impl Resource for BasketLine {
    const LIST_ACCESS: Access = Access::IsAdminUser;
    const DETAIL_ACCESS: Access = Access::HasUser;
    const READ_ONLY_FIELDS: &'static [&'static str] = &[
        "id",
        "basket",
        "line_reference",
        "product",
        "stockrecord",
        "price_currency",
        "price_excl_tax",
        "price_incl_tax",
        "date_created",
    ];

    fn has_object_permission(
        &self,
        _storefront: &Storefront,
        requester: Option<&Requester>,
        session: &SessionContext,
    ) -> StorefrontResult<bool> {
        Ok(requester.is_some_and(|r| can_access_basket_line(r, self, session)))
    }

    /// A new quantity goes through the same stock and basket limit checks
    /// as adding the product.
    fn validate(
        &self,
        storefront: &Storefront,
        requester: Option<&Requester>,
        _session: &SessionContext,
    ) -> StorefrontResult<()> {
        if self.quantity == 0 {
            return Err(StorefrontError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }
        let basket = storefront.store.fetch::<Basket>(&self.basket)?;
        if !basket.can_be_edited() {
            return Err(StorefrontError::NotAcceptable(format!(
                "Basket {} can not be edited",
                basket.id
            )));
        }
        let product = storefront.store.fetch::<Product>(&self.product)?;
        basket_ops::check_purchase(storefront, requester, &product, self.quantity)?;
        basket_ops::check_line_quantity(storefront, &basket, self)
    }

    fn present(&self, _storefront: &Storefront) -> StorefrontResult<Value> {
        Ok(with_fields(
            serde_json::to_value(self)?,
            json!({
                "line_price_excl_tax": self.line_price_excl_tax(),
                "line_price_incl_tax": self.line_price_incl_tax(),
            }),
        ))
    }

    fn on_destroy(&self, storefront: &Storefront) -> StorefrontResult<()> {
        for attribute in storefront
            .store
            .filter(|a: &LineAttribute| a.line == self.id)?
        {
            storefront.store.remove::<LineAttribute>(&attribute.id)?;
        }
        Ok(())
    }
}

impl Resource for LineAttribute {
    const LIST_ACCESS: Access = Access::HasUser;
    const DETAIL_ACCESS: Access = Access::HasUser;
    const READ_ONLY_FIELDS: &'static [&'static str] = &["id", "line"];
    const RELATED_FIELDS: &'static [(&'static str, &'static str)] =
        &[("line", "lines"), ("option", "options")];

    /// Follows the parent line.
    fn has_object_permission(
        &self,
        storefront: &Storefront,
        requester: Option<&Requester>,
        session: &SessionContext,
    ) -> StorefrontResult<bool> {
        let Some(requester) = requester else {
            return Ok(false);
        };
        Ok(match storefront.store.get::<BasketLine>(&self.line)? {
            Some(line) => can_access_basket_line(requester, &line, session),
            None => requester.is_privileged(),
        })
    }

    fn validate(
        &self,
        storefront: &Storefront,
        requester: Option<&Requester>,
        session: &SessionContext,
    ) -> StorefrontResult<()> {
        let line = storefront.store.get::<BasketLine>(&self.line)?.ok_or_else(|| {
            StorefrontError::Validation(format!("Line {} does not exist", self.line))
        })?;
        if !requester.is_some_and(|r| can_access_basket_line(r, &line, session)) {
            log::warn!("Denied attribute on line {}", line.id);
            return Err(permission_denied());
        }
        if storefront.store.get::<ProductOption>(&self.option)?.is_none() {
            return Err(StorefrontError::Validation(format!(
                "Option {} does not exist",
                self.option
            )));
        }
        Ok(())
    }
}

impl Resource for WishList {
    const LIST_ACCESS: Access = Access::IsAdminUser;
    const DETAIL_ACCESS: Access = Access::HasUser;
    const READ_ONLY_FIELDS: &'static [&'static str] = &["id", "owner", "key", "date_created"];

    fn has_object_permission(
        &self,
        _storefront: &Storefront,
        requester: Option<&Requester>,
        _session: &SessionContext,
    ) -> StorefrontResult<bool> {
        Ok(requester.is_some_and(|r| can_access_wishlist(r, self)))
    }

    fn present(&self, _storefront: &Storefront) -> StorefrontResult<Value> {
        Ok(with_fields(
            serde_json::to_value(self)?,
            json!({ "lines": format!("/api/wishlists/{}/lines/", self.id) }),
        ))
    }

    fn on_destroy(&self, storefront: &Storefront) -> StorefrontResult<()> {
        for line in storefront
            .store
            .filter(|l: &WishListLine| l.wishlist == self.id)?
        {
            storefront.store.remove::<WishListLine>(&line.id)?;
        }
        Ok(())
    }
}

impl Resource for WishListLine {
    const LIST_ACCESS: Access = Access::IsAdminUser;
    const DETAIL_ACCESS: Access = Access::HasUser;
    const READ_ONLY_FIELDS: &'static [&'static str] = &["id", "wishlist"];
    const RELATED_FIELDS: &'static [(&'static str, &'static str)] =
        &[("wishlist", "wishlists"), ("product", "products")];

    fn has_object_permission(
        &self,
        storefront: &Storefront,
        requester: Option<&Requester>,
        _session: &SessionContext,
    ) -> StorefrontResult<bool> {
        let Some(requester) = requester else {
            return Ok(false);
        };
        Ok(match storefront.store.get::<WishList>(&self.wishlist)? {
            Some(wishlist) => can_access_wishlist_line(requester, self, &wishlist),
            None => requester.is_privileged(),
        })
    }

    fn validate(
        &self,
        storefront: &Storefront,
        requester: Option<&Requester>,
        _session: &SessionContext,
    ) -> StorefrontResult<()> {
        if self.quantity == 0 {
            return Err(StorefrontError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }
        let wishlist = storefront.store.fetch::<WishList>(&self.wishlist)?;
        if !requester.is_some_and(|r| can_access_wishlist(r, &wishlist)) {
            log::warn!("Denied line on wishlist {}", wishlist.id);
            return Err(permission_denied());
        }
        if let Some(product) = self.product {
            storefront.store.fetch::<Product>(&product)?;
        }
        Ok(())
    }
}
