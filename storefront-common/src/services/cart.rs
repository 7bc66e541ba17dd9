// storefront-common/src/services/cart.rs
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use super::product::product_from_record;
use super::{all_deleted, first_successful, id_of, integer, into_record, now_rfc3339, text, timestamp};
use crate::error::{ServiceError, ServiceResult, ValidationError};
use crate::models::{
    CartItem, CartItemUpdate, CartLine, CartProduct, NewCartItem, Product, WishlistEntry, WishlistProduct,
};
use crate::record_store::{record_id, Condition, FetchParams, Operator, Record, RecordId, RecordStore};

const CART_TABLE: &str = "cart_item";
const WISHLIST_TABLE: &str = "wishlist_item";
const PRODUCT_TABLE: &str = "product";

pub struct CartService {
    store: Arc<dyn RecordStore>,
}

impl CartService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        CartService { store }
    }

    /// Cart lines with their products. Lines whose product is gone are dropped.
    pub fn get_cart_items(&self) -> ServiceResult<Vec<CartItem>> {
        let params = FetchParams::new()
            .fields(&["Name", "quantity", "size", "color", "added_at"])
            .expand("product", PRODUCT_TABLE, &[]);

        let mut items = Vec::new();
        for record in self.store.fetch_records(CART_TABLE, &params)? {
            let Some(product) = embedded_product(&record)? else {
                warn!("Dropping cart item {:?}: product no longer exists", record.get("Id"));
                continue;
            };
            items.push(CartItem {
                id: id_of(CART_TABLE, &record)?,
                quantity: quantity(&record)?,
                size: text(&record, "size"),
                color: text(&record, "color"),
                added_at: timestamp(CART_TABLE, &record, "added_at")?,
                product: CartProduct {
                    id: product.id,
                    name: product.name,
                    brand: product.brand,
                    price: product.price,
                    discount_price: product.discount_price,
                    images: product.images,
                },
            });
        }
        Ok(items)
    }

    pub fn add_to_cart(&self, item: &NewCartItem) -> ServiceResult<CartLine> {
        if item.quantity == 0 {
            return Err(ValidationError::ZeroQuantity.into());
        }

        let record = into_record(json!({
            "Name": format!("Cart Item - {}", item.product_id),
            "product": item.product_id,
            "quantity": item.quantity,
            "size": item.size,
            "color": item.color,
            "added_at": now_rfc3339(),
        }));

        let outcomes = self.store.create_records(CART_TABLE, vec![record])?;
        let created = first_successful(CART_TABLE, "create", outcomes)?;
        info!("Added product {} to cart", item.product_id);
        cart_line_from_record(&created)
    }

    pub fn update_cart_item(&self, id: RecordId, update: CartItemUpdate) -> ServiceResult<CartLine> {
        if update.quantity == 0 {
            return Err(ValidationError::ZeroQuantity.into());
        }

        let record = into_record(json!({ "Id": id, "quantity": update.quantity }));
        let outcomes = self.store.update_records(CART_TABLE, vec![record])?;
        let updated = first_successful(CART_TABLE, "update", outcomes)?;
        cart_line_from_record(&updated)
    }

    pub fn remove_from_cart(&self, id: RecordId) -> ServiceResult<bool> {
        let outcomes = self.store.delete_records(CART_TABLE, &[id])?;
        Ok(all_deleted(CART_TABLE, &outcomes))
    }

    /// Remove every cart line, including ones whose product is gone.
    pub fn clear_cart(&self) -> ServiceResult<bool> {
        let ids: Vec<RecordId> = self
            .store
            .fetch_records(CART_TABLE, &FetchParams::new().fields(&["Name"]))?
            .iter()
            .filter_map(record_id)
            .collect();

        if ids.is_empty() {
            return Ok(true);
        }

        let outcomes = self.store.delete_records(CART_TABLE, &ids)?;
        info!("Cleared {} cart items", ids.len());
        Ok(all_deleted(CART_TABLE, &outcomes))
    }

    pub fn get_wishlist_items(&self) -> ServiceResult<Vec<WishlistProduct>> {
        let params = FetchParams::new()
            .fields(&["Name", "added_at"])
            .expand("product", PRODUCT_TABLE, &[]);

        let mut products = Vec::new();
        for record in self.store.fetch_records(WISHLIST_TABLE, &params)? {
            if let Some(product) = embedded_product(&record)? {
                products.push(WishlistProduct {
                    id: product.id,
                    name: product.name,
                    brand: product.brand,
                    price: product.price,
                    discount_price: product.discount_price,
                    images: product.images,
                    sizes: product.sizes,
                    colors: product.colors,
                    category: product.category,
                    in_stock: product.in_stock,
                });
            }
        }
        Ok(products)
    }

    pub fn add_to_wishlist(&self, product_id: RecordId) -> ServiceResult<WishlistEntry> {
        let record = into_record(json!({
            "Name": format!("Wishlist Item - {}", product_id),
            "product": product_id,
            "added_at": now_rfc3339(),
        }));

        let outcomes = self.store.create_records(WISHLIST_TABLE, vec![record])?;
        let created = first_successful(WISHLIST_TABLE, "create", outcomes)?;
        Ok(WishlistEntry {
            id: id_of(WISHLIST_TABLE, &created)?,
            product_id: integer(WISHLIST_TABLE, &created, "product")?,
            added_at: timestamp(WISHLIST_TABLE, &created, "added_at")?,
        })
    }

    /// Returns false when the product is not on the wishlist.
    pub fn remove_from_wishlist(&self, product_id: RecordId) -> ServiceResult<bool> {
        let params = FetchParams::new()
            .fields(&["Name"])
            .filter(Condition::new("product", Operator::EqualTo, vec![json!(product_id)]));

        let Some(entry_id) = self
            .store
            .fetch_records(WISHLIST_TABLE, &params)?
            .first()
            .and_then(record_id)
        else {
            info!("Product {} not found in wishlist", product_id);
            return Ok(false);
        };

        let outcomes = self.store.delete_records(WISHLIST_TABLE, &[entry_id])?;
        Ok(all_deleted(WISHLIST_TABLE, &outcomes))
    }
}

fn embedded_product(record: &Record) -> ServiceResult<Option<Product>> {
    match record.get("product") {
        Some(Value::Object(product)) => product_from_record(product).map(Some),
        _ => Ok(None),
    }
}

fn quantity(record: &Record) -> ServiceResult<u32> {
    let raw = integer(CART_TABLE, record, "quantity")?;
    u32::try_from(raw).map_err(|_| ServiceError::malformed(CART_TABLE, format!("quantity {} is out of range", raw)))
}

fn cart_line_from_record(record: &Record) -> ServiceResult<CartLine> {
    Ok(CartLine {
        id: id_of(CART_TABLE, record)?,
        product_id: integer(CART_TABLE, record, "product")?,
        quantity: quantity(record)?,
        size: text(record, "size"),
        color: text(record, "color"),
        added_at: timestamp(CART_TABLE, record, "added_at")?,
    })
}
