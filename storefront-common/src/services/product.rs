// storefront-common/src/services/product.rs
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use super::{
    all_deleted, flag, id_of, into_record, join_list, number, optional_text, split_list, successful_records, text,
};
use crate::error::{ServiceError, ServiceResult, ValidationError};
use crate::models::{Product, ProductFilters, ProductInput, SortBy};
use crate::record_store::{Condition, FetchParams, Operator, Record, RecordId, RecordStore, SortDirection};

const TABLE: &str = "product";
const FIELDS: &[&str] = &[
    "Name",
    "brand",
    "price",
    "discount_price",
    "images",
    "sizes",
    "colors",
    "category",
    "subcategory",
    "in_stock",
    "description",
];

pub struct ProductService {
    store: Arc<dyn RecordStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        ProductService { store }
    }

    /// Catalog listing with optional search, category and brand filters.
    /// `limit` of `None` or `Some(0)` returns every match.
    pub fn get_products(
        &self,
        filters: &ProductFilters,
        sort_by: SortBy,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Product>> {
        let (field, direction) = sort_column(sort_by);
        let mut params = FetchParams::new().fields(FIELDS).order_by(field, direction);

        // A limit of 0 means no limit.
        if let Some(limit) = limit.filter(|&l| l > 0) {
            params = params.page(limit, 0);
        }
        if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
            params = params.filter(Condition::new("Name", Operator::Contains, vec![json!(search)]));
        }
        if !filters.categories.is_empty() {
            params = params.filter(Condition::new(
                "category",
                Operator::ExactMatch,
                filters.categories.iter().map(|c| json!(c)).collect(),
            ));
        }
        if !filters.brands.is_empty() {
            params = params.filter(Condition::new(
                "brand",
                Operator::ExactMatch,
                filters.brands.iter().map(|b| json!(b)).collect(),
            ));
        }

        self.store
            .fetch_records(TABLE, &params)?
            .iter()
            .map(product_from_record)
            .collect()
    }

    pub fn get_product_by_id(&self, id: RecordId) -> ServiceResult<Option<Product>> {
        let fields: Vec<String> = FIELDS.iter().map(|f| f.to_string()).collect();
        self.store
            .get_record_by_id(TABLE, id, &fields)?
            .as_ref()
            .map(product_from_record)
            .transpose()
    }

    pub fn create_product(&self, input: &ProductInput) -> ServiceResult<Vec<Product>> {
        validate(input)?;
        let outcomes = self.store.create_records(TABLE, vec![product_record(None, input)])?;
        let created = successful_records(TABLE, "create", outcomes)?;
        info!("Created {} product records", created.len());
        created.iter().map(product_from_record).collect()
    }

    pub fn update_product(&self, id: RecordId, input: &ProductInput) -> ServiceResult<Vec<Product>> {
        validate(input)?;
        let outcomes = self.store.update_records(TABLE, vec![product_record(Some(id), input)])?;
        successful_records(TABLE, "update", outcomes)?
            .iter()
            .map(product_from_record)
            .collect()
    }

    /// True when exactly one product was removed.
    pub fn delete_product(&self, id: RecordId) -> ServiceResult<bool> {
        let outcomes = self.store.delete_records(TABLE, &[id])?;
        Ok(all_deleted(TABLE, &outcomes) && outcomes.len() == 1)
    }
}

fn sort_column(sort_by: SortBy) -> (&'static str, SortDirection) {
    match sort_by {
        SortBy::Featured => ("Id", SortDirection::Asc),
        SortBy::PriceLow => ("price", SortDirection::Asc),
        SortBy::PriceHigh => ("price", SortDirection::Desc),
        SortBy::Newest => ("Id", SortDirection::Desc),
    }
}

fn validate(input: &ProductInput) -> Result<(), ValidationError> {
    if input.name.trim().is_empty() {
        return Err(ValidationError::EmptyField("name"));
    }
    Ok(())
}

fn product_record(id: Option<RecordId>, input: &ProductInput) -> Record {
    let mut record = into_record(json!({
        "Name": input.name,
        "brand": input.brand,
        "price": input.price,
        "discount_price": input.discount_price,
        "images": join_list(&input.images),
        "sizes": join_list(&input.sizes),
        "colors": join_list(&input.colors),
        "category": input.category,
        "subcategory": input.subcategory,
        "in_stock": input.in_stock,
        "description": input.description,
    }));
    if let Some(id) = id {
        record.insert("Id".to_string(), Value::from(id));
    }
    record
}

pub(super) fn product_from_record(record: &Record) -> ServiceResult<Product> {
    let price = number(record, "price")
        .ok_or_else(|| ServiceError::malformed(TABLE, "field 'price' is not a number"))?;

    Ok(Product {
        id: id_of(TABLE, record)?,
        name: text(record, "Name"),
        brand: text(record, "brand"),
        price,
        discount_price: number(record, "discount_price"),
        images: split_list(record, "images"),
        sizes: split_list(record, "sizes"),
        colors: split_list(record, "colors"),
        category: text(record, "category"),
        subcategory: optional_text(record, "subcategory"),
        in_stock: flag(record, "in_stock"),
        description: text(record, "description"),
    })
}
