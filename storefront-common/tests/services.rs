use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

use storefront_common::error::{ServiceError, StoreError, ValidationError};
use storefront_common::models::{
    CartItemUpdate, NewCartItem, NewReview, ProductFilters, ProductInput, ReviewUpdate, SortBy,
};
use storefront_common::record_store::{FetchParams, Record, RecordId, RecordOutcome, RecordStore};
use storefront_common::{CartService, JsonFileStore, ProductService, RatingSummary, ReviewService};

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn store(temp_dir: &TempDir) -> Arc<dyn RecordStore> {
    Arc::new(JsonFileStore::new(temp_dir.path()))
}

/// A store whose every call fails, standing in for an unreachable backend.
struct UnreachableStore;

impl RecordStore for UnreachableStore {
    fn fetch_records(&self, _table: &str, _params: &FetchParams) -> Result<Vec<Record>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn get_record_by_id(&self, _table: &str, _id: RecordId, _fields: &[String]) -> Result<Option<Record>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn create_records(&self, _table: &str, _records: Vec<Record>) -> Result<Vec<RecordOutcome>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn update_records(&self, _table: &str, _records: Vec<Record>) -> Result<Vec<RecordOutcome>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn delete_records(&self, _table: &str, _ids: &[RecordId]) -> Result<Vec<RecordOutcome>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

fn seed_reviews(store: &Arc<dyn RecordStore>) {
    let reviews = [
        (1, "ana", 5, "2024-03-01T09:00:00Z"),
        (1, "ben", 4, "2024-03-05T09:00:00Z"),
        (2, "cai", 1, "2024-03-02T09:00:00Z"),
        (1, "dee", 4, "2024-03-03T09:00:00Z"),
    ];
    let records = reviews
        .iter()
        .map(|(product, user, rating, at)| {
            record(json!({
                "Name": format!("Review by {}", user),
                "product": product,
                "user_name": user,
                "rating": rating,
                "comment": "",
                "created_at": at,
                "updated_at": at,
            }))
        })
        .collect();
    store.create_records("review", records).unwrap();
}

fn shoe(name: &str, brand: &str, category: &str, price: f64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        brand: brand.to_string(),
        price,
        images: vec![format!("{}.jpg", name.to_lowercase().replace(' ', "-"))],
        sizes: vec!["40".to_string(), "41".to_string()],
        colors: vec!["black".to_string()],
        category: category.to_string(),
        in_stock: true,
        ..ProductInput::default()
    }
}

// --- Reviews ---

#[test]
fn test_get_reviews_filters_by_product_newest_first() {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    seed_reviews(&store);

    let reviews = ReviewService::new(store).get_reviews(1).unwrap();
    let users: Vec<_> = reviews.iter().map(|r| r.user_name.as_str()).collect();
    assert_eq!(users, vec!["ben", "dee", "ana"]);
    assert!(reviews.iter().all(|r| r.product_id == 1));
}

#[test]
fn test_get_reviews_orders_mixed_offsets_by_instant() {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let stamped = |user: &str, at: &str| {
        record(json!({
            "product": 1, "user_name": user, "rating": 4, "comment": "",
            "created_at": at, "updated_at": at
        }))
    };
    store
        .create_records(
            "review",
            vec![
                stamped("oslo", "2026-03-02T10:00:00+02:00"),
                stamped("london", "2026-03-02T09:00:00Z"),
                stamped("new-york", "2026-03-02T04:30:00-05:00"),
            ],
        )
        .unwrap();

    let reviews = ReviewService::new(store).get_reviews(1).unwrap();
    let users: Vec<_> = reviews.iter().map(|r| r.user_name.as_str()).collect();
    assert_eq!(users, vec!["new-york", "london", "oslo"]);
    assert!(reviews.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[test]
fn test_reviews_summary_for_product() {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    seed_reviews(&store);
    let service = ReviewService::new(store);

    let summary = service.get_reviews_summary(1).unwrap();
    assert_eq!(summary.total_reviews, 3);
    // 13 / 3 = 4.333...
    assert_eq!(summary.average_rating, 4.3);
    assert_eq!(summary.rating_breakdown[&4], 2);
    assert_eq!(summary.rating_breakdown[&5], 1);
    assert_eq!(summary.rating_breakdown[&1], 0);

    assert_eq!(service.get_reviews_summary(99).unwrap(), RatingSummary::empty());
}

#[test]
fn test_summary_fails_fast_on_stored_out_of_range_rating() {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    store
        .create_records(
            "review",
            vec![record(json!({
                "product": 3, "user_name": "eve", "rating": 9, "comment": "",
                "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"
            }))],
        )
        .unwrap();

    let err = ReviewService::new(store).get_reviews_summary(3).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::RatingOutOfRange { rating: 9, .. })
    ));
}

#[test]
fn test_add_update_delete_review() {
    let temp_dir = TempDir::new().unwrap();
    let service = ReviewService::new(store(&temp_dir));

    let added = service
        .add_review(&NewReview {
            product_id: 4,
            user_name: "fay".to_string(),
            rating: 3,
            comment: "Runs small".to_string(),
        })
        .unwrap();
    assert_eq!(added.product_id, 4);
    assert_eq!(added.rating, 3);
    assert_eq!(added.created_at, added.updated_at);

    let updated = service
        .update_review(
            added.id,
            &ReviewUpdate {
                user_name: "fay".to_string(),
                rating: 4,
                comment: "Runs small, but comfy".to_string(),
            },
        )
        .unwrap();
    assert_eq!(updated.id, added.id);
    assert_eq!(updated.product_id, 4);
    assert_eq!(updated.rating, 4);
    assert_eq!(updated.created_at, added.created_at);
    assert!(updated.updated_at >= added.updated_at);

    assert!(service.delete_review(added.id).unwrap());
    assert!(!service.delete_review(added.id).unwrap());
    assert!(service.get_reviews(4).unwrap().is_empty());
}

#[test]
fn test_add_review_validates_input() {
    let temp_dir = TempDir::new().unwrap();
    let service = ReviewService::new(store(&temp_dir));

    let mut review = NewReview {
        product_id: 1,
        user_name: "gus".to_string(),
        rating: 6,
        comment: String::new(),
    };
    assert!(matches!(
        service.add_review(&review),
        Err(ServiceError::Validation(ValidationError::RatingOutOfRange { rating: 6, .. }))
    ));

    review.rating = 5;
    review.user_name = "  ".to_string();
    assert!(matches!(
        service.add_review(&review),
        Err(ServiceError::Validation(ValidationError::EmptyField("userName")))
    ));
}

#[test]
fn test_update_missing_review_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let service = ReviewService::new(store(&temp_dir));
    let err = service
        .update_review(
            12,
            &ReviewUpdate {
                user_name: "hal".to_string(),
                rating: 2,
                comment: String::new(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Rejected { .. }));
}

#[test]
fn test_store_errors_propagate_unchanged() {
    let service = ReviewService::new(Arc::new(UnreachableStore));
    assert!(matches!(
        service.get_reviews_summary(1),
        Err(ServiceError::Store(StoreError::Unavailable(_)))
    ));

    let products = ProductService::new(Arc::new(UnreachableStore));
    assert!(matches!(
        products.get_product_by_id(1),
        Err(ServiceError::Store(StoreError::Unavailable(_)))
    ));

    let cart = CartService::new(Arc::new(UnreachableStore));
    assert!(matches!(cart.clear_cart(), Err(ServiceError::Store(_))));
}

// --- Products ---

#[test]
fn test_product_round_trip_through_store() {
    let temp_dir = TempDir::new().unwrap();
    let service = ProductService::new(store(&temp_dir));

    let created = service.create_product(&shoe("Trail Runner", "Peak", "Shoes", 120.0)).unwrap();
    assert_eq!(created.len(), 1);
    let id = created[0].id;

    let fetched = service.get_product_by_id(id).unwrap().unwrap();
    assert_eq!(fetched.sizes, vec!["40", "41"]);
    assert_eq!(fetched.images, vec!["trail-runner.jpg"]);
    assert!(fetched.in_stock);
    assert_eq!(fetched.subcategory, None);

    let mut change = shoe("Trail Runner 2", "Peak", "Shoes", 110.0);
    change.discount_price = Some(99.0);
    change.sizes.clear();
    let updated = service.update_product(id, &change).unwrap();
    assert_eq!(updated[0].name, "Trail Runner 2");
    assert_eq!(updated[0].discount_price, Some(99.0));
    assert!(updated[0].sizes.is_empty());

    assert!(service.delete_product(id).unwrap());
    assert_eq!(service.get_product_by_id(id).unwrap(), None);
    assert!(!service.delete_product(id).unwrap());
}

#[test]
fn test_get_products_filters_and_sorts() {
    let temp_dir = TempDir::new().unwrap();
    let service = ProductService::new(store(&temp_dir));
    for input in [
        shoe("Trail Runner", "Peak", "Shoes", 120.0),
        shoe("City Loafer", "Urbane", "Shoes", 80.0),
        shoe("Weekend Tote", "Urbane", "Bags", 45.0),
        shoe("Peak Hiker", "Peak", "Shoes", 150.0),
    ] {
        service.create_product(&input).unwrap();
    }

    let names = |products: Vec<storefront_common::models::Product>| -> Vec<String> {
        products.into_iter().map(|p| p.name).collect()
    };

    let all = service.get_products(&ProductFilters::default(), SortBy::Featured, None).unwrap();
    assert_eq!(names(all), vec!["Trail Runner", "City Loafer", "Weekend Tote", "Peak Hiker"]);

    let newest = service.get_products(&ProductFilters::default(), SortBy::Newest, Some(2)).unwrap();
    assert_eq!(names(newest), vec!["Peak Hiker", "Weekend Tote"]);

    let unlimited = service.get_products(&ProductFilters::default(), SortBy::Featured, Some(0)).unwrap();
    assert_eq!(unlimited.len(), 4);

    let shoes_by_price = service
        .get_products(
            &ProductFilters {
                categories: vec!["Shoes".to_string()],
                ..ProductFilters::default()
            },
            SortBy::PriceLow,
            None,
        )
        .unwrap();
    assert_eq!(names(shoes_by_price), vec!["City Loafer", "Trail Runner", "Peak Hiker"]);

    let search = service
        .get_products(
            &ProductFilters {
                search: Some("peak".to_string()),
                brands: vec!["Peak".to_string()],
                ..ProductFilters::default()
            },
            SortBy::PriceHigh,
            None,
        )
        .unwrap();
    assert_eq!(names(search), vec!["Peak Hiker"]);
}

#[test]
fn test_create_product_requires_name() {
    let temp_dir = TempDir::new().unwrap();
    let service = ProductService::new(store(&temp_dir));
    let err = service.create_product(&ProductInput::default()).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ValidationError::EmptyField("name"))));
}

// --- Cart and wishlist ---

#[test]
fn test_cart_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let products = ProductService::new(store.clone());
    let cart = CartService::new(store.clone());

    let loafer = products.create_product(&shoe("City Loafer", "Urbane", "Shoes", 80.0)).unwrap()[0].id;
    let tote = products.create_product(&shoe("Weekend Tote", "Urbane", "Bags", 45.0)).unwrap()[0].id;

    let line = cart
        .add_to_cart(&NewCartItem {
            product_id: loafer,
            quantity: 1,
            size: "41".to_string(),
            color: "black".to_string(),
        })
        .unwrap();
    assert_eq!(line.product_id, loafer);

    cart.add_to_cart(&NewCartItem {
        product_id: tote,
        quantity: 2,
        size: String::new(),
        color: String::new(),
    })
    .unwrap();

    let updated = cart.update_cart_item(line.id, CartItemUpdate { quantity: 3 }).unwrap();
    assert_eq!(updated.quantity, 3);
    assert_eq!(updated.size, "41");

    // A line whose product disappears is dropped from the listing.
    products.delete_product(tote).unwrap();
    let items = cart.get_cart_items().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product.name, "City Loafer");
    assert_eq!(items[0].quantity, 3);

    assert!(cart.remove_from_cart(line.id).unwrap());
    assert!(cart.get_cart_items().unwrap().is_empty());

    // The orphaned line is still cleared.
    assert!(cart.clear_cart().unwrap());
    assert!(store.fetch_records("cart_item", &FetchParams::new()).unwrap().is_empty());
    assert!(cart.clear_cart().unwrap());
}

#[test]
fn test_cart_rejects_zero_quantity() {
    let temp_dir = TempDir::new().unwrap();
    let cart = CartService::new(store(&temp_dir));
    let err = cart
        .add_to_cart(&NewCartItem {
            product_id: 1,
            quantity: 0,
            size: String::new(),
            color: String::new(),
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ValidationError::ZeroQuantity)));
    assert!(cart.update_cart_item(1, CartItemUpdate { quantity: 0 }).is_err());
}

#[test]
fn test_wishlist_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let products = ProductService::new(store.clone());
    let cart = CartService::new(store);

    let hiker = products.create_product(&shoe("Peak Hiker", "Peak", "Shoes", 150.0)).unwrap()[0].id;
    let entry = cart.add_to_wishlist(hiker).unwrap();
    assert_eq!(entry.product_id, hiker);

    let wishlist = cart.get_wishlist_items().unwrap();
    assert_eq!(wishlist.len(), 1);
    assert_eq!(wishlist[0].name, "Peak Hiker");
    assert_eq!(wishlist[0].colors, vec!["black"]);

    assert!(!cart.remove_from_wishlist(hiker + 100).unwrap());
    assert!(cart.remove_from_wishlist(hiker).unwrap());
    assert!(cart.get_wishlist_items().unwrap().is_empty());
}
