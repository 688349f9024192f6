//! Product catalog endpoints: browse/filter for everyone, CRUD for admins.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::catalog::{apply_filter, sort_products, ProductFilter, SortDirection, SortKey};
use crate::db::{self, NewProduct, Product, ProductPage, ProductPatch, User};
use crate::uploads;
use crate::AppState;

use super::auth::require_admin;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_category, validate_description, validate_name, validate_price, validate_rating,
};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Default, serde::Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    pub q: Option<String>,
    pub sort_by: Option<SortKey>,
    pub sort_dir: Option<SortDirection>,
}

impl ListParams {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self.category.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            min_rating: self.min_rating,
            query: self.q.clone(),
        }
    }
}

/// List products
///
/// GET /products?page=&limit=
///
/// Without filter or sort parameters this returns one page-window in storage
/// order. With them, the catalog engine runs over the whole catalog and the
/// filtered, sorted result is paginated; filtering widens across the full
/// catalog rather than narrowing within a single fetched page.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ProductPage>, ApiError> {
    let page = params.page.unwrap_or(DEFAULT_PAGE).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 100);

    let filter = params.filter();
    if filter.is_empty() && params.sort_by.is_none() {
        let (products, total) = db::products::list(&state.db, page, limit).await?;
        return Ok(Json(ProductPage { products, total }));
    }

    let all = db::products::list_all(&state.db).await?;
    let mut filtered = apply_filter(&all, &filter);
    if let Some(key) = params.sort_by {
        sort_products(&mut filtered, key, params.sort_dir.unwrap_or_default());
    }

    let total = filtered.len() as i64;
    let start = usize::try_from(page.saturating_sub(1).saturating_mul(limit)).unwrap_or(usize::MAX);
    let products: Vec<Product> = filtered
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();

    Ok(Json(ProductPage { products, total }))
}

/// Get a single product
///
/// GET /products/:id
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = db::products::get(&state.db, &id)
        .await
        .map_err(|e| match e {
            db::StoreError::NotFound => ApiError::not_found("Product not found"),
            other => other.into(),
        })?;
    Ok(Json(product))
}

/// An uploaded image part: client filename, content type, raw bytes.
struct ImagePart {
    filename: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Product fields parsed out of a multipart form. Every field optional here;
/// create and update decide what is required.
#[derive(Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
    price: Option<String>,
    rating: Option<String>,
    image: Option<ImagePart>,
}

impl ProductForm {
    async fn parse(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = ProductForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "image" => {
                    let filename = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Failed to read image: {}", e)))?;
                    // An empty file input still submits a part; ignore it
                    if !bytes.is_empty() {
                        form.image = Some(ImagePart {
                            filename,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                _ => {
                    let value = field.text().await.map_err(|e| {
                        ApiError::bad_request(format!("Invalid field {}: {}", name, e))
                    })?;
                    match name.as_str() {
                        "name" => form.name = Some(value),
                        "description" => form.description = Some(value),
                        "category" => form.category = Some(value),
                        "price" => form.price = Some(value),
                        "rating" => form.rating = Some(value),
                        // Unknown keys are dropped, never merged
                        _ => {}
                    }
                }
            }
        }

        Ok(form)
    }

    /// Store the image part, if any, and return its public URL.
    async fn store_image(&self, state: &AppState) -> Result<Option<String>, ApiError> {
        let Some(ref image) = self.image else {
            return Ok(None);
        };

        let stored_name = uploads::save_image(
            &state.config.uploads.dir,
            image.filename.as_deref(),
            image.content_type.as_deref(),
            &image.bytes,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to store uploaded image: {}", e);
            ApiError::internal("Failed to store uploaded image")
        })?;

        Ok(Some(uploads::image_url(
            &state.config.uploads.base_url,
            &stored_name,
        )))
    }
}

fn parse_number(
    value: &str,
    field: &str,
    errors: &mut ValidationErrorBuilder,
) -> Option<f64> {
    match value.trim().parse::<f64>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.add(field, format!("{} must be a number", capitalize(field)));
            None
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn build_new_product(form: &ProductForm) -> Result<NewProduct, ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    let name = form.name.clone().unwrap_or_default();
    if let Err(e) = validate_name(&name) {
        errors.add("name", e);
    }

    let description = form.description.clone().unwrap_or_default();
    if let Err(e) = validate_description(&description) {
        errors.add("description", e);
    }

    let category = form.category.clone().unwrap_or_default();
    if let Err(e) = validate_category(&category) {
        errors.add("category", e);
    }

    let price = match form.price.as_deref() {
        Some(raw) => parse_number(raw, "price", &mut errors),
        None => {
            errors.add("price", "Price is required");
            None
        }
    };
    if let Some(price) = price {
        if let Err(e) = validate_price(price) {
            errors.add("price", e);
        }
    }

    let rating = match form.rating.as_deref() {
        Some(raw) => parse_number(raw, "rating", &mut errors),
        None => {
            errors.add("rating", "Rating is required");
            None
        }
    };
    if let Some(rating) = rating {
        if let Err(e) = validate_rating(rating) {
            errors.add("rating", e);
        }
    }

    errors.finish()?;

    Ok(NewProduct {
        name,
        description,
        category,
        price: price.unwrap_or_default(),
        rating: rating.unwrap_or_default(),
    })
}

fn build_patch(form: &ProductForm) -> Result<ProductPatch, ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    let mut patch = ProductPatch::default();

    if let Some(ref name) = form.name {
        match validate_name(name) {
            Ok(()) => patch.name = Some(name.clone()),
            Err(e) => {
                errors.add("name", e);
            }
        }
    }

    if let Some(ref description) = form.description {
        match validate_description(description) {
            Ok(()) => patch.description = Some(description.clone()),
            Err(e) => {
                errors.add("description", e);
            }
        }
    }

    if let Some(ref category) = form.category {
        match validate_category(category) {
            Ok(()) => patch.category = Some(category.clone()),
            Err(e) => {
                errors.add("category", e);
            }
        }
    }

    if let Some(ref raw) = form.price {
        if let Some(price) = parse_number(raw, "price", &mut errors) {
            match validate_price(price) {
                Ok(()) => patch.price = Some(price),
                Err(e) => {
                    errors.add("price", e);
                }
            }
        }
    }

    if let Some(ref raw) = form.rating {
        if let Some(rating) = parse_number(raw, "rating", &mut errors) {
            match validate_rating(rating) {
                Ok(()) => patch.rating = Some(rating),
                Err(e) => {
                    errors.add("rating", e);
                }
            }
        }
    }

    errors.finish()?;
    Ok(patch)
}

/// Create a product (admin only)
///
/// POST /products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    user: User,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    require_admin(&user)?;

    let form = ProductForm::parse(multipart).await?;
    let fields = build_new_product(&form)?;
    let image_url = form.store_image(&state).await?;

    let product = db::products::create(&state.db, &fields, image_url.as_deref()).await?;

    tracing::info!(product = %product.name, by = %user.email, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product (admin only, partial)
///
/// PUT /products/:id
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Product>, ApiError> {
    require_admin(&user)?;

    let form = ProductForm::parse(multipart).await?;
    let patch = build_patch(&form)?;
    let image_url = form.store_image(&state).await?;

    let product = db::products::update(&state.db, &id, &patch, image_url.as_deref())
        .await
        .map_err(|e| match e {
            db::StoreError::NotFound => ApiError::not_found("Product not found"),
            other => other.into(),
        })?;

    Ok(Json(product))
}

/// Delete a product (admin only)
///
/// DELETE /products/:id
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_admin(&user)?;

    db::products::delete(&state.db, &id)
        .await
        .map_err(|e| match e {
            db::StoreError::NotFound => ApiError::not_found("Product not found"),
            other => other.into(),
        })?;

    tracing::info!(product_id = %id, by = %user.email, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}
