//! Product store: CRUD with pagination.
//!
//! `list` returns one page-window in storage order plus the total count
//! across all pages. No implicit sort is applied beyond insertion order;
//! ordering and filtering live in the catalog engine.

use uuid::Uuid;

use super::{with_deadline, DbPool, NewProduct, Product, ProductPatch, StoreError};

pub async fn list(pool: &DbPool, page: i64, limit: i64) -> Result<(Vec<Product>, i64), StoreError> {
    let page = page.max(1);
    let limit = limit.max(1);
    // Saturate: an absurd page number is an empty page, not an overflow
    let offset = page.saturating_sub(1).saturating_mul(limit);

    let products = with_deadline(
        sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY rowid LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(pool),
    )
    .await?;

    let total: (i64,) =
        with_deadline(sqlx::query_as("SELECT COUNT(*) FROM products").fetch_one(pool)).await?;

    Ok((products, total.0))
}

/// Fetch every product in storage order, for catalog-wide filtering.
pub async fn list_all(pool: &DbPool) -> Result<Vec<Product>, StoreError> {
    with_deadline(
        sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY rowid").fetch_all(pool),
    )
    .await
}

pub async fn get(pool: &DbPool, id: &str) -> Result<Product, StoreError> {
    with_deadline(
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(pool),
    )
    .await?
    .ok_or(StoreError::NotFound)
}

pub async fn create(
    pool: &DbPool,
    fields: &NewProduct,
    image: Option<&str>,
) -> Result<Product, StoreError> {
    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    with_deadline(
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, category, price, rating, image, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.category)
        .bind(fields.price)
        .bind(fields.rating)
        .bind(image)
        .bind(&now)
        .bind(&now)
        .execute(pool),
    )
    .await?;

    get(pool, &id).await
}

/// Partial update: only fields present in the patch change. A new image URL
/// replaces the old reference; the old file is not cleaned up.
pub async fn update(
    pool: &DbPool,
    id: &str,
    patch: &ProductPatch,
    image: Option<&str>,
) -> Result<Product, StoreError> {
    // Existence check first so a missing id is NotFound, not a no-op
    get(pool, id).await?;

    let now = chrono::Utc::now().to_rfc3339();

    with_deadline(
        sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                category = COALESCE(?, category),
                price = COALESCE(?, price),
                rating = COALESCE(?, rating),
                image = COALESCE(?, image),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(&patch.category)
        .bind(patch.price)
        .bind(patch.rating)
        .bind(image)
        .bind(&now)
        .bind(id)
        .execute(pool),
    )
    .await?;

    get(pool, id).await
}

pub async fn delete(pool: &DbPool, id: &str) -> Result<(), StoreError> {
    let result = with_deadline(
        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(pool),
    )
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_pool;

    fn widget(n: u32) -> NewProduct {
        NewProduct {
            name: format!("Widget {}", n),
            description: format!("Widget number {}", n),
            category: "home".to_string(),
            price: n as f64,
            rating: 4.0,
        }
    }

    #[tokio::test]
    async fn test_pagination_window_and_total() {
        let pool = init_test_pool().await;
        for n in 1..=15 {
            create(&pool, &widget(n), None).await.unwrap();
        }

        let (page_one, total) = list(&pool, 1, 10).await.unwrap();
        assert_eq!(page_one.len(), 10);
        assert_eq!(total, 15);
        assert_eq!(page_one[0].name, "Widget 1");

        // 15 records, page 2 of 10: records 11-15
        let (page_two, total) = list(&pool, 2, 10).await.unwrap();
        assert_eq!(page_two.len(), 5);
        assert_eq!(total, 15);
        assert_eq!(page_two[0].name, "Widget 11");
        assert_eq!(page_two[4].name, "Widget 15");
    }

    #[tokio::test]
    async fn test_huge_page_number_is_empty_not_error() {
        let pool = init_test_pool().await;
        for n in 1..=3 {
            create(&pool, &widget(n), None).await.unwrap();
        }

        let (products, total) = list(&pool, i64::MAX, 10).await.unwrap();
        assert!(products.is_empty());
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_page_beyond_range_is_empty_not_error() {
        let pool = init_test_pool().await;
        for n in 1..=3 {
            create(&pool, &widget(n), None).await.unwrap();
        }

        let (products, total) = list(&pool, 7, 10).await.unwrap();
        assert!(products.is_empty());
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_create_attaches_image_only_when_present() {
        let pool = init_test_pool().await;

        let plain = create(&pool, &widget(1), None).await.unwrap();
        assert!(plain.image.is_none());

        let imaged = create(&pool, &widget(2), Some("http://localhost:3000/uploads/a.png"))
            .await
            .unwrap();
        assert_eq!(
            imaged.image.as_deref(),
            Some("http://localhost:3000/uploads/a.png")
        );
    }

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let pool = init_test_pool().await;
        let product = create(
            &pool,
            &NewProduct {
                name: "Widget".to_string(),
                description: "A widget".to_string(),
                category: "home".to_string(),
                price: 9.99,
                rating: 4.5,
            },
            None,
        )
        .await
        .unwrap();

        let patch = ProductPatch {
            price: Some(12.50),
            ..Default::default()
        };
        let updated = update(&pool, &product.id, &patch, None).await.unwrap();

        assert_eq!(updated.price, 12.50);
        assert_eq!(updated.name, "Widget");
        assert_eq!(updated.description, "A widget");
        assert_eq!(updated.category, "home");
        assert_eq!(updated.rating, 4.5);
    }

    #[tokio::test]
    async fn test_update_replaces_image() {
        let pool = init_test_pool().await;
        let product = create(&pool, &widget(1), Some("http://x/uploads/old.png"))
            .await
            .unwrap();

        let updated = update(
            &pool,
            &product.id,
            &ProductPatch::default(),
            Some("http://x/uploads/new.png"),
        )
        .await
        .unwrap();
        assert_eq!(updated.image.as_deref(), Some("http://x/uploads/new.png"));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let pool = init_test_pool().await;
        let err = update(&pool, "nope", &ProductPatch::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let pool = init_test_pool().await;
        let product = create(&pool, &widget(1), None).await.unwrap();

        delete(&pool, &product.id).await.unwrap();

        let err = get(&pool, &product.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        let err = delete(&pool, &product.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
