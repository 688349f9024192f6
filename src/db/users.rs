//! Account directory: user lookup and creation.
//!
//! Email uniqueness is enforced by the UNIQUE constraint on the users table,
//! not by a check-then-write at this layer, so concurrent signups with the
//! same email cannot both succeed.

use uuid::Uuid;

use super::{with_deadline, DbPool, StoreError, User};

pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, StoreError> {
    with_deadline(
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool),
    )
    .await
}

pub async fn find_by_id(pool: &DbPool, id: &str) -> Result<User, StoreError> {
    with_deadline(
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool),
    )
    .await?
    .ok_or(StoreError::NotFound)
}

/// Insert a new user record. Fails with `StoreError::Duplicate` when the
/// email is already taken.
pub async fn create_user(
    pool: &DbPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: &str,
    phone: &str,
) -> Result<User, StoreError> {
    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    with_deadline(
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, phone, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(phone)
        .bind(&now)
        .bind(&now)
        .execute(pool),
    )
    .await?;

    find_by_id(pool, &id).await
}
