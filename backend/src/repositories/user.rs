//! User CRUD. A collaborator of the event core: the core only reads
//! id/role/email for authorization decisions.

use chrono::Utc;
use sqlx::PgPool;

use crate::models::user::{UpdateUser, User};

const USER_COLUMNS: &str = "id, email, password_hash, name, LOWER(role) AS role, phone, company, \
                            address, city, state, country, created_at, updated_at";

pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &PgPool, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, name, role, phone, company, address, city, \
         state, country, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(user.role.as_str())
    .bind(&user.phone)
    .bind(&user.company)
    .bind(&user.address)
    .bind(&user.city)
    .bind(&user.state)
    .bind(&user.country)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .map(|_| ())
}

/// Applies only the supplied fields. `password_hash`, when present, must
/// already be hashed by the caller.
pub async fn update(
    pool: &PgPool,
    id: &str,
    changes: &UpdateUser,
    password_hash: Option<&str>,
) -> Result<bool, sqlx::Error> {
    // COALESCE keeps the stored value for absent fields.
    let result = sqlx::query(
        r#"
        UPDATE users SET
            email = COALESCE($1, email),
            name = COALESCE($2, name),
            role = COALESCE($3, role),
            phone = COALESCE($4, phone),
            company = COALESCE($5, company),
            address = COALESCE($6, address),
            city = COALESCE($7, city),
            state = COALESCE($8, state),
            country = COALESCE($9, country),
            password_hash = COALESCE($10, password_hash),
            updated_at = $11
        WHERE id = $12
        "#,
    )
    .bind(&changes.email)
    .bind(&changes.name)
    .bind(changes.role.as_ref().map(|r| r.as_str()))
    .bind(&changes.phone)
    .bind(&changes.company)
    .bind(&changes.address)
    .bind(&changes.city)
    .bind(&changes.state)
    .bind(&changes.country)
    .bind(password_hash)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Cascades over sessions and activity rows via foreign keys.
pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
