use crate::error::Result;
use crate::models::principal::CustomerRow;
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = "id, full_name, email, password_hash, phone, address, role, created_at";

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<CustomerRow>> {
    let row = sqlx::query_as::<_, CustomerRow>(&format!(
        "SELECT {COLUMNS} FROM customers WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<CustomerRow>> {
    let row = sqlx::query_as::<_, CustomerRow>(&format!(
        "SELECT {COLUMNS} FROM customers WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<CustomerRow>> {
    let row = sqlx::query_as::<_, CustomerRow>(&format!(
        "SELECT {COLUMNS} FROM customers WHERE phone = $1"
    ))
    .bind(phone)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn update_password_hash(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<()> {
    sqlx::query("UPDATE customers SET password_hash = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

    Ok(())
}

/// Create a customer account. Registration passes the submitted contact
/// details; OAuth provisioning passes empty phone/address and a random
/// password hash.
pub async fn insert(
    pool: &PgPool,
    full_name: &str,
    email: &str,
    password_hash: &str,
    phone: &str,
    address: &str,
) -> Result<CustomerRow> {
    let row = sqlx::query_as::<_, CustomerRow>(&format!(
        r#"
        INSERT INTO customers (full_name, email, password_hash, phone, address, role)
        VALUES ($1, $2, $3, $4, $5, 'customer')
        RETURNING {COLUMNS}
        "#
    ))
    .bind(full_name)
    .bind(email)
    .bind(password_hash)
    .bind(phone)
    .bind(address)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
