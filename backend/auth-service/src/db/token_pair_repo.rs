use crate::error::Result;
use crate::models::token_pair::TokenPairRecord;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn get(pool: &PgPool, principal_id: Uuid) -> Result<Option<TokenPairRecord>> {
    let record = sqlx::query_as::<_, TokenPairRecord>(
        r#"
        SELECT principal_id, access_token, refresh_token, created_at
        FROM token_pairs WHERE principal_id = $1
        "#,
    )
    .bind(principal_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Replace the standing pair in one transaction so two valid pairs can never
/// coexist for the same principal, even if the insert fails after the delete.
pub async fn replace(
    pool: &PgPool,
    principal_id: Uuid,
    access_token: &str,
    refresh_token: &str,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM token_pairs WHERE principal_id = $1")
        .bind(principal_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO token_pairs (principal_id, access_token, refresh_token, created_at)
        VALUES ($1, $2, $3, now())
        "#,
    )
    .bind(principal_id)
    .bind(access_token)
    .bind(refresh_token)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, principal_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM token_pairs WHERE principal_id = $1")
        .bind(principal_id)
        .execute(pool)
        .await?;

    Ok(())
}
