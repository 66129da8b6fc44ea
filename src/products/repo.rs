use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::orders::repo_types::LineItem;
use crate::products::{dto::ProductInput, repo_types::Product};

const PRODUCT_COLUMNS: &str = "id, name, stock, price, created_at";

impl Product {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> ServiceResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    pub async fn list(db: &PgPool) -> ServiceResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at ASC"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Full-text match on the product name; every search term must appear.
    pub async fn search(db: &PgPool, text: &str, limit: i64) -> ServiceResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE to_tsvector('simple', name) @@ plainto_tsquery('simple', $1)
            ORDER BY ts_rank(to_tsvector('simple', name), plainto_tsquery('simple', $1)) DESC
            LIMIT $2
            "#
        ))
        .bind(text)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(db: &PgPool, input: &ProductInput) -> ServiceResult<Product> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (name, stock, price)
            VALUES ($1, $2, $3)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(input.stock)
        .bind(input.price)
        .fetch_one(db)
        .await?;
        Ok(product)
    }

    pub async fn update(db: &PgPool, id: Uuid, input: &ProductInput) -> ServiceResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET name = $2, stock = $3, price = $4
             WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.stock)
        .bind(input.price)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> ServiceResult<bool> {
        let res = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Subtracts `item.quantity` from stock only while enough remains, so two
    /// concurrent orders can never drive a product negative.
    pub async fn decrement_stock(
        tx: &mut Transaction<'_, Postgres>,
        item: &LineItem,
    ) -> ServiceResult<()> {
        let remaining = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE products SET stock = stock - $2
             WHERE id = $1 AND stock >= $2
            RETURNING stock
            "#,
        )
        .bind(item.product_id)
        .bind(item.quantity)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(remaining) = remaining {
            debug!(product_id = %item.product_id, quantity = item.quantity, remaining, "stock decremented");
            return Ok(());
        }

        let current = sqlx::query_as::<_, (String, i32)>("SELECT name, stock FROM products WHERE id = $1")
            .bind(item.product_id)
            .fetch_optional(&mut **tx)
            .await?;

        match current {
            None => Err(ServiceError::not_found("product", item.product_id)),
            Some((name, available)) => Err(ServiceError::InsufficientStock {
                product_id: item.product_id,
                name,
                requested: item.quantity,
                available,
            }),
        }
    }
}
