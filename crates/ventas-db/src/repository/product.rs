//! Product repository.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use ventas_core::Product;

use crate::error::{DbError, DbResult};

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub stock: i64,
    pub min_stock: i64,
    pub warranty_months: i64,
}

pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewProduct) -> DbResult<Product> {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: new.sku,
            name: new.name,
            description: new.description,
            category: new.category,
            price_cents: new.price_cents,
            stock: new.stock,
            min_stock: new.min_stock,
            warranty_months: new.warranty_months,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO products
                (id, sku, name, description, category, price_cents, stock,
                 min_stock, warranty_months, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(product.warranty_months)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(product),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(DbError::already_exists("Product", product.sku))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE sku = ?1")
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE is_active = 1 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Products at or below their minimum stock level.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE is_active = 1 AND stock <= min_stock ORDER BY stock",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn laptop() -> NewProduct {
        NewProduct {
            sku: "LAP-001".to_string(),
            name: "Laptop Pro 15".to_string(),
            description: String::new(),
            category: "laptops".to_string(),
            price_cents: 120_000,
            stock: 4,
            min_stock: 2,
            warranty_months: 12,
        }
    }

    #[tokio::test]
    async fn sku_lookup_finds_the_created_product() {
        let db = Database::new(&DbConfig::in_memory()).await.unwrap();
        let created = db.products().create(laptop()).await.unwrap();

        let found = db.products().get_by_sku("LAP-001").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        assert!(db.products().get_by_sku("NOPE-9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deactivated_product_leaves_the_catalog_but_keeps_its_row() {
        let db = Database::new(&DbConfig::in_memory()).await.unwrap();
        let created = db.products().create(laptop()).await.unwrap();

        db.products().deactivate(&created.id).await.unwrap();

        assert!(db.products().list_active().await.unwrap().is_empty());
        let row = db.products().get_by_id(&created.id).await.unwrap().unwrap();
        assert!(!row.is_active);

        let err = db.products().deactivate("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
