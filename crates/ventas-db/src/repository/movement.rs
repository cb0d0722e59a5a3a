//! Inventory movement repository.
//!
//! A movement is recorded and the stock counter updated in one transaction.
//! The debit UPDATE carries `AND stock >= ?`, which is the only thing that
//! keeps two concurrent debits from jointly taking the counter negative.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use ventas_core::{InventoryMovement, MovementDirection};

use crate::error::{DbError, DbResult};

/// Input for recording a movement.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub product_id: String,
    pub direction: MovementDirection,
    pub quantity: i64,
    pub reason: String,
    pub actor: Option<String>,
}

pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a movement and adjust the product counter atomically.
    ///
    /// Returns the ledger row together with the stock level after the
    /// movement. A debit that would overdraw the counter fails without
    /// writing anything.
    pub async fn record(&self, new: NewMovement) -> DbResult<(InventoryMovement, i64)> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let update_sql = match new.direction {
            MovementDirection::In => {
                "UPDATE products SET stock = stock + ?1, updated_at = ?3 WHERE id = ?2"
            }
            MovementDirection::Out => {
                "UPDATE products SET stock = stock - ?1, updated_at = ?3 \
                 WHERE id = ?2 AND stock >= ?1"
            }
        };

        let result = sqlx::query(update_sql)
            .bind(new.quantity)
            .bind(&new.product_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // Either the product does not exist or the guard refused the
            // debit. Read the counter to report which.
            let stock: Option<i64> =
                sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                    .bind(&new.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            return match stock {
                None => Err(DbError::not_found("Product", new.product_id)),
                Some(available) => Err(DbError::InsufficientStock {
                    product_id: new.product_id,
                    available,
                    requested: new.quantity,
                }),
            };
        }

        let movement = InventoryMovement {
            id: Uuid::new_v4().to_string(),
            product_id: new.product_id,
            direction: new.direction,
            quantity: new.quantity,
            reason: new.reason,
            actor: new.actor,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO inventory_movements
                (id, product_id, direction, quantity, reason, actor, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.product_id)
        .bind(movement.direction)
        .bind(movement.quantity)
        .bind(&movement.reason)
        .bind(&movement.actor)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await?;

        let stock_after: i64 = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(&movement.product_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((movement, stock_after))
    }

    /// Movement history for a product, newest first.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(
            "SELECT * FROM inventory_movements WHERE product_id = ?1 ORDER BY created_at DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::NewProduct;
    use ventas_core::Product;

    async fn setup() -> (Database, Product) {
        let db = Database::new(&DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .create(NewProduct {
                sku: "SKU-001".into(),
                name: "Teclado mecánico".into(),
                description: String::new(),
                category: "periféricos".into(),
                price_cents: 4_999,
                stock: 5,
                min_stock: 1,
                warranty_months: 12,
            })
            .await
            .unwrap();
        (db, product)
    }

    fn movement(product: &Product, direction: MovementDirection, quantity: i64) -> NewMovement {
        NewMovement {
            product_id: product.id.clone(),
            direction,
            quantity,
            reason: "test".into(),
            actor: Some("almacén".into()),
        }
    }

    #[tokio::test]
    async fn in_and_out_update_counter_and_ledger() {
        let (db, product) = setup().await;
        let movements = db.movements();

        let (_, stock) = movements
            .record(movement(&product, MovementDirection::In, 10))
            .await
            .unwrap();
        assert_eq!(stock, 15);

        let (_, stock) = movements
            .record(movement(&product, MovementDirection::Out, 4))
            .await
            .unwrap();
        assert_eq!(stock, 11);

        let history = movements.list_for_product(&product.id).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn overdraw_is_refused_and_writes_nothing() {
        let (db, product) = setup().await;

        let err = db
            .movements()
            .record(movement(&product, MovementDirection::Out, 6))
            .await
            .unwrap_err();
        match err {
            DbError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Counter untouched, no ledger row.
        let current = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(current.stock, 5);
        assert!(db
            .movements()
            .list_for_product(&product.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let (db, product) = setup().await;
        let err = db
            .movements()
            .record(NewMovement {
                product_id: "missing".into(),
                ..movement(&product, MovementDirection::In, 1)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn concurrent_debits_cannot_jointly_overdraw() {
        let (db, product) = setup().await;
        let a = db.movements();
        let b = db.movements();

        // Stock is 5; two debits of 3 cannot both succeed.
        let (ra, rb) = tokio::join!(
            a.record(movement(&product, MovementDirection::Out, 3)),
            b.record(movement(&product, MovementDirection::Out, 3)),
        );
        let successes = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        let current = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(current.stock, 2);
    }
}
