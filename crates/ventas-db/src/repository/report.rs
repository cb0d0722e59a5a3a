//! Report execution and snapshots.
//!
//! Renders a [`ReportPlan`] to a single SELECT over orders, executes it
//! with a hard preview limit, and freezes the result rows into a snapshot.
//! Exports later re-serve the snapshot; the query is never re-run.
//!
//! Field paths map to fixed column expressions. A path outside the map is
//! rendered verbatim and fails at execution time with a generic query
//! error; the prompt parser is the only producer of paths, so an unknown
//! one is a server bug rather than user input.

use chrono::Utc;
use serde_json::{json, Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool, TypeInfo, ValueRef};
use tracing::debug;
use uuid::Uuid;

use ventas_core::report::{OutputFormat, ReportPlan};
use ventas_core::{ReportSnapshot, REPORT_PREVIEW_LIMIT};

use crate::error::{DbError, DbResult};

/// The SQL a plan rendered to, plus the output column keys in order.
#[derive(Debug, Clone)]
pub struct RenderedQuery {
    pub sql: String,
    pub columns: Vec<String>,
}

/// Fallback projection when every requested path was dropped: all the
/// order's own fields, mirroring a select with no explicit columns.
const ORDER_PROJECTION: [(&str, &str); 7] = [
    ("o.id", "id"),
    ("u.username", "user.username"),
    ("o.status", "status"),
    ("o.total_cents", "total"),
    ("o.shipping_cents", "shipping"),
    ("o.address", "address"),
    ("o.created_at", "created_at"),
];

fn column_expr(path: &str) -> String {
    match path {
        "user.username" => "u.username".to_string(),
        "total" => "o.total_cents".to_string(),
        "created_at" => "o.created_at".to_string(),
        "status" => "o.status".to_string(),
        "payment.method" => "pm.method".to_string(),
        "items.quantity" => "it.quantity".to_string(),
        "items.price" => "it.price_cents".to_string(),
        other => other.to_string(),
    }
}

/// Render a plan to executable SQL. Filter placeholders are emitted in a
/// fixed order; [`ReportRepository::run`] binds values in the same order.
pub fn render(plan: &ReportPlan) -> RenderedQuery {
    let projection: Vec<(String, String)> = if plan.select.is_empty() {
        ORDER_PROJECTION
            .iter()
            .map(|(expr, alias)| (expr.to_string(), alias.to_string()))
            .collect()
    } else {
        plan.select
            .iter()
            .map(|path| (column_expr(path), path.clone()))
            .collect()
    };

    let select_list = projection
        .iter()
        .map(|(expr, alias)| format!("{expr} AS \"{alias}\""))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!(
        "SELECT {select_list} \
         FROM orders o \
         JOIN users u ON u.id = o.user_id \
         LEFT JOIN payments pm ON pm.order_id = o.id"
    );
    if plan.needs_items_join() {
        sql.push_str(" LEFT JOIN order_items it ON it.order_id = o.id");
    }

    let mut clauses: Vec<&str> = Vec::new();
    if plan.filters.date_range.is_some() {
        clauses.push("date(o.created_at) BETWEEN ? AND ?");
    } else if plan.filters.date.is_some() {
        clauses.push("date(o.created_at) = ?");
    }
    if plan.filters.month.is_some() {
        clauses.push("CAST(strftime('%m', o.created_at) AS INTEGER) = ?");
    }
    if plan.filters.year.is_some() {
        clauses.push("CAST(strftime('%Y', o.created_at) AS INTEGER) = ?");
    }
    if plan.filters.status.is_some() {
        clauses.push("o.status = ?");
    }
    if plan.filters.payment_method.is_some() {
        clauses.push("pm.method = ?");
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    sql.push_str(&format!(
        " ORDER BY o.created_at DESC LIMIT {REPORT_PREVIEW_LIMIT}"
    ));

    let columns = projection.into_iter().map(|(_, alias)| alias).collect();
    RenderedQuery { sql, columns }
}

pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Execute a plan and return the preview rows as JSON objects keyed by
    /// the requested field paths.
    pub async fn run(&self, plan: &ReportPlan) -> DbResult<(Vec<Value>, RenderedQuery)> {
        let rendered = render(plan);
        debug!(sql = %rendered.sql, "running report query");

        let mut query = sqlx::query(&rendered.sql);
        if let Some((start, end)) = plan.filters.date_range {
            query = query.bind(start).bind(end);
        } else if let Some(date) = plan.filters.date {
            query = query.bind(date);
        }
        if let Some(month) = plan.filters.month {
            query = query.bind(i64::from(month));
        }
        if let Some(year) = plan.filters.year {
            query = query.bind(i64::from(year));
        }
        if let Some(status) = plan.filters.status {
            query = query.bind(status);
        }
        if let Some(method) = plan.filters.payment_method {
            query = query.bind(method);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::ReportQuery(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut object = Map::with_capacity(rendered.columns.len());
            for (idx, key) in rendered.columns.iter().enumerate() {
                object.insert(key.clone(), cell_to_json(row, idx)?);
            }
            out.push(Value::Object(object));
        }

        Ok((out, rendered))
    }

    /// Freeze result rows into an immutable snapshot.
    pub async fn save_snapshot(
        &self,
        prompt: &str,
        rendered: &RenderedQuery,
        rows: &[Value],
        format: OutputFormat,
    ) -> DbResult<ReportSnapshot> {
        let rows_json = serde_json::to_string(rows)
            .map_err(|e| DbError::Internal(format!("snapshot serialization: {e}")))?;

        let snapshot = ReportSnapshot {
            id: Uuid::new_v4().to_string(),
            prompt: prompt.to_string(),
            query_description: rendered.sql.clone(),
            rows_json,
            row_count: rows.len() as i64,
            format: format.as_str().to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO report_snapshots
                (id, prompt, query_description, rows_json, row_count, format, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&snapshot.id)
        .bind(&snapshot.prompt)
        .bind(&snapshot.query_description)
        .bind(&snapshot.rows_json)
        .bind(snapshot.row_count)
        .bind(&snapshot.format)
        .bind(snapshot.created_at)
        .execute(&self.pool)
        .await?;

        Ok(snapshot)
    }

    pub async fn get_snapshot(&self, id: &str) -> DbResult<Option<ReportSnapshot>> {
        let snapshot =
            sqlx::query_as::<_, ReportSnapshot>("SELECT * FROM report_snapshots WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(snapshot)
    }
}

/// Decode one result cell into JSON by its storage class. Report columns
/// are dynamic, so there is no static type to decode into.
fn cell_to_json(row: &SqliteRow, idx: usize) -> DbResult<Value> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let value = match raw.type_info().name() {
        "INTEGER" => json!(row.try_get::<i64, _>(idx)?),
        "REAL" => json!(row.try_get::<f64, _>(idx)?),
        _ => json!(row.try_get::<String, _>(idx)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{DateTime, TimeZone};
    use ventas_core::report::{build_plan, parse_prompt_with_year};
    use ventas_core::{OrderStatus, PaymentMethod, PaymentStatus};

    async fn seed_order(
        db: &Database,
        username: &str,
        total_cents: i64,
        created_at: DateTime<Utc>,
    ) -> String {
        let user = db.orders().ensure_user(username).await.unwrap();
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO orders
                (id, user_id, status, total_cents, shipping_cents, address,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 1000, '', ?5, ?5)
            "#,
        )
        .bind(&id)
        .bind(&user.id)
        .bind(OrderStatus::Paid)
        .bind(total_cents)
        .bind(created_at)
        .execute(db.pool())
        .await
        .unwrap();
        id
    }

    async fn seed_payment(db: &Database, order_id: &str, method: PaymentMethod) {
        sqlx::query(
            r#"
            INSERT INTO payments
                (id, order_id, method, status, amount_cents, transaction_id, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, 'txn', ?5)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(order_id)
        .bind(method)
        .bind(PaymentStatus::Approved)
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();
    }

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn month_and_year_filters_match_calendar_fields() {
        let db = Database::new(&DbConfig::in_memory()).await.unwrap();
        seed_order(&db, "maria", 5_000, at(2024, 11, 15)).await;
        seed_order(&db, "maria", 7_000, at(2024, 12, 1)).await;
        seed_order(&db, "maria", 9_000, at(2025, 11, 3)).await;

        let plan = build_plan(&parse_prompt_with_year("ventas de noviembre del 2024", 2026));
        let (rows, _) = db.reports().run(&plan).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["total"], json!(5_000));
        assert_eq!(rows[0]["user.username"], json!("maria"));
    }

    #[tokio::test]
    async fn date_range_is_inclusive() {
        let db = Database::new(&DbConfig::in_memory()).await.unwrap();
        seed_order(&db, "pedro", 1_000, at(2024, 1, 31)).await;
        seed_order(&db, "pedro", 2_000, at(2024, 2, 10)).await;

        let plan = build_plan(&parse_prompt_with_year(
            "ventas entre 01/01/2024 y 31/01/2024",
            2026,
        ));
        let (rows, _) = db.reports().run(&plan).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["total"], json!(1_000));
    }

    #[tokio::test]
    async fn payment_method_filter_joins_payments() {
        let db = Database::new(&DbConfig::in_memory()).await.unwrap();
        let with_stripe = seed_order(&db, "luz", 3_000, at(2024, 5, 2)).await;
        let with_paypal = seed_order(&db, "luz", 4_000, at(2024, 5, 3)).await;
        seed_payment(&db, &with_stripe, PaymentMethod::Stripe).await;
        seed_payment(&db, &with_paypal, PaymentMethod::Paypal).await;

        let plan = build_plan(&parse_prompt_with_year("ventas con stripe", 2026));
        let (rows, _) = db.reports().run(&plan).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["total"], json!(3_000));
    }

    #[tokio::test]
    async fn preview_is_capped() {
        let db = Database::new(&DbConfig::in_memory()).await.unwrap();
        for i in 0..105 {
            seed_order(&db, "bulk", i, at(2024, 6, 1)).await;
        }
        let plan = build_plan(&parse_prompt_with_year("ventas", 2026));
        let (rows, _) = db.reports().run(&plan).await.unwrap();
        assert_eq!(rows.len() as i64, REPORT_PREVIEW_LIMIT);
    }

    #[tokio::test]
    async fn snapshot_roundtrip_preserves_rows() {
        let db = Database::new(&DbConfig::in_memory()).await.unwrap();
        seed_order(&db, "sara", 8_000, at(2024, 3, 9)).await;

        let plan = build_plan(&parse_prompt_with_year("ventas", 2026));
        let (rows, rendered) = db.reports().run(&plan).await.unwrap();
        let snapshot = db
            .reports()
            .save_snapshot("ventas", &rendered, &rows, plan.format)
            .await
            .unwrap();

        let loaded = db
            .reports()
            .get_snapshot(&snapshot.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.row_count, 1);
        assert_eq!(loaded.format, "json");
        let restored: Vec<Value> = serde_json::from_str(&loaded.rows_json).unwrap();
        assert_eq!(restored, rows);
    }

    #[tokio::test]
    async fn unknown_field_path_fails_at_execution() {
        let db = Database::new(&DbConfig::in_memory()).await.unwrap();
        let mut plan = build_plan(&parse_prompt_with_year("ventas", 2026));
        plan.select = vec!["imaginary.column".to_string()];

        let err = db.reports().run(&plan).await.unwrap_err();
        assert!(matches!(err, DbError::ReportQuery(_)));
    }

    #[test]
    fn render_defaults() {
        let plan = build_plan(&parse_prompt_with_year("ventas", 2026));
        let rendered = render(&plan);
        assert!(rendered.sql.starts_with(
            "SELECT u.username AS \"user.username\", o.total_cents AS \"total\", \
             o.created_at AS \"created_at\""
        ));
        assert!(!rendered.sql.contains("order_items"));
        assert!(rendered.sql.ends_with("LIMIT 100"));
        assert_eq!(rendered.columns, vec!["user.username", "total", "created_at"]);
    }

    #[test]
    fn render_month_and_year_filters() {
        let plan = build_plan(&parse_prompt_with_year("ventas de noviembre", 2026));
        let rendered = render(&plan);
        assert!(rendered
            .sql
            .contains("CAST(strftime('%m', o.created_at) AS INTEGER) = ?"));
        assert!(rendered
            .sql
            .contains("CAST(strftime('%Y', o.created_at) AS INTEGER) = ?"));
    }

    #[test]
    fn render_items_join_when_needed() {
        let plan = build_plan(&parse_prompt_with_year("cantidad y precio", 2026));
        let rendered = render(&plan);
        assert!(rendered
            .sql
            .contains("LEFT JOIN order_items it ON it.order_id = o.id"));
    }

    #[test]
    fn render_range_takes_precedence_over_day() {
        let plan = build_plan(&parse_prompt_with_year(
            "entre 01/01/2024 y 31/01/2024",
            2026,
        ));
        let rendered = render(&plan);
        assert!(rendered
            .sql
            .contains("date(o.created_at) BETWEEN ? AND ?"));
        assert!(!rendered.sql.contains("date(o.created_at) = ?"));
    }
}
