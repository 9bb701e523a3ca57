//! Executes rendered read plans and converts dynamic rows to JSON;
//! field-limited plans do not map onto a fixed struct.

use crate::database::query::SqlPlan;
use crate::error::Result;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row};

pub async fn fetch_json(pool: &PgPool, plan: &SqlPlan) -> Result<Vec<Value>> {
    tracing::debug!(sql = %plan.sql, binds = ?plan.binds, "list query");
    let mut query = sqlx::query(&plan.sql);
    for bind in &plan.binds {
        query = query.bind(bind);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_json).collect())
}

pub fn row_to_json(row: &PgRow) -> Value {
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<rust_decimal::Decimal>, _>(name) {
        return Value::String(d.to_string());
    }
    if let Ok(Some(dates)) = row.try_get::<Option<Vec<chrono::DateTime<chrono::Utc>>>, _>(name) {
        return Value::Array(dates.iter().map(|d| Value::String(d.to_rfc3339())).collect());
    }
    if let Ok(Some(items)) = row.try_get::<Option<Vec<String>>, _>(name) {
        return Value::Array(items.into_iter().map(Value::String).collect());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
