// Consumer registry - households and businesses drawing energy from a
// center. Registration rows are immutable except for the usage/bill pair.

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumer {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub consumer_type: String,
    pub city: String,
    pub address: String,
    pub center_id: String,
    pub price_per_unit: f64,
    pub monthly_usage: f64,
    pub monthly_bill: f64,
    pub connection_cost: f64,
    pub created_at: String,
}

/// Registration payload. `name`, `type`, `city`, `address` and `center_id`
/// are required; the numeric fields default to zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewConsumer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub consumer_type: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub center_id: Option<String>,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
    #[serde(default)]
    pub monthly_usage: Option<f64>,
    #[serde(default)]
    pub monthly_bill: Option<f64>,
    #[serde(default)]
    pub connection_cost: Option<f64>,
}

impl NewConsumer {
    /// Builds the full record, or `None` when a required field is missing
    /// or blank.
    pub fn into_consumer(self) -> Option<Consumer> {
        let required = |field: Option<String>| {
            field.filter(|value| !value.trim().is_empty())
        };

        Some(Consumer {
            id: Uuid::new_v4().to_string(),
            name: required(self.name)?,
            consumer_type: required(self.consumer_type)?,
            city: required(self.city)?,
            address: required(self.address)?,
            center_id: required(self.center_id)?,
            price_per_unit: self.price_per_unit.unwrap_or(0.0),
            monthly_usage: self.monthly_usage.unwrap_or(0.0),
            monthly_bill: self.monthly_bill.unwrap_or(0.0),
            connection_cost: self.connection_cost.unwrap_or(0.0),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

/// Partial update for the two fields that change month to month. Absent
/// fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsumerUsageUpdate {
    #[serde(default)]
    pub monthly_usage: Option<f64>,
    #[serde(default)]
    pub monthly_bill: Option<f64>,
}

fn consumer_from_row(row: &Row) -> Result<Consumer> {
    Ok(Consumer {
        id: row.get(0)?,
        name: row.get(1)?,
        consumer_type: row.get(2)?,
        city: row.get(3)?,
        address: row.get(4)?,
        center_id: row.get(5)?,
        price_per_unit: row.get(6)?,
        monthly_usage: row.get(7)?,
        monthly_bill: row.get(8)?,
        connection_cost: row.get(9)?,
        created_at: row.get(10)?,
    })
}

pub fn list_consumers(conn: &Connection) -> Result<Vec<Consumer>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, type, city, address, center_id, price_per_unit,
                monthly_usage, monthly_bill, connection_cost, created_at
         FROM consumers
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map([], consumer_from_row)?;
    rows.collect()
}

pub fn get_consumer(conn: &Connection, id: &str) -> Result<Option<Consumer>> {
    conn.query_row(
        "SELECT id, name, type, city, address, center_id, price_per_unit,
                monthly_usage, monthly_bill, connection_cost, created_at
         FROM consumers WHERE id = ?1",
        params![id],
        consumer_from_row,
    )
    .optional()
}

pub fn insert_consumer(conn: &Connection, consumer: &Consumer) -> Result<()> {
    conn.execute(
        "INSERT INTO consumers (
            id, name, type, city, address, center_id,
            price_per_unit, monthly_usage, monthly_bill, connection_cost, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            consumer.id,
            consumer.name,
            consumer.consumer_type,
            consumer.city,
            consumer.address,
            consumer.center_id,
            consumer.price_per_unit,
            consumer.monthly_usage,
            consumer.monthly_bill,
            consumer.connection_cost,
            consumer.created_at,
        ],
    )?;
    Ok(())
}

/// Applies a partial usage update and returns the refreshed row, or `None`
/// when no consumer has this id.
pub fn update_consumer_usage(
    conn: &Connection,
    id: &str,
    update: &ConsumerUsageUpdate,
) -> Result<Option<Consumer>> {
    let Some(existing) = get_consumer(conn, id)? else {
        return Ok(None);
    };

    let monthly_usage = update.monthly_usage.unwrap_or(existing.monthly_usage);
    let monthly_bill = update.monthly_bill.unwrap_or(existing.monthly_bill);
    conn.execute(
        "UPDATE consumers SET monthly_usage = ?1, monthly_bill = ?2 WHERE id = ?3",
        params![monthly_usage, monthly_bill, id],
    )?;

    get_consumer(conn, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_database;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn sample(name: &str) -> NewConsumer {
        NewConsumer {
            name: Some(name.to_string()),
            consumer_type: Some("Household".to_string()),
            city: Some("Delhi".to_string()),
            address: Some("12 Ring Road".to_string()),
            center_id: Some("EC001".to_string()),
            price_per_unit: Some(6.5),
            monthly_usage: None,
            monthly_bill: None,
            connection_cost: Some(5000.0),
        }
    }

    #[test]
    fn registration_requires_identity_fields() {
        assert!(NewConsumer::default().into_consumer().is_none());

        let mut missing_city = sample("Asha Rao");
        missing_city.city = None;
        assert!(missing_city.into_consumer().is_none());

        let mut blank_address = sample("Asha Rao");
        blank_address.address = Some("   ".to_string());
        assert!(blank_address.into_consumer().is_none());
    }

    #[test]
    fn registration_defaults_numeric_fields_to_zero() {
        let consumer = sample("Asha Rao").into_consumer().unwrap();
        assert_eq!(consumer.monthly_usage, 0.0);
        assert_eq!(consumer.monthly_bill, 0.0);
        assert_eq!(consumer.price_per_unit, 6.5);
        assert!(!consumer.id.is_empty());
        assert!(consumer.created_at.ends_with('Z'));
    }

    #[test]
    fn insert_then_list_returns_newest_first() {
        let conn = test_conn();

        let mut first = sample("Asha Rao").into_consumer().unwrap();
        first.created_at = "2026-01-01T00:00:00.000Z".to_string();
        let mut second = sample("Vikram Shah").into_consumer().unwrap();
        second.created_at = "2026-01-02T00:00:00.000Z".to_string();
        insert_consumer(&conn, &first).unwrap();
        insert_consumer(&conn, &second).unwrap();

        let listed = list_consumers(&conn).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Vikram Shah");
        assert_eq!(listed[1].name, "Asha Rao");
    }

    #[test]
    fn usage_update_changes_only_supplied_fields() {
        let conn = test_conn();
        let consumer = sample("Asha Rao").into_consumer().unwrap();
        insert_consumer(&conn, &consumer).unwrap();

        let update = ConsumerUsageUpdate {
            monthly_usage: Some(320.0),
            monthly_bill: None,
        };
        let updated = update_consumer_usage(&conn, &consumer.id, &update)
            .unwrap()
            .unwrap();

        assert_eq!(updated.monthly_usage, 320.0);
        assert_eq!(updated.monthly_bill, consumer.monthly_bill);
        assert_eq!(updated.name, consumer.name);
    }

    #[test]
    fn usage_update_of_unknown_consumer_returns_none() {
        let conn = test_conn();
        let update = ConsumerUsageUpdate {
            monthly_usage: Some(10.0),
            monthly_bill: Some(80.0),
        };
        assert!(update_consumer_usage(&conn, "nope", &update)
            .unwrap()
            .is_none());
    }
}
