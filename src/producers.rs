// Producer registry - generation sites selling surplus through a center.

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub producer_type: String,
    pub city: String,
    pub center_id: String,
    pub price_per_unit: f64,
    pub units_available: f64,
    pub earnings: f64,
    pub created_at: String,
}

/// Registration payload. `name`, `type`, `city` and `center_id` are
/// required; the numeric fields default to zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProducer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub producer_type: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub center_id: Option<String>,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
    #[serde(default)]
    pub units_available: Option<f64>,
    #[serde(default)]
    pub earnings: Option<f64>,
}

impl NewProducer {
    /// Builds the full record, or `None` when a required field is missing
    /// or blank.
    pub fn into_producer(self) -> Option<Producer> {
        let required = |field: Option<String>| {
            field.filter(|value| !value.trim().is_empty())
        };

        Some(Producer {
            id: Uuid::new_v4().to_string(),
            name: required(self.name)?,
            producer_type: required(self.producer_type)?,
            city: required(self.city)?,
            center_id: required(self.center_id)?,
            price_per_unit: self.price_per_unit.unwrap_or(0.0),
            units_available: self.units_available.unwrap_or(0.0),
            earnings: self.earnings.unwrap_or(0.0),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

/// Partial update; absent fields keep their stored values. Name and
/// creation time never change after registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProducerUpdate {
    #[serde(default, rename = "type")]
    pub producer_type: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub center_id: Option<String>,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
    #[serde(default)]
    pub units_available: Option<f64>,
    #[serde(default)]
    pub earnings: Option<f64>,
}

fn producer_from_row(row: &Row) -> Result<Producer> {
    Ok(Producer {
        id: row.get(0)?,
        name: row.get(1)?,
        producer_type: row.get(2)?,
        city: row.get(3)?,
        center_id: row.get(4)?,
        price_per_unit: row.get(5)?,
        units_available: row.get(6)?,
        earnings: row.get(7)?,
        created_at: row.get(8)?,
    })
}

pub fn list_producers(conn: &Connection) -> Result<Vec<Producer>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, type, city, center_id, price_per_unit,
                units_available, earnings, created_at
         FROM producers
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map([], producer_from_row)?;
    rows.collect()
}

pub fn get_producer(conn: &Connection, id: &str) -> Result<Option<Producer>> {
    conn.query_row(
        "SELECT id, name, type, city, center_id, price_per_unit,
                units_available, earnings, created_at
         FROM producers WHERE id = ?1",
        params![id],
        producer_from_row,
    )
    .optional()
}

pub fn insert_producer(conn: &Connection, producer: &Producer) -> Result<()> {
    conn.execute(
        "INSERT INTO producers (
            id, name, type, city, center_id,
            price_per_unit, units_available, earnings, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            producer.id,
            producer.name,
            producer.producer_type,
            producer.city,
            producer.center_id,
            producer.price_per_unit,
            producer.units_available,
            producer.earnings,
            producer.created_at,
        ],
    )?;
    Ok(())
}

/// Applies a partial update and returns the refreshed row, or `None` when
/// no producer has this id.
pub fn update_producer(
    conn: &Connection,
    id: &str,
    update: &ProducerUpdate,
) -> Result<Option<Producer>> {
    let Some(existing) = get_producer(conn, id)? else {
        return Ok(None);
    };

    let producer_type = update
        .producer_type
        .clone()
        .unwrap_or(existing.producer_type);
    let city = update.city.clone().unwrap_or(existing.city);
    let center_id = update.center_id.clone().unwrap_or(existing.center_id);
    let price_per_unit = update.price_per_unit.unwrap_or(existing.price_per_unit);
    let units_available = update.units_available.unwrap_or(existing.units_available);
    let earnings = update.earnings.unwrap_or(existing.earnings);

    conn.execute(
        "UPDATE producers
         SET type = ?1, city = ?2, center_id = ?3,
             price_per_unit = ?4, units_available = ?5, earnings = ?6
         WHERE id = ?7",
        params![
            producer_type,
            city,
            center_id,
            price_per_unit,
            units_available,
            earnings,
            id,
        ],
    )?;

    get_producer(conn, id)
}
