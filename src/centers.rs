// Center Store - authoritative current balances for all energy centers

use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};

/// A regional energy storage node with a bounded capacity.
///
/// `stored` is mutated only by the transfer service and always satisfies
/// `0 <= stored <= capacity`; `id`, `name`, and `city` never change after
/// provisioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyCenter {
    pub id: String,
    pub name: String,
    pub city: String,
    pub stored: f64,
    pub capacity: f64,
}

impl EnergyCenter {
    /// Room left before the center hits its capacity bound.
    pub fn free_capacity(&self) -> f64 {
        self.capacity - self.stored
    }
}

fn center_from_row(row: &Row) -> Result<EnergyCenter> {
    Ok(EnergyCenter {
        id: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        stored: row.get(3)?,
        capacity: row.get(4)?,
    })
}

/// Current snapshot of one center, `None` when the id is unknown.
pub fn get_center(conn: &Connection, id: &str) -> Result<Option<EnergyCenter>> {
    conn.query_row(
        "SELECT id, name, city, stored, capacity FROM energy_centers WHERE id = ?1",
        params![id],
        center_from_row,
    )
    .optional()
}

/// All centers, stable order by id.
pub fn list_centers(conn: &Connection) -> Result<Vec<EnergyCenter>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, city, stored, capacity FROM energy_centers ORDER BY id",
    )?;
    let centers = stmt
        .query_map([], center_from_row)?
        .collect::<Result<Vec<_>>>()?;
    Ok(centers)
}

/// Applies `stored += delta` with no bounds checking. The caller must have
/// already validated that the result stays within `[0, capacity]`; the
/// bound depends on the paired operation of a transfer, so the check lives
/// in the transfer service, not here.
pub(crate) fn adjust_stored(conn: &Connection, id: &str, delta: f64) -> Result<()> {
    conn.execute(
        "UPDATE energy_centers SET stored = stored + ?1 WHERE id = ?2",
        params![delta, id],
    )?;
    Ok(())
}
