use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::info;

/// The four regional centers provisioned on first startup:
/// (id, name, city, stored, capacity).
const CENTER_SEED: [(&str, &str, &str, f64, f64); 4] = [
    ("EC001", "SolarHub North", "Delhi", 4200.0, 6000.0),
    ("EC002", "WindCore East", "Kolkata", 2800.0, 5000.0),
    ("EC003", "BioGreen South", "Chennai", 3600.0, 4500.0),
    ("EC004", "HydroBase West", "Mumbai", 5100.0, 7000.0),
];

/// Opens (or creates) the database file and ensures the schema exists.
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Energy Centers Table (authoritative balances, mutated only by transfers)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS energy_centers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            city TEXT NOT NULL,
            stored REAL NOT NULL,
            capacity REAL NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Transfers Table (append-only audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS transfers (
            id TEXT PRIMARY KEY,
            from_center TEXT NOT NULL,
            to_center TEXT NOT NULL,
            amount REAL NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Consumers Table (registration records)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS consumers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            city TEXT NOT NULL,
            address TEXT NOT NULL,
            center_id TEXT NOT NULL,
            price_per_unit REAL NOT NULL,
            monthly_usage REAL NOT NULL,
            monthly_bill REAL NOT NULL,
            connection_cost REAL NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Producers Table (supply listings)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS producers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            city TEXT NOT NULL,
            center_id TEXT NOT NULL,
            price_per_unit REAL NOT NULL,
            units_available REAL NOT NULL,
            earnings REAL NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transfers_created_at ON transfers(created_at)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_consumers_created_at ON consumers(created_at)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_producers_created_at ON producers(created_at)",
        [],
    )?;

    Ok(())
}

/// Inserts the four demo centers if the table is empty. Returns whether
/// seeding happened, so callers can log it. Re-running against a database
/// that already has centers is a no-op, which keeps restarts idempotent.
pub fn seed_energy_centers_if_empty(conn: &mut Connection) -> Result<bool> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM energy_centers", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(false);
    }

    let tx = conn.transaction()?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO energy_centers (id, name, city, stored, capacity)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (id, name, city, stored, capacity) in CENTER_SEED {
            insert.execute(params![id, name, city, stored, capacity])?;
        }
    }
    tx.commit()?;

    info!(centers = CENTER_SEED.len(), "seeded energy centers");
    Ok(true)
}
