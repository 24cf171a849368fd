// Transfer Ledger - append-only history of committed transfers

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, Result};
use serde::{Deserialize, Serialize};

/// One committed movement of energy between two centers.
///
/// Written exactly once at the moment a transfer commits, never mutated or
/// deleted afterward. `from_center`/`to_center` are weak references: the
/// record outlives any center it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub from_center: String,
    pub to_center: String,
    pub amount: f64,
    pub created_at: String,
}

impl Transfer {
    /// Builds the record for a transfer committing right now, with a fresh
    /// id and an RFC 3339 UTC timestamp (millisecond precision, matching
    /// the wire format the frontend already parses).
    pub fn new(from_center: &str, to_center: &str, amount: f64) -> Self {
        Transfer {
            id: uuid::Uuid::new_v4().to_string(),
            from_center: from_center.to_string(),
            to_center: to_center.to_string(),
            amount,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Appends a committed transfer to the ledger. This is the last step of an
/// already-validated unit of work; it never fails for well-formed input.
pub fn append_transfer(conn: &Connection, transfer: &Transfer) -> Result<()> {
    conn.execute(
        "INSERT INTO transfers (id, from_center, to_center, amount, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            transfer.id,
            transfer.from_center,
            transfer.to_center,
            transfer.amount,
            transfer.created_at,
        ],
    )?;
    Ok(())
}

/// Full transfer history, most recent first. Identical timestamps fall
/// back to insertion order with the newest insert first, so the listing
/// stays deterministic at millisecond resolution.
pub fn list_transfers(conn: &Connection) -> Result<Vec<Transfer>> {
    let mut stmt = conn.prepare(
        "SELECT id, from_center, to_center, amount, created_at
         FROM transfers
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let transfers = stmt
        .query_map([], |row| {
            Ok(Transfer {
                id: row.get(0)?,
                from_center: row.get(1)?,
                to_center: row.get(2)?,
                amount: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(transfers)
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

    fn record(id: &str, created_at: &str) -> Transfer {
        Transfer {
            id: id.to_string(),
            from_center: "EC001".to_string(),
            to_center: "EC002".to_string(),
            amount: 100.0,
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn new_transfer_gets_unique_id_and_timestamp() {
        let a = Transfer::new("EC001", "EC002", 500.0);
        let b = Transfer::new("EC001", "EC002", 500.0);

        assert_ne!(a.id, b.id);
        assert_eq!(a.amount, 500.0);
        assert!(a.created_at.ends_with('Z'));
    }

    #[test]
    fn list_orders_by_created_at_descending() {
        let conn = test_conn();
        append_transfer(&conn, &record("t1", "2024-01-01T10:00:00.000Z")).unwrap();
        append_transfer(&conn, &record("t2", "2024-01-02T10:00:00.000Z")).unwrap();
        append_transfer(&conn, &record("t3", "2024-01-01T09:00:00.000Z")).unwrap();

        let transfers = list_transfers(&conn).unwrap();
        let ids: Vec<&str> = transfers.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t2", "t1", "t3"]);
    }

    #[test]
    fn identical_timestamps_break_by_insertion_order_newest_first() {
        let conn = test_conn();
        let ts = "2024-03-05T12:00:00.000Z";
        append_transfer(&conn, &record("first", ts)).unwrap();
        append_transfer(&conn, &record("second", ts)).unwrap();

        let transfers = list_transfers(&conn).unwrap();
        assert_eq!(transfers[0].id, "second");
        assert_eq!(transfers[1].id, "first");
    }
}
