// Transfer Service - validated, atomic movement of stored energy between
// two centers. The one operation in the system that mutates balances.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::centers::{self, EnergyCenter};
use crate::ledger::{self, Transfer};

/// Raw transfer request as received on the wire. Every field is optional
/// and the amount may arrive as a JSON number or a numeric string; nothing
/// is trusted until [`TransferRequest::validate`] has run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferRequest {
    #[serde(default)]
    pub from_center: Option<String>,
    #[serde(default)]
    pub to_center: Option<String>,
    #[serde(default)]
    pub amount: Option<Amount>,
}

/// Accepts `500` and `"500"` alike; form-driven clients send both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Amount::Number(n) => Some(*n),
            Amount::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl TransferRequest {
    pub fn new(from_center: impl Into<String>, to_center: impl Into<String>, amount: f64) -> Self {
        TransferRequest {
            from_center: Some(from_center.into()),
            to_center: Some(to_center.into()),
            amount: Some(Amount::Number(amount)),
        }
    }

    /// Payload-level preconditions: both ids present and non-empty, amount
    /// a finite positive number, source distinct from destination. Total
    /// over all inputs; every failure maps to a named error and nothing
    /// panics. Existence and balance checks need store access and happen
    /// inside [`execute_transfer`].
    pub fn validate(&self) -> Result<ValidTransfer, TransferError> {
        let from = self.from_center.as_deref().unwrap_or("").trim();
        let to = self.to_center.as_deref().unwrap_or("").trim();
        let amount = self.amount.as_ref().and_then(Amount::as_f64);

        let amount = match amount {
            Some(a) if a.is_finite() && a > 0.0 => a,
            _ => return Err(TransferError::InvalidPayload),
        };
        if from.is_empty() || to.is_empty() {
            return Err(TransferError::InvalidPayload);
        }
        if from == to {
            return Err(TransferError::SameCenter);
        }

        Ok(ValidTransfer {
            from_center: from.to_string(),
            to_center: to.to_string(),
            amount,
        })
    }
}

/// A request that passed the payload-level checks. Existence and balance
/// preconditions are still pending.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTransfer {
    pub from_center: String,
    pub to_center: String,
    pub amount: f64,
}

/// The committed record plus post-commit snapshots of both centers, so the
/// caller can render the new state without a second read.
#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    pub transfer: Transfer,
    pub centers: TransferCenters,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferCenters {
    pub from: EnergyCenter,
    pub to: EnergyCenter,
}

/// Why a transfer was rejected. Every variant except `Storage` is a
/// client-input error: terminal for that request and harmless to the
/// store. `Storage` covers write faults, after which the transaction has
/// rolled back and the store is unchanged.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Invalid transfer payload")]
    InvalidPayload,
    #[error("Source and destination centers must differ")]
    SameCenter,
    #[error("{}", render_missing(.missing))]
    CenterNotFound { missing: Vec<String> },
    #[error("Insufficient stored energy in source center")]
    InsufficientSource,
    #[error("Destination center capacity is insufficient")]
    InsufficientCapacity,
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl TransferError {
    /// Stable machine-readable name for logs and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::InvalidPayload => "invalid_payload",
            TransferError::SameCenter => "same_center",
            TransferError::CenterNotFound { .. } => "center_not_found",
            TransferError::InsufficientSource => "insufficient_source",
            TransferError::InsufficientCapacity => "insufficient_capacity",
            TransferError::Storage(_) => "storage",
        }
    }
}

fn render_missing(missing: &[String]) -> String {
    match missing {
        [one] => format!("Center {one} not found"),
        [a, b] => format!("Centers {a} and {b} not found"),
        _ => "One or both centers not found".to_string(),
    }
}

/// Executes one transfer as an atomic, validated unit of work.
///
/// The five preconditions run in order, each with its own error and no
/// partial effects. Only when all hold does the service apply the three
/// mutations (decrement source, increment destination, append the ledger
/// record) as a single rusqlite transaction. Dropping the transaction on
/// any error path rolls everything back, so total stored energy across
/// all centers is conserved by every outcome.
///
/// Callers serialize access through the shared connection lock, so the
/// whole read-validate-write sequence is observed atomically by any
/// concurrent transfer (see the server state in `api`).
pub fn execute_transfer(
    conn: &mut Connection,
    request: &TransferRequest,
) -> Result<TransferOutcome, TransferError> {
    match run(conn, request) {
        Ok(outcome) => {
            info!(
                transfer = %outcome.transfer.id,
                from = %outcome.transfer.from_center,
                to = %outcome.transfer.to_center,
                amount = outcome.transfer.amount,
                "transfer committed"
            );
            Ok(outcome)
        }
        Err(err) => {
            match &err {
                TransferError::Storage(cause) => {
                    error!(error = %cause, "transfer aborted by storage failure");
                }
                _ => warn!(kind = err.kind(), "transfer rejected"),
            }
            Err(err)
        }
    }
}

fn run(conn: &mut Connection, request: &TransferRequest) -> Result<TransferOutcome, TransferError> {
    let valid = request.validate()?;

    let tx = conn.transaction()?;

    let from = centers::get_center(&tx, &valid.from_center)?;
    let to = centers::get_center(&tx, &valid.to_center)?;
    let (from, to) = match (from, to) {
        (Some(from), Some(to)) => (from, to),
        (from, to) => {
            let mut missing = Vec::new();
            if from.is_none() {
                missing.push(valid.from_center.clone());
            }
            if to.is_none() {
                missing.push(valid.to_center.clone());
            }
            return Err(TransferError::CenterNotFound { missing });
        }
    };

    if from.stored < valid.amount {
        return Err(TransferError::InsufficientSource);
    }
    if to.free_capacity() < valid.amount {
        return Err(TransferError::InsufficientCapacity);
    }

    centers::adjust_stored(&tx, &from.id, -valid.amount)?;
    centers::adjust_stored(&tx, &to.id, valid.amount)?;

    let record = Transfer::new(&from.id, &to.id, valid.amount);
    ledger::append_transfer(&tx, &record)?;

    // Snapshots read inside the same transaction, so they are exactly what
    // the commit makes durable.
    let from_after = require_center(&tx, &from.id)?;
    let to_after = require_center(&tx, &to.id)?;

    tx.commit()?;

    Ok(TransferOutcome {
        transfer: record,
        centers: TransferCenters {
            from: from_after,
            to: to_after,
        },
    })
}

fn require_center(conn: &Connection, id: &str) -> Result<EnergyCenter, TransferError> {
    centers::get_center(conn, id)?.ok_or_else(|| TransferError::CenterNotFound {
        missing: vec![id.to_string()],
    })
}
