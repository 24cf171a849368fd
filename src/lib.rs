// VoltGrid - Decentralized Energy Marketplace Core
// Exposes all modules for use in the API server and tests

pub mod api;
pub mod assistant;
pub mod centers;
pub mod config;
pub mod consumers;
pub mod db;
pub mod ledger;
pub mod producers;
pub mod quote;
pub mod transfer;

// Re-export commonly used types
pub use centers::EnergyCenter;
pub use db::{open_database, seed_energy_centers_if_empty, setup_database};
pub use ledger::Transfer;
pub use transfer::{
    execute_transfer, TransferError, TransferOutcome, TransferRequest, ValidTransfer,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
