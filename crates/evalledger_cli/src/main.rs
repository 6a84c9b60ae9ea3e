//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `evalledger_core` linkage.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Invoking ledger operations stays with external hosts; this probe only
//! confirms the schema migrates on a fresh in-memory database.

use evalledger_core::db::open_db_in_memory;
use evalledger_core::{core_version, Identity, LedgerService};

fn main() {
    println!("evalledger_core version={}", core_version());

    match open_db_in_memory().map_err(|err| err.to_string()).and_then(|conn| {
        LedgerService::new(conn, Identity::new("smoke-admin")).map_err(|err| err.to_string())
    }) {
        Ok(ledger) => {
            let height = ledger.ledger_height().unwrap_or(-1);
            println!("evalledger_core schema=ready height={height}");
        }
        Err(err) => {
            eprintln!("evalledger_core schema=error {err}");
            std::process::exit(1);
        }
    }
}
