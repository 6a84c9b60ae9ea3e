//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the public ledger operations.
//! - Keep host/transport layers decoupled from storage details.

pub mod ledger_service;
