pub mod auth;
pub mod config;
mod csv_utils;
pub mod dto;
mod error;
pub mod ledger;
mod runner;
pub mod stores;
pub mod telemetry;

pub use dto::{BalanceRow, LedgerRow, Operation, StatementType};
pub use error::Error;
pub use ledger::{balance_of, Balance, Ledger, Profile, Session};
pub use runner::{run, run_async};
