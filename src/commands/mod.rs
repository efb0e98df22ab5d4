//! CLI command implementations
//!
//! Commands are written against `ri2c_core::master::I2cMaster` and plain
//! `std::io` streams so they run the same on a real adapter and on the
//! in-memory bus from `ri2c-dummy`.

mod list;
mod transfer;

pub use list::list_buses;
pub use transfer::{run_transfer, Outcome, TransferOptions};
