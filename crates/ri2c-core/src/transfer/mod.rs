//! Combined transfers
//!
//! A transfer is described on the command line as a sequence of
//! descriptors, each optionally followed by data bytes:
//!
//! ```text
//! DESC [DATA]... [DESC [DATA]...]...
//!
//! DESC := {r|w}LENGTH[@ADDRESS]
//! DATA := BYTE[+|-|=]
//! ```
//!
//! `LENGTH` is 0-65535, `ADDRESS` is 0x03-0x77 and is carried over to the
//! following descriptors when omitted. A write of `LENGTH` bytes consumes
//! `DATA` arguments until its payload is full; a `+`, `-` or `=` suffix
//! fills the rest of the payload with an incrementing, decrementing or
//! constant value starting at `BYTE`.
//!
//! [`compile`] turns such a sequence into a [`TransactionPlan`] that can be
//! handed to an [`I2cMaster`](crate::master::I2cMaster) in one go.

mod compiler;
mod plan;

pub use compiler::{compile, CompileFailure, Compiler};
pub use plan::{TransactionPlan, MAX_MESSAGES};
