//! ri2c-core - Core library for I2C bus lookup and message transfers
//!
//! This crate holds everything that does not need to talk to the kernel:
//! numeric literal parsing, 7-bit target addresses, the adapter
//! functionality bitset, the transfer-descriptor compiler that turns
//! `w1@0x50 0x64 r8` style arguments into a bounded list of messages, and
//! the bus directory used to map bus names to bus numbers.
//!
//! It is `no_std` compatible but requires an allocator.
//!
//! # Features
//!
//! - `std` - Implement `std::error::Error` for the error types
//!
//! # Example
//!
//! ```
//! use ri2c_core::transfer::{compile, MAX_MESSAGES};
//! use ri2c_core::i2c::Direction;
//!
//! let plan = compile(["w1@0x50", "0x64", "r8"], None, MAX_MESSAGES).unwrap();
//! assert_eq!(plan.len(), 2);
//! assert_eq!(plan[0].data(), &[0x64]);
//! assert_eq!(plan[1].direction(), Direction::Read);
//! assert_eq!(plan[1].len(), 8);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
pub mod error;
pub mod i2c;
pub mod master;
pub mod number;
pub mod transfer;

pub use error::{AddressError, CompileError, EnumerationError, ResolveError};
