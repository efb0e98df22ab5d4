//! ri2c-linux - Linux i2c-dev support
//!
//! This crate provides access to I2C adapters through the
//! `/dev/i2c-N` character devices, and discovers the available adapters
//! through sysfs.
//!
//! # Overview
//!
//! The i2c-dev driver exposes every registered adapter as a character
//! device. Adapter names and bus numbers are listed below
//! `/sys/class/i2c-dev`.
//!
//! # Example
//!
//! ```no_run
//! use ri2c_core::master::I2cMaster;
//! use ri2c_core::transfer::{compile, MAX_MESSAGES};
//! use ri2c_linux::{resolve, LinuxI2c};
//!
//! // Bus by number or by adapter name
//! let bus = resolve("SMBus I801 adapter at f000")?;
//! let mut i2c = LinuxI2c::open(bus)?;
//!
//! // Read 8 bytes at offset 0x64 from the EEPROM at 0x50
//! let mut plan = compile(["w1@0x50", "0x64", "r8"], None, MAX_MESSAGES)?;
//! i2c.transfer(plan.messages_mut())?;
//! println!("{:02x?}", plan[1].data());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with i2c-dev support (`CONFIG_I2C_CHARDEV`, or
//!   `modprobe i2c-dev`)
//! - sysfs mounted at `/sys` for bus name lookup
//! - Read/write access to `/dev/i2c-N`, usually root or the `i2c` group

pub mod device;
pub mod error;
pub mod sysfs;

// Re-exports
pub use device::{device_path, probe_functionality, LinuxI2c};
pub use error::{LinuxI2cError, Result};
pub use sysfs::{enumerate, resolve};
