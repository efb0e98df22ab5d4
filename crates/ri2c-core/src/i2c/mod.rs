//! I2C building blocks
//!
//! Target addresses, adapter functionality flags and the message type
//! handed to the kernel in a combined transfer.

mod address;
mod functionality;
mod message;

pub use address::Address;
pub use functionality::Functionality;
pub use message::{Direction, Message, MAX_LEN};
