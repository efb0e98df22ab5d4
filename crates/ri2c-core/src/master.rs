//! Adapter trait
//!
//! An [`I2cMaster`] is an open handle on one bus. Backends implement it
//! for real hardware (`ri2c-linux`) or for emulation (`ri2c-dummy`).

use core::fmt;

use crate::i2c::{Address, Functionality, Message};

/// An open I2C bus that can run combined transfers
pub trait I2cMaster {
    /// Backend specific error type
    type Error: fmt::Debug + fmt::Display;

    /// Query the operations the adapter supports
    fn functionality(&mut self) -> Result<Functionality, Self::Error>;

    /// Select the target address for subsequent plain reads/writes
    ///
    /// Without `force` this fails if a kernel driver has already claimed
    /// the address, which makes it usable as a busy check before a
    /// combined transfer.
    fn set_target_address(&mut self, address: Address, force: bool) -> Result<(), Self::Error>;

    /// Run all `messages` as one combined transfer
    ///
    /// Read buffers are filled in place. Returns the number of messages
    /// the adapter reports as sent, which may be lower than
    /// `messages.len()` if the transfer stopped early.
    fn transfer(&mut self, messages: &mut [Message]) -> Result<usize, Self::Error>;

    /// Set the adapter timeout in units of 10 ms (0 selects the default)
    fn set_timeout(&mut self, _timeout: u32) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Set how often a non-acknowledging target is retried (0 selects the
    /// default)
    fn set_retries(&mut self, _retries: u32) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<M: I2cMaster + ?Sized> I2cMaster for &mut M {
    type Error = M::Error;

    fn functionality(&mut self) -> Result<Functionality, Self::Error> {
        (**self).functionality()
    }

    fn set_target_address(&mut self, address: Address, force: bool) -> Result<(), Self::Error> {
        (**self).set_target_address(address, force)
    }

    fn transfer(&mut self, messages: &mut [Message]) -> Result<usize, Self::Error> {
        (**self).transfer(messages)
    }

    fn set_timeout(&mut self, timeout: u32) -> Result<(), Self::Error> {
        (**self).set_timeout(timeout)
    }

    fn set_retries(&mut self, retries: u32) -> Result<(), Self::Error> {
        (**self).set_retries(retries)
    }
}
