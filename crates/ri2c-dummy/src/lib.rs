//! ri2c-dummy - In-memory I2C bus emulator for testing
//!
//! This crate provides a dummy bus with register-file targets (think
//! 24C02 EEPROM) attached at fixed addresses. It's useful for testing
//! transfer handling without real hardware.
//!
//! Each target has an internal register pointer. A write sets the pointer
//! from its first byte and stores the remaining bytes from there; a read
//! returns bytes starting at the pointer. The pointer wraps around at the
//! end of the register file.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use ri2c_core::i2c::{Address, Direction, Functionality, Message};
use ri2c_core::master::I2cMaster;
use ri2c_core::transfer::MAX_MESSAGES;

/// Default register file size of an emulated target
pub const DEFAULT_REGISTER_COUNT: usize = 256;

/// Errors reported by the dummy bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyError {
    /// No target acknowledged the first message of a transfer
    Nak(Address),
    /// A driver owns the address and `force` was not given
    Busy(Address),
    /// More messages than one transfer may carry
    TooManyMessages(usize),
}

impl fmt::Display for DummyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nak(addr) => write!(f, "no device at address {}", addr),
            Self::Busy(addr) => write!(f, "address {} is in use by a driver", addr),
            Self::TooManyMessages(n) => {
                write!(f, "{} messages exceed the limit of {}", n, MAX_MESSAGES)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DummyError {}

/// Emulated register-file target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyTarget {
    registers: Vec<u8>,
    pointer: usize,
}

impl DummyTarget {
    /// Create a target with `count` registers, all 0xFF
    pub fn new(count: usize) -> Self {
        Self {
            registers: vec![0xFF; count.max(1)],
            pointer: 0,
        }
    }

    /// Create a target pre-filled with `data`
    pub fn with_data(data: &[u8]) -> Self {
        let mut target = Self::new(data.len());
        target.registers[..data.len()].copy_from_slice(data);
        target
    }

    /// Register contents
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Current register pointer
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    fn write(&mut self, data: &[u8]) {
        let Some((&offset, rest)) = data.split_first() else {
            return;
        };
        let len = self.registers.len();
        self.pointer = usize::from(offset) % len;
        for &b in rest {
            self.registers[self.pointer] = b;
            self.pointer = (self.pointer + 1) % len;
        }
    }

    fn read(&mut self, buf: &mut [u8]) {
        let len = self.registers.len();
        for b in buf.iter_mut() {
            *b = self.registers[self.pointer];
            self.pointer = (self.pointer + 1) % len;
        }
    }
}

impl Default for DummyTarget {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTER_COUNT)
    }
}

/// Dummy I2C bus
///
/// Emulates an adapter with any number of targets attached.
#[derive(Debug, Clone)]
pub struct DummyBus {
    functionality: Functionality,
    targets: BTreeMap<Address, DummyTarget>,
    busy: BTreeSet<Address>,
    selected: Option<Address>,
    timeout: Option<u32>,
    retries: Option<u32>,
    transfers: usize,
}

impl DummyBus {
    /// Create an empty bus reporting full I2C functionality
    pub fn new() -> Self {
        Self::with_functionality(Functionality::I2C | Functionality::SMBUS_EMUL)
    }

    /// Create an empty bus reporting `functionality`
    pub fn with_functionality(functionality: Functionality) -> Self {
        Self {
            functionality,
            targets: BTreeMap::new(),
            busy: BTreeSet::new(),
            selected: None,
            timeout: None,
            retries: None,
            transfers: 0,
        }
    }

    /// Attach a target at `address`, replacing any previous one
    pub fn attach(&mut self, address: Address, target: DummyTarget) -> &mut Self {
        self.targets.insert(address, target);
        self
    }

    /// Mark `address` as claimed by a kernel driver
    pub fn claim(&mut self, address: Address) -> &mut Self {
        self.busy.insert(address);
        self
    }

    /// Target attached at `address`
    pub fn target(&self, address: Address) -> Option<&DummyTarget> {
        self.targets.get(&address)
    }

    /// Address selected by the last successful `set_target_address`
    pub fn selected(&self) -> Option<Address> {
        self.selected
    }

    /// Timeout set through the adapter, if any
    pub fn timeout(&self) -> Option<u32> {
        self.timeout
    }

    /// Retry count set through the adapter, if any
    pub fn retries(&self) -> Option<u32> {
        self.retries
    }

    /// Number of transfers run so far
    pub fn transfers(&self) -> usize {
        self.transfers
    }
}

impl Default for DummyBus {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cMaster for DummyBus {
    type Error = DummyError;

    fn functionality(&mut self) -> Result<Functionality, DummyError> {
        Ok(self.functionality)
    }

    fn set_target_address(&mut self, address: Address, force: bool) -> Result<(), DummyError> {
        if !force && self.busy.contains(&address) {
            return Err(DummyError::Busy(address));
        }
        self.selected = Some(address);
        Ok(())
    }

    fn transfer(&mut self, messages: &mut [Message]) -> Result<usize, DummyError> {
        if messages.len() > MAX_MESSAGES {
            return Err(DummyError::TooManyMessages(messages.len()));
        }
        self.transfers += 1;

        for (i, msg) in messages.iter_mut().enumerate() {
            let Some(target) = self.targets.get_mut(&msg.address()) else {
                log::debug!("dummy: NAK from {} at message {}", msg.address(), i);
                if i == 0 {
                    return Err(DummyError::Nak(msg.address()));
                }
                return Ok(i);
            };

            match msg.direction() {
                Direction::Write => target.write(msg.data()),
                Direction::Read => target.read(msg.data_mut()),
            }
        }

        Ok(messages.len())
    }

    fn set_timeout(&mut self, timeout: u32) -> Result<(), DummyError> {
        self.timeout = Some(timeout);
        Ok(())
    }

    fn set_retries(&mut self, retries: u32) -> Result<(), DummyError> {
        self.retries = Some(retries);
        Ok(())
    }
}
