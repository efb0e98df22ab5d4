//! I2C message structure

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use super::Address;

/// Largest payload a single message can carry
pub const MAX_LEN: usize = u16::MAX as usize;

/// Transfer direction of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Read bytes from the target
    Read,
    /// Write bytes to the target
    Write,
}

impl Direction {
    /// Lowercase name as used in message listings
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One read or write within a combined transfer
///
/// The buffer always holds exactly `len()` bytes. For writes it is the
/// payload sent to the target; for reads it starts zeroed and is
/// overwritten by the driver once the transfer ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    address: Address,
    direction: Direction,
    buf: Vec<u8>,
}

impl Message {
    /// Create a message with a zero-filled buffer of `len` bytes
    pub fn zeroed(address: Address, direction: Direction, len: u16) -> Self {
        Self {
            address,
            direction,
            buf: vec![0; usize::from(len)],
        }
    }

    /// Create a read of `len` bytes
    pub fn read(address: Address, len: u16) -> Self {
        Self::zeroed(address, Direction::Read, len)
    }

    /// Create a write carrying `data`
    ///
    /// Returns `None` if `data` is longer than [`MAX_LEN`].
    pub fn write(address: Address, data: Vec<u8>) -> Option<Self> {
        if data.len() > MAX_LEN {
            return None;
        }
        Some(Self {
            address,
            direction: Direction::Write,
            buf: data,
        })
    }

    /// Target address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Transfer direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns true for read messages
    pub fn is_read(&self) -> bool {
        self.direction == Direction::Read
    }

    /// Number of bytes transferred
    pub fn len(&self) -> u16 {
        // Constructors keep the buffer within MAX_LEN
        self.buf.len() as u16
    }

    /// Returns true for zero-length messages
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Message buffer
    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    /// Mutable message buffer, filled by the driver for reads
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}
