//! 7-bit target addresses

use core::fmt;

use crate::error::AddressError;
use crate::number;

/// A 7-bit I2C target address in the usable range 0x03-0x77
///
/// Addresses 0x00-0x02 and 0x78-0x7f are reserved by the I2C
/// bus protocol (general call, CBUS, 10-bit prefix, ...) and are never
/// accepted. 10-bit addressing is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u8);

impl Address {
    /// Lowest usable address
    pub const MIN: u8 = 0x03;
    /// Highest usable address
    pub const MAX: u8 = 0x77;

    /// Create an address, checking the usable range
    pub fn new(addr: u64) -> Result<Self, AddressError> {
        if addr < u64::from(Self::MIN) || addr > u64::from(Self::MAX) {
            return Err(AddressError::OutOfRange(addr));
        }
        Ok(Self(addr as u8))
    }

    /// Parse a CHIP-ADDRESS argument such as `0x50` or `80`
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let value = number::parse_exact(s).ok_or(AddressError::NotANumber)?;
        Self::new(value)
    }

    /// The raw 7-bit address
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Address {
    type Error = AddressError;

    fn try_from(addr: u8) -> Result<Self, Self::Error> {
        Self::new(u64::from(addr))
    }
}

impl From<Address> for u16 {
    fn from(addr: Address) -> u16 {
        u16::from(addr.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}
