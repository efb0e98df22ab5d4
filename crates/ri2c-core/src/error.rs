//! Error types for ri2c-core
//!
//! All errors are small `Copy` enums with hand-written `Display`
//! implementations so they stay usable without `std`.

use core::fmt;

/// Errors from parsing a 7-bit target address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// The argument is not a numeric literal
    NotANumber,
    /// The value is outside the usable range 0x03-0x77
    OutOfRange(u64),
}

/// Errors from compiling transfer descriptors into messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileError {
    /// Descriptor does not start with `r` or `w`
    BadDirection,
    /// Descriptor length exceeds 65535
    LengthOutOfRange,
    /// Something other than `@ADDRESS` follows the length
    MissingAt,
    /// Address is not a number or outside 0x03-0x77
    BadAddress,
    /// Descriptor has no address and none was given before
    NoAddress,
    /// More messages than a single transaction may carry
    TooManyMessages,
    /// Data byte value exceeds 255
    BadByte,
    /// Data byte is followed by something other than `+`, `-` or `=`
    BadByteSuffix,
    /// Input ended in the middle of a write, or held no message at all
    Incomplete,
}

/// Errors from discovering the buses registered with the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumerationError {
    /// The sysfs registry is not mounted where it is expected
    NoRegistry,
    /// Growing the bus directory failed
    OutOfMemory,
}

/// Errors from resolving a bus argument to a bus number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// Numeric bus argument above the largest valid bus number
    OutOfRange,
    /// No bus carries the given name
    NotFound,
    /// More than one bus carries the given name
    Ambiguous,
    /// The sysfs registry is not available to look names up
    NoRegistry,
    /// Building the bus directory ran out of memory
    OutOfMemory,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber => write!(f, "chip address is not a number"),
            Self::OutOfRange(addr) => {
                write!(f, "chip address 0x{:02x} out of range (0x03-0x77)", addr)
            }
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadDirection => write!(f, "invalid direction"),
            Self::LengthOutOfRange => write!(f, "length invalid (range 0-65535)"),
            Self::MissingAt => write!(f, "no '@' after length"),
            Self::BadAddress => write!(f, "chip address invalid (range 0x03-0x77)"),
            Self::NoAddress => write!(f, "no address given"),
            Self::TooManyMessages => write!(f, "too many messages"),
            Self::BadByte => write!(f, "data byte invalid"),
            Self::BadByteSuffix => write!(f, "invalid data byte suffix"),
            Self::Incomplete => write!(f, "incomplete message"),
        }
    }
}

impl fmt::Display for EnumerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRegistry => write!(f, "sysfs is not mounted"),
            Self::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "I2C bus out of range"),
            Self::NotFound => write!(f, "I2C bus name doesn't match any bus present"),
            Self::Ambiguous => write!(f, "I2C bus name is not unique"),
            Self::NoRegistry => write!(f, "cannot look up I2C bus names: sysfs is not mounted"),
            Self::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

impl From<EnumerationError> for ResolveError {
    fn from(e: EnumerationError) -> Self {
        match e {
            EnumerationError::NoRegistry => Self::NoRegistry,
            EnumerationError::OutOfMemory => Self::OutOfMemory,
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AddressError {}

#[cfg(feature = "std")]
impl std::error::Error for CompileError {}

#[cfg(feature = "std")]
impl std::error::Error for EnumerationError {}

#[cfg(feature = "std")]
impl std::error::Error for ResolveError {}
