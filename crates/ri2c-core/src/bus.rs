//! Bus directory and bus argument resolution
//!
//! Buses are identified on the command line either by number (`1`,
//! `0x1`) or by the name the adapter driver registered
//! (`"SMBus I801 adapter at f000"`). Name lookup needs a [`BusDirectory`],
//! which a platform backend builds by walking its bus registry.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{EnumerationError, ResolveError};
use crate::i2c::Functionality;
use crate::number;

/// Largest accepted bus number
pub const BUS_INDEX_MAX: u32 = 0xFFFFF;

/// Coarse classification of what an adapter can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityClass {
    /// Neither I2C nor simple SMBus transactions were detected
    Dummy,
    /// Legacy ISA bus; never probed
    Isa,
    /// Full I2C adapter supporting combined transfers
    GenericBus,
    /// SMBus-only adapter
    SimplifiedProtocolBus,
    /// Probing the adapter failed
    Unknown,
}

impl CapabilityClass {
    /// Classify an adapter from its reported functionality
    pub fn from_functionality(funcs: Functionality) -> Self {
        if funcs.supports_i2c() {
            Self::GenericBus
        } else if funcs.supports_simple_smbus() {
            Self::SimplifiedProtocolBus
        } else {
            Self::Dummy
        }
    }

    /// Short functionality tag (`i2c`, `smbus`, ...)
    pub fn funcs_name(self) -> &'static str {
        match self {
            Self::Dummy => "dummy",
            Self::Isa => "isa",
            Self::GenericBus => "i2c",
            Self::SimplifiedProtocolBus => "smbus",
            Self::Unknown => "unknown",
        }
    }

    /// Human readable algorithm description
    pub fn algorithm(self) -> &'static str {
        match self {
            Self::Dummy => "Dummy bus",
            Self::Isa => "ISA bus",
            Self::GenericBus => "I2C adapter",
            Self::SimplifiedProtocolBus => "SMBus adapter",
            Self::Unknown => "N/A",
        }
    }
}

impl fmt::Display for CapabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.funcs_name())
    }
}

/// One discovered bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusRecord {
    /// Bus number, as in `/dev/i2c-<index>`
    pub index: u32,
    /// Adapter name reported by the driver; not necessarily unique
    pub display_name: String,
    /// What the adapter can do
    pub capability_class: CapabilityClass,
}

/// Buses in discovery order
///
/// Bus numbers are unique within one directory, names are not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusDirectory {
    records: Vec<BusRecord>,
}

impl BusDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    ///
    /// Fails with [`EnumerationError::OutOfMemory`] instead of aborting if
    /// the directory cannot grow.
    pub fn push(&mut self, record: BusRecord) -> Result<(), EnumerationError> {
        self.records
            .try_reserve(1)
            .map_err(|_| EnumerationError::OutOfMemory)?;
        self.records.push(record);
        Ok(())
    }

    /// Number of buses
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no bus was found
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the buses in discovery order
    pub fn iter(&self) -> core::slice::Iter<'_, BusRecord> {
        self.records.iter()
    }

    /// Look up a bus by number
    pub fn get(&self, index: u32) -> Option<&BusRecord> {
        self.records.iter().find(|r| r.index == index)
    }

    /// Find the bus number of the only bus named `name`
    ///
    /// Two buses with the same name are always reported as ambiguous, even
    /// if they happen to share a bus number.
    pub fn find_by_name(&self, name: &str) -> Result<u32, ResolveError> {
        let mut found = None;
        for record in self.records.iter().filter(|r| r.display_name == name) {
            if found.is_some() {
                return Err(ResolveError::Ambiguous);
            }
            found = Some(record.index);
        }
        found.ok_or(ResolveError::NotFound)
    }
}

impl<'a> IntoIterator for &'a BusDirectory {
    type Item = &'a BusRecord;
    type IntoIter = core::slice::Iter<'a, BusRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Resolve an I2CBUS argument to a bus number
///
/// A numeric argument is returned directly after a range check. Anything
/// else is taken as an adapter name: `enumerate` is called to build a fresh
/// directory and the name must match exactly one bus.
pub fn resolve_with<F>(token: &str, enumerate: F) -> Result<u32, ResolveError>
where
    F: FnOnce() -> Result<BusDirectory, EnumerationError>,
{
    if let Some(index) = number::parse_exact(token) {
        if index > u64::from(BUS_INDEX_MAX) {
            return Err(ResolveError::OutOfRange);
        }
        return Ok(index as u32);
    }

    log::debug!("'{}' is not a bus number, looking it up by name", token);
    let directory = enumerate()?;
    directory.find_by_name(token)
}
