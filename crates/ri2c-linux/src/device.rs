//! Linux i2c-dev device implementation
//!
//! This module provides the `LinuxI2c` struct that implements the
//! `I2cMaster` trait on top of the `/dev/i2c-N` character devices.

use crate::error::{LinuxI2cError, Result};

use ri2c_core::i2c::{Address, Functionality, Message};
use ri2c_core::master::I2cMaster;
use ri2c_core::transfer::MAX_MESSAGES;

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;

/// Device root
const DEV_ROOT: &str = "/dev";

/// Driver default timeout in units of 10 ms
const DEFAULT_TIMEOUT: u32 = 3;

/// Driver default number of retries
const DEFAULT_RETRIES: u32 = 2;

/// Linux i2c-dev ioctl definitions
///
/// The i2c-dev ioctls predate the `_IOC` encoding, so they are all
/// declared with the nix `*_bad` macros.
mod ioctl {
    /// Number of times a device address should be polled when not acknowledging
    const I2C_RETRIES: u16 = 0x0701;
    /// Set timeout in units of 10 ms
    const I2C_TIMEOUT: u16 = 0x0702;
    /// Use this target address
    const I2C_SLAVE: u16 = 0x0703;
    /// Use this target address, even if it is already in use by a driver
    const I2C_SLAVE_FORCE: u16 = 0x0706;
    /// Get the adapter functionality mask
    const I2C_FUNCS: u16 = 0x0705;
    /// Combined R/W transfer (one STOP only)
    const I2C_RDWR: u16 = 0x0707;

    /// Message flag: read data, from target to adapter
    pub const I2C_M_RD: u16 = 0x0001;

    /// Kernel `struct i2c_msg`
    #[repr(C)]
    #[derive(Debug)]
    pub struct I2cMsg {
        pub addr: u16,
        pub flags: u16,
        pub len: u16,
        pub buf: *mut u8,
    }

    /// Kernel `struct i2c_rdwr_ioctl_data`
    #[repr(C)]
    #[derive(Debug)]
    pub struct I2cRdwrIoctlData {
        pub msgs: *mut I2cMsg,
        pub nmsgs: u32,
    }

    nix::ioctl_write_int_bad!(i2c_retries, I2C_RETRIES);
    nix::ioctl_write_int_bad!(i2c_timeout, I2C_TIMEOUT);
    nix::ioctl_write_int_bad!(i2c_slave, I2C_SLAVE);
    nix::ioctl_write_int_bad!(i2c_slave_force, I2C_SLAVE_FORCE);
    nix::ioctl_read_bad!(i2c_funcs, I2C_FUNCS, libc::c_ulong);
    nix::ioctl_readwrite_bad!(i2c_rdwr, I2C_RDWR, I2cRdwrIoctlData);
}

/// Path of the character device for bus `bus`
pub fn device_path(bus: u32) -> String {
    format!("{}/i2c-{}", DEV_ROOT, bus)
}

/// Linux I2C adapter using the i2c-dev interface
///
/// The device is closed when the value is dropped.
#[derive(Debug)]
pub struct LinuxI2c {
    /// File handle for the i2c-dev device
    file: File,
    /// Bus number
    bus: u32,
    /// Device path, e.g. `/dev/i2c-1`
    path: String,
}

impl LinuxI2c {
    /// Open the character device of bus `bus`
    pub fn open(bus: u32) -> Result<Self> {
        let path = device_path(bus);

        log::debug!("linux_i2c: Opening device {}", path);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => LinuxI2cError::NotFound {
                    path: path.clone(),
                    source: e,
                },
                io::ErrorKind::PermissionDenied => LinuxI2cError::PermissionDenied {
                    path: path.clone(),
                    source: e,
                },
                _ => LinuxI2cError::OpenFailed {
                    path: path.clone(),
                    source: e,
                },
            })?;

        log::info!("linux_i2c: Opened {}", path);

        Ok(Self { file, bus, path })
    }

    /// Open bus `bus` where failure is expected and not worth reporting
    ///
    /// Used while probing adapters; errors only show up in trace output.
    pub fn open_quiet(bus: u32) -> Option<Self> {
        let path = device_path(bus);
        match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(file) => Some(Self { file, bus, path }),
            Err(e) => {
                log::trace!("linux_i2c: Cannot open {}: {}", path, e);
                None
            }
        }
    }

    /// Bus number
    pub fn bus(&self) -> u32 {
        self.bus
    }

    /// Device path
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl I2cMaster for LinuxI2c {
    type Error = LinuxI2cError;

    fn functionality(&mut self) -> Result<Functionality> {
        let mut funcs: libc::c_ulong = 0;
        // SAFETY: valid fd, and I2C_FUNCS writes exactly one unsigned long
        unsafe {
            ioctl::i2c_funcs(self.file.as_raw_fd(), &mut funcs).map_err(|e| {
                LinuxI2cError::FunctionalityFailed(io::Error::from_raw_os_error(e as i32))
            })?;
        }
        // All defined flags live in the low 32 bits
        Ok(Functionality::from_bits_retain(funcs as u32))
    }

    fn set_target_address(&mut self, address: Address, force: bool) -> Result<()> {
        let fd = self.file.as_raw_fd();
        // SAFETY: valid fd, integer argument
        let ret = unsafe {
            if force {
                ioctl::i2c_slave_force(fd, address.get() as _)
            } else {
                ioctl::i2c_slave(fd, address.get() as _)
            }
        };
        ret.map_err(|e| LinuxI2cError::SetAddressFailed {
            address: address.get(),
            source: io::Error::from_raw_os_error(e as i32),
        })?;
        log::debug!("linux_i2c: {} selected address {}", self.path, address);
        Ok(())
    }

    fn transfer(&mut self, messages: &mut [Message]) -> Result<usize> {
        if messages.is_empty() {
            return Ok(0);
        }
        if messages.len() > MAX_MESSAGES {
            return Err(LinuxI2cError::InvalidParameter(format!(
                "{} messages exceed the limit of {}",
                messages.len(),
                MAX_MESSAGES
            )));
        }

        let mut msgs: Vec<ioctl::I2cMsg> = messages
            .iter_mut()
            .map(|msg| ioctl::I2cMsg {
                addr: u16::from(msg.address()),
                flags: if msg.is_read() { ioctl::I2C_M_RD } else { 0 },
                len: msg.len(),
                buf: msg.data_mut().as_mut_ptr(),
            })
            .collect();

        let mut rdwr = ioctl::I2cRdwrIoctlData {
            msgs: msgs.as_mut_ptr(),
            nmsgs: msgs.len() as u32,
        };

        // SAFETY: every I2cMsg points into a live buffer of exactly `len`
        // bytes borrowed from `messages` for the duration of the call
        let sent = unsafe { ioctl::i2c_rdwr(self.file.as_raw_fd(), &mut rdwr) }.map_err(|e| {
            LinuxI2cError::TransferFailed(io::Error::from_raw_os_error(e as i32))
        })?;

        log::debug!(
            "linux_i2c: {} sent {}/{} messages",
            self.path,
            sent,
            msgs.len()
        );

        Ok(sent.max(0) as usize)
    }

    fn set_timeout(&mut self, timeout: u32) -> Result<()> {
        let value = if timeout == 0 { DEFAULT_TIMEOUT } else { timeout };
        // SAFETY: valid fd, integer argument
        unsafe { ioctl::i2c_timeout(self.file.as_raw_fd(), value as _) }.map_err(|e| {
            LinuxI2cError::SetTimeoutFailed {
                timeout,
                source: io::Error::from_raw_os_error(e as i32),
            }
        })?;
        log::debug!("linux_i2c: Set timeout to {}0 ms", value);
        Ok(())
    }

    fn set_retries(&mut self, retries: u32) -> Result<()> {
        let value = if retries == 0 { DEFAULT_RETRIES } else { retries };
        // SAFETY: valid fd, integer argument
        unsafe { ioctl::i2c_retries(self.file.as_raw_fd(), value as _) }.map_err(|e| {
            LinuxI2cError::SetRetriesFailed {
                retries,
                source: io::Error::from_raw_os_error(e as i32),
            }
        })?;
        log::debug!("linux_i2c: Set retries to {}", value);
        Ok(())
    }
}

/// Query the functionality of bus `bus`, closing the device again
///
/// Returns `None` if the device cannot be opened or queried.
pub fn probe_functionality(bus: u32) -> Option<Functionality> {
    let mut dev = LinuxI2c::open_quiet(bus)?;
    match dev.functionality() {
        Ok(funcs) => Some(funcs),
        Err(e) => {
            log::debug!("linux_i2c: Probing {} failed: {}", dev.path(), e);
            None
        }
    }
}
