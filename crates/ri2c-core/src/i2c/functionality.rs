//! Adapter functionality flags

use bitflags::bitflags;

bitflags! {
    /// Operations an I2C adapter supports
    ///
    /// Bit values match the kernel's `I2C_FUNC_*` constants as returned by
    /// the `I2C_FUNCS` ioctl.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Functionality: u32 {
        /// Plain I2C-level commands (combined read/write transfers)
        const I2C                    = 0x0000_0001;
        /// 10-bit target addresses
        const TEN_BIT_ADDR           = 0x0000_0002;
        /// Protocol mangling (`I2C_M_IGNORE_NAK` and friends)
        const PROTOCOL_MANGLING      = 0x0000_0004;
        /// SMBus packet error checking
        const SMBUS_PEC              = 0x0000_0008;
        /// Messages without a repeated start
        const NOSTART                = 0x0000_0010;
        /// Adapter can act as a target
        const SLAVE                  = 0x0000_0020;
        /// SMBus 2.0 block process call
        const SMBUS_BLOCK_PROC_CALL  = 0x0000_8000;
        /// SMBus quick command
        const SMBUS_QUICK            = 0x0001_0000;
        /// SMBus receive byte
        const SMBUS_READ_BYTE        = 0x0002_0000;
        /// SMBus send byte
        const SMBUS_WRITE_BYTE       = 0x0004_0000;
        /// SMBus read byte data
        const SMBUS_READ_BYTE_DATA   = 0x0008_0000;
        /// SMBus write byte data
        const SMBUS_WRITE_BYTE_DATA  = 0x0010_0000;
        /// SMBus read word data
        const SMBUS_READ_WORD_DATA   = 0x0020_0000;
        /// SMBus write word data
        const SMBUS_WRITE_WORD_DATA  = 0x0040_0000;
        /// SMBus process call
        const SMBUS_PROC_CALL        = 0x0080_0000;
        /// SMBus block read
        const SMBUS_READ_BLOCK_DATA  = 0x0100_0000;
        /// SMBus block write
        const SMBUS_WRITE_BLOCK_DATA = 0x0200_0000;
        /// I2C-style block read
        const SMBUS_READ_I2C_BLOCK   = 0x0400_0000;
        /// I2C-style block write
        const SMBUS_WRITE_I2C_BLOCK  = 0x0800_0000;
        /// SMBus host notify
        const SMBUS_HOST_NOTIFY      = 0x1000_0000;

        /// Receive and send byte
        const SMBUS_BYTE = Self::SMBUS_READ_BYTE.bits() | Self::SMBUS_WRITE_BYTE.bits();
        /// Read and write byte data
        const SMBUS_BYTE_DATA = Self::SMBUS_READ_BYTE_DATA.bits() | Self::SMBUS_WRITE_BYTE_DATA.bits();
        /// Read and write word data
        const SMBUS_WORD_DATA = Self::SMBUS_READ_WORD_DATA.bits() | Self::SMBUS_WRITE_WORD_DATA.bits();
        /// Everything an I2C adapter emulates in software
        const SMBUS_EMUL = Self::SMBUS_QUICK.bits()
            | Self::SMBUS_BYTE.bits()
            | Self::SMBUS_BYTE_DATA.bits()
            | Self::SMBUS_WORD_DATA.bits()
            | Self::SMBUS_PROC_CALL.bits()
            | Self::SMBUS_WRITE_BLOCK_DATA.bits()
            | Self::SMBUS_READ_I2C_BLOCK.bits()
            | Self::SMBUS_WRITE_I2C_BLOCK.bits()
            | Self::SMBUS_PEC.bits();
    }
}

impl Default for Functionality {
    fn default() -> Self {
        Functionality::empty()
    }
}

impl Functionality {
    /// Whether combined I2C transfers are available
    pub fn supports_i2c(self) -> bool {
        self.contains(Self::I2C)
    }

    /// Whether at least one of the simple byte/word SMBus transactions is
    /// available
    pub fn supports_simple_smbus(self) -> bool {
        self.intersects(Self::SMBUS_BYTE | Self::SMBUS_BYTE_DATA | Self::SMBUS_WORD_DATA)
    }
}
