//! Bus listing implementation

use std::io::{self, Write};

use ri2c_core::bus::BusDirectory;

/// Print one line per bus, in discovery order
///
/// Columns are tab separated: device name, functionality class, adapter
/// name and algorithm.
pub fn list_buses(directory: &BusDirectory, out: &mut dyn Write) -> io::Result<()> {
    for bus in directory.iter() {
        writeln!(
            out,
            "i2c-{}\t{:<10}\t{:<32}\t{}",
            bus.index,
            bus.capability_class.funcs_name(),
            bus.display_name,
            bus.capability_class.algorithm()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ri2c_core::bus::{BusRecord, CapabilityClass};

    fn record(index: u32, name: &str, class: CapabilityClass) -> BusRecord {
        BusRecord {
            index,
            display_name: name.to_string(),
            capability_class: class,
        }
    }

    #[test]
    fn test_list_format() {
        let mut directory = BusDirectory::new();
        directory
            .push(record(3, "SMBus I801 adapter at f000", CapabilityClass::SimplifiedProtocolBus))
            .unwrap();
        directory
            .push(record(0, "i915 gmbus dpb", CapabilityClass::GenericBus))
            .unwrap();
        directory
            .push(record(9, "ISA main adapter", CapabilityClass::Isa))
            .unwrap();

        let mut out = Vec::new();
        list_buses(&directory, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines,
            [
                "i2c-3\tsmbus     \tSMBus I801 adapter at f000      \tSMBus adapter",
                "i2c-0\ti2c       \ti915 gmbus dpb                  \tI2C adapter",
                "i2c-9\tisa       \tISA main adapter                \tISA bus",
            ]
        );
    }

    #[test]
    fn test_list_empty() {
        let mut out = Vec::new();
        list_buses(&BusDirectory::new(), &mut out).unwrap();
        assert!(out.is_empty());
    }
}
