//! I2C bus discovery through sysfs
//!
//! Every adapter bound to i2c-dev shows up as `/sys/class/i2c-dev/i2c-N`.
//! The bus numbers there are the ones used for `/dev/i2c-N`, which is what
//! we care about, but the adapter name is not always directly next to it:
//!
//! - `i2c-N/name` on kernels 2.6.5 and later
//! - `i2c-N/device/name`, which works for ISA adapters
//! - `i2c-N/device/i2c-M/name` for everything else; this picks the first
//!   `i2c-*` child and may return the wrong name if a driver registers
//!   more than one bus

use ri2c_core::bus::{BusDirectory, BusRecord, CapabilityClass};
use ri2c_core::error::{EnumerationError, ResolveError};
use ri2c_core::i2c::Functionality;

use nix::sys::statfs::{statfs, SYSFS_MAGIC};
use once_cell::sync::OnceCell;

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Where sysfs is expected to be mounted
const SYSFS_ROOT: &str = "/sys";

/// Class directory holding one entry per i2c-dev bus
const I2C_DEV_CLASS: &str = "i2c-dev";

/// Name prefix of bus entries
const BUS_PREFIX: &str = "i2c-";

/// Adapter name prefix of ISA buses, which cannot be probed reliably
const ISA_PREFIX: &str = "ISA ";

/// Longest attribute line read from sysfs
const ATTR_MAX: u64 = 128;

/// Sysfs mount point, checked once per process
static REGISTRY_ROOT: OnceCell<Option<PathBuf>> = OnceCell::new();

/// Return the sysfs mount point
///
/// The filesystem type is only checked on the first call; the answer is
/// kept for the rest of the process, including a negative one.
pub fn registry_root() -> Result<&'static Path, EnumerationError> {
    cached_root(&REGISTRY_ROOT, || check_registry_root(Path::new(SYSFS_ROOT)))
}

fn cached_root<F>(cell: &OnceCell<Option<PathBuf>>, check: F) -> Result<&Path, EnumerationError>
where
    F: FnOnce() -> Option<PathBuf>,
{
    cell.get_or_init(check)
        .as_deref()
        .ok_or(EnumerationError::NoRegistry)
}

/// Return `path` if a sysfs instance is mounted there
pub fn check_registry_root(path: &Path) -> Option<PathBuf> {
    match statfs(path) {
        Ok(stat) if stat.filesystem_type() == SYSFS_MAGIC => Some(path.to_path_buf()),
        Ok(_) => {
            log::debug!("sysfs: {} is not a sysfs mount", path.display());
            None
        }
        Err(e) => {
            log::debug!("sysfs: statfs({}) failed: {}", path.display(), e);
            None
        }
    }
}

/// An entry below `/sys/class/<class>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDevice {
    /// Entry name, e.g. `i2c-1`
    pub name: String,
    /// Full path of the entry
    pub path: PathBuf,
}

/// List the devices of a sysfs class
///
/// The returned iterator is lazy; call again to restart the walk. Hidden
/// entries and names that are not valid UTF-8 are skipped.
pub fn class_devices(
    root: &Path,
    class: &str,
) -> io::Result<impl Iterator<Item = ClassDevice>> {
    let dir = fs::read_dir(root.join("class").join(class))?;
    Ok(dir.filter_map(|entry| {
        let entry = entry.ok()?;
        let name = entry.file_name().into_string().ok()?;
        if name.starts_with('.') {
            return None;
        }
        Some(ClassDevice {
            path: entry.path(),
            name,
        })
    }))
}

/// Parse the bus number out of an `i2c-N` entry name
///
/// Like `sscanf("i2c-%d")`, trailing characters after the digits are
/// ignored.
pub fn parse_bus_number(name: &str) -> Option<u32> {
    let rest = name.strip_prefix(BUS_PREFIX)?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// Read the first line of an attribute, without the line terminator
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
fn read_attr_line(file: File) -> io::Result<String> {
    let mut line = Vec::new();
    let n = BufReader::new(file.take(ATTR_MAX)).read_until(b'\n', &mut line)?;
    if n == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "empty attribute"));
    }
    if let Some(pos) = line.iter().position(|&b| b == b'\n') {
        line.truncate(pos);
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}

/// Find and open the name attribute of a bus entry
fn open_name_attr(dev: &Path) -> Option<(PathBuf, File)> {
    let direct = [dev.join("name"), dev.join("device").join("name")];
    for path in direct {
        if let Ok(file) = File::open(&path) {
            return Some((path, file));
        }
    }

    let parent = dev.join("device");
    let children = fs::read_dir(&parent).ok()?;
    for child in children.filter_map(|e| e.ok()) {
        let name = child.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') || !name.starts_with(BUS_PREFIX) {
            continue;
        }
        let path = child.path().join("name");
        if let Ok(file) = File::open(&path) {
            return Some((path, file));
        }
    }

    None
}

/// Build the bus directory from a sysfs tree mounted at `root`
///
/// `probe` is asked for the functionality of every non-ISA bus; `None`
/// classifies the bus as [`CapabilityClass::Unknown`]. Buses whose name
/// cannot be found or read are left out.
pub fn enumerate_at<F>(root: &Path, mut probe: F) -> Result<BusDirectory, EnumerationError>
where
    F: FnMut(u32) -> Option<Functionality>,
{
    let mut directory = BusDirectory::new();

    let devices = match class_devices(root, I2C_DEV_CLASS) {
        Ok(devices) => devices,
        Err(e) => {
            log::debug!(
                "sysfs: Cannot read {}/class/{}: {}",
                root.display(),
                I2C_DEV_CLASS,
                e
            );
            return Ok(directory);
        }
    };

    for dev in devices {
        let Some(index) = parse_bus_number(&dev.name) else {
            log::trace!("sysfs: Skipping {}", dev.name);
            continue;
        };

        let Some((attr, file)) = open_name_attr(&dev.path) else {
            log::debug!("sysfs: No name attribute for {}", dev.name);
            continue;
        };

        let display_name = match read_attr_line(file) {
            Ok(name) => name,
            Err(e) => {
                log::warn!("{}: read error: {}", attr.display(), e);
                continue;
            }
        };

        let capability_class = if display_name.starts_with(ISA_PREFIX) {
            CapabilityClass::Isa
        } else {
            probe(index).map_or(CapabilityClass::Unknown, CapabilityClass::from_functionality)
        };

        log::debug!(
            "sysfs: Found i2c-{} '{}' ({})",
            index,
            display_name,
            capability_class.algorithm()
        );

        directory.push(BusRecord {
            index,
            display_name,
            capability_class,
        })?;
    }

    Ok(directory)
}

/// Discover all I2C buses on this system
///
/// Each non-ISA bus is opened briefly to query its functionality.
pub fn enumerate() -> Result<BusDirectory, EnumerationError> {
    let root = registry_root()?;
    enumerate_at(root, crate::device::probe_functionality)
}

/// Resolve an I2CBUS argument (number or adapter name) to a bus number
pub fn resolve(token: &str) -> Result<u32, ResolveError> {
    ri2c_core::bus::resolve_with(token, enumerate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Build a fake sysfs tree from (relative path, contents) pairs
    fn fake_sysfs(files: &[(&str, &str)]) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("class/i2c-dev")).unwrap();
        for (path, contents) in files {
            let path = root.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        root
    }

    fn by_index(dir: &BusDirectory) -> BTreeMap<u32, (String, CapabilityClass)> {
        dir.iter()
            .map(|r| (r.index, (r.display_name.clone(), r.capability_class)))
            .collect()
    }

    #[test]
    fn test_parse_bus_number() {
        assert_eq!(parse_bus_number("i2c-0"), Some(0));
        assert_eq!(parse_bus_number("i2c-17"), Some(17));
        assert_eq!(parse_bus_number("i2c-3x"), Some(3));
        assert_eq!(parse_bus_number("i2c-"), None);
        assert_eq!(parse_bus_number("i2c-x"), None);
        assert_eq!(parse_bus_number("spi-0"), None);
    }

    #[test]
    fn test_name_sources() {
        let root = fake_sysfs(&[
            ("class/i2c-dev/i2c-0/name", "SMBus I801 adapter at f000\n"),
            ("class/i2c-dev/i2c-1/device/name", "ISA main adapter\n"),
            ("class/i2c-dev/i2c-2/device/i2c-2/name", "i915 gmbus dpb\n"),
        ]);

        let dir = enumerate_at(root.path(), |_| Some(Functionality::I2C)).unwrap();
        let found = by_index(&dir);

        assert_eq!(found.len(), 3);
        assert_eq!(
            found[&0],
            ("SMBus I801 adapter at f000".to_string(), CapabilityClass::GenericBus)
        );
        assert_eq!(found[&1], ("ISA main adapter".to_string(), CapabilityClass::Isa));
        assert_eq!(found[&2], ("i915 gmbus dpb".to_string(), CapabilityClass::GenericBus));
    }

    #[test]
    fn test_direct_name_wins() {
        let root = fake_sysfs(&[
            ("class/i2c-dev/i2c-4/name", "direct\n"),
            ("class/i2c-dev/i2c-4/device/name", "parent\n"),
            ("class/i2c-dev/i2c-4/device/i2c-4/name", "child\n"),
        ]);
        let dir = enumerate_at(root.path(), |_| None).unwrap();
        assert_eq!(dir.get(4).unwrap().display_name, "direct");
    }

    #[test]
    fn test_first_line_only() {
        let root = fake_sysfs(&[("class/i2c-dev/i2c-5/name", "first\nsecond\n")]);
        let dir = enumerate_at(root.path(), |_| None).unwrap();
        assert_eq!(dir.get(5).unwrap().display_name, "first");
    }

    #[test]
    fn test_non_utf8_name_is_kept() {
        let root = fake_sysfs(&[("class/i2c-dev/i2c-8/device/name", "unused\n")]);
        fs::write(
            root.path().join("class/i2c-dev/i2c-8/name"),
            b"adapter \xff\xfe\n",
        )
        .unwrap();

        let dir = enumerate_at(root.path(), |_| None).unwrap();
        assert_eq!(dir.get(8).unwrap().display_name, "adapter \u{fffd}\u{fffd}");
    }

    #[test]
    fn test_isa_is_not_probed() {
        let root = fake_sysfs(&[("class/i2c-dev/i2c-0/name", "ISA main adapter\n")]);
        let dir = enumerate_at(root.path(), |_| panic!("ISA buses must not be probed")).unwrap();
        assert_eq!(dir.get(0).unwrap().capability_class, CapabilityClass::Isa);
    }

    #[test]
    fn test_probe_results() {
        let root = fake_sysfs(&[
            ("class/i2c-dev/i2c-0/name", "full\n"),
            ("class/i2c-dev/i2c-1/name", "smbus\n"),
            ("class/i2c-dev/i2c-2/name", "dummy\n"),
            ("class/i2c-dev/i2c-3/name", "broken\n"),
        ]);
        let dir = enumerate_at(root.path(), |bus| match bus {
            0 => Some(Functionality::I2C | Functionality::SMBUS_EMUL),
            1 => Some(Functionality::SMBUS_QUICK | Functionality::SMBUS_BYTE),
            2 => Some(Functionality::empty()),
            _ => None,
        })
        .unwrap();

        let classes: Vec<_> = (0..4)
            .map(|i| dir.get(i).unwrap().capability_class)
            .collect();
        assert_eq!(
            classes,
            [
                CapabilityClass::GenericBus,
                CapabilityClass::SimplifiedProtocolBus,
                CapabilityClass::Dummy,
                CapabilityClass::Unknown,
            ]
        );
    }

    #[test]
    fn test_unusable_entries_are_skipped() {
        let root = fake_sysfs(&[
            ("class/i2c-dev/i2c-0/name", "good\n"),
            ("class/i2c-dev/.hidden-1/name", "hidden\n"),
            ("class/i2c-dev/i2c-bad/name", "no number\n"),
            ("class/i2c-dev/i2c-2/unrelated", "x\n"),
            ("class/i2c-dev/i2c-3/name", ""),
        ]);
        let dir = enumerate_at(root.path(), |_| None).unwrap();
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.get(0).unwrap().display_name, "good");
    }

    #[test]
    fn test_missing_class_is_empty() {
        let root = tempfile::tempdir().unwrap();
        let dir = enumerate_at(root.path(), |_| None).unwrap();
        assert!(dir.is_empty());
    }

    #[test]
    fn test_repeated_enumeration_is_stable() {
        let root = fake_sysfs(&[
            ("class/i2c-dev/i2c-0/name", "a\n"),
            ("class/i2c-dev/i2c-1/name", "b\n"),
            ("class/i2c-dev/i2c-7/device/name", "c\n"),
        ]);
        let probe = |_: u32| Some(Functionality::I2C);
        let first = enumerate_at(root.path(), probe).unwrap();
        let second = enumerate_at(root.path(), probe).unwrap();
        assert_eq!(by_index(&first), by_index(&second));
    }

    #[test]
    fn test_resolve_against_fake_tree() {
        let root = fake_sysfs(&[
            ("class/i2c-dev/i2c-0/name", "twin\n"),
            ("class/i2c-dev/i2c-1/name", "twin\n"),
            ("class/i2c-dev/i2c-6/name", "single\n"),
        ]);
        let lookup = || enumerate_at(root.path(), |_: u32| None);
        assert_eq!(ri2c_core::bus::resolve_with("single", lookup), Ok(6));
        assert_eq!(
            ri2c_core::bus::resolve_with("twin", lookup),
            Err(ResolveError::Ambiguous)
        );
        assert_eq!(
            ri2c_core::bus::resolve_with("absent", lookup),
            Err(ResolveError::NotFound)
        );
    }

    #[test]
    fn test_plain_directory_is_not_a_registry() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(check_registry_root(root.path()), None);
        assert_eq!(check_registry_root(&root.path().join("missing")), None);
    }

    #[test]
    fn test_registry_check_runs_once() {
        let cell = OnceCell::new();
        let mut checks = 0;

        for _ in 0..3 {
            let result = cached_root(&cell, || {
                checks += 1;
                None
            });
            assert_eq!(result, Err(EnumerationError::NoRegistry));
        }
        assert_eq!(checks, 1);

        let cell = OnceCell::new();
        let root = tempfile::tempdir().unwrap();
        let first = cached_root(&cell, || Some(root.path().to_path_buf())).unwrap();
        assert_eq!(first, root.path());
        let second = cached_root(&cell, || panic!("registry root checked twice")).unwrap();
        assert_eq!(second, root.path());
    }

    #[test]
    fn test_class_devices_is_restartable() {
        let root = fake_sysfs(&[
            ("class/i2c-dev/i2c-0/name", "a\n"),
            ("class/i2c-dev/i2c-1/name", "b\n"),
        ]);
        let count = || class_devices(root.path(), I2C_DEV_CLASS).unwrap().count();
        assert_eq!(count(), 2);
        assert_eq!(count(), 2);
    }
}
