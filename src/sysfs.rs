use anyhow::Result;
use std::{
    fs,
    io::{Read, Seek, Write},
    path::Path,
};

/// The default location of the GPIO sysfs class directory.
pub static SYSFS_ROOT: &str = "/sys/class/gpio";

/// Access to the file-like nodes the kernel exposes for GPIO lines.
///
/// The pin controller only ever talks to sysfs through this trait, so a
/// different node layer (an in-memory fake, a chroot, a remote board) can be
/// swapped in without touching the export/direction/value protocol.
pub trait SysfsNodes {
    /// Returns `true` if a node (file or directory) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Reads the full text content of the node at `path`.
    fn read_text(&self, path: &Path) -> Result<String>;

    /// Writes `value` to the node at `path`, replacing its content.
    fn write_text(&self, path: &Path, value: &str) -> Result<()>;
}

impl<T: SysfsNodes + ?Sized> SysfsNodes for &T {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        (**self).read_text(path)
    }

    fn write_text(&self, path: &Path, value: &str) -> Result<()> {
        (**self).write_text(path, value)
    }
}

/// Node layer backed by the real filesystem.
///
/// Nodes are never created: sysfs attributes must already exist. Writes
/// truncate, matching what a shell `echo out > direction` does.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sysfs;

impl SysfsNodes for Sysfs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        let mut f_value = fs::OpenOptions::new().read(true).open(path)?;
        let mut value = String::new();
        f_value.rewind()?;
        f_value.read_to_string(&mut value)?;
        Ok(value)
    }

    fn write_text(&self, path: &Path, value: &str) -> Result<()> {
        let mut f_node = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)?;
        f_node.write_all(value.as_bytes())?;
        Ok(())
    }
}
