//! Writes the ri2c(8) man page
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

#[path = "../cli.rs"]
mod cli;

/// ri2c needs root or the i2c group, so it goes with the admin commands
const SECTION: &str = "8";

fn render(output_dir: &Path) -> io::Result<PathBuf> {
    let man = clap_mangen::Man::new(cli::Cli::command())
        .section(SECTION)
        .manual("I2C Tools");

    let mut page = Vec::new();
    man.render(&mut page)?;

    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("ri2c.{}", SECTION));
    fs::write(&path, page)?;
    Ok(path)
}

fn main() -> io::Result<()> {
    let output_dir = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("man"), PathBuf::from);

    let path = render(&output_dir)?;

    println!("Wrote {}", path.display());
    println!("Preview with: man -l {}", path.display());
    println!(
        "Install with: sudo install -Dm644 {} /usr/local/share/man/man{}/ri2c.{}",
        path.display(),
        SECTION,
        SECTION
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = render(&dir.path().join("man")).unwrap();
        assert_eq!(path.file_name().unwrap(), "ri2c.8");

        let page = fs::read_to_string(&path).unwrap();
        assert!(page.contains(".TH"));
        assert!(page.contains("ri2c"));
        assert!(page.contains("I2CBUS"));
    }
}
