//! CLI argument parsing

use clap::Parser;

/// Parse a numeric literal (decimal, `0x` hex or leading-zero octal) as u32
fn parse_number_u32(s: &str) -> Result<u32, String> {
    let value = ri2c_core::number::parse_exact(s).ok_or_else(|| format!("Invalid number: {}", s))?;
    u32::try_from(value).map_err(|_| format!("Value out of range: {}", s))
}

const AFTER_HELP: &str = "\
I2CBUS is an integer or an I2C bus name
DESC describes the transfer in the form: {r|w}LENGTH[@address]
  1) read/write-flag 2) LENGTH (range 0-65535) 3) I2C address (use last one if omitted)
DATA are LENGTH bytes for a write message. They can be shortened by a suffix:
  = (keep value constant until LENGTH)
  + (increase value by 1 until LENGTH)
  - (decrease value by 1 until LENGTH)

Example (bus 0, read 8 byte at offset 0x64 from eeprom at 0x50):
  # ri2c 0 w1@0x50 0x64 r8
Example (same eeprom, at offset 0x42 write 0xff 0xfe .. 0x00 ):
  # ri2c 0 w257@0x50 0x42 0xff-";

#[derive(Parser, Debug)]
#[command(name = "ri2c")]
#[command(version, about = "Send user-defined I2C messages in one combined transfer", long_about = None)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Force access even if a driver has claimed the address
    #[arg(short, long)]
    pub force: bool,

    /// Do not ask for confirmation before sending
    #[arg(short, long)]
    pub yes: bool,

    /// Print every message (-v), plus debug logging (-vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// List the installed I2C buses and exit
    #[arg(short, long)]
    pub list: bool,

    /// Adapter timeout in units of 10 ms
    #[arg(long, value_parser = parse_number_u32)]
    pub timeout: Option<u32>,

    /// Number of retries when the target does not acknowledge
    #[arg(long, value_parser = parse_number_u32)]
    pub retries: Option<u32>,

    /// Bus number or adapter name
    #[arg(value_name = "I2CBUS")]
    pub bus: Option<String>,

    /// Message descriptors, each write followed by its data bytes
    #[arg(value_name = "DESC [DATA]", trailing_var_arg = true, allow_hyphen_values = true)]
    pub messages: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_transfer() {
        let cli = Cli::try_parse_from(["ri2c", "-y", "-f", "0", "w1@0x50", "0x64", "r8"]).unwrap();
        assert!(cli.yes);
        assert!(cli.force);
        assert_eq!(cli.bus.as_deref(), Some("0"));
        assert_eq!(cli.messages, ["w1@0x50", "0x64", "r8"]);
    }

    #[test]
    fn test_parse_run_length_suffix() {
        let cli = Cli::try_parse_from(["ri2c", "1", "w257@0x50", "0x42", "0xff-"]).unwrap();
        assert_eq!(cli.messages, ["w257@0x50", "0x42", "0xff-"]);
    }

    #[test]
    fn test_signed_data_reaches_compiler() {
        let cli = Cli::try_parse_from(["ri2c", "-y", "0", "w2@0x50", "-1", "+5"]).unwrap();
        assert_eq!(cli.messages, ["w2@0x50", "-1", "+5"]);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_timeout_and_retries() {
        let cli = Cli::try_parse_from(["ri2c", "--timeout", "0x10", "--retries", "5", "1"]).unwrap();
        assert_eq!(cli.timeout, Some(16));
        assert_eq!(cli.retries, Some(5));
        assert!(Cli::try_parse_from(["ri2c", "--timeout", "ten", "1"]).is_err());
    }

    #[test]
    fn test_verbose_count() {
        let cli = Cli::try_parse_from(["ri2c", "-vv", "-l"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.list);
        assert!(cli.bus.is_none());
    }
}
