//! ri2c - Send user-defined I2C messages in one combined transfer
//!
//! The bus is given by number or by adapter name; the remaining arguments
//! describe a sequence of read and write messages which are sent to the
//! adapter as a single `I2C_RDWR` transaction, with one STOP at the end.
//!
//! # Architecture
//!
//! - `ri2c-core` parses the message descriptors and resolves bus names
//!   against a bus directory
//! - `ri2c-linux` talks to `/dev/i2c-N` and builds the directory from sysfs
//! - `commands` holds the command implementations, written against the
//!   `I2cMaster` trait

mod cli;
mod commands;

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use cli::Cli;
use commands::{Outcome, TransferOptions};
use ri2c_linux::LinuxI2c;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Help and version are not errors
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // -v only adds message output, -vv and up turn on logging
    match cli.verbose {
        0 | 1 => {}
        2 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.list {
        let directory = ri2c_linux::enumerate()?;
        log::debug!("Found {} I2C buses", directory.len());
        commands::list_buses(&directory, &mut io::stdout().lock())?;
        return Ok(());
    }

    let Some(bus_arg) = cli.bus.as_deref() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let bus = ri2c_linux::resolve(bus_arg)?;
    let mut i2c = LinuxI2c::open(bus)?;
    let device = i2c.path().to_owned();

    let options = transfer_options(&cli);

    let outcome = commands::run_transfer(
        &mut i2c,
        &device,
        &cli.messages,
        &options,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
        &mut io::stderr(),
    )?;

    match outcome {
        Outcome::Sent { sent, total } => log::debug!("{}: sent {}/{} messages", device, sent, total),
        Outcome::Aborted => log::debug!("{}: nothing sent", device),
    }

    Ok(())
}

fn transfer_options(cli: &Cli) -> TransferOptions {
    TransferOptions {
        force: cli.force,
        yes: cli.yes,
        verbose: cli.verbose > 0,
        timeout: cli.timeout,
        retries: cli.retries,
    }
}
