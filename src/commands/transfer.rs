//! Combined transfer command implementation

use std::io::{self, BufRead, Write};

use bitflags::bitflags;
use ri2c_core::i2c::{Functionality, Message};
use ri2c_core::master::I2cMaster;
use ri2c_core::transfer::{compile, CompileFailure, MAX_MESSAGES};
use ri2c_core::CompileError;
use thiserror::Error;

bitflags! {
    /// Parts of a message to print
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PrintFlags: u8 {
        /// Payload of read messages
        const READ_BUF = 1 << 0;
        /// Payload of write messages
        const WRITE_BUF = 1 << 1;
        /// `Msg N: addr .., dir, len ..` header
        const HEADER = 1 << 2;
    }
}

/// Options for a transfer, taken from the command line
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Skip the busy check on the target addresses
    pub force: bool,
    /// Skip the confirmation prompt
    pub yes: bool,
    /// Print headers and write payloads too
    pub verbose: bool,
    /// Adapter timeout in units of 10 ms
    pub timeout: Option<u32>,
    /// Adapter retry count
    pub retries: Option<u32>,
}

/// How a transfer ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The adapter ran the transfer
    Sent {
        /// Messages the adapter reported as sent
        sent: usize,
        /// Messages in the plan
        total: usize,
    },
    /// The user declined at the prompt
    Aborted,
}

/// Errors from the transfer command
#[derive(Debug, Error)]
pub enum TransferError {
    /// A descriptor or data argument was rejected
    #[error("{source}\nError: faulty argument is '{argument}'")]
    FaultyArgument {
        #[source]
        source: CompileError,
        argument: String,
    },

    /// The arguments ended too early
    #[error("{0}")]
    Compile(#[source] CompileError),

    /// The adapter cannot run combined transfers
    #[error("Adapter does not have {0} capability")]
    MissingCapability(&'static str),

    /// The adapter reported an error
    #[error("{0}")]
    Adapter(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Reading the confirmation failed
    #[error("Could not read confirmation: {0}")]
    Prompt(#[source] io::Error),

    /// Writing the results failed
    #[error("Could not print messages: {0}")]
    Output(#[source] io::Error),
}

impl TransferError {
    fn adapter<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Adapter(Box::new(e))
    }

    fn compile(failure: CompileFailure, arguments: &[String]) -> Self {
        match failure.token.and_then(|i| arguments.get(i)) {
            Some(argument) => Self::FaultyArgument {
                source: failure.error,
                argument: argument.clone(),
            },
            None => Self::Compile(failure.error),
        }
    }
}

/// Print `messages` to `out`
///
/// A line is only ended when something was printed for the message, so
/// read payloads without headers come out one message per line.
pub fn print_messages(
    out: &mut dyn Write,
    messages: &[Message],
    flags: PrintFlags,
) -> io::Result<()> {
    for (i, msg) in messages.iter().enumerate() {
        let mut newline = flags.contains(PrintFlags::HEADER);

        if flags.contains(PrintFlags::HEADER) {
            write!(
                out,
                "Msg {}: addr 0x{:02x}, {}, len {}",
                i,
                msg.address().get(),
                msg.direction(),
                msg.len()
            )?;
        }

        let show_buf = if msg.is_read() {
            flags.contains(PrintFlags::READ_BUF)
        } else {
            flags.contains(PrintFlags::WRITE_BUF)
        };
        if !msg.is_empty() && show_buf {
            if flags.contains(PrintFlags::HEADER) {
                write!(out, ", buf ")?;
            }
            for b in msg.data() {
                write!(out, "0x{:02x} ", b)?;
            }
            newline = true;
        }

        if newline {
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_prompt(err: &mut dyn Write, device: &str, messages: &[Message]) -> io::Result<()> {
    writeln!(
        err,
        "WARNING! This program can confuse your I2C bus, cause data loss and worse!"
    )?;
    writeln!(
        err,
        "I will send the following messages to device file {}:",
        device
    )?;
    print_messages(err, messages, PrintFlags::HEADER | PrintFlags::WRITE_BUF)?;
    write!(err, "Continue? [y/N] ")?;
    err.flush()
}

/// Show what is about to be sent and ask the user to go ahead
///
/// Only an answer starting with `y` or `Y` counts as yes; an empty line
/// or end of input is a no.
pub fn confirm(
    device: &str,
    messages: &[Message],
    input: &mut dyn BufRead,
    err: &mut dyn Write,
) -> Result<bool, TransferError> {
    write_prompt(err, device, messages).map_err(TransferError::Output)?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(TransferError::Prompt)?;

    if answer.starts_with(['y', 'Y']) {
        return Ok(true);
    }

    writeln!(err, "Aborting on user request.").map_err(TransferError::Output)?;
    Ok(false)
}

/// Compile `arguments` and run them as one combined transfer on `master`
///
/// `device` names the adapter in the confirmation prompt. Read payloads
/// are printed to `out` afterwards; warnings and the prompt go to `err`.
pub fn run_transfer<M>(
    master: &mut M,
    device: &str,
    arguments: &[String],
    options: &TransferOptions,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Outcome, TransferError>
where
    M: I2cMaster,
    M::Error: std::error::Error + Send + Sync + 'static,
{
    let funcs = master.functionality().map_err(TransferError::adapter)?;
    if !funcs.contains(Functionality::I2C) {
        return Err(TransferError::MissingCapability("I2C transfers"));
    }

    let mut plan = compile(arguments, None, MAX_MESSAGES)
        .map_err(|failure| TransferError::compile(failure, arguments))?;

    log::debug!(
        "transfer: {} messages, {} bytes",
        plan.len(),
        plan.total_bytes()
    );

    // Selecting the address fails if a driver already owns it
    if !options.force {
        for address in plan.addresses() {
            master
                .set_target_address(address, false)
                .map_err(TransferError::adapter)?;
        }
    }

    if let Some(timeout) = options.timeout {
        master.set_timeout(timeout).map_err(TransferError::adapter)?;
    }
    if let Some(retries) = options.retries {
        master.set_retries(retries).map_err(TransferError::adapter)?;
    }

    if !options.yes && !confirm(device, plan.messages(), input, err)? {
        return Ok(Outcome::Aborted);
    }

    let total = plan.len();
    let sent = master
        .transfer(plan.messages_mut())
        .map_err(TransferError::adapter)?
        .min(total);

    if sent < total {
        writeln!(err, "Warning: only {}/{} messages were sent", sent, total)
            .map_err(TransferError::Output)?;
    }

    let mut flags = PrintFlags::READ_BUF;
    if options.verbose {
        flags |= PrintFlags::HEADER | PrintFlags::WRITE_BUF;
    }
    print_messages(out, &plan.messages()[..sent], flags).map_err(TransferError::Output)?;

    Ok(Outcome::Sent { sent, total })
}
