//! Transfer-descriptor compiler

use core::fmt;
use core::mem;

use super::plan::{TransactionPlan, MAX_MESSAGES};
use crate::error::CompileError;
use crate::i2c::{Address, Direction, Message, MAX_LEN};
use crate::number;

/// Parser state between two arguments
#[derive(Debug)]
enum State {
    /// Next argument is a `{r|w}LENGTH[@ADDRESS]` descriptor
    ExpectDescriptor,
    /// Next argument holds payload bytes for `pending`, starting at `cursor`
    ExpectData { pending: Message, cursor: usize },
}

/// Incremental compiler for transfer descriptors
///
/// Feed it one argument at a time with [`feed`](Self::feed) and collect the
/// result with [`finish`](Self::finish). Most callers want [`compile`].
#[derive(Debug)]
pub struct Compiler {
    state: State,
    address: Option<Address>,
    max_messages: usize,
    plan: TransactionPlan,
}

impl Compiler {
    /// Create a compiler
    ///
    /// `default_address` is used by descriptors without `@ADDRESS` until one
    /// sets a new address. `max_messages` is capped at [`MAX_MESSAGES`].
    pub fn new(default_address: Option<Address>, max_messages: usize) -> Self {
        Self {
            state: State::ExpectDescriptor,
            address: default_address,
            max_messages: max_messages.min(MAX_MESSAGES),
            plan: TransactionPlan::new(),
        }
    }

    /// Returns true while a write is still waiting for data bytes
    pub fn expects_data(&self) -> bool {
        matches!(self.state, State::ExpectData { .. })
    }

    /// Number of completed messages so far
    pub fn len(&self) -> usize {
        self.plan.len()
    }

    /// Returns true if no message has been completed yet
    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    /// Consume one argument
    pub fn feed(&mut self, token: &str) -> Result<(), CompileError> {
        match self.state {
            State::ExpectDescriptor => self.descriptor(token),
            State::ExpectData { .. } => self.data(token),
        }
    }

    /// Finish compilation and return the plan
    pub fn finish(self) -> Result<TransactionPlan, CompileError> {
        if self.expects_data() || self.plan.is_empty() {
            return Err(CompileError::Incomplete);
        }
        Ok(self.plan)
    }

    fn descriptor(&mut self, token: &str) -> Result<(), CompileError> {
        let direction = match token.as_bytes().first() {
            Some(b'r') => Direction::Read,
            Some(b'w') => Direction::Write,
            _ => return Err(CompileError::BadDirection),
        };

        // The direction letter is ASCII, so slicing after it is safe
        let (len, rest) = number::parse_prefix(&token[1..]);
        if len > MAX_LEN as u64 {
            return Err(CompileError::LengthOutOfRange);
        }

        let address = if rest.is_empty() {
            self.address.ok_or(CompileError::NoAddress)?
        } else {
            let arg = rest.strip_prefix('@').ok_or(CompileError::MissingAt)?;
            // 10-bit addresses would need their own marker here
            let address = Address::parse(arg).map_err(|_| CompileError::BadAddress)?;
            self.address = Some(address);
            address
        };

        if self.plan.len() >= self.max_messages {
            return Err(CompileError::TooManyMessages);
        }

        let msg = Message::zeroed(address, direction, len as u16);
        if direction == Direction::Read || msg.is_empty() {
            self.append(msg)
        } else {
            self.state = State::ExpectData {
                pending: msg,
                cursor: 0,
            };
            Ok(())
        }
    }

    fn data(&mut self, token: &str) -> Result<(), CompileError> {
        let State::ExpectData { pending, cursor } = &mut self.state else {
            return Err(CompileError::Incomplete);
        };

        let (raw, rest) = number::parse_prefix(token);
        if raw > u64::from(u8::MAX) {
            return Err(CompileError::BadByte);
        }
        let mut value = raw as u8;
        let suffix = rest.as_bytes().first().copied();

        let buf = pending.data_mut();
        while *cursor < buf.len() {
            buf[*cursor] = value;
            *cursor += 1;

            match suffix {
                None => break,
                Some(b'+') => value = value.wrapping_add(1),
                Some(b'-') => value = value.wrapping_sub(1),
                Some(b'=') => {}
                Some(_) => return Err(CompileError::BadByteSuffix),
            }
        }

        if *cursor == buf.len() {
            if let State::ExpectData { pending, .. } =
                mem::replace(&mut self.state, State::ExpectDescriptor)
            {
                return self.append(pending);
            }
        }

        Ok(())
    }

    fn append(&mut self, msg: Message) -> Result<(), CompileError> {
        log::trace!(
            "msg {}: addr {}, {}, len {}",
            self.plan.len(),
            msg.address(),
            msg.direction(),
            msg.len()
        );
        self.plan
            .push(msg)
            .map_err(|_| CompileError::TooManyMessages)
    }
}

/// A compile error together with the argument that caused it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileFailure {
    /// What went wrong
    pub error: CompileError,
    /// Zero-based index of the offending argument, `None` when the input
    /// ended prematurely
    pub token: Option<usize>,
}

impl fmt::Display for CompileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token {
            Some(index) => write!(f, "{} (argument {})", self.error, index + 1),
            None => write!(f, "{}", self.error),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CompileFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Compile a sequence of descriptor and data arguments into a plan
///
/// `default_address` seeds the address used by descriptors without an
/// `@ADDRESS` suffix. At most `max_messages` messages are accepted (never
/// more than [`MAX_MESSAGES`]).
pub fn compile<I, S>(
    tokens: I,
    default_address: Option<Address>,
    max_messages: usize,
) -> Result<TransactionPlan, CompileFailure>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut compiler = Compiler::new(default_address, max_messages);

    for (index, token) in tokens.into_iter().enumerate() {
        compiler.feed(token.as_ref()).map_err(|error| CompileFailure {
            error,
            token: Some(index),
        })?;
    }

    compiler
        .finish()
        .map_err(|error| CompileFailure { error, token: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;

    fn addr(a: u8) -> Address {
        Address::try_from(a).unwrap()
    }

    fn compile_all(tokens: &[&str]) -> Result<TransactionPlan, CompileFailure> {
        compile(tokens.iter().copied(), None, MAX_MESSAGES)
    }

    fn error_of(tokens: &[&str]) -> CompileError {
        compile_all(tokens).unwrap_err().error
    }

    #[test]
    fn test_single_write() {
        let plan = compile_all(&["w3@0x50", "0x10", "0x11", "0x12"]).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].direction(), Direction::Write);
        assert_eq!(plan[0].address(), addr(0x50));
        assert_eq!(plan[0].len(), 3);
        assert_eq!(plan[0].data(), &[0x10, 0x11, 0x12]);
    }

    #[test]
    fn test_eeprom_page_write_with_decrement() {
        let plan = compile_all(&["w257@0x50", "0x42", "0xff-"]).unwrap();
        assert_eq!(plan.len(), 1);
        let data = plan[0].data();
        assert_eq!(data.len(), 257);
        assert_eq!(data[0], 0x42);
        for (i, &b) in data[1..].iter().enumerate() {
            assert_eq!(b, 0xff - i as u8);
        }
        assert_eq!(data[256], 0x00);
    }

    #[test]
    fn test_suffix_wraps_around() {
        let plan = compile_all(&["w4@0x50", "0x01-"]).unwrap();
        assert_eq!(plan[0].data(), &[0x01, 0x00, 0xff, 0xfe]);

        let plan = compile_all(&["w3@0x50", "0xfe+"]).unwrap();
        assert_eq!(plan[0].data(), &[0xfe, 0xff, 0x00]);

        let plan = compile_all(&["w5@0x50", "7="]).unwrap();
        assert_eq!(plan[0].data(), &[7, 7, 7, 7, 7]);
    }

    #[test]
    fn test_suffix_after_explicit_bytes() {
        let plan = compile_all(&["w6@0x50", "0x00", "0x10", "0x20+"]).unwrap();
        assert_eq!(plan[0].data(), &[0x00, 0x10, 0x20, 0x21, 0x22, 0x23]);
    }

    #[test]
    fn test_address_carry_forward() {
        let plan = compile_all(&["w1@0x50", "0x00", "r4"]).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].address(), addr(0x50));
        assert_eq!(plan[1].address(), addr(0x50));
        assert!(plan[1].is_read());
        assert_eq!(plan[1].data(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_address_switch() {
        let plan = compile_all(&["r1@0x50", "r1@0x51", "r1"]).unwrap();
        let addrs: Vec<u8> = plan.iter().map(|m| m.address().get()).collect();
        assert_eq!(addrs, [0x50, 0x51, 0x51]);
        assert_eq!(plan.addresses(), [addr(0x50), addr(0x51)]);
    }

    #[test]
    fn test_default_address() {
        let plan = compile(["r2"], Some(addr(0x20)), MAX_MESSAGES).unwrap();
        assert_eq!(plan[0].address(), addr(0x20));
    }

    #[test]
    fn test_zero_length_consumes_no_data() {
        let plan = compile_all(&["w0@0x50", "r1"]).unwrap();
        assert_eq!(plan.len(), 2);
        assert!(plan[0].is_empty());
        assert_eq!(plan[0].direction(), Direction::Write);
        assert!(plan[1].is_read());
    }

    #[test]
    fn test_no_digits_means_zero_length() {
        let plan = compile_all(&["r@0x50"]).unwrap();
        assert_eq!(plan[0].len(), 0);
    }

    #[test]
    fn test_descriptor_errors() {
        assert_eq!(error_of(&["x1@0x50"]), CompileError::BadDirection);
        assert_eq!(error_of(&[""]), CompileError::BadDirection);
        assert_eq!(error_of(&["r65536@0x50"]), CompileError::LengthOutOfRange);
        assert_eq!(error_of(&["r1#0x50"]), CompileError::MissingAt);
        assert_eq!(error_of(&["r1@0x78"]), CompileError::BadAddress);
        assert_eq!(error_of(&["r1@0x02"]), CompileError::BadAddress);
        assert_eq!(error_of(&["r1@eeprom"]), CompileError::BadAddress);
        assert_eq!(error_of(&["r1"]), CompileError::NoAddress);
    }

    #[test]
    fn test_max_length_accepted() {
        let plan = compile_all(&["r65535@0x50"]).unwrap();
        assert_eq!(plan[0].len(), 65535);
    }

    #[test]
    fn test_data_errors() {
        assert_eq!(error_of(&["w1@0x50", "256"]), CompileError::BadByte);
        assert_eq!(error_of(&["w2@0x50", "0x10*"]), CompileError::BadByteSuffix);
        assert_eq!(error_of(&["w2@0x50", "zz"]), CompileError::BadByteSuffix);
    }

    #[test]
    fn test_signed_literals() {
        let plan = compile_all(&["w1@0x50", "+5"]).unwrap();
        assert_eq!(plan[0].data(), &[0x05]);

        let plan = compile_all(&["w3@0x50", "+0x10+"]).unwrap();
        assert_eq!(plan[0].data(), &[0x10, 0x11, 0x12]);

        let plan = compile_all(&["w+3@0x50", "1", "2", "3"]).unwrap();
        assert_eq!(plan[0].len(), 3);
        assert_eq!(plan[0].data(), &[1, 2, 3]);

        // negative values wrap around and are out of range
        assert_eq!(error_of(&["w3@0x50", "-1"]), CompileError::BadByte);
        assert_eq!(error_of(&["w-1@0x50"]), CompileError::LengthOutOfRange);
        assert_eq!(error_of(&["r1@-0x50"]), CompileError::BadAddress);
    }

    #[test]
    fn test_incomplete() {
        let failure = compile_all(&["w2@0x50", "0x00"]).unwrap_err();
        assert_eq!(failure.error, CompileError::Incomplete);
        assert_eq!(failure.token, None);

        assert_eq!(error_of(&[]), CompileError::Incomplete);
    }

    #[test]
    fn test_failure_points_at_argument() {
        let failure = compile_all(&["w1@0x50", "0x00", "q1"]).unwrap_err();
        assert_eq!(failure.error, CompileError::BadDirection);
        assert_eq!(failure.token, Some(2));
        assert_eq!(format!("{}", failure), "invalid direction (argument 3)");
    }

    #[test]
    fn test_message_limit() {
        let exact: Vec<String> = (0..MAX_MESSAGES).map(|_| String::from("r1@0x50")).collect();
        assert_eq!(compile(&exact, None, MAX_MESSAGES).unwrap().len(), MAX_MESSAGES);

        let mut over = exact.clone();
        over.push(String::from("r1"));
        let failure = compile(&over, None, MAX_MESSAGES).unwrap_err();
        assert_eq!(failure.error, CompileError::TooManyMessages);
        assert_eq!(failure.token, Some(MAX_MESSAGES));
    }

    #[test]
    fn test_custom_message_limit() {
        assert!(compile(["r1@0x50", "r1"], None, 2).is_ok());
        assert_eq!(
            compile(["r1@0x50", "r1", "w1", "0"], None, 2)
                .unwrap_err()
                .error,
            CompileError::TooManyMessages
        );
    }

    #[test]
    fn test_incremental_state() {
        let mut compiler = Compiler::new(None, MAX_MESSAGES);
        assert!(compiler.is_empty());
        compiler.feed("w2@0x50").unwrap();
        assert!(compiler.expects_data());
        compiler.feed("1").unwrap();
        assert!(compiler.expects_data());
        compiler.feed("2").unwrap();
        assert!(!compiler.expects_data());
        assert_eq!(compiler.len(), 1);
        assert_eq!(compiler.finish().unwrap()[0].data(), &[1, 2]);
    }
}
