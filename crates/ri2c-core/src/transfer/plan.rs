//! Bounded message list submitted as one transaction

use alloc::vec::Vec;
use core::ops::Deref;

use crate::i2c::{Address, Message};

/// Maximum number of messages in one combined transfer
///
/// Matches the kernel's `I2C_RDRW_IOCTL_MAX_MSGS`.
pub const MAX_MESSAGES: usize = 42;

/// Ordered list of messages sent as a single combined transfer
///
/// Plans are only built by the [`Compiler`](super::Compiler); once handed
/// out they can no longer grow. The message buffers stay writable so a
/// driver can fill in read results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPlan {
    messages: heapless::Vec<Message, MAX_MESSAGES>,
}

impl TransactionPlan {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a message, handing it back if the plan is full
    pub(crate) fn push(&mut self, msg: Message) -> Result<(), Message> {
        self.messages.push(msg)
    }

    /// All messages in submission order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Mutable access to the messages for submission
    pub fn messages_mut(&mut self) -> &mut [Message] {
        &mut self.messages
    }

    /// Distinct target addresses in order of first use
    pub fn addresses(&self) -> Vec<Address> {
        let mut addrs: Vec<Address> = Vec::new();
        for msg in self.messages.iter() {
            if !addrs.contains(&msg.address()) {
                addrs.push(msg.address());
            }
        }
        addrs
    }

    /// Total number of payload bytes across all messages
    pub fn total_bytes(&self) -> usize {
        self.messages.iter().map(|m| usize::from(m.len())).sum()
    }
}

impl Deref for TransactionPlan {
    type Target = [Message];

    fn deref(&self) -> &[Message] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a TransactionPlan {
    type Item = &'a Message;
    type IntoIter = core::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
