//! Conversation messages exchanged on the channel.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Author of a message.
///
/// The channel labels the counterparty `scammer` and the decoy agent `user`.
/// Unknown labels are preserved verbatim and never count as counterparty
/// activity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sender {
    /// The suspected fraudster on the other end of the channel.
    Scammer,
    /// The decoy agent (our own replies).
    User,
    /// Any other label supplied by the channel.
    Other(String),
}

impl Sender {
    /// Returns true if the message was authored by the counterparty.
    pub fn is_counterparty(&self) -> bool {
        matches!(self, Sender::Scammer)
    }

    /// Returns the wire label.
    pub fn as_str(&self) -> &str {
        match self {
            Sender::Scammer => "scammer",
            Sender::User => "user",
            Sender::Other(label) => label,
        }
    }
}

impl From<String> for Sender {
    fn from(label: String) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "scammer" => Sender::Scammer,
            "user" => Sender::User,
            _ => Sender::Other(label),
        }
    }
}

impl From<Sender> for String {
    fn from(sender: Sender) -> Self {
        sender.as_str().to_string()
    }
}

/// A single message in a session's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    /// Unix milliseconds, when the channel supplied one.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl Message {
    /// Creates a new message.
    pub fn new(sender: Sender, text: impl Into<String>, timestamp: Option<i64>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp,
        }
    }

    /// Creates a counterparty message.
    pub fn scammer(text: impl Into<String>) -> Self {
        Self::new(Sender::Scammer, text, None)
    }

    /// Creates an agent reply stamped with the current time.
    pub fn agent_reply(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text, Some(Timestamp::now().as_unix_millis()))
    }

    /// Returns true if the counterparty authored this message.
    pub fn is_from_counterparty(&self) -> bool {
        self.sender.is_counterparty()
    }
}
