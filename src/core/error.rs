//! Error taxonomy shared by the reminder and announcement features
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Parse, validation, store and delivery errors split into separate types

use thiserror::Error;

/// Duration token did not match the `<integer><unit>` grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty duration")]
    Empty,

    #[error("unrecognised duration: {0}")]
    Unrecognized(String),

    #[error("duration out of range: {0}")]
    OutOfRange(String),
}

/// A command was well-formed enough to dispatch but its arguments are unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid time format")]
    InvalidTimeFormat,

    #[error("message required")]
    MessageRequired,

    #[error("invalid reminder index")]
    InvalidIndex,

    #[error("invalid weekday: {0}")]
    InvalidWeekday(String),

    #[error("invalid time of day")]
    InvalidTimeOfDay,

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid mention: {0}")]
    InvalidMention(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is closed")]
    Closed,

    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Notification could not be handed to the messaging client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("invalid target id: {0}")]
    InvalidTarget(String),

    #[error("target unreachable: {0}")]
    Unreachable(String),
}

/// Errors surfaced to whoever invoked a reminder or announcement command.
#[derive(Debug, Error)]
pub enum ReminderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReminderError {
    /// Text shown to the command invoker.
    ///
    /// Store failures are reported generically; the detail only goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            ReminderError::Validation(ValidationError::InvalidTimeFormat) => {
                "Invalid time format. Use formats like `30m`, `2h`, `1d`, `1h30m` or `2w`.".to_string()
            }
            ReminderError::Validation(ValidationError::MessageRequired) => {
                "You must provide a message for the reminder.".to_string()
            }
            ReminderError::Validation(ValidationError::InvalidIndex) => {
                "Invalid reminder index.".to_string()
            }
            ReminderError::Validation(ValidationError::InvalidWeekday(_)) => format!(
                "Invalid day. Use one of: {}",
                crate::features::announcements::WEEKDAY_NAMES.join(", ")
            ),
            ReminderError::Validation(ValidationError::InvalidTimeOfDay) => {
                "Please use a valid 24-hour time (0-23) and minutes (0-59).".to_string()
            }
            ReminderError::Validation(other) => {
                let text = other.to_string();
                let mut chars = text.chars();
                match chars.next() {
                    Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
                    None => text,
                }
            }
            ReminderError::Store(_) => "There was an error saving the reminder.".to_string(),
        }
    }
}

impl From<ParseError> for ValidationError {
    fn from(_: ParseError) -> Self {
        ValidationError::InvalidTimeFormat
    }
}
