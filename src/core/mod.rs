//! # Core Module
//!
//! Configuration, error taxonomy and text formatting shared by every feature.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod config;
pub mod error;
pub mod format;
pub mod response;

// Re-export commonly used items
pub use config::{Config, StorageBackend};
pub use error::{DeliveryError, ParseError, ReminderError, StoreError, ValidationError};
pub use format::{discord_timestamp, format_display_time, format_duration, format_time_left};
pub use response::{truncate_for_field, truncate_for_message, FIELD_LIMIT, MESSAGE_LIMIT};
