//! # Reminders Feature
//!
//! One-shot reminders: `remind` parses a duration and message, the reminder is
//! persisted and mirrored in memory, and a fixed-interval sweep delivers it by
//! direct message exactly once.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod command;
pub mod delivery;
pub mod duration;
pub mod model;
pub mod registry;
pub mod scheduler;

pub use command::{parse_command, ReminderRequest};
pub use delivery::{DeliveryPayload, DirectMessageNotifier, ReminderNotifier};
pub use model::{Reminder, ReminderId};
pub use registry::ReminderRegistry;
pub use scheduler::{BulkRemoval, ReminderScheduler, SweepReport};
