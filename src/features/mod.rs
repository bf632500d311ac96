//! # Features
//!
//! - `reminders`: one-shot reminders delivered by direct message
//! - `announcements`: weekly per-guild channel announcement

pub mod announcements;
pub mod reminders;
