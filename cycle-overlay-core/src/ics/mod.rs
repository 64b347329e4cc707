//! ICS generation for cycle overlay calendars.

pub mod generate;

pub use generate::build_calendar;
