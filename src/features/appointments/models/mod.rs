mod schedule;

pub use schedule::{Department, SlotKey, TimeSlot};
