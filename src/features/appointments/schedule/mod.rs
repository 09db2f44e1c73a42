#[cfg(test)]
mod memory_schedule_index;
mod pg_schedule_index;
mod schedule_index;

#[cfg(test)]
pub use memory_schedule_index::InMemoryScheduleIndex;
pub use pg_schedule_index::PgScheduleIndex;
pub use schedule_index::ScheduleIndex;
