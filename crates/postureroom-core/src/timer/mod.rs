mod task;

pub use task::{ScheduledTask, TimerSlot};
