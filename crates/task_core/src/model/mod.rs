mod task;

pub use task::{Task, TaskInput, TaskPriority, TaskStatus};
