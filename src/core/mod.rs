pub mod context;
pub mod dag;
pub mod etl;
pub mod schedule;

pub use crate::domain::model::{Record, RunContext, TaskState};
pub use crate::domain::ports::{ConfigProvider, Storage, Task};
pub use crate::utils::error::Result;
