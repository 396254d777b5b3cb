pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::storage::LocalStorage;
pub use crate::app::build_dag;
pub use crate::config::DagConfig;
pub use crate::core::{
    dag::Dag,
    etl::{DagRunResult, EtlEngine},
};
pub use crate::domain::model::{PipelineSummary, RunContext};
pub use crate::utils::error::{EtlError, Result};
