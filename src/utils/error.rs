use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Task {task_id} failed: {message}")]
    TaskError { task_id: String, message: String },

    #[error("No {what} found in XCom from {task_id}")]
    XComMissing { task_id: String, what: String },

    #[error("DAG definition error: {message}")]
    DagError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Configuration,
    Workflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn task(task_id: &str, message: impl Into<String>) -> Self {
        EtlError::TaskError {
            task_id: task_id.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ValidationError { .. } => ErrorCategory::Data,
            EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            EtlError::TaskError { .. } | EtlError::XComMissing { .. } | EtlError::DagError { .. } => {
                ErrorCategory::Workflow
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Workflow => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the API endpoint is reachable and retry the run",
            ErrorCategory::Data => "Inspect the raw payload; the API may have changed its response shape",
            ErrorCategory::Storage => "Check that the base directory exists and is writable",
            ErrorCategory::Configuration => "Review the CLI flags, ETL_VAR_* variables and the TOML config",
            ErrorCategory::Workflow => "Check the task logs above for the first failing task",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ApiError(e) if e.is_timeout() => "The API request timed out".to_string(),
            EtlError::ApiError(e) => match e.status() {
                Some(status) => format!("The API answered with HTTP {}", status),
                None => "Could not reach the API".to_string(),
            },
            EtlError::IoError(e) => format!("File system error: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
