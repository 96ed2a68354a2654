use serde::Serialize;
use thiserror::Error;

/// A single rejected input field, reported back to the caller with the
/// original input so the form can be corrected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum EnrollError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Connection pool error: {message}")]
    PoolError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required field: {field}")]
    MissingFieldError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Student {student_id} is already enrolled in course {course_id}")]
    AlreadyEnrolled { course_id: i32, student_id: i32 },

    #[error("Validation failed: {}", summarize(.errors))]
    ValidationError { errors: Vec<FieldError> },
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Input,
    NotFound,
    Conflict,
    Validation,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EnrollError {
    pub fn not_found(id: i32) -> Self {
        EnrollError::NotFound {
            entity: "Enrollment",
            id,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        EnrollError::BadRequest {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EnrollError::DatabaseError(_) | EnrollError::PoolError { .. } => ErrorCategory::Storage,
            EnrollError::IoError(_) | EnrollError::ConfigError { .. } => {
                ErrorCategory::Configuration
            }
            EnrollError::MissingFieldError { .. }
            | EnrollError::InvalidValueError { .. }
            | EnrollError::ValidationError { .. } => ErrorCategory::Validation,
            EnrollError::BadRequest { .. } => ErrorCategory::Input,
            EnrollError::NotFound { .. } => ErrorCategory::NotFound,
            EnrollError::AlreadyEnrolled { .. } => ErrorCategory::Conflict,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::NotFound | ErrorCategory::Validation => {
                ErrorSeverity::Low
            }
            ErrorCategory::Conflict => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// 取得欄位錯誤清單 (非驗證錯誤回傳空清單)
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            EnrollError::ValidationError { errors } => errors.clone(),
            EnrollError::MissingFieldError { field } => {
                vec![FieldError::new(field.as_str(), "is required")]
            }
            EnrollError::InvalidValueError { field, reason, .. } => {
                vec![FieldError::new(field.as_str(), reason.as_str())]
            }
            _ => Vec::new(),
        }
    }

    /// Message safe to show an end user. Storage details never leave the
    /// process through this path.
    pub fn user_friendly_message(&self) -> String {
        match self {
            EnrollError::DatabaseError(_) | EnrollError::PoolError { .. } => {
                "Server error. Please contact your web administrator.".to_string()
            }
            EnrollError::AlreadyEnrolled { .. } => {
                "Student is already enrolled into course.".to_string()
            }
            EnrollError::NotFound { entity, id } => format!("{} {} was not found.", entity, id),
            EnrollError::BadRequest { message } => message.clone(),
            EnrollError::MissingFieldError { .. }
            | EnrollError::InvalidValueError { .. }
            | EnrollError::ValidationError { .. } => "Provided data is wrong.".to_string(),
            EnrollError::IoError(_) | EnrollError::ConfigError { .. } => {
                format!("Configuration problem: {}", self)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check the request parameters and try again",
            ErrorCategory::NotFound => "Refresh the enrollment list; the record may have been removed",
            ErrorCategory::Conflict => "Pick a different course or student",
            ErrorCategory::Validation => "Correct the highlighted fields and submit again",
            ErrorCategory::Storage => {
                "Check that the database file is reachable and not locked by another process"
            }
            ErrorCategory::Configuration => {
                "Check the configuration file path, TOML syntax and environment variables"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EnrollError>;
