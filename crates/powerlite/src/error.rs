//! Error types for powerlite

use thiserror::Error;

/// Result type alias for powerlite operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Unsupported driver or failed connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// Unknown parameter name or malformed parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Malformed WHERE condition
    #[error("Condition error: {0}")]
    ConditionCompile(String),

    /// The backend rejected a statement.
    ///
    /// `sql` carries the statement with its placeholders substituted for
    /// display. It is never sent to the database.
    #[error("Database error: {message} | {sql}")]
    Execution { message: String, sql: String },

    /// Operation not supported by the active dialect
    #[error("Unsupported operation: {0}")]
    Capability(String),

    /// Operation called out of sequence
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Pagination could not be computed
    #[error("Pagination error: {0}")]
    Pagination(String),

    /// Raw error reported by a client implementation
    #[error("Driver error: {0}")]
    Driver(String),
}

impl DbError {
    /// Create an execution error carrying the rendered SQL
    pub fn execution(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            sql: sql.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Create a driver error
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver(message.into())
    }

    /// Check if this is an execution error
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }

    /// Check if this is a capability error
    pub fn is_capability(&self) -> bool {
        matches!(self, Self::Capability(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Message text without the variant prefix, for wrapping into an
    /// execution error.
    pub(crate) fn into_message(self) -> String {
        match self {
            Self::Driver(msg) | Self::Connection(msg) => msg,
            other => other.to_string(),
        }
    }

    /// The rendered SQL attached to an execution error.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Execution { sql, .. } => Some(sql),
            _ => None,
        }
    }
}

impl From<url::ParseError> for DbError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidParameter(format!("invalid connection url: {err}"))
    }
}

impl From<toml::de::Error> for DbError {
    fn from(err: toml::de::Error) -> Self {
        Self::InvalidParameter(format!("invalid configuration: {err}"))
    }
}

#[cfg(feature = "postgres")]
impl From<postgres::Error> for DbError {
    fn from(err: postgres::Error) -> Self {
        match err.as_db_error() {
            Some(db_err) => Self::Driver(format!("{}: {}", db_err.code().code(), db_err.message())),
            None => Self::Driver(err.to_string()),
        }
    }
}
