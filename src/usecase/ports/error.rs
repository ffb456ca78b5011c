use crate::domain::column::ColumnNotFound;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    /// Required credentials or settings are absent. Fatal for a whole batch.
    ConfigurationMissing(String),
    ColumnNotFound(String),
    /// The remote side failed: network, HTTP status, refusal.
    External(String),
    /// The remote side answered with something we could not read.
    Parse(String),
    InvalidInput(String),
}

impl PortError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, PortError::ConfigurationMissing(_))
    }
}

impl std::fmt::Display for PortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortError::ConfigurationMissing(message) => {
                write!(f, "configuration missing: {message}")
            }
            PortError::ColumnNotFound(column) => write!(f, "Column \"{column}\" not found."),
            PortError::External(message) => write!(f, "{message}"),
            PortError::Parse(message) => write!(f, "unreadable response: {message}"),
            PortError::InvalidInput(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for PortError {}

impl From<ColumnNotFound> for PortError {
    fn from(value: ColumnNotFound) -> Self {
        PortError::ColumnNotFound(value.0)
    }
}
