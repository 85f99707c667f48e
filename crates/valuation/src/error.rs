#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// The table could not be parsed.
    Parse(String),
    /// The table parsed but violates an invariant.
    Invalid(String),
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Parse(msg) => write!(f, "data table parse error: {msg}"),
            DataError::Invalid(msg) => write!(f, "invalid data table: {msg}"),
        }
    }
}

impl std::error::Error for DataError {}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Parse(err.to_string())
    }
}
