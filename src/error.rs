use std::fmt;

/// Central error types for picker operations
#[derive(Debug)]
pub enum PickerError {
    /// Permission denied by the user or the platform
    PermissionDenied(String),
    /// Filesystem error
    Io(std::io::Error),
    /// Provider failed to launch or complete its request
    Provider(String),
}

impl fmt::Display for PickerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PickerError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            PickerError::Io(e) => write!(f, "IO error: {}", e),
            PickerError::Provider(msg) => write!(f, "Provider error: {}", msg),
        }
    }
}

impl std::error::Error for PickerError {}

impl From<std::io::Error> for PickerError {
    fn from(e: std::io::Error) -> Self {
        PickerError::Io(e)
    }
}
