use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::events::{RESULT_CANCELED, RESULT_ERROR, RESULT_OK};

/// Fixed message reported when a session ends without a usable image
pub const TASK_CANCELLED_MESSAGE: &str = "Task cancelled";

/// Acquisition source requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickerMode {
    Gallery,
    Camera,
}

/// Which provider produced a source file
///
/// Camera captures are scratch files owned by the controller; gallery files
/// reference user-owned media and are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileProvenance {
    Gallery,
    Camera,
}

/// A source image file together with its provenance tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub provenance: FileProvenance,
}

impl SourceFile {
    pub fn new(path: PathBuf, provenance: FileProvenance) -> Self {
        Self { path, provenance }
    }

    /// True when the file is a controller-owned scratch capture
    pub fn is_scratch(&self) -> bool {
        self.provenance == FileProvenance::Camera
    }
}

/// Builds a file:// URI for a local path
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Final image handed to the caller: filesystem path plus a locatable URI
#[derive(Debug, Clone, PartialEq)]
pub struct PickedImage {
    pub path: PathBuf,
    pub uri: String,
}

impl PickedImage {
    pub fn from_path(path: PathBuf) -> Self {
        let uri = file_uri(&path);
        Self { path, uri }
    }
}

/// Terminal outcome of one picker session, produced exactly once
#[derive(Debug, Clone, PartialEq)]
pub enum PickerResult {
    /// Single final image
    Picked(PickedImage),
    /// Multi-selection result, in pick order
    PickedMultiple(Vec<PathBuf>),
    /// User backed out at some stage
    Cancelled,
    /// Unrecoverable provider or configuration error
    Failed(String),
}

impl PickerResult {
    /// Host result code; errors stay distinguishable from cancellation
    pub fn result_code(&self) -> i32 {
        match self {
            PickerResult::Picked(_) | PickerResult::PickedMultiple(_) => RESULT_OK,
            PickerResult::Cancelled => RESULT_CANCELED,
            PickerResult::Failed(_) => RESULT_ERROR,
        }
    }

    /// Human-readable message for non-success outcomes
    pub fn message(&self) -> Option<&str> {
        match self {
            PickerResult::Cancelled => Some(TASK_CANCELLED_MESSAGE),
            PickerResult::Failed(msg) => Some(msg),
            PickerResult::Picked(_) | PickerResult::PickedMultiple(_) => None,
        }
    }
}
