//! Event types delivered by the host environment.
//!
//! The controller never interprets these itself. Every event is broadcast to
//! the live providers, and each provider decides by request code whether the
//! event belongs to its own outstanding request.

/// Host result code for a successful operation
pub const RESULT_OK: i32 = -1;

/// Host result code for a user-cancelled operation
pub const RESULT_CANCELED: i32 = 0;

/// Host result code for a failed operation, distinct from cancellation
pub const RESULT_ERROR: i32 = 64;

/// Outcome of a host permission dialog
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionResult {
    /// Request code the asking provider registered
    pub request_code: u32,
    /// Permissions that were asked for
    pub permissions: Vec<String>,
    /// Grant decision per permission, same order
    pub grants: Vec<bool>,
}

impl PermissionResult {
    /// True when every requested permission was granted
    pub fn all_granted(&self) -> bool {
        !self.grants.is_empty() && self.grants.iter().all(|granted| *granted)
    }
}

/// Outcome of an external host surface (gallery picker, camera app, crop
/// screen)
///
/// `data` is an opaque payload interpreted only by the provider that
/// registered `request_code`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityResult {
    pub request_code: u32,
    pub result_code: i32,
    pub data: Option<serde_json::Value>,
}

impl ActivityResult {
    pub fn is_ok(&self) -> bool {
        self.result_code == RESULT_OK
    }

    pub fn is_canceled(&self) -> bool {
        self.result_code == RESULT_CANCELED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_granted() {
        let result = PermissionResult {
            request_code: 4271,
            permissions: vec!["CAMERA".to_string(), "STORAGE".to_string()],
            grants: vec![true, true],
        };
        assert!(result.all_granted());

        let denied = PermissionResult {
            grants: vec![true, false],
            ..result.clone()
        };
        assert!(!denied.all_granted());

        let empty = PermissionResult {
            permissions: Vec::new(),
            grants: Vec::new(),
            ..result
        };
        assert!(!empty.all_granted());
    }

    #[test]
    fn test_result_code_helpers() {
        let ok = ActivityResult {
            request_code: 4281,
            result_code: RESULT_OK,
            data: None,
        };
        assert!(ok.is_ok());
        assert!(!ok.is_canceled());

        let canceled = ActivityResult {
            result_code: RESULT_CANCELED,
            ..ok
        };
        assert!(canceled.is_canceled());
    }
}
