//! Provider seams for the acquisition and transform steps.
//!
//! Each provider encapsulates one step (gallery pick, camera capture, crop,
//! compress) and its own async protocol with the underlying platform. Host
//! events are broadcast to every live provider; a provider claims an event
//! by the request code it registered when it launched its request and
//! answers [`ProviderResponse::Ignored`] for everything else. The controller
//! does no request-code filtering, so adding a provider never touches the
//! dispatch code.

use std::path::{Path, PathBuf};

use crate::error::PickerError;
use crate::events::{ActivityResult, PermissionResult};
use crate::snapshot::StateBundle;

/// Answer a provider gives for a host event that was broadcast to it
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResponse {
    /// The event did not belong to this provider's request code
    Ignored,
    /// The provider produced its output file
    Resolved(PathBuf),
    /// Multi-selection produced several files at once
    ResolvedMultiple(Vec<PathBuf>),
    /// The user backed out of the provider's surface
    Cancelled,
    /// The provider hit an unrecoverable error
    Failed(String),
}

/// An image acquisition step: gallery pick or camera capture
///
/// Providers that hand control to an external surface (camera app, system
/// picker) persist their own transient state, e.g. the pending output path,
/// through the save/restore hooks.
pub trait SourceProvider {
    /// Begin the asynchronous request against the host surface
    fn launch(&mut self) -> Result<(), PickerError>;

    /// Permission dialog outcome. Providers that never ask for permissions
    /// keep the default.
    fn on_permission_result(&mut self, _event: &PermissionResult) -> ProviderResponse {
        ProviderResponse::Ignored
    }

    /// Host surface outcome
    fn on_activity_result(&mut self, event: &ActivityResult) -> ProviderResponse;

    /// Persist transient request state before the host may destroy the
    /// session
    fn save_state(&self, _bundle: &mut StateBundle) {}

    /// Restore transient request state after the host recreated the session
    fn restore_state(&mut self, _bundle: &StateBundle) {}
}

/// The crop step, applied to an already-acquired source file
pub trait CropProvider {
    /// Whether the caller enabled cropping for this session
    fn is_crop_enabled(&self) -> bool;

    /// Begin a crop request for `input` against the host surface
    fn launch(&mut self, input: &Path) -> Result<(), PickerError>;

    /// Host surface outcome
    fn on_activity_result(&mut self, event: &ActivityResult) -> ProviderResponse;

    fn save_state(&self, _bundle: &mut StateBundle) {}

    fn restore_state(&mut self, _bundle: &StateBundle) {}
}

/// The compression step
///
/// Runs synchronously inside the dispatch that triggers it; the controller
/// observes only the single completed result, never partial progress.
pub trait CompressionProvider {
    /// Whether `file` needs compression before being handed to the caller
    fn is_compression_required(&self, file: &Path) -> bool;

    /// Compress `file` into a new file and return its path
    fn compress(&mut self, file: &Path) -> Result<PathBuf, PickerError>;
}
