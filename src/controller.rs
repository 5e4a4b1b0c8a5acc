//! The orchestrating state machine for one image-acquisition session.
//!
//! A session flows linearly: source (gallery or camera) → optional crop →
//! optional compression → terminal result. The controller is single-threaded
//! and event-driven; it is reentered only through discrete host events
//! delivered serially, so it holds no locks. Camera, gallery and crop
//! suspend the pipeline by handing control to an external surface; the
//! controller resumes when that surface's result event arrives.

use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::error::PickerError;
use crate::events::{ActivityResult, PermissionResult};
use crate::models::{
    FileProvenance, PickedImage, PickerMode, PickerResult, SourceFile, TASK_CANCELLED_MESSAGE,
};
use crate::provider::{CompressionProvider, CropProvider, ProviderResponse, SourceProvider};
use crate::snapshot::{ControllerSnapshot, StateBundle};

/// Providers wired into a controller before a session starts
pub struct ProviderBundle {
    pub gallery: Box<dyn SourceProvider>,
    pub camera: Box<dyn SourceProvider>,
    pub crop: Box<dyn CropProvider>,
    pub compression: Box<dyn CompressionProvider>,
}

/// The acquisition provider selected for this session
///
/// Exactly one of gallery/camera exists once a session runs; the variant
/// fixes the provenance of every file the provider produces.
enum ActiveSource {
    Gallery(Box<dyn SourceProvider>),
    Camera(Box<dyn SourceProvider>),
}

impl ActiveSource {
    fn provider(&self) -> &dyn SourceProvider {
        match self {
            ActiveSource::Gallery(p) | ActiveSource::Camera(p) => p.as_ref(),
        }
    }

    fn provider_mut(&mut self) -> &mut dyn SourceProvider {
        match self {
            ActiveSource::Gallery(p) | ActiveSource::Camera(p) => p.as_mut(),
        }
    }

    fn provenance(&self) -> FileProvenance {
        match self {
            ActiveSource::Gallery(_) => FileProvenance::Gallery,
            ActiveSource::Camera(_) => FileProvenance::Camera,
        }
    }

    fn mode(&self) -> PickerMode {
        match self {
            ActiveSource::Gallery(_) => PickerMode::Gallery,
            ActiveSource::Camera(_) => PickerMode::Camera,
        }
    }
}

/// Where the session currently waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControllerState {
    /// No session started yet
    Idle,
    /// Waiting for the gallery or camera surface
    WaitingForSource,
    /// Waiting for the crop surface
    Cropping,
    /// Compression running inside the current dispatch
    Compressing,
    /// Terminal result delivered
    Finished,
}

/// Orchestrates one image-acquisition session from start to terminal result
///
/// Every inbound method returns `Some(result)` when it produced the
/// session's terminal result. The terminal result is produced exactly once;
/// every event arriving after it is ignored.
pub struct PickerController {
    session_id: Uuid,
    state: ControllerState,
    // Parked here until start() or restore_state() selects one; the
    // unselected handle is dropped at that point.
    gallery: Option<Box<dyn SourceProvider>>,
    camera: Option<Box<dyn SourceProvider>>,
    source: Option<ActiveSource>,
    crop: Box<dyn CropProvider>,
    compression: Box<dyn CompressionProvider>,
    source_file: Option<SourceFile>,
    crop_file: Option<PathBuf>,
    started_at: Option<i64>,
}

impl PickerController {
    pub fn new(providers: ProviderBundle) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: ControllerState::Idle,
            gallery: Some(providers.gallery),
            camera: Some(providers.camera),
            source: None,
            crop: providers.crop,
            compression: providers.compression,
            source_file: None,
            crop_file: None,
            started_at: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn is_finished(&self) -> bool {
        self.state == ControllerState::Finished
    }

    /// Start a fresh session
    ///
    /// A missing mode is a fatal configuration error: the session finishes
    /// with an Error result carrying the fixed cancellation message and no
    /// provider is touched. Otherwise the matching provider is launched
    /// immediately.
    pub fn start(&mut self, mode: Option<PickerMode>) -> Option<PickerResult> {
        if self.state != ControllerState::Idle {
            log::warn!("[{}] start on a running session, ignoring", self.session_id);
            return None;
        }
        let mode = match mode {
            Some(mode) => mode,
            None => {
                log::error!("[{}] no picker mode supplied", self.session_id);
                return Some(self.finish(PickerResult::Failed(TASK_CANCELLED_MESSAGE.to_string())));
            }
        };
        if let Err(e) = self.select_source(mode) {
            return Some(self.finish_failed(e.to_string()));
        }
        self.state = ControllerState::WaitingForSource;
        self.started_at = Some(Utc::now().timestamp_millis());
        log::debug!("[{}] session started in {:?} mode", self.session_id, mode);

        let launched = match self.source.as_mut() {
            Some(source) => source.provider_mut().launch(),
            None => Err(PickerError::Provider("no source selected".to_string())),
        };
        match launched {
            Ok(()) => None,
            Err(e) => Some(self.finish_failed(format!("source launch failed: {}", e))),
        }
    }

    /// Rebuild a session from a persisted snapshot
    ///
    /// Re-selects the source provider for the persisted mode, rehydrates the
    /// controller's file references, and hands each provider its own payload
    /// back before any callback is dispatched. The source provider is not
    /// re-launched: its restored state governs resumption.
    pub fn restore_state(&mut self, snapshot: &ControllerSnapshot) -> Option<PickerResult> {
        if self.state != ControllerState::Idle {
            log::warn!("[{}] restore on a running session, ignoring", self.session_id);
            return None;
        }
        if !snapshot.is_compatible() {
            return Some(
                self.finish_failed(format!("unsupported snapshot version {}", snapshot.version)),
            );
        }
        if let Err(e) = self.select_source(snapshot.mode) {
            return Some(self.finish_failed(e.to_string()));
        }
        self.source_file = snapshot.source_file.clone();
        self.started_at = Some(Utc::now().timestamp_millis());

        if let Some(source) = self.source.as_mut() {
            source.provider_mut().restore_state(&snapshot.providers);
        }
        self.crop.restore_state(&snapshot.providers);

        // A recorded source file means the source already resolved; the only
        // stage that can still be outstanding across an interruption is crop
        // (compression completes within its own dispatch).
        self.state = match &self.source_file {
            Some(_) => ControllerState::Cropping,
            None => ControllerState::WaitingForSource,
        };
        log::debug!(
            "[{}] session restored in {:?} mode, state {:?}",
            self.session_id,
            snapshot.mode,
            self.state
        );
        None
    }

    /// Capture everything needed to resume after the host destroys us
    ///
    /// Returns `None` when no session is running. Each live provider writes
    /// its own opaque payload into the snapshot's bundle.
    pub fn save_state(&self) -> Option<ControllerSnapshot> {
        let source = match (&self.state, &self.source) {
            (ControllerState::Finished, _) | (ControllerState::Idle, _) => return None,
            (_, Some(source)) => source,
            (_, None) => return None,
        };
        let mut bundle = StateBundle::new();
        source.provider().save_state(&mut bundle);
        self.crop.save_state(&mut bundle);
        log::debug!("[{}] session state saved", self.session_id);
        Some(ControllerSnapshot::new(
            source.mode(),
            self.source_file.clone(),
            bundle,
        ))
    }

    /// Permission dialog outcome from the host, forwarded to the live
    /// acquisition provider which self-filters by request code
    pub fn on_permission_result(&mut self, event: &PermissionResult) -> Option<PickerResult> {
        if self.state == ControllerState::Finished {
            log::warn!(
                "[{}] permission result after session end, ignoring",
                self.session_id
            );
            return None;
        }
        let response = match self.source.as_mut() {
            Some(source) => source.provider_mut().on_permission_result(event),
            None => ProviderResponse::Ignored,
        };
        self.handle_source_response(response)
    }

    /// Host surface outcome, broadcast to every live provider (source and
    /// crop); each decides by request code whether the event is theirs
    pub fn on_activity_result(&mut self, event: &ActivityResult) -> Option<PickerResult> {
        if self.state == ControllerState::Finished {
            log::warn!(
                "[{}] activity result after session end, ignoring",
                self.session_id
            );
            return None;
        }
        let source_response = match self.source.as_mut() {
            Some(source) => source.provider_mut().on_activity_result(event),
            None => ProviderResponse::Ignored,
        };
        let crop_response = self.crop.on_activity_result(event);

        let result = self.handle_source_response(source_response);
        match result {
            Some(result) => {
                // The session just finished; a simultaneous crop claim can
                // only be a stray and is dropped by the finished guard.
                let _ = self.handle_crop_response(crop_response);
                Some(result)
            }
            None => self.handle_crop_response(crop_response),
        }
    }

    /// Explicit user back-navigation. Always yields Cancelled, whatever the
    /// current stage.
    pub fn cancel(&mut self) -> Option<PickerResult> {
        if self.state == ControllerState::Finished {
            log::warn!("[{}] cancel after session end, ignoring", self.session_id);
            return None;
        }
        log::debug!("[{}] cancelled by user", self.session_id);
        Some(self.finish(PickerResult::Cancelled))
    }

    /// Unrecoverable error reported from outside the provider protocol
    pub fn fail(&mut self, message: String) -> Option<PickerResult> {
        if self.state == ControllerState::Finished {
            log::warn!("[{}] fail after session end, ignoring", self.session_id);
            return None;
        }
        Some(self.finish_failed(message))
    }

    fn select_source(&mut self, mode: PickerMode) -> Result<(), PickerError> {
        let handle = match mode {
            PickerMode::Gallery => self.gallery.take().map(ActiveSource::Gallery),
            PickerMode::Camera => self.camera.take().map(ActiveSource::Camera),
        };
        // Both slots drain once a source is selected.
        self.gallery = None;
        self.camera = None;
        match handle {
            Some(source) => {
                self.source = Some(source);
                Ok(())
            }
            None => Err(PickerError::Provider(
                "source provider already consumed".to_string(),
            )),
        }
    }

    fn handle_source_response(&mut self, response: ProviderResponse) -> Option<PickerResult> {
        match response {
            ProviderResponse::Ignored => None,
            _ if self.state == ControllerState::Finished => {
                log::warn!(
                    "[{}] source response after session end, ignoring",
                    self.session_id
                );
                None
            }
            ProviderResponse::Resolved(path) => {
                if self.state != ControllerState::WaitingForSource {
                    log::warn!(
                        "[{}] stray source file in state {:?}, ignoring",
                        self.session_id,
                        self.state
                    );
                    return None;
                }
                self.on_source_resolved(path)
            }
            ProviderResponse::ResolvedMultiple(paths) => {
                if self.state != ControllerState::WaitingForSource {
                    log::warn!(
                        "[{}] stray multi-selection in state {:?}, ignoring",
                        self.session_id,
                        self.state
                    );
                    return None;
                }
                // Multi-selection bypasses crop and compression entirely.
                log::debug!(
                    "[{}] source resolved {} files",
                    self.session_id,
                    paths.len()
                );
                Some(self.finish(PickerResult::PickedMultiple(paths)))
            }
            ProviderResponse::Cancelled => Some(self.finish(PickerResult::Cancelled)),
            ProviderResponse::Failed(msg) => Some(self.finish_failed(msg)),
        }
    }

    fn handle_crop_response(&mut self, response: ProviderResponse) -> Option<PickerResult> {
        match response {
            ProviderResponse::Ignored => None,
            _ if self.state == ControllerState::Finished => {
                log::warn!(
                    "[{}] crop response after session end, ignoring",
                    self.session_id
                );
                None
            }
            ProviderResponse::Resolved(path) => {
                if self.state != ControllerState::Cropping {
                    log::warn!(
                        "[{}] stray crop file in state {:?}, ignoring",
                        self.session_id,
                        self.state
                    );
                    return None;
                }
                self.on_crop_resolved(path)
            }
            ProviderResponse::ResolvedMultiple(_) => {
                log::warn!("[{}] crop reported multiple files, ignoring", self.session_id);
                None
            }
            ProviderResponse::Cancelled => Some(self.finish(PickerResult::Cancelled)),
            ProviderResponse::Failed(msg) => Some(self.finish_failed(msg)),
        }
    }

    /// A single source file arrived from the gallery or camera surface
    fn on_source_resolved(&mut self, path: PathBuf) -> Option<PickerResult> {
        let provenance = match self.source.as_ref() {
            Some(source) => source.provenance(),
            None => {
                log::warn!("[{}] source file without a source, ignoring", self.session_id);
                return None;
            }
        };
        log::debug!(
            "[{}] source resolved: {} ({:?})",
            self.session_id,
            path.display(),
            provenance
        );
        self.source_file = Some(SourceFile::new(path.clone(), provenance));

        if self.crop.is_crop_enabled() {
            self.state = ControllerState::Cropping;
            match self.crop.launch(&path) {
                Ok(()) => None,
                Err(e) => Some(self.finish_failed(format!("crop launch failed: {}", e))),
            }
        } else {
            self.continue_with_compression(path)
        }
    }

    /// The crop surface produced its output file
    fn on_crop_resolved(&mut self, path: PathBuf) -> Option<PickerResult> {
        log::debug!("[{}] crop resolved: {}", self.session_id, path.display());
        // The capture is superseded by the crop output. Gallery files are
        // user-owned and stay untouched.
        self.discard_scratch_source(&path);
        self.crop_file = Some(path.clone());
        self.continue_with_compression(path)
    }

    /// Compression decision for the most recently resolved file
    fn continue_with_compression(&mut self, path: PathBuf) -> Option<PickerResult> {
        if self.compression.is_compression_required(&path) {
            self.state = ControllerState::Compressing;
            log::debug!("[{}] compressing {}", self.session_id, path.display());
            match self.compression.compress(&path) {
                Ok(compressed) => self.on_compression_resolved(compressed),
                Err(e) => Some(self.finish_failed(format!("compression failed: {}", e))),
            }
        } else {
            self.finish_with_file(path)
        }
    }

    /// Compression produced the final file; superseded intermediates go away
    fn on_compression_resolved(&mut self, path: PathBuf) -> Option<PickerResult> {
        log::debug!(
            "[{}] compression resolved: {}",
            self.session_id,
            path.display()
        );
        self.discard_scratch_source(&path);
        if let Some(crop_file) = self.crop_file.take() {
            if crop_file != path {
                remove_scratch(&self.session_id, &crop_file);
            }
        }
        self.finish_with_file(path)
    }

    /// Deletes the owned source file once superseded, when it was a camera
    /// scratch capture. `keep` is the later-stage file and is never deleted.
    fn discard_scratch_source(&mut self, keep: &Path) {
        let superseded = match &self.source_file {
            Some(source) => source.is_scratch() && source.path != keep,
            None => false,
        };
        if superseded {
            if let Some(source) = self.source_file.take() {
                remove_scratch(&self.session_id, &source.path);
            }
        }
    }

    fn finish_with_file(&mut self, path: PathBuf) -> Option<PickerResult> {
        Some(self.finish(PickerResult::Picked(PickedImage::from_path(path))))
    }

    fn finish_failed(&mut self, message: String) -> PickerResult {
        log::error!("[{}] session failed: {}", self.session_id, message);
        self.finish(PickerResult::Failed(message))
    }

    /// Delivers the terminal result and discards session state. Runs exactly
    /// once; afterwards every inbound event is ignored.
    fn finish(&mut self, result: PickerResult) -> PickerResult {
        self.state = ControllerState::Finished;
        self.source = None;
        self.gallery = None;
        self.camera = None;
        self.source_file = None;
        self.crop_file = None;
        match self.started_at.take() {
            Some(started_at) => log::info!(
                "[{}] session finished: code {} after {} ms",
                self.session_id,
                result.result_code(),
                Utc::now().timestamp_millis() - started_at
            ),
            None => log::info!(
                "[{}] session finished: code {}",
                self.session_id,
                result.result_code()
            ),
        }
        result
    }
}

/// Best-effort removal of a controller-owned scratch file
fn remove_scratch(session_id: &Uuid, path: &Path) {
    log::debug!("[{}] deleting superseded file {}", session_id, path.display());
    if let Err(e) = std::fs::remove_file(path) {
        log::warn!(
            "[{}] failed to delete {}: {}",
            session_id,
            path.display(),
            e
        );
    }
}
