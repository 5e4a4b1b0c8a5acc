//! # Image Picker
//!
//! An image-acquisition pipeline library: pick an image from the gallery or
//! capture one with the camera, optionally crop it, optionally compress it,
//! and hand the final file to the caller.
//!
//! This crate provides the orchestrating controller, including:
//! - A linear session state machine (source → crop → compression → result)
//! - Provider traits for the gallery, camera, crop and compression steps
//! - Scratch-file ownership and cleanup (camera captures and crop outputs
//!   are deleted once superseded; gallery files are never touched)
//! - A serializable snapshot so sessions survive host-triggered
//!   interruption (process death, permission dialogs, rotation)
//!
//! ## Platform Separation
//!
//! This crate focuses on the session logic. Platform-specific code (invoking
//! the actual camera app, system picker, crop screen or a compression
//! codec) lives behind the provider traits, in the host application.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use image_picker::{PickerController, PickerMode, ProviderBundle};
//!
//! let mut controller = PickerController::new(ProviderBundle {
//!     gallery: Box::new(MyGalleryProvider::new()),
//!     camera: Box::new(MyCameraProvider::new()),
//!     crop: Box::new(MyCropProvider::new(crop_enabled)),
//!     compression: Box::new(MyCompressionProvider::new(max_size)),
//! });
//!
//! controller.start(Some(PickerMode::Camera));
//! // ... forward host events until a terminal result comes back:
//! if let Some(result) = controller.on_activity_result(&event) {
//!     println!("picked: {:?}", result);
//! }
//! ```

pub mod controller;
pub mod error;
pub mod events;
pub mod models;
pub mod provider;
pub mod snapshot;

pub use controller::{PickerController, ProviderBundle};
pub use error::PickerError;
pub use events::{ActivityResult, PermissionResult, RESULT_CANCELED, RESULT_ERROR, RESULT_OK};
pub use models::{
    file_uri, FileProvenance, PickedImage, PickerMode, PickerResult, SourceFile,
    TASK_CANCELLED_MESSAGE,
};
pub use provider::{CompressionProvider, CropProvider, ProviderResponse, SourceProvider};
pub use snapshot::{ControllerSnapshot, StateBundle, SNAPSHOT_VERSION};
