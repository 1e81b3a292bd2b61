//! Error types for barcode acquisition.

use thiserror::Error;

/// Shown whenever a still image yields no barcode.
pub const NO_BARCODE_MESSAGE: &str = "No barcode detected. Please try a different image.";

/// Errors raised by decoders and cameras.
///
/// None of these escape the acquisition boundary; the state machine turns
/// them into the session's single error message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AcquisitionError {
    /// The decoder ran but found no barcode.
    #[error("no barcode found in image")]
    DecodeNotFound,

    /// The decoder could not process the image.
    #[error("image decode failed: {0}")]
    Decode(String),

    /// The stream decoder could not be started.
    #[error("decoder initialization failed: {0}")]
    DecodeInit(String),

    /// The device has no camera capability at all.
    #[error("live scanning is not supported on this device")]
    CameraUnsupported,

    /// Camera access was refused.
    #[error("camera permission denied")]
    CameraPermissionDenied,

    /// The camera could not be opened for another reason.
    #[error("camera could not be opened: {0}")]
    Camera(String),

    /// The video stream failed while scanning.
    #[error("video stream error: {0}")]
    Stream(String),

    /// A decoder or stream could not be released cleanly.
    #[error("failed to release capture: {0}")]
    Release(String),
}

impl AcquisitionError {
    /// Message stored in the session for display.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::DecodeNotFound | Self::Decode(_) => NO_BARCODE_MESSAGE,
            Self::DecodeInit(_) => "Error initializing barcode decoder.",
            Self::CameraUnsupported => "Live scanning is not supported on this device.",
            Self::CameraPermissionDenied => "Camera access was denied.",
            Self::Camera(_) => "Error starting live scanning.",
            Self::Stream(_) | Self::Release(_) => "Error starting video stream.",
        }
    }
}

/// Result type alias for acquisition capabilities.
pub type Result<T> = std::result::Result<T, AcquisitionError>;
