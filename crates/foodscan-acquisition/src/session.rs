//! Acquisition session state.

use std::fmt;
use std::path::{Path, PathBuf};

use foodscan_model::Barcode;

/// What the acquisition surface is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionMode {
    #[default]
    Idle,
    /// A still image is being decoded.
    DecodingImage,
    /// The camera is open and frames are being decoded.
    LiveScanning,
    /// Manual input is being applied. Never observed between transitions.
    ManualEntry,
}

impl AcquisitionMode {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DecodingImage => "decoding image",
            Self::LiveScanning => "live scanning",
            Self::ManualEntry => "manual entry",
        }
    }
}

impl fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A still image chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    path: PathBuf,
}

impl ImageSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for previews and logs.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |name| name.to_string_lossy().into_owned())
    }
}

/// Identifies one decode or live-scan attempt.
///
/// Results carrying a ticket that is no longer current are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State of the acquisition surface.
///
/// Exactly one mode holds at a time. The barcode only becomes set through a
/// successful decode or a non-empty manual entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcquisitionSession {
    pub(crate) mode: AcquisitionMode,
    pub(crate) barcode: Option<Barcode>,
    pub(crate) error: Option<String>,
    pub(crate) product_found: bool,
    pub(crate) image_preview: Option<ImageSource>,
    pub(crate) decode_ticket: Option<Ticket>,
    pub(crate) live_ticket: Option<Ticket>,
    next_ticket: u64,
}

impl AcquisitionSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    #[must_use]
    pub fn barcode(&self) -> Option<&Barcode> {
        self.barcode.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn product_found(&self) -> bool {
        self.product_found
    }

    #[must_use]
    pub fn image_preview(&self) -> Option<&ImageSource> {
        self.image_preview.as_ref()
    }

    #[must_use]
    pub fn is_live_scanning(&self) -> bool {
        self.mode == AcquisitionMode::LiveScanning
    }

    /// Ticket of the in-flight image decode, if any.
    #[must_use]
    pub fn decode_ticket(&self) -> Option<Ticket> {
        self.decode_ticket
    }

    /// Ticket of the active live scan, if any.
    #[must_use]
    pub fn live_ticket(&self) -> Option<Ticket> {
        self.live_ticket
    }

    pub(crate) fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }
}
