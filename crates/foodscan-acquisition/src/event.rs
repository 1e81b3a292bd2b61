//! Inputs to and outputs of the acquisition state machine.

use foodscan_model::Barcode;

use crate::error::AcquisitionError;
use crate::session::{ImageSource, Ticket};

/// Something that happened: a user action or a capability result.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionEvent {
    /// The user picked a still image.
    ChooseImage(ImageSource),
    /// The decoder found a barcode in the image for `ticket`.
    DecodeSucceeded { ticket: Ticket, barcode: Barcode },
    /// The decoder found nothing or failed for `ticket`.
    DecodeFailed {
        ticket: Ticket,
        error: AcquisitionError,
    },

    /// The user asked for a live camera scan.
    StartLiveScan,
    /// Camera and stream decoder are running for `ticket`.
    LiveScanStarted { ticket: Ticket },
    /// The live scan for `ticket` could not be started.
    LiveScanFailed {
        ticket: Ticket,
        error: AcquisitionError,
    },
    /// The stream decoder reported a barcode.
    Detected { ticket: Ticket, barcode: Barcode },
    /// The video stream broke while scanning.
    StreamFailed {
        ticket: Ticket,
        error: AcquisitionError,
    },
    /// The user stopped the live scan.
    StopLiveScan,

    /// The user typed a barcode. Empty text clears it.
    ManualEntry(String),
    /// The user reset the surface.
    Clear,

    /// The lookup for the current barcode returned a product.
    ProductFound,
    /// The lookup for the current barcode failed with a display message.
    LookupFailed(String),
}

impl AcquisitionEvent {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ChooseImage(_) => "choose_image",
            Self::DecodeSucceeded { .. } => "decode_succeeded",
            Self::DecodeFailed { .. } => "decode_failed",
            Self::StartLiveScan => "start_live_scan",
            Self::LiveScanStarted { .. } => "live_scan_started",
            Self::LiveScanFailed { .. } => "live_scan_failed",
            Self::Detected { .. } => "detected",
            Self::StreamFailed { .. } => "stream_failed",
            Self::StopLiveScan => "stop_live_scan",
            Self::ManualEntry(_) => "manual_entry",
            Self::Clear => "clear",
            Self::ProductFound => "product_found",
            Self::LookupFailed(_) => "lookup_failed",
        }
    }
}

/// Work the runtime must carry out after a transition, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Stop the stream decoder, then the camera stream.
    ReleaseCapture,
    /// Decode a still image and report back with `ticket`.
    DecodeImage { ticket: Ticket, source: ImageSource },
    /// Open the camera, bind the stream decoder and report back with `ticket`.
    OpenCamera { ticket: Ticket },
    /// Hand the barcode to the lookup workflow.
    Lookup(Barcode),
}
