//! Barcode acquisition for still images, live camera scans and manual entry.
//!
//! # Overview
//!
//! The acquisition surface is a small state machine:
//!
//! - [`AcquisitionSession`]: current mode, barcode, error, preview
//! - [`AcquisitionEvent`]: user actions and capability results
//! - [`transition`]: pure fold of one event into the session, yielding
//!   [`Effect`]s
//! - [`Scanner`]: runtime that owns the capabilities, executes effects and
//!   hands barcodes to the host for lookup
//!
//! Recognition and capture stay behind the [`Decoder`] and [`Camera`]
//! traits.
//!
//! # Example
//!
//! ```no_run
//! # use foodscan_acquisition::{Camera, Decoder, Scanner};
//! # use foodscan_model::DecoderConfig;
//! # fn run(decoder: impl Decoder, camera: impl Camera) {
//! let mut scanner = Scanner::new(decoder, camera, DecoderConfig::default());
//! if let Some(barcode) = scanner.manual_entry("3017620422003") {
//!     // Look the barcode up, then report the outcome.
//!     scanner.product_found();
//!     # let _ = barcode;
//! }
//! # }
//! ```
//!
//! # Design Principles
//!
//! - **One mode at a time**: live scanning and image decoding exclude each
//!   other
//! - **Last action wins**: results of superseded attempts are discarded
//! - **Nothing escapes**: failures become the session's error message

mod capability;
mod capture;
mod error;
mod event;
mod scanner;
mod session;
mod transition;

pub use capability::{
    Camera, Decoder, DetectionPoll, DetectionReceiver, DetectionSink, MediaStream, StreamDecoder, StreamSignal,
    detection_channel,
};
pub use capture::LiveCapture;
pub use error::{AcquisitionError, NO_BARCODE_MESSAGE, Result};
pub use event::{AcquisitionEvent, Effect};
pub use scanner::Scanner;
pub use session::{AcquisitionMode, AcquisitionSession, ImageSource, Ticket};
pub use transition::{Transition, transition};
