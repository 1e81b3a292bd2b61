//! External capabilities: barcode decoders and cameras.
//!
//! Recognition and capture are never implemented here. Hosts plug in
//! adapters (the CLI wraps zbar tools and V4L2 device nodes; tests use
//! fakes).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use foodscan_model::{Barcode, DecoderConfig};

use crate::error::Result;
use crate::session::ImageSource;

/// Still-image and stream barcode recognition.
pub trait Decoder {
    /// Decode one barcode from a still image.
    ///
    /// Returns [`AcquisitionError::DecodeNotFound`](crate::AcquisitionError::DecodeNotFound)
    /// when the image holds no readable barcode.
    fn decode_image(&self, source: &ImageSource, config: &DecoderConfig) -> Result<Barcode>;

    /// Bind a decoder to a running camera stream.
    ///
    /// Detections and stream failures are reported through `sink` from
    /// whatever thread the decoder runs on.
    fn start_stream(
        &self,
        stream: &dyn MediaStream,
        config: &DecoderConfig,
        sink: DetectionSink,
    ) -> Result<Box<dyn StreamDecoder>>;
}

/// A running stream decoder.
pub trait StreamDecoder: Send {
    /// Stop decoding. Calling it again is a no-op.
    fn stop(&mut self) -> Result<()>;
}

/// Camera access.
pub trait Camera {
    /// Whether the device can capture video at all.
    fn is_supported(&self) -> bool;

    /// Open a video stream, preferring the rear-facing camera.
    fn open(&self) -> Result<Box<dyn MediaStream>>;
}

/// An open camera stream.
pub trait MediaStream: Send {
    /// Device or stream identifier handed to stream decoders.
    fn source(&self) -> &str;

    /// Stop every track of the stream. Calling it again is a no-op.
    fn stop(&mut self) -> Result<()>;
}

/// What a stream decoder reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSignal {
    Detected(Barcode),
    Failed(String),
}

/// Outcome of a non-blocking look at a detection subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionPoll {
    /// Nothing reported yet.
    Empty,
    Ready(StreamSignal),
    /// Every sink is gone without reporting.
    Closed,
}

/// Sending half of a single-shot detection subscription.
///
/// Only the first detection is forwarded; later ones are dropped so a
/// decoder that keeps firing cannot queue duplicate lookups.
#[derive(Debug, Clone)]
pub struct DetectionSink {
    tx: Sender<StreamSignal>,
    fired: Arc<AtomicBool>,
}

impl DetectionSink {
    /// Report a detected barcode. Returns `false` if one was already
    /// reported or the subscription is gone.
    pub fn detect(&self, barcode: Barcode) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.tx.send(StreamSignal::Detected(barcode)).is_ok()
    }

    /// Report a stream failure.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        if self.fired.load(Ordering::SeqCst) {
            return false;
        }
        self.tx.send(StreamSignal::Failed(message.into())).is_ok()
    }

    /// Whether a detection has been reported.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

/// Receiving half of a detection subscription.
#[derive(Debug)]
pub struct DetectionReceiver {
    rx: Receiver<StreamSignal>,
}

impl DetectionReceiver {
    /// Take a pending signal without blocking.
    #[must_use]
    pub fn try_next(&self) -> DetectionPoll {
        match self.rx.try_recv() {
            Ok(signal) => DetectionPoll::Ready(signal),
            Err(TryRecvError::Empty) => DetectionPoll::Empty,
            Err(TryRecvError::Disconnected) => DetectionPoll::Closed,
        }
    }

    /// Wait up to `timeout` for a signal.
    ///
    /// Returns early with `None` once every sink is dropped.
    #[must_use]
    pub fn wait(&self, timeout: Duration) -> Option<StreamSignal> {
        match self.rx.recv_timeout(timeout) {
            Ok(signal) => Some(signal),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Create a fresh single-shot detection subscription.
#[must_use]
pub fn detection_channel() -> (DetectionSink, DetectionReceiver) {
    let (tx, rx) = unbounded();
    (
        DetectionSink {
            tx,
            fired: Arc::new(AtomicBool::new(false)),
        },
        DetectionReceiver { rx },
    )
}
