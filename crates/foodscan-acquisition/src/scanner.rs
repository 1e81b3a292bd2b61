//! Runtime driver for the acquisition state machine.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use foodscan_model::{Barcode, DecoderConfig};
use tracing::{debug, info, info_span, warn};

use crate::capability::{
    Camera, Decoder, DetectionPoll, DetectionReceiver, StreamSignal, detection_channel,
};
use crate::capture::LiveCapture;
use crate::error::{AcquisitionError, Result};
use crate::event::{AcquisitionEvent, Effect};
use crate::session::{AcquisitionSession, ImageSource, Ticket};
use crate::transition::transition;

/// Owns the session, the capabilities and the live capture, and executes
/// the effects produced by [`transition`].
///
/// Every action returns the barcode to look up, if the action produced one.
/// The host runs the lookup and reports back with [`Scanner::product_found`]
/// or [`Scanner::lookup_failed`]. Dropping the scanner releases any capture.
pub struct Scanner<D, C> {
    session: AcquisitionSession,
    decoder: D,
    camera: C,
    config: DecoderConfig,
    capture: Option<LiveCapture>,
    detections: Option<(Ticket, DetectionReceiver)>,
}

impl<D: Decoder, C: Camera> Scanner<D, C> {
    pub fn new(decoder: D, camera: C, config: DecoderConfig) -> Self {
        Self {
            session: AcquisitionSession::new(),
            decoder,
            camera,
            config,
            capture: None,
            detections: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &AcquisitionSession {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    #[must_use]
    pub fn has_live_capture(&self) -> bool {
        self.capture.as_ref().is_some_and(LiveCapture::is_active)
    }

    pub fn choose_image(&mut self, source: ImageSource) -> Option<Barcode> {
        self.dispatch(AcquisitionEvent::ChooseImage(source))
    }

    pub fn start_live_scan(&mut self) -> Option<Barcode> {
        self.dispatch(AcquisitionEvent::StartLiveScan)
    }

    pub fn stop_live_scan(&mut self) -> Option<Barcode> {
        self.dispatch(AcquisitionEvent::StopLiveScan)
    }

    pub fn manual_entry(&mut self, text: &str) -> Option<Barcode> {
        self.dispatch(AcquisitionEvent::ManualEntry(text.to_string()))
    }

    pub fn clear(&mut self) -> Option<Barcode> {
        self.dispatch(AcquisitionEvent::Clear)
    }

    pub fn product_found(&mut self) {
        self.dispatch(AcquisitionEvent::ProductFound);
    }

    pub fn lookup_failed(&mut self, message: impl Into<String>) {
        self.dispatch(AcquisitionEvent::LookupFailed(message.into()));
    }

    /// Handle a pending stream signal without blocking.
    ///
    /// A decoder that exited without reporting ends the live scan.
    pub fn poll_detection(&mut self) -> Option<Barcode> {
        let (ticket, poll) = {
            let (ticket, receiver) = self.detections.as_ref()?;
            (*ticket, receiver.try_next())
        };
        match poll {
            DetectionPoll::Empty => None,
            DetectionPoll::Ready(signal) => self.handle_signal(ticket, signal),
            DetectionPoll::Closed => self.decoder_exited(ticket),
        }
    }

    /// Wait up to `timeout` for the live scan to detect a barcode.
    ///
    /// Returns early when the scan ends for any reason (detection, stream
    /// failure, decoder exit).
    pub fn wait_for_detection(&mut self, timeout: Duration) -> Option<Barcode> {
        let deadline = Instant::now() + timeout;
        while self.session.is_live_scanning() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let (ticket, signal) = {
                let (ticket, receiver) = self.detections.as_ref()?;
                (*ticket, receiver.wait(remaining))
            };
            match signal {
                Some(signal) => return self.handle_signal(ticket, signal),
                // Every sink is gone: the decoder exited without a result.
                None if Instant::now() < deadline => return self.decoder_exited(ticket),
                None => return None,
            }
        }
        None
    }

    fn decoder_exited(&mut self, ticket: Ticket) -> Option<Barcode> {
        self.dispatch(AcquisitionEvent::StreamFailed {
            ticket,
            error: AcquisitionError::Stream("stream decoder exited".to_string()),
        })
    }

    fn handle_signal(&mut self, ticket: Ticket, signal: StreamSignal) -> Option<Barcode> {
        let event = match signal {
            StreamSignal::Detected(barcode) => {
                info!(%barcode, "barcode detected");
                AcquisitionEvent::Detected { ticket, barcode }
            }
            StreamSignal::Failed(message) => AcquisitionEvent::StreamFailed {
                ticket,
                error: AcquisitionError::Stream(message),
            },
        };
        self.dispatch(event)
    }

    /// Apply an event and run its effects until the queue drains.
    pub fn dispatch(&mut self, event: AcquisitionEvent) -> Option<Barcode> {
        let mut lookup = None;
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let step = transition(std::mem::take(&mut self.session), event);
            self.session = step.session;

            for effect in step.effects {
                match effect {
                    Effect::ReleaseCapture => self.release_capture(),
                    Effect::DecodeImage { ticket, source } => {
                        queue.push_back(self.decode(ticket, &source));
                    }
                    Effect::OpenCamera { ticket } => {
                        queue.push_back(self.open_camera(ticket));
                    }
                    Effect::Lookup(barcode) => lookup = Some(barcode),
                }
            }
        }
        lookup
    }

    fn decode(&self, ticket: Ticket, source: &ImageSource) -> AcquisitionEvent {
        let _span = info_span!("decode_image", image = %source.display_name()).entered();
        match self.decoder.decode_image(source, &self.config) {
            Ok(barcode) => {
                info!(%barcode, "barcode decoded");
                AcquisitionEvent::DecodeSucceeded { ticket, barcode }
            }
            Err(error) => {
                debug!(%error, "no barcode decoded");
                AcquisitionEvent::DecodeFailed { ticket, error }
            }
        }
    }

    fn open_camera(&mut self, ticket: Ticket) -> AcquisitionEvent {
        match self.try_open_camera(ticket) {
            Ok(()) => AcquisitionEvent::LiveScanStarted { ticket },
            Err(error) => {
                warn!(%error, "live scan could not start");
                AcquisitionEvent::LiveScanFailed { ticket, error }
            }
        }
    }

    fn try_open_camera(&mut self, ticket: Ticket) -> Result<()> {
        if !self.camera.is_supported() {
            return Err(AcquisitionError::CameraUnsupported);
        }
        let stream = self.camera.open()?;

        let (sink, receiver) = detection_channel();
        let decoder = match self.decoder.start_stream(stream.as_ref(), &self.config, sink) {
            Ok(decoder) => decoder,
            Err(error) => {
                LiveCapture::release_stream(stream);
                return Err(match error {
                    AcquisitionError::DecodeInit(_) => error,
                    other => AcquisitionError::DecodeInit(other.to_string()),
                });
            }
        };

        let capture = LiveCapture::new(stream, decoder);
        info!(source = capture.source().unwrap_or_default(), %ticket, "live scan started");
        self.capture = Some(capture);
        self.detections = Some((ticket, receiver));
        Ok(())
    }

    fn release_capture(&mut self) {
        self.detections = None;
        if let Some(mut capture) = self.capture.take() {
            capture.release();
            debug!("live capture released");
        }
    }
}

impl<D, C> std::fmt::Debug for Scanner<D, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("session", &self.session)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}
