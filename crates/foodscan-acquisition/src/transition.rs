//! Pure transition function of the acquisition state machine.
//!
//! `transition` folds one event into the session and lists the effects the
//! runtime has to execute. It performs no I/O, so every rule below is
//! testable without a camera or decoder:
//!
//! - Live scanning and image decoding exclude each other. Entering either
//!   releases the live capture first.
//! - Results carrying a stale ticket are ignored.
//! - Setting the barcode clears the error and requests a lookup when the
//!   value changed.
//! - Lookup failures never clear the barcode.

use foodscan_model::Barcode;
use tracing::debug;

use crate::error::NO_BARCODE_MESSAGE;
use crate::event::{AcquisitionEvent, Effect};
use crate::session::{AcquisitionMode, AcquisitionSession};

/// Result of one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: AcquisitionSession,
    pub effects: Vec<Effect>,
}

/// Apply `event` to `session`.
#[must_use]
pub fn transition(mut session: AcquisitionSession, event: AcquisitionEvent) -> Transition {
    let mut effects = Vec::new();
    let previous_mode = session.mode;
    let event_name = event.name();

    match event {
        AcquisitionEvent::ChooseImage(source) => {
            end_live_scan(&mut session, &mut effects);
            session.barcode = None;
            session.error = None;
            session.product_found = false;
            session.image_preview = Some(source.clone());

            let ticket = session.issue_ticket();
            session.decode_ticket = Some(ticket);
            session.mode = AcquisitionMode::DecodingImage;
            effects.push(Effect::DecodeImage { ticket, source });
        }

        AcquisitionEvent::DecodeSucceeded { ticket, barcode } => {
            if session.decode_ticket == Some(ticket) {
                session.decode_ticket = None;
                session.mode = AcquisitionMode::Idle;
                set_barcode(&mut session, Some(barcode), &mut effects);
            } else {
                debug!(%ticket, "ignoring stale decode result");
            }
        }

        AcquisitionEvent::DecodeFailed { ticket, error } => {
            if session.decode_ticket == Some(ticket) {
                debug!(%ticket, %error, "image decode failed");
                session.decode_ticket = None;
                session.mode = AcquisitionMode::Idle;
                session.barcode = None;
                session.error = Some(NO_BARCODE_MESSAGE.to_string());
            } else {
                debug!(%ticket, "ignoring stale decode failure");
            }
        }

        AcquisitionEvent::StartLiveScan => {
            effects.push(Effect::ReleaseCapture);
            session.decode_ticket = None;
            session.error = None;

            let ticket = session.issue_ticket();
            session.live_ticket = Some(ticket);
            session.mode = AcquisitionMode::LiveScanning;
            effects.push(Effect::OpenCamera { ticket });
        }

        AcquisitionEvent::LiveScanStarted { ticket } => {
            if session.live_ticket != Some(ticket) {
                // The scan was stopped or replaced while the camera opened.
                effects.push(Effect::ReleaseCapture);
            }
        }

        AcquisitionEvent::LiveScanFailed { ticket, error } => {
            if session.live_ticket == Some(ticket) {
                session.live_ticket = None;
                session.mode = AcquisitionMode::Idle;
                session.error = Some(error.user_message().to_string());
                effects.push(Effect::ReleaseCapture);
            }
        }

        AcquisitionEvent::Detected { ticket, barcode } => {
            if session.live_ticket == Some(ticket) && session.is_live_scanning() {
                end_live_scan(&mut session, &mut effects);
                set_barcode(&mut session, Some(barcode), &mut effects);
            } else {
                debug!(%ticket, "ignoring detection outside active scan");
            }
        }

        AcquisitionEvent::StreamFailed { ticket, error } => {
            if session.live_ticket == Some(ticket) {
                end_live_scan(&mut session, &mut effects);
                session.error = Some(error.user_message().to_string());
            }
        }

        AcquisitionEvent::StopLiveScan => {
            effects.push(Effect::ReleaseCapture);
            session.live_ticket = None;
            if session.is_live_scanning() {
                session.mode = AcquisitionMode::Idle;
            }
            session.error = None;
        }

        AcquisitionEvent::ManualEntry(text) => {
            end_live_scan(&mut session, &mut effects);
            session.decode_ticket = None;
            session.mode = AcquisitionMode::ManualEntry;
            session.product_found = false;
            set_barcode(&mut session, Barcode::parse(&text), &mut effects);
            session.mode = AcquisitionMode::Idle;
        }

        AcquisitionEvent::Clear => {
            end_live_scan(&mut session, &mut effects);
            session.decode_ticket = None;
            session.mode = AcquisitionMode::Idle;
            session.barcode = None;
            session.image_preview = None;
            session.error = None;
            session.product_found = false;
        }

        AcquisitionEvent::ProductFound => {
            session.product_found = true;
            session.error = None;
        }

        AcquisitionEvent::LookupFailed(message) => {
            session.product_found = false;
            session.error = Some(message);
        }
    }

    debug!(
        event = event_name,
        from = %previous_mode,
        to = %session.mode,
        effects = effects.len(),
        "acquisition transition"
    );
    Transition { session, effects }
}

/// Leave live scanning, releasing the capture if one may be open.
fn end_live_scan(session: &mut AcquisitionSession, effects: &mut Vec<Effect>) {
    if session.live_ticket.take().is_some() || session.is_live_scanning() {
        effects.push(Effect::ReleaseCapture);
    }
    if session.is_live_scanning() {
        session.mode = AcquisitionMode::Idle;
    }
}

/// Set or clear the barcode. A new value clears the error and requests a
/// lookup.
fn set_barcode(
    session: &mut AcquisitionSession,
    barcode: Option<Barcode>,
    effects: &mut Vec<Effect>,
) {
    let changed = session.barcode != barcode;
    match barcode {
        Some(barcode) => {
            session.error = None;
            if changed {
                session.product_found = false;
                effects.push(Effect::Lookup(barcode.clone()));
            }
            session.barcode = Some(barcode);
        }
        None => {
            session.error = None;
            session.barcode = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AcquisitionError;
    use crate::session::ImageSource;

    fn apply(session: AcquisitionSession, event: AcquisitionEvent) -> Transition {
        transition(session, event)
    }

    fn code(raw: &str) -> Barcode {
        Barcode::parse(raw).unwrap()
    }

    fn live(session: AcquisitionSession) -> (AcquisitionSession, crate::session::Ticket) {
        let step = apply(session, AcquisitionEvent::StartLiveScan);
        let Some(Effect::OpenCamera { ticket }) = step.effects.last().cloned() else {
            panic!("expected OpenCamera effect");
        };
        let step = apply(step.session, AcquisitionEvent::LiveScanStarted { ticket });
        assert!(step.effects.is_empty());
        (step.session, ticket)
    }

    #[test]
    fn test_choose_image_starts_decode() {
        let source = ImageSource::from_path("can.jpg");
        let step = apply(
            AcquisitionSession::new(),
            AcquisitionEvent::ChooseImage(source.clone()),
        );

        assert_eq!(step.session.mode(), AcquisitionMode::DecodingImage);
        assert_eq!(step.session.image_preview(), Some(&source));
        let ticket = step.session.decode_ticket().unwrap();
        assert_eq!(step.effects, vec![Effect::DecodeImage { ticket, source }]);
    }

    #[test]
    fn test_decode_success_requests_lookup() {
        let step = apply(
            AcquisitionSession::new(),
            AcquisitionEvent::ChooseImage(ImageSource::from_path("can.jpg")),
        );
        let ticket = step.session.decode_ticket().unwrap();
        let step = apply(
            step.session,
            AcquisitionEvent::DecodeSucceeded {
                ticket,
                barcode: code("5000112637922"),
            },
        );

        assert_eq!(step.session.mode(), AcquisitionMode::Idle);
        assert_eq!(step.session.barcode(), Some(&code("5000112637922")));
        assert_eq!(step.effects, vec![Effect::Lookup(code("5000112637922"))]);
    }

    #[test]
    fn test_decode_failure_sets_message() {
        let step = apply(
            AcquisitionSession::new(),
            AcquisitionEvent::ChooseImage(ImageSource::from_path("blurry.jpg")),
        );
        let ticket = step.session.decode_ticket().unwrap();
        let step = apply(
            step.session,
            AcquisitionEvent::DecodeFailed {
                ticket,
                error: AcquisitionError::DecodeNotFound,
            },
        );

        assert_eq!(step.session.error(), Some(NO_BARCODE_MESSAGE));
        assert!(step.session.barcode().is_none());
        assert_eq!(step.session.mode(), AcquisitionMode::Idle);
        assert!(step.effects.is_empty());
    }

    #[test]
    fn test_stale_decode_result_is_ignored() {
        let step = apply(
            AcquisitionSession::new(),
            AcquisitionEvent::ChooseImage(ImageSource::from_path("first.jpg")),
        );
        let stale = step.session.decode_ticket().unwrap();
        let step = apply(
            step.session,
            AcquisitionEvent::ChooseImage(ImageSource::from_path("second.jpg")),
        );
        let before = step.session.clone();
        let step = apply(
            step.session,
            AcquisitionEvent::DecodeSucceeded {
                ticket: stale,
                barcode: code("111"),
            },
        );

        assert_eq!(step.session, before);
        assert!(step.effects.is_empty());
    }

    #[test]
    fn test_choose_image_during_live_scan_releases_first() {
        let (session, _) = live(AcquisitionSession::new());
        let step = apply(
            session,
            AcquisitionEvent::ChooseImage(ImageSource::from_path("can.jpg")),
        );

        assert_eq!(step.effects[0], Effect::ReleaseCapture);
        assert!(matches!(step.effects[1], Effect::DecodeImage { .. }));
        assert!(step.session.live_ticket().is_none());
        assert_eq!(step.session.mode(), AcquisitionMode::DecodingImage);
    }

    #[test]
    fn test_start_live_scan_supersedes_decode() {
        let step = apply(
            AcquisitionSession::new(),
            AcquisitionEvent::ChooseImage(ImageSource::from_path("can.jpg")),
        );
        let decode_ticket = step.session.decode_ticket().unwrap();
        let (session, _) = live(step.session);
        assert!(session.decode_ticket().is_none());

        let step = apply(
            session,
            AcquisitionEvent::DecodeSucceeded {
                ticket: decode_ticket,
                barcode: code("111"),
            },
        );
        assert!(step.session.is_live_scanning());
        assert!(step.session.barcode().is_none());
    }

    #[test]
    fn test_first_detection_wins() {
        let (session, ticket) = live(AcquisitionSession::new());
        let step = apply(
            session,
            AcquisitionEvent::Detected {
                ticket,
                barcode: code("4006381333931"),
            },
        );
        assert_eq!(
            step.effects,
            vec![
                Effect::ReleaseCapture,
                Effect::Lookup(code("4006381333931"))
            ]
        );
        assert_eq!(step.session.mode(), AcquisitionMode::Idle);

        let step = apply(
            step.session,
            AcquisitionEvent::Detected {
                ticket,
                barcode: code("999"),
            },
        );
        assert!(step.effects.is_empty());
        assert_eq!(step.session.barcode(), Some(&code("4006381333931")));
    }

    #[test]
    fn test_live_scan_failure_message() {
        let step = apply(AcquisitionSession::new(), AcquisitionEvent::StartLiveScan);
        let ticket = step.session.live_ticket().unwrap();
        let step = apply(
            step.session,
            AcquisitionEvent::LiveScanFailed {
                ticket,
                error: AcquisitionError::CameraPermissionDenied,
            },
        );

        assert_eq!(step.session.error(), Some("Camera access was denied."));
        assert_eq!(step.session.mode(), AcquisitionMode::Idle);
        assert_eq!(step.effects, vec![Effect::ReleaseCapture]);
    }

    #[test]
    fn test_stream_failure_releases_capture() {
        let (session, ticket) = live(AcquisitionSession::new());
        let step = apply(
            session,
            AcquisitionEvent::StreamFailed {
                ticket,
                error: AcquisitionError::Stream("device unplugged".to_string()),
            },
        );

        assert_eq!(step.session.error(), Some("Error starting video stream."));
        assert_eq!(step.effects, vec![Effect::ReleaseCapture]);
        assert!(!step.session.is_live_scanning());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (session, _) = live(AcquisitionSession::new());
        let once = apply(session, AcquisitionEvent::StopLiveScan);
        let twice = apply(once.session.clone(), AcquisitionEvent::StopLiveScan);

        assert_eq!(once.effects, vec![Effect::ReleaseCapture]);
        assert_eq!(twice.effects, vec![Effect::ReleaseCapture]);
        assert_eq!(once.session, twice.session);
        assert_eq!(twice.session.mode(), AcquisitionMode::Idle);
    }

    #[test]
    fn test_manual_entry_stops_live_scan() {
        let (session, ticket) = live(AcquisitionSession::new());
        let step = apply(session, AcquisitionEvent::ManualEntry(" 737628064502 ".into()));

        assert_eq!(
            step.effects,
            vec![Effect::ReleaseCapture, Effect::Lookup(code("737628064502"))]
        );
        assert_eq!(step.session.mode(), AcquisitionMode::Idle);

        let step = apply(
            step.session,
            AcquisitionEvent::Detected {
                ticket,
                barcode: code("111"),
            },
        );
        assert_eq!(step.session.barcode(), Some(&code("737628064502")));
    }

    #[test]
    fn test_manual_entry_same_value_does_not_relookup() {
        let step = apply(
            AcquisitionSession::new(),
            AcquisitionEvent::ManualEntry("123".into()),
        );
        assert_eq!(step.effects, vec![Effect::Lookup(code("123"))]);
        let step = apply(step.session, AcquisitionEvent::ManualEntry("123".into()));
        assert!(step.effects.is_empty());
    }

    #[test]
    fn test_empty_manual_entry_clears_barcode() {
        let step = apply(
            AcquisitionSession::new(),
            AcquisitionEvent::ManualEntry("123".into()),
        );
        let step = apply(step.session, AcquisitionEvent::ManualEntry("   ".into()));
        assert!(step.session.barcode().is_none());
        assert!(step.effects.is_empty());
    }

    #[test]
    fn test_lookup_failure_keeps_barcode() {
        let step = apply(
            AcquisitionSession::new(),
            AcquisitionEvent::ManualEntry("0000000000000".into()),
        );
        let step = apply(
            step.session,
            AcquisitionEvent::LookupFailed("API Error: 404 - Not Found".into()),
        );

        assert_eq!(step.session.barcode(), Some(&code("0000000000000")));
        assert_eq!(step.session.error(), Some("API Error: 404 - Not Found"));
        assert!(!step.session.product_found());
    }

    #[test]
    fn test_clear_resets_everything() {
        let (session, ticket) = live(AcquisitionSession::new());
        let step = apply(
            session,
            AcquisitionEvent::Detected {
                ticket,
                barcode: code("123"),
            },
        );
        let step = apply(step.session, AcquisitionEvent::ProductFound);
        assert!(step.session.product_found());

        let step = apply(step.session, AcquisitionEvent::Clear);
        assert_eq!(step.session.mode(), AcquisitionMode::Idle);
        assert!(step.session.barcode().is_none());
        assert!(step.session.error().is_none());
        assert!(step.session.image_preview().is_none());
        assert!(!step.session.product_found());
        // Capture was already released by the detection.
        assert!(step.effects.is_empty());
    }

    #[test]
    fn test_clear_during_live_scan_releases() {
        let (session, _) = live(AcquisitionSession::new());
        let step = apply(session, AcquisitionEvent::Clear);
        assert_eq!(step.effects, vec![Effect::ReleaseCapture]);
        assert!(!step.session.is_live_scanning());
    }
}
