//! Acquisition-to-lookup wiring against fake capabilities and a canned
//! product service.

use std::cell::RefCell;
use std::time::Duration;

use foodscan_acquisition::{
    AcquisitionError, Camera, Decoder, DetectionSink, ImageSource, MediaStream, Result, Scanner,
    StreamDecoder,
};
use foodscan_cli::app::{App, ScanOutcome};
use foodscan_lookup::{LookupError, LookupWorkflow, ProductService};
use foodscan_model::{Barcode, DecoderConfig};
use foodscan_normalization::{ProductEnvelope, parse_envelope};

const COLA: &[u8] = br#"{"code": "5000112637922", "status": 1, "product": {
    "product_name": "Example Cola",
    "nutrition_grades": "c",
    "brands": "Example, Cola Co"
}}"#;

struct StillDecoder(Option<&'static str>);

impl Decoder for StillDecoder {
    fn decode_image(&self, _source: &ImageSource, _config: &DecoderConfig) -> Result<Barcode> {
        self.0
            .and_then(Barcode::parse)
            .ok_or(AcquisitionError::DecodeNotFound)
    }

    fn start_stream(
        &self,
        _stream: &dyn MediaStream,
        _config: &DecoderConfig,
        _sink: DetectionSink,
    ) -> Result<Box<dyn StreamDecoder>> {
        Err(AcquisitionError::DecodeInit("still images only".to_string()))
    }
}

struct NoCamera;

impl Camera for NoCamera {
    fn is_supported(&self) -> bool {
        false
    }

    fn open(&self) -> Result<Box<dyn MediaStream>> {
        Err(AcquisitionError::CameraUnsupported)
    }
}

/// Knows one product; records every requested code.
#[derive(Default)]
struct CannedService {
    requests: RefCell<Vec<String>>,
}

impl ProductService for CannedService {
    fn fetch_product(&self, barcode: &Barcode) -> foodscan_lookup::Result<ProductEnvelope> {
        self.requests.borrow_mut().push(barcode.to_string());
        if barcode.as_str() == "5000112637922" {
            Ok(parse_envelope(COLA)?)
        } else {
            Err(LookupError::Http {
                status: 404,
                reason: "Not Found".to_string(),
            })
        }
    }
}

fn app(image_barcode: Option<&'static str>) -> App<StillDecoder, NoCamera, CannedService> {
    let scanner = Scanner::new(StillDecoder(image_barcode), NoCamera, DecoderConfig::default());
    App::new(scanner, LookupWorkflow::new(CannedService::default()))
}

#[test]
fn manual_entry_finds_product() {
    let mut app = app(None);
    let outcome = app.manual(" 5000112637922 ");

    let product = outcome.product().expect("product found");
    assert_eq!(product.name, "Example Cola");
    assert_eq!(product.grade_class(), "nutrition-grade-c");
    assert!(app.scanner().session().product_found());
    assert!(!app.workflow().is_loading());
}

#[test]
fn unknown_barcode_keeps_barcode_and_offers_contribution() {
    let mut app = app(None);
    let outcome = app.manual("0000000000000");

    assert_eq!(
        outcome,
        ScanOutcome::Failed {
            barcode: Barcode::parse("0000000000000"),
            message: "API Error: 404 - Not Found".to_string(),
            not_found: true,
        }
    );
    let session = app.scanner().session();
    assert_eq!(session.barcode(), Barcode::parse("0000000000000").as_ref());
    assert_eq!(session.error(), Some("API Error: 404 - Not Found"));
}

#[test]
fn image_decode_feeds_lookup() {
    let mut app = app(Some("5000112637922"));
    let outcome = app.image(ImageSource::from_path("cola.jpg"));

    assert!(outcome.product().is_some());
    assert_eq!(*app.workflow().service().requests.borrow(), vec!["5000112637922"]);
}

#[test]
fn image_without_barcode_skips_lookup() {
    let mut app = app(None);
    let outcome = app.image(ImageSource::from_path("wall.jpg"));

    assert_eq!(
        outcome,
        ScanOutcome::Failed {
            barcode: None,
            message: "No barcode detected. Please try a different image.".to_string(),
            not_found: false,
        }
    );
    assert!(app.workflow().service().requests.borrow().is_empty());
}

#[test]
fn live_scan_without_camera_reports_unsupported() {
    let mut app = app(None);
    let outcome = app.live(Duration::from_millis(10));

    assert_eq!(
        outcome,
        ScanOutcome::Failed {
            barcode: None,
            message: "Live scanning is not supported on this device.".to_string(),
            not_found: false,
        }
    );
}

#[test]
fn blank_manual_entry_reports_missing_barcode() {
    let mut app = app(None);
    let ScanOutcome::Failed { message, .. } = app.manual("   ") else {
        panic!("blank entry must not look anything up");
    };
    assert_eq!(message, "No barcode entered.");
}
