//! Lookup against a one-shot local HTTP server.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use foodscan_lookup::{
    LookupError, LookupObserver, LookupSettings, LookupWorkflow, OpenFoodFactsClient,
};
use foodscan_model::{Barcode, ProductViewModel};

/// Serve one response and hand back the request head.
fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut head = String::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            head.push_str(&line);
        }
        write!(
            stream,
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();
        head
    });

    (base_url, handle)
}

#[derive(Default)]
struct Recorder {
    found: Vec<String>,
    errors: Vec<String>,
}

impl LookupObserver for Recorder {
    fn on_found(&mut self, product: &ProductViewModel) {
        self.found.push(product.name.clone());
    }
    fn on_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

#[test]
fn lookup_sends_identity_headers_and_normalizes() {
    let (base_url, server) = serve_once(
        "HTTP/1.1 200 OK",
        r#"{"code": "5000112637922", "status": 1, "product": {"product_name": "Example Cola", "nutrition_grades": "c"}}"#,
    );
    let client = OpenFoodFactsClient::new(LookupSettings::default().with_base_url(base_url)).unwrap();
    let mut workflow = LookupWorkflow::new(client);
    let mut recorder = Recorder::default();

    let barcode = Barcode::parse("5000112637922").unwrap();
    let product = workflow.lookup(&barcode, &mut recorder).unwrap();
    let head = server.join().unwrap().to_ascii_lowercase();

    assert!(head.starts_with("get /api/v2/product/5000112637922.json http/1.1"));
    assert!(head.contains("user-agent: foodfactsapp/1.1 (foodfacts@example.com)"));
    assert!(head.contains("accept: application/json"));
    assert_eq!(product.grade_class(), "nutrition-grade-c");
    assert_eq!(recorder.found, vec!["Example Cola"]);
}

#[test]
fn http_error_is_reported_with_status() {
    let (base_url, server) = serve_once("HTTP/1.1 404 Not Found", r#"{"status": 0}"#);
    let client = OpenFoodFactsClient::new(LookupSettings::default().with_base_url(base_url)).unwrap();
    let mut workflow = LookupWorkflow::new(client);
    let mut recorder = Recorder::default();

    let barcode = Barcode::parse("0000000000000").unwrap();
    let err = workflow.lookup(&barcode, &mut recorder).unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, LookupError::Http { status: 404, .. }));
    assert_eq!(recorder.errors, vec!["API Error: 404 - Not Found"]);
    assert!(!workflow.is_loading());
}

#[test]
fn unreachable_host_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let settings = LookupSettings::default().with_base_url(format!("http://127.0.0.1:{port}"));
    let mut workflow = LookupWorkflow::new(OpenFoodFactsClient::new(settings).unwrap());
    let mut recorder = Recorder::default();

    let err = workflow
        .lookup(&Barcode::parse("123").unwrap(), &mut recorder)
        .unwrap_err();

    assert!(matches!(err, LookupError::Network(_)));
    assert_eq!(recorder.errors.len(), 1);
    assert!(workflow.product().is_none());
}
