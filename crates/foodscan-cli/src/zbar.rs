//! Decoder backed by the zbar command-line tools.
//!
//! Still images go through `zbarimg`, live streams through `zbarcam`
//! reading the camera device. Both run with `--raw`, so every stdout line is
//! one decoded payload.

use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use foodscan_acquisition::{
    AcquisitionError, Decoder, DetectionSink, ImageSource, MediaStream, Result, StreamDecoder,
};
use foodscan_model::{Barcode, DecoderConfig, Symbology};
use tracing::{debug, warn};

/// `zbarimg` exit status when the image holds no barcode.
const ZBARIMG_NOT_FOUND: i32 = 4;

/// zbar's name for a symbology.
#[must_use]
pub fn zbar_symbology(symbology: Symbology) -> &'static str {
    match symbology {
        Symbology::Ean13 => "ean13",
        Symbology::Ean8 => "ean8",
        Symbology::Code128 => "code128",
        // zbar has no VIN variant; plain Code 39 covers it.
        Symbology::Code39 | Symbology::Code39Vin => "code39",
        Symbology::UpcA => "upca",
        Symbology::UpcE => "upce",
    }
}

/// `-S` switches enabling exactly the configured symbologies.
#[must_use]
pub fn symbology_args(config: &DecoderConfig) -> Vec<String> {
    let mut args = vec!["-Sdisable".to_string()];
    for symbology in &config.symbologies {
        let arg = format!("-S{}.enable", zbar_symbology(*symbology));
        if !args.contains(&arg) {
            args.push(arg);
        }
    }
    args
}

/// First barcode in `--raw` output.
#[must_use]
pub fn parse_raw_output(stdout: &str) -> Option<Barcode> {
    stdout.lines().find_map(Barcode::parse)
}

/// [`Decoder`] running `zbarimg` and `zbarcam`.
#[derive(Debug, Clone)]
pub struct ZbarDecoder {
    zbarimg: PathBuf,
    zbarcam: PathBuf,
}

impl ZbarDecoder {
    pub fn new(zbarimg: impl Into<PathBuf>, zbarcam: impl Into<PathBuf>) -> Self {
        Self {
            zbarimg: zbarimg.into(),
            zbarcam: zbarcam.into(),
        }
    }
}

impl Decoder for ZbarDecoder {
    fn decode_image(&self, source: &ImageSource, config: &DecoderConfig) -> Result<Barcode> {
        let output = Command::new(&self.zbarimg)
            .arg("--quiet")
            .arg("--raw")
            .args(symbology_args(config))
            .arg(source.path())
            .stdin(Stdio::null())
            .output()
            .map_err(|err| {
                AcquisitionError::Decode(format!("{}: {err}", self.zbarimg.display()))
            })?;

        if output.status.code() == Some(ZBARIMG_NOT_FOUND) {
            return Err(AcquisitionError::DecodeNotFound);
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AcquisitionError::Decode(format!(
                "zbarimg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_raw_output(&String::from_utf8_lossy(&output.stdout))
            .ok_or(AcquisitionError::DecodeNotFound)
    }

    fn start_stream(
        &self,
        stream: &dyn MediaStream,
        config: &DecoderConfig,
        sink: DetectionSink,
    ) -> Result<Box<dyn StreamDecoder>> {
        let mut child = Command::new(&self.zbarcam)
            .arg("--nodisplay")
            .arg("--raw")
            .args(symbology_args(config))
            .arg(stream.source())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                AcquisitionError::DecodeInit(format!("{}: {err}", self.zbarcam.display()))
            })?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AcquisitionError::DecodeInit(
                "zbarcam stdout unavailable".to_string(),
            ));
        };
        debug!(pid = child.id(), device = stream.source(), "zbarcam started");

        let reader = match std::thread::Builder::new()
            .name("zbarcam-reader".to_string())
            .spawn(move || forward_detections(stdout, &sink))
        {
            Ok(reader) => reader,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(AcquisitionError::DecodeInit(err.to_string()));
            }
        };

        Ok(Box::new(ZbarcamProcess {
            child: Some(child),
            reader: Some(reader),
        }))
    }
}

/// Forward the first decoded line to `sink`; report a failure if the output
/// ends without one.
pub fn forward_detections(output: impl Read, sink: &DetectionSink) {
    for line in BufReader::new(output).lines() {
        match line {
            Ok(line) => {
                if let Some(barcode) = Barcode::parse(&line) {
                    sink.detect(barcode);
                    return;
                }
            }
            Err(err) => {
                sink.fail(err.to_string());
                return;
            }
        }
    }
    sink.fail("zbarcam exited");
}

/// A running `zbarcam` child plus its stdout reader.
struct ZbarcamProcess {
    child: Option<Child>,
    reader: Option<JoinHandle<()>>,
}

impl StreamDecoder for ZbarcamProcess {
    fn stop(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        // Already exited after a detection is fine.
        if let Err(err) = child.kill() {
            debug!(error = %err, "zbarcam kill");
        }
        finish_stop(child.wait(), self.reader.take())
    }
}

/// Join the reader, then report how waiting for `zbarcam` went.
fn finish_stop(waited: io::Result<ExitStatus>, reader: Option<JoinHandle<()>>) -> Result<()> {
    if let Some(reader) = reader
        && reader.join().is_err()
    {
        warn!("zbarcam reader thread panicked");
    }
    let status = waited.map_err(|err| AcquisitionError::Release(err.to_string()))?;
    debug!(%status, "zbarcam stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use foodscan_acquisition::{DetectionPoll, StreamSignal, detection_channel};

    use super::*;

    #[test]
    fn test_symbology_args_deduplicates_code39() {
        let config = DecoderConfig::with_symbologies([
            Symbology::Code39,
            Symbology::Code39Vin,
            Symbology::Ean13,
        ]);
        assert_eq!(
            symbology_args(&config),
            vec!["-Sdisable", "-Scode39.enable", "-Sean13.enable"]
        );
    }

    #[test]
    fn test_default_config_enables_six_zbar_symbologies() {
        assert_eq!(symbology_args(&DecoderConfig::default()).len(), 7);
    }

    #[test]
    fn test_parse_raw_output_skips_blank_lines() {
        assert_eq!(
            parse_raw_output("\n  \n5000112637922\n4006381333931\n"),
            Barcode::parse("5000112637922")
        );
        assert_eq!(parse_raw_output(""), None);
    }

    #[test]
    fn test_forward_detections_sends_first_line_only() {
        let (sink, receiver) = detection_channel();
        forward_detections(&b"\n737628064502\n5000112637922\n"[..], &sink);

        assert_eq!(
            receiver.try_next(),
            DetectionPoll::Ready(StreamSignal::Detected(Barcode::parse("737628064502").unwrap()))
        );
        assert_eq!(receiver.try_next(), DetectionPoll::Empty);
    }

    #[test]
    fn test_forward_detections_reports_exit() {
        let (sink, receiver) = detection_channel();
        forward_detections(&b""[..], &sink);

        assert_eq!(
            receiver.wait(Duration::from_secs(1)),
            Some(StreamSignal::Failed("zbarcam exited".to_string()))
        );
    }

    #[test]
    fn test_failed_wait_still_joins_reader() {
        let joined = Arc::new(AtomicBool::new(false));
        let flag = joined.clone();
        let reader = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            flag.store(true, Ordering::SeqCst);
        });

        let err = finish_stop(Err(io::Error::other("no child")), Some(reader)).unwrap_err();
        assert!(joined.load(Ordering::SeqCst));
        assert!(matches!(err, AcquisitionError::Release(message) if message == "no child"));
    }

    #[test]
    fn test_missing_zbarimg_is_decode_error() {
        let decoder = ZbarDecoder::new("/nonexistent/zbarimg", "/nonexistent/zbarcam");
        let err = decoder
            .decode_image(&ImageSource::from_path("cola.jpg"), &DecoderConfig::default())
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::Decode(_)));
    }
}
