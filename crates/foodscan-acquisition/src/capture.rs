//! Live capture handle: one camera stream plus its stream decoder.

use tracing::{debug, warn};

use crate::capability::{MediaStream, StreamDecoder};

/// Owns the camera stream and the decoder bound to it.
///
/// Release order is fixed: decoder first, then stream. Release happens at
/// most once, on [`LiveCapture::release`] or on drop. Failures are logged
/// and swallowed.
pub struct LiveCapture {
    decoder: Option<Box<dyn StreamDecoder>>,
    stream: Option<Box<dyn MediaStream>>,
}

impl LiveCapture {
    pub fn new(stream: Box<dyn MediaStream>, decoder: Box<dyn StreamDecoder>) -> Self {
        Self {
            decoder: Some(decoder),
            stream: Some(stream),
        }
    }

    /// Stop a stream that never got a decoder bound.
    pub fn release_stream(mut stream: Box<dyn MediaStream>) {
        if let Err(err) = stream.stop() {
            warn!(error = %err, "failed to stop camera stream");
        }
    }

    /// Device the stream was opened on.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.stream.as_deref().map(MediaStream::source)
    }

    /// Whether anything is still held.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.decoder.is_some() || self.stream.is_some()
    }

    /// Stop the decoder, then the stream.
    pub fn release(&mut self) {
        if let Some(mut decoder) = self.decoder.take() {
            if let Err(err) = decoder.stop() {
                warn!(error = %err, "failed to stop stream decoder");
            }
        }
        if let Some(stream) = self.stream.take() {
            debug!(source = stream.source(), "stopping camera stream");
            Self::release_stream(stream);
        }
    }
}

impl Drop for LiveCapture {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for LiveCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveCapture")
            .field("source", &self.source())
            .field("decoder", &self.decoder.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::{AcquisitionError, Result};

    type Log = Arc<Mutex<Vec<&'static str>>>;

    struct FakeStream(Log);
    impl MediaStream for FakeStream {
        fn source(&self) -> &str {
            "fake"
        }
        fn stop(&mut self) -> Result<()> {
            self.0.lock().unwrap().push("stream.stop");
            Ok(())
        }
    }

    struct FailingDecoder(Log);
    impl StreamDecoder for FailingDecoder {
        fn stop(&mut self) -> Result<()> {
            self.0.lock().unwrap().push("decoder.stop");
            Err(AcquisitionError::Release("busy".to_string()))
        }
    }

    #[test]
    fn test_release_order_and_once() {
        let log: Log = Arc::default();
        let mut capture = LiveCapture::new(
            Box::new(FakeStream(log.clone())),
            Box::new(FailingDecoder(log.clone())),
        );
        assert_eq!(capture.source(), Some("fake"));

        capture.release();
        capture.release();
        assert!(!capture.is_active());
        drop(capture);

        // Decoder failure does not prevent the stream from stopping.
        assert_eq!(*log.lock().unwrap(), vec!["decoder.stop", "stream.stop"]);
    }

    #[test]
    fn test_drop_releases() {
        let log: Log = Arc::default();
        {
            let _capture = LiveCapture::new(
                Box::new(FakeStream(log.clone())),
                Box::new(FailingDecoder(log.clone())),
            );
        }
        assert_eq!(*log.lock().unwrap(), vec!["decoder.stop", "stream.stop"]);
    }
}
