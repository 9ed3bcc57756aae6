//! Worker-thread execution of conversions
//!
//! One dedicated worker per user-initiated conversion, delivering progress
//! and completion as asynchronous events over a FIFO channel. The caller's
//! thread never blocks on the conversion unless it chooses to wait.

use crate::{
    converter::ImageConverter,
    services::{ConversionStage, ProgressReporter, ProgressUpdate},
    types::{ConversionRequest, ConversionResult, ConversionStatus},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;

/// Cooperative cancellation flag shared between a caller and a worker
///
/// Inspected by the converter only between milestones; setting it never
/// aborts an in-flight decode, encode, or write.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a fresh, uncancelled token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Event delivered from a conversion worker to its handle
///
/// Per conversion, events arrive in milestone order and end with exactly
/// one terminal event (`Finished` or `Cancelled`).
#[derive(Debug, Clone)]
pub enum ConversionEvent {
    /// A milestone progress update
    Progress(ProgressUpdate),
    /// Terminal: the conversion produced a result
    Finished(ConversionResult),
    /// Terminal: the cancellation flag was observed
    Cancelled,
}

/// Progress reporter that forwards milestones over the worker channel
struct ChannelProgressReporter {
    sender: Mutex<mpsc::Sender<ConversionEvent>>,
}

impl ChannelProgressReporter {
    fn new(sender: mpsc::Sender<ConversionEvent>) -> Self {
        Self {
            sender: Mutex::new(sender),
        }
    }
}

impl ProgressReporter for ChannelProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if let Ok(sender) = self.sender.lock() {
            // The receiver may already be gone if the front-end dropped
            // its handle; the worker keeps running regardless.
            let _ = sender.send(ConversionEvent::Progress(update));
        }
    }

    fn report_completion(&self, _result: &ConversionResult) {
        // The worker sends the terminal event itself
    }

    fn report_error(&self, _stage: ConversionStage, _error: &str) {
        // Errors arrive as a failure result in the terminal event
    }
}

/// Handle to a conversion running on its own worker thread
///
/// Owning the handle is what makes a conversion outstanding: a front-end
/// that wants to forbid concurrent conversions simply keeps the convert
/// action disabled while it still holds one.
pub struct ConversionHandle {
    events: mpsc::Receiver<ConversionEvent>,
    cancel: CancellationToken,
    thread: Option<JoinHandle<()>>,
}

impl ConversionHandle {
    /// Request cooperative cancellation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the worker's cancellation token
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the worker thread has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Non-blocking poll for the next event
    #[must_use]
    pub fn try_event(&self) -> Option<ConversionEvent> {
        self.events.try_recv().ok()
    }

    /// Blocking receive of the next event; `None` once the worker is gone
    #[must_use]
    pub fn recv_event(&self) -> Option<ConversionEvent> {
        self.events.recv().ok()
    }

    /// Block until the terminal event and return the conversion status
    ///
    /// Intermediate progress events still queued are drained and dropped;
    /// callers that want them should consume events before waiting.
    #[must_use]
    pub fn wait(mut self) -> ConversionStatus {
        let mut terminal = None;
        while let Ok(event) = self.events.recv() {
            match event {
                ConversionEvent::Finished(result) => {
                    terminal = Some(ConversionStatus::Finished(result));
                    break;
                },
                ConversionEvent::Cancelled => {
                    terminal = Some(ConversionStatus::Cancelled);
                    break;
                },
                ConversionEvent::Progress(_) => {},
            }
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        terminal.unwrap_or_else(|| {
            ConversionStatus::Finished(ConversionResult::failure(
                "Conversion worker terminated unexpectedly",
            ))
        })
    }
}

impl ImageConverter {
    /// Run a conversion on a dedicated worker thread
    ///
    /// The request is consumed by the worker; progress and the terminal
    /// result arrive as [`ConversionEvent`]s on the returned handle, in
    /// milestone order.
    #[must_use]
    pub fn spawn(&self, request: ConversionRequest) -> ConversionHandle {
        let (sender, events) = mpsc::channel();
        let cancel = CancellationToken::new();
        let converter = self.clone();
        let token = cancel.clone();

        let thread = std::thread::spawn(move || {
            let reporter = ChannelProgressReporter::new(sender.clone());
            let status = converter.convert_with(&request, &reporter, &token);
            let terminal = match status {
                ConversionStatus::Finished(result) => ConversionEvent::Finished(result),
                ConversionStatus::Cancelled => ConversionEvent::Cancelled,
            };
            if sender.send(terminal).is_err() {
                log::debug!(
                    "Conversion of {} finished after its handle was dropped",
                    request.source_path.display()
                );
            }
        });

        ConversionHandle {
            events,
            cancel,
            thread: Some(thread),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageFormat;
    use image::{DynamicImage, RgbaImage};
    use tempfile::TempDir;

    fn sample_request(dir: &TempDir, target: ImageFormat, out: &str) -> ConversionRequest {
        let source = dir.path().join("in.png");
        DynamicImage::ImageRgba8(RgbaImage::new(4, 4))
            .save(&source)
            .unwrap();
        ConversionRequest::new(source, target, dir.path().join(out))
    }

    #[test]
    fn test_worker_delivers_milestones_then_finished() {
        let dir = TempDir::new().unwrap();
        let handle =
            ImageConverter::default().spawn(sample_request(&dir, ImageFormat::Bmp, "out.bmp"));

        let mut percentages = Vec::new();
        let mut terminal = None;
        while let Some(event) = handle.recv_event() {
            match event {
                ConversionEvent::Progress(update) => percentages.push(update.progress),
                other => {
                    terminal = Some(other);
                    break;
                },
            }
        }

        assert_eq!(percentages, vec![0, 30, 90, 100]);
        assert!(matches!(
            terminal,
            Some(ConversionEvent::Finished(ConversionResult { success: true, .. }))
        ));
    }

    #[test]
    fn test_worker_failure_emits_no_hundred() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("corrupt.png");
        std::fs::write(&source, b"junk").unwrap();
        let request =
            ConversionRequest::new(source, ImageFormat::Png, dir.path().join("out.png"));

        let handle = ImageConverter::default().spawn(request);
        let mut percentages = Vec::new();
        let mut terminal = None;
        while let Some(event) = handle.recv_event() {
            match event {
                ConversionEvent::Progress(update) => percentages.push(update.progress),
                other => {
                    terminal = Some(other);
                    break;
                },
            }
        }

        assert!(!percentages.contains(&100));
        assert!(matches!(
            terminal,
            Some(ConversionEvent::Finished(ConversionResult { success: false, .. }))
        ));
    }

    #[test]
    fn test_cancelled_worker_sends_cancelled_terminal() {
        let dir = TempDir::new().unwrap();
        let converter = ImageConverter::default();
        let handle = converter.spawn(sample_request(&dir, ImageFormat::Jpeg, "out.jpg"));
        handle.cancel();

        // Cancellation is cooperative: the worker may or may not have passed
        // the checkpoints already, so either terminal event is legal - but
        // there must be exactly one, and a Cancelled one ends the stream.
        let status = handle.wait();
        match status {
            ConversionStatus::Cancelled => {},
            ConversionStatus::Finished(result) => assert!(result.success),
        }
    }

    #[test]
    fn test_wait_returns_result() {
        let dir = TempDir::new().unwrap();
        let handle =
            ImageConverter::default().spawn(sample_request(&dir, ImageFormat::Png, "out2.png"));
        let status = handle.wait();
        let result = status.finished().expect("not cancelled");
        assert!(result.success);
    }

    #[test]
    fn test_cancellation_token_flag() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
    }
}
