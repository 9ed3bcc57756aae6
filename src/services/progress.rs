//! Progress reporting service
//!
//! Separates progress reporting concerns from conversion logic so different
//! frontends (console, JSON stream, channel to a UI thread) can implement
//! their own handling. Progress is milestone-based: a conversion emits a
//! fixed, discrete percentage per stage, never a continuous stream.

use crate::types::ConversionResult;
use instant::Instant;
use serde::Serialize;

/// Milestone stages during an image conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConversionStage {
    /// Conversion accepted, source not yet decoded
    Started,
    /// Source image decoded into memory
    Decoded,
    /// Output encoded (and written, or copied)
    Encoded,
    /// Conversion completed
    Completed,
}

impl ConversionStage {
    /// Human-readable description of the stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ConversionStage::Started => "Starting conversion",
            ConversionStage::Decoded => "Source image decoded",
            ConversionStage::Encoded => "Output encoded",
            ConversionStage::Completed => "Conversion completed",
        }
    }

    /// Fixed progress percentage for this milestone
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        match self {
            ConversionStage::Started => 0,
            ConversionStage::Decoded => 30,
            ConversionStage::Encoded => 90,
            ConversionStage::Completed => 100,
        }
    }
}

/// Progress update containing stage and timing information
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    /// Current conversion stage
    pub stage: ConversionStage,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Human-readable stage description
    pub description: String,
    /// Elapsed time since the conversion started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    /// Create a new progress update for a stage
    #[must_use]
    pub fn new(stage: ConversionStage, start_time: Instant) -> Self {
        Self {
            progress: stage.progress_percentage(),
            description: stage.description().to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
        }
    }
}

/// Trait for reporting progress during conversion operations
pub trait ProgressReporter: Send + Sync {
    /// Report a milestone progress update
    fn report_progress(&self, update: ProgressUpdate);

    /// Report conversion completion (success or failure)
    fn report_completion(&self, result: &ConversionResult);

    /// Report an error during conversion
    fn report_error(&self, stage: ConversionStage, error: &str);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {
        // Intentionally empty - discards progress updates
    }

    fn report_completion(&self, _result: &ConversionResult) {
        // Intentionally empty - discards completion notification
    }

    fn report_error(&self, _stage: ConversionStage, _error: &str) {
        // Intentionally empty - discards error reports
    }
}

/// Console progress reporter that logs milestones
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if self.verbose {
            log::info!(
                "[{}%] {} ({}ms elapsed)",
                update.progress,
                update.description,
                update.elapsed_ms
            );
        } else {
            log::info!("[{}%] {}", update.progress, update.description);
        }
    }

    fn report_completion(&self, result: &ConversionResult) {
        if result.success {
            log::info!("{}", result.message);
        } else {
            log::error!("{}", result.message);
        }
    }

    fn report_error(&self, stage: ConversionStage, error: &str) {
        log::error!("Error during {}: {}", stage.description(), error);
    }
}

/// JSON progress reporter emitting one machine-readable line per event
pub struct JsonProgressReporter;

impl ProgressReporter for JsonProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if let Ok(line) = serde_json::to_string(&update) {
            println!("{}", line);
        }
    }

    fn report_completion(&self, result: &ConversionResult) {
        if let Ok(line) = serde_json::to_string(result) {
            println!("{}", line);
        }
    }

    fn report_error(&self, stage: ConversionStage, error: &str) {
        let record = serde_json::json!({
            "stage": stage.description(),
            "error": error,
        });
        println!("{}", record);
    }
}

/// Progress tracker that manages timing, ordering, and reporting
///
/// Guards the milestone contract: reported percentages never decrease
/// within one conversion, regardless of the stage sequence the caller
/// feeds in.
pub struct ProgressTracker<'a> {
    reporter: &'a dyn ProgressReporter,
    start_time: Instant,
    current_stage: Option<ConversionStage>,
    last_progress: u8,
}

impl<'a> ProgressTracker<'a> {
    /// Create a new progress tracker with the given reporter
    #[must_use]
    pub fn new(reporter: &'a dyn ProgressReporter) -> Self {
        Self {
            reporter,
            start_time: Instant::now(),
            current_stage: None,
            last_progress: 0,
        }
    }

    /// Report a milestone stage
    pub fn report_stage(&mut self, stage: ConversionStage) {
        let mut update = ProgressUpdate::new(stage, self.start_time);
        if update.progress < self.last_progress {
            update.progress = self.last_progress;
        }
        self.last_progress = update.progress;
        self.current_stage = Some(stage);
        self.reporter.report_progress(update);
    }

    /// Report completion with the final result
    pub fn report_completion(&self, result: &ConversionResult) {
        self.reporter.report_completion(result);
    }

    /// Report an error at the current stage
    pub fn report_error(&self, error: &str) {
        let stage = self.current_stage.unwrap_or(ConversionStage::Started);
        self.reporter.report_error(stage, error);
    }

    /// Elapsed time since tracking started
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// The most recently reported stage
    #[must_use]
    pub fn current_stage(&self) -> Option<ConversionStage> {
        self.current_stage
    }
}
