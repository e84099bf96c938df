use crate::config::Config;
use crate::error::{Result, VamaError};
use crate::extractor::{run_extractor, Extractor};
use crate::parser::parse_extractor_output;
use crate::scanner::{detect_variant, scan_folder};
use crate::session::report::RunReport;
use crate::session::state::{RunState, Stage};
use crate::sink::{ChannelSink, LogEntry, LogSink};
use crate::template::{write_csv, RowTemplater};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::{self, JoinHandle};

/// Messages from the background unit of work to the foreground.
#[derive(Debug)]
pub enum RunEvent {
    Log(LogEntry),
    Stage(Stage),
    Finished(Box<Result<RunReport>>),
}

impl From<LogEntry> for RunEvent {
    fn from(entry: LogEntry) -> Self {
        RunEvent::Log(entry)
    }
}

/// Runs one folder at a time in the background and tracks its state.
pub struct Session {
    config: Arc<Config>,
    extractor: Arc<dyn Extractor>,
    state: RunState,
}

impl Session {
    pub fn new(config: Config, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            config: Arc::new(config),
            extractor,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Starts processing `folder` on the blocking pool. Must be called from
    /// within a tokio runtime.
    pub fn start(&mut self, folder: PathBuf) -> Result<RunHandle> {
        self.state = self.state.transition(RunState::Running)?;

        let (sender, events) = mpsc::unbounded_channel();
        let config = Arc::clone(&self.config);
        let extractor = Arc::clone(&self.extractor);

        let task = task::spawn_blocking(move || {
            let sink = ChannelSink::new(sender.clone());
            let on_stage = |stage: Stage| {
                let _ = sender.send(RunEvent::Stage(stage));
            };
            let result = process_folder(&folder, &config, extractor.as_ref(), &sink, &on_stage);
            let _ = sender.send(RunEvent::Finished(Box::new(result)));
        });

        Ok(RunHandle { events, task })
    }

    /// Drains `handle`, handing every log line and stage change to
    /// `on_event`, and settles the session state from the outcome.
    pub async fn wait<F>(&mut self, mut handle: RunHandle, mut on_event: F) -> Result<RunReport>
    where
        F: FnMut(&RunEvent),
    {
        let mut outcome = None;

        while let Some(event) = handle.events.recv().await {
            match event {
                RunEvent::Finished(result) => {
                    outcome = Some(*result);
                    break;
                }
                other => on_event(&other),
            }
        }

        let result = match outcome {
            Some(result) => result,
            None => Err(match handle.task.await {
                Err(e) => VamaError::TaskFailed {
                    message: e.to_string(),
                },
                Ok(()) => VamaError::TaskFailed {
                    message: "run ended without a result".to_string(),
                },
            }),
        };

        let next = if result.is_ok() {
            RunState::Succeeded
        } else {
            RunState::Failed
        };
        self.state = self.state.transition(next)?;

        result
    }

    pub async fn run<F>(&mut self, folder: PathBuf, on_event: F) -> Result<RunReport>
    where
        F: FnMut(&RunEvent),
    {
        let handle = self.start(folder)?;
        self.wait(handle, on_event).await
    }
}

pub struct RunHandle {
    events: UnboundedReceiver<RunEvent>,
    task: JoinHandle<()>,
}

/// The whole unit of work: scan, extract, parse, render, write.
///
/// Nothing is written unless extraction and parsing succeeded.
pub fn process_folder(
    folder: &Path,
    config: &Config,
    extractor: &dyn Extractor,
    sink: &dyn LogSink,
    on_stage: &dyn Fn(Stage),
) -> Result<RunReport> {
    let started_at = Utc::now();
    let clock = Instant::now();

    sink.append(LogEntry::info(format!("Processing folder: {}", folder.display())));

    on_stage(Stage::Scanning);
    let pdfs = scan_folder(folder)?;
    if pdfs.is_empty() {
        sink.append(LogEntry::warning(format!(
            "No PDF files found in {}",
            folder.display()
        )));
    } else {
        sink.append(LogEntry::info(format!("Found {} PDF files", pdfs.len())));
    }

    let (variant, variant_detected) = match config.template.variant.fixed() {
        Some(variant) => (variant, false),
        None => {
            let variant = detect_variant(folder, &pdfs);
            sink.append(LogEntry::info(format!("Detected variant: {}", variant)));
            (variant, true)
        }
    };

    on_stage(Stage::Extracting);
    let raw = run_extractor(extractor, folder)?;

    on_stage(Stage::Parsing);
    let batch = parse_extractor_output(&raw, sink)?;

    on_stage(Stage::Writing);
    let templater = RowTemplater::new(&config.template, variant);
    let declarations: Vec<_> = batch
        .declarations
        .iter()
        .map(|p| p.declaration.clone())
        .collect();
    let rows = templater.render(&declarations, sink)?;

    let output_path = folder.join(&config.output.file_name);
    write_csv(
        &output_path,
        &templater.header(),
        &rows,
        config.output.atomic_write,
    )?;
    sink.append(LogEntry::success(format!(
        "CSV written to: {}",
        output_path.display()
    )));

    Ok(RunReport {
        folder: folder.to_path_buf(),
        variant,
        variant_detected,
        output_path,
        pdf_count: pdfs.len(),
        rows_written: rows.len(),
        outcomes: batch.outcomes,
        declarations: batch.declarations,
        started_at,
        duration_ms: clock.elapsed().as_millis() as u64,
    })
}
