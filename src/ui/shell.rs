use crate::{Dispatcher, LopdfBackend, PdfBackend, RunHandle, WorkerEvent};
use log::info;
use std::path::PathBuf;

/// Start button text while idle.
pub const START_LABEL: &str = "Start Extraction";

/// Start button text while a run is active.
pub const WORKING_LABEL: &str = "Processing...";

/// A message the view must show to the user as a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Blocking error, e.g. a folder was not chosen.
    Error { title: String, message: String },

    /// Informational message, e.g. the run finished.
    Info { title: String, message: String },
}

/// State behind the extractor window.
///
/// The log is append-only and is only ever extended from worker events in
/// [`poll`](Self::poll), which runs on the UI thread.
#[derive(Debug)]
pub struct ExtractorShell<B = LopdfBackend> {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    log: Vec<String>,
    dispatcher: Dispatcher<B>,
    run: Option<RunHandle>,
    notice: Option<Notice>,
}

impl Default for ExtractorShell<LopdfBackend> {
    fn default() -> Self {
        Self::new(Dispatcher::default())
    }
}

impl<B> ExtractorShell<B>
where
    B: PdfBackend + Clone + Send + 'static,
{
    pub fn new(dispatcher: Dispatcher<B>) -> Self {
        Self {
            input_dir: None,
            output_dir: None,
            log: Vec::new(),
            dispatcher,
            run: None,
            notice: None,
        }
    }

    // ── Folder selection ─────────────────────────────────────────────────────

    pub fn input_dir(&self) -> Option<&PathBuf> {
        self.input_dir.as_ref()
    }

    pub fn output_dir(&self) -> Option<&PathBuf> {
        self.output_dir.as_ref()
    }

    /// Record the folder chosen in the input picker. A cancelled picker
    /// (`None`) keeps the previous choice.
    pub fn choose_input_dir(&mut self, folder: Option<PathBuf>) {
        if let Some(folder) = folder {
            self.input_dir = Some(folder);
        }
    }

    /// Record the folder chosen in the output picker. A cancelled picker
    /// (`None`) keeps the previous choice.
    pub fn choose_output_dir(&mut self, folder: Option<PathBuf>) {
        if let Some(folder) = folder {
            self.output_dir = Some(folder);
        }
    }

    // ── Run control ──────────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn can_start(&self) -> bool {
        !self.is_running()
    }

    pub fn start_label(&self) -> &'static str {
        if self.is_running() {
            WORKING_LABEL
        } else {
            START_LABEL
        }
    }

    /// Handle a click on the start button.
    ///
    /// Missing folders produce an error notice and no run. Clicks while a run
    /// is active are ignored.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        let input = self.input_dir.clone().unwrap_or_default();
        let output = self.output_dir.clone().unwrap_or_default();

        match self.dispatcher.start(&input, &output) {
            Ok(handle) => self.run = Some(handle),
            Err(e) => {
                self.notice = Some(Notice::Error {
                    title: "Error".into(),
                    message: e.to_string(),
                });
            }
        }
    }

    /// Drain pending worker events into the log. Returns `true` when
    /// anything changed.
    pub fn poll(&mut self) -> bool {
        let Some(run) = &self.run else {
            return false;
        };

        let events = run.drain();
        let changed = !events.is_empty();

        for event in events {
            match event {
                WorkerEvent::Log(line) => self.log.push(line),
                WorkerEvent::Finished(summary) => {
                    if let Some(summary) = summary {
                        info!(
                            "run finished: {} PDF(s), {} image(s)",
                            summary.pdfs_found, summary.images_written
                        );
                    }
                    self.run = None;
                    self.notice = Some(Notice::Info {
                        title: "Complete".into(),
                        message: "Extraction process has finished!".into(),
                    });
                }
            }
        }

        changed
    }

    // ── View data ────────────────────────────────────────────────────────────

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    /// Take the pending notice, if any, so it is shown only once.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}
