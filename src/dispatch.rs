use crate::{ExtractError, ExtractorConfig, FolderWalker, LogSink, LopdfBackend, PdfBackend, Result, RunSummary};
use log::{debug, error};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Name given to the background thread of a run.
pub const WORKER_THREAD_NAME: &str = "pdf-extract-worker";

/// Messages sent from the worker thread to whoever started the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// One progress line.
    Log(String),

    /// The run is over. Always the last event of a run, sent exactly once.
    /// `None` when the run ended with an unexpected failure.
    Finished(Option<RunSummary>),
}

/// Forwards log lines to the channel of a run.
struct ChannelSink(Sender<WorkerEvent>);

impl LogSink for ChannelSink {
    fn log(&self, message: &str) {
        // the receiver may be gone if the UI closed; the run carries on regardless
        let _ = self.0.send(WorkerEvent::Log(message.to_owned()));
    }
}

/// Clears the busy flag when dropped, also while unwinding.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Starts folder runs on a background thread, one at a time.
#[derive(Debug, Clone)]
pub struct Dispatcher<B = LopdfBackend> {
    walker: FolderWalker<B>,
    busy: Arc<AtomicBool>,
}

impl Default for Dispatcher<LopdfBackend> {
    fn default() -> Self {
        Self::with_config(ExtractorConfig::default())
    }
}

impl Dispatcher<LopdfBackend> {
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self::new(FolderWalker::with_config(config))
    }
}

impl<B> Dispatcher<B>
where
    B: PdfBackend + Clone + Send + 'static,
{
    pub fn new(walker: FolderWalker<B>) -> Self {
        Self {
            walker,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns `true` while a run started by this dispatcher is active.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Validate both folders and start a run in the background.
    ///
    /// Returns [`ExtractError::MissingSelection`] when either path is empty and
    /// [`ExtractError::RunInProgress`] when a run is still active. In both
    /// cases nothing is started and the file system is left untouched.
    pub fn start(&self, input_dir: impl AsRef<Path>, output_root: impl AsRef<Path>) -> Result<RunHandle> {
        let input_dir = input_dir.as_ref().to_path_buf();
        let output_root = output_root.as_ref().to_path_buf();

        if input_dir.as_os_str().is_empty() || output_root.as_os_str().is_empty() {
            return Err(ExtractError::MissingSelection);
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ExtractError::RunInProgress);
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        let (sender, events) = mpsc::channel();
        let walker = self.walker.clone();

        debug!(
            "starting run: {} -> {}",
            input_dir.display(),
            output_root.display()
        );
        // if spawning fails the closure, and the guard with it, is dropped
        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || run_worker(walker, input_dir, output_root, sender, guard))?;

        Ok(RunHandle {
            events,
            thread: Some(thread),
        })
    }
}

fn run_worker<B: PdfBackend>(
    walker: FolderWalker<B>,
    input_dir: PathBuf,
    output_root: PathBuf,
    sender: Sender<WorkerEvent>,
    guard: BusyGuard,
) {
    let sink = ChannelSink(sender.clone());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        walker.process_folder(&input_dir, &output_root, &sink)
    }));

    let summary = match outcome {
        Ok(summary) => Some(summary),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("run aborted: {}", message);
            sink.log(&format!("An unexpected error occurred: {}", message));
            None
        }
    };

    drop(guard);
    let _ = sender.send(WorkerEvent::Finished(summary));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Receiving end of an active run.
#[derive(Debug)]
pub struct RunHandle {
    events: Receiver<WorkerEvent>,
    thread: Option<JoinHandle<()>>,
}

impl RunHandle {
    /// Events that have arrived so far, without blocking.
    ///
    /// Returns an empty list when nothing new is available. Once the worker
    /// has gone away without a [`WorkerEvent::Finished`] (which only happens
    /// if the thread itself was killed), a synthetic `Finished(None)` is
    /// produced so callers never wait forever.
    pub fn drain(&self) -> Vec<WorkerEvent> {
        let mut out = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    let finished = matches!(event, WorkerEvent::Finished(_));
                    out.push(event);
                    if finished {
                        break;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    out.push(WorkerEvent::Finished(None));
                    break;
                }
            }
        }
        out
    }

    /// Block until the run is over, handing each log line to `sink`, then join
    /// the worker thread.
    pub fn wait(mut self, sink: &dyn LogSink) -> Option<RunSummary> {
        let mut summary = None;
        for event in self.events.iter() {
            match event {
                WorkerEvent::Log(line) => sink.log(&line),
                WorkerEvent::Finished(result) => {
                    summary = result;
                    break;
                }
            }
        }

        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        summary
    }
}
