//! Line-based collector over a terminal (or any reader/writer pair).

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use gtd_core::{Collector, CollectorError};
use tokio::sync::Notify;

/// Exit status of a process stopped by SIGINT (128 + 2).
const INTERRUPTED_STATUS: i32 = 130;

/// Prompts on `output`, reads answers from `input`.
pub struct TerminalCollector<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalCollector<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Counts down, redrawing the remaining seconds in place.
    ///
    /// Ctrl-C during the countdown ends it early. Once a countdown has run,
    /// Ctrl-C anywhere else exits the process with status 130.
    fn run_countdown(&mut self, seconds: u64) -> io::Result<()> {
        let interrupts = Interrupts::get()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let output = &mut self.output;
        runtime.block_on(async {
            let mut interrupt = std::pin::pin!(interrupts.notify.notified());
            interrupt.as_mut().enable();
            let _active = interrupts.activate();
            let mut remaining = seconds;
            loop {
                write!(output, "\r{:14}\r   {remaining}", "")?;
                output.flush()?;
                if remaining == 0 {
                    break;
                }
                tokio::select! {
                    () = &mut interrupt => {
                        tracing::debug!(remaining, "countdown interrupted");
                        break;
                    }
                    () = tokio::time::sleep(Duration::from_secs(1)) => remaining -= 1,
                }
            }
            Ok::<_, io::Error>(())
        })?;
        writeln!(self.output)?;
        writeln!(self.output, "Time's up!")?;
        Ok(())
    }
}

static INTERRUPTS: OnceLock<Interrupts> = OnceLock::new();

/// Process-wide SIGINT listener, installed by the first countdown.
///
/// Installing a handler replaces the default action for the rest of the
/// process, so the listener forwards interrupts to a running countdown and
/// exits with the conventional status otherwise.
struct Interrupts {
    notify: Arc<Notify>,
    counting: Arc<AtomicBool>,
}

/// Marks a countdown as running until dropped.
struct Active<'a>(&'a AtomicBool);

impl Drop for Active<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Interrupts {
    fn get() -> io::Result<&'static Self> {
        if let Some(interrupts) = INTERRUPTS.get() {
            return Ok(interrupts);
        }
        let installed = Self::install()?;
        Ok(INTERRUPTS.get_or_init(|| installed))
    }

    fn install() -> io::Result<Self> {
        let notify = Arc::new(Notify::new());
        let counting = Arc::new(AtomicBool::new(false));
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        // Registered here so an interrupt right after install is not lost.
        #[cfg(unix)]
        let mut sigint = {
            let _guard = runtime.enter();
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?
        };

        let (forward, active) = (Arc::clone(&notify), Arc::clone(&counting));
        std::thread::Builder::new()
            .name("sigint".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    loop {
                        #[cfg(unix)]
                        let received = sigint.recv().await.is_some();
                        #[cfg(not(unix))]
                        let received = tokio::signal::ctrl_c().await.is_ok();
                        if !received {
                            break;
                        }
                        if active.load(Ordering::SeqCst) {
                            forward.notify_waiters();
                        } else {
                            tracing::debug!("interrupted outside countdown");
                            std::process::exit(INTERRUPTED_STATUS);
                        }
                    }
                });
            })?;
        Ok(Self { notify, counting })
    }

    fn activate(&self) -> Active<'_> {
        self.counting.store(true, Ordering::SeqCst);
        Active(&self.counting)
    }
}

impl<R: BufRead, W: Write> Collector for TerminalCollector<R, W> {
    fn say(&mut self, message: &str) -> Result<(), CollectorError> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<String, CollectorError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(CollectorError::Closed);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    fn countdown(&mut self, seconds: u64) -> Result<(), CollectorError> {
        Ok(self.run_countdown(seconds)?)
    }
}
