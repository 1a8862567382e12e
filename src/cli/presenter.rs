//! CLI presenter for output formatting
//!
//! Status lines go to stdout exactly as scripts expect them; diagnostics and
//! the consent spinner go to stderr.

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

type Sink = Mutex<Box<dyn Write + Send>>;

/// Presenter for CLI output formatting
pub struct Presenter {
    out: Sink,
    err: Sink,
    color: bool,
    interactive: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl Presenter {
    /// Create a presenter on the process's stdout and stderr
    pub fn new() -> Self {
        let interactive = io::stderr().is_terminal();
        Self {
            out: Mutex::new(Box::new(io::stdout())),
            err: Mutex::new(Box::new(io::stderr())),
            color: interactive,
            interactive,
            spinner: Mutex::new(None),
        }
    }

    /// Create a presenter writing into memory, for tests
    pub fn capture() -> (Self, Captured) {
        let captured = Captured::default();
        let presenter = Self {
            out: Mutex::new(Box::new(captured.out.clone())),
            err: Mutex::new(Box::new(captured.err.clone())),
            color: false,
            interactive: false,
            spinner: Mutex::new(None),
        };
        (presenter, captured)
    }

    fn write_line(sink: &Sink, line: &str) {
        if let Ok(mut sink) = sink.lock() {
            let _ = writeln!(sink, "{}", line);
            let _ = sink.flush();
        }
    }

    fn symbol(&self, symbol: &str, paint: fn(&str) -> ColoredString) -> String {
        if self.color {
            paint(symbol).to_string()
        } else {
            symbol.to_string()
        }
    }

    /// Output a status line to stdout
    pub fn output(&self, text: &str) {
        Self::write_line(&self.out, text);
    }

    /// Print a plain line to stderr
    pub fn note(&self, message: &str) {
        self.suspend(|| Self::write_line(&self.err, message));
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        let line = format!("{} {}", self.symbol("✗", |s| s.red()), message);
        self.note(&line);
    }

    /// Start a spinner with message; a no-op unless stderr is a terminal
    pub fn start_spinner(&self, message: &str) {
        if !self.interactive {
            return;
        }

        let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.replace(spinner) {
                previous.finish_and_clear();
            }
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&self) {
        let spinner = self.spinner.lock().ok().and_then(|mut slot| slot.take());
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
    }

    fn suspend(&self, f: impl FnOnce()) {
        let spinner = self.spinner.lock().ok().and_then(|slot| slot.clone());
        match spinner {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory buffer shared with a capturing presenter
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        self.0
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self.0.lock() {
            Ok(mut buf) => {
                buf.extend_from_slice(data);
                Ok(data.len())
            }
            Err(_) => Err(io::Error::other("capture buffer poisoned")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// What a capturing presenter wrote
#[derive(Clone, Default)]
pub struct Captured {
    out: SharedBuffer,
    err: SharedBuffer,
}

impl Captured {
    pub fn stdout(&self) -> String {
        self.out.contents()
    }

    pub fn stderr(&self) -> String {
        self.err.contents()
    }
}
