//! Busy indicator shown while a request is in flight.
//!
//! The animation thread shares nothing with the caller except the stop flag.
//! It is always joined: explicitly via [`Spinner::stop`], or on drop.

use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use colored::Colorize;
use tracing::warn;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK: Duration = Duration::from_millis(50);

pub struct Spinner {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Draws on stderr only when it is a terminal.
    pub fn start(label: &str) -> Self {
        Self::spawn(label.to_string(), std::io::stderr().is_terminal())
    }

    fn spawn(label: String, draw: bool) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("spinner".to_string())
            .spawn(move || {
                let mut frame = 0usize;
                while !flag.load(Ordering::Acquire) {
                    if draw {
                        let mut err = std::io::stderr().lock();
                        let _ = write!(
                            err,
                            "\r{} {}",
                            FRAMES[frame % FRAMES.len()].yellow().bold(),
                            label.yellow().bold()
                        );
                        let _ = err.flush();
                    }
                    frame = frame.wrapping_add(1);
                    thread::sleep(TICK);
                }
                if draw {
                    let mut err = std::io::stderr().lock();
                    let _ = write!(err, "\r\x1b[2K");
                    let _ = err.flush();
                }
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Could not start spinner thread: {}", e);
                None
            }
        };

        Self { stop, handle }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the thread and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Spinner thread panicked");
            }
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_stop_joins_thread() {
        let spinner = Spinner::spawn("Thinking...".into(), false);
        assert!(spinner.is_running());
        let stop = Arc::clone(&spinner.stop);

        spinner.stop();
        assert!(stop.load(Ordering::Acquire));
    }

    #[test]
    fn test_drop_joins_thread_on_early_exit() {
        let stop;
        {
            let spinner = Spinner::spawn("Thinking...".into(), false);
            stop = Arc::clone(&spinner.stop);
        }
        assert!(stop.load(Ordering::Acquire));
        // Only the test's clone remains once the thread has been joined.
        assert_eq!(Arc::strong_count(&stop), 1);
    }

    #[test]
    fn test_drop_during_unwind_still_joins() {
        let slot: Arc<Mutex<Option<Arc<AtomicBool>>>> = Arc::new(Mutex::new(None));
        let inner_slot = Arc::clone(&slot);
        let result = std::panic::catch_unwind(move || {
            let spinner = Spinner::spawn("Thinking...".into(), false);
            *inner_slot.lock().unwrap() = Some(Arc::clone(&spinner.stop));
            panic!("request failed");
        });
        assert!(result.is_err());

        let stop = slot.lock().unwrap().take().unwrap();
        assert!(stop.load(Ordering::Acquire));
        assert_eq!(Arc::strong_count(&stop), 1);
    }
}
