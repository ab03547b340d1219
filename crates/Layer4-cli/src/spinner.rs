//! Progress spinner on stderr

use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, IsTerminal};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Frame shown at `tick`
pub fn frame(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

/// Animates while a future is awaited; cleared on drop
pub struct Spinner {
    task: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start spinning with `message`, unless stderr is not a terminal
    pub fn start(message: impl Into<String>) -> Self {
        if !io::stderr().is_terminal() {
            return Self::disabled();
        }

        let message = message.into();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(FRAME_INTERVAL);
            let mut stderr = io::stderr();
            let mut tick = 0usize;
            loop {
                interval.tick().await;
                let _ = execute!(
                    stderr,
                    cursor::MoveToColumn(0),
                    SetForegroundColor(Color::Cyan),
                    Print(frame(tick)),
                    Print(" "),
                    Print(&message),
                    ResetColor
                );
                tick = tick.wrapping_add(1);
            }
        });
        Self { task: Some(task) }
    }

    pub fn disabled() -> Self {
        Self { task: None }
    }

    pub fn stop(mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let mut stderr = io::stderr();
            let _ = execute!(
                stderr,
                cursor::MoveToColumn(0),
                Clear(ClearType::CurrentLine)
            );
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.clear();
    }
}
