//! CLI presenter for output formatting

use colored::*;

use crate::domain::recording::RecordingState;

/// Presenter for CLI output formatting
#[derive(Debug, Default)]
pub struct Presenter;

impl Presenter {
    pub fn new() -> Self {
        Self
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout (machine-readable results)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print daemon status
    pub fn daemon_status(&self, message: &str) {
        eprintln!("{} Daemon: {}", "●".cyan(), message);
    }

    /// Format a recorder state with its indicator
    pub fn format_state(&self, state: RecordingState) -> String {
        let dot = match state {
            RecordingState::Idle => "○".dimmed(),
            RecordingState::Recording => "●".red(),
            RecordingState::Paused => "‖".yellow(),
        };
        format!("{} {}", dot, state)
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_state_names_the_state() {
        let presenter = Presenter::new();
        assert!(presenter.format_state(RecordingState::Idle).ends_with("idle"));
        assert!(presenter
            .format_state(RecordingState::Recording)
            .ends_with("recording"));
        assert!(presenter.format_state(RecordingState::Paused).ends_with("paused"));
    }
}
