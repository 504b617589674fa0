//! Output formatting for the CLI.

use std::time::Duration;

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use showcase_view::{Notifier, Toast, ToastLevel};

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
    term: Term,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self {
            verbose,
            json,
            term: Term::stdout(),
        }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a plain line.
    pub fn line(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{msg}");
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Show a transient notification.
    pub fn toast(&self, toast: &Toast) {
        if self.json {
            let level = match toast.level {
                ToastLevel::Success => "success",
                ToastLevel::Error => "error",
            };
            eprintln!("{}", serde_json::json!({ "toast": level, "message": toast.message }));
            return;
        }
        match toast.level {
            ToastLevel::Success => eprintln!("{} {}", style("🔔").green(), style(&toast.message).green()),
            ToastLevel::Error => eprintln!("{} {}", style("🔔").red(), style(&toast.message).red()),
        }
    }

    /// A [`Notifier`] that prints toasts through this handler.
    pub fn notifier(&self) -> TermNotifier {
        TermNotifier(self.clone())
    }

    /// Create a spinner for indeterminate progress.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Clear the terminal between interactive screens.
    pub fn clear(&self) {
        if self.json || !self.term.is_term() {
            return;
        }
        let _ = self.term.clear_screen();
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Prints toasts to the terminal.
pub struct TermNotifier(Output);

impl Notifier for TermNotifier {
    fn notify(&self, toast: Toast) {
        self.0.toast(&toast);
    }
}

/// Stock badge, green when in stock.
pub fn stock_badge(in_stock: bool, status: &str) -> String {
    let label = if status.is_empty() {
        if in_stock { "In Stock" } else { "Out of Stock" }
    } else {
        status
    };
    if in_stock {
        style(label).green().to_string()
    } else {
        style(label).red().to_string()
    }
}

/// Star rating with one decimal.
pub fn rating(value: f64) -> String {
    format!("{} {:.1}", style("★").yellow(), value)
}
