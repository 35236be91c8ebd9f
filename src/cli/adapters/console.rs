//! Console adapter trait

use colored::*;
use std::io::Write;

/// Where command output goes
///
/// # Example
///
/// ```rust,ignore
/// use pbx::cli::Console;
///
/// struct Quiet;
///
/// impl Console for Quiet {
///     fn print(&self, _text: &str) {}
///     fn info(&self, _message: &str) {}
///     fn success(&self, _message: &str) {}
///     fn warn(&self, _message: &str) {}
///     fn error(&self, _message: &str) {}
/// }
/// ```
pub trait Console {
    /// Plain text, printed as is
    fn print(&self, text: &str);

    /// Log an informational message
    fn info(&self, message: &str);

    /// Log a success message
    fn success(&self, message: &str);

    /// Log a warning message
    fn warn(&self, message: &str);

    /// Log an error message
    fn error(&self, message: &str);

    /// Clear the terminal
    fn clear_screen(&self) {}
}

/// Colored stdout/stderr console
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn print(&self, text: &str) {
        println!("{}", text);
    }

    fn info(&self, message: &str) {
        println!("{} {}", "[*]".cyan(), message);
    }

    fn success(&self, message: &str) {
        println!("{} {}", "[✓]".green().bold(), message.green());
    }

    fn warn(&self, message: &str) {
        println!("{} {}", "[!]".yellow().bold(), message.yellow());
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", "[!]".red().bold(), message.red());
    }

    fn clear_screen(&self) {
        print!("\x1B[2J\x1B[1;1H");
        let _ = std::io::stdout().flush();
    }
}
