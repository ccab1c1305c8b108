use colored::Colorize;
use std::io::{self, BufRead, Write};

use sinoscript_core::prompt::ConfirmationPrompt;

/// Asks on the terminal. Anything but `y`/`yes` declines.
pub struct StdinPrompt;

impl ConfirmationPrompt for StdinPrompt {
    fn confirm(&self, message: &str) -> bool {
        match read_line(&format!("{} [y/N] ", message.yellow())) {
            Some(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            None => false,
        }
    }
}

/// Prints `label` and reads one line from stdin. `None` on EOF or error.
pub fn read_line(label: &str) -> Option<String> {
    print!("{}", label);
    io::stdout().flush().ok()?;

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}
