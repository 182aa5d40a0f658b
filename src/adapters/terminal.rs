use crate::domain::ports::Console;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Default)]
pub struct StdConsole;

impl StdConsole {
    pub fn new() -> Self {
        Self
    }
}

impl Console for StdConsole {
    fn status(&self, line: &str) {
        println!("{}", line);
    }

    fn error(&self, line: &str) {
        eprintln!("{}", line);
    }

    fn pause(&self, prompt: &str) {
        print!("{}", prompt);
        let _ = io::stdout().flush();

        let mut buf = String::new();
        if let Err(e) = io::stdin().lock().read_line(&mut buf) {
            tracing::debug!("Pause read failed: {}", e);
        }
    }
}
