//! Operator prompts.
//!
//! The operator answers three questions per session: the search query, how
//! many results to scrape, and whether to download PDFs. `Operator` works over
//! any `BufRead`/`Write` pair so the pipeline can be driven from stdin or from
//! a canned script in tests.

use crate::error::{HarvestError, Result};
use std::io::{self, BufRead, Write};

pub const QUERY_PROMPT: &str = "Enter your search query: ";
pub const MAX_RESULTS_PROMPT: &str = "Enter the number of results to scrape: ";
pub const DOWNLOAD_PROMPT: &str = "Do you want to download the PDFs? (1 for yes, 0 for no): ";

/// Console the operator interacts with
pub struct Operator<R, W> {
    input: R,
    output: W,
}

impl Operator<io::StdinLock<'static>, io::Stdout> {
    /// Operator on the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Operator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a line for the operator. Console failures are not fatal.
    pub fn say(&mut self, message: impl AsRef<str>) {
        let _ = writeln!(self.output, "{}", message.as_ref());
    }

    /// Show a prompt and read one line. `None` on end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(Some(trimmed.to_string()))
    }

    /// Ask for the free-text search query
    pub fn read_query(&mut self) -> Result<String> {
        self.ask(QUERY_PROMPT)?
            .ok_or_else(|| HarvestError::InvalidInput("no search query given".to_string()))
    }

    /// Ask for the result bound
    pub fn read_max_results(&mut self) -> Result<usize> {
        let answer = self
            .ask(MAX_RESULTS_PROMPT)?
            .ok_or_else(|| HarvestError::InvalidInput("no result count given".to_string()))?;
        parse_max_results(&answer)
    }

    /// Ask whether to download PDFs. Only a literal `1` means yes.
    pub fn confirm_download(&mut self) -> Result<bool> {
        Ok(self
            .ask(DOWNLOAD_PROMPT)?
            .is_some_and(|answer| is_download_confirmed(&answer)))
    }

    /// Consume the operator and hand back the underlying writer
    pub fn into_output(self) -> W {
        self.output
    }
}

/// Parse the result bound. Whitespace around the number is allowed.
pub fn parse_max_results(answer: &str) -> Result<usize> {
    answer.trim().parse::<usize>().map_err(|e| {
        HarvestError::InvalidInput(format!("'{}' is not a valid result count: {}", answer, e))
    })
}

/// Download gate: anything other than exactly "1" declines
pub fn is_download_confirmed(answer: &str) -> bool {
    answer == "1"
}
