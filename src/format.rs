//! Destination-language pretty-printing
//!
//! Formatting is delegated to the language's own tool. A rejection means the
//! generator produced malformed source, which is reported as [`Error::Format`].

use crate::emit::Target;
use crate::{Error, Result};
use std::io::Write;
use std::process::{Command, Stdio};

/// Turns emitted text into its final, formatted form
pub trait Formatter {
    fn format(&self, source: &str) -> Result<String>;
}

impl<F: Formatter + ?Sized> Formatter for Box<F> {
    fn format(&self, source: &str) -> Result<String> {
        (**self).format(source)
    }
}

/// Leaves the text untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Formatter for Passthrough {
    fn format(&self, source: &str) -> Result<String> {
        Ok(source.to_string())
    }
}

/// Pipes the text through an external program (stdin to stdout)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFormatter {
    pub program: String,
    pub args: Vec<String>,
}

impl ExternalFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a command line such as `["rustfmt", "--emit", "stdout"]`
    pub fn from_command(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::Config("Formatter command is empty".to_string()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }

    /// The standard tool for a target
    pub fn for_target(target: Target) -> Self {
        match target {
            Target::Go => Self::new("gofmt", Vec::new()),
            Target::Rust => Self::new(
                "rustfmt",
                ["--edition", "2021", "--emit", "stdout"]
                    .map(String::from)
                    .to_vec(),
            ),
        }
    }

    fn failure(&self, message: impl Into<String>) -> Error {
        Error::Format {
            program: self.program.clone(),
            message: message.into(),
        }
    }
}

impl Formatter for ExternalFormatter {
    fn format(&self, source: &str) -> Result<String> {
        tracing::debug!("Formatting with {} {:?}", self.program, self.args);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.failure(format!("could not start: {}", e)))?;

        // Write from a separate thread so a full stdout pipe cannot deadlock us.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.failure("stdin unavailable"))?;
        let input = source.to_string();
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child
            .wait_with_output()
            .map_err(|e| self.failure(e.to_string()))?;
        writer
            .join()
            .map_err(|_| self.failure("stdin writer panicked"))?
            .map_err(|e| self.failure(format!("writing input: {}", e)))?;

        if !output.status.success() {
            return Err(self.failure(String::from_utf8_lossy(&output.stderr).trim().to_string()));
        }

        String::from_utf8(output.stdout).map_err(|e| self.failure(e.to_string()))
    }
}
