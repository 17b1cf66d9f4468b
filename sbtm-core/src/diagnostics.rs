//! Scan diagnostics
//!
//! Validators never write anywhere: they return [`Diagnostic`] values next to
//! the data they extracted ([`Checked`]). The scanner hands those to a
//! [`DiagnosticSink`], which renders them to the console or to the log file
//! named in the configuration and remembers whether any error was seen.

use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Final line printed when at least one error was reported.
pub const ERRORS_FOUND_MESSAGE: &str =
    "\nErrors Found!  Please correct the session sheet(s) listed above and re-run the scan utility.";

/// Final line printed when the run was clean. Warnings alone still count as clean.
pub const ALL_CLEAR_MESSAGE: &str = "Your papers are in order!";

/// Notice for sheet content present while its feature is switched off.
pub(crate) fn skipped_notice(subject: &str) -> String {
    format!(
        "{} found but skipped in SCAN based on {} config.",
        subject,
        crate::config::CONFIG_FILE_NAME
    )
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Marks the run as failed
    Error,
    /// Informational; only shown when the `Warnings` switch is on
    Warning,
}

/// A message about one session sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Accumulates diagnostics while a validator walks its lines.
#[derive(Debug, Default)]
pub struct Findings {
    diagnostics: Vec<Diagnostic>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(message));
    }

    /// Attach the findings to the value they were produced with.
    pub fn with<T>(self, value: T) -> Checked<T> {
        Checked {
            value,
            diagnostics: self.diagnostics,
        }
    }
}

/// A validator's output: extracted data plus the diagnostics raised on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Checked<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Checked<T> {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }
}

/// A diagnostic that has been reported against a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedDiagnostic {
    /// File the diagnostic belongs to; empty for run-level consistency errors
    pub file: String,
    pub diagnostic: Diagnostic,
}

/// Routes diagnostics to their destination and tracks the run's error state.
pub struct DiagnosticSink {
    writer: Box<dyn Write>,
    warnings_enabled: bool,
    errors_found: bool,
    reported: Vec<ReportedDiagnostic>,
}

impl DiagnosticSink {
    /// Create a sink writing to an arbitrary destination.
    pub fn new(writer: Box<dyn Write>, warnings_enabled: bool) -> Self {
        Self {
            writer,
            warnings_enabled,
            errors_found: false,
            reported: Vec::new(),
        }
    }

    /// Sink that prints to stdout.
    pub fn console(warnings_enabled: bool) -> Self {
        Self::new(Box::new(std::io::stdout()), warnings_enabled)
    }

    /// Sink that writes to a (truncated) log file.
    pub fn to_file(path: &Path, warnings_enabled: bool) -> Result<Self> {
        let file = File::create(path).map_err(|e| crate::Error::open(path, e))?;
        Ok(Self::new(Box::new(BufWriter::new(file)), warnings_enabled))
    }

    /// Sink that discards its output but still records what was reported.
    pub fn discard(warnings_enabled: bool) -> Self {
        Self::new(Box::new(std::io::sink()), warnings_enabled)
    }

    /// Report one diagnostic against `file`.
    pub fn report(&mut self, file: &str, diagnostic: Diagnostic) -> Result<()> {
        match diagnostic.severity {
            Severity::Error => {
                self.errors_found = true;
                tracing::debug!(file, message = %diagnostic.message, "Sheet error");
                self.emit(&format!("### Error : {} : {}", file, diagnostic.message))?;
                self.emit("")?;
            }
            Severity::Warning => {
                tracing::debug!(file, message = %diagnostic.message, "Sheet warning");
                if !self.warnings_enabled {
                    return Ok(());
                }
                self.emit(&format!("** WARNING : {} : {}", file, diagnostic.message))?;
                self.emit("")?;
            }
        }

        self.reported.push(ReportedDiagnostic {
            file: file.to_string(),
            diagnostic,
        });
        Ok(())
    }

    /// Report every diagnostic of a validator against `file`.
    pub fn report_all(&mut self, file: &str, diagnostics: Vec<Diagnostic>) -> Result<()> {
        for diagnostic in diagnostics {
            self.report(file, diagnostic)?;
        }
        Ok(())
    }

    /// Report an error that spans several sheets (session overlap checks).
    pub fn report_consistency_error(&mut self, message: &str) -> Result<()> {
        self.errors_found = true;
        tracing::debug!(message, "Session timeline error");
        self.emit(&format!("\n*** Error : {}", message))?;
        self.reported.push(ReportedDiagnostic {
            file: String::new(),
            diagnostic: Diagnostic::error(message),
        });
        Ok(())
    }

    /// Print a plain line.
    pub fn notice(&mut self, message: &str) -> Result<()> {
        self.emit(message)
    }

    /// Print the closing summary line and return whether errors were found.
    pub fn finish(&mut self) -> Result<bool> {
        let message = if self.errors_found {
            ERRORS_FOUND_MESSAGE
        } else {
            ALL_CLEAR_MESSAGE
        };
        self.emit(message)?;
        Ok(self.errors_found)
    }

    pub fn errors_found(&self) -> bool {
        self.errors_found
    }

    /// Everything reported so far, in order. Suppressed warnings are not included.
    pub fn reported(&self) -> &[ReportedDiagnostic] {
        &self.reported
    }

    fn emit(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Writer that shares its buffer with the test.
    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    #[test]
    fn test_error_sets_flag_and_renders() {
        let buffer = SharedBuffer::default();
        let mut sink = DiagnosticSink::new(Box::new(buffer.clone()), true);

        sink.report("s/et-pc-240115-a.ses", Diagnostic::error("Missing a START section"))
            .unwrap();

        assert!(sink.errors_found());
        assert_eq!(
            buffer.text(),
            "### Error : s/et-pc-240115-a.ses : Missing a START section\n\n"
        );
    }

    #[test]
    fn test_warnings_are_gated() {
        let buffer = SharedBuffer::default();
        let mut sink = DiagnosticSink::new(Box::new(buffer.clone()), false);

        sink.report("a.ses", Diagnostic::warning("tab found")).unwrap();

        assert!(!sink.errors_found());
        assert!(buffer.text().is_empty());
        assert!(sink.reported().is_empty());
    }

    #[test]
    fn test_warning_alone_is_all_clear() {
        let buffer = SharedBuffer::default();
        let mut sink = DiagnosticSink::new(Box::new(buffer.clone()), true);

        sink.report("a.ses", Diagnostic::warning("tab found")).unwrap();
        let failed = sink.finish().unwrap();

        assert!(!failed);
        let text = buffer.text();
        assert!(text.contains("** WARNING : a.ses : tab found"));
        assert!(text.ends_with("Your papers are in order!\n"));
    }

    #[test]
    fn test_consistency_error_summary() {
        let buffer = SharedBuffer::default();
        let mut sink = DiagnosticSink::new(Box::new(buffer.clone()), true);

        sink.report_consistency_error("START timestamps for two sessions are identical")
            .unwrap();
        assert!(sink.finish().unwrap());

        let text = buffer.text();
        assert!(text.starts_with("\n*** Error : START timestamps"));
        assert!(text.contains("Errors Found!"));
    }

    #[test]
    fn test_findings_into_checked() {
        let mut findings = Findings::new();
        findings.warning("w");
        findings.error("e");
        let checked = findings.with(42);

        assert_eq!(checked.value, 42);
        assert!(checked.has_errors());
        assert_eq!(checked.messages(), vec!["w", "e"]);
    }
}
