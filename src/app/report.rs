//! Console report of per-domain comparisons.

use std::io::{IsTerminal, Write};

use colored::*;

use crate::compare::{Comparison, Finding};
use crate::error_handling::Severity;

/// Writes each domain's comparison as a header followed by its report lines.
pub struct ReportSink<W: Write> {
    out: W,
    color: bool,
}

impl ReportSink<std::io::Stdout> {
    /// A sink on stdout, colored only when stdout is a terminal.
    pub fn stdout() -> Self {
        Self::for_terminal(std::io::stdout())
    }
}

impl<W: Write + IsTerminal> ReportSink<W> {
    /// Creates a sink on `out` that colors its lines only if `out` is a terminal.
    pub fn for_terminal(out: W) -> Self {
        let color = out.is_terminal();
        Self::new(out, color)
    }
}

impl<W: Write> ReportSink<W> {
    /// Creates a sink writing to `out`.
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Writes one domain's block. Write failures are logged, not returned.
    pub fn print(&mut self, comparison: &Comparison) {
        if let Err(e) = self.write_block(comparison) {
            log::warn!("Failed to write report for {}: {e}", comparison.domain);
        }
    }

    fn write_block(&mut self, comparison: &Comparison) -> std::io::Result<()> {
        writeln!(self.out, "----- {} -----", comparison.domain)?;
        if comparison.findings.is_empty() {
            let ok = if self.color {
                "OK".green().to_string()
            } else {
                "OK".to_string()
            };
            writeln!(self.out, "{ok}")?;
        }
        for finding in &comparison.findings {
            let line = self.paint(finding);
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn paint(&self, finding: &Finding) -> String {
        let line = finding.render();
        if !self.color {
            return line;
        }
        match finding.severity() {
            Severity::Critical => line.red().bold().to_string(),
            Severity::Error => line.red().to_string(),
            Severity::Warning => line.yellow().to_string(),
        }
    }

    /// Whether lines are written with ANSI colors.
    pub fn is_colored(&self) -> bool {
        self.color
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}
