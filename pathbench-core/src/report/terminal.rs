use std::io::{self, Write};

use colored::Colorize;

use super::{ComparisonReport, ReportError, Reporter};
use crate::series::{Metric, Side};
use crate::stats::{ComparisonResult, StatComparison};

const LABEL_WIDTH: usize = 12;
const CELL_WIDTH: usize = 26;

/// A reporter that outputs a side-by-side comparison to the terminal.
#[derive(Debug, Clone)]
pub struct TerminalReporter {
    /// Whether to use colors in output (defaults to true).
    use_colors: bool,
}

impl TerminalReporter {
    /// Create a new terminal reporter with default settings.
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    /// Create a terminal reporter with color output disabled.
    pub fn without_colors() -> Self {
        Self { use_colors: false }
    }

    /// Format a millisecond value.
    fn format_ms(ms: f64) -> String {
        if ms >= 1_000.0 {
            format!("{:.3} s", ms / 1_000.0)
        } else if ms >= 1.0 {
            format!("{:.2} ms", ms)
        } else {
            format!("{:.1} us", ms * 1_000.0)
        }
    }

    /// The improvement badge shown next to a winning value.
    fn format_badge(percent_diff: Option<f64>) -> String {
        match percent_diff {
            Some(p) => format!("(+{:.1}%)", p.abs()),
            None => String::new(),
        }
    }

    /// A single value cell, padded to the column width before coloring.
    fn format_cell(&self, comparison: &StatComparison, side: Side) -> String {
        let view = comparison.view(side);
        let text = if comparison.winner == Some(side) {
            format!(
                "{} {}",
                Self::format_badge(comparison.percent_diff),
                Self::format_ms(view.mine)
            )
        } else {
            Self::format_ms(view.mine)
        };
        let padded = format!("{:>width$}", text, width = CELL_WIDTH);

        if self.use_colors && comparison.winner == Some(side) {
            padded.green().to_string()
        } else {
            padded
        }
    }

    fn print_title(&self, writer: &mut impl Write, report: &ComparisonReport) -> io::Result<()> {
        writeln!(writer)?;
        let title = format!("{} vs {}", report.label_a, report.label_b);
        if self.use_colors {
            writeln!(writer, "{}", title.bold())?;
        } else {
            writeln!(writer, "{}", title)?;
        }
        writeln!(
            writer,
            "{} rounds, {} discarded as warm-up, {} compared",
            report.rounds,
            report.discarded_rounds,
            report.series.len()
        )?;
        Ok(())
    }

    /// Print the table for one metric.
    fn print_metric(
        &self,
        writer: &mut impl Write,
        report: &ComparisonReport,
        result: &ComparisonResult,
    ) -> io::Result<()> {
        writeln!(writer)?;
        let header = format!(
            "{:<lw$} {:>cw$} {:>cw$}",
            result.metric.label(),
            report.label_a,
            report.label_b,
            lw = LABEL_WIDTH,
            cw = CELL_WIDTH
        );
        if self.use_colors {
            writeln!(writer, "{}", header.bold())?;
        } else {
            writeln!(writer, "{}", header)?;
        }
        writeln!(writer, "{}", "-".repeat(LABEL_WIDTH + 2 * (CELL_WIDTH + 1)))?;

        for comparison in &result.statistics {
            writeln!(
                writer,
                "{:<lw$} {} {}",
                comparison.statistic.label(),
                self.format_cell(comparison, Side::A),
                self.format_cell(comparison, Side::B),
                lw = LABEL_WIDTH
            )?;
        }
        Ok(())
    }

    /// Print the round-trip time of every compared round.
    fn print_rounds(&self, writer: &mut impl Write, report: &ComparisonReport) -> io::Result<()> {
        writeln!(writer)?;
        writeln!(
            writer,
            "{:<lw$} {:>cw$} {:>cw$}",
            "Round",
            report.label_a,
            report.label_b,
            lw = LABEL_WIDTH,
            cw = CELL_WIDTH
        )?;
        for round in &report.series {
            writeln!(
                writer,
                "{:<lw$} {:>cw$} {:>cw$}",
                round.round_index + 1,
                Self::format_ms(round.sample_a.round_trip_ms),
                Self::format_ms(round.sample_b.round_trip_ms),
                lw = LABEL_WIDTH,
                cw = CELL_WIDTH
            )?;
        }
        Ok(())
    }

    /// Print the summary footer.
    fn print_summary(&self, writer: &mut impl Write, report: &ComparisonReport) -> io::Result<()> {
        writeln!(writer)?;
        let summary_label = "Summary:";
        if self.use_colors {
            writeln!(writer, "{}", summary_label.bold())?;
        } else {
            writeln!(writer, "{}", summary_label)?;
        }

        for result in &report.results {
            let line = match (result.winner, result.percent_diff) {
                (Some(side), Some(p)) => format!(
                    "  {}: {} is faster by {:.1}% on average",
                    result.metric.label(),
                    report.label(side),
                    p
                ),
                (Some(side), None) => format!(
                    "  {}: {} is faster on average",
                    result.metric.label(),
                    report.label(side)
                ),
                (None, _) => format!("  {}: no difference on average", result.metric.label()),
            };
            if !self.use_colors {
                writeln!(writer, "{}", line)?;
            } else if result.winner.is_some() {
                writeln!(writer, "{}", line.green())?;
            } else {
                writeln!(writer, "{}", line.yellow())?;
            }
        }

        writeln!(writer)?;
        Ok(())
    }

    fn write_report(&self, writer: &mut impl Write, report: &ComparisonReport) -> io::Result<()> {
        self.print_title(writer, report)?;
        for metric in Metric::ALL {
            if let Some(result) = report.result(metric) {
                self.print_metric(writer, report, result)?;
            }
        }
        self.print_rounds(writer, report)?;
        self.print_summary(writer, report)
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &ComparisonReport) -> Result<(), ReportError> {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        self.write_report(&mut writer, report)?;
        Ok(())
    }
}
