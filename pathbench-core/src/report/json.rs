use std::io::{self, Write};

use super::{ComparisonReport, ReportError, Reporter};

/// A reporter that prints the full report as JSON on stdout.
#[derive(Debug, Clone)]
pub struct JsonReporter {
    pretty: bool,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Single-line output, for piping into other tools.
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    fn write_report(
        &self,
        writer: &mut impl Write,
        report: &ComparisonReport,
    ) -> Result<(), ReportError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, report)?;
        } else {
            serde_json::to_writer(&mut *writer, report)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn report(&self, report: &ComparisonReport) -> Result<(), ReportError> {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        self.write_report(&mut writer, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{LatencySeries, Measurement, Metric, Side};
    use crate::stats::{ComparisonResult, Statistics};

    fn sample_report() -> ComparisonReport {
        let mut series = LatencySeries::new();
        series.push_round(Measurement::new(50.0, 1.0), Measurement::new(5.0, 0.5));
        let stats_a = Statistics::from_samples(&[50.0]).unwrap();
        let stats_b = Statistics::from_samples(&[5.0]).unwrap();

        ComparisonReport {
            label_a: "private".to_string(),
            label_b: "public".to_string(),
            rounds: 2,
            discarded_rounds: 1,
            series,
            results: vec![ComparisonResult::new(Metric::RoundTrip, stats_a, stats_b)],
        }
    }

    #[test]
    fn test_json_report_parses_back() {
        let mut buffer = Vec::new();
        JsonReporter::compact()
            .write_report(&mut buffer, &sample_report())
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output.lines().count(), 1);

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["label_a"], "private");
        assert_eq!(value["results"][0]["metric"], "round_trip");
        assert_eq!(value["results"][0]["winner"], "B");
        assert_eq!(value["results"][0]["percent_diff"], 90.0);
    }

    #[test]
    fn test_json_report_keeps_series() {
        let mut buffer = Vec::new();
        JsonReporter::new()
            .write_report(&mut buffer, &sample_report())
            .unwrap();

        let parsed: ComparisonReport = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed.series.len(), 1);
        assert_eq!(parsed.series.rounds()[0].sample(Side::B).round_trip_ms, 5.0);
    }
}
