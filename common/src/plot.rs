use core::fmt::Debug;

use eyre::Result;
use tracing::debug;

use crate::record::BenchmarkRecord;

pub const CHART_TITLE: &str = "JMH Results";

pub trait Plot: Debug {
    fn name(&self) -> &'static str;
    /// Renders the chart
    ///
    /// Arguments:
    /// * `chart` - The scored bars, in the order they are drawn, plus the axis metadata
    fn plot(&self, chart: &BarChartData) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub score: f64,
    pub error: f64,
}

impl Bar {
    /// Bar height, non-finite scores are drawn flat
    pub fn height(&self) -> f64 {
        if self.score.is_finite() {
            self.score
        } else {
            0.0
        }
    }

    /// Whisker half-length, `None` when there is nothing to draw
    pub fn whisker(&self) -> Option<f64> {
        if self.error.is_finite() && self.error != 0.0 {
            Some(self.error.abs())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartData {
    pub bars: Vec<Bar>,
    pub unit: String,
    pub mode: String,
}

impl BarChartData {
    /// Drops unscored records and takes unit and mode from the first remaining one.
    ///
    /// Returns `None` when no record carries a score.
    pub fn from_records(records: Vec<BenchmarkRecord>) -> Option<Self> {
        let total = records.len();
        let mut scored = records
            .into_iter()
            .filter_map(|record| record.score.map(|score| (record, score)))
            .peekable();

        let (unit, mode) = {
            let (first, _) = scored.peek()?;
            (first.unit.clone(), first.mode.clone())
        };

        let bars = scored
            .map(|(record, score)| Bar {
                label: record.label,
                score,
                error: record.score_error,
            })
            .collect::<Vec<_>>();
        debug!("Kept {} of {total} records", bars.len());

        Some(BarChartData { bars, unit, mode })
    }

    pub fn title(&self) -> String {
        if self.mode.is_empty() {
            CHART_TITLE.to_owned()
        } else {
            format!("{CHART_TITLE} [{}]", self.mode)
        }
    }

    pub fn y_label(&self) -> String {
        format!("Score ({})", self.unit)
    }

    /// Lowest and highest value any bar or whisker reaches, always spanning 0
    pub fn value_range(&self) -> (f64, f64) {
        let (low, high) = self.bars.iter().fold((0.0_f64, 0.0_f64), |(low, high), bar| {
            let whisker = bar.whisker().unwrap_or(0.0);
            (
                low.min(bar.height() - whisker),
                high.max(bar.height() + whisker),
            )
        });
        if low == high { (0.0, 1.0) } else { (low, high) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str, score: Option<f64>, error: f64, unit: &str, mode: &str) -> BenchmarkRecord {
        BenchmarkRecord {
            label: label.to_owned(),
            score,
            score_error: error,
            unit: unit.to_owned(),
            mode: mode.to_owned(),
        }
    }

    #[test]
    fn unscored_records_are_dropped() {
        let chart = BarChartData::from_records(vec![
            record("a", Some(1.0), 0.1, "ops/s", "thrpt"),
            record("b", None, 0.0, "ops/s", "thrpt"),
            record("c", Some(3.0), 0.0, "ops/s", "thrpt"),
        ])
        .unwrap();

        let labels: Vec<_> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["a", "c"]);
        assert_eq!(chart.bars[0].error, 0.1);
    }

    #[test]
    fn no_scores_means_no_chart() {
        assert_eq!(BarChartData::from_records(vec![]), None);
        assert_eq!(
            BarChartData::from_records(vec![record("B", None, 0.0, "", "")]),
            None
        );
    }

    #[test]
    fn first_scored_record_sets_unit_and_mode() {
        let chart = BarChartData::from_records(vec![
            record("skipped", None, 0.0, "us/op", "avgt"),
            record("a", Some(1.0), 0.0, "ops/s", "thrpt"),
            record("b", Some(2.0), 0.0, "ns/op", "avgt"),
        ])
        .unwrap();

        assert_eq!(chart.unit, "ops/s");
        assert_eq!(chart.mode, "thrpt");
        assert_eq!(chart.y_label(), "Score (ops/s)");
        assert_eq!(chart.title(), "JMH Results [thrpt]");
    }

    #[test]
    fn title_without_mode() {
        let chart = BarChartData::from_records(vec![record("a", Some(1.0), 0.0, "", "")]).unwrap();
        assert_eq!(chart.title(), "JMH Results");
        assert_eq!(chart.y_label(), "Score ()");
    }

    #[test]
    fn combined_files_keep_every_bar_in_order() {
        let first = vec![
            record("f1-a", Some(1.0), 0.0, "ops/s", "thrpt"),
            record("f1-b", None, 0.0, "ops/s", "thrpt"),
            record("f1-c", Some(2.0), 0.0, "ops/s", "thrpt"),
        ];
        let second = vec![
            record("f2-a", Some(4.0), 0.5, "ops/s", "thrpt"),
            record("f2-b", Some(5.0), 0.0, "ops/s", "thrpt"),
        ];

        let chart =
            BarChartData::from_records(first.into_iter().chain(second).collect()).unwrap();
        let labels: Vec<_> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["f1-a", "f1-c", "f2-a", "f2-b"]);
    }

    #[test]
    fn whisker_skips_zero_and_nan() {
        let bar = |error| Bar {
            label: "x".to_owned(),
            score: 1.0,
            error,
        };
        assert_eq!(bar(0.0).whisker(), None);
        assert_eq!(bar(f64::NAN).whisker(), None);
        assert_eq!(bar(0.25).whisker(), Some(0.25));
    }

    #[test]
    fn value_range_covers_whiskers_and_zero() {
        let chart = BarChartData::from_records(vec![
            record("a", Some(10.0), 2.0, "", ""),
            record("b", Some(-3.0), 1.0, "", ""),
            record("c", Some(f64::INFINITY), 0.0, "", ""),
        ])
        .unwrap();
        assert_eq!(chart.value_range(), (-4.0, 12.0));

        let flat = BarChartData::from_records(vec![record("z", Some(0.0), 0.0, "", "")]).unwrap();
        assert_eq!(flat.value_range(), (0.0, 1.0));
    }
}
