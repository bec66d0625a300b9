use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter, Write};

use dsr::RunReport;
use dsr::compare::MetricComparison;
use dsr::evaluation::Rate;

/// Plain-text table: the first column is left aligned, the others right aligned.
struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.header.iter().map(|cell| cell.chars().count()).collect();
        for row in &self.rows {
            for (column, cell) in row.iter().enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(column) {
                    Some(current) => *current = (*current).max(width),
                    None => widths.push(width),
                }
            }
        }
        widths
    }
}

fn write_row(f: &mut Formatter<'_>, row: &[String], widths: &[usize]) -> fmt::Result {
    for (column, cell) in row.iter().enumerate() {
        let width = widths[column];
        if column == 0 {
            write!(f, "{cell:<width$}")?;
        } else {
            write!(f, "  {cell:>width$}")?;
        }
    }
    writeln!(f)
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        write_row(f, &self.header, &widths)?;
        let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        writeln!(f, "{}", "-".repeat(rule_width))?;
        for row in &self.rows {
            write_row(f, row, &widths)?;
        }
        Ok(())
    }
}

fn rate(rate: Rate) -> String {
    format!("{rate:.3}")
}

/// Renders the prediction matrix of a run followed by its global statistics.
pub fn render_report(report: &RunReport<String>) -> String {
    let mut header = vec!["class".to_string()];
    header.extend(report.training_classes.iter().cloned());
    header.extend(["objects", "accuracy", "coverage", "TPR"].map(String::from));

    let mut table = Table::new(header);
    for row in &report.rows {
        let mut cells = vec![row.class.clone()];
        cells.extend(row.counts.iter().map(usize::to_string));
        cells.push(row.stats.class_length.to_string());
        cells.push(rate(row.stats.accuracy));
        cells.push(rate(row.stats.coverage));
        cells.push(rate(row.stats.true_positive_rate));
        table.push(cells);
    }

    let mut out = String::new();
    let _ = writeln!(out, "metric: {}, k = {}", report.metric, report.k);
    let _ = writeln!(out);
    let _ = write!(out, "{table}");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "global accuracy: {}  coverage: {}  ({} of {} objects classified)",
        rate(report.global.accuracy),
        rate(report.global.coverage),
        report.global.grabbed,
        report.global.objects
    );
    out
}

/// Renders the class-by-metric comparison with its total row.
pub fn render_comparison(comparison: &MetricComparison<String>) -> String {
    let mut header = vec!["class".to_string()];
    header.extend(comparison.metrics.iter().map(ToString::to_string));

    let mut table = Table::new(header);
    for (class, cells) in comparison.classes.iter().zip(&comparison.rows) {
        let mut row = vec![class.clone()];
        row.extend(cells.iter().map(|cell| format!("{cell:.3}")));
        table.push(row);
    }
    let mut total = vec!["total".to_string()];
    total.extend(comparison.total.iter().map(|cell| format!("{cell:.3}")));
    table.push(total);

    let mut out = String::new();
    let _ = writeln!(out, "{} per class, k = {}", comparison.statistic, comparison.k);
    let _ = writeln!(out);
    let _ = write!(out, "{table}");
    for failure in &comparison.failures {
        let _ = writeln!(out, "{} failed: {}", failure.metric, failure.reason);
    }
    out
}

/// Renders the population of every training class and the largest usable k.
pub fn render_class_counts(counts: &BTreeMap<&String, usize>, max_k: usize) -> String {
    let mut table = Table::new(vec!["class".to_string(), "objects".to_string()]);
    for (class, count) in counts {
        table.push(vec![class.to_string(), count.to_string()]);
    }
    format!("{table}\nlargest usable k: {max_k}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsr::Metric;
    use dsr::compare::{Cell, MetricFailure, Statistic};
    use dsr::evaluation::{ClassRow, ClassStats, GlobalStats};

    fn report() -> RunReport<String> {
        RunReport {
            metric: Metric::Euclidean,
            k: 2,
            training_classes: vec!["A".to_string(), "B".to_string()],
            rows: vec![ClassRow {
                class: "A".to_string(),
                counts: vec![3, 1],
                stats: ClassStats {
                    class_length: 5,
                    grabbed: 4,
                    correct: 3,
                    wrong: 0,
                    accuracy: Rate::Value(0.75),
                    coverage: Rate::Value(0.8),
                    true_positive_rate: Rate::Value(1.0),
                },
            }],
            global: GlobalStats {
                objects: 5,
                grabbed: 4,
                correct: 3,
                accuracy: Rate::Value(0.75),
                coverage: Rate::Value(0.8),
            },
        }
    }

    #[test]
    fn report_table_layout() {
        let text = render_report(&report());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "metric: Euclidean, k = 2");
        assert_eq!(lines[2], "class  A  B  objects  accuracy  coverage    TPR");
        assert_eq!(lines[4], "A      3  1        5     0.750     0.800  1.000");
        assert!(text.contains("global accuracy: 0.750  coverage: 0.800  (4 of 5 objects classified)"));
    }

    #[test]
    fn unavailable_rates_render_as_na() {
        let mut report = report();
        report.rows[0].stats.accuracy = Rate::Unavailable;
        let text = render_report(&report);
        assert!(text.lines().nth(4).unwrap().contains("n/a"));
    }

    fn comparison() -> MetricComparison<String> {
        MetricComparison {
            statistic: Statistic::Accuracy,
            k: 1,
            metrics: vec![Metric::Euclidean, Metric::Pearson],
            classes: vec!["A".to_string(), "B".to_string()],
            rows: vec![
                vec![Cell::Rate(Rate::Value(1.0)), Cell::Failed],
                vec![Cell::Rate(Rate::Unavailable), Cell::Failed],
            ],
            total: vec![Cell::Rate(Rate::Value(0.5)), Cell::Failed],
            failures: vec![MetricFailure {
                metric: Metric::Pearson,
                reason: "left vector has zero standard deviation".to_string(),
            }],
        }
    }

    #[test]
    fn comparison_table_layout() {
        let text = render_comparison(&comparison());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "accuracy per class, k = 1",
                "",
                "class  Euclidean  Pearson",
                "-------------------------",
                "A          1.000   failed",
                "B            n/a   failed",
                "total      0.500   failed",
                "Pearson failed: left vector has zero standard deviation",
            ]
        );
    }

    #[test]
    fn comparison_json_shape() {
        let json = serde_json::to_value(comparison()).unwrap();

        assert_eq!(json["statistic"], "accuracy");
        assert_eq!(json["metrics"], serde_json::json!(["euclidean", "pearson"]));
        assert_eq!(json["rows"][0][0], serde_json::json!({ "rate": 1.0 }));
        assert_eq!(json["rows"][1][0], serde_json::json!({ "rate": null }));
        assert_eq!(json["rows"][0][1], "failed");
        assert_eq!(json["total"], serde_json::json!([{ "rate": 0.5 }, "failed"]));
        assert_eq!(json["failures"][0]["metric"], "pearson");
    }

    #[test]
    fn report_json_marks_unavailable_rates_null() {
        let mut report = report();
        report.rows[0].stats.true_positive_rate = Rate::Unavailable;
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["metric"], "euclidean");
        assert_eq!(json["rows"][0]["stats"]["true_positive_rate"], serde_json::Value::Null);
        assert_eq!(json["rows"][0]["stats"]["accuracy"], 0.75);
        assert_eq!(json["global"]["coverage"], 0.8);
    }

    #[test]
    fn class_counts_table() {
        let a = "A".to_string();
        let b = "B".to_string();
        let counts = BTreeMap::from([(&a, 3), (&b, 5)]);
        let text = render_class_counts(&counts, 3);
        assert!(text.contains("A            3"));
        assert!(text.ends_with("largest usable k: 3\n"));
    }
}
