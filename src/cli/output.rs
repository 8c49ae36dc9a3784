//! Terminal rendering of analysis reports

use colorful::Colorful;

use crate::core::hypothesis::HypothesisOutcome;
use crate::core::rates::{RateMode, RateSummary};
use crate::core::species::{FlowPreferenceTable, SpeciesSummary};
use crate::report::{AnalysisReport, DatasetOverview, HypothesisReport, PivotSummary};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

fn mode_title(mode: RateMode) -> &'static str {
    match mode {
        RateMode::AllPeriods => "Camera activity",
        RateMode::ActiveOnly => "Detection success",
    }
}

/// Render the whole report for the terminal
pub fn format_report(report: &AnalysisReport, verbose: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}Tide gate wildlife analysis{} {}run {}{}\n\n",
        BOLD, RESET, DIM, report.run_id, RESET
    ));
    output.push_str(&format_overview(&report.overview));

    for summary in &report.rates {
        output.push_str(&format_rate_summary(summary, verbose));
    }
    for pivot in &report.pivots {
        output.push_str(&format_pivot(pivot));
    }
    for hypothesis in &report.hypotheses {
        output.push_str(&format_hypothesis(hypothesis));
    }
    output.push_str(&format_species(&report.species, verbose));
    output.push_str(&format_flow_preferences(&report.flow_preferences));

    output
}

fn format_overview(overview: &DatasetOverview) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}Dataset overview{}\n", BOLD, RESET));
    output.push_str(&format!("  Monitoring periods:      {}\n", overview.total_periods));
    output.push_str(&format!(
        "  Camera active periods:   {}\n",
        overview.camera_active_periods
    ));
    output.push_str(&format!(
        "  Animal detection events: {}\n",
        overview.animal_detection_events
    ));
    output.push_str(&format!(
        "  Camera activity rate:    {:.2}% of all periods\n",
        overview.camera_activity_rate_pct
    ));
    output.push_str(&format!(
        "  Detection rate:          {:.2}% of all periods\n",
        overview.detection_rate_all_periods_pct
    ));
    output.push_str(&format!(
        "  Detection success:       {:.2}% of camera periods\n",
        overview.detection_success_rate_pct
    ));
    output.push_str(&format!(
        "  Tide extremes:           {} high, {} low\n",
        overview.high_tide_count, overview.low_tide_count
    ));
    if overview.rows_dropped_camera > 0 || overview.rows_dropped_sensor > 0 {
        output.push_str(&format!(
            "  {}Dropped rows: {} camera, {} sensor{}\n",
            DIM, overview.rows_dropped_camera, overview.rows_dropped_sensor, RESET
        ));
    }
    output.push('\n');

    output
}

fn format_rate_summary(summary: &RateSummary, verbose: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}{} by {}{}\n",
        BOLD,
        mode_title(summary.mode),
        summary.dimensions.join(" x "),
        RESET
    ));

    if summary.rows.is_empty() {
        output.push_str(&format!("  {}(no data){}\n\n", DIM, RESET));
        return output;
    }

    for row in &summary.rows {
        let key = row.key.join(" / ");
        if verbose {
            output.push_str(&format!(
                "  {:<28} {:>7.2}%  {}({}/{}){}\n",
                key,
                row.rate_pct(),
                DIM,
                row.positives,
                row.total,
                RESET
            ));
        } else {
            output.push_str(&format!("  {:<28} {:>7.2}%\n", key, row.rate_pct()));
        }
    }
    output.push('\n');

    output
}

fn format_pivot(summary: &PivotSummary) -> String {
    let table = &summary.table;
    let mut output = String::new();

    output.push_str(&format!(
        "{}{}: {} x {}{}\n",
        BOLD,
        mode_title(table.mode),
        table.row_name,
        table.col_name,
        RESET
    ));

    output.push_str(&format!("  {:<18}", ""));
    for label in &table.col_labels {
        output.push_str(&format!(" {:>12}", label));
    }
    output.push('\n');

    for (r, row_label) in table.row_labels.iter().enumerate() {
        output.push_str(&format!("  {:<18}", row_label));
        for cell in &table.cells[r] {
            match cell {
                Some(cell) => output.push_str(&format!(" {:>11.2}%", cell.rate * 100.0)),
                None => output.push_str(&format!(" {:>12}", "-")),
            }
        }
        output.push('\n');
    }

    match &summary.peak {
        Some(peak) => {
            let line = format!(
                "Peak {:.2}% when {} is '{}' and {} is '{}' ({}/{})",
                peak.rate * 100.0,
                table.row_name,
                peak.row_label,
                table.col_name,
                peak.col_label,
                peak.positives,
                peak.total
            );
            output.push_str(&format!("  {}\n", line.green()));
        }
        None => {
            output.push_str(&format!(
                "  {}No activity recorded under these conditions{}\n",
                DIM, RESET
            ));
        }
    }
    output.push('\n');

    output
}

fn format_hypothesis(hypothesis: &HypothesisReport) -> String {
    let heading = format!(
        "{}Chi-square, detection vs {}{}",
        BOLD, hypothesis.dimension, RESET
    );
    match &hypothesis.outcome {
        HypothesisOutcome::Tested(test) => {
            let verdict = if test.significant {
                format!("significant (p = {:.4})", test.p_value).green()
            } else {
                format!("not significant (p = {:.4})", test.p_value).yellow()
            };
            format!(
                "{}: statistic {:.3}, dof {}, {}\n\n",
                heading, test.statistic, test.dof, verdict
            )
        }
        HypothesisOutcome::InsufficientData { positives, required } => {
            let note = format!(
                "skipped, insufficient data ({} detections, {} required)",
                positives, required
            );
            format!("{}: {}\n\n", heading, note.yellow())
        }
    }
}

fn format_species(species: &[SpeciesSummary], verbose: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}Species by individuals{}\n", BOLD, RESET));
    if species.is_empty() {
        output.push_str(&format!("  {}(no detections){}\n\n", DIM, RESET));
        return output;
    }

    let limit = if verbose { species.len() } else { species.len().min(15) };
    for summary in &species[..limit] {
        output.push_str(&format!(
            "  {:<34} {:>6} individuals {:>5} events {:>6.2}%\n",
            summary.species, summary.total_count, summary.detection_events, summary.detection_rate_pct
        ));
    }
    if species.len() > limit {
        output.push_str(&format!(
            "  {}... {} more species{}\n",
            DIM,
            species.len() - limit,
            RESET
        ));
    }
    output.push('\n');

    output
}

fn format_flow_preferences(preferences: &FlowPreferenceTable) -> String {
    if preferences.rows.is_empty() {
        return String::new();
    }
    let mut output = String::new();

    output.push_str(&format!(
        "{}Species tidal flow preferences{} {}(% of detections){}\n",
        BOLD, RESET, DIM, RESET
    ));
    output.push_str(&format!("  {:<34}", ""));
    for label in &preferences.flow_labels {
        output.push_str(&format!(" {:>11}", label));
    }
    output.push('\n');

    for row in &preferences.rows {
        output.push_str(&format!("  {:<34}", row.species));
        for pct in &row.percentages {
            output.push_str(&format!(" {:>10.1}%", pct));
        }
        output.push('\n');
    }
    output.push('\n');

    output
}

/// Render the report as pretty-printed JSON
pub fn format_json(report: &AnalysisReport) -> anyhow::Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hypothesis::ChiSquareTest;
    use crate::core::rates::RateRow;

    fn report_fixture() -> AnalysisReport {
        let mut report = AnalysisReport::new(DatasetOverview {
            total_periods: 100,
            camera_active_periods: 40,
            animal_detection_events: 10,
            camera_activity_rate_pct: 40.0,
            detection_rate_all_periods_pct: 10.0,
            detection_success_rate_pct: 25.0,
            ..Default::default()
        });
        report.rates.push(RateSummary {
            mode: RateMode::ActiveOnly,
            dimensions: vec!["tidal_flow".to_string()],
            rows: vec![RateRow {
                key: vec!["Rising".to_string()],
                total: 20,
                positives: 5,
                rate: 0.25,
            }],
        });
        report.hypotheses.push(HypothesisReport {
            dimension: "tidal_flow".to_string(),
            outcome: HypothesisOutcome::Tested(ChiSquareTest {
                statistic: 8.21,
                dof: 3,
                p_value: 0.0419,
                significant: true,
            }),
        });
        report
    }

    #[test]
    fn test_format_report_mentions_key_numbers() {
        let output = format_report(&report_fixture(), false);

        assert!(output.contains("Dataset overview"));
        assert!(output.contains("Monitoring periods:      100"));
        assert!(output.contains("Detection success by tidal_flow"));
        assert!(output.contains("Rising"));
        assert!(output.contains("25.00%"));
        assert!(output.contains("significant (p = 0.0419)"));
    }

    #[test]
    fn test_verbose_adds_counts() {
        let output = format_report(&report_fixture(), true);
        assert!(output.contains("(5/20)"));
    }

    #[test]
    fn test_insufficient_data_is_reported_not_hidden() {
        let mut report = report_fixture();
        report.hypotheses.clear();
        report.hypotheses.push(HypothesisReport {
            dimension: "combined_gate".to_string(),
            outcome: HypothesisOutcome::InsufficientData {
                positives: 5,
                required: 20,
            },
        });

        let output = format_report(&report, false);
        assert!(output.contains("skipped, insufficient data (5 detections, 20 required)"));
    }

    #[test]
    fn test_json_output_parses_back() {
        let text = format_json(&report_fixture()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["overview"]["total_periods"], 100);
    }
}
