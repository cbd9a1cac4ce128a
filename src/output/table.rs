use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::analysis::AnalysisReport;

pub fn render_report_table(project: &str, report: &AnalysisReport) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Project", "NDVI", "Verdict", "Risk", "Rule Set", "Reason"]);

    let risk_cell = if report.risk_flag {
        Cell::new("YES").fg(Color::Red)
    } else {
        Cell::new("NO").fg(Color::Green)
    };
    table.add_row(Row::from(vec![
        Cell::new(project),
        Cell::new(format!("{:.4}", report.calculated_index)),
        Cell::new(report.verdict.to_string()),
        risk_cell,
        Cell::new(&report.model_used),
        Cell::new(&report.reason),
    ]));
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::render_report_table;
    use crate::analysis::classifier::classify;
    use crate::analysis::ProjectCategory;

    #[test]
    fn table_contains_verdict_and_index() {
        let report = classify(&ProjectCategory::Road, 0.6);
        let rendered = render_report_table("PRJ-1", &report);
        assert!(rendered.contains("GHOST_PROJECT_DETECTED"));
        assert!(rendered.contains("0.6000"));
        assert!(rendered.contains("PRJ-1"));
    }
}
