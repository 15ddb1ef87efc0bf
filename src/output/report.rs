use crate::error::OutputError;
use crate::runner::RunReport;
use chrono::Utc;
use std::fs;
use std::path::Path;

use super::RunInput;

/// Write a markdown summary of a completed run.
pub fn write_run_report(
    path: &Path,
    input: &RunInput,
    report: &RunReport,
) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(OutputError::CreateDir)?;
    }

    let content = build_report_markdown(input, report);
    fs::write(path, content).map_err(|e| OutputError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

fn build_report_markdown(input: &RunInput, report: &RunReport) -> String {
    let mut md = String::new();
    let totals = report.totals();

    md.push_str("# prism Run\n\n");
    md.push_str(&format!("**Generated:** {}\n", Utc::now().to_rfc3339()));
    md.push_str(&format!("**Statement:** {}\n", input.statement));
    md.push_str(&format!("**Significance:** {:.2}\n", input.significance));
    md.push_str(&format!("**Perspectives:** {}\n", report.perspectives.len()));
    md.push_str(&format!(
        "**Duration:** {:.1}s\n\n",
        report.total_duration.as_secs_f64()
    ));

    md.push_str("## Bands\n\n");
    md.push_str("| Band | Slots | Accepted | Repaired | Fallbacks | Parse Retries |\n");
    md.push_str("|------|-------|----------|----------|-----------|---------------|\n");
    for (band, stats) in &report.bands {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            band, stats.slots, stats.accepted, stats.repaired, stats.fallbacks, stats.parse_retries
        ));
    }
    md.push_str(&format!(
        "| **total** | {} | {} | {} | {} | {} |\n",
        totals.slots, totals.accepted, totals.repaired, totals.fallbacks, totals.parse_retries
    ));

    if totals.fallbacks > 0 {
        md.push_str(&format!(
            "\n{} perspectives use fallback text; consider rerunning.\n",
            totals.fallbacks
        ));
    }

    md
}
