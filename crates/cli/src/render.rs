use shortid_backfill::BackfillReport;

/// Render the full run summary as text. Printed in its entirety regardless
/// of partial failure, so operators always see per-kind counters and the
/// validation verdict together.
pub fn render_report(report: &BackfillReport) -> String {
    let mut out = String::new();
    out.push_str("Display ID backfill summary\n");
    out.push_str("===========================\n");
    out.push_str(&format!(
        "{:<16} {:>8} {:>10} {:>8} {:>7}\n",
        "kind", "total", "processed", "skipped", "errors"
    ));

    for (kind, stats) in &report.per_kind {
        out.push_str(&format!(
            "{:<16} {:>8} {:>10} {:>8} {:>7}\n",
            kind.name(),
            stats.total,
            stats.processed,
            stats.skipped,
            stats.errors
        ));
    }

    out.push_str(&format!(
        "{:<16} {:>8} {:>10} {:>8} {:>7}\n",
        "totals",
        report.totals.total,
        report.totals.processed,
        report.totals.skipped,
        report.totals.errors
    ));
    out.push_str(&format!("duration: {}s\n", report.duration_seconds));
    out.push_str(&format!(
        "validation: {}\n",
        if report.all_unique { "PASSED" } else { "FAILED" }
    ));

    for dup in &report.duplicates {
        out.push_str(&format!(
            "  duplicate in {}: {} ({} occurrences)\n",
            dup.kind.name(),
            dup.value,
            dup.count
        ));
    }
    for err in &report.validation_errors {
        out.push_str(&format!("  validation error: {err}\n"));
    }

    out
}
