use chrono::{DateTime, Local};

use crate::domain::{EducationRecord, OutputFormat};
use crate::scale::QuantizeScale;
use crate::tooltip::tooltip_text;

/// Counts collected while rendering one map.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub records: usize,
    /// Records dropped because a later row reused the same fips.
    pub overwritten: usize,
    pub counties: usize,
    pub states: usize,
    /// Counties drawn with the fallback fill.
    pub missing: usize,
    /// Counties per map bucket.
    pub bucket_counts: Vec<usize>,
    pub format: OutputFormat,
}

/// Format the run summary: dataset sizes, join outcome, per-bucket histogram.
pub fn format_run_summary(summary: &RunSummary, scale: &QuantizeScale, generated_at: DateTime<Local>) -> String {
    let mut out = String::new();

    out.push_str("=== choro - US Educational Attainment ===\n");
    out.push_str(&format!("Generated: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!("Format: {:?}\n", summary.format));
    out.push_str(&format!(
        "Records: n={} (duplicates overwritten: {})\n",
        summary.records, summary.overwritten
    ));
    out.push_str(&format!(
        "Features: counties={} | states={} | unjoined={}\n",
        summary.counties, summary.states, summary.missing
    ));

    out.push_str("\nBuckets:\n");
    let max = summary.bucket_counts.iter().copied().max().unwrap_or(0);
    for (i, count) in summary.bucket_counts.iter().enumerate() {
        let (lo, hi) = scale.bucket_extent(i).unwrap_or((f64::NAN, f64::NAN));
        let color = scale.colors().get(i).map(|c| c.to_string()).unwrap_or_default();
        out.push_str(
            format!(
                "{i} [{lo:>5.1}, {hi:>5.1}) {color} {count:>5} {}\n",
                bar(*count, max, 30)
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// One-county report for `choro lookup`.
pub fn format_lookup(record: &EducationRecord, scale: &QuantizeScale) -> String {
    let value = record.bachelors_or_higher;
    let bucket = scale.bucket(value);
    let mut out = String::new();
    out.push_str(&format!("{}\n", tooltip_text(record)));
    out.push_str(&format!("fips:   {}\n", record.fips));
    out.push_str(&format!("bucket: {bucket}\n"));
    out.push_str(&format!("color:  {}\n", scale.color(value)));
    out
}

fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = (count * width).div_ceil(max);
    "#".repeat(filled.min(width))
}
