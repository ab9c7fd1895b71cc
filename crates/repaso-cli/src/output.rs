use std::io::Write;

use owo_colors::OwoColorize;
use repaso_core::validate::ValidationReport;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the extraction summary after a document has been walked.
pub fn print_extraction_summary(
    w: &mut dyn Write,
    source_name: &str,
    segments: usize,
    warnings: &[String],
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Extracted {} segments from {}", segments, source_name)?;
    for warning in warnings {
        if color.enabled() {
            writeln!(w, "{} {}", "WARNING:".yellow(), warning)?;
        } else {
            writeln!(w, "WARNING: {}", warning)?;
        }
    }
    Ok(())
}

/// Print the detected unit headings, one per line.
pub fn print_units(w: &mut dyn Write, units: &[String]) -> std::io::Result<()> {
    if units.is_empty() {
        writeln!(w, "No unit headings found; the whole corpus will be used.")?;
        return Ok(());
    }
    writeln!(w, "Found {} units:", units.len())?;
    for unit in units {
        writeln!(w, "  {}", unit)?;
    }
    Ok(())
}

/// Print what survived validation and why the rest did not.
pub fn print_validation_summary(
    w: &mut dyn Write,
    report: &ValidationReport,
    color: ColorMode,
) -> std::io::Result<()> {
    let accepted = format!("{} questions accepted", report.accepted.len());
    if color.enabled() {
        writeln!(w, "{}", accepted.green())?;
    } else {
        writeln!(w, "{}", accepted)?;
    }

    for rejection in &report.rejections {
        let line = format!(
            "question {} rejected: {}",
            rejection.index + 1,
            rejection.reason
        );
        if color.enabled() {
            writeln!(w, "{}", line.red())?;
        } else {
            writeln!(w, "{}", line)?;
        }
    }

    for warning in &report.length_warnings {
        let line = format!(
            "question {}: {} is {} chars (Kahoot caps it at {})",
            warning.index + 1,
            warning.field,
            warning.chars,
            warning.max
        );
        if color.enabled() {
            writeln!(w, "{}", line.yellow())?;
        } else {
            writeln!(w, "{}", line)?;
        }
    }
    Ok(())
}

/// UTC timestamp slug for archived raw replies, `YYYYMMDD-HHMMSS`.
pub fn utc_timestamp_slug() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    slug_from_epoch_secs(now)
}

fn slug_from_epoch_secs(secs: u64) -> String {
    let days = secs / 86400;
    let time_of_day = secs % 86400;
    let (year, month, day) = days_to_ymd(days);
    format!(
        "{:04}{:02}{:02}-{:02}{:02}{:02}",
        year,
        month,
        day,
        time_of_day / 3600,
        (time_of_day % 3600) / 60,
        time_of_day % 60
    )
}

/// Convert days since Unix epoch to (year, month, day).
fn days_to_ymd(days: u64) -> (u64, u64, u64) {
    // Civil calendar conversion
    let z = days + 719468;
    let era = z / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}
