//! Heuristic quality score for completion text

/// Rough structural richness of a completion.
///
/// Length contributes up to 0.5, line count up to 1, and a fenced code block 1.
pub fn quality_score(text: &str) -> f64 {
    let length = (text.chars().count() as f64 / 1000.0).min(0.5);
    let lines = (text.lines().count() as f64 / 10.0).min(1.0);
    let code = if text.contains("```") { 1.0 } else { 0.0 };
    length + lines + code
}
