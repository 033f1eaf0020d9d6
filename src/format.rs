/// Format a seconds count as `MM:SS`, both fields zero-padded to two digits.
///
/// There is no upper cap: 100 minutes and more simply widen the minutes
/// field (`6000` -> `"100:00"`).
pub fn format_mmss(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
