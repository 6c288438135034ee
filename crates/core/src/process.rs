//! Helpers shared by subprocess-backed delegates.

/// Number of stderr lines kept for error reports.
pub const STDERR_TAIL_LINES: usize = 20;

/// Returns the last `max_lines` non-empty lines of captured stderr, or
/// `None` if nothing was written.
pub fn stderr_tail(stderr: &[u8], max_lines: usize) -> Option<String> {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return None;
    }
    let start = lines.len().saturating_sub(max_lines);
    Some(lines[start..].join("\n"))
}
