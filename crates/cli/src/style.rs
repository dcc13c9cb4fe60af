//! Terminal styling for git-si output.

use console::Style;

/// Green with checkmark.
pub fn success(msg: &str) -> String {
    let style = Style::new().green();
    format!("{} {}", style.apply_to("✓"), msg)
}

/// Red with cross.
pub fn error(msg: &str) -> String {
    let style = Style::new().red();
    format!("{} {}", style.apply_to("✗"), style.apply_to(msg))
}

/// Yellow.
pub fn notice(msg: &str) -> String {
    Style::new().yellow().apply_to(msg).to_string()
}

/// Color one line of `svn diff` output by its leading marker.
pub fn diff_line(line: &str) -> String {
    let style = match line.chars().next() {
        Some('+') | Some('A') => Style::new().green(),
        Some('-') | Some('M') => Style::new().red(),
        Some('?') => Style::new().yellow(),
        _ => return line.to_string(),
    };
    style.apply_to(line).to_string()
}
