//! Terminal output utilities: ANSI formatting, notes, and table rendering.

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm'
            for next in chars.by_ref() {
                if next == 'm' { break; }
            }
        } else {
            result.push(c);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

/// Errors go to stderr so piped output keeps only results.
pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

/// Section heading followed by a plain body block.
pub fn render_section(title: &str, body: &str, color: bool) -> String {
    let underline = "-".repeat(title.chars().count());
    if color {
        format!("{BOLD}{title}{RESET}\n{DIM}{underline}{RESET}\n{body}\n")
    } else {
        format!("{title}\n{underline}\n{body}\n")
    }
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

/// Render a two-column key/value table, left-aligned.
pub fn render_table(headers: [&str; 2], rows: &[(String, String)]) -> String {
    let mut widths = [strip_ansi(headers[0]).len(), strip_ansi(headers[1]).len()];
    for (key, value) in rows {
        widths[0] = widths[0].max(strip_ansi(key).len());
        widths[1] = widths[1].max(strip_ansi(value).len());
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{BOLD}  {}  {}  {RESET}\n",
        pad_cell(headers[0], widths[0]),
        pad_cell(headers[1], widths[1])
    ));
    out.push_str(&format!("  {}  {}  \n", "-".repeat(widths[0]), "-".repeat(widths[1])));
    for (key, value) in rows {
        out.push_str(&format!("  {}  {}  \n", pad_cell(key, widths[0]), pad_cell(value, widths[1])));
    }
    out
}

fn pad_cell(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(strip_ansi(s).len());
    format!("{s}{}", " ".repeat(pad))
}
