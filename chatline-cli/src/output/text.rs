//! Text output formatting.

use std::fmt::Write;

use chatline_completion::CompletionItem;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Formats a titled table of label/value rows.
    pub fn table(&self, title: &str, rows: &[(&str, String)]) -> String {
        let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.paint(BOLD, title));
        let _ = writeln!(out, "{}", "─".repeat(40));
        for (label, value) in rows {
            let label = format!("{label}:");
            let _ = writeln!(out, "{label:<width$} {value}");
        }
        out
    }

    /// Formats popup rows, marking the highlighted one.
    pub fn rows(&self, items: &[CompletionItem], selected: Option<usize>) -> String {
        if items.is_empty() {
            return format!("{}\n", self.paint(DIM, "No completions"));
        }

        let mut out = String::new();
        for (i, item) in items.iter().enumerate() {
            if selected == Some(i) {
                let _ = writeln!(out, "{} {}", self.paint(CYAN, ">"), self.paint(BOLD, &item.label));
            } else {
                let _ = writeln!(out, "  {}", item.label);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(label: &str) -> CompletionItem {
        CompletionItem {
            emote: None,
            label: label.to_string(),
            text: label.to_string(),
        }
    }

    #[test]
    fn test_rows_marks_selection() {
        let formatter = TextFormatter::new(false);
        let output = formatter.rows(&[item("forsen"), item("forsenE")], Some(1));
        assert_eq!(output, "  forsen\n> forsenE\n");
    }

    #[test]
    fn test_rows_empty() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.rows(&[], None), "No completions\n");
    }

    #[test]
    fn test_rows_with_colors() {
        let formatter = TextFormatter::new(true);
        let output = formatter.rows(&[item("Kappa")], Some(0));
        assert!(output.contains(CYAN));
        assert!(output.contains(RESET));
    }

    #[test]
    fn test_table_aligns_values() {
        let formatter = TextFormatter::new(false);
        let output = formatter.table(
            "Paths",
            &[("Dir", "/tmp".to_string()), ("Portable", "false".to_string())],
        );
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Paths");
        assert_eq!(lines[2], "Dir:      /tmp");
        assert_eq!(lines[3], "Portable: false");
    }
}
