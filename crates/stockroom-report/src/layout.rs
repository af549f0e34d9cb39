//! # Report Layout
//!
//! Column definitions and the shared page frame every report uses.
//!
//! ```text
//! PRICE LIST                                   ← title
//! Date: 14/03/2026 09:30                       ← generated_at
//!                                              ← blank
//! PRODUCT          UNIT        PRICE  CATEGORY ← column header
//! ---------------------------------------------  ← RULE_WIDTH dashes
//! Soda             case      R$ 2.50  Bevera~  ← one row per record
//! ---------------------------------------------
//! Total products: 1                            ← footer lines
//! ```

use chrono::{DateTime, FixedOffset, Local};

/// Width of the dashed rule under the header and above the footer.
pub const RULE_WIDTH: usize = 80;

/// Format of the `Date:` line and movement timestamps.
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Settings shared by every report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Printed on the `Date:` line; its offset is also used for movement
    /// timestamps.
    pub generated_at: DateTime<FixedOffset>,
    /// Prefix for currency cells, e.g. `R$`. May be empty.
    pub currency_symbol: String,
}

impl ReportOptions {
    /// Options stamped with the local time.
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        let now = Local::now();
        ReportOptions {
            generated_at: now.with_timezone(now.offset()),
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn generated_at(mut self, at: DateTime<FixedOffset>) -> Self {
        self.generated_at = at;
        self
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions::new("R$")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Column {
    pub header: &'static str,
    pub width: usize,
    pub align: Align,
}

impl Column {
    pub const fn left(header: &'static str, width: usize) -> Self {
        Column {
            header,
            width,
            align: Align::Left,
        }
    }

    pub const fn right(header: &'static str, width: usize) -> Self {
        Column {
            header,
            width,
            align: Align::Right,
        }
    }

    fn cell(&self, value: &str) -> String {
        let value = fit(value, self.width);
        match self.align {
            Align::Left => format!("{:<width$}", value, width = self.width),
            Align::Right => format!("{:>width$}", value, width = self.width),
        }
    }
}

/// Cuts `value` to `width` characters, marking the cut with `~`.
fn fit(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

/// Accumulates one report in memory.
pub(crate) struct Page<'a> {
    columns: &'a [Column],
    text: String,
}

impl<'a> Page<'a> {
    /// Starts a page with title, date line, blank line, header and rule.
    pub fn new(title: &str, options: &ReportOptions, columns: &'a [Column]) -> Self {
        let mut page = Page {
            columns,
            text: String::new(),
        };
        page.line(title);
        page.line(&format!(
            "Date: {}",
            options.generated_at.format(DATE_FORMAT)
        ));
        page.line("");
        let headers: Vec<&str> = columns.iter().map(|c| c.header).collect();
        page.row(&headers[..]);
        page.rule();
        page
    }

    pub fn row<S: AsRef<str>>(&mut self, cells: &[S]) {
        let line = self
            .columns
            .iter()
            .zip(cells)
            .map(|(column, value)| column.cell(value.as_ref()))
            .collect::<Vec<_>>()
            .join(" ");
        self.line(&line);
    }

    pub fn rule(&mut self) {
        self.line(&"-".repeat(RULE_WIDTH));
    }

    pub fn line(&mut self, line: &str) {
        self.text.push_str(line.trim_end());
        self.text.push('\n');
    }

    /// Closes the body with a rule and appends the footer lines.
    pub fn finish(mut self, footer: &[String]) -> String {
        self.rule();
        for line in footer {
            self.line(line);
        }
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cells_align_and_truncate() {
        assert_eq!(Column::left("A", 5).cell("ab"), "ab   ");
        assert_eq!(Column::right("A", 5).cell("ab"), "   ab");
        assert_eq!(Column::left("A", 5).cell("abcdefgh"), "abcd~");
        assert_eq!(Column::left("A", 4).cell("Açaí"), "Açaí");
    }

    #[test]
    fn test_page_frame() {
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 14, 9, 5, 0)
            .unwrap();
        let options = ReportOptions::new("$").generated_at(at);
        let columns = [Column::left("NAME", 6), Column::right("QTY", 4)];

        let mut page = Page::new("TITLE", &options, &columns);
        page.row(&["Soda", "3"]);
        let text = page.finish(&["Total: 1".to_string()]);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "TITLE");
        assert_eq!(lines[1], "Date: 14/03/2026 09:05");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "NAME    QTY");
        assert_eq!(lines[4].len(), RULE_WIDTH);
        assert_eq!(lines[5], "Soda      3");
        assert_eq!(lines[6], "-".repeat(RULE_WIDTH));
        assert_eq!(lines[7], "Total: 1");
    }
}
