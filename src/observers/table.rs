//! Table observer for pretty-printing counter totals.
//!
//! This module provides [`TableObserver`], which renders counter snapshots
//! as a formatted table using the `tabled` crate.
//!
//! # Feature Flag
//!
//! This module requires the `table` feature:
//!
//! ```toml
//! [dependencies]
//! shardcount = { version = "0.1", features = ["table"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use shardcount::observers::table::{TableObserver, TableStyle};
//!
//! let totals = counters.totals()?;
//! let observer = TableObserver::new().with_style(TableStyle::Rounded);
//! println!("{}", observer.render(&totals));
//! // ╭─────────┬───────╮
//! // │ Name    │ Value │
//! // ├─────────┼───────┤
//! // │ Enqueue │ 1000  │
//! // │ Error   │ 5     │
//! // ╰─────────┴───────╯
//! ```

use crate::snapshot::CounterSnapshot;
use tabled::{settings::Style, Table, Tabled};

/// Available table styles for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStyle {
    /// ASCII table with simple characters: +, -, |
    Ascii,
    /// Modern rounded corners (default)
    #[default]
    Rounded,
    /// Sharp corners with box-drawing characters
    Sharp,
    /// Modern style with clean lines
    Modern,
    /// GitHub-flavored Markdown table
    Markdown,
    /// Dots for borders
    Dots,
    /// No borders, just spacing
    Blank,
}

/// Configuration for the table observer.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// The style to use for rendering.
    pub style: TableStyle,
    /// Whether to show the header row.
    pub show_header: bool,
    /// Custom title for the table (optional).
    pub title: Option<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            style: TableStyle::default(),
            show_header: true,
            title: None,
        }
    }
}

#[derive(Tabled)]
struct CounterRow<'a> {
    #[tabled(rename = "Name")]
    name: &'a str,
    #[tabled(rename = "Value")]
    value: i64,
}

/// An observer that renders counter snapshots as a formatted table.
///
/// # Examples
///
/// ```rust
/// use shardcount::observers::table::{TableObserver, TableStyle};
/// use shardcount::snapshot::CounterSnapshot;
///
/// let totals = vec![CounterSnapshot::new("requests", 42)];
/// let output = TableObserver::new()
///     .with_style(TableStyle::Markdown)
///     .render(&totals);
///
/// assert!(output.contains("requests"));
/// assert!(output.contains("42"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableObserver {
    config: TableConfig,
}

impl TableObserver {
    /// Creates a new table observer with default settings.
    ///
    /// Default style is [`TableStyle::Rounded`] with a header row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new table observer with the specified configuration.
    pub fn with_config(config: TableConfig) -> Self {
        Self { config }
    }

    /// Sets the table style.
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.config.style = style;
        self
    }

    /// Sets whether to show the header row.
    pub fn with_header(mut self, show: bool) -> Self {
        self.config.show_header = show;
        self
    }

    /// Sets an optional title printed above the table.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    fn apply_style(&self, table: &mut Table) {
        match self.config.style {
            TableStyle::Ascii => {
                table.with(Style::ascii());
            }
            TableStyle::Rounded => {
                table.with(Style::rounded());
            }
            TableStyle::Sharp => {
                table.with(Style::sharp());
            }
            TableStyle::Modern => {
                table.with(Style::modern());
            }
            TableStyle::Markdown => {
                table.with(Style::markdown());
            }
            TableStyle::Dots => {
                table.with(Style::dots());
            }
            TableStyle::Blank => {
                table.with(Style::blank());
            }
        }
    }

    /// Renders the counters as a formatted table string.
    pub fn render(&self, counters: &[CounterSnapshot]) -> String {
        let rows = counters.iter().map(|c| CounterRow {
            name: &c.name,
            value: c.value,
        });

        let mut table = Table::new(rows);
        self.apply_style(&mut table);

        if !self.config.show_header {
            table.with(tabled::settings::Remove::row(
                tabled::settings::object::Rows::first(),
            ));
        }

        match &self.config.title {
            Some(title) => format!("{}\n{}", title, table),
            None => table.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals() -> Vec<CounterSnapshot> {
        vec![
            CounterSnapshot::new("Enqueue", 1000),
            CounterSnapshot::new("Error", 5),
            CounterSnapshot::new("balance", -100),
        ]
    }

    #[test]
    fn test_render_empty_has_header() {
        let output = TableObserver::new().render(&[]);
        assert!(output.contains("Name"));
        assert!(output.contains("Value"));
    }

    #[test]
    fn test_render_rows() {
        let output = TableObserver::new().render(&totals());
        assert!(output.contains("Enqueue"));
        assert!(output.contains("1000"));
        assert!(output.contains("-100"));
    }

    #[test]
    fn test_render_without_header() {
        let output = TableObserver::new().with_header(false).render(&totals());
        assert!(!output.contains("Name"));
        assert!(output.contains("Enqueue"));
    }

    #[test]
    fn test_render_with_title() {
        let output = TableObserver::new()
            .with_title("Counters")
            .render(&totals());
        assert!(output.starts_with("Counters\n"));
    }

    #[test]
    fn test_markdown_style() {
        let output = TableObserver::new()
            .with_style(TableStyle::Markdown)
            .render(&totals());
        assert!(output.contains("| Enqueue"));
        assert!(output.contains("|---"));
    }

    #[test]
    fn test_ascii_style() {
        let output = TableObserver::new()
            .with_style(TableStyle::Ascii)
            .render(&totals());
        assert!(output.starts_with('+'));
    }

    #[test]
    fn test_with_config() {
        let config = TableConfig {
            style: TableStyle::Blank,
            show_header: false,
            title: None,
        };
        let output = TableObserver::with_config(config).render(&totals());
        assert!(!output.contains('|'));
        assert!(output.contains("Error"));
    }
}
