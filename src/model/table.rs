//! Table types.

use serde::{Deserialize, Serialize};

/// A delimiter-bounded table parsed from the raw rows of a table block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table (the separator row is not included)
    pub rows: Vec<TableRow>,

    /// Column alignments taken from the separator row
    pub alignments: Vec<Alignment>,

    /// Whether the second line was an alignment/separator row
    pub has_separator: bool,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the raw rows of a table block.
    ///
    /// When the second line is a separator row the first row becomes the
    /// header. Without it every row is a body row.
    pub fn parse(raw: &str) -> Self {
        let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
        let mut table = Table::new();

        if lines.len() >= 2 && is_separator_row(lines[1]) {
            table.has_separator = true;
            table.alignments = split_cells(lines[1])
                .iter()
                .map(|c| Alignment::from_separator(c))
                .collect();
            table.add_row(TableRow::header(split_cells(lines[0])));
            for line in &lines[2..] {
                table.add_row(TableRow::new(split_cells(line)));
            }
        } else {
            for line in &lines {
                table.add_row(TableRow::new(split_cells(line)));
            }
        }

        table
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get header rows.
    pub fn header(&self) -> &[TableRow] {
        let n = self.rows.iter().take_while(|r| r.is_header).count();
        &self.rows[..n]
    }

    /// Get body rows (non-header).
    pub fn body(&self) -> &[TableRow] {
        let n = self.header().len();
        &self.rows[n..]
    }

    /// Alignment of a column, left when unspecified.
    pub fn alignment(&self, column: usize) -> Alignment {
        self.alignments.get(column).copied().unwrap_or_default()
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cell texts, trimmed
    pub cells: Vec<String>,

    /// Whether this is a header row
    pub is_header: bool,
}

impl TableRow {
    /// Create a body row.
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells,
            is_header: false,
        }
    }

    /// Create a header row.
    pub fn header(cells: Vec<String>) -> Self {
        Self {
            cells,
            is_header: true,
        }
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells.join("\t")
    }
}

/// Column alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Read alignment from a separator cell (`:--`, `:-:`, `--:`).
    pub fn from_separator(cell: &str) -> Self {
        let cell = cell.trim();
        match (cell.starts_with(':'), cell.ends_with(':') && cell.len() > 1) {
            (true, true) => Alignment::Center,
            (false, true) => Alignment::Right,
            _ => Alignment::Left,
        }
    }

    /// CSS text-align value.
    pub fn as_css(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Check if a line is a table row (trimmed form bounded by `|`).
pub fn is_table_row(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 2 && t.starts_with('|') && t.ends_with('|')
}

/// Check if a row consists solely of separator cells (`-`/`:`, at least one `-`).
pub fn is_separator_row(line: &str) -> bool {
    if !is_table_row(line) {
        return false;
    }
    let cells = split_cells(line);
    !cells.is_empty()
        && cells.iter().all(|c| {
            !c.is_empty() && c.contains('-') && c.chars().all(|ch| ch == '-' || ch == ':')
        })
}

/// Split a table row into trimmed cell texts.
pub fn split_cells(line: &str) -> Vec<String> {
    let t = line.trim();
    let inner = t.strip_prefix('|').unwrap_or(t);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new() {
        let table = Table::new();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_parse_with_separator() {
        let table = Table::parse("| Name | Age |\n|:-----|----:|\n| Alice | 30 |\n| Bob | 25 |");
        assert!(table.has_separator);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.header().len(), 1);
        assert_eq!(table.body().len(), 2);
        assert_eq!(table.header()[0].cells, vec!["Name", "Age"]);
        assert_eq!(table.alignment(0), Alignment::Left);
        assert_eq!(table.alignment(1), Alignment::Right);
    }

    #[test]
    fn test_parse_without_separator() {
        let table = Table::parse("| a | b |\n| c | d |");
        assert!(!table.has_separator);
        assert!(table.header().is_empty());
        assert_eq!(table.body().len(), 2);
    }

    #[test]
    fn test_separator_detection() {
        assert!(is_separator_row("|---|:---:|"));
        assert!(is_separator_row("| --- | --- |"));
        assert!(!is_separator_row("| a | --- |"));
        assert!(!is_separator_row("|:|:|"));
        assert!(!is_separator_row("--- | ---"));
    }

    #[test]
    fn test_alignment_from_separator() {
        assert_eq!(Alignment::from_separator(":-:"), Alignment::Center);
        assert_eq!(Alignment::from_separator("---"), Alignment::Left);
        assert_eq!(Alignment::from_separator(":--"), Alignment::Left);
    }
}
