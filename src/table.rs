use std::fmt;

/// Column-aligned text table for the status display.
///
/// Columns are sized to the widest cell, headers included. Rows are
/// plain strings; the caller formats its own values.
pub struct FormattedTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl FormattedTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FormattedTable {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Drops the body, keeping the headers for the next cycle.
    pub fn clear_rows(&mut self) {
        self.rows.clear();
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(String::len).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(cell.len());
            }
        }
        widths
    }
}

/// Header line, a dash rule as wide as it, then one line per row.
impl fmt::Display for FormattedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();
        let pad = |cells: &[String]| -> String {
            cells
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let width = widths.get(i).copied().unwrap_or(0);
                    format!("{cell:<width$}")
                })
                .collect::<Vec<_>>()
                .join(" | ")
        };

        let header = pad(&self.headers);
        write!(f, "{header}\n{}", "-".repeat(header.len()))?;
        for row in &self.rows {
            write!(f, "\n{}", pad(row))?;
        }
        Ok(())
    }
}
