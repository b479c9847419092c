#![forbid(unsafe_code)]

use std::io;

/// Plain column-aligned text table for list output, with an optional cap on
/// cell width so long descriptions do not wrap the terminal.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    max_cell_width: Option<usize>,
}

impl Table {
    pub fn new(headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            max_cell_width: None,
        }
    }

    #[must_use]
    pub fn max_cell_width(mut self, width: usize) -> Self {
        self.max_cell_width = Some(width.max(1));
        self
    }

    pub fn row(&mut self, cols: impl IntoIterator<Item = impl Into<String>>) {
        let row = cols
            .into_iter()
            .map(|c| self.clip(c.into()))
            .collect();
        self.rows.push(row);
    }

    pub fn print(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        self.write_to(&mut out)
    }

    pub fn write_csv(&self) -> io::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout().lock());
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn clip(&self, cell: String) -> String {
        let Some(max) = self.max_cell_width else {
            return cell;
        };
        if cell.chars().count() <= max {
            return cell;
        }
        let mut clipped: String = cell.chars().take(max.saturating_sub(1)).collect();
        clipped.push('…');
        clipped
    }

    fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain([self.headers.len()])
            .max()
            .unwrap_or(0);

        let mut widths = vec![0usize; columns];
        for row in std::iter::once(&self.headers).chain(&self.rows) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        for row in std::iter::once(&self.headers).chain(&self.rows) {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    line.push_str("  ");
                }
                line.push_str(cell);
                if i + 1 < row.len() {
                    for _ in cell.chars().count()..widths[i] {
                        line.push(' ');
                    }
                }
            }
            writeln!(&mut out, "{line}")?;
        }
        Ok(())
    }
}
