//! Quote-aware CSV tokenizer.
//!
//! Review exports come from many platforms and are rarely well-formed, so the
//! tokenizer never fails: it scans the input once, character by character,
//! and always produces a [`RawGrid`]. Malformed input degrades the grid
//! instead of aborting the import.
//!
//! Known degenerate case: a `"` that is never closed switches the scanner
//! into quoted mode for the rest of the input, so everything after it lands
//! in a single cell. That is surfaced downstream as a data-quality problem.

/// Rows of raw cell values exactly as they appeared in the file, minus the
/// CSV quoting. Row 0 is the header row.
///
/// Rows may have different lengths; use [`RawGrid::cell`] to read a cell with
/// out-of-range positions treated as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGrid {
    rows: Vec<Vec<String>>,
}

impl RawGrid {
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The header row, if the grid has any rows at all.
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Data rows paired with their 1-based data row index.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, row)| (idx, row.as_slice()))
    }

    /// Cell at `(row, col)`, or `""` when either index is out of range.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map_or("", String::as_str)
    }
}

/// Picks the field delimiter by comparing comma and semicolon counts on the
/// first physical line. Semicolon wins only when strictly more frequent.
#[must_use]
pub fn detect_delimiter(text: &str) -> char {
    let first_line = text.split('\n').next().unwrap_or_default();
    let commas = first_line.matches(',').count();
    let semicolons = first_line.matches(';').count();
    if semicolons > commas {
        ';'
    } else {
        ','
    }
}

/// Tokenizes `text` with an auto-detected delimiter.
#[must_use]
pub fn tokenize(text: &str) -> RawGrid {
    tokenize_with(text, detect_delimiter(text))
}

/// Tokenizes `text` using `delimiter` as the field separator.
///
/// `""` inside a quoted field is a literal quote. Delimiters, `\r`, and `\n`
/// inside quotes are kept as cell content. Outside quotes, `\r\n`, `\n`, and
/// a lone `\r` all end a row. A row consisting of one empty cell (a blank
/// line) is dropped.
#[must_use]
pub fn tokenize_with(text: &str, delimiter: char) -> RawGrid {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => row.push(std::mem::take(&mut cell)),
            '\r' | '\n' if !in_quotes => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut cell));
                push_row(&mut rows, std::mem::take(&mut row));
            }
            other => cell.push(other),
        }
    }

    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        push_row(&mut rows, row);
    }

    RawGrid { rows }
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    let blank = row.len() == 1 && row[0].is_empty();
    if !blank {
        rows.push(row);
    }
}

#[cfg(test)]
#[path = "tokenize_test.rs"]
mod tests;
