//! Splitting one CSV line into raw cells.

/// Split `line` on commas, treating commas inside double quotes as data.
///
/// Every `"` toggles the quoted state and is dropped, so a doubled quote
/// inside a quoted field does not produce a literal quote. The function is
/// total: an unmatched quote simply swallows the remaining commas, and the
/// empty line yields one empty cell.
pub fn tokenize_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    cells.push(current);

    cells
}
