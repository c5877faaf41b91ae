/// Split one CSV line into trimmed cells.
///
/// A `"` toggles quoted mode, `""` inside quotes is a literal quote, and
/// commas only split outside quotes. An unterminated quote swallows the
/// rest of the line into the last cell instead of failing.
#[must_use]
pub fn split_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(finish_cell(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(finish_cell(&mut current));

    cells
}

fn finish_cell(current: &mut String) -> String {
    let cell = std::mem::take(current);
    cell.trim().to_string()
}
