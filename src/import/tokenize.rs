use super::config::DelimiterMode;

const BOM: char = '\u{feff}';

pub(crate) fn strip_bom(line: &str) -> &str {
    line.strip_prefix(BOM).unwrap_or(line)
}

/// Pick the field separator for a file from its header line.
///
/// In `Auto` mode a semicolon wins only when it strictly outnumbers commas,
/// so ties (including a header with neither) fall back to comma.
pub(crate) fn detect_delimiter(header_line: &str, mode: DelimiterMode) -> char {
    match mode {
        DelimiterMode::Comma => ',',
        DelimiterMode::Semicolon => ';',
        DelimiterMode::Auto => {
            let line = strip_bom(header_line);
            let commas = line.matches(',').count();
            let semicolons = line.matches(';').count();
            if semicolons > commas {
                ';'
            } else {
                ','
            }
        }
    }
}

/// Split one line into fields, honouring double-quoted sections.
///
/// Inside quotes a doubled `""` yields one literal quote. An unterminated quote
/// swallows the rest of the line into the current field. Whitespace is kept.
pub(crate) fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
#[path = "tokenize_tests.rs"]
mod tests;
