//! Longest-match lexer over a mutable cursor into one line.
//!
//! [`next_token`] removes one token from the front of the line and returns it:
//! one of the fixed [`OPERATORS`], a run of identifier/number characters, or a
//! single raw character. It knows nothing about grammar.

/// Operators, tried in order; longer spellings precede their prefixes.
pub const OPERATORS: &[&str] = &[
    "(", ")", "[", "]", "=", ":", ";", "...", "/*", "*/", "//", "{", "}", "##", "#",
];

/// Characters that make up identifiers and numbers.
pub fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Remove and return the next token of `line`. Returns `""` at end of input.
pub fn next_token<'a>(line: &mut &'a str) -> &'a str {
    let rest = line.trim_start();
    if rest.is_empty() {
        *line = rest;
        return "";
    }

    if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
        let (token, tail) = rest.split_at(op.len());
        *line = tail;
        return token;
    }

    let end = rest
        .char_indices()
        .find(|&(_, c)| !is_symbol_char(c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    if end > 0 {
        let (token, tail) = rest.split_at(end);
        *line = tail;
        return token;
    }

    let width = rest.chars().next().map(char::len_utf8).unwrap_or(1);
    let (token, tail) = rest.split_at(width);
    *line = tail;
    token
}

/// Look at the next token without consuming it.
pub fn peek_token(line: &str) -> &str {
    let mut probe = line;
    next_token(&mut probe)
}

/// Find the next identifier run at or after byte `offset`, never starting in
/// the middle of one. Returns its byte range.
pub fn find_symbol(text: &str, offset: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let is_sym = |i: usize| is_symbol_char(bytes[i] as char);
    let mut i = offset;
    if i >= bytes.len() {
        return None;
    }
    if i > 0 && is_sym(i - 1) {
        while i < bytes.len() && is_sym(i) {
            i += 1;
        }
    }
    while i < bytes.len() && !is_sym(i) {
        i += 1;
    }
    if i >= bytes.len() {
        return None;
    }
    let start = i;
    while i < bytes.len() && is_sym(i) {
        i += 1;
    }
    Some((start, i))
}

/// True when `name` occurs in `text` as a whole identifier.
pub fn contains_symbol(text: &str, name: &str) -> bool {
    let mut offset = 0;
    while let Some((start, end)) = find_symbol(text, offset) {
        if &text[start..end] == name {
            return true;
        }
        offset = end;
    }
    false
}
