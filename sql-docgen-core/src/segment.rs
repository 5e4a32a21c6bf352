//! Statement segmentation for SQL dumps.
//!
//! [`segment`] walks the text once with a small lexical state machine so that a
//! `;` inside a string literal, a quoted identifier, a comment, a dollar-quoted
//! body or a parenthesised block never ends a statement.
//!
//! Each emitted [`Statement`] starts at the first code character of its fragment
//! (leading comments are not part of it), ends at the last code character, and is
//! re-terminated with `;`. Fragments that hold nothing but whitespace and
//! comments are dropped.
//!
//! A backslash inside `'…'` escapes the next character, as in MySQL dumps. When
//! that reading leaves a string literal open at the end of the input (a
//! standard-SQL literal such as `'C:\'`), the text is scanned again with
//! backslashes taken literally.

use std::fmt;

pub const DELIMITER: char = ';';

/// One complete SQL instruction, trimmed and always ending with [`DELIMITER`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement(String);

impl Statement {
    fn from_span(span: &str) -> Self {
        let mut text = span.trim_end().to_string();
        if !text.ends_with(DELIMITER) {
            text.push(DELIMITER);
        }
        Statement(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Statement {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lex {
    Code,
    SingleQuote,
    DoubleQuote,
    Backtick,
    Bracket,
    LineComment,
    BlockComment,
    /// Inside `$tag$ ... $tag$`; holds the full closing delimiter.
    Dollar(String),
}

/// Split raw SQL text into statements. Never fails; empty input gives an empty vec.
pub fn segment(raw: &str) -> Vec<Statement> {
    let escaped = scan(raw, true);
    if escaped.state != Lex::SingleQuote {
        return escaped.statements;
    }
    let literal = scan(raw, false);
    if literal.state == Lex::SingleQuote {
        escaped.statements
    } else {
        literal.statements
    }
}

struct Scan {
    statements: Vec<Statement>,
    /// Lexical state when the input ran out.
    state: Lex,
}

fn scan(raw: &str, backslash_escapes: bool) -> Scan {
    let mut statements = Vec::new();
    let mut state = Lex::Code;
    let mut depth: usize = 0;
    // Byte range of the current fragment's code: first code char .. end of last code char.
    let mut start: Option<usize> = None;
    let mut code_end = 0;
    let mut prev: Option<char> = None;

    let mut chars = raw.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        match state {
            Lex::Code => match c {
                DELIMITER if depth == 0 => {
                    if let Some(s) = start.take() {
                        statements.push(Statement::from_span(&raw[s..code_end]));
                    }
                    prev = Some(c);
                    continue;
                }
                '-' if next == Some('-') => {
                    chars.next();
                    state = Lex::LineComment;
                    continue;
                }
                '/' if next == Some('*') => {
                    chars.next();
                    state = Lex::BlockComment;
                    continue;
                }
                '#' if prev.map_or(true, |p| p.is_whitespace() || matches!(p, ';' | ',' | '(' | ')')) => {
                    state = Lex::LineComment;
                    continue;
                }
                c if c.is_whitespace() => {
                    prev = Some(c);
                    continue;
                }
                '\'' => state = Lex::SingleQuote,
                '"' => state = Lex::DoubleQuote,
                '`' => state = Lex::Backtick,
                '[' => state = Lex::Bracket,
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                '$' => {
                    if let Some(tag) = dollar_tag(&raw[i..]) {
                        // The opening tag is ASCII, one char per byte.
                        for _ in 1..tag.len() {
                            chars.next();
                        }
                        code_end = i + tag.len();
                        start.get_or_insert(i);
                        state = Lex::Dollar(tag.to_string());
                        prev = Some('$');
                        continue;
                    }
                }
                _ => {}
            },
            Lex::SingleQuote => match c {
                '\\' if backslash_escapes => {
                    if let Some((j, escaped)) = chars.next() {
                        code_end = j + escaped.len_utf8();
                        continue;
                    }
                }
                '\'' => state = Lex::Code,
                _ => {}
            },
            Lex::DoubleQuote => {
                if c == '"' {
                    state = Lex::Code;
                }
            }
            Lex::Backtick => {
                if c == '`' {
                    state = Lex::Code;
                }
            }
            Lex::Bracket => {
                if c == ']' {
                    state = Lex::Code;
                }
            }
            Lex::LineComment => {
                if c == '\n' {
                    state = Lex::Code;
                    prev = Some(c);
                }
                continue;
            }
            Lex::BlockComment => {
                if c == '*' && next == Some('/') {
                    chars.next();
                    state = Lex::Code;
                    prev = Some(' ');
                }
                continue;
            }
            Lex::Dollar(ref tag) => {
                if c == '$' && raw[i..].starts_with(tag.as_str()) {
                    let len = tag.len();
                    for _ in 1..len {
                        chars.next();
                    }
                    code_end = i + len;
                    state = Lex::Code;
                    prev = Some('$');
                    continue;
                }
            }
        }

        start.get_or_insert(i);
        code_end = i + c.len_utf8();
        prev = Some(c);
    }

    if let Some(s) = start {
        statements.push(Statement::from_span(&raw[s..code_end]));
    }

    Scan { statements, state }
}

/// Recognize a PostgreSQL dollar-quote opener (`$$` or `$tag$`) at the start of `s`.
/// Positional parameters such as `$1` are not openers.
fn dollar_tag(s: &str) -> Option<&str> {
    let rest = s.strip_prefix('$')?;
    let tag_len = rest
        .char_indices()
        .find(|&(idx, ch)| {
            !(ch == '_' || ch.is_ascii_alphabetic() || (idx > 0 && ch.is_ascii_digit()))
        })
        .map(|(idx, _)| idx)?;
    if rest[tag_len..].starts_with('$') {
        Some(&s[..tag_len + 2])
    } else {
        None
    }
}
