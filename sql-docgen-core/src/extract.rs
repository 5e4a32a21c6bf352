//! Table identifier extraction from `CREATE|ALTER|DROP TABLE` statements.

use std::sync::LazyLock;

use regex::Regex;

/// Leading whitespace and comments, then the DDL verb and its modifiers, then an
/// optionally qualified, optionally quoted name. Only the last name part is captured.
static TABLE_DDL_RE: LazyLock<Regex> = LazyLock::new(|| {
    const QUALIFIER: &str = r#"(?:`[^`]+`|"[^"]+"|\[[^\]]+\]|[\p{L}_][\p{L}\p{N}_$]*)"#;
    const NAME: &str = r#"(?:`(?P<bt>[^`]+)`|"(?P<dq>[^"]+)"|\[(?P<br>[^\]]+)\]|(?P<bare>[\p{L}_][\p{L}\p{N}_$]*))"#;
    let pattern = format!(
        concat!(
            r"(?is)^(?:\s+|--[^\n]*(?:\n|$)|#[^\n]*(?:\n|$)|/\*.*?\*/)*",
            r"(?:CREATE(?:\s+OR\s+REPLACE)?(?:\s+(?:GLOBAL|LOCAL))?(?:\s+(?:TEMPORARY|TEMP|UNLOGGED))?|ALTER|DROP)",
            r"\s+TABLE(?:\s+IF(?:\s+NOT)?\s+EXISTS)?(?:\s+(?P<only>ONLY))?\s+",
            r"(?:{q}\s*\.\s*){{0,2}}{n}"
        ),
        q = QUALIFIER,
        n = NAME
    );
    Regex::new(&pattern).expect("table DDL pattern is valid")
});

/// Recover the bare table name targeted by a `CREATE TABLE`, `ALTER TABLE` or
/// `DROP TABLE` statement. Schema qualifiers and quoting are stripped; case is kept.
///
/// Anything else (`INSERT`, `SELECT`, indexes, malformed DDL) yields `None`.
pub fn extract_table_name(statement: &str) -> Option<&str> {
    let caps = TABLE_DDL_RE.captures(statement)?;
    // `ALTER TABLE only ADD ...`: the table is called `only`.
    if let (Some(only), Some(bare)) = (caps.name("only"), caps.name("bare")) {
        let unqualified = statement[only.end()..bare.start()].trim().is_empty();
        if unqualified && is_clause_keyword(bare.as_str()) {
            return Some(only.as_str());
        }
    }
    ["bt", "dq", "br", "bare"]
        .iter()
        .find_map(|group| caps.name(group))
        .map(|m| m.as_str())
}

/// Words that open the body of an `ALTER`/`DROP TABLE` rather than name a table.
fn is_clause_keyword(word: &str) -> bool {
    const KEYWORDS: &[&str] = &[
        "ADD", "ALTER", "ATTACH", "CASCADE", "CLUSTER", "DETACH", "DISABLE", "DROP", "ENABLE",
        "FORCE", "INHERIT", "NO", "OWNER", "RENAME", "REPLICA", "RESET", "RESTRICT", "SET",
        "VALIDATE",
    ];
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}
