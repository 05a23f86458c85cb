//! Validation for model-supplied SQL.
//!
//! A query must pass every textual check here before it reaches the
//! catalog, and the catalog then refuses anything the engine itself does
//! not report as read-only.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::StorageError;

/// Maximum accepted query length in bytes.
pub const MAX_QUERY_LEN: usize = 4_000;

static LEADING_KEYWORD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(select|with)\b").ok());

static MUTATING_KEYWORD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(insert|update|delete|drop|alter|create|truncate|exec|execute|call|merge|replace|grant|revoke|attach|detach|pragma|vacuum|reindex|upsert)\b",
    )
    .ok()
});

static STRING_LITERAL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"'(?:[^']|'')*'").ok());

static CTE_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\bwith\b(?:\s+recursive)?|,)\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:\([^)]*\))?\s+as\s*\(")
        .ok()
});

fn rejected(reason: impl Into<String>) -> StorageError {
    StorageError::QueryRejected(reason.into())
}

/// Returns a compiled pattern, failing closed if it did not compile.
fn pattern(re: &LazyLock<Option<Regex>>) -> Result<&Regex, StorageError> {
    re.as_ref()
        .ok_or_else(|| rejected("query validation is unavailable"))
}

/// Words that end a table reference; never read as a table alias.
const CLAUSE_WORDS: [&str; 23] = [
    "as", "cross", "except", "full", "group", "having", "indexed", "inner", "intersect", "join",
    "left", "limit", "natural", "not", "on", "order", "outer", "right", "select", "union",
    "using", "where", "window",
];

/// A lexical token of a scrubbed query.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    /// Bare identifier, keyword or number.
    Word(&'a str),
    /// Identifier quoted with `"..."`, `[...]` or backticks, unquoted.
    Quoted(String),
    /// A `'...'` string literal.
    Literal,
    /// Any other single character.
    Punct(char),
}

impl Token<'_> {
    fn is_word(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    /// The identifier this token names, if it can name a table.
    fn identifier(&self) -> Option<String> {
        match self {
            Token::Word(w) if !is_clause_word(w) => Some(w.to_lowercase()),
            Token::Quoted(name) => Some(name.to_lowercase()),
            _ => None,
        }
    }
}

fn is_clause_word(word: &str) -> bool {
    CLAUSE_WORDS.iter().any(|k| word.eq_ignore_ascii_case(k))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn tokenize(sql: &str) -> Result<Vec<Token<'_>>, StorageError> {
    let mut tokens = Vec::new();
    let mut chars = sql.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if is_word_char(c) {
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if !is_word_char(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            tokens.push(Token::Word(&sql[start..end]));
            continue;
        }

        let close = match c {
            '"' | '`' | '\'' => c,
            '[' => ']',
            _ => {
                tokens.push(Token::Punct(c));
                continue;
            }
        };
        let mut text = String::new();
        let mut closed = false;
        while let Some((_, next)) = chars.next() {
            if next == close {
                // A doubled quote stands for itself.
                if close != ']' && chars.peek().is_some_and(|&(_, after)| after == close) {
                    chars.next();
                    text.push(next);
                    continue;
                }
                closed = true;
                break;
            }
            text.push(next);
        }
        if !closed {
            return Err(rejected("unterminated quote"));
        }
        tokens.push(if c == '\'' {
            Token::Literal
        } else {
            Token::Quoted(text)
        });
    }
    Ok(tokens)
}

/// Returns the index just past the `)` matching the `(` at `open`.
fn skip_group(tokens: &[Token<'_>], open: usize) -> Result<usize, StorageError> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::Punct('(') => depth += 1,
            Token::Punct(')') => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(i + 1);
                }
            }
            _ => {}
        }
    }
    Err(rejected("unbalanced parentheses"))
}

/// Skips an optional `[AS] alias` at `pos`.
fn skip_alias(tokens: &[Token<'_>], pos: usize) -> usize {
    match tokens.get(pos) {
        Some(t) if t.is_word("as") => pos + 2,
        Some(t) if t.identifier().is_some() => pos + 1,
        _ => pos,
    }
}

fn starts_query(token: Option<&Token<'_>>) -> bool {
    token.is_some_and(|t| t.is_word("select") || t.is_word("with") || t.is_word("values"))
}

/// Reads a comma-separated list of table references starting at `pos`.
fn table_list(tokens: &[Token<'_>], mut pos: usize, tables: &mut Vec<String>) -> Result<(), StorageError> {
    loop {
        pos = table_item(tokens, pos, tables)?;
        if tokens.get(pos) == Some(&Token::Punct(',')) {
            pos += 1;
        } else {
            return Ok(());
        }
    }
}

/// Reads one table reference at `pos` and returns the index after it.
///
/// Subqueries are skipped; their own `FROM` clauses are read where they
/// occur. Anything that is neither a subquery nor a readable table name is
/// rejected.
fn table_item(tokens: &[Token<'_>], pos: usize, tables: &mut Vec<String>) -> Result<usize, StorageError> {
    let Some(token) = tokens.get(pos) else {
        return Err(rejected("FROM or JOIN is not followed by a table"));
    };

    if *token == Token::Punct('(') {
        if !starts_query(tokens.get(pos + 1)) {
            table_list(tokens, pos + 1, tables)?;
        }
        let after = skip_group(tokens, pos)?;
        return Ok(skip_alias(tokens, after));
    }

    let Some(mut name) = token.identifier() else {
        return Err(rejected("could not read the table name after FROM or JOIN"));
    };
    let mut pos = pos + 1;
    while tokens.get(pos) == Some(&Token::Punct('.')) {
        name = tokens
            .get(pos + 1)
            .and_then(Token::identifier)
            .ok_or_else(|| rejected("could not read a schema-qualified table name"))?;
        pos += 2;
    }
    tables.push(name);

    // Table-valued function arguments.
    if tokens.get(pos) == Some(&Token::Punct('(')) {
        pos = skip_group(tokens, pos)?;
    }
    Ok(skip_alias(tokens, pos))
}

/// Allow-list driven validator for read-only queries.
#[derive(Debug, Clone)]
pub struct QueryGuard {
    allowed_tables: BTreeSet<String>,
}

impl QueryGuard {
    /// Creates a guard permitting only the given tables (case-insensitive).
    #[must_use]
    pub fn new<I, S>(allowed_tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_tables: allowed_tables
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Validates `sql` and returns it ready for execution (trimmed, with a
    /// single trailing semicolon removed).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QueryRejected`] naming the first violated rule.
    pub fn validate(&self, sql: &str) -> Result<String, StorageError> {
        let trimmed = sql.trim();
        if trimmed.is_empty() {
            return Err(rejected("query is empty"));
        }
        if trimmed.len() > MAX_QUERY_LEN {
            return Err(rejected(format!(
                "query too long ({} bytes, max {MAX_QUERY_LEN})",
                trimmed.len()
            )));
        }
        if trimmed.contains("--") || trimmed.contains("/*") {
            return Err(rejected("comments are not allowed"));
        }

        let statement = trimmed
            .strip_suffix(';')
            .map_or(trimmed, str::trim_end)
            .to_string();

        // Literals are blanked so their contents cannot trip or dodge the checks.
        let scrubbed = pattern(&STRING_LITERAL)?.replace_all(&statement, "''");

        if scrubbed.contains(';') {
            return Err(rejected("multiple statements are not allowed"));
        }
        if !pattern(&LEADING_KEYWORD)?.is_match(&scrubbed) {
            return Err(rejected("query must begin with SELECT or WITH"));
        }
        if let Some(m) = pattern(&MUTATING_KEYWORD)?.find(&scrubbed) {
            return Err(rejected(format!(
                "mutating keyword '{}' is not allowed",
                m.as_str().to_uppercase()
            )));
        }

        let ctes: BTreeSet<String> = pattern(&CTE_NAME)?
            .captures_iter(&scrubbed)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_lowercase())
            .collect();

        for table in Self::referenced_tables(&scrubbed)? {
            if !self.allowed_tables.contains(&table) && !ctes.contains(&table) {
                return Err(rejected(format!("table '{table}' is not allowed")));
            }
        }

        Ok(statement)
    }

    fn referenced_tables(sql: &str) -> Result<Vec<String>, StorageError> {
        let tokens = tokenize(sql)?;
        let mut tables = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            if token.is_word("from") {
                // `IS [NOT] DISTINCT FROM` compares values.
                if i > 0 && tokens[i - 1].is_word("distinct") {
                    continue;
                }
                table_list(&tokens, i + 1, &mut tables)?;
            } else if token.is_word("join") {
                table_item(&tokens, i + 1, &mut tables)?;
            }
        }
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn guard() -> QueryGuard {
        QueryGuard::new(["Hotels", "Attractions", "Vehicles", "Availability"])
    }

    #[test_case("SELECT * FROM Hotels" ; "plain select")]
    #[test_case("select name, city from hotels where city = 'Luxor'" ; "lowercase")]
    #[test_case("SELECT * FROM Hotels;" ; "single trailing semicolon")]
    #[test_case("SELECT h.name FROM Hotels h JOIN Availability a ON a.entity_id = h.id" ; "join")]
    #[test_case("SELECT * FROM Hotels, Vehicles" ; "comma join")]
    #[test_case("WITH cheap AS (SELECT * FROM Hotels WHERE rating > 4) SELECT name FROM cheap" ; "cte")]
    #[test_case("SELECT * FROM (SELECT name FROM Attractions) AS t" ; "subquery")]
    #[test_case("SELECT name FROM Hotels WHERE description = 'Update: drop-off; free'" ; "keywords inside literal")]
    #[test_case("SELECT COUNT(*) FROM \"Hotels\"" ; "quoted table")]
    #[test_case("SELECT 1" ; "no table")]
    #[test_case("SELECT * FROM(Hotels)" ; "parenthesized allowed table")]
    #[test_case("SELECT h.name FROM\"Hotels\" AS h, [Vehicles] v" ; "glued and bracketed")]
    #[test_case("SELECT * FROM main.Hotels" ; "schema qualified allowed")]
    #[test_case("SELECT name FROM Hotels WHERE rating IS NOT DISTINCT FROM 4.5" ; "distinct from")]
    #[test_case("SELECT * FROM Hotels LEFT OUTER JOIN Availability ON Availability.entity_id = Hotels.id" ; "outer join")]
    fn test_accepts(sql: &str) {
        let result = guard().validate(sql);
        assert!(result.is_ok(), "expected accept for {sql}: {result:?}");
    }

    #[test_case("DROP TABLE Hotels", "begin with" ; "drop")]
    #[test_case("SELECT * FROM Hotels; DELETE FROM Hotels", "multiple statements" ; "stacked delete")]
    #[test_case("SELECT * FROM SecretTable", "SecretTable" ; "unknown table")]
    #[test_case("SELECT * FROM Hotels, SecretTable", "secrettable" ; "unknown table in comma list")]
    #[test_case("SELECT * FROM Hotels JOIN Users ON 1=1", "users" ; "unknown joined table")]
    #[test_case("SELECT * FROM (SELECT * FROM sqlite_master)", "sqlite_master" ; "schema via subquery")]
    #[test_case("WITH x AS (DELETE FROM Hotels RETURNING *) SELECT * FROM x", "DELETE" ; "mutating cte")]
    #[test_case("SELECT * FROM pragma_table_info('Hotels')", "pragma_table_info" ; "table function")]
    #[test_case("PRAGMA table_info(Hotels)", "begin with" ; "pragma")]
    #[test_case("SELECT * FROM Hotels -- comment", "comments" ; "comment")]
    #[test_case("   ", "empty" ; "blank")]
    #[test_case("SELECT replace(name, 'a', 'b') FROM Hotels", "REPLACE" ; "replace keyword")]
    #[test_case("SELECT name, sql FROM\"sqlite_master\"", "sqlite_master" ; "quoted table glued to from")]
    #[test_case("SELECT * FROM Hotels JOIN\"sqlite_master\" ON 1=1", "sqlite_master" ; "quoted table glued to join")]
    #[test_case("SELECT * FROM Hotels WHERE id IN (SELECT 1 FROM\"sqlite_master\")", "sqlite_master" ; "glued table in subquery")]
    #[test_case("SELECT * FROM[sqlite_master]", "sqlite_master" ; "bracketed table glued to from")]
    #[test_case("SELECT * FROM`sqlite_master`", "sqlite_master" ; "backticked table glued to from")]
    #[test_case("SELECT * FROM(sqlite_master)", "sqlite_master" ; "parenthesized table")]
    #[test_case("SELECT * FROM ((Hotels, sqlite_master))", "sqlite_master" ; "nested parenthesized list")]
    #[test_case("SELECT * FROM main.sqlite_master", "sqlite_master" ; "schema qualified")]
    #[test_case("SELECT * FROM \"main\" . \"sqlite_master\"", "sqlite_master" ; "quoted schema qualified")]
    #[test_case("SELECT * FROM (SELECT 1) AS t, sqlite_master", "sqlite_master" ; "table after subquery")]
    #[test_case("SELECT * FROM 'sqlite_master'", "could not read" ; "string literal as table")]
    #[test_case("SELECT * FROM", "not followed by a table" ; "dangling from")]
    #[test_case("SELECT * FROM Hotels JOIN", "not followed by a table" ; "dangling join")]
    #[test_case("SELECT * FROM \"Hotels", "unterminated" ; "unterminated identifier")]
    #[test_case("SELECT * FROM (Hotels", "unbalanced" ; "unbalanced parenthesis")]
    fn test_rejects(sql: &str, reason: &str) {
        let err = guard()
            .validate(sql)
            .err()
            .unwrap_or_else(|| unreachable!("expected rejection for {sql}"));
        let text = err.to_string();
        assert!(
            text.to_lowercase().contains(&reason.to_lowercase()),
            "rejection for {sql} should mention {reason}: {text}"
        );
    }

    #[test]
    fn test_strips_trailing_semicolon() {
        let sql = guard()
            .validate("  SELECT * FROM Hotels ;  ")
            .unwrap_or_default();
        assert_eq!(sql, "SELECT * FROM Hotels");
    }

    #[test]
    fn test_rejects_overlong_query() {
        let sql = format!("SELECT * FROM Hotels WHERE name = '{}'", "x".repeat(MAX_QUERY_LEN));
        assert!(guard().validate(&sql).is_err());
    }
}
