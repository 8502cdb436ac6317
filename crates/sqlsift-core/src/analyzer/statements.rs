//! Per-statement scanners
//!
//! Each scanner takes normalized text (see [`super::normalize`]) and either
//! produces a complete [`ParsedRecord`] or a [`ParseError`]. There is no
//! partial result: a missing delimiter fails the whole statement.

use crate::error::{ParseError, Result};
use crate::inventory::{sanitize_identifier, ParsedRecord, TableName};

const SELECT_KEYWORD: &str = "select ";
const FROM_KEYWORD: &str = " from ";
const SET_KEYWORD: &str = " set ";
const WHERE_KEYWORD: &str = " where ";
const VALUES_KEYWORD: &str = " values";
const CLOSED_VALUES_KEYWORD: &str = ")values";

/// Clauses that may follow a WHERE clause and never hold filter columns
const WHERE_TERMINATORS: [&str; 3] = [" order by ", " group by ", " limit "];

/// Words that survive in a raw WHERE clause but never name a column
const WHERE_KEYWORDS: [&str; 15] = [
    "and", "or", "not", "is", "null", "in", "between", "like", "exists", "order", "by", "asc",
    "desc", "group", "limit",
];

/// Split a normalized SELECT into one segment per `select ` occurrence.
///
/// The first segment always starts at the beginning of the text, so a
/// statement whose `union` keyword was stripped yields one segment per
/// branch, and a subquery yields its own segment.
pub fn select_segments(normalized: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = normalized
        .match_indices(SELECT_KEYWORD)
        .map(|(i, _)| i)
        .filter(|i| *i > 0)
        .collect();
    starts.insert(0, 0);

    let mut segments = Vec::with_capacity(starts.len());
    for (n, start) in starts.iter().enumerate() {
        let end = starts.get(n + 1).copied().unwrap_or(normalized.len());
        segments.push(normalized[*start..end].trim());
    }
    segments
}

/// Extract schema, table and selected columns from one SELECT segment
pub fn parse_select(segment: &str) -> Result<ParsedRecord> {
    let body = segment
        .strip_prefix("select")
        .ok_or_else(|| ParseError::malformed("expected 'select'"))?;
    let from_at = body
        .find(FROM_KEYWORD)
        .ok_or_else(|| ParseError::malformed("missing 'from'"))?;

    let target = body[from_at + FROM_KEYWORD.len()..]
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::malformed("missing table after 'from'"))?;
    let name = qualified_table(target)?;

    let columns = split_select_list(body[..from_at].trim())?;
    ParsedRecord::new(&name.schema, &name.table, columns)
}

/// Break a select list into raw column expressions.
///
/// A lone call such as `count(*)` or `max(o.price)` contributes the text
/// inside its parentheses. Otherwise the list is split on commas, and when
/// qualifiers are present only the part after each `.` is kept.
fn split_select_list(list: &str) -> Result<Vec<String>> {
    if list.contains('(') && !list.contains(',') {
        let open = list.find('(').unwrap_or_default();
        let close = list[open..]
            .find(')')
            .map(|i| open + i)
            .ok_or_else(|| ParseError::malformed("unbalanced parenthesis in column list"))?;
        return Ok(vec![list[open + 1..close].to_string()]);
    }

    match list.matches('.').count() {
        0 => Ok(split_on_commas(list)),
        1 => Ok(split_on_commas(list)
            .into_iter()
            .map(|column| match column.split_once('.') {
                Some((_, bare)) => bare.trim().to_string(),
                None => column,
            })
            .collect()),
        _ => Ok(list
            .split('.')
            .skip(1)
            .map(|rest| rest.split([' ', ',']).next().unwrap_or_default().to_string())
            .collect()),
    }
}

/// Extract schema, table and target columns from an INSERT
pub fn parse_insert(normalized: &str) -> Result<ParsedRecord> {
    let rest = normalized
        .strip_prefix("insert")
        .map(str::trim_start)
        .and_then(|r| r.strip_prefix("into"))
        .ok_or_else(|| ParseError::malformed("expected 'insert into'"))?
        .trim_start();

    let target_end = rest
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(rest.len());
    let name = qualified_table(&rest[..target_end])?;

    let tail = &rest[target_end..];
    // `(a, b)values (...)` has no space before the keyword
    let values_at = [
        tail.find(VALUES_KEYWORD),
        tail.find(CLOSED_VALUES_KEYWORD).map(|i| i + 1),
    ]
    .into_iter()
    .flatten()
    .min()
    .ok_or_else(|| ParseError::malformed("missing 'values'"))?;

    let columns = split_on_commas(tail[..values_at].trim());
    ParsedRecord::new(&name.schema, &name.table, columns)
}

/// Extract schema, table and assigned columns from an UPDATE
pub fn parse_update(normalized: &str) -> Result<ParsedRecord> {
    let rest = normalized
        .strip_prefix("update")
        .ok_or_else(|| ParseError::malformed("expected 'update'"))?;
    let target = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::malformed("missing table after 'update'"))?;
    let name = qualified_table(target)?;

    let set_at = rest
        .find(SET_KEYWORD)
        .ok_or_else(|| ParseError::malformed("missing 'set'"))?;
    let mut assignments = &rest[set_at + SET_KEYWORD.len()..];
    if let Some(where_at) = assignments.find(WHERE_KEYWORD) {
        assignments = &assignments[..where_at];
    }

    let mut columns = Vec::new();
    for assignment in assignments.split(',') {
        let (column, _) = assignment
            .split_once('=')
            .ok_or_else(|| ParseError::malformed("assignment without '='"))?;
        columns.push(column.trim().to_string());
    }
    ParsedRecord::new(&name.schema, &name.table, columns)
}

/// Collect the column side of every comparison in a WHERE clause.
///
/// Takes lower-cased statement text. The clause ends at a nested
/// `select `, at `;`, or where an `order by`, `group by` or `limit` clause
/// begins. Returns `None` when there is no clause or nothing in it looks
/// like a column.
pub fn extract_where_columns(statement: &str) -> Option<Vec<String>> {
    let start = statement.find(WHERE_KEYWORD)? + WHERE_KEYWORD.len();
    let mut clause = &statement[start..];
    if let Some(end) = clause.find(SELECT_KEYWORD) {
        clause = &clause[..end];
    }
    if let Some(end) = clause.find(';') {
        clause = &clause[..end];
    }
    for terminator in WHERE_TERMINATORS {
        if let Some(end) = clause.find(terminator) {
            clause = &clause[..end];
        }
    }

    let clause: String = clause
        .trim()
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .collect();
    let remainder = strip_compared_values(clause);

    let mut columns: Vec<String> = Vec::new();
    for token in remainder.split_whitespace() {
        let bare = token.rsplit('.').next().unwrap_or(token);
        let column = sanitize_identifier(bare);
        if column.is_empty() || WHERE_KEYWORDS.contains(&column.as_str()) {
            continue;
        }
        if !columns.contains(&column) {
            columns.push(column);
        }
    }

    if columns.is_empty() {
        None
    } else {
        Some(columns)
    }
}

/// Remove every `= value` / `=value` fragment, leaving the left-hand sides
fn strip_compared_values(mut clause: String) -> String {
    while let Some(eq) = clause.find('=') {
        let after = eq + 1;
        let value_start = if clause[after..].starts_with(' ') {
            after + 1
        } else {
            after
        };
        clause = match clause[value_start..].find(' ') {
            Some(offset) => {
                let value_end = value_start + offset;
                format!("{}{}", &clause[..eq], &clause[value_end..])
            }
            None => clause[..eq].to_string(),
        };
    }
    clause
}

fn split_on_commas(list: &str) -> Vec<String> {
    list.split(',').map(|c| c.trim().to_string()).collect()
}

fn qualified_table(token: &str) -> Result<TableName> {
    TableName::parse(token).ok_or_else(|| {
        ParseError::malformed(format!("table reference '{}' has no schema", token))
    })
}
