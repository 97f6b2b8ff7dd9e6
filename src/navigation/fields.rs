//! Fixed width numeric fields of NAV continuation lines
use regex::Regex;

use crate::error::ParsingError;

/// Width of one numeric field
pub const FIELD_WIDTH: usize = 19;

/// Maximal number of fields per continuation line
pub const FIELDS_PER_LINE: usize = 4;

/// Inline comment delimiter
pub const COMMENT_MARKER: char = '$';

lazy_static! {
    static ref NUMBER: Regex =
        Regex::new(r"[+-]?(?:\d+\.?\d*|\.\d+)(?:[EeDd][+-]?\d+)?").unwrap();
}

/// Parses one numeric field. Both `D` and `E` exponent markers are accepted.
pub fn parse_float(content: &str) -> Result<f64, ParsingError> {
    let trimmed = content.trim();
    trimmed
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .map_err(|_| ParsingError::FloatField(trimmed.to_string()))
}

/// Parses a numeric field which may be omitted (blank)
pub(crate) fn parse_optional_float(content: &str) -> Result<f64, ParsingError> {
    if content.trim().is_empty() {
        Ok(0.0)
    } else {
        parse_float(content)
    }
}

/// Removes the inline comment, if any, and trailing whitespaces
pub fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_MARKER) {
        Some(offset) => line[..offset].trim_end(),
        None => line.trim_end(),
    }
}

/// Fixed width attempt: every 19 character column is either blank or a number.
/// Blank columns are omitted fields, trailing ones are dropped.
fn column_fields(body: &str) -> Option<Vec<f64>> {
    if !body.is_ascii() {
        return None;
    }
    let mut fields = Vec::with_capacity(FIELDS_PER_LINE);
    let mut rem = body;
    while !rem.is_empty() {
        let (field, next) = rem.split_at(FIELD_WIDTH.min(rem.len()));
        if field.trim().is_empty() {
            fields.push(None);
        } else {
            fields.push(Some(parse_float(field).ok()?));
        }
        rem = next;
    }
    while let Some(None) = fields.last() {
        fields.pop();
    }
    Some(fields.into_iter().map(|f| f.unwrap_or(0.0)).collect())
}

/// Free form attempt: whitespace separated tokens,
/// where adjacent numbers may only be separated by their sign.
fn token_fields(body: &str) -> Result<Vec<f64>, ParsingError> {
    let mut fields = Vec::with_capacity(FIELDS_PER_LINE);
    for token in body.split_whitespace() {
        let mut offset = 0;
        for item in NUMBER.find_iter(token) {
            if item.start() != offset {
                return Err(ParsingError::FloatField(token.to_string()));
            }
            fields.push(parse_float(item.as_str())?);
            offset = item.end();
        }
        if offset != token.len() {
            return Err(ParsingError::FloatField(token.to_string()));
        }
    }
    Ok(fields)
}

/// Parses one continuation line into its numeric fields.
/// `indent` is the number of leading blank columns of the layout,
/// only stripped when actually blank.
/// Comments are removed first. Blank lines return no fields.
pub fn parse_fields(line: &str, indent: usize) -> Result<Vec<f64>, ParsingError> {
    let content = strip_comment(line);
    let body = match content.get(..indent) {
        Some(prefix) if prefix.trim().is_empty() => &content[indent..],
        _ => content,
    };
    let fields = match column_fields(body) {
        Some(fields) => fields,
        None => token_fields(body)?,
    };
    if fields.len() > FIELDS_PER_LINE {
        return Err(ParsingError::TooManyFields(content.trim().to_string()));
    }
    Ok(fields)
}

/// Formats one numeric field: 19 characters, 12 digits mantissa,
/// `D` marker and 2 digit exponent.
pub fn format_field(value: f64) -> String {
    let formatted = format!("{:.12E}", value);
    match formatted.split_once('E') {
        Some((mantissa, exponent)) => {
            let exponent = exponent.parse::<i32>().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!(
                "{:>width$}",
                format!("{}D{}{:02}", mantissa, sign, exponent.abs()),
                width = FIELD_WIDTH
            )
        },
        None => format!("{:>width$}", formatted, width = FIELD_WIDTH),
    }
}
