use crate::model::Cell;

/// Outcome of price normalization. On failure `value` is `0.0` and `error`
/// names the residue; the caller must keep the original raw text beside the
/// zero so the row stays auditable.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPrice {
    pub value: f64,
    pub error: Option<String>,
}

impl ParsedPrice {
    fn ok(value: f64) -> Self {
        Self { value, error: None }
    }

    fn failed(msg: impl Into<String>) -> Self {
        Self {
            value: 0.0,
            error: Some(msg.into()),
        }
    }
}

/// Normalize a heterogeneous price literal. Numeric cells pass through
/// untouched; text goes through separator normalization.
pub fn parse(cell: &Cell) -> ParsedPrice {
    match cell {
        Cell::Number(n) => ParsedPrice::ok(*n),
        Cell::Empty => ParsedPrice::failed("empty price"),
        Cell::Text(s) => parse_text(s),
    }
}

/// Normalize a textual price literal: strip a leading `$` and internal
/// spaces, rewrite separators, parse as decimal.
pub fn parse_text(raw: &str) -> ParsedPrice {
    let trimmed = raw.trim();
    let no_currency = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let compact: String = no_currency.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return ParsedPrice::failed("empty price");
    }
    match normalize_separators(&compact).parse::<f64>() {
        Ok(v) => ParsedPrice::ok(v),
        Err(_) => ParsedPrice::failed(format!("cannot parse price '{trimmed}'")),
    }
}

/// Rewrite thousands/decimal separators into plain `.`-decimal form.
///
/// Upstream data mixes three conventions: `1234.56` (plain), `1.234,56`
/// (dot thousands, comma decimal), and comma-only strings where a final
/// `,dd` is the decimal separator and every other comma groups thousands.
fn normalize_separators(s: &str) -> String {
    let last_dot = s.rfind('.');
    let last_comma = s.rfind(',');

    match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if comma > dot => {
            // European: dots group thousands, the comma is the decimal point
            s.chars()
                .filter(|c| *c != '.')
                .map(|c| if c == ',' { '.' } else { c })
                .collect()
        }
        (Some(_), Some(_)) => {
            // American with comma grouping
            s.chars().filter(|c| *c != ',').collect()
        }
        (None, Some(comma)) => {
            let tail = &s[comma + 1..];
            if tail.len() == 2 && tail.chars().all(|c| c.is_ascii_digit()) {
                let head: String = s[..comma].chars().filter(|c| *c != ',').collect();
                format!("{head}.{tail}")
            } else {
                s.chars().filter(|c| *c != ',').collect()
            }
        }
        _ => s.to_string(),
    }
}
