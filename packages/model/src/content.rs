//! # Content Expressions
//!
//! A node type's content expression states what sequences of children
//! it accepts. The language is a flat sequence of terms, where each
//! term names a node type or a group and carries a count:
//!
//! ```text
//! block+                    one or more nodes in the block group
//! inline*                   any number of inline nodes
//! table_colgroup? table_body
//! table_row{3,}             at least three rows
//! heading{1,2}              one or two headings
//! ```
//!
//! Choice (`|`) and grouping parentheses are not part of the language.
//! Group names are expanded to the concrete member types when a schema
//! is compiled, so matching only ever deals with type indices.

use crate::error::SchemaError;

/// Count for an unbounded term, as in `*` or `+`.
pub(crate) const MANY: u32 = u32::MAX;

/// A parsed term before name resolution: a raw name plus counts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawTerm {
    pub name: String,
    pub min: u32,
    pub max: u32,
}

/// A term with its name resolved to concrete node type indices.
#[derive(Debug, Clone)]
pub(crate) struct ContentTerm {
    pub types: Vec<usize>,
    pub min: u32,
    pub max: u32,
}

/// A compiled content expression, ready to match child sequences.
#[derive(Debug, Clone)]
pub(crate) struct ContentExpr {
    pub source: String,
    pub terms: Vec<ContentTerm>,
}

impl ContentExpr {
    /// Whether `children` (as node type indices) satisfies every term
    /// in order, consuming the whole sequence.
    pub fn matches(&self, children: &[usize]) -> bool {
        self.match_from(0, children, 0)
    }

    // Greedy with backtracking: each term first absorbs as many
    // children as it may, then gives them back one at a time until the
    // remaining terms can finish the sequence.
    fn match_from(&self, term_index: usize, children: &[usize], child_index: usize) -> bool {
        if term_index == self.terms.len() {
            return child_index == children.len();
        }
        let term = &self.terms[term_index];
        let mut can_take = 0usize;
        while child_index + can_take < children.len()
            && (can_take as u32) < term.max
            && term.types.contains(&children[child_index + can_take])
        {
            can_take += 1;
        }
        let min = term.min as usize;
        if min > can_take {
            return false;
        }
        for take in (min..=can_take).rev() {
            if self.match_from(term_index + 1, children, child_index + take) {
                return true;
            }
        }
        false
    }
}

/// Splits a content expression source into raw terms.
pub(crate) fn parse_content_expr(source: &str) -> Result<Vec<RawTerm>, SchemaError> {
    let error = |detail: String| SchemaError::ContentExpr {
        expr: source.to_string(),
        detail,
    };
    let mut terms = Vec::new();
    for token in source.split_whitespace() {
        let name_len = token
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(token.len());
        let (name, suffix) = token.split_at(name_len);
        if name.is_empty() {
            return Err(error(format!("expected a type or group name, found {:?}", token)));
        }
        let (min, max) = parse_count(suffix).map_err(error)?;
        terms.push(RawTerm {
            name: name.to_string(),
            min,
            max,
        });
    }
    Ok(terms)
}

fn parse_count(suffix: &str) -> Result<(u32, u32), String> {
    match suffix {
        "" => Ok((1, 1)),
        "?" => Ok((0, 1)),
        "*" => Ok((0, MANY)),
        "+" => Ok((1, MANY)),
        _ if suffix.starts_with('|') || suffix.starts_with('(') => Err(
            "choice and grouping operators are not supported, only sequences with counts"
                .to_string(),
        ),
        _ => {
            let inner = suffix
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
                .ok_or_else(|| format!("invalid count suffix {:?}", suffix))?;
            let parse = |text: &str| {
                text.parse::<u32>()
                    .map_err(|_| format!("invalid count {:?}", text))
            };
            match inner.split_once(',') {
                None => {
                    let exact = parse(inner)?;
                    Ok((exact, exact))
                }
                Some((low, "")) => Ok((parse(low)?, MANY)),
                Some((low, high)) => {
                    let (min, max) = (parse(low)?, parse(high)?);
                    if max < min {
                        return Err(format!("count range {{{},{}}} is inverted", min, max));
                    }
                    Ok((min, max))
                }
            }
        }
    }
}
