//! Canonical query printing.
//!
//! Renders an AST back into query-string form: a single string-builder
//! walk, one space between siblings, ` AND `/` OR ` separators, and the
//! surface form of every leaf exactly as the parser reads it. For
//! parser-produced trees the output re-parses to a structurally equal
//! tree.

use std::fmt;

use crate::ast::{Query, WildcardPart};

/// Renders a single query in canonical textual form.
pub fn print(query: &Query) -> String {
    let mut out = String::new();
    write_query(query, &mut out);
    out
}

/// Renders a top-level sequence, joining the queries with single spaces.
pub fn print_multi(queries: &[Query]) -> String {
    let mut out = String::new();
    write_joined(queries, " ", &mut out);
    out
}

fn write_query(query: &Query, out: &mut String) {
    match query {
        Query::Term(s) => out.push_str(s),
        Query::Phrase(s) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        Query::Prefix(stem) => {
            out.push_str(stem);
            out.push('*');
        }
        Query::Proximity { phrase, distance } => {
            out.push('"');
            out.push_str(phrase);
            out.push_str("\"~");
            out.push_str(&distance.to_string());
        }
        Query::Fuzzy { term, distance } => {
            out.push_str(term);
            out.push('~');
            if let Some(distance) = distance {
                out.push_str(&distance.to_string());
            }
        }
        Query::Regex(s) => {
            out.push('/');
            for ch in s.chars() {
                if ch == '/' {
                    out.push('\\');
                }
                out.push(ch);
            }
            out.push('/');
        }
        Query::Range {
            lower,
            upper,
            lower_inclusive,
            upper_inclusive,
        } => {
            out.push(if *lower_inclusive { '[' } else { '{' });
            out.push_str(lower.as_deref().unwrap_or("*"));
            out.push_str(" TO ");
            out.push_str(upper.as_deref().unwrap_or("*"));
            out.push(if *upper_inclusive { ']' } else { '}' });
        }
        Query::Wildcard(parts) => {
            for part in parts {
                match part {
                    WildcardPart::Str(s) => out.push_str(s),
                    WildcardPart::SingleChar => out.push('?'),
                    WildcardPart::ManyChar => out.push('*'),
                }
            }
        }
        Query::And(queries) => write_joined(queries, " AND ", out),
        Query::Or(queries) => write_joined(queries, " OR ", out),
        Query::Not(query) => {
            out.push_str("NOT ");
            write_query(query, out);
        }
        Query::Group(queries) => {
            out.push('(');
            write_joined(queries, " ", out);
            out.push(')');
        }
        Query::UnaryPlus(query) => {
            out.push('+');
            write_query(query, out);
        }
        Query::UnaryMinus(query) => {
            out.push('-');
            write_query(query, out);
        }
        Query::Field { name, query } => {
            out.push_str(name);
            out.push(':');
            write_query(query, out);
        }
        Query::Boost { query, factor } => {
            write_query(query, out);
            out.push('^');
            out.push_str(&factor.to_string());
        }
        Query::MinimumMatch { queries, minimum } => {
            out.push('(');
            write_joined(queries, " ", out);
            out.push_str(")@");
            out.push_str(&minimum.to_string());
        }
    }
}

fn write_joined(queries: &[Query], separator: &str, out: &mut String) {
    for (i, query) in queries.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        write_query(query, out);
    }
}

impl fmt::Display for Query {
    /// The canonical printed form, identical to [`print`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print(self))
    }
}
