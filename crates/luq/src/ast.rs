//! Query abstract syntax tree.
//!
//! Trees are immutable values: the parser produces them, the printer and any
//! downstream consumers read them. Leaf variants (term queries) carry no
//! sub-queries; compound variants own their children behind `Box`/`Vec`
//! indirection so the enum stays a bounded size.

use serde::{Deserialize, Serialize};

/// One atom of a wildcard term, in input order.
///
/// `p?og*am` decomposes into `[Str("p"), SingleChar, Str("og"), ManyChar,
/// Str("am")]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardPart {
    /// A literal run of characters.
    Str(String),

    /// `?` - matches exactly one character.
    SingleChar,

    /// `*` - matches any run of characters, including the empty run.
    ManyChar,
}

/// A parsed query expression.
///
/// The top level of a parse is a non-empty sequence of these; whitespace
/// between top-level queries is implicit concatenation and carries no
/// boolean semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// A bare search term.
    Term(String),

    /// A quoted multi-word literal.
    Phrase(String),

    /// `word*` - matches terms starting with the stem.
    Prefix(String),

    /// `"..."~n` - phrase match allowing `distance` intervening words.
    Proximity {
        /// The phrase text, without quotes.
        phrase: String,
        /// Maximum number of intervening words.
        distance: u32,
    },

    /// `word~` or `word~n` - approximate match with optional edit distance.
    Fuzzy {
        /// The term to match approximately.
        term: String,
        /// Edit distance; `None` when written as a bare `word~`.
        distance: Option<u32>,
    },

    /// `/.../` - a regular expression term. The inner text is stored with
    /// `\/` escapes resolved; the printer re-applies them.
    Regex(String),

    /// A term interval such as `[a TO b]` or `{2020 TO *}`.
    ///
    /// Open ends are `None` (written `*`); bracket shape per side records
    /// inclusivity (`[`/`]` inclusive, `{`/`}` exclusive). Bounds are never
    /// empty strings.
    Range {
        /// Lower bound, or `None` for an open end.
        lower: Option<String>,
        /// Upper bound, or `None` for an open end.
        upper: Option<String>,
        /// Whether the lower bound is included.
        lower_inclusive: bool,
        /// Whether the upper bound is included.
        upper_inclusive: bool,
    },

    /// A term containing `*`/`?` wildcards, decomposed into parts.
    /// The part list is never empty.
    Wildcard(Vec<WildcardPart>),

    /// Conjunction: all sub-queries must match. Always holds at least two.
    And(Vec<Query>),

    /// Disjunction: at least one sub-query must match. Always holds at
    /// least two.
    Or(Vec<Query>),

    /// Negation: results must NOT match the inner query.
    Not(Box<Query>),

    /// A parenthesised group holding the group's full inner sequence.
    /// A group around a single query is the singleton list.
    Group(Vec<Query>),

    /// `+q` - the inner query must be present.
    UnaryPlus(Box<Query>),

    /// `-q` - the inner query must be absent.
    UnaryMinus(Box<Query>),

    /// `name:q` - restricts the inner query to the named field.
    Field {
        /// Field name; non-empty, starts with a letter, never a reserved
        /// operator word.
        name: String,
        /// The query scoped to the field.
        query: Box<Query>,
    },

    /// `q^f` - multiplies the inner query's score by `factor`.
    Boost {
        /// The boosted query.
        query: Box<Query>,
        /// Boost factor; non-negative and finite.
        factor: f64,
    },

    /// `(q1 q2 ... qk)@n` - at least `minimum` of the inner queries must
    /// match. The inner sequence is never empty.
    MinimumMatch {
        /// The candidate queries.
        queries: Vec<Query>,
        /// How many of them must match.
        minimum: u32,
    },
}

impl Query {
    /// Creates an And query, flattening nested Ands and unwrapping a
    /// singleton.
    ///
    /// # Panics
    ///
    /// Panics on an empty list; an under-length conjunction is a
    /// programming error.
    pub fn and(queries: Vec<Self>) -> Self {
        let flattened: Vec<Self> = queries
            .into_iter()
            .flat_map(|q| match q {
                Self::And(inner) => inner,
                other => vec![other],
            })
            .collect();

        match flattened.len() {
            0 => panic!("And requires at least one sub-query"),
            1 => flattened.into_iter().next().unwrap(),
            _ => Self::And(flattened),
        }
    }

    /// Creates an Or query, flattening nested Ors and unwrapping a
    /// singleton.
    ///
    /// # Panics
    ///
    /// Panics on an empty list; an under-length disjunction is a
    /// programming error.
    pub fn or(queries: Vec<Self>) -> Self {
        let flattened: Vec<Self> = queries
            .into_iter()
            .flat_map(|q| match q {
                Self::Or(inner) => inner,
                other => vec![other],
            })
            .collect();

        match flattened.len() {
            0 => panic!("Or requires at least one sub-query"),
            1 => flattened.into_iter().next().unwrap(),
            _ => Self::Or(flattened),
        }
    }

    /// Creates a negation.
    pub fn not(query: Self) -> Self {
        Self::Not(Box::new(query))
    }

    /// Creates a field-scoped query.
    pub fn field(name: impl Into<String>, query: Self) -> Self {
        Self::Field {
            name: name.into(),
            query: Box::new(query),
        }
    }

    /// Creates a boosted query.
    pub fn boost(query: Self, factor: f64) -> Self {
        Self::Boost {
            query: Box::new(query),
            factor,
        }
    }

    /// Whether this node is a leaf (term query) rather than a compound.
    pub fn is_term(&self) -> bool {
        matches!(
            self,
            Self::Term(_)
                | Self::Phrase(_)
                | Self::Prefix(_)
                | Self::Proximity { .. }
                | Self::Fuzzy { .. }
                | Self::Regex(_)
                | Self::Range { .. }
                | Self::Wildcard(_)
        )
    }

    /// Returns the rightmost leaf of this tree.
    pub fn last_term(&self) -> Option<&Self> {
        match self {
            q if q.is_term() => Some(q),
            Self::And(qs) | Self::Or(qs) | Self::Group(qs) => {
                qs.iter().rev().find_map(Self::last_term)
            }
            Self::MinimumMatch { queries, .. } => queries.iter().rev().find_map(Self::last_term),
            Self::Not(q) | Self::UnaryPlus(q) | Self::UnaryMinus(q) => q.last_term(),
            Self::Field { query, .. } | Self::Boost { query, .. } => query.last_term(),
            _ => unreachable!("is_term covers every leaf variant"),
        }
    }

    /// Calls `f` on every leaf of this tree, in input order.
    pub fn for_each_term<F: FnMut(&Self)>(&self, f: &mut F) {
        match self {
            q if q.is_term() => f(q),
            Self::And(qs) | Self::Or(qs) | Self::Group(qs) => {
                for q in qs {
                    q.for_each_term(f);
                }
            }
            Self::MinimumMatch { queries, .. } => {
                for q in queries {
                    q.for_each_term(f);
                }
            }
            Self::Not(q) | Self::UnaryPlus(q) | Self::UnaryMinus(q) => q.for_each_term(f),
            Self::Field { query, .. } | Self::Boost { query, .. } => query.for_each_term(f),
            _ => unreachable!("is_term covers every leaf variant"),
        }
    }
}
