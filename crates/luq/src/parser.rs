//! Query parser.
//!
//! Parses a token stream into the query AST using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! input    := sequence EOF
//! sequence := chain+                                  // implicit concatenation
//! chain    := query (("AND" | "&&" | "OR" | "||") query)*
//! query    := ("NOT" | "!" | "+" | "-") query | primary
//! primary  := field | group | leaf
//! field    := WORD ":" (leaf | group)
//! group    := "(" sequence ")" ("@" NUM)? ("^" FLOAT)?
//! leaf     := (word | phrase ("~" NUM)? | regex | range) ("^" FLOAT)?
//! range    := ("[" | "{") bound "TO" bound ("]" | "}")
//! bound    := WORD | "*"
//! ```
//!
//! Whitespace between top-level chains is implicit concatenation: it
//! carries no boolean semantics and each chain becomes its own entry in
//! the returned sequence. Within a chain, AND binds tighter than OR (see
//! [`crate::assoc`]).

use crate::assoc::{self, BinaryOp};
use crate::ast::{Query, WildcardPart};
use crate::error::ParseError;
use crate::lexer::{SpannedToken, Token, tokenize};

/// Default limit on query nesting depth.
const DEFAULT_MAX_DEPTH: usize = 1024;

/// Parser configuration.
///
/// ```
/// use luq::ParseOptions;
///
/// let queries = ParseOptions::new().with_max_depth(16).parse("a AND b").unwrap();
/// assert_eq!(queries.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Creates the default options: nesting depth limited to 1024.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nesting depth limit. Groups and unary operators each add a
    /// level; exceeding the limit yields [`ParseError::DepthExceeded`]
    /// rather than exhausting the stack.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses a query string under these options.
    pub fn parse(&self, input: &str) -> Result<Vec<Query>, ParseError> {
        let tokens = tokenize(input)?;
        Parser {
            tokens,
            position: 0,
            end_offset: input.len(),
            max_depth: self.max_depth,
        }
        .parse()
    }
}

/// Parses a query string into its top-level sequence.
///
/// The result is never empty: blank input is an error. Whitespace between
/// top-level queries yields sibling entries, so `"a b"` parses to two
/// queries while `"a AND b"` parses to one.
pub fn parse(input: &str) -> Result<Vec<Query>, ParseError> {
    ParseOptions::default().parse(input)
}

/// Recursive descent parser over a spanned token stream.
struct Parser {
    tokens: Vec<SpannedToken>,
    position: usize,
    /// Byte length of the input, used as the offset of end-of-input errors.
    end_offset: usize,
    max_depth: usize,
}

impl Parser {
    fn parse(mut self) -> Result<Vec<Query>, ParseError> {
        if self.tokens.is_empty() {
            return Err(self.unexpected("a query"));
        }

        let queries = self.parse_sequence(0)?;

        if self.position < self.tokens.len() {
            return Err(ParseError::TrailingInput {
                offset: self.offset(),
            });
        }

        Ok(queries)
    }

    /// Parses: sequence := chain+
    fn parse_sequence(&mut self, depth: usize) -> Result<Vec<Query>, ParseError> {
        let mut items = vec![self.parse_chain(depth)?];

        while self.at_query_start() {
            items.push(self.parse_chain(depth)?);
        }

        Ok(items)
    }

    /// Parses one operator chain and folds it through the associator.
    fn parse_chain(&mut self, depth: usize) -> Result<Query, ParseError> {
        let first = self.parse_query(depth)?;
        let mut rest = Vec::new();

        while let Some(op) = self.peek_binary_op() {
            let op_offset = self.offset();
            self.advance();
            if !self.at_query_start() {
                return Err(ParseError::TrailingOperator {
                    offset: op_offset,
                    operator: op.name(),
                });
            }
            rest.push((op, self.parse_query(depth)?));
        }

        Ok(assoc::associate(first, rest))
    }

    /// Parses: query := ("NOT" | "!" | "+" | "-") query | primary
    fn parse_query(&mut self, depth: usize) -> Result<Query, ParseError> {
        if depth >= self.max_depth {
            return Err(ParseError::DepthExceeded {
                offset: self.offset(),
                limit: self.max_depth,
            });
        }

        match self.peek() {
            Some(Token::Not) | Some(Token::Bang) => {
                self.advance();
                Ok(Query::not(self.parse_query(depth + 1)?))
            }
            Some(Token::Plus) => {
                self.advance();
                Ok(Query::UnaryPlus(Box::new(self.parse_query(depth + 1)?)))
            }
            Some(Token::Minus) => {
                self.advance();
                Ok(Query::UnaryMinus(Box::new(self.parse_query(depth + 1)?)))
            }
            _ => self.parse_primary(depth),
        }
    }

    /// Parses: primary := field | group | leaf
    fn parse_primary(&mut self, depth: usize) -> Result<Query, ParseError> {
        match self.peek().cloned() {
            Some(Token::LParen) => self.parse_group(depth),
            Some(Token::Word(word)) => {
                if self.next_is_colon() {
                    self.parse_field(word, depth)
                } else {
                    let start = self.offset();
                    self.advance();
                    let leaf = self.word_leaf(word, start)?;
                    Ok(self.with_boost(leaf))
                }
            }
            Some(Token::Phrase(text)) => {
                let start = self.offset();
                self.advance();
                if matches!(self.peek(), Some(Token::Colon)) {
                    if is_reserved_word(&text) {
                        return Err(ParseError::ReservedFieldName {
                            offset: start,
                            name: text,
                        });
                    }
                    return Err(ParseError::UnexpectedToken {
                        offset: start,
                        expected: "an unquoted field name",
                        found: format!("quoted `{text}`"),
                    });
                }
                let leaf = self.phrase_leaf(text)?;
                Ok(self.with_boost(leaf))
            }
            Some(Token::Regex(text)) => {
                self.advance();
                Ok(self.with_boost(Query::Regex(text)))
            }
            Some(Token::LBracket) | Some(Token::LBrace) => {
                let range = self.parse_range()?;
                Ok(self.with_boost(range))
            }
            Some(other) => Err(ParseError::UnexpectedToken {
                offset: self.offset(),
                expected: "a query",
                found: other.describe(),
            }),
            None => Err(self.unexpected("a query")),
        }
    }

    /// Parses a bare word into its leaf, consulting the trailing-modifier
    /// table: a single trailing `*` is a prefix query, any other wildcard
    /// mix decomposes, `~`/`~n` makes the term fuzzy.
    fn word_leaf(&mut self, word: String, start: usize) -> Result<Query, ParseError> {
        if is_reserved_word(&word) {
            return Err(ParseError::UnexpectedToken {
                offset: start,
                expected: "a term",
                found: format!("reserved word `{word}`"),
            });
        }

        if word.contains(['*', '?']) {
            return Ok(wildcard_leaf(&word));
        }

        if let Some(Token::Tilde(distance)) = self.peek() {
            let distance = *distance;
            self.advance();
            return Ok(Query::Fuzzy {
                term: word,
                distance,
            });
        }

        Ok(Query::Term(word))
    }

    /// Parses a quoted phrase's leaf; `~n` upgrades it to a proximity
    /// query, and the distance is mandatory there.
    fn phrase_leaf(&mut self, text: String) -> Result<Query, ParseError> {
        if let Some(Token::Tilde(distance)) = self.peek() {
            let distance = *distance;
            let offset = self.offset();
            self.advance();
            let Some(distance) = distance else {
                return Err(ParseError::InvalidNumber {
                    offset,
                    found: "`~` without a distance".to_string(),
                });
            };
            return Ok(Query::Proximity {
                phrase: text,
                distance,
            });
        }
        Ok(Query::Phrase(text))
    }

    /// Parses: field := WORD ":" (leaf | group)
    ///
    /// The right-hand side is a single leaf or group, never a sequence:
    /// `fieldName:The cat` scopes only `The` to the field.
    fn parse_field(&mut self, name: String, depth: usize) -> Result<Query, ParseError> {
        let start = self.offset();

        if is_reserved_word(&name) {
            return Err(ParseError::ReservedFieldName {
                offset: start,
                name,
            });
        }
        if !is_valid_field_name(&name) {
            return Err(ParseError::UnexpectedToken {
                offset: start,
                expected: "a field name",
                found: format!("`{name}`"),
            });
        }

        self.advance(); // field name
        self.advance(); // colon

        let value = match self.peek().cloned() {
            Some(Token::LParen) => self.parse_group(depth)?,
            Some(Token::Word(word)) => {
                let start = self.offset();
                self.advance();
                let leaf = self.word_leaf(word, start)?;
                self.with_boost(leaf)
            }
            Some(Token::Phrase(text)) => {
                self.advance();
                let leaf = self.phrase_leaf(text)?;
                self.with_boost(leaf)
            }
            Some(Token::Regex(text)) => {
                self.advance();
                self.with_boost(Query::Regex(text))
            }
            Some(Token::LBracket) | Some(Token::LBrace) => {
                let range = self.parse_range()?;
                self.with_boost(range)
            }
            Some(other) => {
                return Err(ParseError::UnexpectedToken {
                    offset: self.offset(),
                    expected: "a field value",
                    found: other.describe(),
                });
            }
            None => return Err(self.unexpected("a field value")),
        };

        Ok(Query::Field {
            name,
            query: Box::new(value),
        })
    }

    /// Parses: group := "(" sequence ")" ("@" NUM)? ("^" FLOAT)?
    fn parse_group(&mut self, depth: usize) -> Result<Query, ParseError> {
        self.advance(); // consume '('
        let queries = self.parse_sequence(depth + 1)?;

        match self.peek() {
            Some(Token::RParen) => self.advance(),
            Some(other) => {
                return Err(ParseError::UnexpectedToken {
                    offset: self.offset(),
                    expected: "`)`",
                    found: other.describe(),
                });
            }
            None => return Err(self.unexpected("`)`")),
        }

        let grouped = if let Some(Token::At(minimum)) = self.peek() {
            let minimum = *minimum;
            self.advance();
            Query::MinimumMatch { queries, minimum }
        } else {
            Query::Group(queries)
        };

        Ok(self.with_boost(grouped))
    }

    /// Parses: range := ("[" | "{") bound "TO" bound ("]" | "}")
    fn parse_range(&mut self) -> Result<Query, ParseError> {
        let lower_inclusive = matches!(self.peek(), Some(Token::LBracket));
        self.advance(); // consume '[' or '{'

        let lower = self.range_bound()?;

        match self.peek() {
            Some(Token::Word(w)) if w == "TO" => self.advance(),
            Some(other) => {
                return Err(ParseError::UnexpectedToken {
                    offset: self.offset(),
                    expected: "`TO`",
                    found: other.describe(),
                });
            }
            None => return Err(self.unexpected("`TO`")),
        }

        let upper = self.range_bound()?;

        let upper_inclusive = match self.peek() {
            Some(Token::RBracket) => true,
            Some(Token::RBrace) => false,
            Some(other) => {
                return Err(ParseError::UnexpectedToken {
                    offset: self.offset(),
                    expected: "`]` or `}`",
                    found: other.describe(),
                });
            }
            None => return Err(self.unexpected("`]` or `}`")),
        };
        self.advance();

        Ok(Query::Range {
            lower,
            upper,
            lower_inclusive,
            upper_inclusive,
        })
    }

    /// Parses one range bound: a bare word, or `*` for an open end.
    fn range_bound(&mut self) -> Result<Option<String>, ParseError> {
        match self.peek().cloned() {
            Some(Token::Star) => {
                self.advance();
                Ok(None)
            }
            Some(Token::Word(word)) => {
                self.advance();
                Ok(Some(word))
            }
            Some(other) => Err(ParseError::UnexpectedToken {
                offset: self.offset(),
                expected: "a range bound or `*`",
                found: other.describe(),
            }),
            None => Err(self.unexpected("a range bound or `*`")),
        }
    }

    /// Wraps the query in a boost if a `^f` suffix follows.
    fn with_boost(&mut self, query: Query) -> Query {
        if let Some(Token::Caret(factor)) = self.peek() {
            let factor = *factor;
            self.advance();
            return Query::boost(query, factor);
        }
        query
    }

    /// Whether the current token can start a query.
    fn at_query_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Word(_))
                | Some(Token::Phrase(_))
                | Some(Token::Regex(_))
                | Some(Token::LParen)
                | Some(Token::LBracket)
                | Some(Token::LBrace)
                | Some(Token::Not)
                | Some(Token::Bang)
                | Some(Token::Plus)
                | Some(Token::Minus)
        )
    }

    fn peek_binary_op(&self) -> Option<BinaryOp> {
        match self.peek() {
            Some(Token::And) => Some(BinaryOp::And),
            Some(Token::Or) => Some(BinaryOp::Or),
            _ => None,
        }
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|t| &t.token)
    }

    /// Whether the token after the current one is a colon (the one-token
    /// lookahead that distinguishes a field qualifier from a bare term).
    fn next_is_colon(&self) -> bool {
        matches!(
            self.tokens.get(self.position + 1).map(|t| &t.token),
            Some(Token::Colon)
        )
    }

    /// Byte offset of the current token, or of end-of-input.
    fn offset(&self) -> usize {
        self.tokens
            .get(self.position)
            .map(|t| t.start)
            .unwrap_or(self.end_offset)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::UnexpectedToken {
            offset: self.offset(),
            expected,
            found: match self.peek() {
                Some(token) => token.describe(),
                None => "end of input".to_string(),
            },
        }
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Decomposes a word containing `*`/`?` into its wildcard leaf.
fn wildcard_leaf(word: &str) -> Query {
    // a single trailing `*` is the dedicated prefix form
    if word.ends_with('*') && word.matches(['*', '?']).count() == 1 {
        return Query::Prefix(word[..word.len() - 1].to_string());
    }

    let mut parts = Vec::new();
    let mut run = String::new();
    for ch in word.chars() {
        match ch {
            '*' | '?' => {
                if !run.is_empty() {
                    parts.push(WildcardPart::Str(std::mem::take(&mut run)));
                }
                parts.push(if ch == '*' {
                    WildcardPart::ManyChar
                } else {
                    WildcardPart::SingleChar
                });
            }
            _ => run.push(ch),
        }
    }
    if !run.is_empty() {
        parts.push(WildcardPart::Str(run));
    }

    Query::Wildcard(parts)
}

fn is_reserved_word(word: &str) -> bool {
    matches!(word, "AND" | "OR" | "NOT")
}

/// Field names are non-empty, start with a letter, and contain only
/// letters, digits and underscores.
fn is_valid_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(s: &str) -> Query {
        Query::Term(s.into())
    }

    fn phrase(s: &str) -> Query {
        Query::Phrase(s.into())
    }

    fn not(q: Query) -> Query {
        Query::not(q)
    }

    fn and(qs: Vec<Query>) -> Query {
        Query::And(qs)
    }

    fn or(qs: Vec<Query>) -> Query {
        Query::Or(qs)
    }

    fn group(qs: Vec<Query>) -> Query {
        Query::Group(qs)
    }

    fn field(name: &str, q: Query) -> Query {
        Query::field(name, q)
    }

    fn boost(q: Query, factor: f64) -> Query {
        Query::boost(q, factor)
    }

    /// Parses input that must yield exactly one top-level query.
    fn parse_one(input: &str) -> Query {
        let mut queries = parse(input).unwrap();
        assert_eq!(queries.len(), 1, "expected one query from {input:?}");
        queries.pop().unwrap()
    }

    #[test]
    fn single_term() {
        assert_eq!(parse("the").unwrap(), vec![term("the")]);
    }

    #[test]
    fn surrounding_whitespace_is_stripped() {
        assert_eq!(
            parse("  \"The cat jumped\"  ").unwrap(),
            vec![phrase("The cat jumped")]
        );
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(parse("a \t\n  b"), parse("a b"));
        assert_eq!(parse("a AND\n b"), parse("a AND b"));
    }

    #[test]
    fn implicit_concatenation_yields_siblings() {
        assert_eq!(
            parse("The cat jumped").unwrap(),
            vec![term("The"), term("cat"), term("jumped")]
        );
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }

    #[test]
    fn field_scopes_a_single_leaf() {
        assert_eq!(
            parse("fieldName:The cat jumped").unwrap(),
            vec![
                field("fieldName", term("The")),
                term("cat"),
                term("jumped")
            ]
        );
    }

    #[test]
    fn field_with_phrase() {
        assert_eq!(
            parse("fieldName:\"The cat jumped\"").unwrap(),
            vec![field("fieldName", phrase("The cat jumped"))]
        );
    }

    #[test]
    fn field_with_group() {
        assert_eq!(
            parse_one("title:(a OR b)"),
            field("title", group(vec![or(vec![term("a"), term("b")])]))
        );
    }

    #[test]
    fn field_with_range() {
        assert_eq!(
            parse_one("year:[2020 TO 2024]"),
            field(
                "year",
                Query::Range {
                    lower: Some("2020".into()),
                    upper: Some("2024".into()),
                    lower_inclusive: true,
                    upper_inclusive: true,
                }
            )
        );
    }

    #[test]
    fn field_value_may_carry_a_boost() {
        assert_eq!(
            parse_one("title:rust^2"),
            field("title", boost(term("rust"), 2.0))
        );
    }

    #[test]
    fn field_names_follow_identifier_rules() {
        assert!(parse("9lives:cat").is_err());
        assert!(parse("a-b:cat").is_err());
        assert_eq!(
            parse_one("track_9:cat"),
            field("track_9", term("cat"))
        );
    }

    #[test]
    fn reserved_field_name_is_rejected() {
        assert_eq!(
            parse("AND:cat").unwrap_err(),
            ParseError::ReservedFieldName {
                offset: 0,
                name: "AND".into()
            }
        );
        assert!(matches!(
            parse("\"AND\":cat").unwrap_err(),
            ParseError::ReservedFieldName { .. }
        ));
        assert!(matches!(
            parse("\"title\":cat").unwrap_err(),
            ParseError::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn reserved_words_standing_alone_are_rejected() {
        assert!(parse("OR").is_err());
        assert!(parse("AND").is_err());
        assert!(parse("NOT").is_err());
        assert!(parse("(AND)").is_err());
    }

    #[test]
    fn trailing_operator_is_rejected() {
        assert_eq!(
            parse("cat OR").unwrap_err(),
            ParseError::TrailingOperator {
                offset: 4,
                operator: "OR"
            }
        );
        assert!(matches!(
            parse("cat AND").unwrap_err(),
            ParseError::TrailingOperator { .. }
        ));
        assert!(matches!(
            parse("cat OR ").unwrap_err(),
            ParseError::TrailingOperator { .. }
        ));
        assert!(matches!(
            parse("(cat OR ) dog").unwrap_err(),
            ParseError::TrailingOperator { .. }
        ));
    }

    #[test]
    fn operator_glued_to_a_delimiter_is_a_term_and_rejected() {
        // without a trailing separator `AND` never becomes an operator, so
        // it surfaces as a reserved term
        let err = parse("a AND(b)").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { offset: 2, .. }));
    }

    #[test]
    fn precedence_and_over_or() {
        assert_eq!(
            parse_one("a AND b OR c"),
            or(vec![and(vec![term("a"), term("b")]), term("c")])
        );
        assert_eq!(
            parse_one("a OR b AND c"),
            or(vec![term("a"), and(vec![term("b"), term("c")])])
        );
    }

    #[test]
    fn same_operator_chains_flatten() {
        assert_eq!(
            parse_one("a AND b AND c"),
            and(vec![term("a"), term("b"), term("c")])
        );
        assert_eq!(
            parse_one("a OR b OR c"),
            or(vec![term("a"), term("b"), term("c")])
        );
    }

    #[test]
    fn symbolic_operator_aliases() {
        assert_eq!(parse("a && b"), parse("a AND b"));
        assert_eq!(parse("a || b"), parse("a OR b"));
        assert_eq!(parse("! a"), parse("NOT a"));
    }

    #[test]
    fn chains_mix_with_implicit_concatenation() {
        assert_eq!(
            parse("derp AND lerp slerp orA OR orB last").unwrap(),
            vec![
                and(vec![term("derp"), term("lerp")]),
                term("slerp"),
                or(vec![term("orA"), term("orB")]),
                term("last"),
            ]
        );
    }

    #[test]
    fn nested_groups_and_fields() {
        assert_eq!(
            parse("(title:test AND (pass OR fail)) AND \"extra phrase\"").unwrap(),
            vec![and(vec![
                group(vec![and(vec![
                    field("title", term("test")),
                    group(vec![or(vec![term("pass"), term("fail")])]),
                ])]),
                phrase("extra phrase"),
            ])]
        );
    }

    #[test]
    fn group_holds_its_inner_sequence() {
        assert_eq!(
            parse_one("(a b c)"),
            group(vec![term("a"), term("b"), term("c")])
        );
        assert_eq!(parse_one("(a)"), group(vec![term("a")]));
    }

    #[test]
    fn group_accepts_trailing_whitespace() {
        assert_eq!(parse("( a b )"), parse("(a b)"));
        assert_eq!(parse_one("(a )"), group(vec![term("a")]));
    }

    #[test]
    fn empty_group_is_an_error() {
        assert!(parse("()").is_err());
    }

    #[test]
    fn unclosed_group_is_an_error() {
        let err = parse("(rust AND go").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                offset: 12,
                expected: "`)`",
                found: "end of input".into()
            }
        );
    }

    #[test]
    fn stray_rparen_is_trailing_input() {
        assert_eq!(
            parse("cat)").unwrap_err(),
            ParseError::TrailingInput { offset: 3 }
        );
    }

    #[test]
    fn minimum_match() {
        assert_eq!(
            parse_one("(a b c)@2"),
            Query::MinimumMatch {
                queries: vec![term("a"), term("b"), term("c")],
                minimum: 2,
            }
        );
    }

    #[test]
    fn minimum_match_with_boost() {
        assert_eq!(
            parse_one("(a b)@1^0.5"),
            boost(
                Query::MinimumMatch {
                    queries: vec![term("a"), term("b")],
                    minimum: 1,
                },
                0.5
            )
        );
    }

    #[test]
    fn group_boost() {
        assert_eq!(
            parse_one("(a b)^2"),
            boost(group(vec![term("a"), term("b")]), 2.0)
        );
    }

    #[test]
    fn unary_operators() {
        assert_eq!(
            parse("+req -excl").unwrap(),
            vec![
                Query::UnaryPlus(Box::new(term("req"))),
                Query::UnaryMinus(Box::new(term("excl"))),
            ]
        );
        assert_eq!(parse_one("!cat"), not(term("cat")));
        assert_eq!(parse_one("NOT cat"), not(term("cat")));
        assert_eq!(parse_one("-(a b)"), Query::UnaryMinus(Box::new(group(vec![term("a"), term("b")]))));
        assert_eq!(parse_one("NOT NOT cat"), not(not(term("cat"))));
    }

    #[test]
    fn not_binds_inside_chains() {
        assert_eq!(
            parse_one("a AND NOT b"),
            and(vec![term("a"), not(term("b"))])
        );
    }

    #[test]
    fn prefix_query() {
        assert_eq!(parse_one("prog*"), Query::Prefix("prog".into()));
    }

    #[test]
    fn wildcard_decomposition() {
        use WildcardPart::{ManyChar, SingleChar, Str};
        assert_eq!(
            parse_one("p?og*am"),
            Query::Wildcard(vec![
                Str("p".into()),
                SingleChar,
                Str("og".into()),
                ManyChar,
                Str("am".into()),
            ])
        );
        // a trailing `*` with company is a wildcard, not a prefix
        assert_eq!(
            parse_one("a*b*"),
            Query::Wildcard(vec![
                Str("a".into()),
                ManyChar,
                Str("b".into()),
                ManyChar,
            ])
        );
        assert_eq!(
            parse_one("ab?"),
            Query::Wildcard(vec![Str("ab".into()), SingleChar])
        );
    }

    #[test]
    fn fuzzy_queries() {
        assert_eq!(
            parse_one("rust~"),
            Query::Fuzzy {
                term: "rust".into(),
                distance: None
            }
        );
        assert_eq!(
            parse_one("rust~2"),
            Query::Fuzzy {
                term: "rust".into(),
                distance: Some(2)
            }
        );
    }

    #[test]
    fn proximity_queries() {
        assert_eq!(
            parse_one("\"derp lerp\"~3"),
            Query::Proximity {
                phrase: "derp lerp".into(),
                distance: 3
            }
        );
        assert!(matches!(
            parse("\"derp lerp\"~3.2").unwrap_err(),
            ParseError::InvalidNumber { .. }
        ));
        assert!(matches!(
            parse("\"derp lerp\"~").unwrap_err(),
            ParseError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn regex_leaf() {
        assert_eq!(parse_one("/err.r/"), Query::Regex("err.r".into()));
        assert_eq!(
            parse_one("name:/smyth?/"),
            field("name", Query::Regex("smyth?".into()))
        );
    }

    #[test]
    fn range_inclusivity_shapes() {
        let range = |lower: Option<&str>, upper: Option<&str>, li: bool, ui: bool| Query::Range {
            lower: lower.map(Into::into),
            upper: upper.map(Into::into),
            lower_inclusive: li,
            upper_inclusive: ui,
        };

        assert_eq!(
            parse_one("[a TO b]"),
            range(Some("a"), Some("b"), true, true)
        );
        assert_eq!(
            parse_one("{a TO b}"),
            range(Some("a"), Some("b"), false, false)
        );
        assert_eq!(
            parse_one("[a TO b}"),
            range(Some("a"), Some("b"), true, false)
        );
        assert_eq!(
            parse_one("[* TO b]"),
            range(None, Some("b"), true, true)
        );
        assert_eq!(parse_one("[a TO *]"), range(Some("a"), None, true, true));
    }

    #[test]
    fn range_requires_the_to_keyword() {
        assert!(parse("[a b]").is_err());
        assert!(parse("[a TO").is_err());
        assert!(parse("[a TO b").is_err());
    }

    #[test]
    fn boost_binds_to_the_leaf() {
        assert_eq!(parse_one("rust^2.5"), boost(term("rust"), 2.5));
        assert_eq!(
            parse_one("\"a b\"^3"),
            boost(phrase("a b"), 3.0)
        );
        assert_eq!(
            parse_one("rust~1^2"),
            boost(
                Query::Fuzzy {
                    term: "rust".into(),
                    distance: Some(1)
                },
                2.0
            )
        );
    }

    #[test]
    fn depth_limit_guards_nesting() {
        let options = ParseOptions::new().with_max_depth(8);
        assert!(options.parse("((((a))))").is_ok());

        let deep = format!("{}a{}", "(".repeat(9), ")".repeat(9));
        assert_eq!(
            options.parse(&deep).unwrap_err(),
            ParseError::DepthExceeded { offset: 8, limit: 8 }
        );
    }

    #[test]
    fn default_depth_limit_handles_pathological_input() {
        let deep = format!("{}a{}", "(".repeat(5000), ")".repeat(5000));
        assert!(matches!(
            parse(&deep).unwrap_err(),
            ParseError::DepthExceeded { limit: 1024, .. }
        ));
    }

    #[test]
    fn whitespace_around_colon_is_tolerated() {
        assert_eq!(parse("title : rust"), parse("title:rust"));
    }

    #[test]
    fn error_offsets_are_byte_positions() {
        let err = parse("cat [a b]").unwrap_err();
        assert_eq!(err.offset(), 7);
    }
}
