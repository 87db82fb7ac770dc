//! Query lexer (tokenizer).
//!
//! Converts a query string into a stream of spanned tokens for the parser.
//! Whitespace between tokens is skipped; the only whitespace-sensitive
//! boundaries are the inside of quoted phrases and regex literals, the
//! trailing separator that distinguishes an operator keyword from a term,
//! and the operand required immediately after a unary `+`/`-`.

use std::{iter::Peekable, str::Chars};

use crate::error::ParseError;

/// A token in the query language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A bare word, possibly containing `*`/`?` wildcard characters.
    Word(String),

    /// A quoted phrase (the quotes are stripped, content preserved).
    Phrase(String),

    /// A regex literal (the slashes are stripped, `\/` escapes resolved).
    Regex(String),

    /// The `AND` keyword or its `&&` alias.
    And,

    /// The `OR` keyword or its `||` alias.
    Or,

    /// The `NOT` keyword.
    Not,

    /// The `!` negation operator.
    Bang,

    /// Unary `+` (required presence).
    Plus,

    /// Unary `-` (required absence).
    Minus,

    /// Field separator (`:`).
    Colon,

    /// Left parenthesis.
    LParen,

    /// Right parenthesis.
    RParen,

    /// Left square bracket (inclusive range start).
    LBracket,

    /// Right square bracket (inclusive range end).
    RBracket,

    /// Left curly brace (exclusive range start).
    LBrace,

    /// Right curly brace (exclusive range end).
    RBrace,

    /// A standalone `*` (an open range bound).
    Star,

    /// `~` with an optional distance (`term~`, `term~2`, `"a b"~3`).
    Tilde(Option<u32>),

    /// `^f` boost factor.
    Caret(f64),

    /// `@n` minimum-match count.
    At(u32),
}

impl Token {
    /// Describes the token for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("word `{w}`"),
            Token::Phrase(_) => "a quoted phrase".to_string(),
            Token::Regex(_) => "a regex literal".to_string(),
            Token::And => "`AND`".to_string(),
            Token::Or => "`OR`".to_string(),
            Token::Not => "`NOT`".to_string(),
            Token::Bang => "`!`".to_string(),
            Token::Plus => "`+`".to_string(),
            Token::Minus => "`-`".to_string(),
            Token::Colon => "`:`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::LBrace => "`{`".to_string(),
            Token::RBrace => "`}`".to_string(),
            Token::Star => "`*`".to_string(),
            Token::Tilde(_) => "`~`".to_string(),
            Token::Caret(_) => "`^`".to_string(),
            Token::At(_) => "`@`".to_string(),
        }
    }
}

/// A token together with its byte span in the source string.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token itself.
    pub token: Token,
    /// Byte offset of the token's first character.
    pub start: usize,
    /// Byte offset just past the token's last character.
    pub end: usize,
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Tokenizes the entire input, returning all tokens or the first error.
    fn tokenize(mut self) -> Result<Vec<SpannedToken>, ParseError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let start = self.position;
            let Some(token) = self.next_token()? else {
                break;
            };
            tokens.push(SpannedToken {
                token,
                start,
                end: self.position,
            });
        }

        Ok(tokens)
    }

    /// Reads the next token, or `None` at end of input. Assumes leading
    /// whitespace has been skipped.
    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        let start = self.position;
        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };

        let token = match ch {
            '"' => self.read_phrase()?,
            '/' => self.read_regex()?,
            '(' => self.single(Token::LParen),
            ')' => self.single(Token::RParen),
            '[' => self.single(Token::LBracket),
            ']' => self.single(Token::RBracket),
            '{' => self.single(Token::LBrace),
            '}' => self.single(Token::RBrace),
            ':' => self.single(Token::Colon),
            '!' => self.single(Token::Bang),
            '*' => self.single(Token::Star),
            '&' => self.read_symbolic_operator('&', Token::And)?,
            '|' => self.read_symbolic_operator('|', Token::Or)?,
            '+' => self.read_unary_sign(Token::Plus)?,
            '-' => self.read_unary_sign(Token::Minus)?,
            '~' => self.read_tilde()?,
            '^' => self.read_caret()?,
            '@' => self.read_at()?,
            c if is_word_start(c) => self.read_word(),
            c => {
                return Err(ParseError::UnexpectedToken {
                    offset: start,
                    expected: "a query token",
                    found: format!("`{c}`"),
                });
            }
        };

        Ok(Some(token))
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    /// Reads a word; `AND`, `OR` and `NOT` become operator tokens only when
    /// followed by whitespace or end of input, otherwise the text stays an
    /// ordinary word (`ANDroid` is a term, and `AND:` keeps the word so the
    /// parser can reject it in field position).
    fn read_word(&mut self) -> Token {
        let mut word = String::new();

        while let Some(&ch) = self.chars.peek() {
            if is_word_char(ch) {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let at_boundary = match self.chars.peek() {
            None => true,
            Some(&c) => c.is_whitespace(),
        };

        if at_boundary {
            match word.as_str() {
                "AND" => return Token::And,
                "OR" => return Token::Or,
                "NOT" => return Token::Not,
                _ => {}
            }
        }

        Token::Word(word)
    }

    /// Reads `&&` or `||`; both require a trailing separator like the word
    /// operators they alias.
    fn read_symbolic_operator(
        &mut self,
        symbol: char,
        token: Token,
    ) -> Result<Token, ParseError> {
        let start = self.position;
        self.advance();

        if self.chars.peek() != Some(&symbol) {
            return Err(ParseError::UnexpectedToken {
                offset: start,
                expected: if symbol == '&' { "`&&`" } else { "`||`" },
                found: format!("`{symbol}`"),
            });
        }
        self.advance();

        match self.chars.peek() {
            None => Ok(token),
            Some(&c) if c.is_whitespace() => Ok(token),
            Some(&c) => Err(ParseError::UnexpectedToken {
                offset: self.position,
                expected: if symbol == '&' {
                    "whitespace after `&&`"
                } else {
                    "whitespace after `||`"
                },
                found: format!("`{c}`"),
            }),
        }
    }

    /// Reads a unary `+`/`-`, which must sit immediately against its
    /// operand.
    fn read_unary_sign(&mut self, token: Token) -> Result<Token, ParseError> {
        let start = self.position;
        self.advance();

        match self.chars.peek() {
            None => Err(ParseError::UnexpectedToken {
                offset: start,
                expected: "an operand immediately after the sign",
                found: "end of input".to_string(),
            }),
            Some(&c) if c.is_whitespace() => Err(ParseError::UnexpectedToken {
                offset: start,
                expected: "an operand immediately after the sign",
                found: "whitespace".to_string(),
            }),
            Some(_) => Ok(token),
        }
    }

    /// Reads a quoted phrase. No escape processing: the first `"` closes
    /// the literal.
    fn read_phrase(&mut self) -> Result<Token, ParseError> {
        let start = self.position;
        self.advance(); // consume opening quote

        let mut content = String::new();
        loop {
            match self.chars.peek() {
                Some(&'"') => {
                    self.advance();
                    return Ok(Token::Phrase(content));
                }
                Some(&ch) => {
                    content.push(ch);
                    self.advance();
                }
                None => {
                    return Err(ParseError::UnterminatedLiteral {
                        offset: start,
                        delimiter: '"',
                    });
                }
            }
        }
    }

    /// Reads a regex literal. `\/` denotes a literal slash; any other
    /// backslash sequence passes through verbatim.
    fn read_regex(&mut self) -> Result<Token, ParseError> {
        let start = self.position;
        self.advance(); // consume opening slash

        let mut content = String::new();
        loop {
            match self.chars.peek() {
                Some(&'/') => {
                    self.advance();
                    return Ok(Token::Regex(content));
                }
                Some(&'\\') => {
                    self.advance();
                    match self.chars.peek() {
                        Some(&'/') => {
                            content.push('/');
                            self.advance();
                        }
                        Some(&ch) => {
                            content.push('\\');
                            content.push(ch);
                            self.advance();
                        }
                        None => {
                            return Err(ParseError::UnterminatedLiteral {
                                offset: start,
                                delimiter: '/',
                            });
                        }
                    }
                }
                Some(&ch) => {
                    content.push(ch);
                    self.advance();
                }
                None => {
                    return Err(ParseError::UnterminatedLiteral {
                        offset: start,
                        delimiter: '/',
                    });
                }
            }
        }
    }

    /// Reads `~` with its optional integer distance. A distance followed by
    /// `.` or more word characters is malformed (`~3.2` fails).
    fn read_tilde(&mut self) -> Result<Token, ParseError> {
        self.advance(); // consume '~'
        let num_start = self.position;
        let digits = self.read_digits();

        self.reject_number_tail(num_start, &digits)?;

        if digits.is_empty() {
            return Ok(Token::Tilde(None));
        }
        let distance = digits
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidNumber {
                offset: num_start,
                found: digits.clone(),
            })?;
        Ok(Token::Tilde(Some(distance)))
    }

    /// Reads `^` with its decimal boost factor.
    fn read_caret(&mut self) -> Result<Token, ParseError> {
        self.advance(); // consume '^'
        let num_start = self.position;
        let mut number = self.read_digits();

        if number.is_empty() {
            return Err(ParseError::InvalidNumber {
                offset: num_start,
                found: self.describe_next(),
            });
        }
        if self.chars.peek() == Some(&'.') {
            self.advance();
            number.push('.');
            let fraction = self.read_digits();
            if fraction.is_empty() {
                return Err(ParseError::InvalidNumber {
                    offset: num_start,
                    found: number,
                });
            }
            number.push_str(&fraction);
        }
        self.reject_number_tail(num_start, &number)?;

        let factor = number
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or(ParseError::InvalidNumber {
                offset: num_start,
                found: number,
            })?;
        Ok(Token::Caret(factor))
    }

    /// Reads `@` with its required integer count.
    fn read_at(&mut self) -> Result<Token, ParseError> {
        self.advance(); // consume '@'
        let num_start = self.position;
        let digits = self.read_digits();

        if digits.is_empty() {
            return Err(ParseError::InvalidNumber {
                offset: num_start,
                found: self.describe_next(),
            });
        }
        self.reject_number_tail(num_start, &digits)?;

        let minimum = digits
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidNumber {
                offset: num_start,
                found: digits.clone(),
            })?;
        Ok(Token::At(minimum))
    }

    /// Fails if a number runs straight into `.` or further word characters.
    fn reject_number_tail(&mut self, num_start: usize, prefix: &str) -> Result<(), ParseError> {
        match self.chars.peek() {
            Some(&c) if is_word_char(c) => {
                let mut found = prefix.to_string();
                while let Some(&c) = self.chars.peek() {
                    if !is_word_char(c) {
                        break;
                    }
                    found.push(c);
                    self.advance();
                }
                Err(ParseError::InvalidNumber {
                    offset: num_start,
                    found,
                })
            }
            _ => Ok(()),
        }
    }

    fn read_digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        digits
    }

    fn describe_next(&mut self) -> String {
        match self.chars.peek() {
            None => "end of input".to_string(),
            Some(&c) if c.is_whitespace() => "whitespace".to_string(),
            Some(&c) => format!("`{c}`"),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

/// Whether a character can start a word.
fn is_word_start(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Whether a character can continue a word. `-` and `.` are ordinary word
/// characters in the interior (`2024-01-15` is one word); `*`/`?` are
/// wildcard atoms the parser decomposes later.
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | '*' | '?')
}

/// Tokenizes a query string into spanned tokens.
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, ParseError> {
    Lexer::new(input).tokenize()
}
