use thiserror::Error;
use tracing::trace;

use crate::ast::{LiteralValue, Position, Span, Token, TokenKind};

/// Malformed query text.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at {position}")]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

impl LexError {
    fn new(message: impl Into<String>, position: Position) -> Self {
        LexError {
            message: message.into(),
            position,
        }
    }
}

/// Splits a query into tokens.
///
/// The lexer remembers the kind of the last token it produced so that a
/// `/` can be read as a regex literal where a value is expected and as a
/// division everywhere else.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    previous: Option<TokenKind>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            previous: None,
        }
    }

    /// Consumes the lexer and returns every token, ending with exactly one
    /// [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token.is(TokenKind::Eof);
            tokens.push(token);
            if done {
                break;
            }
        }

        trace!(count = tokens.len(), "tokenized query");
        Ok(tokens)
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Consumes `expected` if it is the current character.
    fn eat(&mut self, expected: char) -> bool {
        if self.current_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_position(&self) -> Position {
        Position::new(self.position, self.line, self.column)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if matches!(ch, ' ' | '\t' | '\r' | '\n') {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn lexeme(&self, start: Position) -> String {
        self.input[start.offset..self.position].iter().collect()
    }

    fn finish(&mut self, kind: TokenKind, value: LiteralValue, start: Position) -> Token {
        self.previous = Some(kind);
        let lexeme = self.lexeme(start);
        Token::new(kind, lexeme, value, Span::new(start, self.current_position()))
    }

    fn in_value_position(&self) -> bool {
        self.previous.is_none_or(TokenKind::opens_value_position)
    }

    fn read_string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.current_position();
        self.advance(); // Consume opening quote

        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Err(LexError::new("Unterminated string literal", start)),
                Some(c) if c == quote => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(other) => value.push(other),
                    None => return Err(LexError::new("Unterminated string literal", start)),
                },
                Some(c) => value.push(c),
            }
        }

        Ok(self.finish(TokenKind::String, LiteralValue::String(value), start))
    }

    fn read_regex(&mut self) -> Result<Token, LexError> {
        let start = self.current_position();
        self.advance(); // Consume opening slash

        let mut pattern = String::new();
        loop {
            match self.advance() {
                None => return Err(LexError::new("Unterminated regex literal", start)),
                Some('/') => break,
                Some('\\') => {
                    pattern.push('\\');
                    match self.advance() {
                        Some(escaped) => pattern.push(escaped),
                        None => return Err(LexError::new("Unterminated regex literal", start)),
                    }
                }
                Some(c) => pattern.push(c),
            }
        }

        Ok(self.finish(TokenKind::Regex, LiteralValue::Regex(pattern), start))
    }

    fn read_number(&mut self) -> Token {
        let start = self.current_position();
        self.eat('-');
        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        let lexeme = self.lexeme(start);
        let value = lexeme.parse::<f64>().unwrap_or(f64::NAN);
        self.finish(TokenKind::Number, LiteralValue::Number(value), start)
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.current_position();
        while self
            .current_char()
            .is_some_and(|c| is_identifier_start(c) || c.is_ascii_digit() || c == ':')
        {
            self.advance();
        }

        let lexeme = self.lexeme(start);
        let lower = lexeme.to_lowercase();
        match lower.as_str() {
            "true" => self.finish(TokenKind::True, LiteralValue::Boolean(true), start),
            "false" => self.finish(TokenKind::False, LiteralValue::Boolean(false), start),
            "null" => self.finish(TokenKind::Null, LiteralValue::Null, start),
            _ => self.finish(TokenKind::Identifier, LiteralValue::String(lower), start),
        }
    }

    fn read_operator(&mut self) -> Result<Token, LexError> {
        let start = self.current_position();
        let Some(ch) = self.advance() else {
            return Ok(self.finish(TokenKind::Eof, LiteralValue::Null, start));
        };

        let kind = match ch {
            '=' => {
                if self.eat('=') {
                    TokenKind::StrictEq
                } else {
                    TokenKind::LooseEq
                }
            }
            '!' => {
                if self.eat('?') {
                    if self.eat('?') {
                        TokenKind::StrictNotContains
                    } else {
                        TokenKind::LooseNotContains
                    }
                } else if self.eat('=') {
                    if self.eat('=') {
                        TokenKind::StrictNotEq
                    } else {
                        TokenKind::NotEq
                    }
                } else {
                    return Err(LexError::new("Unexpected character: '!'", start));
                }
            }
            '?' => {
                if self.eat('?') {
                    TokenKind::StrictContains
                } else {
                    TokenKind::LooseContains
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::Gte
                } else {
                    TokenKind::Gt
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::Lte
                } else {
                    TokenKind::Lt
                }
            }
            '&' => TokenKind::And,
            '|' => TokenKind::Or,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Multiply,
            '/' => TokenKind::Divide,
            '%' => TokenKind::Modulo,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            other => {
                return Err(LexError::new(
                    format!("Unexpected character: '{}'", other),
                    start,
                ));
            }
        };

        Ok(self.finish(kind, LiteralValue::Null, start))
    }

    /// Reads the next token. Once the input is exhausted every call
    /// returns a zero-width [`TokenKind::Eof`] at the end of input.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        match self.current_char() {
            None => {
                let end = self.current_position();
                self.previous = Some(TokenKind::Eof);
                Ok(Token::new(TokenKind::Eof, "", LiteralValue::Null, Span::point(end)))
            }
            Some(quote @ ('"' | '\'')) => self.read_string(quote),
            Some('/') if self.in_value_position() => self.read_regex(),
            Some(ch) if ch.is_ascii_digit() => Ok(self.read_number()),
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                Ok(self.read_number())
            }
            Some(ch) if is_identifier_start(ch) => Ok(self.read_identifier()),
            Some(_) => self.read_operator(),
        }
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

/// Tokenizes `source` in one call.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_value_position_tracking() {
        let mut lexer = Lexer::new("a / b");
        assert!(lexer.in_value_position());
        lexer.next_token().unwrap();
        assert!(!lexer.in_value_position());
    }

    #[test]
    fn test_regex_after_comma_and_bracket() {
        assert_eq!(
            kinds("[/a/, /b/]"),
            vec![
                TokenKind::LBracket,
                TokenKind::Regex,
                TokenKind::Comma,
                TokenKind::Regex,
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_division_after_group() {
        assert_eq!(
            kinds("(a) / 2"),
            vec![
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::RParen,
                TokenKind::Divide,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("x");
        lexer.next_token().unwrap();
        assert!(lexer.next_token().unwrap().is(TokenKind::Eof));
        assert!(lexer.next_token().unwrap().is(TokenKind::Eof));
    }
}
