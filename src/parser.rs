use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{BinaryOperator, Expr, LiteralValue, Position, Span, Token, TokenKind},
    error::QueryError,
    lexer::tokenize,
};

/// Token stream that does not form a valid query.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at {position}")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl ParseError {
    fn new(message: impl Into<String>, position: Position) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

/// Limits applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum nesting of groups, lists and chained binary operators.
    pub max_depth: usize,
}

impl ParserOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Recursive-descent parser over a token list.
///
/// ```text
/// query          := or_expr EOF
/// or_expr        := and_expr ( '|' and_expr )*
/// and_expr       := comparison ( '&' comparison )*
/// comparison     := additive ( comp_op additive )?
/// additive       := multiplicative ( ('+'|'-') multiplicative )*
/// multiplicative := primary ( ('*'|'/'|'%') primary )*
/// primary        := TRUE | FALSE | NULL | NUMBER | STRING | REGEX | IDENTIFIER
///                 | '(' or_expr ')'
///                 | '[' ( or_expr (',' or_expr)* )? ']'
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    options: ParserOptions,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_options(tokens, ParserOptions::default())
    }

    pub fn with_options(mut tokens: Vec<Token>, options: ParserOptions) -> Self {
        if !tokens.last().is_some_and(|t| t.is(TokenKind::Eof)) {
            let end = tokens.last().map_or(Position::START, |t| t.span.end);
            tokens.push(Token::new(TokenKind::Eof, "", LiteralValue::Null, Span::point(end)));
        }

        Parser {
            tokens,
            current: 0,
            depth: 0,
            options,
        }
    }

    fn peek(&self) -> &Token {
        // `with_options` guarantees a trailing Eof.
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().is(TokenKind::Eof)
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().is(kind)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Consumes the current token if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.peek().span.start)
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(self.error_here(format!(
                "Maximum nesting depth of {} exceeded",
                self.options.max_depth
            )));
        }
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth = self.depth.saturating_sub(levels);
    }

    /// Parses any expression and requires the whole token stream to be
    /// consumed.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_or()?;

        if !self.is_at_end() {
            return Err(self.error_here(format!("Unexpected token: '{}'", self.peek().lexeme)));
        }

        Ok(expr)
    }

    /// Parses a complete filter query: like [`Parser::parse`], but the
    /// top-level node must be a binary operation or a group.
    pub fn parse_query(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse()?;

        if !expr.is_binary() && !expr.is_group() {
            return Err(ParseError::new(
                "Expression must be a binary operation or a group",
                expr.span().start,
            ));
        }

        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        let mut links = 0;

        while self.eat(TokenKind::Or).is_some() {
            self.descend()?;
            links += 1;
            let right = self.parse_and()?;
            left = Expr::binary(BinaryOperator::Or, left, right);
        }

        self.ascend(links);
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        let mut links = 0;

        while self.eat(TokenKind::And).is_some() {
            self.descend()?;
            links += 1;
            let right = self.parse_comparison()?;
            left = Expr::binary(BinaryOperator::And, left, right);
        }

        self.ascend(links);
        Ok(left)
    }

    /// At most one comparison operator is consumed here; `a = b = c`
    /// leaves the second `=` for the caller, which rejects it.
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;

        let Some(op) = BinaryOperator::comparison(self.peek().kind) else {
            return Ok(left);
        };

        self.advance();
        self.descend()?;
        let right = self.parse_additive()?;
        self.ascend(1);

        Ok(Expr::binary(op, left, right))
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        let mut links = 0;

        while let Some(op) = BinaryOperator::additive(self.peek().kind) {
            self.advance();
            self.descend()?;
            links += 1;
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }

        self.ascend(links);
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_primary()?;
        let mut links = 0;

        while let Some(op) = BinaryOperator::multiplicative(self.peek().kind) {
            self.advance();
            self.descend()?;
            links += 1;
            let right = self.parse_primary()?;
            left = Expr::binary(op, left, right);
        }

        self.ascend(links);
        Ok(left)
    }

    /// Parse primary expressions: literals, identifiers, groups and lists
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().kind {
            TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::Regex => {
                let token = self.advance();
                Ok(Expr::Literal {
                    value: token.value,
                    span: token.span,
                })
            }
            TokenKind::Identifier => {
                let token = self.advance();
                let name = match token.value {
                    LiteralValue::String(name) => name,
                    _ => token.lexeme.to_lowercase(),
                };
                Ok(Expr::Identifier {
                    name,
                    span: token.span,
                })
            }
            TokenKind::LParen => {
                let open = self.advance();
                self.parse_group(open)
            }
            TokenKind::LBracket => {
                let open = self.advance();
                self.parse_list(open)
            }
            _ => Err(self.error_here(format!(
                "Expected expression, got '{}'",
                self.peek().lexeme
            ))),
        }
    }

    fn parse_group(&mut self, open: Token) -> Result<Expr, ParseError> {
        self.descend()?;
        let expression = self.parse_or()?;

        let Some(close) = self.eat(TokenKind::RParen) else {
            return Err(self.error_here("Expected ')' after expression"));
        };
        self.ascend(1);

        Ok(Expr::Group {
            expression: Box::new(expression),
            span: open.span.to(close.span),
        })
    }

    fn parse_list(&mut self, open: Token) -> Result<Expr, ParseError> {
        self.descend()?;
        let mut elements = vec![];

        if !self.check(TokenKind::RBracket) {
            loop {
                elements.push(self.parse_or()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        let Some(close) = self.eat(TokenKind::RBracket) else {
            return Err(self.error_here("Expected ']' after list elements"));
        };
        self.ascend(1);

        Ok(Expr::List {
            elements,
            span: open.span.to(close.span),
        })
    }
}

/// Parses a filter query from source text.
///
/// The top-level expression must be a binary operation or a group, so
/// bare values such as `xp` or `[1, 2]` are rejected.
pub fn parse(source: &str) -> Result<Expr, QueryError> {
    parse_with_options(source, ParserOptions::default())
}

pub fn parse_with_options(source: &str, options: ParserOptions) -> Result<Expr, QueryError> {
    let tokens = tokenize(source)?;
    let expr = Parser::with_options(tokens, options).parse_query()?;
    debug!(query = source, "parsed query");
    Ok(expr)
}

/// Parses any expression from source text, including bare literals,
/// identifiers and lists.
pub fn parse_unchecked(source: &str) -> Result<Expr, QueryError> {
    let tokens = tokenize(source)?;
    Ok(Parser::new(tokens).parse()?)
}
