pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod error;
pub mod fields;
pub mod fuzzy;
pub mod interpreter;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod value;

pub use ast::{BinaryOperator, Expr, LiteralValue, Position, Span, Token, TokenKind};
pub use error::QueryError;
pub use fields::{FieldDescriptor, FieldRegistry, FieldType, InterpreterContext};
pub use interpreter::{EqualityMode, Interpreter, InterpreterError, InterpreterOptions};
pub use lexer::{LexError, Lexer, tokenize};
pub use output::{to_query, to_tree};
pub use parser::{ParseError, Parser, ParserOptions, parse, parse_unchecked, parse_with_options};
pub use value::FieldValue;
