// tests/parser_tests.rs

use buildql::ast::{BinaryOperator, Expr, LiteralValue};
use buildql::lexer::tokenize;
use buildql::output::to_query;
use buildql::parser::{Parser, ParserOptions};
use buildql::{QueryError, parse, parse_unchecked, parse_with_options};
use proptest::prelude::*;

fn parse_err(source: &str) -> String {
    match parse(source).unwrap_err() {
        QueryError::Parse(e) => e.message,
        other => panic!("expected parse error, got {:?}", other),
    }
}

fn binary(expr: &Expr) -> (BinaryOperator, &Expr, &Expr) {
    match expr {
        Expr::Binary {
            operator,
            left,
            right,
            ..
        } => (*operator, &**left, &**right),
        other => panic!("expected binary, got {}", other.kind_name()),
    }
}

fn ident(expr: &Expr) -> &str {
    match expr {
        Expr::Identifier { name, .. } => name.as_str(),
        other => panic!("expected identifier, got {}", other.kind_name()),
    }
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_or_looser_than_and() {
    let expr = parse("a = 1 | b = 2 & c = 3").unwrap();
    let (op, left, right) = binary(&expr);
    assert_eq!(op, BinaryOperator::Or);
    assert_eq!(binary(left).0, BinaryOperator::LooseEq);
    assert_eq!(binary(right).0, BinaryOperator::And);
}

#[test]
fn test_and_looser_than_comparison() {
    let expr = parse("xp > 3 & trait = 'practiced'").unwrap();
    let (op, left, right) = binary(&expr);
    assert_eq!(op, BinaryOperator::And);
    assert_eq!(binary(left).0, BinaryOperator::Gt);
    assert_eq!(binary(right).0, BinaryOperator::LooseEq);
}

#[test]
fn test_comparison_looser_than_additive() {
    let expr = parse("health + sanity >= 10").unwrap();
    let (op, left, _) = binary(&expr);
    assert_eq!(op, BinaryOperator::Gte);
    assert_eq!(binary(left).0, BinaryOperator::Add);
}

#[test]
fn test_additive_looser_than_multiplicative() {
    let expr = parse("a + b * c").unwrap();
    let (op, left, right) = binary(&expr);
    assert_eq!(op, BinaryOperator::Add);
    assert_eq!(ident(left), "a");
    assert_eq!(binary(right).0, BinaryOperator::Multiply);
}

#[test]
fn test_left_associative() {
    let expr = parse("a + b + c").unwrap();
    let (op, left, right) = binary(&expr);
    assert_eq!(op, BinaryOperator::Add);
    assert_eq!(ident(right), "c");
    let (inner, a, b) = binary(left);
    assert_eq!(inner, BinaryOperator::Add);
    assert_eq!(ident(a), "a");
    assert_eq!(ident(b), "b");

    let expr = parse("a % b / c").unwrap();
    let (op, left, _) = binary(&expr);
    assert_eq!(op, BinaryOperator::Divide);
    assert_eq!(binary(left).0, BinaryOperator::Modulo);

    let expr = parse("a=1 | b=2 | c=3").unwrap();
    assert_eq!(to_query(&expr), "a = 1 | b = 2 | c = 3");
    let (_, left, _) = binary(&expr);
    assert_eq!(binary(left).0, BinaryOperator::Or);
}

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn test_grouped_round_trip() {
    let source = r#"(xp = 0 | xp = 2) & (trait = "practiced" | trait = "innate")"#;
    let expr = parse(source).unwrap();

    let (op, left, right) = binary(&expr);
    assert_eq!(op, BinaryOperator::And);
    for (side, expected) in [(left, ["xp", "xp"]), (right, ["trait", "trait"])] {
        let Expr::Group { expression, .. } = side else {
            panic!("expected group, got {}", side.kind_name());
        };
        let (inner, l, r) = binary(expression);
        assert_eq!(inner, BinaryOperator::Or);
        assert_eq!(ident(binary(l).1), expected[0]);
        assert_eq!(ident(binary(r).1), expected[1]);
    }

    assert_eq!(to_query(&expr), source);
    assert!(parse(&to_query(&expr)).unwrap().same_shape(&expr));
}

#[test]
fn test_list_elements() {
    let expr = parse(r#"trait ?? ["Tactic.", "Supply."]"#).unwrap();
    let (op, _, right) = binary(&expr);
    assert_eq!(op, BinaryOperator::StrictContains);
    let Expr::List { elements, .. } = right else {
        panic!("expected list");
    };
    assert_eq!(elements.len(), 2);
    assert!(matches!(
        &elements[0],
        Expr::Literal { value: LiteralValue::String(s), .. } if s == "Tactic."
    ));
}

#[test]
fn test_empty_list() {
    let expr = parse("name !? []").unwrap();
    let (op, _, right) = binary(&expr);
    assert_eq!(op, BinaryOperator::LooseNotContains);
    assert!(matches!(right, Expr::List { elements, .. } if elements.is_empty()));
}

#[test]
fn test_regex_literal() {
    let expr = parse("name = /^the/").unwrap();
    let (_, _, right) = binary(&expr);
    assert!(matches!(
        right,
        Expr::Literal { value: LiteralValue::Regex(p), .. } if p == "^the"
    ));
}

#[test]
fn test_spans() {
    let expr = parse("xp > 3").unwrap();
    assert_eq!(expr.span().start.column, 1);
    assert_eq!(expr.span().end.column, 7);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_comparison_does_not_chain() {
    let err = parse("a = b = c").unwrap_err();
    assert_eq!(err.message(), "Unexpected token: '='");
    assert_eq!(err.position().map(|p| p.column), Some(7));
}

#[test]
fn test_top_level_must_be_binary_or_group() {
    assert_eq!(parse_err("xp"), "Expression must be a binary operation or a group");
    assert_eq!(parse_err("[1, 2]"), "Expression must be a binary operation or a group");
    assert_eq!(parse_err("42"), "Expression must be a binary operation or a group");
    assert!(parse("(xp)").is_ok());
}

#[test]
fn test_unchecked_allows_bare_values() {
    assert!(matches!(parse_unchecked("xp").unwrap(), Expr::Identifier { .. }));
}

#[test]
fn test_empty_query() {
    assert_eq!(parse_err(""), "Expected expression, got ''");
}

#[test]
fn test_missing_operand() {
    assert_eq!(parse_err("xp >"), "Expected expression, got ''");
    assert_eq!(parse_err("xp > & a"), "Expected expression, got '&'");
}

#[test]
fn test_unclosed_group() {
    let err = parse("(xp > 3").unwrap_err();
    assert_eq!(err.message(), "Expected ')' after expression");
    assert_eq!(err.to_string(), "Parser error: Expected ')' after expression at line 1, column 8");
}

#[test]
fn test_unclosed_list() {
    assert_eq!(parse_err("a ? [1, 2"), "Expected ']' after list elements");
    assert_eq!(parse_err("a ? [1 2]"), "Expected ']' after list elements");
}

#[test]
fn test_lex_error_surfaces() {
    let err = parse("name = 'abc").unwrap_err();
    assert!(matches!(err, QueryError::Lex(_)));
    assert!(err.to_string().starts_with("Lexer error: Unterminated string literal"));
}

#[test]
fn test_max_depth() {
    let deep = format!("{}a = 1{}", "(".repeat(10), ")".repeat(10));
    // Ten groups plus the comparison inside them.
    assert!(parse_with_options(&deep, ParserOptions::default().with_max_depth(11)).is_ok());

    let err = parse_with_options(&deep, ParserOptions::default().with_max_depth(10)).unwrap_err();
    assert_eq!(err.message(), "Maximum nesting depth of 10 exceeded");
}

#[test]
fn test_default_depth_rejects_pathological_nesting() {
    let deep = format!("{}a = 1{}", "(".repeat(5000), ")".repeat(5000));
    assert!(parse(&deep).is_err());

    let chain = vec!["a = 1"; 5000].join(" | ");
    assert!(parse(&chain).is_err());
}

#[test]
fn test_parser_over_tokens() {
    let tokens = tokenize("cost % 2 = 0").unwrap();
    let expr = Parser::new(tokens).parse_query().unwrap();
    assert_eq!(binary(&expr).0, BinaryOperator::LooseEq);
}

// ============================================================================
// Totality
// ============================================================================

proptest! {
    #[test]
    fn prop_parse_never_panics(input in "[a-c0-9 =!?<>&|+*/%()\\[\\],'-]{0,40}") {
        let _ = parse(&input);
    }

    #[test]
    fn prop_printed_query_reparses(
        field in "[a-z]{1,6}",
        n in -100i32..100,
        op in prop::sample::select(vec!["=", "==", "!=", "!==", ">", "<", ">=", "<="]),
        text in "[a-z ]{0,10}",
    ) {
        let source = format!("({} {} {} | {} = '{}') & {} % 2 = 0", field, op, n, field, text, field);
        let expr = parse(&source).unwrap();
        let reparsed = parse(&to_query(&expr)).unwrap();
        prop_assert!(reparsed.same_shape(&expr));
    }
}
