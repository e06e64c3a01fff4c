// tests/integration_tests.rs

use buildql::cli::{
    CheckOptions, CheckResult, CliError, FieldSchema, dump_tokens, execute_check,
    get_doc_category, get_docs_overview, render_expression,
};
use buildql::{InterpreterError, QueryError};
use serde_json::{Value, json};

const CARDS: &str = r#"[
    {"code": "01006", "name": "Roland's .38 Special", "xp": 0, "cost": 3,
     "traits": "Item. Weapon. Firearm.", "unique": true},
    {"code": "01020", "name": "Machete", "xp": 0, "cost": 3,
     "traits": "Item. Weapon. Melee."},
    {"code": "01021", "name": "Guard Dog", "xp": 0, "cost": 3,
     "traits": "Ally. Creature."},
    {"code": "02186", "name": "Shotgun", "xp": 4, "cost": 5,
     "traits": "Item. Weapon. Firearm."},
    {"code": "04105", "name": "Dynamite Blast", "xp": 2, "cost": "X",
     "traits": "Tactic."}
]"#;

const SCHEMA: &str = r#"{
    "name":  { "type": "string" },
    "xp":    { "type": "number" },
    "cost":  { "type": "number" },
    "trait": { "type": "text", "path": "traits", "back_path": "back.traits" }
}"#;

fn run(query: &str) -> Result<Vec<String>, CliError> {
    run_with(CheckOptions {
        query: query.to_string(),
        input: Some(CARDS.to_string()),
        fields: Some(SCHEMA.to_string()),
        ..CheckOptions::default()
    })
}

fn run_with(options: CheckOptions) -> Result<Vec<String>, CliError> {
    match execute_check(&options)? {
        CheckResult::Success(Value::Array(cards)) => Ok(cards
            .iter()
            .map(|c| c["code"].as_str().unwrap_or_default().to_string())
            .collect()),
        other => panic!("unexpected result: {:?}", other),
    }
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_filter_by_trait_and_xp() {
    assert_eq!(run("trait = 'firearm' & xp > 0").unwrap(), vec!["02186"]);
}

#[test]
fn test_filter_by_membership() {
    assert_eq!(
        run("name ? ['machete', 'guard dog']").unwrap(),
        vec!["01020", "01021"]
    );
}

#[test]
fn test_filter_strict_text() {
    assert_eq!(run("trait == 'tactic.'").unwrap(), vec!["04105"]);
}

#[test]
fn test_filter_variable_cost() {
    assert_eq!(run("cost < 0").unwrap(), vec!["04105"]);
    assert_eq!(run("cost % 2 = 1").unwrap(), vec!["01006", "01020", "01021", "02186"]);
}

#[test]
fn test_filter_regex() {
    assert_eq!(run("name = /^(machete|shotgun)$/").unwrap(), vec!["01020", "02186"]);
}

#[test]
fn test_no_matches() {
    assert!(run("xp > 5").unwrap().is_empty());
}

#[test]
fn test_inferred_schema() {
    let ids = run_with(CheckOptions {
        query: "unique = true | traits = 'ally'".to_string(),
        input: Some(CARDS.to_string()),
        ..CheckOptions::default()
    })
    .unwrap();
    assert_eq!(ids, vec!["01006", "01021"]);

    let schema: Vec<_> = serde_json::from_str::<Vec<Value>>(CARDS)
        .map(|cards| FieldSchema::infer(&cards))
        .unwrap()
        .fields
        .into_keys()
        .collect();
    assert_eq!(schema, vec!["code", "cost", "name", "traits", "unique", "xp"]);
}

#[test]
fn test_single_card_input() {
    let ids = run_with(CheckOptions {
        query: "xp = 0".to_string(),
        input: Some(json!({"code": "01000", "xp": 0}).to_string()),
        ..CheckOptions::default()
    })
    .unwrap();
    assert_eq!(ids, vec!["01000"]);
}

#[test]
fn test_match_backs() {
    let cards = json!([
        {"code": "08001", "name": "Front", "traits": "Spell.",
         "back": {"traits": "Ritual."}}
    ])
    .to_string();
    let options = |match_backs| CheckOptions {
        query: "trait = 'ritual'".to_string(),
        input: Some(cards.clone()),
        fields: Some(SCHEMA.to_string()),
        match_backs,
        ..CheckOptions::default()
    };

    assert!(run_with(options(false)).unwrap().is_empty());
    assert_eq!(run_with(options(true)).unwrap(), vec!["08001"]);
}

#[test]
fn test_fuzzy_distance_option() {
    let options = |fuzzy_distance| CheckOptions {
        query: "trait = 'item firearm'".to_string(),
        input: Some(CARDS.to_string()),
        fields: Some(SCHEMA.to_string()),
        fuzzy_distance,
        ..CheckOptions::default()
    };

    assert_eq!(run_with(options(20)).unwrap(), vec!["01006", "02186"]);
    assert!(run_with(options(2)).unwrap().is_empty());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_syntax_only() {
    let options = CheckOptions {
        query: "xp > 3 & trait = 'practiced'".to_string(),
        syntax_only: true,
        ..CheckOptions::default()
    };
    assert!(matches!(execute_check(&options).unwrap(), CheckResult::SyntaxValid));
}

#[test]
fn test_syntax_error() {
    let err = run("xp > ").unwrap_err();
    assert!(matches!(err, CliError::Query(QueryError::Parse(_))));
    assert_eq!(
        err.to_string(),
        "Parser error: Expected expression, got '' at line 1, column 6"
    );
}

#[test]
fn test_unknown_field() {
    let err = run("victory > 0").unwrap_err();
    assert!(matches!(
        err,
        CliError::Eval(InterpreterError::UnknownField(ref name)) if name == "victory"
    ));
}

#[test]
fn test_missing_input() {
    let options = CheckOptions {
        query: "xp = 0".to_string(),
        ..CheckOptions::default()
    };
    assert!(matches!(execute_check(&options), Err(CliError::NoInput)));
}

#[test]
fn test_invalid_input() {
    let options = |input: &str| CheckOptions {
        query: "xp = 0".to_string(),
        input: Some(input.to_string()),
        ..CheckOptions::default()
    };
    assert!(matches!(execute_check(&options("[1, ")), Err(CliError::Json(_))));
    assert!(matches!(execute_check(&options("42")), Err(CliError::InvalidCards)));
}

#[test]
fn test_invalid_schema() {
    let options = CheckOptions {
        query: "xp = 0".to_string(),
        input: Some(CARDS.to_string()),
        fields: Some(r#"{"xp": {"type": "integer"}}"#.to_string()),
        ..CheckOptions::default()
    };
    assert!(matches!(execute_check(&options), Err(CliError::Json(_))));
}

// ============================================================================
// Inspection and Docs
// ============================================================================

#[test]
fn test_tokens_and_parse_commands() {
    let lines = dump_tokens("name = /^the/").unwrap();
    assert!(lines[2].starts_with("REGEX"));

    assert_eq!(
        render_expression("XP>3&trait='practiced'", false, 256).unwrap(),
        r#"xp > 3 & trait = "practiced""#
    );
    let tree = render_expression("a + b * c = 1", true, 256).unwrap();
    assert_eq!(
        tree,
        "Binary =\n  Binary +\n    Identifier a\n    Binary *\n      Identifier b\n      Identifier c\n  Literal 1"
    );
}

#[test]
fn test_docs() {
    assert!(get_docs_overview().contains("DOCUMENTATION CATEGORIES"));
    for category in ["syntax", "operators", "equality", "fields", "errors"] {
        assert!(get_doc_category(category).is_ok(), "missing docs for {}", category);
    }
    assert!(matches!(
        get_doc_category("onboard"),
        Err(CliError::UnknownCategory(_))
    ));
}
