//! Integration tests for condition parsing through the parser trait

use tablecheck_core::{Condition, ConditionParser};
use tablecheck_expr::ExprParser;

#[test]
fn parses_meta_table_conditions() {
    let parser = ExprParser::new();
    for text in [
        "datatype_label",
        "any(blank, in(datatype.datatype))",
        "any(blank, regex)",
        r#"any(blank, in("ERROR", "error", "WARN", "warn", "INFO", "info"))"#,
        "any(blank, regex_sub)",
        "not(blank)",
    ] {
        let parsed = parser.parse(text);
        assert!(parsed.is_ok(), "failed to parse {}: {:?}", text, parsed);
    }
}

#[test]
fn parses_match_and_replace_cells() {
    let parser = ExprParser::new();

    let matcher = parser.parse(r"/^[A-Z]\w+$/").unwrap();
    assert_eq!(
        matcher,
        Condition::Regex {
            pattern: r"^[A-Z]\w+$".to_string(),
            flags: String::new(),
            replacement: None,
        }
    );

    let sub = parser.parse(r"s/^\s+(.*)$/\1/").unwrap();
    assert_eq!(
        sub,
        Condition::Regex {
            pattern: r"^\s+(.*)$".to_string(),
            flags: String::new(),
            replacement: Some(r"\1".to_string()),
        }
    );
}

#[test]
fn concat_mixes_literals_and_datatypes() {
    let parsed = ExprParser::new()
        .parse(r#"concat(prefix, ":", local_id)"#)
        .unwrap();
    let Condition::Call { name, args } = parsed else {
        panic!("expected a call");
    };
    assert_eq!(name, "concat");
    assert_eq!(args[1], Condition::literal(":"));
    assert_eq!(args[2], Condition::datatype("local_id"));
}

#[test]
fn syntax_errors_carry_position() {
    let err = ExprParser::new().parse("in(\"a\" \"b\")").unwrap_err();
    assert_eq!(err.position, 7);
    assert!(err.to_string().contains("expected ',' or ')'"));
}
