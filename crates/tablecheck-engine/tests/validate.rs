//! End-to-end validation scenarios over in-memory tables

mod common;

use common::{build, field_table, rule_table};
use pretty_assertions::assert_eq;
use tablecheck_core::{Cell, Condition, Level, RuleId, Table};
use tablecheck_engine::{validate_all, validate_table};

fn colors(rows: &[&[&str]]) -> Table {
    Table::from_records("colors", &["id", "color", "priority"], rows)
}

#[test]
fn in_reports_allowed_literals() {
    let registry = build(
        vec![field_table(&[&["colors", "color", r#"in("red", "green", "blue")"#]])],
        vec![colors(&[&["1", "red", ""], &["2", "purple", ""]])],
    );

    let messages = validate_table(&registry, "colors");
    assert_eq!(messages.len(), 1);
    let message = &messages[0];
    assert_eq!(message.level, Level::Error);
    assert_eq!(message.message, r#"'purple' must be in: "red", "green", "blue""#);
    assert_eq!(message.cell, Some(Cell::new(3, 2)));
    assert_eq!(message.rule_id, Some(RuleId::Field(2)));
}

#[test]
fn rule_fires_only_when_condition_holds() {
    let registry = build(
        vec![
            field_table(&[]),
            rule_table(&[&[
                "colors",
                "color",
                r#"in("red")"#,
                "priority",
                r#"in("high")"#,
                "",
                "red items are urgent",
            ]]),
        ],
        vec![colors(&[
            &["1", "red", "low"],
            &["2", "blue", "low"],
            &["3", "red", "high"],
        ])],
    );

    let messages = validate_table(&registry, "colors");
    assert_eq!(messages.len(), 1);
    let message = &messages[0];
    assert!(message
        .message
        .starts_with(r#"because 'red' is 'in("red")', "#));
    assert_eq!(
        message.message,
        r#"because 'red' is 'in("red")', 'low' must be in: "high""#
    );
    assert_eq!(message.cell, Some(Cell::new(2, 3)));
    assert_eq!(message.rule_id, Some(RuleId::Rule(2)));
    assert_eq!(message.rule.as_deref(), Some("red items are urgent"));
}

#[test]
fn rule_level_is_applied() {
    let registry = build(
        vec![
            field_table(&[]),
            rule_table(&[&["colors", "color", "not(blank)", "priority", "not(blank)", "warn", ""]]),
        ],
        vec![colors(&[&["1", "red", ""]])],
    );

    let messages = validate_table(&registry, "colors");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].level, Level::Warn);
    assert_eq!(
        messages[0].message,
        "because 'red' is 'not(blank)', value must not be blank"
    );
    assert_eq!(messages[0].rule, None);
}

#[test]
fn lookup_suggests_expected_value() {
    let registry = build(
        vec![
            field_table(&[]),
            rule_table(&[&[
                "orders",
                "code",
                "not(blank)",
                "status",
                "lookup(statuses, key, value)",
                "",
                "",
            ]]),
        ],
        vec![
            Table::from_records("statuses", &["key", "value"], &[&["4", "late"], &["5", "ok"]]),
            Table::from_records(
                "orders",
                &["code", "status"],
                &[&["5", "bad"], &["4", "late"], &["9", "late"]],
            ),
        ],
    );

    let messages = validate_table(&registry, "orders");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].message, "because '5' is 'not(blank)', 'bad' must be 'ok'");
    assert_eq!(messages[0].suggestion.as_deref(), Some("ok"));
    assert_eq!(messages[0].cell, Some(Cell::new(2, 2)));
    assert_eq!(
        messages[1].message,
        "because '9' is 'not(blank)', 'late' must be present in statuses.value"
    );
    assert_eq!(messages[1].suggestion, None);
}

#[test]
fn distinct_flags_each_duplicate() {
    let registry = build(
        vec![field_table(&[&["items", "id", "distinct(word)"]])],
        vec![Table::from_records("items", &["id"], &[&["x"], &["x"], &["y"]])],
    );

    let messages = validate_table(&registry, "items");
    let summary: Vec<(String, String)> = messages
        .iter()
        .map(|m| (m.cell.map(|c| c.to_string()).unwrap_or_default(), m.message.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (
                "A2".to_string(),
                "'x' must be distinct with value(s) at: items:A3".to_string()
            ),
            (
                "A3".to_string(),
                "'x' must be distinct with value(s) at: items:A2".to_string()
            ),
        ]
    );
}

#[test]
fn distinct_spans_extra_columns() {
    let registry = build(
        vec![field_table(&[&["items", "id", "distinct(word, archive.id)"]])],
        vec![
            Table::from_records("items", &["id"], &[&["x"], &["y"]]),
            Table::from_records("archive", &["id"], &[&["z"], &["y"]]),
        ],
    );

    let messages = validate_table(&registry, "items");
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0].message,
        "'y' must be distinct with value(s) at: archive:A3"
    );
}

#[test]
fn distinct_checks_expression_first() {
    let registry = build(
        vec![field_table(&[&["items", "id", "distinct(word)"]])],
        vec![Table::from_records("items", &["id"], &[&["a b"], &["a b"]])],
    );

    let messages = validate_table(&registry, "items");
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.message == "a single word"));
}

#[test]
fn tree_and_under() {
    let registry = build(
        vec![field_table(&[
            &["terms", "parent", r#"tree(id, split="|")"#],
            &["uses", "term", r#"under(terms.parent, "a")"#],
            &["uses", "direct", r#"under(terms.parent, "a", direct=true)"#],
        ])],
        vec![
            Table::from_records(
                "terms",
                &["id", "parent"],
                &[&["a", ""], &["b", "a"], &["c", "a|b"]],
            ),
            Table::from_records(
                "uses",
                &["term", "direct"],
                &[&["c", "c"], &["a", "a"], &["root-missing", "b"]],
            ),
        ],
    );

    let tree = registry.tree("terms.parent").unwrap();
    assert!(tree.has_ancestor("c", "a", false));
    assert!(tree.has_ancestor("c", "a", true));
    assert!(!tree.has_ancestor("c", "root-missing", false));

    assert!(validate_table(&registry, "terms").is_empty());

    let messages: Vec<String> = validate_table(&registry, "uses")
        .into_iter()
        .map(|m| m.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "'a' must be a direct subclass of 'a' from terms.parent",
            "'root-missing' must be equal to or under 'a' from terms.parent",
        ]
    );
}

#[test]
fn under_is_reflexive() {
    let registry = build(
        vec![field_table(&[&["terms", "parent", "tree(id)"]])],
        vec![Table::from_records(
            "terms",
            &["id", "parent"],
            &[&["a", ""], &["b", "a"], &["c", "b"]],
        )],
    );

    for node in ["a", "b", "c"] {
        let condition = Condition::call(
            "under",
            vec![Condition::field("terms", "parent"), Condition::literal(node)],
        );
        assert!(
            registry
                .validate_condition(&condition, "terms", "id", 0, node)
                .is_empty(),
            "{} should be under itself",
            node
        );
    }
}

#[test]
fn missing_tree_parents_are_reported_on_the_data_table() {
    let registry = build(
        vec![field_table(&[&["terms", "parent", "tree(id)"]])],
        vec![Table::from_records(
            "terms",
            &["id", "parent"],
            &[&["a", ""], &["b", "ghost"]],
        )],
    );

    let messages = validate_table(&registry, "terms");
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0].message,
        "'ghost' from terms.parent must exist in terms.id"
    );
    assert_eq!(messages[0].cell, Some(Cell::new(3, 2)));
    assert_eq!(messages[0].rule_id, Some(RuleId::Field(2)));
}

#[test]
fn any_and_not_are_consistent() {
    let registry = build(
        vec![field_table(&[])],
        vec![Table::from_records("values", &["v"], &[])],
    );
    let any = Condition::call(
        "any",
        vec![Condition::datatype("blank"), Condition::datatype("word")],
    );
    let none = Condition::call("not", vec![any.clone()]);

    for value in ["", "word", "two words", " padded"] {
        let any_passes = registry
            .validate_condition(&any, "values", "v", 0, value)
            .is_empty();
        let blank_passes = value.is_empty();
        let word_passes = registry
            .validate_condition(&Condition::datatype("word"), "values", "v", 0, value)
            .is_empty();
        assert_eq!(any_passes, blank_passes || word_passes, "any on {:?}", value);

        let none_passes = registry
            .validate_condition(&none, "values", "v", 0, value)
            .is_empty();
        assert_eq!(none_passes, !any_passes, "not(any) on {:?}", value);
    }
}

#[test]
fn any_lists_attempted_conditions() {
    let registry = build(
        vec![field_table(&[&["values", "v", "any(blank, word)"]])],
        vec![Table::from_records("values", &["v"], &[&["two words"]])],
    );
    let messages = validate_table(&registry, "values");
    assert_eq!(messages[0].message, "'two words' must meet one of: blank, word");
}

#[test]
fn datatype_level_and_suggestion_are_kept() {
    let registry = build(
        vec![field_table(&[&["values", "v", "trimmed"]])],
        vec![Table::from_records("values", &["v"], &[&[" padded "], &["fine"]])],
    );

    let messages = validate_table(&registry, "values");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].level, Level::Warn);
    assert_eq!(messages[0].message, "text without surrounding whitespace");
    assert_eq!(messages[0].suggestion.as_deref(), Some("padded"));
}

#[test]
fn concat_list_and_sub() {
    let registry = build(
        vec![field_table(&[
            &["ids", "curie", r#"concat(word, ":", word)"#],
            &["ids", "tags", r#"list("|", word)"#],
            &["ids", "label", "sub(s/ /_/g, word)"],
        ])],
        vec![Table::from_records(
            "ids",
            &["curie", "tags", "label"],
            &[
                &["OBI:0000001", "a|b", "two words"],
                &["OBI0000001", "a|b c|d e", "bad-label!"],
                &["OBI:", "a", "ok"],
            ],
        )],
    );

    let messages: Vec<(String, String)> = validate_table(&registry, "ids")
        .into_iter()
        .map(|m| (m.cell.map(|c| c.to_string()).unwrap_or_default(), m.message))
        .collect();
    assert_eq!(
        messages,
        vec![
            (
                "A3".to_string(),
                "'OBI0000001' must contain substring ':'".to_string()
            ),
            ("B3".to_string(), "a single word; a single word".to_string()),
            ("C3".to_string(), "a single word".to_string()),
            ("A4".to_string(), "a single word".to_string()),
        ]
    );
}

#[test]
fn star_fields_apply_to_every_table() {
    let registry = build(
        vec![field_table(&[
            &["*", "id", "word"],
            &["special", "id", "any(blank, word)"],
        ])],
        vec![
            Table::from_records("plain", &["id"], &[&[""]]),
            Table::from_records("special", &["id"], &[&[""]]),
        ],
    );

    let outcomes = validate_all(&registry);
    let tables: Vec<&str> = outcomes.iter().map(|o| o.table.as_str()).collect();
    assert_eq!(tables, vec!["plain", "special"]);
    assert_eq!(outcomes[0].messages.len(), 1);
    assert!(outcomes[1].messages.is_empty());
}

#[test]
fn quoted_datatype_names_match_like_bare_ones() {
    let registry = build(
        vec![field_table(&[
            &["colors", "color", r#"not("blank")"#],
            &["colors", "priority", r#"any("blank", word)"#],
        ])],
        vec![colors(&[&["1", "", ""], &["2", "red", "high"]])],
    );

    let messages = validate_table(&registry, "colors");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message, "value must not be blank");
    assert_eq!(messages[0].cell, Some(Cell::new(2, 2)));
}

#[test]
fn lookup_uses_the_when_value_of_the_rule_that_fired() {
    let registry = build(
        vec![
            field_table(&[]),
            rule_table(&[
                &["names", "code", "not(blank)", "name", "lookup(ref, key, val)", "", ""],
                &["names", "alt", "not(blank)", "name", "lookup(ref, key, val)", "", ""],
            ]),
        ],
        vec![
            Table::from_records("ref", &["key", "val"], &[&["1", "one"], &["2", "two"]]),
            Table::from_records(
                "names",
                &["code", "alt", "name"],
                &[&["", "2", "two"], &["1", "2", "one"]],
            ),
        ],
    );

    let messages = validate_table(&registry, "names");
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0].message,
        "because '2' is 'not(blank)', 'one' must be 'two'"
    );
    assert_eq!(messages[0].cell, Some(Cell::new(3, 3)));
    assert_eq!(messages[0].rule_id, Some(RuleId::Rule(3)));
    assert_eq!(messages[0].suggestion.as_deref(), Some("two"));
}
