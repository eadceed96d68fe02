//! 规则引擎集成测试
//!
//! 测试完整的规则解析、校验、评估工作流。

use rule_engine::{
    default_rules, evaluate_condition, rule_matches, run_rules, Action, Condition, Facts,
    Operator, Rule, RuleEngine, RuleSetValidator, FALLBACK_DECISION,
};
use serde_json::json;

/// 测试事实：优秀候选人
fn merit_applicant() -> Facts {
    Facts::new()
        .with("cgpa", 3.8)
        .with("co_curricular_score", 85)
        .with("family_income", 7000)
        .with("disciplinary_actions", 0)
}

fn priorities(rules: &[Rule]) -> Vec<i64> {
    rules.iter().map(|r| r.priority).collect()
}

// ==================== 默认规则场景 ====================

#[test]
fn test_scenario_top_merit_award_full() {
    let (action, fired) = run_rules(&merit_applicant(), default_rules());

    assert_eq!(action.decision, "AWARD_FULL");
    // 同时满足部分奖学金规则
    assert_eq!(priorities(&fired), vec![100, 80]);
}

#[test]
fn test_scenario_low_cgpa_rejected() {
    let facts = Facts::new()
        .with("cgpa", 2.0)
        .with("co_curricular_score", 0)
        .with("family_income", 20000)
        .with("disciplinary_actions", 0);

    let (action, fired) = run_rules(&facts, default_rules());

    assert_eq!(action.decision, "REJECT");
    assert_eq!(action.reason, "CGPA below minimum scholarship requirement");
    assert_eq!(priorities(&fired), vec![95]);
}

#[test]
fn test_scenario_need_based_review() {
    let facts = Facts::new()
        .with("cgpa", 2.6)
        .with("co_curricular_score", 10)
        .with("family_income", 3000)
        .with("disciplinary_actions", 0);

    let (action, fired) = run_rules(&facts, default_rules());

    assert_eq!(action.decision, "REVIEW");
    assert_eq!(action.reason, "High need but borderline academic score");
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].name, "Need-based review");
    assert_eq!(fired[0].priority, 70);
}

#[test]
fn test_scenario_two_rejections_ordered_by_priority() {
    let facts = Facts::new().with("cgpa", 2.0).with("disciplinary_actions", 3);

    let (action, fired) = run_rules(&facts, default_rules());

    assert_eq!(action.decision, "REJECT");
    assert_eq!(action.reason, "CGPA below minimum scholarship requirement");
    assert_eq!(priorities(&fired), vec![95, 90]);
    assert_eq!(fired[1].name, "Serious disciplinary record");
}

#[test]
fn test_no_rule_matched() {
    let facts = Facts::new().with("age", 30);

    let (action, fired) = run_rules(&facts, default_rules());

    assert_eq!(action, Action::no_match());
    assert_eq!(action.decision, FALLBACK_DECISION);
    assert_eq!(action.reason, "No rule matched");
    assert!(fired.is_empty());
}

// ==================== 外部规则工作流 ====================

#[test]
fn test_full_workflow_with_custom_rules() {
    let rules_json = r#"
    [
        {
            "name": "International honours",
            "priority": 60,
            "conditions": [
                ["nationality", "not_in", ["local"]],
                ["cgpa", ">=", 3.5]
            ],
            "action": {"decision": "AWARD_PARTIAL", "reason": "International merit"}
        },
        {
            "name": "Catch all",
            "priority": 0,
            "conditions": [],
            "action": {"decision": "REVIEW", "reason": "Manual review"}
        }
    ]
    "#;

    let rules = RuleSetValidator::parse_str(rules_json).unwrap();
    assert_eq!(rules.len(), 2);

    let facts = Facts::from_json(r#"{"nationality": "overseas", "cgpa": 3.6}"#).unwrap();
    let result = RuleEngine::new().run(&facts, &rules);
    assert_eq!(result.decision(), "AWARD_PARTIAL");
    assert_eq!(result.fired_rules.len(), 2);

    let facts = Facts::from_json(r#"{"nationality": "local", "cgpa": 3.6}"#).unwrap();
    let result = RuleEngine::new().run(&facts, &rules);
    assert_eq!(result.decision(), "REVIEW");
    assert_eq!(result.winning_rule().unwrap().name, "Catch all");
}

#[test]
fn test_wire_format_roundtrip() {
    let original = json!([
        {
            "name": "Mixed",
            "priority": 7,
            "conditions": [
                ["cgpa", ">=", 3.3],
                ["count", "==", 2],
                ["city", "in", ["Oslo", "Lima"]],
                ["flag", "==", true],
                ["broken"],
                ["x", "~", 1]
            ],
            "action": {"decision": "CUSTOM", "reason": "anything"}
        }
    ]);

    let rules = RuleSetValidator::parse_value(original.clone()).unwrap();
    let back = serde_json::to_value(&rules).unwrap();

    assert_eq!(back, original);
}

#[test]
fn test_invalid_rules_fall_back_to_defaults() {
    let source = RuleSetValidator::load_or_default(Some(r#"[{"name": "x", "priority": "high"}]"#));

    assert!(source.is_default());
    assert!(source.error().unwrap().contains("rules[0].priority"));

    let (action, _) = run_rules(&merit_applicant(), source.rules());
    assert_eq!(action.decision, "AWARD_FULL");
}

#[test]
fn test_broken_rule_content_never_fails_evaluation() {
    let rules = RuleSetValidator::parse_value(json!([
        {
            "name": "Type confusion",
            "priority": 100,
            "conditions": [["cgpa", ">=", "high"]],
            "action": {"decision": "AWARD_FULL", "reason": "never"}
        },
        {
            "name": "Not a container",
            "priority": 90,
            "conditions": [["cgpa", "not_in", 3.8]],
            "action": {"decision": "AWARD_FULL", "reason": "never"}
        },
        {
            "name": "Sane",
            "priority": 10,
            "conditions": [["cgpa", ">", 3.0]],
            "action": {"decision": "AWARD_PARTIAL", "reason": "ok"}
        }
    ]))
    .unwrap();

    let (action, fired) = run_rules(&merit_applicant(), &rules);

    assert_eq!(action.decision, "AWARD_PARTIAL");
    assert_eq!(fired.len(), 1);
}

// ==================== 入口函数 ====================

#[test]
fn test_entry_points_agree() {
    let facts = merit_applicant();
    let rule = Rule::new("merit", 1, Action::new("OK", "ok"))
        .when("cgpa", Operator::Gte, 3.7)
        .when("family_income", Operator::Lte, 8000);

    assert!(rule
        .conditions
        .iter()
        .all(|c| evaluate_condition(&facts, c)));
    assert!(rule_matches(&facts, &rule));

    let failing = rule.clone().with_condition(Condition::raw("cgpa", "<", 1));
    assert!(!rule_matches(&facts, &failing));
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let engine = RuleEngine::new();
    let facts = merit_applicant();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| engine.run(&facts, default_rules())))
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().decision(), "AWARD_FULL");
        }
    });
}
