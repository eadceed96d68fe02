//! 前向链规则引擎
//!
//! 根据一组事实和声明式规则（扁平 AND 条件 + 优先级 + 动作）计算命中的规则，
//! 并按最高优先级选出唯一的决策：
//! - JSON 规则定义的解析与结构校验
//! - 条件求值（类型不兼容按不匹配处理，永不中断评估）
//! - 按优先级稳定排序的冲突消解
//! - 内置默认规则集

pub mod defaults;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod matcher;
pub mod models;
pub mod operators;
pub mod validator;
pub mod value;

pub use defaults::{default_rules, DEFAULT_RULES_JSON};
pub use engine::RuleEngine;
pub use error::{Result, RuleError};
pub use evaluator::{ConditionEvaluator, InvalidReason, Outcome};
pub use matcher::RuleMatcher;
pub use models::{Action, Condition, EvaluationResult, Facts, Rule, FALLBACK_DECISION};
pub use operators::Operator;
pub use validator::{RuleSetSource, RuleSetValidator, ValidationReport};
pub use value::Value;

/// 评估单个条件
pub fn evaluate_condition(facts: &Facts, condition: &Condition) -> bool {
    ConditionEvaluator::evaluate(facts, condition).is_match()
}

/// 判断规则是否命中
pub fn rule_matches(facts: &Facts, rule: &Rule) -> bool {
    RuleMatcher::matches(facts, rule)
}

/// 运行规则集，返回 (决策动作, 按优先级排序的命中规则)
pub fn run_rules(facts: &Facts, rules: &[Rule]) -> (Action, Vec<Rule>) {
    RuleEngine::new().run(facts, rules).into_parts()
}
