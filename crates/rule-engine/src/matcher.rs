//! 规则匹配器
//!
//! 规则的所有条件都满足（AND）时规则命中，空条件列表恒为真。

use crate::evaluator::ConditionEvaluator;
use crate::models::{Facts, Rule};

/// 规则匹配器
pub struct RuleMatcher;

impl RuleMatcher {
    /// 判断规则是否命中（短路求值，遇到不匹配的条件立即返回）
    pub fn matches(facts: &Facts, rule: &Rule) -> bool {
        rule.conditions
            .iter()
            .all(|condition| ConditionEvaluator::evaluate(facts, condition).is_match())
    }
}
