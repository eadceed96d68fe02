//! 规则引擎 / 冲突消解
//!
//! 对全部规则求值，按优先级降序稳定排序命中的规则，取第一条规则的动作作为决策。

use crate::matcher::RuleMatcher;
use crate::models::{EvaluationResult, Facts, Rule};
use std::cmp::Reverse;
use tracing::{debug, instrument};

/// 规则引擎
///
/// 无状态：每次评估都是 (facts, rules) 的纯函数，可在多线程间自由共享。
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// 执行规则评估
    #[instrument(skip_all, fields(rules = rules.len(), facts = facts.len()))]
    pub fn run(&self, facts: &Facts, rules: &[Rule]) -> EvaluationResult {
        let mut fired: Vec<Rule> = rules
            .iter()
            .filter(|rule| RuleMatcher::matches(facts, rule))
            .cloned()
            .collect();

        if fired.is_empty() {
            debug!("没有规则命中，使用兜底决策");
            return EvaluationResult::no_match();
        }

        // sort_by_key 是稳定排序：同优先级的规则保持输入顺序，先出现者胜出
        fired.sort_by_key(|rule| Reverse(rule.priority));

        let winning_action = fired[0].action_or_fallback();

        debug!(
            fired = fired.len(),
            winner = %fired[0].name,
            decision = %winning_action.decision,
            "规则评估完成"
        );

        EvaluationResult {
            winning_action,
            fired_rules: fired,
        }
    }
}
