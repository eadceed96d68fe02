//! 内置默认规则集（奖学金资格评定）
//!
//! 规则以 JSON 数据形式随库编译，未提供外部规则或外部规则校验失败时由调用方使用。

use crate::models::Rule;
use crate::validator::RuleSetValidator;
use std::sync::LazyLock;

/// 默认规则集的 JSON 原文
pub const DEFAULT_RULES_JSON: &str = include_str!("../rules/default_rules.json");

static DEFAULT_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    RuleSetValidator::parse_str(DEFAULT_RULES_JSON).expect("内置默认规则必须通过校验")
});

/// 获取默认规则集
pub fn default_rules() -> &'static [Rule] {
    &DEFAULT_RULES
}
