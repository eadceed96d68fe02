//! 条件评估器
//!
//! 对单个 `[field, operator, value]` 条件求值。评估结果是三态的 `Outcome`：
//! 匹配、不匹配、无法评估。无法评估的条件（形状错误、字段缺失、
//! 未知操作符、类型不兼容）一律视为不匹配，不会中断整体评估。

use crate::models::{Condition, Facts};
use crate::operators::Operator;
use crate::value::Value;
use std::cmp::Ordering;
use std::fmt;
use tracing::trace;

/// 条件评估结果
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Matched,
    NotMatched,
    Invalid(InvalidReason),
}

impl Outcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched)
    }

    fn from_bool(matched: bool) -> Self {
        if matched { Self::Matched } else { Self::NotMatched }
    }

    fn mismatch(operator: Operator, fact: &Value, operand: &Value) -> Self {
        Self::Invalid(InvalidReason::TypeMismatch {
            operator,
            fact: fact.type_name(),
            operand: operand.type_name(),
        })
    }
}

/// 条件无法评估的原因
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidReason {
    MalformedCondition,
    MissingField(String),
    UnknownOperator(String),
    TypeMismatch {
        operator: Operator,
        fact: &'static str,
        operand: &'static str,
    },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedCondition => write!(f, "条件不是 [field, operator, value] 三元组"),
            Self::MissingField(field) => write!(f, "字段不存在: {}", field),
            Self::UnknownOperator(op) => write!(f, "未知的操作符: {}", op),
            Self::TypeMismatch {
                operator,
                fact,
                operand,
            } => write!(f, "类型不匹配: {} {} {}", fact, operator, operand),
        }
    }
}

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 针对事实集合评估条件
    ///
    /// 检查顺序：条件形状 -> 字段是否存在 -> 操作符是否已知 -> 操作符语义。
    pub fn evaluate(facts: &Facts, condition: &Condition) -> Outcome {
        let outcome = match condition {
            Condition::Malformed(_) => Outcome::Invalid(InvalidReason::MalformedCondition),
            Condition::Clause {
                field,
                operator,
                operand,
            } => match (facts.get(field), Operator::from_symbol(operator)) {
                (None, _) => Outcome::Invalid(InvalidReason::MissingField(field.clone())),
                (Some(_), None) => {
                    Outcome::Invalid(InvalidReason::UnknownOperator(operator.clone()))
                }
                (Some(fact), Some(op)) => Self::apply(op, fact, operand),
            },
        };

        if let Outcome::Invalid(reason) = &outcome {
            trace!(condition = ?condition, reason = %reason, "条件按不匹配处理");
        }

        outcome
    }

    /// 对事实值和操作数应用操作符
    ///
    /// # Arguments
    /// * `operator` - 操作符
    /// * `fact` - 事实集合中的字段值
    /// * `operand` - 规则中定义的期望值
    pub fn apply(operator: Operator, fact: &Value, operand: &Value) -> Outcome {
        match operator {
            Operator::Eq => Outcome::from_bool(fact.loose_eq(operand)),
            Operator::Neq => Outcome::from_bool(!fact.loose_eq(operand)),
            Operator::Gt => Self::compare(operator, fact, operand, Ordering::is_gt),
            Operator::Gte => Self::compare(operator, fact, operand, Ordering::is_ge),
            Operator::Lt => Self::compare(operator, fact, operand, Ordering::is_lt),
            Operator::Lte => Self::compare(operator, fact, operand, Ordering::is_le),
            Operator::In => Self::contains(operator, fact, operand, false),
            Operator::NotIn => Self::contains(operator, fact, operand, true),
        }
    }

    /// 有序比较
    fn compare<F>(operator: Operator, fact: &Value, operand: &Value, cmp: F) -> Outcome
    where
        F: Fn(Ordering) -> bool,
    {
        match fact.try_cmp(operand) {
            Some(ordering) => Outcome::from_bool(cmp(ordering)),
            None => Outcome::mismatch(operator, fact, operand),
        }
    }

    /// 包含检查
    ///
    /// 列表按相等语义查找成员；字符串操作数只接受字符串事实（子串检查）。
    /// 类型不兼容时 `in` 和 `not_in` 都不匹配。
    fn contains(operator: Operator, fact: &Value, operand: &Value, negate: bool) -> Outcome {
        let found = match (fact, operand) {
            (_, Value::List(items)) => items.iter().any(|item| fact.loose_eq(item)),
            (Value::String(needle), Value::String(haystack)) => haystack.contains(needle.as_str()),
            _ => return Outcome::mismatch(operator, fact, operand),
        };

        Outcome::from_bool(found != negate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn facts() -> Facts {
        Facts::new()
            .with("cgpa", 3.8)
            .with("score", 85)
            .with("major", "physics")
            .with("is_resident", true)
            .with("note", Value::Null)
    }

    fn eval(field: &str, op: &str, value: impl Into<Value>) -> Outcome {
        ConditionEvaluator::evaluate(&facts(), &Condition::raw(field, op, value))
    }

    #[test]
    fn test_eq_numbers() {
        assert!(eval("score", "==", 85).is_match());
        assert!(eval("score", "==", 85.0).is_match());
        assert!(!eval("score", "==", 86).is_match());
    }

    #[test]
    fn test_eq_strings() {
        assert!(eval("major", "==", "physics").is_match());
        assert_eq!(eval("major", "==", "chemistry"), Outcome::NotMatched);
    }

    #[test]
    fn test_eq_across_types_is_plain_mismatch() {
        assert_eq!(eval("major", "==", 1), Outcome::NotMatched);
        assert_eq!(eval("major", "!=", 1), Outcome::Matched);
        assert_eq!(eval("is_resident", "==", 1), Outcome::NotMatched);
    }

    #[test]
    fn test_null_fact_is_present() {
        assert!(eval("note", "==", Value::Null).is_match());
        assert!(eval("note", "!=", 0).is_match());
    }

    #[test]
    fn test_numeric_comparisons() {
        assert!(eval("cgpa", ">", 3.5).is_match());
        assert!(eval("cgpa", ">=", 3.8).is_match());
        assert!(eval("score", "<", 100).is_match());
        assert!(eval("score", "<=", 85).is_match());
        assert!(!eval("score", "<", 85).is_match());
    }

    #[test]
    fn test_large_integer_facts() {
        let facts = Facts::from_json(r#"{"id": 9007199254740993}"#).unwrap();
        let limit: Value = serde_json::from_str("9007199254740992").unwrap();

        let eq = Condition::raw("id", "==", limit.clone());
        let gt = Condition::raw("id", ">", limit);
        assert_eq!(ConditionEvaluator::evaluate(&facts, &eq), Outcome::NotMatched);
        assert_eq!(ConditionEvaluator::evaluate(&facts, &gt), Outcome::Matched);
    }

    #[test]
    fn test_string_and_bool_ordering() {
        assert!(eval("major", ">", "chemistry").is_match());
        assert!(eval("is_resident", ">", false).is_match());
    }

    #[test]
    fn test_type_mismatch_in_comparison() {
        assert_eq!(
            eval("major", ">=", 3),
            Outcome::Invalid(InvalidReason::TypeMismatch {
                operator: Operator::Gte,
                fact: "string",
                operand: "number",
            })
        );
        assert!(!eval("note", "<", 1).is_match());
    }

    #[test]
    fn test_in_list() {
        assert!(eval("major", "in", vec!["physics", "maths"]).is_match());
        assert!(!eval("major", "in", vec!["art"]).is_match());
        assert!(eval("score", "in", vec![85.0, 90.0]).is_match());
        assert!(eval("major", "not_in", vec!["art"]).is_match());
        assert!(!eval("major", "not_in", vec!["physics"]).is_match());
    }

    #[test]
    fn test_in_substring() {
        assert!(eval("major", "in", "astrophysics").is_match());
        assert!(eval("major", "not_in", "biology").is_match());
    }

    #[test]
    fn test_in_non_container_never_matches() {
        assert!(matches!(
            eval("score", "in", 85),
            Outcome::Invalid(InvalidReason::TypeMismatch { .. })
        ));
        assert!(!eval("score", "not_in", 85).is_match());
        assert!(!eval("score", "not_in", "85").is_match());
    }

    #[test]
    fn test_missing_field() {
        assert_eq!(
            eval("age", "==", 20),
            Outcome::Invalid(InvalidReason::MissingField("age".to_string()))
        );
        assert!(!eval("age", "!=", 20).is_match());
    }

    #[test]
    fn test_unknown_operator() {
        assert_eq!(
            eval("score", "eq", 85),
            Outcome::Invalid(InvalidReason::UnknownOperator("eq".to_string()))
        );
    }

    #[test]
    fn test_malformed_condition() {
        let condition = Condition::Malformed(json!(["score", ">="]));
        assert_eq!(
            ConditionEvaluator::evaluate(&facts(), &condition),
            Outcome::Invalid(InvalidReason::MalformedCondition)
        );
    }

    #[test]
    fn test_invalid_reason_display() {
        let reason = InvalidReason::TypeMismatch {
            operator: Operator::Gt,
            fact: "string",
            operand: "number",
        };
        assert_eq!(reason.to_string(), "类型不匹配: string > number");
    }
}
