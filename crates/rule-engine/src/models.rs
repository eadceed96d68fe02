//! 规则引擎领域模型

use crate::operators::Operator;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 未命中任何规则、或最高优先级规则缺少动作时的兜底决策
pub const FALLBACK_DECISION: &str = "REVIEW";

/// 规则定义
///
/// 线上格式：`{"name", "priority", "conditions": [[field, op, value], ...], "action"}`。
/// `priority` 缺省为 0，`conditions` 缺省为空（空条件恒为真）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

impl Rule {
    pub fn new(name: impl Into<String>, priority: i64, action: Action) -> Self {
        Self {
            name: name.into(),
            priority,
            conditions: Vec::new(),
            action: Some(action),
        }
    }

    /// 追加一个条件（构建器风格）
    pub fn when(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.conditions.push(Condition::new(field, operator, value));
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// 规则命中后实际采用的动作，缺失时使用兜底动作
    pub fn action_or_fallback(&self) -> Action {
        self.action.clone().unwrap_or_else(Action::no_action)
    }
}

/// 条件：`[field, operator, value]` 三元组
///
/// 形状不合法的条件原样保留为 `Malformed`，评估时按不匹配处理，
/// 序列化时写回原始 JSON。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConditionRepr", into = "ConditionRepr")]
pub enum Condition {
    Clause {
        field: String,
        /// 保留原始符号，未知操作符在评估时才判定为不匹配
        operator: String,
        operand: Value,
    },
    Malformed(serde_json::Value),
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self::raw(field, operator.symbol(), value)
    }

    /// 使用任意操作符符号构造条件
    pub fn raw(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self::Clause {
            field: field.into(),
            operator: operator.into(),
            operand: value.into(),
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Clause { field, .. } => Some(field),
            Self::Malformed(_) => None,
        }
    }

    /// 通过注册表解析操作符
    pub fn operator(&self) -> Option<Operator> {
        match self {
            Self::Clause { operator, .. } => Operator::from_symbol(operator),
            Self::Malformed(_) => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ConditionRepr {
    Clause(String, String, Value),
    Malformed(serde_json::Value),
}

impl From<ConditionRepr> for Condition {
    fn from(repr: ConditionRepr) -> Self {
        match repr {
            ConditionRepr::Clause(field, operator, operand) => Self::Clause {
                field,
                operator,
                operand,
            },
            ConditionRepr::Malformed(raw) => Self::Malformed(raw),
        }
    }
}

impl From<Condition> for ConditionRepr {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Clause {
                field,
                operator,
                operand,
            } => Self::Clause(field, operator, operand),
            Condition::Malformed(raw) => Self::Malformed(raw),
        }
    }
}

/// 规则动作
///
/// `decision` 是开放字符串，引擎不解释其含义。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub decision: String,
    pub reason: String,
}

impl Action {
    pub fn new(decision: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            decision: decision.into(),
            reason: reason.into(),
        }
    }

    /// 没有任何规则命中
    pub fn no_match() -> Self {
        Self::new(FALLBACK_DECISION, "No rule matched")
    }

    /// 最高优先级规则没有配置动作
    pub fn no_action() -> Self {
        Self::new(FALLBACK_DECISION, "No action")
    }
}

/// 事实集合：字段名 -> 取值
///
/// 字段缺失与字段值为 null/0 是不同的状态。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facts {
    fields: BTreeMap<String, Value>,
}

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象创建
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Facts {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 评估结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub winning_action: Action,
    /// 按优先级降序排列，同优先级保持输入顺序
    pub fired_rules: Vec<Rule>,
}

impl EvaluationResult {
    pub fn no_match() -> Self {
        Self {
            winning_action: Action::no_match(),
            fired_rules: Vec::new(),
        }
    }

    pub fn decision(&self) -> &str {
        &self.winning_action.decision
    }

    pub fn winning_rule(&self) -> Option<&Rule> {
        self.fired_rules.first()
    }

    pub fn into_parts(self) -> (Action, Vec<Rule>) {
        (self.winning_action, self.fired_rules)
    }
}
