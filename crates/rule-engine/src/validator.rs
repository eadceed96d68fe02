//! 规则集校验器
//!
//! 在外部规则数据进入引擎前校验其结构。结构错误（非数组、字段类型错误等）
//! 以带路径的 `RuleError::Validation` 报告给调用方；条件内容的问题只产生警告，
//! 因为这类条件在评估时本就按不匹配处理。

use crate::defaults;
use crate::error::{Result, RuleError};
use crate::models::{Condition, Rule};
use crate::value::Value;
use serde_json::{Map, Value as Json};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// 校验报告
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub rules: Vec<Rule>,
    /// 不影响加载、但会导致条件永远不匹配的内容问题
    pub warnings: Vec<String>,
}

/// 规则集来源
#[derive(Debug, Clone)]
pub enum RuleSetSource {
    /// 外部提供且通过校验的规则
    Custom(Vec<Rule>),
    /// 内置默认规则；`error` 为外部规则校验失败的原因，未提供外部规则时为 `None`
    Default {
        rules: Vec<Rule>,
        error: Option<String>,
    },
}

impl RuleSetSource {
    pub fn rules(&self) -> &[Rule] {
        match self {
            Self::Custom(rules) | Self::Default { rules, .. } => rules,
        }
    }

    pub fn into_rules(self) -> Vec<Rule> {
        match self {
            Self::Custom(rules) | Self::Default { rules, .. } => rules,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default { .. })
    }

    /// 校验失败时面向用户的诊断信息
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Default { error, .. } => error.as_deref(),
            Self::Custom(_) => None,
        }
    }
}

/// 规则集校验器
pub struct RuleSetValidator;

impl RuleSetValidator {
    /// 从 JSON 字符串解析并校验规则集
    pub fn parse_str(json: &str) -> Result<Vec<Rule>> {
        Self::validate_str(json).map(|report| report.rules)
    }

    /// 从已解析的 JSON 值校验规则集
    pub fn parse_value(value: Json) -> Result<Vec<Rule>> {
        Self::validate_value(value).map(|report| report.rules)
    }

    /// 解析并校验，同时返回内容警告
    #[instrument(skip_all, fields(len = json.len()))]
    pub fn validate_str(json: &str) -> Result<ValidationReport> {
        let value: Json = serde_json::from_str(json)?;
        Self::validate_value(value)
    }

    pub fn validate_value(value: Json) -> Result<ValidationReport> {
        let items = match &value {
            Json::Array(items) => items,
            other => {
                return Err(RuleError::validation(
                    "rules",
                    format!("规则必须是 JSON 数组，实际为 {}", json_type_name(other)),
                ));
            }
        };

        for (i, item) in items.iter().enumerate() {
            Self::validate_rule(item, &format!("rules[{}]", i))?;
        }

        let rules: Vec<Rule> = serde_json::from_value(value)?;
        let warnings = Self::collect_warnings(&rules);

        debug!(rules = rules.len(), warnings = warnings.len(), "规则集校验通过");

        Ok(ValidationReport { rules, warnings })
    }

    /// 加载外部规则，缺失或校验失败时回退到内置默认规则
    pub fn load_or_default(json: Option<&str>) -> RuleSetSource {
        let Some(json) = json else {
            return RuleSetSource::Default {
                rules: defaults::default_rules().to_vec(),
                error: None,
            };
        };

        match Self::validate_str(json) {
            Ok(report) => {
                for warning in &report.warnings {
                    warn!(warning = %warning, "规则内容警告");
                }
                RuleSetSource::Custom(report.rules)
            }
            Err(e) => {
                // 原因随 RuleSetSource 返回，由调用方决定如何上报
                debug!(error = %e, "外部规则无效，使用默认规则");
                RuleSetSource::Default {
                    rules: defaults::default_rules().to_vec(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// 校验单条规则的结构
    fn validate_rule(item: &Json, path: &str) -> Result<()> {
        let obj = item.as_object().ok_or_else(|| {
            RuleError::validation(path, format!("规则必须是对象，实际为 {}", json_type_name(item)))
        })?;

        match obj.get("name") {
            Some(Json::String(name)) if !name.is_empty() => {}
            Some(Json::String(_)) => {
                return Err(RuleError::validation(format!("{}.name", path), "规则名称不能为空"));
            }
            Some(other) => {
                return Err(RuleError::validation(
                    format!("{}.name", path),
                    format!("规则名称必须是字符串，实际为 {}", json_type_name(other)),
                ));
            }
            None => {
                return Err(RuleError::validation(format!("{}.name", path), "缺少规则名称"));
            }
        }

        if let Some(priority) = obj.get("priority") {
            if priority.as_i64().is_none() {
                return Err(RuleError::validation(
                    format!("{}.priority", path),
                    format!("优先级必须是整数，实际为 {}", priority),
                ));
            }
        }

        if let Some(conditions) = obj.get("conditions") {
            if !conditions.is_array() {
                return Err(RuleError::validation(
                    format!("{}.conditions", path),
                    format!("条件列表必须是数组，实际为 {}", json_type_name(conditions)),
                ));
            }
        }

        if let Some(action) = obj.get("action") {
            Self::validate_action(action, &format!("{}.action", path))?;
        }

        Ok(())
    }

    fn validate_action(action: &Json, path: &str) -> Result<()> {
        let obj: &Map<String, Json> = action.as_object().ok_or_else(|| {
            RuleError::validation(path, format!("动作必须是对象，实际为 {}", json_type_name(action)))
        })?;

        for key in ["decision", "reason"] {
            match obj.get(key) {
                Some(Json::String(_)) => {}
                Some(other) => {
                    return Err(RuleError::validation(
                        format!("{}.{}", path, key),
                        format!("必须是字符串，实际为 {}", json_type_name(other)),
                    ));
                }
                None => {
                    return Err(RuleError::validation(format!("{}.{}", path, key), "缺少字段"));
                }
            }
        }

        Ok(())
    }

    /// 收集内容警告：这些条件不会导致加载失败，但永远不会匹配
    fn collect_warnings(rules: &[Rule]) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for (i, rule) in rules.iter().enumerate() {
            let path = format!("rules[{}]", i);

            if !seen.insert(rule.name.as_str()) {
                warnings.push(format!("{}: 规则名称重复 '{}'", path, rule.name));
            }

            if rule.action.is_none() {
                warnings.push(format!("{}: 规则 '{}' 没有动作，命中时使用兜底决策", path, rule.name));
            }

            for (j, condition) in rule.conditions.iter().enumerate() {
                let cond_path = format!("{}.conditions[{}]", path, j);
                match condition {
                    Condition::Malformed(raw) => {
                        warnings.push(format!(
                            "{}: 条件必须是 [field, operator, value] 三元组，实际为 {}",
                            cond_path, raw
                        ));
                    }
                    Condition::Clause {
                        operator, operand, ..
                    } => match condition.operator() {
                        None => {
                            warnings.push(format!("{}: 未知的操作符 '{}'", cond_path, operator));
                        }
                        Some(op) if op.expects_container() && !is_container(operand) => {
                            warnings.push(format!(
                                "{}: {} 操作符需要列表或字符串，实际为 {}",
                                cond_path,
                                op,
                                operand.type_name()
                            ));
                        }
                        Some(_) => {}
                    },
                }
            }
        }

        warnings
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::List(_) | Value::String(_))
}

/// 获取 JSON 值的类型名称
fn json_type_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
