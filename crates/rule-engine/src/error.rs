//! 规则引擎错误类型
//!
//! 只有规则集的结构问题会以错误形式向外报告；
//! 条件内容的问题（缺失字段、未知操作符、类型不匹配）一律按不匹配处理。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则校验失败: {path}: {message}")]
    Validation { path: String, message: String },

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RuleError {
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
