//! 可观测性模块
//!
//! 统一初始化结构化日志，所有二进制通过单一入口点配置日志输出。

pub mod tracing;

use serde::Deserialize;

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 日志级别（如 "info", "debug"），`RUST_LOG` 优先
    pub log_level: String,

    /// 是否启用 JSON 格式日志
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// 初始化日志
///
/// 日志写入 stderr，stdout 保留给评估结果输出。
/// 全局 subscriber 已存在时返回错误。
pub fn init(config: &ObservabilityConfig) -> anyhow::Result<()> {
    tracing::init(config)?;

    ::tracing::debug!(
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Observability initialized"
    );

    Ok(())
}
