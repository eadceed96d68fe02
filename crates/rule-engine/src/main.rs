//! 规则引擎命令行入口
//!
//! 从配置的文件或标准输入读取事实，按外部规则（或内置默认规则）评估，
//! 将决策以 JSON 输出到标准输出。

use anyhow::{Context, Result};
use eligibility_shared::config::AppConfig;
use eligibility_shared::observability;
use rule_engine::{Facts, Rule, RuleEngine, RuleSetSource, RuleSetValidator};
use serde::Serialize;
use std::io::Read;
use tracing::{info, warn};

/// 命令行输出
#[derive(Serialize)]
struct DecisionOutput<'a> {
    decision: &'a str,
    reason: &'a str,
    /// 规则来源：custom 或 default
    rule_source: &'static str,
    fired_rules: &'a [Rule],
}

fn main() -> Result<()> {
    let config = AppConfig::load("rule-engine").unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    observability::init(&config.observability)?;

    let source = load_rules(config.engine.rules_path.as_deref());
    info!(
        rules = source.rules().len(),
        default = source.is_default(),
        "Rule set loaded"
    );

    let facts = read_facts(config.engine.facts_path.as_deref())?;

    let result = RuleEngine::new().run(&facts, source.rules());

    let output = DecisionOutput {
        decision: &result.winning_action.decision,
        reason: &result.winning_action.reason,
        rule_source: if source.is_default() { "default" } else { "custom" },
        fired_rules: &result.fired_rules,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// 加载规则文件；文件不可读或校验失败时回退到默认规则并记录原因
fn load_rules(path: Option<&str>) -> RuleSetSource {
    let Some(path) = path else {
        return RuleSetValidator::load_or_default(None);
    };

    match std::fs::read_to_string(path) {
        Ok(json) => {
            let source = RuleSetValidator::load_or_default(Some(&json));
            if let Some(error) = source.error() {
                warn!(path = %path, error = %error, "Invalid rules file, using default rules");
            }
            source
        }
        Err(e) => {
            warn!(path = %path, error = %e, "Failed to read rules file, using default rules");
            RuleSetValidator::load_or_default(None)
        }
    }
}

/// 读取事实 JSON 对象
fn read_facts(path: Option<&str>) -> Result<Facts> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read facts file {}", path))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read facts from stdin")?;
            buf
        }
    };

    Facts::from_json(&json).context("Facts must be a JSON object of scalar values")
}
