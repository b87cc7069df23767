use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{AppResult, ConfigError};

/// 凭证所在的环境变量名
pub const CREDENTIAL_ENV_VAR: &str = "GEMINI_API_KEY";

/// 默认的模型优先级（依次尝试）
pub const DEFAULT_MODEL_PRIORITY: [&str; 3] =
    ["gemini-1.5-pro", "gemini-1.5-flash", "gemini-1.0-pro"];

/// 程序配置
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- Gemini 配置 ---
    /// API 密钥（可以为空，运行时由界面/环境变量补充）
    pub gemini_api_key: String,
    pub gemini_api_base_url: String,
    /// 模型优先级，按顺序尝试
    pub model_priority: Vec<String>,
    /// 单次 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    // --- 数据与输出 ---
    /// 课程表 JSON（CT2018）
    pub curriculum_path: String,
    /// 试卷计划 TOML 存放目录
    pub plan_folder: String,
    /// docx 输出目录
    pub output_dir: String,
    /// 期望的总分
    pub expected_total_points: f64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model_priority: DEFAULT_MODEL_PRIORITY.iter().map(|m| m.to_string()).collect(),
            request_timeout_secs: 120,
            curriculum_path: "data/curriculum_ct2018.json".to_string(),
            plan_folder: "plans".to_string(),
            output_dir: "output_docx".to_string(),
            expected_total_points: 10.0,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            gemini_api_key: resolve_credential(None),
            gemini_api_base_url: std::env::var("GEMINI_API_BASE_URL").unwrap_or(default.gemini_api_base_url),
            model_priority: std::env::var("GEMINI_MODELS").ok().map(|v| parse_model_list(&v)).filter(|v| !v.is_empty()).unwrap_or(default.model_priority),
            request_timeout_secs: std::env::var("GEMINI_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            curriculum_path: std::env::var("CURRICULUM_PATH").unwrap_or(default.curriculum_path),
            plan_folder: std::env::var("PLAN_FOLDER").unwrap_or(default.plan_folder),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            expected_total_points: std::env::var("EXPECTED_TOTAL_POINTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.expected_total_points),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// 从 TOML 文件加载配置，未出现的字段使用默认值
    ///
    /// 文件中没有写 `gemini_api_key` 时仍会回退到环境变量。
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))?;

        if config.gemini_api_key.trim().is_empty() {
            config.gemini_api_key = resolve_credential(None);
        }
        config.validate()?;
        Ok(config)
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> AppResult<()> {
        if self.model_priority.is_empty() {
            return Err(ConfigError::EmptyModelPriority.into());
        }
        if let Some(index) = self.model_priority.iter().position(|m| m.trim().is_empty()) {
            return Err(ConfigError::BlankModelIdentifier { index: index + 1 }.into());
        }
        Ok(())
    }
}

/// 解析凭证：显式参数 → 环境变量 → 空字符串，结果去除首尾空白
pub fn resolve_credential(explicit: Option<&str>) -> String {
    explicit
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(CREDENTIAL_ENV_VAR).ok())
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// 解析逗号分隔的模型列表
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}
