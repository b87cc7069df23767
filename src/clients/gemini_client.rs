//! Gemini API 客户端
//!
//! 封装所有与 Gemini REST API 相关的调用逻辑：
//! - `list_models`：轻量握手，用于检查 API key 与连接
//! - `generate_content`：对单个模型发起一次生成
//!
//! 这一层只负责"调用一次"，重试与降级由 `services::AiService` 负责。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::BackendError;
use crate::models::GenerationOptions;

/// 生成后端能力
///
/// `AiService` 只依赖这个 trait，测试中可以替换为脚本化的实现。
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// 列出可用模型（握手）
    async fn list_models(&self, credential: &str) -> Result<Vec<String>, BackendError>;

    /// 使用指定模型生成文本，返回未经裁剪的原始文本（可能为空）
    async fn generate_content(
        &self,
        credential: &str,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, BackendError>;
}

/// 启动时计算一次的后端可用性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendAvailability {
    pub available: bool,
    pub load_error: Option<String>,
}

impl BackendAvailability {
    pub fn available() -> Self {
        Self {
            available: true,
            load_error: None,
        }
    }

    pub fn unavailable(load_error: impl Into<String>) -> Self {
        Self {
            available: false,
            load_error: Some(load_error.into()),
        }
    }
}

/// 初始化 Gemini 后端
///
/// 失败时不会中断程序：返回 `None` 和记录了原因的 `BackendAvailability`，
/// 之后的每次检查都会得到 `LibraryUnavailable`。
pub fn init_backend(config: &Config) -> (Option<Arc<dyn GenerativeBackend>>, BackendAvailability) {
    match GeminiBackend::new(config) {
        Ok(backend) => (Some(Arc::new(backend)), BackendAvailability::available()),
        Err(e) => {
            warn!("⚠️ Gemini 后端初始化失败: {}", e);
            (
                None,
                BackendAvailability::unavailable(format!("Không khởi tạo được Gemini client: {}", e)),
            )
        }
    }
}

// ========== Gemini 协议类型 ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// 拼接第一个候选的所有文本片段
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelEntry>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// 从错误响应体中提取可读信息
fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<GoogleErrorBody>(body) {
        Ok(parsed) => match parsed.error.status {
            Some(status) => format!("{} ({})", parsed.error.message, status),
            None => parsed.error.message,
        },
        Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

// ========== HTTP 实现 ==========

/// Gemini REST 客户端
pub struct GeminiBackend {
    http_client: reqwest::Client,
    api_base_url: String,
}

impl GeminiBackend {
    /// 创建新的 Gemini 客户端
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| BackendError::InitFailed(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base_url: config.gemini_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn read_error(response: reqwest::Response) -> BackendError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        BackendError::BadResponse {
            status,
            message: describe_error_body(&body),
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn list_models(&self, credential: &str) -> Result<Vec<String>, BackendError> {
        debug!("调用 Gemini models 接口");

        let response = self
            .http_client
            .get(format!("{}/models", self.api_base_url))
            .header("x-goog-api-key", credential)
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let models: ListModelsResponse = response
            .json()
            .await
            .map_err(|e| BackendError::ParseFailed(e.to_string()))?;

        let names: Vec<String> = models
            .models
            .into_iter()
            .map(|m| m.name.trim_start_matches("models/").to_string())
            .collect();

        debug!("获取到 {} 个模型", names.len());
        Ok(names)
    }

    async fn generate_content(
        &self,
        credential: &str,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, BackendError> {
        debug!("调用 Gemini generateContent，模型: {}", model);
        debug!("提示词长度: {} 字符", prompt.chars().count());

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: options.clone(),
        };

        let response = self
            .http_client
            .post(format!("{}/models/{}:generateContent", self.api_base_url, model))
            .header("x-goog-api-key", credential)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| BackendError::ParseFailed(e.to_string()))?;

        if let Some(reason) = body.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
            debug!("模型 {} 结束原因: {}", model, reason);
        }

        Ok(body.text())
    }
}
