//! 生成调用相关的数据模型

use serde::{Deserialize, Serialize};

use crate::config::{resolve_credential, DEFAULT_MODEL_PRIORITY};

/// 生成参数
///
/// 所有字段都是可选的；调用方只写需要覆盖的键，
/// 其余的在 `merged_over_defaults` 时使用默认值。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationOptions {
    /// 默认参数：temperature=0.7, topP=0.95, topK=40, maxOutputTokens=2048
    pub fn defaults() -> Self {
        Self {
            temperature: Some(0.7),
            top_p: Some(0.95),
            top_k: Some(40),
            max_output_tokens: Some(2048),
        }
    }

    /// 按键合并：调用方的值优先，未指定的键保留默认值
    pub fn merged_over_defaults(&self) -> Self {
        let defaults = Self::defaults();
        Self {
            temperature: self.temperature.or(defaults.temperature),
            top_p: self.top_p.or(defaults.top_p),
            top_k: self.top_k.or(defaults.top_k),
            max_output_tokens: self.max_output_tokens.or(defaults.max_output_tokens),
        }
    }
}

/// 一次生成请求
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// 失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationErrorKind {
    /// 没有可用的 API key
    MissingCredential,
    /// 后端在启动时初始化失败
    LibraryUnavailable,
    /// 握手或生成调用出错（网络 / 鉴权 / 配额）
    ConnectionFailed,
    /// 后端返回了空文本
    EmptyResponse,
    /// 所有模型都失败了
    ExhaustedModels,
}

/// 生成结果
///
/// `used_identifier` 当且仅当成功时存在，由构造函数保证。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationStatus {
    succeeded: bool,
    message: String,
    used_identifier: Option<String>,
    kind: Option<GenerationErrorKind>,
}

impl GenerationStatus {
    pub fn success(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            message: text.into(),
            used_identifier: Some(model.into()),
            kind: None,
        }
    }

    pub fn failure(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: message.into(),
            used_identifier: None,
            kind: Some(kind),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn used_identifier(&self) -> Option<&str> {
        self.used_identifier.as_deref()
    }

    pub fn kind(&self) -> Option<GenerationErrorKind> {
        self.kind
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

/// 后端探测结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeStatus {
    ok: bool,
    message: String,
    kind: Option<GenerationErrorKind>,
}

impl ProbeStatus {
    pub fn ready(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            kind: None,
        }
    }

    pub fn failed(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            kind: Some(kind),
        }
    }

    pub fn ok(&self) -> bool {
        self.ok
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> Option<GenerationErrorKind> {
        self.kind
    }

    /// 原样转成失败的生成结果（生成前探测失败时短路返回）
    pub fn into_failure(self) -> GenerationStatus {
        GenerationStatus::failure(
            self.kind.unwrap_or(GenerationErrorKind::ConnectionFailed),
            self.message,
        )
    }
}

/// 会话级客户端配置
///
/// 凭证可以在两次调用之间被界面重新写入。
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    credential: String,
    model_priority: Vec<String>,
}

impl ClientConfig {
    /// 使用显式凭证（或环境变量）和默认模型列表创建
    pub fn new(explicit_credential: Option<&str>) -> Self {
        Self {
            credential: resolve_credential(explicit_credential),
            model_priority: DEFAULT_MODEL_PRIORITY.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model_priority = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn set_credential(&mut self, credential: impl AsRef<str>) {
        self.credential = credential.as_ref().trim().to_string();
    }

    pub fn model_priority(&self) -> &[String] {
        &self.model_priority
    }
}
