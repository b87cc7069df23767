//! AI 服务 - 业务能力层
//!
//! 只负责"根据提示词生成文本"这一个能力：
//! - `check_backend`：检查凭证、后端初始化和连接（单次尝试，不重试）
//! - `generate`：按模型优先级依次尝试，第一个返回非空文本的模型胜出
//!
//! 两个操作都不会返回 `Err`，所有失败都折叠进返回的状态值。

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::clients::{BackendAvailability, GenerativeBackend};
use crate::error::BackendError;
use crate::models::{
    ClientConfig, GenerationErrorKind, GenerationRequest, GenerationStatus, ProbeStatus,
};

/// 去相关标签的取值范围
pub const SEED_RANGE: (u32, u32) = (1, 10_000_000);

/// 随机数来源
pub trait SeedSource: Send + Sync {
    /// 返回闭区间 `[low, high]` 内的整数
    fn next_in_range(&self, low: u32, high: u32) -> u32;
}

/// 线程本地随机数
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSeed;

impl SeedSource for ThreadRngSeed {
    fn next_in_range(&self, low: u32, high: u32) -> u32 {
        rand::rng().random_range(low..=high)
    }
}

/// 固定值（测试用）
#[derive(Debug, Clone, Copy)]
pub struct FixedSeed(pub u32);

impl SeedSource for FixedSeed {
    fn next_in_range(&self, low: u32, high: u32) -> u32 {
        self.0.clamp(low, high)
    }
}

/// 在提示词末尾追加去相关标签
pub fn decorate_prompt(prompt: &str, seed: u32) -> String {
    format!("{}\n\n[seed:{}]", prompt, seed)
}

/// AI 服务
///
/// 职责：
/// - 不持有会话状态，凭证和模型列表每次由 `ClientConfig` 传入
/// - 严格按优先级顺序串行尝试模型，不并发
pub struct AiService {
    backend: Option<Arc<dyn GenerativeBackend>>,
    availability: BackendAvailability,
    seeds: Arc<dyn SeedSource>,
}

impl AiService {
    /// 创建新的 AI 服务
    ///
    /// `backend` 为 `None` 时 `availability` 应当标记为不可用。
    pub fn new(
        backend: Option<Arc<dyn GenerativeBackend>>,
        availability: BackendAvailability,
    ) -> Self {
        Self {
            backend,
            availability,
            seeds: Arc::new(ThreadRngSeed),
        }
    }

    /// 替换随机数来源
    pub fn with_seed_source(mut self, seeds: Arc<dyn SeedSource>) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn availability(&self) -> &BackendAvailability {
        &self.availability
    }

    /// 检查后端是否可用（不发起生成）
    pub async fn check_backend(&self, config: &ClientConfig) -> ProbeStatus {
        if config.credential().trim().is_empty() {
            return ProbeStatus::failed(
                GenerationErrorKind::MissingCredential,
                "Chưa có API key (GEMINI_API_KEY hoặc nhập trong Sidebar).",
            );
        }

        let backend = match (&self.backend, self.availability.available) {
            (Some(backend), true) => backend,
            _ => {
                let reason = self
                    .availability
                    .load_error
                    .clone()
                    .unwrap_or_else(|| "Thiếu thư viện kết nối Gemini.".to_string());
                return ProbeStatus::failed(GenerationErrorKind::LibraryUnavailable, reason);
            }
        };

        match backend.list_models(config.credential()).await {
            Ok(models) => {
                debug!("握手成功，可用模型 {} 个", models.len());
                ProbeStatus::ready("API key hợp lệ và đã kết nối.")
            }
            Err(e) => {
                warn!("握手失败: {}", e);
                ProbeStatus::failed(
                    GenerationErrorKind::ConnectionFailed,
                    format!("Không kết nối được API: {}", e),
                )
            }
        }
    }

    /// 生成文本
    pub async fn generate(
        &self,
        config: &ClientConfig,
        request: &GenerationRequest,
    ) -> GenerationStatus {
        let probe = self.check_backend(config).await;
        if !probe.ok() {
            return probe.into_failure();
        }

        // 只有探测成功才会走到这里，因此 backend 一定存在
        let Some(backend) = self.backend.as_ref() else {
            return GenerationStatus::failure(
                GenerationErrorKind::LibraryUnavailable,
                "Thiếu thư viện kết nối Gemini.",
            );
        };

        let options = request.options.merged_over_defaults();
        let seed = self.seeds.next_in_range(SEED_RANGE.0, SEED_RANGE.1);
        let prompt = decorate_prompt(&request.prompt, seed);
        let models = config.model_priority();

        let mut last_error: Option<BackendError> = None;
        for model in models {
            debug!("尝试模型: {}", model);
            match backend
                .generate_content(config.credential(), model, &prompt, &options)
                .await
            {
                Ok(text) => {
                    let text = text.trim();
                    if text.is_empty() {
                        warn!("模型 {} 返回空内容，尝试下一个", model);
                        last_error = Some(BackendError::EmptyResponse);
                        continue;
                    }
                    info!("✓ 模型 {} 生成成功 ({} 字符)", model, text.chars().count());
                    return GenerationStatus::success(text, model.clone());
                }
                Err(e) => {
                    warn!("模型 {} 调用失败: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        let last_error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "không có model nào được cấu hình".to_string());
        GenerationStatus::failure(
            GenerationErrorKind::ExhaustedModels,
            format!(
                "AI thất bại sau khi thử {} model. Lỗi cuối: {}",
                models.len(),
                last_error
            ),
        )
    }
}
