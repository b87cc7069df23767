//! 会话上下文
//!
//! 一个教师会话的全部可变状态，显式地传给各个流程，不使用全局变量。

use std::fmt::Display;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{ClientConfig, MatrixSummary, MatrixTable, QuestionRecord};
use crate::services::parse_matrix_upload;

/// 会话上下文
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// 凭证与模型优先级
    pub client: ClientConfig,
    /// 最近一次探测是否成功
    pub ai_enabled: bool,
    /// 最近一次探测的提示信息
    pub last_ai_status: String,
    pub matrix: Option<MatrixTable>,
    /// 由矩阵生成（或手动模式提示）的整卷草稿
    pub exam_draft: String,
    pub questions: Vec<QuestionRecord>,
}

impl SessionContext {
    pub fn new(client: ClientConfig) -> Self {
        Self {
            client,
            ai_enabled: false,
            last_ai_status: String::new(),
            matrix: None,
            exam_draft: String::new(),
            questions: Vec::new(),
        }
    }

    /// 用程序配置里的凭证和模型列表创建
    pub fn from_config(config: &Config) -> Self {
        let client = ClientConfig::new(Some(config.gemini_api_key.as_str()))
            .with_models(config.model_priority.iter().cloned());
        Self::new(client)
    }

    /// 界面重新输入凭证后写回客户端配置
    pub fn refresh_credential(&mut self, credential: &str) {
        self.client.set_credential(credential);
    }

    /// 读取上传的矩阵；失败时清空已有矩阵
    pub fn load_matrix(&mut self, upload: Option<(&str, &[u8])>) -> AppResult<MatrixSummary> {
        match parse_matrix_upload(upload) {
            Ok(table) => {
                let summary = table.summary();
                info!("✓ Đã đọc ma trận ({} dòng)", summary.rows);
                self.matrix = Some(table);
                Ok(summary)
            }
            Err(e) => {
                warn!("矩阵读取失败: {}", e);
                self.matrix = None;
                Err(e)
            }
        }
    }
}

impl Display for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[AI {} | ma trận: {} | {} câu]",
            if self.ai_enabled { "bật" } else { "tắt" },
            if self.matrix.is_some() { "có" } else { "chưa" },
            self.questions.len()
        )
    }
}
