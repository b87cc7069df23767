//! # dekiemtra
//!
//! 小学试卷编写助手：读取评分矩阵、按课程表逐题出题（可选 Gemini 生成），
//! 校验分值并导出 Word 试卷。
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 持有 HTTP 连接，只暴露"列出模型 / 生成内容"两个能力
//! - `GenerativeBackend` - 后端 trait，测试里可以换成脚本化实现
//!
//! ### ② 业务能力层（Services）
//! - `AiService` - 凭证检查 + 按模型优先级依次尝试
//! - `validators` - 分值与题目结构校验
//! - `docx_export` - 导出 .docx
//! - `matrix_parser` / `prompt_builder`
//!
//! ### ③ 流程层（Workflow）
//! - `SessionContext` - 一个会话的全部状态
//! - `QuestionFlow` - 单题流程（AI → 手写兜底 → 校验 → 加入）
//! - `ExamFlow` - 整卷草稿与审阅导出
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理 TOML 试卷计划
//! - `orchestrator/plan_processor` - 单份计划
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{init_backend, BackendAvailability, GeminiBackend, GenerativeBackend};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ClientConfig, GenerationRequest, GenerationStatus, ProbeStatus, QuestionRecord};
pub use orchestrator::App;
pub use services::AiService;
pub use workflow::{ExamFlow, QuestionFlow, SessionContext};
