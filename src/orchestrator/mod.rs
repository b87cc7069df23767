//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量出卷处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载试卷计划（Vec<ExamPlan>）
//! - 持有生成后端和课程表
//! - 输出全局统计信息
//!
//! ### `plan_processor` - 单份计划处理器
//! - 遍历计划的所有题目（Vec<QuestionDraft>）
//! - 复用 QuestionFlow
//! - 总分检查与导出 docx
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ExamPlan>)
//!     ↓
//! plan_processor (处理 Vec<QuestionDraft>)
//!     ↓
//! workflow::QuestionFlow (处理单道题)
//!     ↓
//! services (能力层：ai / validators / docx)
//!     ↓
//! clients (Gemini REST)
//! ```

pub mod batch_processor;
pub mod plan_processor;

pub use batch_processor::{App, ProcessingStats};
pub use plan_processor::{output_file_name, process_plan, PlanReport, PlanStats};
