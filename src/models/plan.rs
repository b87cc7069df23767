use serde::{Deserialize, Serialize};

use crate::models::question::{ExamMeta, Points};

/// 出题表单：一道题在生成/手写之前的全部输入
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionDraft {
    pub subject: String,
    pub grade: String,
    pub topic: String,
    pub lesson: String,
    /// 为空时从课程表自动填充
    pub yccd: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub level: String,
    pub points: Points,
    /// 是否请求 AI 生成题目内容
    pub use_ai: bool,
    /// 不用 AI 或 AI 失败时使用的手写内容
    pub manual_content: String,
    pub answer: String,
}

/// 批量模式下的一份试卷计划（TOML）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamPlan {
    #[serde(default)]
    pub meta: ExamMeta,
    #[serde(default = "default_true")]
    pub include_answer_key: bool,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ExamPlan {
    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }
}
