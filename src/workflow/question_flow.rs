//! 单题编写流程 - 流程层
//!
//! 流程顺序：
//! 1. 课程要求为空时从课程表补全
//! 2. 需要时调用 AI 生成题目内容
//! 3. AI 失败或未启用时使用手写内容
//! 4. 拆出 "Đáp án:" 行作为答案
//! 5. 结构校验，没有错误级问题才加入会话

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{info, warn};

use crate::models::{
    CurriculumDb, GenerationRequest, GenerationStatus, QuestionDraft, QuestionRecord,
};
use crate::services::{
    has_blocking_issue, prompt_one_question, validate_question_schema, AiService,
    ValidationIssue,
};
use crate::utils::logging::truncate_text;
use crate::workflow::session_ctx::SessionContext;

/// 编写结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeResult {
    /// 已加入会话，附带下标
    Added(usize),
    /// 存在错误级问题，未加入
    Rejected,
}

/// 一次编写的完整输出
#[derive(Debug, Clone)]
pub struct ComposeOutcome {
    pub result: ComposeResult,
    pub record: QuestionRecord,
    pub issues: Vec<ValidationIssue>,
    /// 只有请求了 AI 时才有
    pub ai_status: Option<GenerationStatus>,
}

impl ComposeOutcome {
    pub fn added(&self) -> bool {
        matches!(self.result, ComposeResult::Added(_))
    }
}

fn answer_line() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^[ \t]*Đáp án[ \t]*:[ \t]*(.*?)[ \t]*$").ok())
        .as_ref()
}

/// 从内容中拆出最后一行 `Đáp án: ...`
///
/// 返回 `(去掉答案行后的内容, 答案)`；没有答案行时原样返回内容。
pub fn extract_answer(content: &str) -> (String, Option<String>) {
    let Some(captures) = answer_line().and_then(|re| re.captures_iter(content).last()) else {
        return (content.trim().to_string(), None);
    };
    let (Some(whole), Some(answer)) = (captures.get(0), captures.get(1)) else {
        return (content.trim().to_string(), None);
    };

    let answer = answer.as_str().trim();
    if answer.is_empty() {
        return (content.trim().to_string(), None);
    }

    let mut remaining = String::with_capacity(content.len());
    remaining.push_str(&content[..whole.start()]);
    remaining.push_str(&content[whole.end()..]);
    (remaining.trim().to_string(), Some(answer.to_string()))
}

/// 单题编写流程
///
/// - 不持有会话状态，会话由调用方传入
/// - AI 失败不会中断流程
pub struct QuestionFlow {
    ai: Arc<AiService>,
    curriculum: Option<Arc<CurriculumDb>>,
}

impl QuestionFlow {
    pub fn new(ai: Arc<AiService>, curriculum: Option<Arc<CurriculumDb>>) -> Self {
        Self { ai, curriculum }
    }

    /// 课程要求为空时从课程表查找
    fn fill_yccd(&self, draft: &QuestionDraft) -> String {
        if !draft.yccd.trim().is_empty() {
            return draft.yccd.trim().to_string();
        }
        self.curriculum
            .as_ref()
            .map(|db| db.find_yccd(&draft.subject, &draft.grade, &draft.topic, &draft.lesson))
            .unwrap_or_default()
    }

    pub async fn compose(&self, session: &mut SessionContext, draft: &QuestionDraft) -> ComposeOutcome {
        let mut draft = draft.clone();
        draft.yccd = self.fill_yccd(&draft);

        let mut content = String::new();
        let mut ai_status = None;
        if draft.use_ai {
            let request = GenerationRequest::new(prompt_one_question(&draft));
            let status = self.ai.generate(&session.client, &request).await;
            if status.succeeded() {
                info!(
                    "AI OK ({}): {}",
                    status.used_identifier().unwrap_or_default(),
                    truncate_text(status.message(), 60)
                );
                content = status.message().to_string();
            } else {
                warn!("AI lỗi → chuyển sang chế độ nhập tay. {}", status.message());
            }
            ai_status = Some(status);
        }
        if content.trim().is_empty() {
            content = draft.manual_content.clone();
        }

        let (content, extracted) = if draft.answer.trim().is_empty() {
            extract_answer(&content)
        } else {
            (content.trim().to_string(), None)
        };
        let answer = extracted.unwrap_or_else(|| draft.answer.trim().to_string());

        let record = QuestionRecord {
            subject: draft.subject,
            grade: draft.grade,
            topic: draft.topic,
            lesson: draft.lesson,
            yccd: draft.yccd,
            question_type: draft.question_type,
            level: draft.level,
            points: draft.points,
            content,
            answer,
        };

        let issues = validate_question_schema(&record);
        let result = if has_blocking_issue(&issues) {
            for issue in &issues {
                warn!("题目未加入: {}", issue.message);
            }
            ComposeResult::Rejected
        } else {
            session.questions.push(record.clone());
            let index = session.questions.len() - 1;
            info!("✓ Đã thêm: {} lớp {} — {}", record.subject, record.grade, record.lesson);
            ComposeResult::Added(index)
        };

        ComposeOutcome {
            result,
            record,
            issues,
            ai_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_trailing_answer_line() {
        let content = "Câu hỏi: 2 + 3 = ?\nA. 4\nB. 5\nC. 6\nD. 7\nĐáp án: B\n";
        let (body, answer) = extract_answer(content);
        assert_eq!(answer.as_deref(), Some("B"));
        assert_eq!(body, "Câu hỏi: 2 + 3 = ?\nA. 4\nB. 5\nC. 6\nD. 7");
    }

    #[test]
    fn test_extract_uses_last_answer_line() {
        let content = "a) ...\nđáp án: nháp\nb) ...\nĐáp án : a-Đ, b-S";
        let (body, answer) = extract_answer(content);
        assert_eq!(answer.as_deref(), Some("a-Đ, b-S"));
        assert_eq!(body, "a) ...\nđáp án: nháp\nb) ...");
    }

    #[test]
    fn test_extract_without_answer_keeps_content() {
        let (body, answer) = extract_answer("  Viết số liền sau của 99.  ");
        assert_eq!(body, "Viết số liền sau của 99.");
        assert!(answer.is_none());

        let (_, empty) = extract_answer("Câu hỏi\nĐáp án:   ");
        assert!(empty.is_none());
    }
}
