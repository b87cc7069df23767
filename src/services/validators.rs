//! 题目与试卷校验
//!
//! 校验只产出问题列表，不修改数据；是否阻止操作由调用方决定。

use serde::Serialize;

use crate::models::{QuestionRecord, ALLOWED_LEVELS, ALLOWED_TYPES};

/// 问题级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Error,
    Warning,
}

/// 一条校验问题
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub level: IssueLevel,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == IssueLevel::Error
    }
}

/// 总分校验
///
/// 任意一题分值不是数字时直接返回一条错误；
/// 总分与期望值相差超过 1e-6 时返回一条警告。
pub fn validate_score_sum(questions: &[QuestionRecord], expected_total: f64) -> Vec<ValidationIssue> {
    let mut sum = 0.0;
    for question in questions {
        match question.points.as_f64() {
            Some(points) => sum += points,
            None => {
                return vec![ValidationIssue::error(
                    "Có câu hỏi có điểm không hợp lệ (không phải số).",
                )]
            }
        }
    }

    if (sum - expected_total).abs() > 1e-6 {
        return vec![ValidationIssue::warning(format!(
            "Tổng điểm hiện tại = {}, chưa bằng {}. Bạn có thể điều chỉnh trước khi xuất.",
            format_score(sum),
            format_score(expected_total)
        ))];
    }
    Vec::new()
}

/// 分值显示：最多 6 位小数，去掉末尾的 0（9.5、10、0.3）
pub fn format_score(value: f64) -> String {
    let text = format!("{:.6}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// 单题结构校验，各项检查互不影响
pub fn validate_question_schema(question: &QuestionRecord) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if question.content.trim().is_empty() {
        issues.push(ValidationIssue::error("Nội dung câu hỏi đang trống."));
    }
    if !ALLOWED_TYPES.contains(question.question_type.as_str()) {
        issues.push(ValidationIssue::warning(
            "Dạng câu hỏi chưa nằm trong danh sách chuẩn (vẫn có thể xuất).",
        ));
    }
    if !ALLOWED_LEVELS.contains(question.level.as_str()) {
        issues.push(ValidationIssue::warning("Mức độ chưa đúng chuẩn Mức 1/2/3."));
    }
    match question.points.as_f64() {
        Some(points) if points <= 0.0 => issues.push(ValidationIssue::warning("Điểm nên > 0.")),
        Some(_) => {}
        None => issues.push(ValidationIssue::error("Điểm không hợp lệ.")),
    }

    issues
}

/// 是否存在错误级别的问题
pub fn has_blocking_issue(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(ValidationIssue::is_error)
}
