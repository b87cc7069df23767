//! 整卷流程 - 流程层
//!
//! - `check_api`：探测后端并把结果写入会话
//! - `ExamFlow::draft_from_matrix`：根据矩阵生成整卷草稿
//! - 审阅操作：修改 / 删除题目、总分检查、导出 docx

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{AppError, AppResult, InputError};
use crate::models::{ExamMeta, GenerationRequest, ProbeStatus, QuestionRecord};
use crate::services::{
    export_exam_docx, export_file_name, prompt_from_matrix, validate_score_sum, AiService,
    ValidationIssue,
};
use crate::workflow::session_ctx::SessionContext;

/// 不使用 AI 时写入草稿的提示
pub const MANUAL_MODE_NOTICE: &str = "Chế độ không AI: Tab 1 hiện chỉ hiển thị ma trận. Bạn có thể dùng Tab 2 để soạn câu và Tab 3 để xuất.";

/// 探测后端，结果写入 `ai_enabled` / `last_ai_status`
pub async fn check_api(ai: &AiService, session: &mut SessionContext) -> ProbeStatus {
    let probe = ai.check_backend(&session.client).await;
    session.ai_enabled = probe.ok();
    session.last_ai_status = probe.message().to_string();
    if probe.ok() {
        info!("✓ {}", probe.message());
    } else {
        warn!("⚠️ {}", probe.message());
    }
    probe
}

/// 整卷草稿的生成结果
#[derive(Debug, Clone, PartialEq)]
pub enum DraftOutcome {
    /// AI 生成成功，附带模型名
    Generated { model: String },
    /// AI 失败，草稿保持不变
    AiFailed { message: String },
    /// 未使用 AI，草稿为固定提示
    ManualMode,
}

/// 整卷流程
pub struct ExamFlow {
    ai: Arc<AiService>,
}

impl ExamFlow {
    pub fn new(ai: Arc<AiService>) -> Self {
        Self { ai }
    }

    /// 根据已读取的矩阵生成整卷草稿
    ///
    /// 会话中没有矩阵时返回 `InputError::MatrixNotLoaded`。
    pub async fn draft_from_matrix(
        &self,
        session: &mut SessionContext,
        subject: &str,
        grade: &str,
        term: &str,
        use_ai: bool,
    ) -> AppResult<DraftOutcome> {
        let matrix = session
            .matrix
            .as_ref()
            .ok_or(AppError::Input(InputError::MatrixNotLoaded))?;

        if !use_ai {
            session.exam_draft = MANUAL_MODE_NOTICE.to_string();
            return Ok(DraftOutcome::ManualMode);
        }

        let prompt = prompt_from_matrix(matrix, subject, grade, term)?;
        let status = self
            .ai
            .generate(&session.client, &GenerationRequest::new(prompt))
            .await;

        if let Some(model) = status.used_identifier() {
            info!("✓ Đã sinh đề bằng: {}", model);
            let model = model.to_string();
            session.exam_draft = status.into_message();
            Ok(DraftOutcome::Generated { model })
        } else {
            warn!("⚠️ 整卷生成失败: {}", status.message());
            Ok(DraftOutcome::AiFailed {
                message: status.into_message(),
            })
        }
    }
}

fn check_index(session: &SessionContext, index: usize) -> AppResult<()> {
    if index >= session.questions.len() {
        return Err(AppError::Input(InputError::IndexOutOfRange {
            index,
            len: session.questions.len(),
        }));
    }
    Ok(())
}

/// 替换第 `index` 道题
pub fn update_question(
    session: &mut SessionContext,
    index: usize,
    record: QuestionRecord,
) -> AppResult<()> {
    check_index(session, index)?;
    session.questions[index] = record;
    Ok(())
}

/// 删除第 `index` 道题，后面的题目依次前移
pub fn remove_question(session: &mut SessionContext, index: usize) -> AppResult<QuestionRecord> {
    check_index(session, index)?;
    Ok(session.questions.remove(index))
}

/// 总分检查
pub fn points_issues(session: &SessionContext, expected_total: f64) -> Vec<ValidationIssue> {
    validate_score_sum(&session.questions, expected_total)
}

/// 导出产物
#[derive(Debug, Clone)]
pub struct ExportedExam {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 导出会话中的全部题目
///
/// 抬头里的科目 / 年级为空时使用第一道题的值。
pub fn export(
    session: &SessionContext,
    meta: &ExamMeta,
    include_answer_key: bool,
) -> AppResult<ExportedExam> {
    let mut meta = meta.clone();
    if let Some(first) = session.questions.first() {
        if meta.subject.trim().is_empty() {
            meta.subject = first.subject.clone();
        }
        if meta.grade.trim().is_empty() {
            meta.grade = first.grade.clone();
        }
    }

    let bytes = export_exam_docx(&meta, &session.questions, include_answer_key)?;
    Ok(ExportedExam {
        file_name: export_file_name(&meta),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientConfig, Points};

    fn session_with(points: &[f64]) -> SessionContext {
        let mut session = SessionContext::new(ClientConfig::new(Some("k")));
        for (i, p) in points.iter().enumerate() {
            session.questions.push(QuestionRecord {
                subject: "Toán".into(),
                grade: "2".into(),
                lesson: format!("Bài {}", i + 1),
                points: Points::Number(*p),
                content: format!("Nội dung {}", i + 1),
                ..Default::default()
            });
        }
        session
    }

    #[test]
    fn test_remove_and_update_bounds() {
        let mut session = session_with(&[1.0, 2.0, 3.0]);
        let removed = remove_question(&mut session, 1).unwrap();
        assert_eq!(removed.lesson, "Bài 2");
        assert_eq!(session.questions[1].lesson, "Bài 3");

        let err = remove_question(&mut session, 5).unwrap_err();
        assert!(matches!(
            err,
            AppError::Input(InputError::IndexOutOfRange { index: 5, len: 2 })
        ));

        let mut edited = session.questions[0].clone();
        edited.points = Points::Number(6.0);
        update_question(&mut session, 0, edited).unwrap();
        assert!(update_question(&mut session, 2, QuestionRecord::default()).is_err());
        assert!(points_issues(&session, 9.0).is_empty());
    }

    #[test]
    fn test_export_fills_subject_and_grade_from_first_question() {
        let session = session_with(&[10.0]);
        let exported = export(&session, &ExamMeta::default(), false).unwrap();
        assert_eq!(exported.file_name, "De_Toán_lop2.docx");
        assert!(!exported.bytes.is_empty());
    }

    #[tokio::test]
    async fn test_draft_requires_matrix() {
        let ai = Arc::new(AiService::new(
            None,
            crate::clients::BackendAvailability::unavailable("no backend"),
        ));
        let flow = ExamFlow::new(ai);
        let mut session = session_with(&[]);

        let err = flow
            .draft_from_matrix(&mut session, "Toán", "2", "Cuối kì", false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Input(InputError::MatrixNotLoaded)));
        assert!(session.exam_draft.is_empty());
    }
}
