pub mod exam_flow;
pub mod question_flow;
pub mod session_ctx;

pub use exam_flow::{
    check_api, export, points_issues, remove_question, update_question, DraftOutcome, ExamFlow,
    ExportedExam, MANUAL_MODE_NOTICE,
};
pub use question_flow::{extract_answer, ComposeOutcome, ComposeResult, QuestionFlow};
pub use session_ctx::SessionContext;
