pub mod ai_service;
pub mod docx_export;
pub mod matrix_parser;
pub mod prompt_builder;
pub mod validators;

pub use ai_service::{AiService, FixedSeed, SeedSource, ThreadRngSeed};
pub use docx_export::{export_exam_docx, export_file_name, sanitize_file_component};
pub use matrix_parser::{parse_matrix, parse_matrix_upload};
pub use prompt_builder::{prompt_from_matrix, prompt_one_question};
pub use validators::{
    has_blocking_issue, validate_question_schema, validate_score_sum, IssueLevel, ValidationIssue,
};
