pub mod catalog;
pub mod curriculum;
pub mod generation;
pub mod loaders;
pub mod matrix;
pub mod plan;
pub mod question;

pub use catalog::{question_types_for, ALLOWED_LEVELS, ALLOWED_TYPES, LEVELS, QUESTION_TYPES_BASE};
pub use curriculum::{CurriculumDb, LessonItem};
pub use generation::{
    ClientConfig, GenerationErrorKind, GenerationOptions, GenerationRequest, GenerationStatus,
    ProbeStatus,
};
pub use loaders::{load_all_plans, load_plan};
pub use matrix::{MatrixSummary, MatrixTable};
pub use plan::{ExamPlan, QuestionDraft};
pub use question::{ExamMeta, Points, QuestionRecord};
