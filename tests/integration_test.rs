use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dekiemtra::clients::{BackendAvailability, GenerativeBackend};
use dekiemtra::error::BackendError;
use dekiemtra::models::{
    ClientConfig, ExamMeta, GenerationErrorKind, GenerationOptions, GenerationRequest, Points,
    QuestionDraft,
};
use dekiemtra::services::{AiService, FixedSeed, IssueLevel};
use dekiemtra::workflow::{
    check_api, export, points_issues, ComposeResult, DraftOutcome, ExamFlow, QuestionFlow,
    SessionContext,
};
use dekiemtra::{App, Config};

/// 按模型名返回预设结果的后端
struct ScriptedBackend {
    replies: HashMap<String, Result<String, BackendError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn new(replies: &[(&str, Result<&str, &str>)]) -> Arc<Self> {
        Arc::new(Self {
            replies: replies
                .iter()
                .map(|(model, reply)| {
                    let reply = (*reply)
                        .map(str::to_string)
                        .map_err(|e| BackendError::RequestFailed(e.to_string()));
                    (model.to_string(), reply)
                })
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn generate_calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() != "list_models")
            .cloned()
            .collect()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn list_models(&self, _credential: &str) -> Result<Vec<String>, BackendError> {
        self.calls.lock().unwrap().push("list_models".to_string());
        Ok(self.replies.keys().cloned().collect())
    }

    async fn generate_content(
        &self,
        _credential: &str,
        model: &str,
        _prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push(model.to_string());
        self.replies
            .get(model)
            .cloned()
            .unwrap_or_else(|| Err(BackendError::RequestFailed(format!("unknown model {}", model))))
    }
}

fn ai_with(backend: Arc<ScriptedBackend>) -> Arc<AiService> {
    Arc::new(
        AiService::new(Some(backend), BackendAvailability::available())
            .with_seed_source(Arc::new(FixedSeed(7))),
    )
}

fn session(models: &[&str]) -> SessionContext {
    SessionContext::new(ClientConfig::new(Some("test-key")).with_models(models.iter().copied()))
}

fn draft(points: f64, use_ai: bool, manual: &str) -> QuestionDraft {
    QuestionDraft {
        subject: "Toán".into(),
        grade: "3".into(),
        topic: "Số và phép tính".into(),
        lesson: "Phép cộng".into(),
        question_type: "Trắc nghiệm (4 lựa chọn)".into(),
        level: "Mức 1: Biết".into(),
        points: Points::Number(points),
        use_ai,
        manual_content: manual.into(),
        ..Default::default()
    }
}

fn document_xml(bytes: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

#[tokio::test]
async fn test_vietnamese_generation_is_trimmed() {
    let backend = ScriptedBackend::new(&[("m1", Ok("  Câu 1: ...  "))]);
    let ai = ai_with(backend);
    let config = ClientConfig::new(Some("test-key")).with_models(["m1"]);

    let status = ai
        .generate(&config, &GenerationRequest::new("Tạo 1 câu hỏi"))
        .await;

    assert!(status.succeeded());
    assert_eq!(status.message(), "Câu 1: ...");
    assert_eq!(status.used_identifier(), Some("m1"));
}

#[tokio::test]
async fn test_check_api_updates_session() {
    let backend = ScriptedBackend::new(&[("m1", Ok("x"))]);
    let ai = ai_with(backend);
    let mut session = session(&["m1"]);

    let probe = check_api(&ai, &mut session).await;
    assert!(probe.ok());
    assert!(session.ai_enabled);
    assert_eq!(session.last_ai_status, "API key hợp lệ và đã kết nối.");

    session.refresh_credential("   ");
    let probe = check_api(&ai, &mut session).await;
    assert_eq!(probe.kind(), Some(GenerationErrorKind::MissingCredential));
    assert!(!session.ai_enabled);
}

#[tokio::test]
async fn test_compose_review_and_export() {
    let backend = ScriptedBackend::new(&[
        ("flaky", Err("quota exceeded")),
        ("good", Ok("Tính 25 + 17 = ?\nA. 32\nB. 42\nC. 41\nD. 52\nĐáp án: B")),
    ]);
    let ai = ai_with(backend.clone());
    let flow = QuestionFlow::new(ai.clone(), None);
    let mut session = session(&["flaky", "good"]);

    // AI 生成，答案行被拆出
    let first = flow.compose(&mut session, &draft(4.0, true, "")).await;
    assert_eq!(first.result, ComposeResult::Added(0));
    assert_eq!(first.record.answer, "B");
    assert!(!first.record.content.contains("Đáp án"));
    assert_eq!(backend.generate_calls(), vec!["flaky", "good"]);

    // 手写内容
    let second = flow
        .compose(&mut session, &draft(5.5, false, "Viết số liền sau của 99.\nĐáp án: 100"))
        .await;
    assert!(second.added());
    assert!(second.ai_status.is_none());
    assert_eq!(second.record.answer, "100");

    // 内容为空被拒绝
    let third = flow.compose(&mut session, &draft(0.5, false, "   ")).await;
    assert_eq!(third.result, ComposeResult::Rejected);
    assert!(third.issues.iter().any(|i| i.level == IssueLevel::Error));
    assert_eq!(session.questions.len(), 2);

    let issues = points_issues(&session, 10.0);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].level, IssueLevel::Warning);
    assert!(issues[0].message.contains("9.5"));

    let meta = ExamMeta {
        school: "Trường Tiểu học Kim Đồng".into(),
        term: "Cuối học kì I".into(),
        ..Default::default()
    };
    let exported = export(&session, &meta, true).unwrap();
    assert_eq!(exported.file_name, "De_Toán_lop3.docx");

    let xml = document_xml(&exported.bytes);
    assert!(xml.contains("Câu 1 (4 đ) - Mức 1: Biết:"));
    assert!(xml.contains("Câu 2 (5.5 đ) - Mức 1: Biết:"));
    assert!(xml.contains("Câu 1: B"));
    assert!(xml.contains("Câu 2: 100"));
}

#[tokio::test]
async fn test_ai_failure_falls_back_to_manual_content() {
    let backend = ScriptedBackend::new(&[("only", Err("e2"))]);
    let flow = QuestionFlow::new(ai_with(backend), None);
    let mut session = session(&["only"]);

    let outcome = flow
        .compose(&mut session, &draft(1.0, true, "Nội dung giáo viên tự nhập"))
        .await;

    assert!(outcome.added());
    assert_eq!(outcome.record.content, "Nội dung giáo viên tự nhập");
    let status = outcome.ai_status.unwrap();
    assert_eq!(status.kind(), Some(GenerationErrorKind::ExhaustedModels));
    assert!(status.message().contains("e2"));
}

#[tokio::test]
async fn test_draft_from_matrix_with_and_without_ai() {
    let backend = ScriptedBackend::new(&[("m1", Ok("Câu 1 (1 đ) - Mức 1: ..."))]);
    let exam_flow = ExamFlow::new(ai_with(backend));
    let mut session = session(&["m1"]);
    session
        .load_matrix(Some(("ma_tran.csv", "Mạch,Số câu\nSố học,4\n".as_bytes())))
        .unwrap();

    let outcome = exam_flow
        .draft_from_matrix(&mut session, "Toán", "3", "Cuối học kì", true)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        DraftOutcome::Generated {
            model: "m1".to_string()
        }
    );
    assert_eq!(session.exam_draft, "Câu 1 (1 đ) - Mức 1: ...");

    let outcome = exam_flow
        .draft_from_matrix(&mut session, "Toán", "3", "Cuối học kì", false)
        .await
        .unwrap();
    assert_eq!(outcome, DraftOutcome::ManualMode);
    assert!(session.exam_draft.starts_with("Chế độ không AI"));
}

#[tokio::test]
async fn test_batch_run_exports_docx_per_plan() {
    let dir = tempfile::tempdir().unwrap();
    let plans = dir.path().join("plans");
    let output = dir.path().join("out");
    std::fs::create_dir_all(&plans).unwrap();
    std::fs::write(
        plans.join("toan3.toml"),
        r#"
include_answer_key = true

[meta]
school = "Trường TH A"
subject = "Toán"
grade = "3"
term = "Cuối học kì I"

[[questions]]
subject = "Toán"
grade = "3"
type = "Tự luận"
level = "Mức 2: Hiểu"
points = 6
use_ai = true
manual_content = "Dự phòng"

[[questions]]
subject = "Toán"
grade = "3"
type = "Đúng/Sai"
level = "Mức 1: Biết"
points = 4
manual_content = "a) 5 > 3\nb) 2 > 7\nĐáp án: a-Đ, b-S"
"#,
    )
    .unwrap();

    let config = batch_config(dir.path(), &plans, &output);
    let backend = ScriptedBackend::new(&[("m1", Ok("Giải bài toán: ...\nĐáp án: 42"))]);
    let app = App::with_service(config, ai_with(backend));

    let stats = app.run().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.success, 1);
    assert_eq!(stats.failed, 0);

    let bytes = std::fs::read(output.join("toan3.docx")).unwrap();
    let xml = document_xml(&bytes);
    assert!(xml.contains("Giải bài toán: ..."));
    assert!(xml.contains("Câu 1: 42"));
    assert!(xml.contains("Câu 2: a-Đ, b-S"));

    let log = std::fs::read_to_string(dir.path().join("output.txt")).unwrap();
    assert!(log.contains("✓ toan3 → "));
    assert!(log.contains("Hoàn thành: 1/1 thành công, 0 lỗi"));
}

fn batch_config(root: &Path, plans: &Path, output: &Path) -> Config {
    Config {
        gemini_api_key: "test-key".into(),
        model_priority: vec!["m1".into()],
        plan_folder: plans.to_string_lossy().to_string(),
        output_dir: output.to_string_lossy().to_string(),
        curriculum_path: root.join("missing.json").to_string_lossy().to_string(),
        output_log_file: root.join("output.txt").to_string_lossy().to_string(),
        ..Default::default()
    }
}

fn term_plan(term: &str, content: &str, points: u32) -> String {
    format!(
        r#"
[meta]
subject = "Toán"
grade = "3"
term = "{term}"

[[questions]]
subject = "Toán"
grade = "3"
type = "Tự luận"
level = "Mức 1: Biết"
points = {points}
manual_content = "{content}"
"#
    )
}

#[tokio::test]
async fn test_batch_plans_for_same_class_do_not_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let plans = dir.path().join("plans");
    let output = dir.path().join("out");
    std::fs::create_dir_all(&plans).unwrap();
    std::fs::write(
        plans.join("toan3_giua_ki.toml"),
        term_plan("Giữa học kì I", "Đề giữa kì", 10),
    )
    .unwrap();
    std::fs::write(
        plans.join("toan3_cuoi_ki.toml"),
        term_plan("Cuối học kì I", "Đề cuối kì", 8),
    )
    .unwrap();

    let ai = Arc::new(AiService::new(None, BackendAvailability::unavailable("offline")));
    let stats = App::with_service(batch_config(dir.path(), &plans, &output), ai)
        .run()
        .await
        .unwrap();
    assert_eq!(stats.success, 2);

    let mut files: Vec<String> = std::fs::read_dir(&output)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    files.sort();
    assert_eq!(files, vec!["toan3_cuoi_ki.docx", "toan3_giua_ki.docx"]);

    let mid = document_xml(&std::fs::read(output.join("toan3_giua_ki.docx")).unwrap());
    let end = document_xml(&std::fs::read(output.join("toan3_cuoi_ki.docx")).unwrap());
    assert!(mid.contains("Đề giữa kì"));
    assert!(end.contains("Đề cuối kì"));

    // 8 分的计划总分不足，警告写入日志文件
    let log = std::fs::read_to_string(dir.path().join("output.txt")).unwrap();
    assert!(log.contains("toan3_cuoi_ki: Tổng điểm hiện tại = 8, chưa bằng 10."));
    assert!(!log.contains("toan3_giua_ki: Tổng điểm"));
}

#[tokio::test]
async fn test_batch_run_with_empty_folder() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        plan_folder: dir.path().to_string_lossy().to_string(),
        curriculum_path: dir.path().join("missing.json").to_string_lossy().to_string(),
        ..Default::default()
    };
    let ai = Arc::new(AiService::new(None, BackendAvailability::unavailable("offline")));
    let stats = App::with_service(config, ai).run().await.unwrap();
    assert_eq!(stats.total, 0);
}
