//! 单份试卷计划处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **遍历题目**：循环处理计划中的 `Vec<QuestionDraft>`
//! 2. **流程调度**：复用同一个 `QuestionFlow`
//! 3. **AI 降级**：后端不可用时把请求 AI 的题目改为手写内容
//! 4. **总分检查**：输出警告，不阻止导出
//! 5. **导出**：写出 `.docx` 到输出目录，文件名取计划文件名，同一批次内不覆盖
//! 6. **统计输出**：记录加入/拒绝数量

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::fs;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::ExamPlan;
use crate::services::{sanitize_file_component, AiService, IssueLevel};
use crate::utils::logging::log_plan_start;
use crate::workflow::{check_api, export, points_issues, QuestionFlow, SessionContext};

/// 题目处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlanStats {
    pub added: usize,
    pub rejected: usize,
    /// AI 请求失败后改用手写内容的题数
    pub ai_fallbacks: usize,
}

/// 一份计划的处理结果
#[derive(Debug, Clone)]
pub struct PlanReport {
    pub stats: PlanStats,
    /// 导出的 docx 路径
    pub output_path: String,
    /// 题目问题和总分警告，批量结束后写入日志文件
    pub warnings: Vec<String>,
}

/// 计划名称（用于日志）
pub(crate) fn plan_name(plan: &ExamPlan) -> String {
    plan.file_path
        .as_deref()
        .and_then(|p| Path::new(p).file_stem())
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("{} lớp {}", plan.meta.subject, plan.meta.grade))
}

/// 输出文件名
///
/// 有计划文件时用其文件名（`toan3.toml` → `toan3.docx`），
/// 同一科目年级的多份计划因此不会互相覆盖；否则用 `De_{subject}_lop{grade}.docx`。
pub fn output_file_name(plan: &ExamPlan, fallback: &str) -> String {
    plan.file_path
        .as_deref()
        .and_then(|p| Path::new(p).file_stem())
        .map(|s| sanitize_file_component(&s.to_string_lossy()))
        .filter(|stem| !stem.is_empty())
        .map(|stem| format!("{}.docx", stem))
        .unwrap_or_else(|| fallback.to_string())
}

/// 处理单份试卷计划
///
/// # 参数
/// - `ai`: AI 服务
/// - `question_flow`: 单题流程（复用）
/// - `plan`: 试卷计划
/// - `plan_index` / `total`: 用于日志
/// - `config`: 配置
/// - `written`: 本批次已写出的文件，目标重复时返回错误
pub async fn process_plan(
    ai: &AiService,
    question_flow: &QuestionFlow,
    plan: &ExamPlan,
    plan_index: usize,
    total: usize,
    config: &Config,
    written: &mut HashSet<PathBuf>,
) -> Result<PlanReport> {
    log_plan_start(plan_index, total, &plan_name(plan), plan.questions.len());

    let mut session = SessionContext::from_config(config);

    // 只有计划里有题目请求 AI 时才探测
    if plan.questions.iter().any(|q| q.use_ai) {
        check_api(ai, &mut session).await;
    }

    let mut stats = PlanStats::default();
    let mut warnings = Vec::new();
    for (index, draft) in plan.questions.iter().enumerate() {
        let mut draft = draft.clone();
        if draft.use_ai && !session.ai_enabled {
            warn!(
                "[计划 {}] 题目 {}: AI 不可用，使用手写内容",
                plan_index,
                index + 1
            );
            draft.use_ai = false;
        }

        let outcome = question_flow.compose(&mut session, &draft).await;
        if outcome
            .ai_status
            .as_ref()
            .is_some_and(|status| !status.succeeded())
        {
            stats.ai_fallbacks += 1;
        }

        if outcome.added() {
            stats.added += 1;
            for issue in &outcome.issues {
                warn!("[计划 {}] 题目 {}: {}", plan_index, index + 1, issue.message);
                warnings.push(format!("Câu {}: {}", index + 1, issue.message));
            }
        } else {
            stats.rejected += 1;
            let reasons = outcome
                .issues
                .iter()
                .filter(|i| i.level == IssueLevel::Error)
                .map(|i| i.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            error!("[计划 {}] 题目 {} 未加入: {}", plan_index, index + 1, reasons);
            warnings.push(format!("Câu {} chưa được thêm: {}", index + 1, reasons));
        }
    }

    for issue in points_issues(&session, config.expected_total_points) {
        warn!("[计划 {}] ⚠️ {}", plan_index, issue.message);
        warnings.push(issue.message);
    }

    let exported = export(&session, &plan.meta, plan.include_answer_key)
        .with_context(|| format!("导出失败: {}", plan_name(plan)))?;

    let output_path =
        Path::new(&config.output_dir).join(output_file_name(plan, &exported.file_name));
    if written.contains(&output_path) {
        bail!(
            "输出文件与本批次中的其他计划重名，未写入: {}",
            output_path.display()
        );
    }

    fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("无法创建输出目录: {}", config.output_dir))?;
    fs::write(&output_path, &exported.bytes)
        .await
        .with_context(|| format!("无法写入文件: {}", output_path.display()))?;
    written.insert(output_path.clone());

    log_plan_complete(plan_index, &stats, plan.questions.len());
    info!("[计划 {}] 📄 已导出: {}", plan_index, output_path.display());

    Ok(PlanReport {
        stats,
        output_path: output_path.to_string_lossy().to_string(),
        warnings,
    })
}

fn log_plan_complete(plan_index: usize, stats: &PlanStats, total: usize) {
    info!(
        "[计划 {}] ✓ 完成: 加入 {}/{}，拒绝 {}，AI 降级 {}",
        plan_index, stats.added, total, stats.rejected, stats.ai_fallbacks
    );
}
