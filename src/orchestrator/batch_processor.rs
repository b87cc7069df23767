//! 批量出卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是批量模式的入口，负责资源初始化和计划调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、生成后端、课程表
//! 2. **批量加载**：扫描并加载所有试卷计划（`Vec<ExamPlan>`）
//! 3. **顺序处理**：一份计划处理完再开始下一份
//! 4. **全局统计**：汇总所有计划的处理结果
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 `AiService` 和课程表的模块
//! - **向下委托**：单份计划交给 `plan_processor`

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::clients::init_backend;
use crate::config::Config;
use crate::models::{load_all_plans, CurriculumDb, ExamPlan};
use crate::orchestrator::plan_processor::{self, PlanReport};
use crate::services::AiService;
use crate::utils::logging::{append_log_line, init_log_file, log_startup, print_final_stats};
use crate::workflow::QuestionFlow;

/// 应用主结构
pub struct App {
    config: Config,
    ai: Arc<AiService>,
    question_flow: QuestionFlow,
}

/// 批量处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

impl App {
    /// 初始化应用
    ///
    /// 后端初始化失败不会中断启动，需要 AI 的题目会改用手写内容。
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(&config.plan_folder, &config.model_priority);

        let (backend, availability) = init_backend(&config);
        if let Some(reason) = &availability.load_error {
            warn!("⚠️ Gemini 后端不可用: {}", reason);
        }
        let ai = Arc::new(AiService::new(backend, availability));

        Ok(Self::with_service(config, ai))
    }

    /// 使用已有的 AI 服务创建（测试里注入脚本化后端）
    pub fn with_service(config: Config, ai: Arc<AiService>) -> Self {
        let curriculum = match CurriculumDb::from_json_file(Path::new(&config.curriculum_path)) {
            Ok(db) => {
                info!("✓ 已加载课程表: {} 个科目", db.subjects().len());
                Some(Arc::new(db))
            }
            Err(e) => {
                warn!("⚠️ 课程表不可用，YCCĐ 不会自动填充: {}", e);
                None
            }
        };

        let question_flow = QuestionFlow::new(ai.clone(), curriculum);
        Self {
            config,
            ai,
            question_flow,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let plans = self.load_plans().await?;

        if plans.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(ProcessingStats::default());
        }
        info!("✓ 找到 {} 份试卷计划", plans.len());

        let stats = self.process_all_plans(&plans).await;

        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );
        Ok(stats)
    }

    /// 加载试卷计划
    async fn load_plans(&self) -> Result<Vec<ExamPlan>> {
        info!("\n📁 正在扫描试卷计划...");
        load_all_plans(&self.config.plan_folder).await
    }

    /// 依次处理所有计划
    async fn process_all_plans(&self, plans: &[ExamPlan]) -> ProcessingStats {
        let mut stats = ProcessingStats {
            total: plans.len(),
            ..Default::default()
        };

        let mut written = HashSet::new();
        for (idx, plan) in plans.iter().enumerate() {
            let plan_index = idx + 1;
            let result: Result<PlanReport> = plan_processor::process_plan(
                &self.ai,
                &self.question_flow,
                plan,
                plan_index,
                plans.len(),
                &self.config,
                &mut written,
            )
            .await;

            let name = plan_processor::plan_name(plan);
            match result {
                Ok(report) if report.stats.rejected == 0 => {
                    stats.success += 1;
                    self.write_log(&format!("✓ {} → {}", name, report.output_path));
                    self.write_report_warnings(&name, &report);
                }
                Ok(report) => {
                    warn!(
                        "[计划 {}] 有 {} 道题未加入，已导出其余题目: {}",
                        plan_index, report.stats.rejected, report.output_path
                    );
                    stats.failed += 1;
                    self.write_log(&format!(
                        "⚠ {}: {} câu chưa được thêm → {}",
                        name, report.stats.rejected, report.output_path
                    ));
                    self.write_report_warnings(&name, &report);
                }
                Err(e) => {
                    error!("[计划 {}] ❌ 处理过程中发生错误: {:#}", plan_index, e);
                    stats.failed += 1;
                    self.write_log(&format!("✗ {}: {:#}", name, e));
                }
            }
        }

        self.write_log(&format!(
            "Hoàn thành: {}/{} thành công, {} lỗi",
            stats.success, stats.total, stats.failed
        ));
        stats
    }

    fn write_report_warnings(&self, name: &str, report: &PlanReport) {
        for warning in &report.warnings {
            self.write_log(&format!("  {}: {}", name, warning));
        }
    }

    /// 写日志文件失败只记警告，不影响出卷
    fn write_log(&self, line: &str) {
        if let Err(e) = append_log_line(&self.config.output_log_file, line) {
            warn!("⚠️ 无法写入日志文件 {}: {}", self.config.output_log_file, e);
        }
    }
}
