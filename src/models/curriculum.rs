//! 课程表数据（CT2018）
//!
//! 数据结构：`data[科目][年级] = [{topic, lesson, yccd}]`

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, FileError};

/// 原始 JSON 中的一条课程
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLesson {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub lesson: Option<String>,
    #[serde(default)]
    pub yccd: Option<String>,
}

/// 清洗后的课程条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonItem {
    pub topic: String,
    pub lesson: String,
    pub yccd: String,
}

impl From<&RawLesson> for LessonItem {
    fn from(raw: &RawLesson) -> Self {
        let clean = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();
        Self {
            topic: clean(&raw.topic),
            lesson: clean(&raw.lesson),
            yccd: clean(&raw.yccd),
        }
    }
}

/// 课程表查询
#[derive(Debug, Clone, Default)]
pub struct CurriculumDb {
    data: BTreeMap<String, BTreeMap<String, Vec<RawLesson>>>,
}

impl CurriculumDb {
    pub fn new(data: BTreeMap<String, BTreeMap<String, Vec<RawLesson>>>) -> Self {
        Self { data }
    }

    pub fn from_json_str(json: &str) -> AppResult<Self> {
        let data = serde_json::from_str(json)?;
        Ok(Self::new(data))
    }

    pub fn from_json_file(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(AppError::File(FileError::NotFound { path: display }));
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::file_read_failed(&display, e))?;
        let data = serde_json::from_str(&content).map_err(|e| {
            AppError::File(FileError::JsonParseFailed {
                path: display,
                message: e.to_string(),
            })
        })?;
        Ok(Self::new(data))
    }

    /// 所有科目（按名称排序）
    pub fn subjects(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    /// 某科目的年级，按数字排序；非数字的排在后面
    pub fn grades(&self, subject: &str) -> Vec<String> {
        let mut grades: Vec<String> = self
            .data
            .get(subject)
            .map(|g| g.keys().cloned().collect())
            .unwrap_or_default();
        grades.sort_by(|a, b| match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        });
        grades
    }

    fn items(&self, subject: &str, grade: &str) -> &[RawLesson] {
        self.data
            .get(subject)
            .and_then(|g| g.get(grade))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// 主题列表：去空、去重，保持首次出现的顺序
    pub fn topics(&self, subject: &str, grade: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.items(subject, grade)
            .iter()
            .map(|it| LessonItem::from(it).topic)
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect()
    }

    /// 课程列表；指定主题时只返回该主题下的课程
    pub fn lessons(&self, subject: &str, grade: &str, topic: Option<&str>) -> Vec<LessonItem> {
        self.items(subject, grade)
            .iter()
            .map(LessonItem::from)
            .filter(|it| match topic {
                Some(t) if !t.is_empty() => it.topic == t,
                _ => true,
            })
            .collect()
    }

    /// 查找课程要求，找不到时返回空字符串
    pub fn find_yccd(&self, subject: &str, grade: &str, topic: &str, lesson: &str) -> String {
        self.lessons(subject, grade, Some(topic))
            .into_iter()
            .find(|it| it.lesson == lesson)
            .map(|it| it.yccd)
            .unwrap_or_default()
    }
}
