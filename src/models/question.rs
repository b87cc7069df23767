use serde::{Deserialize, Serialize};

/// 分值
///
/// 表单和 TOML 计划里的分值可能是数字也可能是文本，
/// 非数字的文本会在校验阶段报错，而不是在反序列化时失败。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Points {
    Number(f64),
    Text(String),
}

impl Points {
    /// 转换为数值；无法解析时返回 `None`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Points::Number(value) => Some(*value),
            Points::Text(text) => text.trim().parse::<f64>().ok(),
        }
    }

    /// 是否为空值（用于导出时决定是否显示分值）
    pub fn is_blank(&self) -> bool {
        match self {
            Points::Number(value) => *value == 0.0,
            Points::Text(text) => text.trim().is_empty(),
        }
    }
}

impl Default for Points {
    fn default() -> Self {
        Points::Number(0.0)
    }
}

impl From<f64> for Points {
    fn from(value: f64) -> Self {
        Points::Number(value)
    }
}

impl std::fmt::Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Points::Number(value) => write!(f, "{}", value),
            Points::Text(text) => write!(f, "{}", text.trim()),
        }
    }
}

/// 一道题目的记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub lesson: String,
    /// 课程要求（Yêu cầu cần đạt）
    #[serde(default)]
    pub yccd: String,
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub points: Points,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub answer: String,
}

impl QuestionRecord {
    /// 用于列表显示的标题
    pub fn title(&self, index: usize) -> String {
        format!(
            "Câu {}: {} lớp {} — {}",
            index + 1,
            self.subject,
            self.grade,
            self.lesson
        )
    }
}

/// 试卷抬头信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamMeta {
    pub school: String,
    pub title: String,
    pub subtitle: String,
    pub subject: String,
    pub grade: String,
    pub term: String,
}

impl Default for ExamMeta {
    fn default() -> Self {
        Self {
            school: String::new(),
            title: "ĐỀ KIỂM TRA".to_string(),
            subtitle: String::new(),
            subject: String::new(),
            grade: String::new(),
            term: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_parse_number_and_text() {
        assert_eq!(Points::Number(1.5).as_f64(), Some(1.5));
        assert_eq!(Points::Text(" 0.25 ".into()).as_f64(), Some(0.25));
        assert_eq!(Points::Text("một điểm".into()).as_f64(), None);
    }

    #[test]
    fn test_points_display() {
        assert_eq!(Points::Number(1.0).to_string(), "1");
        assert_eq!(Points::Number(0.5).to_string(), "0.5");
    }

    #[test]
    fn test_question_record_from_toml() {
        let record: QuestionRecord = toml::from_str(
            r#"
subject = "Toán"
grade = "3"
type = "Tự luận"
level = "Mức 2: Hiểu"
points = 1.5
content = "Tính 12 + 7"
"#,
        )
        .unwrap();
        assert_eq!(record.question_type, "Tự luận");
        assert_eq!(record.points, Points::Number(1.5));
        assert!(record.answer.is_empty());
    }

    #[test]
    fn test_question_record_text_points_from_json() {
        let record: QuestionRecord =
            serde_json::from_str(r#"{"content": "x", "points": "abc"}"#).unwrap();
        assert_eq!(record.points, Points::Text("abc".into()));
    }
}
