//! 导出 Word (.docx) 试卷
//!
//! 直接拼 WordprocessingML 并打包为 zip。
//! 输出只取决于输入：zip 条目的时间戳固定，文档里不写入当前时间。

use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{AppResult, ExportError};
use crate::models::{ExamMeta, QuestionRecord};

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_TAIL: &str = r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr></w:body></w:document>"#;

/// 答案页标题
pub const ANSWER_KEY_HEADING: &str = "ĐÁP ÁN / GỢI Ý";

/// 段落样式
#[derive(Debug, Clone, Copy, Default)]
struct ParagraphStyle {
    centered: bool,
    bold: bool,
    /// 字号（磅）
    size_pt: Option<u32>,
}

impl ParagraphStyle {
    fn centered() -> Self {
        Self {
            centered: true,
            ..Default::default()
        }
    }

    fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }
}

/// 转义 XML 文本
///
/// XML 1.0 不允许的控制字符（制表符、换行、回车以外）直接丢弃。
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' => {}
            '\u{FFFE}' | '\u{FFFF}' => {}
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// 渲染一个段落；文本中的换行变成 `<w:br/>`
fn paragraph(text: &str, style: ParagraphStyle) -> String {
    let mut xml = String::from("<w:p>");
    if style.centered {
        xml.push_str(r#"<w:pPr><w:jc w:val="center"/></w:pPr>"#);
    }

    xml.push_str("<w:r>");
    if style.bold || style.size_pt.is_some() {
        xml.push_str("<w:rPr>");
        if style.bold {
            xml.push_str("<w:b/>");
        }
        if let Some(pt) = style.size_pt {
            // w:sz 的单位是半磅
            xml.push_str(&format!(r#"<w:sz w:val="{}"/>"#, pt * 2));
        }
        xml.push_str("</w:rPr>");
    }

    let normalized = text.replace("\r\n", "\n");
    for (i, line) in normalized.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        xml.push_str(r#"<w:t xml:space="preserve">"#);
        xml.push_str(&escape_xml(line));
        xml.push_str("</w:t>");
    }
    xml.push_str("</w:r></w:p>");
    xml
}

fn page_break() -> &'static str {
    r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#
}

/// 题目标题行：`Câu {i} ({points} đ) - {level}:`，分值为空时省略括号部分
pub fn question_heading(index: usize, question: &QuestionRecord) -> String {
    if question.points.is_blank() {
        format!("Câu {} - {}:", index, question.level)
    } else {
        format!("Câu {} ({} đ) - {}:", index, question.points, question.level)
    }
}

/// 生成 `word/document.xml`
fn render_document(meta: &ExamMeta, questions: &[QuestionRecord], include_answer_key: bool) -> String {
    let mut body = String::from(DOCUMENT_HEAD);

    if !meta.school.trim().is_empty() {
        body.push_str(&paragraph(
            &meta.school,
            ParagraphStyle {
                size_pt: Some(12),
                ..ParagraphStyle::centered()
            },
        ));
    }

    let title = if meta.title.trim().is_empty() {
        ExamMeta::default().title
    } else {
        meta.title.clone()
    };
    body.push_str(&paragraph(
        &title,
        ParagraphStyle {
            centered: true,
            bold: true,
            size_pt: Some(16),
        },
    ));

    if !meta.subtitle.trim().is_empty() {
        body.push_str(&paragraph(&meta.subtitle, ParagraphStyle::centered()));
    }

    let info = format!(
        "Môn: {}  |  Lớp: {}  |  {}",
        meta.subject, meta.grade, meta.term
    );
    body.push_str(&paragraph(info.trim(), ParagraphStyle::centered()));
    body.push_str(&paragraph("", ParagraphStyle::default()));

    for (i, question) in questions.iter().enumerate() {
        body.push_str(&paragraph(&question_heading(i + 1, question), ParagraphStyle::bold()));
        body.push_str(&paragraph(question.content.trim(), ParagraphStyle::default()));
    }

    if include_answer_key {
        body.push_str(page_break());
        body.push_str(&paragraph(ANSWER_KEY_HEADING, ParagraphStyle::bold()));
        for (i, question) in questions.iter().enumerate() {
            let answer = question.answer.trim();
            if answer.is_empty() {
                continue;
            }
            body.push_str(&paragraph(
                &format!("Câu {}: {}", i + 1, answer),
                ParagraphStyle::default(),
            ));
        }
    }

    body.push_str(DOCUMENT_TAIL);
    body
}

/// 导出试卷为 `.docx` 字节
pub fn export_exam_docx(
    meta: &ExamMeta,
    questions: &[QuestionRecord],
    include_answer_key: bool,
) -> AppResult<Vec<u8>> {
    let document = render_document(meta, questions, include_answer_key);

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let parts: [(&str, &str); 4] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", ROOT_RELS_XML),
        ("word/document.xml", document.as_str()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML),
    ];

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer.start_file(name, options).map_err(ExportError::from)?;
        writer
            .write_all(content.as_bytes())
            .map_err(ExportError::from)?;
    }
    let bytes = writer.finish().map_err(ExportError::from)?.into_inner();

    debug!(
        "docx 导出完成: {} 道题, {} 字节",
        questions.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// 导出文件名：`De_{subject}_lop{grade}.docx`
pub fn export_file_name(meta: &ExamMeta) -> String {
    format!(
        "De_{}_lop{}.docx",
        sanitize_file_component(&meta.subject),
        sanitize_file_component(&meta.grade)
    )
}

/// 把路径分隔符、Windows 保留字符和控制字符替换为 `_`
pub fn sanitize_file_component(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Points;
    use std::io::Read;

    fn meta() -> ExamMeta {
        ExamMeta {
            school: "Trường TH A".into(),
            subtitle: "Học kì I".into(),
            subject: "Toán".into(),
            grade: "3".into(),
            term: "Cuối kì 1".into(),
            ..Default::default()
        }
    }

    fn questions() -> Vec<QuestionRecord> {
        vec![
            QuestionRecord {
                level: "Mức 1: Biết".into(),
                points: Points::Number(1.0),
                content: "  Tính 2 < 3 & 4\nA. Đúng\nB. Sai  ".into(),
                answer: "A".into(),
                ..Default::default()
            },
            QuestionRecord {
                level: "Mức 2: Hiểu".into(),
                points: Points::Text(String::new()),
                content: "Viết số lớn nhất có hai chữ số.".into(),
                ..Default::default()
            },
        ]
    }

    fn read_document(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_package_contains_required_parts() {
        let bytes = export_exam_docx(&meta(), &questions(), true).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing {}", name);
        }
    }

    #[test]
    fn test_export_is_deterministic() {
        let a = export_exam_docx(&meta(), &questions(), true).unwrap();
        let b = export_exam_docx(&meta(), &questions(), true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_document_text() {
        let xml = read_document(&export_exam_docx(&meta(), &questions(), true).unwrap());
        assert!(xml.contains("Trường TH A"));
        assert!(xml.contains("ĐỀ KIỂM TRA"));
        assert!(xml.contains("Môn: Toán  |  Lớp: 3  |  Cuối kì 1"));
        assert!(xml.contains("Câu 1 (1 đ) - Mức 1: Biết:"));
        assert!(xml.contains("Câu 2 - Mức 2: Hiểu:"));
        assert!(xml.contains("Tính 2 &lt; 3 &amp; 4</w:t><w:br/>"));
        assert!(xml.contains(r#"<w:br w:type="page"/>"#));
        assert!(xml.contains(ANSWER_KEY_HEADING));
        assert!(xml.contains("Câu 1: A"));
        assert!(!xml.contains("Câu 2: "));
    }

    #[test]
    fn test_answer_key_can_be_omitted() {
        let xml = read_document(&export_exam_docx(&meta(), &questions(), false).unwrap());
        assert!(!xml.contains(ANSWER_KEY_HEADING));
        assert!(!xml.contains(r#"w:type="page""#));
    }

    #[test]
    fn test_empty_exam_still_exports() {
        let bytes = export_exam_docx(&ExamMeta::default(), &[], true).unwrap();
        let xml = read_document(&bytes);
        assert!(xml.contains("ĐỀ KIỂM TRA"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(export_file_name(&meta()), "De_Toán_lop3.docx");
    }

    #[test]
    fn test_file_name_replaces_path_characters() {
        let meta = ExamMeta {
            subject: "Toán/Tin: ôn tập?".into(),
            grade: "3\\4".into(),
            ..Default::default()
        };
        let name = export_file_name(&meta);
        assert_eq!(name, "De_Toán_Tin_ ôn tập__lop3_4.docx");
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let questions = vec![QuestionRecord {
            level: "Mức 1: Biết".into(),
            points: Points::Number(1.0),
            content: "A\u{0B}B\u{1}\tC\u{0C}".into(),
            ..Default::default()
        }];
        let xml = read_document(&export_exam_docx(&meta(), &questions, false).unwrap());
        assert!(xml.contains("AB\tC"));
        assert!(!xml
            .chars()
            .any(|c| matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}')));
    }
}
