//! 提示词构建

use crate::error::AppResult;
use crate::models::{MatrixTable, QuestionDraft};

/// 发给模型的矩阵最多包含的行数
pub const MATRIX_PROMPT_ROWS: usize = 200;

const ROLE_LINE: &str = "Đóng vai giáo viên Tiểu học theo CT GDPT 2018 và TT27.";

/// 根据矩阵生成整张试卷的提示词
pub fn prompt_from_matrix(
    matrix: &MatrixTable,
    subject: &str,
    grade: &str,
    term: &str,
) -> AppResult<String> {
    let sample = matrix.head_csv(MATRIX_PROMPT_ROWS)?;
    Ok(format!(
        "{ROLE_LINE}
Hãy tạo đề kiểm tra {term} môn {subject} lớp {grade} dựa trên MA TRẬN bên dưới (CSV).
- Bám sát số câu, mức độ, điểm theo ma trận.
- Đa dạng dạng câu hỏi: Trắc nghiệm 4 lựa chọn, Đúng/Sai, Ghép nối, Điền khuyết, Tự luận (tuỳ nội dung).
- Xuất đúng định dạng:
Câu [n] ([điểm] đ) - [Mức 1/2/3]: ...
Nếu là trắc nghiệm: A. ...
B. ...
C. ...
D. ...
Đáp án: ...
Nếu là đúng/sai: liệt kê mệnh đề a/b/c..., ghi đáp án cuối.
Nếu là nối cột: Cột A (1..), Cột B (a..), Đáp án: 1-b, ...
Nếu là điền khuyết: dùng '........' để chừa chỗ trống; Đáp án: ...
KHÔNG viết lời dẫn dài.

MA TRẬN (CSV):
{sample}
"
    ))
}

/// 单题提示词
pub fn prompt_one_question(draft: &QuestionDraft) -> String {
    format!(
        "{ROLE_LINE}
Soạn 1 câu hỏi kiểm tra môn {subject} lớp {grade}.
- Chủ đề: {topic}
- Bài/Nội dung: {lesson}
- YCCĐ: {yccd}
- Dạng: {q_type}; Mức: {level}; Điểm: {points}

YÊU CẦU ĐỊNH DẠNG:
- Trắc nghiệm: 4 lựa chọn A/B/C/D mỗi lựa chọn 1 dòng, cuối ghi 'Đáp án: X'
- Đúng/Sai: viết 3-4 mệnh đề a/b/c..., cuối ghi 'Đáp án: a-Đ, b-S, ...'
- Ghép nối: Cột A (1..), Cột B (a..), cuối ghi 'Đáp án: 1-b, 2-a,...'
- Điền khuyết: chừa chỗ trống bằng '........', cuối ghi 'Đáp án: ...'
- Tự luận: nêu yêu cầu rõ, có gợi ý đáp án ngắn cuối.

CHỈ TRẢ VỀ NỘI DUNG CÂU HỎI + DÒNG ĐÁP ÁN. Không viết lời dẫn.
",
        subject = draft.subject,
        grade = draft.grade,
        topic = draft.topic,
        lesson = draft.lesson,
        yccd = draft.yccd,
        q_type = draft.question_type,
        level = draft.level,
        points = draft.points,
    )
}
