//! 题型与认知层级目录（TT27）

use phf::phf_set;

/// 界面上默认提供的题型
pub const QUESTION_TYPES_BASE: [&str; 5] = [
    "Trắc nghiệm (4 lựa chọn)",
    "Đúng/Sai",
    "Ghép nối (Nối cột)",
    "Điền khuyết (Hoàn thành câu)",
    "Tự luận",
];

/// 只有信息课（Tin học）才提供的上机题型
pub const PRACTICE_TYPE: &str = "Thực hành trên máy tính";

/// 信息课的科目名
pub const INFORMATICS_SUBJECT: &str = "Tin học";

/// 三个认知层级，按顺序
pub const LEVELS: [&str; 3] = ["Mức 1: Biết", "Mức 2: Hiểu", "Mức 3: Vận dụng"];

/// 校验用的题型集合
pub static ALLOWED_TYPES: phf::Set<&'static str> = phf_set! {
    "Trắc nghiệm (4 lựa chọn)",
    "Đúng/Sai",
    "Ghép nối (Nối cột)",
    "Điền khuyết (Hoàn thành câu)",
    "Tự luận",
    "Thực hành trên máy tính",
};

/// 校验用的层级集合
pub static ALLOWED_LEVELS: phf::Set<&'static str> = phf_set! {
    "Mức 1: Biết",
    "Mức 2: Hiểu",
    "Mức 3: Vận dụng",
};

/// 某个科目可选的题型
pub fn question_types_for(subject: &str) -> Vec<&'static str> {
    let mut types = QUESTION_TYPES_BASE.to_vec();
    if subject == INFORMATICS_SUBJECT {
        types.push(PRACTICE_TYPE);
    }
    types
}
