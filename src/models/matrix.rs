use serde::Serialize;

use crate::error::AppResult;

/// 评分矩阵（表头 + 数据行）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// 矩阵概要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixSummary {
    pub rows: usize,
    pub cols: usize,
    pub columns: Vec<String>,
}

impl MatrixTable {
    pub fn summary(&self) -> MatrixSummary {
        MatrixSummary {
            rows: self.rows.len(),
            cols: self.columns.len(),
            columns: self.columns.clone(),
        }
    }

    /// 把前 `limit` 行（含表头）写成 CSV，用于拼进提示词
    pub fn head_csv(&self, limit: usize) -> AppResult<String> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in self.rows.iter().take(limit) {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| crate::error::AppError::Other(e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MatrixTable {
        MatrixTable {
            columns: vec!["Chủ đề".into(), "Số câu".into()],
            rows: vec![
                vec!["Số học".into(), "3".into()],
                vec!["Hình, đo lường".into(), "2".into()],
                vec!["Giải toán".into(), "1".into()],
            ],
        }
    }

    #[test]
    fn test_summary() {
        let summary = table().summary();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.cols, 2);
        assert_eq!(summary.columns, vec!["Chủ đề", "Số câu"]);
    }

    #[test]
    fn test_head_csv_limits_rows_and_quotes_commas() {
        let csv = table().head_csv(2).unwrap();
        assert_eq!(csv, "Chủ đề,Số câu\nSố học,3\n\"Hình, đo lường\",2\n");
    }
}
