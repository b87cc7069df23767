//! 评分矩阵读取（.csv / .xlsx / .xls）

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Reader};
use tracing::{debug, info};

use crate::error::{AppError, AppResult, InputError};
use crate::models::MatrixTable;

/// 支持的文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatrixFormat {
    Csv,
    Spreadsheet,
}

fn detect_format(file_name: &str) -> Option<MatrixFormat> {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        Some(MatrixFormat::Spreadsheet)
    } else if lower.ends_with(".csv") {
        Some(MatrixFormat::Csv)
    } else {
        None
    }
}

/// 解析上传的矩阵文件
///
/// 第一行作为表头，表头去除首尾空白；数据行保持原样。
pub fn parse_matrix(file_name: &str, bytes: &[u8]) -> AppResult<MatrixTable> {
    let format = detect_format(file_name).ok_or_else(|| {
        AppError::Input(InputError::UnsupportedFormat {
            file_name: file_name.to_string(),
        })
    })?;

    let table = match format {
        MatrixFormat::Csv => parse_csv(bytes)?,
        MatrixFormat::Spreadsheet => parse_spreadsheet(bytes)?,
    };

    info!(
        "✓ 已读取矩阵 {}: {} 行 x {} 列",
        file_name,
        table.rows.len(),
        table.columns.len()
    );
    Ok(table)
}

/// 可选上传：未上传时返回 `InputError::NoFile`
pub fn parse_matrix_upload(upload: Option<(&str, &[u8])>) -> AppResult<MatrixTable> {
    let (file_name, bytes) = upload.ok_or(AppError::Input(InputError::NoFile))?;
    parse_matrix(file_name, bytes)
}

fn parse_csv(bytes: &[u8]) -> AppResult<MatrixTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if columns.iter().all(String::is_empty) {
        return Err(AppError::matrix_parse_failed("không tìm thấy dòng tiêu đề"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    debug!("CSV 解析完成: {} 行", rows.len());

    Ok(MatrixTable { columns, rows })
}

fn parse_spreadsheet(bytes: &[u8]) -> AppResult<MatrixTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::matrix_parse_failed("file không có sheet nào"))??;

    let mut rows_iter = range.rows();
    let columns: Vec<String> = rows_iter
        .next()
        .map(|header| header.iter().map(|c| c.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    if columns.iter().all(String::is_empty) {
        return Err(AppError::matrix_parse_failed("không tìm thấy dòng tiêu đề"));
    }

    let rows: Vec<Vec<String>> = rows_iter
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();
    debug!("表格解析完成: {} 行", rows.len());

    Ok(MatrixTable { columns, rows })
}
