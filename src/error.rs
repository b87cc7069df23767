use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 生成后端（Gemini）相关错误
    #[error("后端错误: {0}")]
    Backend(#[from] BackendError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 输入数据错误（矩阵 / 课程表 / 试卷计划）
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// 导出 Word 文档错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 生成后端错误
///
/// 这些错误只在 `clients` 层内部流动，`AiService` 会把它们折叠成
/// `GenerationStatus`，永远不会向调用方抛出。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// HTTP 客户端初始化失败（TLS 后端等）
    #[error("{0}")]
    InitFailed(String),
    /// 网络请求失败
    #[error("{0}")]
    RequestFailed(String),
    /// 后端返回非 2xx 响应
    #[error("HTTP {status}: {message}")]
    BadResponse { status: u16, message: String },
    /// 响应体解析失败
    #[error("{0}")]
    ParseFailed(String),
    /// 模型返回空内容
    #[error("Model trả về rỗng.")]
    EmptyResponse,
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {message}")]
    TomlParseFailed { path: String, message: String },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {message}")]
    JsonParseFailed { path: String, message: String },
}

/// 输入数据错误
#[derive(Debug, Error)]
pub enum InputError {
    /// 没有上传矩阵文件
    #[error("Chưa tải file ma trận.")]
    NoFile,
    /// 不支持的文件扩展名
    #[error("Hiện chỉ hỗ trợ .xlsx/.xls/.csv ({file_name}). Nếu bạn dùng Word, hãy chuyển bảng sang Excel.")]
    UnsupportedFormat { file_name: String },
    /// 表格解析失败
    #[error("Lỗi đọc ma trận: {0}")]
    MatrixParseFailed(String),
    /// 题目索引越界
    #[error("索引 {index} 超出范围 [0, {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// 需要先读取矩阵
    #[error("Bạn cần đọc ma trận trước.")]
    MatrixNotLoaded,
}

/// Word 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// zip 打包失败
    #[error("打包 docx 失败: {0}")]
    Zip(#[from] zip::result::ZipError),
    /// 写入缓冲区失败
    #[error("写入 docx 内容失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 模型优先级列表为空
    #[error("模型优先级列表不能为空")]
    EmptyModelPriority,

    /// 模型优先级列表中有空白项
    #[error("模型优先级列表第 {index} 项为空")]
    BlankModelIdentifier { index: usize },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::File(FileError::JsonParseFailed {
            path: String::new(),
            message: err.to_string(),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Input(InputError::MatrixParseFailed(err.to_string()))
    }
}

impl From<calamine::Error> for AppError {
    fn from(err: calamine::Error) -> Self {
        AppError::Input(InputError::MatrixParseFailed(err.to_string()))
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::Export(ExportError::Zip(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建矩阵解析错误
    pub fn matrix_parse_failed(message: impl Into<String>) -> Self {
        AppError::Input(InputError::MatrixParseFailed(message.into()))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
