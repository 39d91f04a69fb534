use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// 应用统一错误类型
///
/// 对外一律返回纯文本正文；输入缺失/非法与图片缺失不属于错误，会在读取阶段被降级处理。
#[derive(Error, Debug)]
pub enum AppError {
    /// 请求格式错误（如不安全的静态资源路径）
    #[error("Bad request")]
    BadRequest(String),

    /// 资源不存在
    #[error("Not found")]
    NotFound,

    /// 仅接受读取类请求
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// 栅格化失败
    #[error("Render failed: {0}")]
    Render(#[from] RasterError),

    /// 内部服务器错误
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 栅格化失败的具体阶段
#[derive(Error, Debug)]
pub enum RasterError {
    /// SVG 解析失败
    #[error("failed to parse SVG: {0}")]
    Parse(String),

    /// 无法分配目标画布
    #[error("failed to create pixmap {width}x{height}")]
    Pixmap { width: u32, height: u32 },

    /// PNG 编码失败
    #[error("PNG encoding error: {0}")]
    Encode(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Render(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::BadRequest(reason) => {
                tracing::warn!(reason = %reason, "拒绝请求");
            }
            AppError::Render(e) => tracing::error!(
                request_id = ?crate::request_id::current_request_id(),
                "栅格化失败: {}",
                e
            ),
            AppError::Internal(e) => tracing::error!("内部错误: {}", e),
            _ => {}
        }

        let mut res = (status, self.to_string()).into_response();
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        res
    }
}
