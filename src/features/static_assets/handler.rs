use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::path::Path as FsPath;

use crate::error::AppError;
use crate::state::AppState;

const IMMUTABLE_CACHE: &str = "public, max-age=86400, immutable";

/// 文件名只能是图片目录下的平铺名称
fn validate_filename(name: &str) -> Result<&str, AppError> {
    if name.is_empty()
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(AppError::BadRequest(format!("unsafe asset path: {name:?}")));
    }
    Ok(name)
}

fn content_type_for(name: &str) -> &'static str {
    let ext = FsPath::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// GET /img/{file}
async fn serve_image(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let name = validate_filename(&file)?;
    let root = state.resolver.root();

    let canonical_root = tokio::fs::canonicalize(root)
        .await
        .map_err(|_| AppError::NotFound)?;
    let resolved = tokio::fs::canonicalize(root.join(name))
        .await
        .map_err(|_| AppError::NotFound)?;
    // 符号链接等可能绕过字面检查
    if !resolved.starts_with(&canonical_root) {
        return Err(AppError::BadRequest(format!(
            "asset escapes image directory: {}",
            resolved.display()
        )));
    }

    let data = tokio::fs::read(&resolved).await.map_err(|e| {
        tracing::debug!("读取静态资源失败 '{}': {}", resolved.display(), e);
        AppError::NotFound
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(name)),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(IMMUTABLE_CACHE),
    );
    Ok((headers, data).into_response())
}

/// GET /img/（缺少文件名）
async fn missing_filename() -> AppError {
    AppError::BadRequest("missing asset filename".to_string())
}

pub fn create_static_router() -> Router<AppState> {
    Router::new()
        .route("/img/", get(missing_filename))
        .route("/img/*file", get(serve_image))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_and_separators_are_rejected() {
        for bad in ["", "..", "../server.js", "a/b.png", "a\\b.png", "x..png", "a\0b"] {
            assert!(
                matches!(validate_filename(bad), Err(AppError::BadRequest(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(validate_filename("누나-사랑.png").is_ok());
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("a.PNG"), "image/png");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a.svg"), "image/svg+xml");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }
}
