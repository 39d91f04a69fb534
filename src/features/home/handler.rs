use axum::{
    Router,
    extract::Request,
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::error::AppError;
use crate::state::AppState;

pub const USAGE: &str = "SVG generator server

Endpoints:
  /api/affinity?y1=30&y2=70&y3=95
  /api/affinity/30/70/95.png
  /api/profile?u=이름&u=나이&u=직업&s1=관계&s2=관계&m=관계&status=상황
  /api/profile/이름/나이/직업/관계/관계/관계/상황.png
  /api/status?relationship=Friends&situation=Chill
  /api/status/Friends/Chill.svg

Options:
  format=svg|png   query forms default to svg, path forms to png
  width=<px>       output pixel width (affinity/profile)";

/// GET /（`&str` 响应自带 `text/plain; charset=utf-8`）
async fn usage() -> &'static str {
    USAGE
}

/// 只接受读取类请求（GET/HEAD），其余方法在路由之前统一返回 405
pub async fn allow_read_methods(req: Request, next: Next) -> Response {
    if req.method() == Method::GET || req.method() == Method::HEAD {
        next.run(req).await
    } else {
        tracing::debug!("拒绝方法 {} {}", req.method(), req.uri().path());
        AppError::MethodNotAllowed.into_response()
    }
}

/// 未匹配的路径
pub async fn not_found() -> AppError {
    AppError::NotFound
}

pub fn create_home_router() -> Router<AppState> {
    Router::new().route("/", get(usage))
}
