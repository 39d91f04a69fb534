use axum::{Router, http::Method, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::features::{home, render, static_assets};
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// 压缩 SVG 与纯文本；PNG 等图片本身已压缩，不再处理
fn compression_predicate() -> impl tower_http::compression::predicate::Predicate {
    use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};

    SizeAbove::default()
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::const_new("application/octet-stream"))
}

/// 所有响应（含 405/404/500）都允许任意来源只读访问
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD])
}

/// 组装完整路由（含中间件），供 `main` 与集成测试共用
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(home::create_home_router())
        .merge(render::create_render_router())
        .merge(static_assets::create_static_router())
        .fallback(home::not_found)
        .with_state(state)
        .layer(middleware::from_fn(home::allow_read_methods))
        // 位于方法守卫之外：预检请求由 CORS 层直接应答
        .layer(build_cors_layer())
        .layer(CompressionLayer::new().compress_when(compression_predicate()))
        // 最外层：405/404 等响应同样带上 x-request-id
        .layer(middleware::from_fn(request_id_middleware))
}
