#![allow(dead_code)]

use affinity_card::{AppState, build_router, config::RenderConfig};
use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode},
};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// 路由 + 临时资源目录（目录随结构体一起释放）
pub struct TestApp {
    pub router: Router,
    pub img_dir: TempDir,
    _fonts_dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

/// 2×2 的真实 PNG，供内联嵌入时解码
pub fn tiny_png() -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, 2, 2);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().expect("png header");
        writer.write_image_data(&[0x80; 16]).expect("png data");
        writer.finish().expect("png finish");
    }
    out
}

/// 以给定图片文件构建应用（无嵌入字体）
pub fn test_app_with_images(images: &[&str]) -> TestApp {
    let img_dir = tempfile::tempdir().expect("img tempdir");
    let fonts_dir = tempfile::tempdir().expect("fonts tempdir");
    for name in images {
        std::fs::write(img_dir.path().join(name), tiny_png()).expect("write image");
    }
    let render = RenderConfig {
        optimize_speed: true,
        ..RenderConfig::default()
    };
    let state = AppState::new(&render, img_dir.path(), fonts_dir.path());
    TestApp {
        router: build_router(state),
        img_dir,
        _fonts_dir: fonts_dir,
    }
}

pub fn test_app() -> TestApp {
    test_app_with_images(&["여동생-무표정.png", "누나-호감.png", "엄마-사랑.png"])
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        let resp = self
            .router
            .clone()
            .oneshot(builder.body(Body::empty()).expect("request"))
            .await
            .expect("oneshot");
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, &[]).await
    }
}

/// 按路径段做百分号编码
pub fn encode_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// PNG IHDR 中的宽高
pub fn png_dimensions(png: &[u8]) -> (u32, u32) {
    let w = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
    let h = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
    (w, h)
}
