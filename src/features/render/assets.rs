//! 角色图片与字体资源解析。

use base64::{Engine as _, engine::general_purpose::STANDARD as base64_engine};
use moka::sync::Cache;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::theme::Mood;

/// 角色图片目录（固定，不可配置）
pub const ASSET_DIR: &str = "img";
/// 字体目录
pub const FONTS_DIR: &str = "fonts";

const PRIMARY_FONT_NAME: &str = "Numeric";
const PRIMARY_FONT_FILE: &str = "Numeric.ttf";
const FALLBACK_FONT_NAME: &str = "Concert One";
const FALLBACK_FONT_FILE: &str = "ConcertOne.ttf";

/// 未加载嵌入字体时使用的通用字体栈
pub const GENERIC_FONT_STACK: &str = "'Segoe UI', Arial, sans-serif";

/// 文件内容（Base64）缓存：按绝对路径键控，进程内永不淘汰。
///
/// 只缓存读取成功的结果，未命中的路径下次仍会重新尝试读取。
#[derive(Clone)]
pub struct AssetCache {
    inner: Cache<PathBuf, Arc<str>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self {
            inner: Cache::builder().build(),
        }
    }

    /// 读取文件并编码为 Base64；读取失败返回 None
    pub fn load_base64(&self, path: &Path) -> Option<Arc<str>> {
        let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        if let Some(hit) = self.inner.get(&key) {
            return Some(hit);
        }
        match std::fs::read(&key) {
            Ok(data) => {
                let encoded: Arc<str> = Arc::from(base64_engine.encode(data));
                // 同一路径总是得到相同内容，并发重复写入无害
                self.inner.insert(key, encoded.clone());
                Some(encoded)
            }
            Err(e) => {
                tracing::debug!("读取资源失败 '{}': {}", key.display(), e);
                None
            }
        }
    }

    #[cfg(test)]
    fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new()
    }
}

/// 启动时载入的嵌入字体
#[derive(Debug, Clone)]
pub struct FontAsset {
    pub name: String,
    pub path: PathBuf,
    pub base64: Arc<str>,
}

impl FontAsset {
    /// 依次尝试主字体与备用字体；都不存在时返回 None（使用通用字体栈）
    pub fn load(fonts_dir: &Path, cache: &AssetCache) -> Option<Self> {
        let candidates = [
            (PRIMARY_FONT_NAME, PRIMARY_FONT_FILE),
            (FALLBACK_FONT_NAME, FALLBACK_FONT_FILE),
        ];
        candidates.iter().find_map(|(name, file)| {
            let path = fonts_dir.join(file);
            cache.load_base64(&path).map(|base64| FontAsset {
                name: name.to_string(),
                path,
                base64,
            })
        })
    }

    /// `@font-face` 样式块
    pub fn font_face_style(&self) -> String {
        format!(
            "<style>\n@font-face {{\n  font-family: '{name}';\n  font-style: normal;\n  font-weight: 400;\n  src: url(data:font/truetype;base64,{data}) format('truetype');\n}}\n</style>",
            name = self.name,
            data = self.base64
        )
    }

    /// 带回退的字体族声明
    pub fn font_family(&self) -> String {
        format!("'{}', {}", self.name, GENERIC_FONT_STACK)
    }
}

/// 角色图片文件名：`{角色}-{情绪}.png`
pub fn image_filename(character: &str, mood: Mood) -> String {
    format!("{character}-{}.png", mood.label())
}

/// 拼接可访问的图片 URL，文件名做 URL 编码
pub fn build_image_url(base_url: &str, filename: &str) -> String {
    let encoded = urlencoding::encode(filename);
    let base = base_url.trim_end_matches('/');
    if base.is_empty() {
        format!("/img/{encoded}")
    } else {
        format!("{base}/img/{encoded}")
    }
}

/// 图片引用方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageEmbedding {
    /// 独立 SVG：引用同源 `/img/` URL，浏览器可缓存
    Link { base_url: String },
    /// 栅格化：内联 data URI（渲染器无法回源）
    Inline,
}

/// 组装 SVG 时获取角色图片 href 的接口
pub trait ImageSource {
    /// 返回 `<image href>` 的值；图片不存在时返回 None（由调用方绘制占位框）
    fn image_href(&self, character: &str, mood: Mood) -> Option<String>;
}

/// 基于固定图片目录的解析器
#[derive(Clone)]
pub struct AssetResolver {
    root: PathBuf,
    cache: AssetCache,
}

impl AssetResolver {
    pub fn new(root: impl Into<PathBuf>, cache: AssetCache) -> Self {
        Self {
            root: root.into(),
            cache,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 绑定一次请求的引用方式
    pub fn with_embedding(&self, embedding: ImageEmbedding) -> BoundResolver<'_> {
        BoundResolver {
            resolver: self,
            embedding,
        }
    }
}

/// 绑定了引用方式的解析器
pub struct BoundResolver<'a> {
    resolver: &'a AssetResolver,
    embedding: ImageEmbedding,
}

impl ImageSource for BoundResolver<'_> {
    fn image_href(&self, character: &str, mood: Mood) -> Option<String> {
        let filename = image_filename(character, mood);
        let path = self.resolver.root.join(&filename);
        match &self.embedding {
            ImageEmbedding::Link { base_url } => {
                if path.is_file() {
                    Some(build_image_url(base_url, &filename))
                } else {
                    tracing::debug!("角色图片不存在: {}", path.display());
                    None
                }
            }
            ImageEmbedding::Inline => self
                .resolver
                .cache
                .load_base64(&path)
                .map(|b64| format!("data:image/png;base64,{b64}")),
        }
    }
}

/// 从请求头还原对外可见的 `scheme://host`（支持反向代理 `X-Forwarded-*`）
pub fn external_base_url(headers: &axum::http::HeaderMap) -> String {
    let first = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    let proto = first("x-forwarded-proto").unwrap_or("http");
    let host = first("x-forwarded-host")
        .or_else(|| first("host"))
        .unwrap_or("localhost");
    format!("{proto}://{host}")
}
