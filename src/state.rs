use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::RenderConfig;
use crate::features::render::assets::{AssetCache, AssetResolver, FontAsset};
use crate::features::render::composer::Typography;
use crate::features::render::raster::Rasterizer;

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 角色图片解析（含进程级文件缓存）
    pub resolver: AssetResolver,
    /// 启动时确定的嵌入字体样式
    pub typography: Arc<Typography>,
    pub rasterizer: Arc<Rasterizer>,
    /// 控制并发渲染的信号量（限制 CPU 密集型任务数量）
    pub render_semaphore: Arc<Semaphore>,
    /// `width` 参数上限
    pub max_canvas_width: u32,
}

impl AppState {
    /// 载入字体并建立字体库；包含阻塞 IO，运行时中应放到 `spawn_blocking` 执行
    pub fn new(render: &RenderConfig, asset_dir: impl Into<PathBuf>, fonts_dir: &Path) -> Self {
        let cache = AssetCache::new();
        let font = FontAsset::load(fonts_dir, &cache);
        match &font {
            Some(f) => tracing::info!("嵌入字体: '{}' ({})", f.name, f.path.display()),
            None => tracing::warn!(
                "未找到嵌入字体（{}），使用通用字体栈",
                fonts_dir.display()
            ),
        }

        let font_files: Vec<PathBuf> = font.iter().map(|f| f.path.clone()).collect();
        let rasterizer = Rasterizer::new(&font_files, render.optimize_speed);

        Self {
            resolver: AssetResolver::new(asset_dir, cache),
            typography: Arc::new(Typography::new(font.as_ref())),
            rasterizer: Arc::new(rasterizer),
            render_semaphore: Arc::new(Semaphore::new(render.effective_parallelism())),
            max_canvas_width: render.max_canvas_width,
        }
    }
}
