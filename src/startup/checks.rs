use std::path::Path;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::features::render::assets::{ASSET_DIR, FONTS_DIR};
use crate::state::AppState;

/// 执行启动检查并构建共享状态
///
/// 1. 检查角色图片目录（缺失只告警，面板会绘制占位框）
/// 2. 检查字体目录
/// 3. 载入字体并预热栅格化字体库
pub async fn run_startup_checks(config: &AppConfig) -> Result<AppState, AppError> {
    tracing::info!("🔍 开始执行启动检查...");

    check_asset_dir(Path::new(ASSET_DIR));
    check_font_dir(Path::new(FONTS_DIR));

    let render = config.render.clone();
    let t_prewarm = std::time::Instant::now();
    let state = tokio::task::spawn_blocking(move || {
        AppState::new(&render, ASSET_DIR, Path::new(FONTS_DIR))
    })
    .await
    .map_err(|e| AppError::Internal(format!("字体库预热任务失败: {e}")))?;
    tracing::info!("字体库预热完成: {}ms", t_prewarm.elapsed().as_millis());

    tracing::info!("✅ 启动检查完成");
    Ok(state)
}

/// 返回目录中的 PNG 数量；目录不存在时返回 None
fn count_png_files(dir: &Path) -> Option<usize> {
    let entries = std::fs::read_dir(dir).ok()?;
    Some(
        entries
            .flatten()
            .filter(|e| {
                e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
            })
            .count(),
    )
}

fn check_asset_dir(dir: &Path) {
    match count_png_files(dir) {
        Some(0) => tracing::warn!("图片目录 {} 中没有 PNG 文件", dir.display()),
        Some(n) => tracing::info!("图片目录 {}: {} 个 PNG 文件", dir.display(), n),
        None => tracing::warn!(
            "图片目录 {} 不存在，所有角色将显示占位框",
            dir.display()
        ),
    }
}

fn check_font_dir(dir: &Path) {
    if !dir.is_dir() {
        tracing::warn!("字体目录 {} 不存在，将使用系统字体", dir.display());
    }
}
