//! 好感度面板、人物资料卡与状态横幅的渲染管线：
//! 参数读取 → 图片解析 → SVG 组装 →（可选）PNG 栅格化。

pub mod assets;
pub mod composer;
pub mod handler;
pub mod layout;
pub mod params;
pub mod raster;
pub mod theme;
pub mod types;

pub use handler::create_render_router;
