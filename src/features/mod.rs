/// 首页用法说明、方法校验与 404 兜底
pub mod home;
/// SVG/PNG 渲染接口
pub mod render;
/// 角色图片静态资源
pub mod static_assets;
