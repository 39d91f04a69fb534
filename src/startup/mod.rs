/// 启动检查与共享状态构建
pub mod checks;

pub use checks::run_startup_checks;
