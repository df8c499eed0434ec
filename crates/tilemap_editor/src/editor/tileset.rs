//! Tile sheet（精灵图）导入与加载。
//!
//! 职责：
//! - 通过文件对话框选择图片，复制到 workspace `assets/tilesets/`，登记到 tile sheet 库
//! - 触发 Bevy AssetServer 异步加载；加载期间引擎把该图片视为 pending
//! - 加载完成后把图片尺寸交给引擎切片

mod library;
mod loading;
mod open;

pub use library::{load_sheet_library_startup, request_sheet};
pub use loading::progress_sheet_loading;
pub use open::open_sheet_shortcut;
