//! Tilemap Painter（瓦片地图绘制器）
//!
//! 目标：
//! - 上方地图区域绘制 / 擦除 / 平移，滚轮与快捷键缩放
//! - 下方 tile 选择器挑选笔刷（独立的平移与缩放）
//! - 多图层（新建、删除、排序、隐藏、锁定）
//! - 保存 / 读取地图（RON）
//!
//! 说明：
//! - 本 crate 使用 Bevy 0.18，只负责输入、渲染与文件；编辑逻辑全部在 `tilemap_core::Painter`。
//! - 窗口 resize 会销毁并重建引擎，见 [`host::EngineHost`]。

mod host;
mod layer_panel;
mod paths;
mod persistence;
mod tileset;
mod types;
mod ui;
mod util;
mod world;

mod app;

use bevy::prelude::Color;

pub const UI_BG: Color = Color::srgb(0.12, 0.12, 0.12);
pub const UI_PANEL: Color = Color::srgb(0.16, 0.16, 0.16);

/// 地图精灵的 z 基准；每个精灵再加上所在图层的 z_index。
pub const MAP_Z_BASE: f32 = 10.0;
/// 选择器背景盖在所有地图精灵之上。
pub const PICKER_BACKDROP_Z: f32 = 500.0;
pub const PICKER_TILE_Z: f32 = 510.0;

pub use app::run;
