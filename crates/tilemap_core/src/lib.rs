#![forbid(unsafe_code)]

// 纯逻辑 crate：瓦片地图绘制引擎。
//
// - 几何工具（矩形比较 / 命中测试 / 扁平化）
// - 地图视口与 tile 选择器（各自独立的平移 + 缩放）
// - 多图层 TileMap 与渲染缓存（PaintedTileIndex）
// - Painter：指针输入状态机 + 领域事件
// - Session：编辑器重建（容器 resize）时的状态延续
//
// 不依赖任何渲染后端；宿主（tilemap_editor）负责把渲染缓存映射为实际的精灵。

mod config;
mod error;
mod events;
mod geometry;
mod layers;
mod painter;
mod picker;
mod render;
mod session;
mod tilesheet;
mod viewport;

pub use config::{EngineConfig, ScaleBounds};
pub use error::TilemapError;
pub use events::{EditorCommand, EditorEvent, EventBus, ListenerId};
pub use geometry::{flatten, locate_cell, locate_cell_index, rects_equal, unflatten, CellRect, Point};
pub use layers::{FlatLayer, Layer, LayerManager};
pub use painter::{Highlight, PaintMode, Painter, PointerPhase, Teardown};
pub use picker::TilePicker;
pub use render::{CellKey, PaintedTileIndex, RenderHandle, RenderOp, RenderScene, SpriteMeta};
pub use session::{MemorySessionStore, SessionBridge, SessionLayer, SessionStore, SessionViewport};
pub use tilesheet::{SheetLookup, SourceRect, TileHandle, TileSheet, TileSheetCache};
pub use viewport::Viewport;

/// 图层 id（同一会话内按 max + 1 分配）。
pub type LayerId = u32;

/// 格子里存放的 tile id；0 表示空。
pub type TileId = u32;

/// 空格子。
pub const EMPTY_TILE: TileId = 0;
