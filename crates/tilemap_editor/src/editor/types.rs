//! 资源（Resource）与组件（Component）的集中定义。

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use tilemap_core::{CellRect, EngineConfig, RenderHandle};

pub const DEFAULT_SAVE_PATH: &str = "maps/map.ron";
pub const DEFAULT_LIBRARY_PATH: &str = "tilesets/library.ron";
pub const EDITOR_CONFIG_PATH: &str = "editor.ron";

/// 标记“世界相机”。
#[derive(Component)]
pub struct WorldCamera;

/// 地图格子精灵，对应引擎渲染缓存里的一个句柄。
#[derive(Component)]
pub struct MapTile(pub RenderHandle);

/// 选择器里的 tile 精灵。
#[derive(Component)]
pub struct PickerTile;

/// 选择器区域背景（盖住溢出到下方的地图精灵）。
#[derive(Component)]
pub struct PickerBackdrop;

#[derive(Component)]
pub struct HudText;

/// tile sheet 图片 id：导入图片内容的 blake3 hash，保证跨机器拷贝时一致。
pub type SheetId = String;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SheetEntry {
    pub id: SheetId,
    pub name: String,
    /// 相对 `AssetPlugin.file_path` 的路径，例如：`tilesets/foo.png`
    pub asset_path: String,
}

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default)]
pub struct SheetLibrary {
    pub entries: Vec<SheetEntry>,
    pub active_id: Option<SheetId>,
}

impl SheetLibrary {
    pub fn get(&self, id: &str) -> Option<&SheetEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// 新增或更新条目（按 id 去重）。
    pub fn upsert(&mut self, entry: SheetEntry) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => {
                existing.asset_path = entry.asset_path;
                if existing.name.trim().is_empty() {
                    existing.name = entry.name;
                }
            }
            None => self.entries.push(entry),
        }
    }
}

/// 已加载完成的纹理。
#[derive(Resource, Default)]
pub struct SheetTextures {
    pub by_id: HashMap<SheetId, Handle<Image>>,
}

#[derive(Clone)]
pub struct PendingSheet {
    pub id: SheetId,
    pub texture: Handle<Image>,
}

#[derive(Resource, Default)]
pub struct SheetLoading {
    pub pending: Vec<PendingSheet>,
}

/// 渲染句柄 → 精灵实体。
#[derive(Resource, Default)]
pub struct SpriteEntities {
    pub by_handle: HashMap<RenderHandle, Entity>,
}

/// 当前帧要画的 hover 反馈（只在引擎请求重绘时重新计算）。
#[derive(Resource, Default)]
pub struct HoverOverlay {
    pub map_cell: Option<CellRect>,
    pub eraser: bool,
    pub picker_cell: Option<CellRect>,
    pub brush: Option<CellRect>,
}

/// 编辑器配置，读取自 `assets/editor.ron`。
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// 引擎参数；表面尺寸会被窗口实际尺寸覆盖。
    pub engine: EngineConfig,
    pub map_name: String,
    /// 导出地图路径（相对 assets）。
    pub export_path: String,
    pub tileset_import_dir: String,
    /// 库为空时自动登记的 tile sheet（相对 assets）。
    pub default_tileset: Option<String>,
    /// 滚轮“行”单位换算成像素位移的倍数。
    pub wheel_line_pixels: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            map_name: "untitled".to_string(),
            export_path: DEFAULT_SAVE_PATH.to_string(),
            tileset_import_dir: "tilesets".to_string(),
            default_tileset: Some("tilesets/tiles.png".to_string()),
            wheel_line_pixels: 10.0,
        }
    }
}
