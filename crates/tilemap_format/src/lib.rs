#![forbid(unsafe_code)]

//! 地图导出格式（RON）。
//!
//! 下游游戏格式导出器只依赖这个扁平形状：每个图层一份 `width * height` 的行优先数组。

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use tilemap_core::{unflatten, Layer, LayerId, LayerManager, TileId};

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to parse map: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("failed to encode map: {0}")]
    Encode(#[from] ron::Error),
    #[error("layer '{name}' has {actual} cells, expected {expected}")]
    InvalidLayerSize {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("layer '{name}' is {width}x{height}, map is {columns}x{rows}")]
    DimensionMismatch {
        name: String,
        width: u32,
        height: u32,
        columns: u32,
        rows: u32,
    },
    #[error("map has no layers")]
    NoLayer,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LayerExport {
    pub id: LayerId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// 行优先扁平数组，0 为空。
    pub grid: Vec<TileId>,
    pub visible: bool,
    pub locked: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MapExport {
    pub name: String,
    /// 地图使用的 tile sheet 图片 id。
    #[serde(rename = "tilesetImage")]
    pub tileset_image: String,
    /// 顺序与编辑器图层列表一致（第一个为最上层）。
    pub layers: Vec<LayerExport>,
}

impl MapExport {
    pub fn from_layers(name: &str, tileset_image: &str, manager: &LayerManager) -> Self {
        let layers = manager
            .layers()
            .iter()
            .filter_map(|layer| {
                let flat = manager.export_flat(layer.id)?;
                Some(LayerExport {
                    id: layer.id,
                    name: layer.name.clone(),
                    width: flat.columns,
                    height: flat.rows,
                    grid: flat.cells,
                    visible: layer.visible,
                    locked: layer.locked,
                })
            })
            .collect();
        Self {
            name: name.to_string(),
            tileset_image: tileset_image.to_string(),
            layers,
        }
    }

    /// 地图尺寸（取第一个图层）。
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.layers.first().map(|l| (l.width, l.height))
    }

    /// 校验：至少一个图层，所有图层尺寸一致，网格长度等于 `width * height`。
    pub fn validate(&self) -> Result<(), FormatError> {
        let (columns, rows) = self.dimensions().ok_or(FormatError::NoLayer)?;
        for layer in &self.layers {
            if layer.width != columns || layer.height != rows {
                return Err(FormatError::DimensionMismatch {
                    name: layer.name.clone(),
                    width: layer.width,
                    height: layer.height,
                    columns,
                    rows,
                });
            }
            let expected = columns as usize * rows as usize;
            if layer.grid.len() != expected {
                return Err(FormatError::InvalidLayerSize {
                    name: layer.name.clone(),
                    expected,
                    actual: layer.grid.len(),
                });
            }
        }
        Ok(())
    }

    /// 重建图层管理器。第一个图层被选中。
    pub fn into_layer_manager(self) -> Result<LayerManager, FormatError> {
        self.validate()?;
        let (columns, rows) = self.dimensions().ok_or(FormatError::NoLayer)?;

        let mut seen = Vec::with_capacity(self.layers.len());
        let mut layers = Vec::with_capacity(self.layers.len());
        for export in self.layers {
            let mut layer = Layer::new(export.id, export.name, columns, rows);
            if seen.contains(&layer.id) {
                // 重复 id 会破坏按 id 寻址，改为 max + 1
                let id = seen.iter().copied().max().unwrap_or(0) + 1;
                warn!("duplicate layer id {} in map, renumbered to {id}", layer.id);
                layer.id = id;
            }
            seen.push(layer.id);
            if columns > 0 {
                layer.grid = unflatten(&export.grid, columns as usize);
            }
            layer.visible = export.visible;
            layer.locked = export.locked;
            layers.push(layer);
        }
        if let Some(first) = layers.first_mut() {
            first.selected = true;
        }
        Ok(LayerManager::from_layers(columns, rows, layers))
    }
}

pub fn encode_map_ron(map: &MapExport) -> Result<String, FormatError> {
    Ok(ron::ser::to_string_pretty(
        map,
        ron::ser::PrettyConfig::default(),
    )?)
}

pub fn decode_map_ron(text: &str) -> Result<MapExport, FormatError> {
    let map = ron::from_str::<MapExport>(text)?;
    map.validate()?;
    Ok(map)
}
