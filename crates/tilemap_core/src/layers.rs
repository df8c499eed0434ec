//! 多图层 TileMap。
//!
//! 约定：
//! - `layers[0]` 是最上层（列表顶部），`move_up` 与前一个交换。
//! - 任意时刻至少一个图层，且恰好一个图层处于选中状态（由引擎在构造时建立）。
//! - 引用不存在的图层 / 越界格子：记日志并返回 no-op（UI 的异步事件可能和删除操作竞争）。

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geometry::{flatten, unflatten};
use crate::{LayerId, TileId, EMPTY_TILE};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    /// `grid[row][col]`，0 为空。
    pub grid: Vec<Vec<TileId>>,
    pub visible: bool,
    pub locked: bool,
    pub selected: bool,
    pub z_index: i32,
}

impl Layer {
    pub fn new(id: LayerId, name: String, columns: u32, rows: u32) -> Self {
        Self {
            id,
            name,
            grid: vec![vec![EMPTY_TILE; columns as usize]; rows as usize],
            visible: true,
            locked: false,
            selected: false,
            z_index: 0,
        }
    }

    pub fn default_name(id: LayerId) -> String {
        format!("Layer - {id}")
    }

    /// 非空格子 `(col, row, tile)`。
    pub fn painted_cells(&self) -> impl Iterator<Item = (u32, u32, TileId)> + '_ {
        self.grid.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, t)| **t != EMPTY_TILE)
                .map(move |(col, t)| (col as u32, row as u32, *t))
        })
    }
}

/// 单个图层的扁平导出。
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FlatLayer {
    pub columns: u32,
    pub rows: u32,
    pub cells: Vec<TileId>,
}

impl FlatLayer {
    pub fn to_grid(&self) -> Vec<Vec<TileId>> {
        unflatten(&self.cells, self.columns as usize)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct LayerManager {
    columns: u32,
    rows: u32,
    layers: Vec<Layer>,
}

impl LayerManager {
    /// 空管理器；调用方负责至少 `add_layer` 一次。
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            layers: Vec::new(),
        }
    }

    /// 从已有图层构建（导入地图时）。尺寸不一致的网格按 `columns x rows` 裁剪 / 补零。
    pub fn from_layers(columns: u32, rows: u32, layers: Vec<Layer>) -> Self {
        let mut manager = Self {
            columns,
            rows,
            layers,
        };
        for layer in &mut manager.layers {
            layer.grid.resize(rows as usize, Vec::new());
            for row in &mut layer.grid {
                row.resize(columns as usize, EMPTY_TILE);
            }
        }
        manager.normalize_selection();
        manager.restack();
        manager
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    fn position(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn selected(&self) -> Option<&Layer> {
        self.layers.iter().find(|l| l.selected)
    }

    pub fn selected_id(&self) -> Option<LayerId> {
        self.selected().map(|l| l.id)
    }

    pub fn order(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id).collect()
    }

    fn next_id(&self) -> LayerId {
        self.layers.iter().map(|l| l.id).max().unwrap_or(0) + 1
    }

    /// 列表顶部的图层 z 最大。
    fn restack(&mut self) {
        let len = self.layers.len() as i32;
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.z_index = len - 1 - i as i32;
        }
    }

    fn normalize_selection(&mut self) {
        let first_selected = self.layers.iter().position(|l| l.selected).unwrap_or(0);
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.selected = i == first_selected;
        }
    }

    /// 新建图层并设为唯一选中。`name` 为空时使用 `Layer - {id}`。
    pub fn add_layer(&mut self, name: &str) -> &Layer {
        let id = self.next_id();
        let name = if name.trim().is_empty() {
            Layer::default_name(id)
        } else {
            name.to_string()
        };
        for layer in &mut self.layers {
            layer.selected = false;
        }
        let mut layer = Layer::new(id, name, self.columns, self.rows);
        layer.selected = true;
        self.layers.push(layer);
        self.restack();
        let last = self.layers.len() - 1;
        &self.layers[last]
    }

    /// 删除图层。仅剩一层时拒绝。删除后选中同一下标的图层（若存在），否则选中第一层。
    pub fn delete_layer(&mut self, id: LayerId) -> Option<Layer> {
        if self.layers.len() <= 1 {
            warn!("refusing to delete layer {id}: it is the last layer");
            return None;
        }
        let Some(index) = self.position(id) else {
            warn!("delete_layer: unknown layer {id}");
            return None;
        };
        let removed = self.layers.remove(index);
        let next = if index < self.layers.len() { index } else { 0 };
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.selected = i == next;
        }
        self.restack();
        Some(removed)
    }

    pub fn rename_layer(&mut self, id: LayerId, name: &str) -> bool {
        let Some(layer) = self.layer_mut(id) else {
            warn!("rename_layer: unknown layer {id}");
            return false;
        };
        layer.name = name.to_string();
        true
    }

    /// 排他选中。
    pub fn select_layer(&mut self, id: LayerId) -> bool {
        if self.position(id).is_none() {
            warn!("select_layer: unknown layer {id}");
            return false;
        }
        for layer in &mut self.layers {
            layer.selected = layer.id == id;
        }
        true
    }

    pub fn move_up(&mut self, id: LayerId) -> bool {
        let Some(index) = self.position(id) else {
            warn!("move_up: unknown layer {id}");
            return false;
        };
        if index == 0 {
            return false;
        }
        self.layers.swap(index, index - 1);
        self.restack();
        true
    }

    pub fn move_down(&mut self, id: LayerId) -> bool {
        let Some(index) = self.position(id) else {
            warn!("move_down: unknown layer {id}");
            return false;
        };
        if index + 1 >= self.layers.len() {
            return false;
        }
        self.layers.swap(index, index + 1);
        self.restack();
        true
    }

    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> bool {
        let Some(layer) = self.layer_mut(id) else {
            warn!("set_visible: unknown layer {id}");
            return false;
        };
        layer.visible = visible;
        true
    }

    pub fn set_locked(&mut self, id: LayerId, locked: bool) -> bool {
        let Some(layer) = self.layer_mut(id) else {
            warn!("set_locked: unknown layer {id}");
            return false;
        };
        layer.locked = locked;
        true
    }

    fn cell_mut(&mut self, id: LayerId, col: u32, row: u32) -> Option<&mut TileId> {
        let (columns, rows) = (self.columns, self.rows);
        let Some(layer) = self.layer_mut(id) else {
            warn!("unknown layer {id}");
            return None;
        };
        if col >= columns || row >= rows {
            warn!("cell ({col}, {row}) is outside the {columns}x{rows} map");
            return None;
        }
        layer
            .grid
            .get_mut(row as usize)
            .and_then(|r| r.get_mut(col as usize))
    }

    pub fn set_cell(&mut self, id: LayerId, col: u32, row: u32, tile: TileId) -> bool {
        match self.cell_mut(id, col, row) {
            Some(cell) => {
                *cell = tile;
                true
            }
            None => false,
        }
    }

    /// 未知图层 / 越界返回 0。
    pub fn get_cell(&self, id: LayerId, col: u32, row: u32) -> TileId {
        self.layer(id)
            .and_then(|l| l.grid.get(row as usize))
            .and_then(|r| r.get(col as usize))
            .copied()
            .unwrap_or(EMPTY_TILE)
    }

    pub fn clear_cell(&mut self, id: LayerId, col: u32, row: u32) -> bool {
        self.set_cell(id, col, row, EMPTY_TILE)
    }

    pub fn export_flat(&self, id: LayerId) -> Option<FlatLayer> {
        let Some(layer) = self.layer(id) else {
            warn!("export_flat: unknown layer {id}");
            return None;
        };
        Some(FlatLayer {
            columns: self.columns,
            rows: self.rows,
            cells: flatten(&layer.grid),
        })
    }

    /// 把扁平网格逐格合并进图层。列数不一致时不合并，返回 false。
    pub fn merge_flat(&mut self, id: LayerId, flat: &FlatLayer) -> bool {
        if flat.columns != self.columns {
            warn!(
                "merge_flat: cached columns {} do not match map columns {}",
                flat.columns, self.columns
            );
            return false;
        }
        let rows = self.rows as usize;
        let Some(layer) = self.layer_mut(id) else {
            warn!("merge_flat: unknown layer {id}");
            return false;
        };
        for (row, cells) in flat.to_grid().into_iter().enumerate().take(rows) {
            for (col, tile) in cells.into_iter().enumerate() {
                if let Some(cell) = layer.grid[row].get_mut(col) {
                    *cell = tile;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(n: usize) -> LayerManager {
        let mut m = LayerManager::new(10, 8);
        for _ in 0..n {
            m.add_layer("");
        }
        m
    }

    fn selected_count(m: &LayerManager) -> usize {
        m.layers().iter().filter(|l| l.selected).count()
    }

    #[test]
    fn add_layer_allocates_max_plus_one_and_selects() {
        let mut m = manager_with(2);
        assert_eq!(m.order(), vec![1, 2]);
        assert_eq!(m.layer(2).unwrap().name, "Layer - 2");
        assert_eq!(m.selected_id(), Some(2));
        m.delete_layer(1);
        let id = m.add_layer("Trees").id;
        assert_eq!(id, 3);
        assert_eq!(m.layer(3).unwrap().name, "Trees");
        assert_eq!(selected_count(&m), 1);
        assert_eq!(m.layer(3).unwrap().grid.len(), 8);
        assert_eq!(m.layer(3).unwrap().grid[0].len(), 10);
    }

    #[test]
    fn last_layer_cannot_be_deleted() {
        let mut m = manager_with(1);
        assert!(m.delete_layer(1).is_none());
        assert_eq!(m.len(), 1);
        assert_eq!(m.selected_id(), Some(1));
    }

    #[test]
    fn delete_selects_same_index_or_first() {
        let mut m = manager_with(3);
        m.delete_layer(2);
        // 下标 1 现在是图层 3
        assert_eq!(m.selected_id(), Some(3));
        m.delete_layer(3);
        assert_eq!(m.selected_id(), Some(1));
        assert_eq!(selected_count(&m), 1);
    }

    #[test]
    fn add_delete_sequences_keep_invariant() {
        let mut m = manager_with(1);
        let ops = [true, true, false, true, false, false, false, true, false, false];
        for (i, add) in ops.iter().enumerate() {
            if *add {
                m.add_layer("");
            } else {
                let victim = m.order()[i % m.len()];
                m.delete_layer(victim);
            }
            assert!(m.len() >= 1);
            assert_eq!(selected_count(&m), 1);
        }
    }

    #[test]
    fn reorder_is_noop_at_boundaries() {
        let mut m = manager_with(3);
        assert!(!m.move_up(1));
        assert!(!m.move_down(3));
        assert_eq!(m.order(), vec![1, 2, 3]);
        assert!(m.move_up(3));
        assert_eq!(m.order(), vec![1, 3, 2]);
        assert!(m.move_down(1));
        assert_eq!(m.order(), vec![3, 1, 2]);
        assert_eq!(m.layer(3).unwrap().z_index, 2);
        assert_eq!(m.layer(2).unwrap().z_index, 0);
    }

    #[test]
    fn cells_and_unknown_references() {
        let mut m = manager_with(1);
        assert!(m.set_cell(1, 2, 3, 5));
        assert_eq!(m.get_cell(1, 2, 3), 5);
        assert!(m.clear_cell(1, 2, 3));
        assert_eq!(m.get_cell(1, 2, 3), 0);

        assert!(!m.set_cell(9, 0, 0, 1));
        assert!(!m.set_cell(1, 10, 0, 1));
        assert!(!m.set_cell(1, 0, 8, 1));
        assert_eq!(m.get_cell(9, 0, 0), 0);
        assert!(!m.rename_layer(9, "x"));
        assert!(!m.select_layer(9));
        assert!(!m.set_visible(9, false));
        assert!(!m.set_locked(9, true));
        assert!(m.export_flat(9).is_none());
    }

    #[test]
    fn export_and_merge_flat() {
        let mut m = manager_with(1);
        m.set_cell(1, 9, 7, 4);
        m.set_cell(1, 0, 0, 2);
        let flat = m.export_flat(1).unwrap();
        assert_eq!(flat.columns, 10);
        assert_eq!(flat.cells.len(), 80);
        assert_eq!(flat.cells[79], 4);

        let mut other = manager_with(1);
        assert!(other.merge_flat(1, &flat));
        assert_eq!(other.get_cell(1, 9, 7), 4);
        assert_eq!(other.get_cell(1, 0, 0), 2);

        let mut narrow = LayerManager::new(6, 8);
        narrow.add_layer("");
        assert!(!narrow.merge_flat(1, &flat));
        assert_eq!(narrow.get_cell(1, 0, 0), 0);
    }

    #[test]
    fn merge_flat_tolerates_fewer_rows() {
        let flat = FlatLayer {
            columns: 10,
            rows: 20,
            cells: vec![3; 200],
        };
        let mut m = manager_with(1);
        assert!(m.merge_flat(1, &flat));
        assert_eq!(m.get_cell(1, 9, 7), 3);
    }

    #[test]
    fn from_layers_normalizes() {
        let mut a = Layer::new(4, "a".into(), 2, 2);
        a.selected = true;
        let mut b = Layer::new(7, "b".into(), 2, 2);
        b.selected = true;
        let m = LayerManager::from_layers(3, 2, vec![a, b]);
        assert_eq!(selected_count(&m), 1);
        assert_eq!(m.selected_id(), Some(4));
        assert_eq!(m.layer(7).unwrap().grid[0].len(), 3);
    }
}
