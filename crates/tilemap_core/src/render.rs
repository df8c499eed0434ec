//! 渲染缓存：每个已绘制格子一个渲染句柄。
//!
//! 图层网格是唯一的真实数据；这里只是派生缓存。
//! - [`PaintedTileIndex`]：`(layer, col, row)` → 句柄，O(1) 判断“已绘制”与擦除。
//! - [`RenderScene`]：句柄 → 精灵元数据的旁表，外加一条给宿主消费的 spawn/despawn 队列。

use std::collections::HashMap;

use crate::{LayerId, TileId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub layer_id: LayerId,
    pub col: u32,
    pub row: u32,
}

impl CellKey {
    pub const fn new(layer_id: LayerId, col: u32, row: u32) -> Self {
        Self { layer_id, col, row }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PaintedTileIndex {
    by_cell: HashMap<CellKey, RenderHandle>,
}

impl PaintedTileIndex {
    pub fn contains(&self, key: &CellKey) -> bool {
        self.by_cell.contains_key(key)
    }

    pub fn get(&self, key: &CellKey) -> Option<RenderHandle> {
        self.by_cell.get(key).copied()
    }

    pub fn insert(&mut self, key: CellKey, handle: RenderHandle) -> Option<RenderHandle> {
        self.by_cell.insert(key, handle)
    }

    pub fn remove(&mut self, key: &CellKey) -> Option<RenderHandle> {
        self.by_cell.remove(key)
    }

    /// 移除某图层的全部条目，返回被移除的句柄。
    pub fn remove_layer(&mut self, layer_id: LayerId) -> Vec<RenderHandle> {
        let mut removed = Vec::new();
        self.by_cell.retain(|k, h| {
            if k.layer_id == layer_id {
                removed.push(*h);
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.by_cell.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_cell.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_cell.clear();
    }
}

/// 一个精灵需要的全部信息；位置由宿主根据视口实时换算。
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteMeta {
    pub layer_id: LayerId,
    pub col: u32,
    pub row: u32,
    pub tile_id: TileId,
    pub visible: bool,
    pub z_index: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RenderOp {
    Spawn(RenderHandle),
    Despawn(RenderHandle),
}

#[derive(Clone, Debug, Default)]
pub struct RenderScene {
    next_handle: u64,
    sprites: HashMap<RenderHandle, SpriteMeta>,
    ops: Vec<RenderOp>,
    /// 位置 / 可见性 / 层级需要整体同步。
    dirty: bool,
}

impl RenderScene {
    pub fn spawn(&mut self, meta: SpriteMeta) -> RenderHandle {
        let handle = RenderHandle(self.next_handle);
        self.next_handle += 1;
        self.sprites.insert(handle, meta);
        self.ops.push(RenderOp::Spawn(handle));
        handle
    }

    pub fn despawn(&mut self, handle: RenderHandle) -> Option<SpriteMeta> {
        let meta = self.sprites.remove(&handle)?;
        self.ops.push(RenderOp::Despawn(handle));
        Some(meta)
    }

    pub fn despawn_all(&mut self) {
        let mut handles: Vec<RenderHandle> = self.sprites.keys().copied().collect();
        handles.sort();
        for handle in handles {
            self.despawn(handle);
        }
    }

    pub fn get(&self, handle: RenderHandle) -> Option<&SpriteMeta> {
        self.sprites.get(&handle)
    }

    pub fn sprites(&self) -> impl Iterator<Item = (&RenderHandle, &SpriteMeta)> {
        self.sprites.iter()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn set_layer_visible(&mut self, layer_id: LayerId, visible: bool) {
        for meta in self.sprites.values_mut().filter(|m| m.layer_id == layer_id) {
            meta.visible = visible;
        }
        self.dirty = true;
    }

    pub fn set_layer_z(&mut self, layer_id: LayerId, z_index: i32) {
        for meta in self.sprites.values_mut().filter(|m| m.layer_id == layer_id) {
            meta.z_index = z_index;
        }
        self.dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn drain_ops(&mut self) -> Vec<RenderOp> {
        std::mem::take(&mut self.ops)
    }
}
