//! 会话延续：容器 resize 会销毁并重建编辑器，这里把视口平移与一个图层的扁平网格
//! 写进外部 key-value 存储，重建时再合并回来。
//!
//! 只做单图层的 best-effort 恢复：列数不一致时新地图保持为空，其余图层不恢复。

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TilemapError;
use crate::layers::{FlatLayer, LayerManager};
use crate::{LayerId, TileId};

/// 外部 key-value 存储（值为 RON 文本）。
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore {
    values: HashMap<String, String>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SessionViewport {
    pub pan_x: f64,
    pub pan_y: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SessionLayer {
    pub layer_id: LayerId,
    pub columns: u32,
    pub cells: Vec<TileId>,
    /// 是否真的画过（未画过的图层不参与恢复）。
    pub painted: bool,
}

pub struct SessionBridge;

impl SessionBridge {
    pub const VIEWPORT_KEY: &'static str = "tilemap.session.viewport";
    pub const LAYER_KEY: &'static str = "tilemap.session.layer";

    fn encode<T: Serialize>(store: &mut dyn SessionStore, key: &str, value: &T) {
        match ron::to_string(value) {
            Ok(text) => store.set(key, text),
            Err(err) => warn!("failed to encode session value '{key}': {err}"),
        }
    }

    fn decode<T: DeserializeOwned>(
        store: &dyn SessionStore,
        key: &str,
    ) -> Result<Option<T>, TilemapError> {
        let Some(text) = store.get(key) else {
            return Ok(None);
        };
        ron::from_str::<T>(&text)
            .map(Some)
            .map_err(|e| TilemapError::SessionPayload {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    pub fn save_viewport(store: &mut dyn SessionStore, pan_x: f64, pan_y: f64) {
        Self::encode(store, Self::VIEWPORT_KEY, &SessionViewport { pan_x, pan_y });
    }

    pub fn load_viewport(store: &dyn SessionStore) -> Option<SessionViewport> {
        Self::decode(store, Self::VIEWPORT_KEY).unwrap_or_else(|err| {
            warn!("{err}");
            None
        })
    }

    /// 记录刚刚被绘制 / 擦除过的图层。
    pub fn save_layer(store: &mut dyn SessionStore, layer_id: LayerId, flat: &FlatLayer) {
        let layer = SessionLayer {
            layer_id,
            columns: flat.columns,
            cells: flat.cells.clone(),
            painted: true,
        };
        Self::encode(store, Self::LAYER_KEY, &layer);
    }

    pub fn load_layer(store: &dyn SessionStore) -> Option<SessionLayer> {
        Self::decode(store, Self::LAYER_KEY).unwrap_or_else(|err| {
            warn!("{err}");
            None
        })
    }

    pub fn clear(store: &mut dyn SessionStore) {
        store.remove(Self::VIEWPORT_KEY);
        store.remove(Self::LAYER_KEY);
    }

    /// 把缓存的图层合并进新建的（空）图层网格，返回被写入的图层 id。
    ///
    /// 目标是缓存里记录的图层 id。新建的引擎只有一个图层（id 重新编号），
    /// 这种情况下写入该图层；多图层的地图里找不到该 id 时不恢复。
    pub fn rehydrate(store: &dyn SessionStore, layers: &mut LayerManager) -> Option<LayerId> {
        let cached = Self::load_layer(store)?;
        if !cached.painted {
            return None;
        }
        if cached.columns != layers.columns() {
            debug!(
                "session layer has {} columns, map has {}: starting empty",
                cached.columns,
                layers.columns()
            );
            return None;
        }
        let target = if layers.layer(cached.layer_id).is_some() {
            cached.layer_id
        } else if layers.len() == 1 {
            layers.selected_id()?
        } else {
            debug!("session layer {} not in map: starting empty", cached.layer_id);
            return None;
        };
        let rows = if cached.columns == 0 {
            0
        } else {
            (cached.cells.len() as u32).div_ceil(cached.columns)
        };
        let flat = FlatLayer {
            columns: cached.columns,
            rows,
            cells: cached.cells,
        };
        layers.merge_flat(target, &flat).then_some(target)
    }
}
