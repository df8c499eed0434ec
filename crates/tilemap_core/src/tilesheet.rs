//! Tile sheet（精灵图）切片与缓存。
//!
//! 图片解码由宿主异步完成；解码完成前，对该图片的查询一律视为 pending。
//! 缓存以 `(image_id, tile_width, tile_height)` 为键：tile 尺寸不匹配的旧切片在查询时被淘汰并重建，
//! 绝不会以错误的切片复用。

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::TilemapError;
use crate::TileId;

/// 纹理内的裁剪区域（像素，原点左上）。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// 一个可渲染的 tile：来自哪张图片、哪个裁剪区域。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileHandle {
    pub image_id: String,
    pub tile_id: TileId,
    pub col: u32,
    pub row: u32,
    pub source: SourceRect,
}

#[derive(Clone, Debug)]
pub struct TileSheet {
    pub source_image_id: String,
    pub tile_width: u32,
    pub tile_height: u32,
    /// `grid[row][col]`，行优先。
    pub grid: Vec<Vec<TileHandle>>,
}

impl TileSheet {
    /// 把 `image_width x image_height` 的图片按 tile 尺寸切成网格（不足一格的边角舍弃）。
    pub fn slice(
        image_id: &str,
        image_width: u32,
        image_height: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, TilemapError> {
        if tile_width == 0 || tile_height == 0 {
            return Err(TilemapError::ZeroTileSize {
                width: tile_width,
                height: tile_height,
            });
        }
        let columns = image_width / tile_width;
        let rows = image_height / tile_height;
        if columns == 0 || rows == 0 {
            return Err(TilemapError::ImageTooSmall {
                image_id: image_id.to_string(),
                image_width,
                image_height,
                tile_width,
                tile_height,
            });
        }

        let grid = (0..rows)
            .map(|row| {
                (0..columns)
                    .map(|col| TileHandle {
                        image_id: image_id.to_string(),
                        tile_id: row * columns + col + 1,
                        col,
                        row,
                        source: SourceRect {
                            x: col * tile_width,
                            y: row * tile_height,
                            width: tile_width,
                            height: tile_height,
                        },
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            source_image_id: image_id.to_string(),
            tile_width,
            tile_height,
            grid,
        })
    }

    pub fn columns(&self) -> u32 {
        self.grid.first().map(|r| r.len() as u32).unwrap_or(0)
    }

    pub fn rows(&self) -> u32 {
        self.grid.len() as u32
    }

    /// `(col, row)` → tile id（从 1 开始，0 留给空格子）。
    pub fn tile_id_at(&self, col: u32, row: u32) -> Option<TileId> {
        self.grid
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .map(|h| h.tile_id)
    }

    pub fn handle(&self, tile_id: TileId) -> Option<&TileHandle> {
        let columns = self.columns();
        if tile_id == 0 || columns == 0 {
            return None;
        }
        let index = tile_id - 1;
        self.grid
            .get((index / columns) as usize)
            .and_then(|r| r.get((index % columns) as usize))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ImageSize {
    width: u32,
    height: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SheetKey {
    image_id: String,
    tile_width: u32,
    tile_height: u32,
}

pub enum SheetLookup<'a> {
    Ready(&'a TileSheet),
    /// 图片仍在解码。
    Pending,
    /// 从未请求过，或切片失败。
    Missing,
}

impl<'a> SheetLookup<'a> {
    pub fn ready(self) -> Option<&'a TileSheet> {
        match self {
            SheetLookup::Ready(sheet) => Some(sheet),
            _ => None,
        }
    }
}

/// 显式持有的 tile sheet 缓存：由宿主创建并传给引擎，引擎销毁时交还。
#[derive(Clone, Debug, Default)]
pub struct TileSheetCache {
    images: HashMap<String, ImageSize>,
    pending: HashSet<String>,
    sheets: HashMap<SheetKey, TileSheet>,
}

impl TileSheetCache {
    /// 记录一次已发起、尚未完成的图片解码。
    pub fn mark_pending(&mut self, image_id: &str) {
        if !self.images.contains_key(image_id) {
            self.pending.insert(image_id.to_string());
        }
    }

    pub fn is_pending(&self, image_id: &str) -> bool {
        self.pending.contains(image_id)
    }

    /// 图片解码完成。同一图片的旧切片全部作废（图片内容可能已变）。
    pub fn insert_decoded(&mut self, image_id: &str, width: u32, height: u32) {
        self.pending.remove(image_id);
        self.images
            .insert(image_id.to_string(), ImageSize { width, height });
        self.invalidate_image(image_id);
    }

    /// 查询（必要时构建）某个 tile 尺寸下的切片。
    pub fn sheet(&mut self, image_id: &str, tile_width: u32, tile_height: u32) -> SheetLookup<'_> {
        // 淘汰同一图片、tile 尺寸不同的旧切片
        let before = self.sheets.len();
        self.sheets.retain(|k, _| {
            k.image_id != image_id || (k.tile_width == tile_width && k.tile_height == tile_height)
        });
        if self.sheets.len() != before {
            debug!("evicted stale tile sheet slicing for {image_id}");
        }

        let key = SheetKey {
            image_id: image_id.to_string(),
            tile_width,
            tile_height,
        };
        if !self.sheets.contains_key(&key) {
            let Some(size) = self.images.get(image_id).copied() else {
                return if self.pending.contains(image_id) {
                    SheetLookup::Pending
                } else {
                    SheetLookup::Missing
                };
            };
            match TileSheet::slice(image_id, size.width, size.height, tile_width, tile_height) {
                Ok(sheet) => {
                    self.sheets.insert(key.clone(), sheet);
                }
                Err(err) => {
                    warn!("failed to slice tile sheet: {err}");
                    return SheetLookup::Missing;
                }
            }
        }
        match self.sheets.get(&key) {
            Some(sheet) => SheetLookup::Ready(sheet),
            None => SheetLookup::Missing,
        }
    }

    /// 只读查询：不构建、不淘汰。
    pub fn peek(&self, image_id: &str, tile_width: u32, tile_height: u32) -> Option<&TileSheet> {
        self.sheets.get(&SheetKey {
            image_id: image_id.to_string(),
            tile_width,
            tile_height,
        })
    }

    pub fn invalidate(&mut self, image_id: &str, tile_width: u32, tile_height: u32) -> bool {
        self.sheets
            .remove(&SheetKey {
                image_id: image_id.to_string(),
                tile_width,
                tile_height,
            })
            .is_some()
    }

    pub fn invalidate_image(&mut self, image_id: &str) {
        self.sheets.retain(|k, _| k.image_id != image_id);
    }

    pub fn cached_sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_is_row_major() {
        let sheet = TileSheet::slice("img", 100, 64, 32, 32).unwrap();
        // 100 / 32 = 3 列，边角舍弃
        assert_eq!(sheet.columns(), 3);
        assert_eq!(sheet.rows(), 2);
        let h = &sheet.grid[1][2];
        assert_eq!(h.tile_id, 6);
        assert_eq!(h.source, SourceRect { x: 64, y: 32, width: 32, height: 32 });
        assert_eq!(sheet.handle(6), Some(h));
        assert_eq!(sheet.tile_id_at(0, 1), Some(4));
        assert!(sheet.handle(0).is_none());
        assert!(sheet.handle(7).is_none());
    }

    #[test]
    fn slice_rejects_bad_input() {
        assert!(matches!(
            TileSheet::slice("img", 64, 64, 0, 32),
            Err(TilemapError::ZeroTileSize { .. })
        ));
        assert!(matches!(
            TileSheet::slice("img", 16, 64, 32, 32),
            Err(TilemapError::ImageTooSmall { .. })
        ));
    }

    #[test]
    fn pending_until_decoded() {
        let mut cache = TileSheetCache::default();
        assert!(matches!(cache.sheet("a", 32, 32), SheetLookup::Missing));
        cache.mark_pending("a");
        assert!(matches!(cache.sheet("a", 32, 32), SheetLookup::Pending));
        cache.insert_decoded("a", 128, 64);
        assert!(!cache.is_pending("a"));
        let sheet = cache.sheet("a", 32, 32).ready().unwrap();
        assert_eq!(sheet.columns(), 4);
    }

    #[test]
    fn mismatched_tile_size_is_evicted_and_rebuilt() {
        let mut cache = TileSheetCache::default();
        cache.insert_decoded("a", 128, 64);
        assert!(cache.sheet("a", 32, 32).ready().is_some());
        assert_eq!(cache.cached_sheet_count(), 1);

        let sheet = cache.sheet("a", 16, 16).ready().unwrap();
        assert_eq!(sheet.tile_width, 16);
        assert_eq!(sheet.columns(), 8);
        assert_eq!(cache.cached_sheet_count(), 1);
        assert!(cache.peek("a", 32, 32).is_none());
    }

    #[test]
    fn explicit_invalidation() {
        let mut cache = TileSheetCache::default();
        cache.insert_decoded("a", 64, 64);
        cache.insert_decoded("b", 64, 64);
        cache.sheet("a", 32, 32);
        cache.sheet("b", 32, 32);
        assert!(cache.invalidate("a", 32, 32));
        assert!(!cache.invalidate("a", 32, 32));
        assert_eq!(cache.cached_sheet_count(), 1);
        // 重新解码会作废旧切片
        cache.insert_decoded("b", 96, 96);
        assert_eq!(cache.cached_sheet_count(), 0);
        assert_eq!(cache.sheet("b", 32, 32).ready().unwrap().columns(), 3);
    }
}
