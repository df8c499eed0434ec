//! 引擎宿主：持有 Painter，负责挂载与 resize 时的销毁重建。
//!
//! 渲染表面不做原地 resize：每次窗口尺寸变化都 teardown 旧引擎，
//! 把 tile sheet 缓存与 session 存储交给新引擎，由 session 恢复平移与一个图层。

use bevy::prelude::*;

use tilemap_core::{
    EditorCommand, EngineConfig, MemorySessionStore, Painter, RenderOp, TileSheetCache,
};

#[derive(Resource, Default)]
pub struct EngineHost {
    painter: Option<Painter>,
    /// 重建次数（用于日志）。
    generation: u32,
}

impl EngineHost {
    pub fn painter(&self) -> Option<&Painter> {
        self.painter.as_ref()
    }

    pub fn painter_mut(&mut self) -> Option<&mut Painter> {
        self.painter.as_mut()
    }

    pub fn is_mounted(&self) -> bool {
        self.painter.is_some()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// 首次挂载。已挂载时忽略。
    pub fn mount(&mut self, config: EngineConfig) {
        if self.painter.is_some() {
            return;
        }
        self.painter = Some(Painter::new(
            config,
            TileSheetCache::default(),
            Box::new(MemorySessionStore::default()),
        ));
    }

    /// 以新的表面尺寸重建引擎，返回旧引擎需要释放的渲染操作。
    ///
    /// 地图尺寸与 tile 尺寸沿用旧引擎（可能来自导入的地图）；当前图片由宿主重新选中。
    pub fn recreate(&mut self, width: f64, height: f64) -> Vec<RenderOp> {
        let Some(old) = self.painter.take() else {
            return Vec::new();
        };
        let config = old.config().with_surface(width, height);
        let image_id = old.image_id().map(str::to_string);
        let brush = old.picker().brush();

        let parts = old.teardown();
        debug!(
            "engine teardown: {} listeners removed, {} render ops",
            parts.listeners_removed,
            parts.released.len()
        );

        let mut painter = Painter::new(config, parts.cache, parts.store);
        if let Some(image_id) = image_id {
            painter.apply(EditorCommand::SelectImage { image_id });
        }
        if let Some(tile_id) = brush {
            painter.apply(EditorCommand::SelectTile { tile_id });
        }
        self.painter = Some(painter);
        self.generation += 1;
        info!("engine recreated at {width}x{height} (generation {})", self.generation);
        parts.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilemap_core::{CellKey, EngineConfig};

    fn config() -> EngineConfig {
        EngineConfig {
            columns: 10,
            rows: 8,
            surface_width: 800.0,
            surface_height: 600.0,
            map_height_ratio: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn recreate_keeps_painted_layer_and_image() {
        let mut host = EngineHost::default();
        host.mount(config());
        let painter = host.painter_mut().unwrap();
        painter.tile_sheet_decoded("sheet", 128, 64);
        painter.apply(EditorCommand::SelectImage {
            image_id: "sheet".into(),
        });
        painter.apply(EditorCommand::SelectTile { tile_id: 3 });
        assert!(painter.paint_tile(2, 2, 3));

        let released = host.recreate(1024.0, 768.0);
        assert!(released.iter().any(|op| matches!(op, RenderOp::Despawn(_))));
        assert_eq!(host.generation(), 1);

        let painter = host.painter().unwrap();
        assert_eq!(painter.config().surface_width, 1024.0);
        assert_eq!(painter.config().columns, 10);
        assert_eq!(painter.image_id(), Some("sheet"));
        assert_eq!(painter.picker().brush(), Some(3));
        assert!(painter.index().contains(&CellKey::new(1, 2, 2)));
    }

    #[test]
    fn recreate_before_mount_is_noop() {
        let mut host = EngineHost::default();
        assert!(host.recreate(100.0, 100.0).is_empty());
        assert!(!host.is_mounted());
    }
}
