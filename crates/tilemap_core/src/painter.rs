//! Painter：编辑器引擎本体。
//!
//! 组合视口、选择器、图层与渲染缓存，消费指针 / 滚轮输入并发出领域事件。
//! 图层网格与 PaintedTileIndex 只由 Painter 修改；视口与选择器对图层数据只读。
//!
//! 指针生命周期：`Idle → Pressed → (Dragging | Released)`。
//! - 按下时记录是否按在地图格子上（`touched_map`），之后的拖拽行为只看这个标记。
//! - 按在地图上且模式不是 Translate：拖动即“涂抹”，同一次拖动中同一格子只处理一次。
//! - 其余情况拖动即平移（地图区域平移视口，选择器区域平移选择器）。
//! - 无位移的点击按单格操作处理（选择器区域则是选笔刷）。

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::events::{EditorCommand, EditorEvent, EventBus, ListenerId};
use crate::geometry::{locate_cell, rects_equal, CellRect, Point};
use crate::layers::LayerManager;
use crate::picker::TilePicker;
use crate::render::{CellKey, PaintedTileIndex, RenderOp, RenderScene, SpriteMeta};
use crate::session::{SessionBridge, SessionStore};
use crate::tilesheet::{SheetLookup, TileSheet, TileSheetCache};
use crate::viewport::Viewport;
use crate::{LayerId, TileId, EMPTY_TILE};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaintMode {
    #[default]
    Paint,
    Erase,
    Translate,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerPhase {
    #[default]
    Idle,
    Pressed,
    Dragging,
}

/// 地图上的 hover 反馈。
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Highlight {
    None,
    Cell(CellRect),
    Eraser(CellRect),
}

#[derive(Clone, Copy, Debug, Default)]
struct PointerState {
    phase: PointerPhase,
    press: Point,
    last: Point,
    touched_map: bool,
    touched_picker: bool,
    last_cell: Option<(u32, u32)>,
}

/// 销毁编辑器后交还给宿主的资源（重建时传回）。
pub struct Teardown {
    pub cache: TileSheetCache,
    pub store: Box<dyn SessionStore>,
    pub listeners_removed: usize,
    /// 宿主需要释放的渲染对象。
    pub released: Vec<RenderOp>,
}

pub struct Painter {
    config: EngineConfig,
    viewport: Viewport,
    picker: TilePicker,
    layers: LayerManager,
    index: PaintedTileIndex,
    scene: RenderScene,
    cache: TileSheetCache,
    store: Box<dyn SessionStore>,
    events: EventBus,
    mode: PaintMode,
    pointer: PointerState,
    hover_map: CellRect,
    image_id: Option<String>,
    redraw: bool,
    picker_dirty: bool,
}

impl Painter {
    /// 创建编辑器：建立第一个图层，并从 session 恢复视口平移与缓存的图层。
    pub fn new(config: EngineConfig, cache: TileSheetCache, store: Box<dyn SessionStore>) -> Self {
        let mut layers = LayerManager::new(config.columns, config.rows);
        layers.add_layer("");

        let mut viewport = Viewport::new(&config);
        if let Some(vp) = SessionBridge::load_viewport(store.as_ref()) {
            viewport.set_pan(vp.pan_x, vp.pan_y);
        }
        if let Some(id) = SessionBridge::rehydrate(store.as_ref(), &mut layers) {
            debug!("rehydrated layer {id} from session");
        }

        let mut painter = Self {
            picker: TilePicker::new(&config),
            viewport,
            layers,
            config,
            index: PaintedTileIndex::default(),
            scene: RenderScene::default(),
            cache,
            store,
            events: EventBus::default(),
            mode: PaintMode::default(),
            pointer: PointerState::default(),
            hover_map: CellRect::EMPTY,
            image_id: None,
            redraw: true,
            picker_dirty: true,
        };
        painter.rebuild_render_cache();
        painter.announce_layers();
        painter
    }

    // ---- 只读访问 ----

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn picker(&self) -> &TilePicker {
        &self.picker
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    pub fn index(&self) -> &PaintedTileIndex {
        &self.index
    }

    pub fn scene(&self) -> &RenderScene {
        &self.scene
    }

    pub fn mode(&self) -> PaintMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PaintMode) {
        if self.mode != mode {
            self.mode = mode;
            self.redraw = true;
        }
    }

    pub fn pointer_phase(&self) -> PointerPhase {
        self.pointer.phase
    }

    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_deref()
    }

    /// 当前图片在当前 tile 尺寸下的切片（未就绪时为 `None`）。
    pub fn tile_sheet(&self) -> Option<&TileSheet> {
        let id = self.image_id.as_deref()?;
        self.cache
            .peek(id, self.config.tile_width, self.config.tile_height)
    }

    /// 精灵在表面上的矩形。
    pub fn sprite_rect(&self, meta: &SpriteMeta) -> CellRect {
        self.viewport.cell_rect(meta.col, meta.row)
    }

    /// 选择器格子在表面上的矩形。
    pub fn picker_cell_rect(&self, col: u32, row: u32) -> CellRect {
        let mut rect = self.picker.cell_rect(col, row);
        rect.y += self.picker.origin_y();
        rect
    }

    pub fn picker_hover_rect(&self) -> CellRect {
        self.to_surface(self.picker.hovered())
    }

    pub fn brush_rect(&self) -> CellRect {
        self.to_surface(self.picker.chosen_rect())
    }

    fn to_surface(&self, rect: CellRect) -> CellRect {
        if rect.is_empty() {
            return rect;
        }
        CellRect {
            y: rect.y + self.picker.origin_y(),
            ..rect
        }
    }

    pub fn highlight(&self) -> Highlight {
        if self.hover_map.is_empty() {
            return Highlight::None;
        }
        match self.mode {
            PaintMode::Paint => Highlight::Cell(self.hover_map),
            PaintMode::Erase => Highlight::Eraser(self.hover_map),
            PaintMode::Translate => Highlight::None,
        }
    }

    // ---- 宿主逐帧消费 ----

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&EditorEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain()
    }

    pub fn drain_render_ops(&mut self) -> Vec<RenderOp> {
        self.scene.drain_ops()
    }

    /// 精灵位置 / 可见性 / 层级是否需要整体同步。
    pub fn take_scene_dirty(&mut self) -> bool {
        self.scene.take_dirty()
    }

    /// 选择器网格是否需要重建。
    pub fn take_picker_dirty(&mut self) -> bool {
        std::mem::take(&mut self.picker_dirty)
    }

    /// hover 反馈是否需要重绘；每帧最多消费一次。
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    // ---- 指针输入 ----

    pub fn pointer_down(&mut self, point: Point) {
        let touched_map = self.viewport.cell_at(point).is_some();
        self.pointer = PointerState {
            phase: PointerPhase::Pressed,
            press: point,
            last: point,
            touched_map,
            touched_picker: !touched_map && self.picker.in_region(point),
            last_cell: None,
        };
    }

    pub fn pointer_move(&mut self, point: Point) {
        if self.pointer.phase != PointerPhase::Idle {
            if self.pointer.touched_map && self.mode != PaintMode::Translate {
                // 按下的格子在第一次移动时补处理，快速拖出也不会漏掉
                if self.pointer.last_cell.is_none() {
                    if let Some(cell) = self.viewport.cell_at(self.pointer.press) {
                        self.apply_mode_at(cell.0, cell.1);
                        self.pointer.last_cell = Some(cell);
                    }
                }
                if let Some(cell) = self.viewport.cell_at(point) {
                    if self.pointer.last_cell != Some(cell) {
                        self.apply_mode_at(cell.0, cell.1);
                        self.pointer.last_cell = Some(cell);
                    }
                }
                self.pointer.phase = PointerPhase::Dragging;
            } else {
                let dx = point.x - self.pointer.last.x;
                let dy = point.y - self.pointer.last.y;
                if dx != 0.0 || dy != 0.0 {
                    if self.pointer.touched_picker {
                        self.picker.pan(dx, dy);
                        self.picker_dirty = true;
                        self.redraw = true;
                    } else {
                        self.viewport.pan(dx, dy);
                        self.viewport_changed();
                    }
                    self.pointer.phase = PointerPhase::Dragging;
                }
            }
            self.pointer.last = point;
        }
        self.update_hover(point);
    }

    pub fn pointer_up(&mut self, point: Point) {
        if self.pointer.phase == PointerPhase::Idle {
            return;
        }
        // 无位移（两位小数内）且拖动中没有处理过格子，才算点击
        let press = self.pointer.press;
        let is_click = (press.x - point.x).abs() < 0.005
            && (press.y - point.y).abs() < 0.005
            && self.pointer.last_cell.is_none();

        if is_click {
            if self.pointer.touched_picker {
                if let Some(tile) = self.picker.select_at(point) {
                    debug!("brush -> tile {tile}");
                    self.picker_dirty = true;
                    self.redraw = true;
                }
            } else if self.pointer.touched_map && self.mode != PaintMode::Translate {
                if let Some((col, row)) = self.viewport.cell_at(point) {
                    self.apply_mode_at(col, row);
                }
            }
        }
        self.pointer = PointerState::default();
    }

    /// 滚轮：落在选择器区域缩放选择器，否则缩放地图。
    pub fn wheel(&mut self, point: Point, delta_y: f64) {
        if self.picker.in_region(point) {
            if self.picker.zoom(delta_y) {
                self.picker_dirty = true;
                self.redraw = true;
            }
        } else if self.viewport.zoom(delta_y) {
            self.viewport_changed();
        }
        self.update_hover(point);
    }

    pub fn zoom_in(&mut self) -> bool {
        let zoomed = self.viewport.zoom_in();
        if zoomed {
            self.viewport_changed();
        }
        zoomed
    }

    pub fn zoom_out(&mut self) -> bool {
        let zoomed = self.viewport.zoom_out();
        if zoomed {
            self.viewport_changed();
        }
        zoomed
    }

    fn viewport_changed(&mut self) {
        self.scene.mark_dirty();
        self.hover_map = CellRect::EMPTY;
        self.redraw = true;
        let (pan_x, pan_y) = (self.viewport.pan_x, self.viewport.pan_y);
        SessionBridge::save_viewport(self.store.as_mut(), pan_x, pan_y);
        self.events.emit(EditorEvent::Session { pan_x, pan_y });
    }

    fn update_hover(&mut self, point: Point) {
        let rect = if self.viewport.in_region(point) {
            locate_cell(point, &self.viewport.build_cell_grid())
        } else {
            CellRect::EMPTY
        };
        if !rects_equal(&rect, &self.hover_map) {
            self.hover_map = rect;
            self.redraw = true;
        }
        if self.picker.hover(point) {
            self.redraw = true;
        }
    }

    fn apply_mode_at(&mut self, col: u32, row: u32) -> bool {
        match self.mode {
            PaintMode::Paint => match self.picker.brush() {
                Some(tile) => self.paint_tile(col, row, tile),
                None => {
                    debug!("no brush selected");
                    false
                }
            },
            PaintMode::Erase => self.erase_tile(col, row),
            PaintMode::Translate => false,
        }
    }

    // ---- 格子操作 ----

    /// 在当前选中图层的格子上盖一个 tile。
    ///
    /// 已绘制的格子是受保护的 no-op：必须先擦除才能重新绘制。
    pub fn paint_tile(&mut self, col: u32, row: u32, tile_id: TileId) -> bool {
        if tile_id == EMPTY_TILE {
            return false;
        }
        let Some(layer) = self.layers.selected() else {
            warn!("paint: no selected layer");
            return false;
        };
        if layer.locked {
            debug!("paint: layer {} is locked", layer.id);
            return false;
        }
        let (layer_id, visible, z_index) = (layer.id, layer.visible, layer.z_index);
        let key = CellKey::new(layer_id, col, row);
        if self.index.contains(&key) {
            return false;
        }
        if !self.layers.set_cell(layer_id, col, row, tile_id) {
            return false;
        }
        let handle = self.scene.spawn(SpriteMeta {
            layer_id,
            col,
            row,
            tile_id,
            visible,
            z_index,
        });
        self.index.insert(key, handle);
        self.persist_layer(layer_id);
        true
    }

    /// 擦除当前选中图层的格子；未绘制的格子是 no-op。
    pub fn erase_tile(&mut self, col: u32, row: u32) -> bool {
        let Some(layer) = self.layers.selected() else {
            warn!("erase: no selected layer");
            return false;
        };
        if layer.locked {
            debug!("erase: layer {} is locked", layer.id);
            return false;
        }
        let layer_id = layer.id;
        let Some(handle) = self.index.remove(&CellKey::new(layer_id, col, row)) else {
            return false;
        };
        self.scene.despawn(handle);
        self.layers.clear_cell(layer_id, col, row);
        self.persist_layer(layer_id);
        true
    }

    fn persist_layer(&mut self, layer_id: LayerId) {
        if let Some(flat) = self.layers.export_flat(layer_id) {
            SessionBridge::save_layer(self.store.as_mut(), layer_id, &flat);
        }
    }

    /// 按图层网格（唯一真实数据）重建渲染缓存。
    fn rebuild_render_cache(&mut self) {
        self.scene.despawn_all();
        self.index.clear();
        for layer in self.layers.layers() {
            for (col, row, tile_id) in layer.painted_cells() {
                let handle = self.scene.spawn(SpriteMeta {
                    layer_id: layer.id,
                    col,
                    row,
                    tile_id,
                    visible: layer.visible,
                    z_index: layer.z_index,
                });
                self.index.insert(CellKey::new(layer.id, col, row), handle);
            }
        }
        self.scene.mark_dirty();
    }

    fn restack_scene(&mut self) {
        for layer in self.layers.layers() {
            self.scene.set_layer_z(layer.id, layer.z_index);
        }
    }

    /// 把当前全部图层以事件形式告知外部（构造 / 整体替换时）。
    fn announce_layers(&mut self) {
        let layers: Vec<(LayerId, String)> = self
            .layers
            .layers()
            .iter()
            .map(|l| (l.id, l.name.clone()))
            .collect();
        for (id, name) in layers {
            self.events.emit(EditorEvent::NewLayer { id, name });
        }
        if let Some(id) = self.layers.selected_id() {
            self.events.emit(EditorEvent::SelectLayer { id });
        }
    }

    /// 整体替换图层（导入地图）。地图尺寸随之变化，视口保留平移与缩放。
    pub fn load_layers(&mut self, layers: LayerManager) -> bool {
        if layers.is_empty() {
            warn!("load_layers: refusing an empty layer set");
            return false;
        }
        for id in self.layers.order() {
            self.events.emit(EditorEvent::DeleteLayer { id });
        }
        self.config.columns = layers.columns();
        self.config.rows = layers.rows();
        let (pan_x, pan_y, scale) = (self.viewport.pan_x, self.viewport.pan_y, self.viewport.scale);
        self.viewport = Viewport::new(&self.config);
        self.viewport.set_pan(pan_x, pan_y);
        self.viewport.scale = scale;
        self.layers = layers;
        self.hover_map = CellRect::EMPTY;
        self.rebuild_render_cache();
        // session 跟着新地图走
        if let Some(id) = self.layers.selected_id() {
            self.persist_layer(id);
        }
        self.announce_layers();
        true
    }

    // ---- tile sheet ----

    /// 宿主已发起图片解码。
    pub fn tile_sheet_pending(&mut self, image_id: &str) {
        self.cache.mark_pending(image_id);
    }

    /// 宿主完成图片解码。
    pub fn tile_sheet_decoded(&mut self, image_id: &str, width: u32, height: u32) {
        self.cache.insert_decoded(image_id, width, height);
        if self.image_id.as_deref() == Some(image_id) {
            self.refresh_picker_sheet();
        }
    }

    fn select_image(&mut self, image_id: &str) {
        self.image_id = Some(image_id.to_string());
        self.refresh_picker_sheet();
    }

    fn refresh_picker_sheet(&mut self) {
        let Some(id) = self.image_id.clone() else {
            self.picker.clear_sheet();
            return;
        };
        match self
            .cache
            .sheet(&id, self.config.tile_width, self.config.tile_height)
        {
            SheetLookup::Ready(sheet) => {
                let (columns, rows) = (sheet.columns(), sheet.rows());
                self.picker.set_sheet(columns, rows);
            }
            SheetLookup::Pending => {
                debug!("tile sheet {id} still decoding");
                self.picker.clear_sheet();
            }
            SheetLookup::Missing => self.picker.clear_sheet(),
        }
        self.picker_dirty = true;
        self.redraw = true;
        self.scene.mark_dirty();
    }

    /// 修改 tile 尺寸：地图与选择器几何随之变化，旧切片在查询时被淘汰重建。
    pub fn set_tile_size(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            warn!("set_tile_size: tile size must be non-zero, got {width}x{height}");
            return false;
        }
        self.config.tile_width = width;
        self.config.tile_height = height;
        self.viewport.set_tile_size(width, height);
        self.picker.set_tile_size(width, height);
        self.hover_map = CellRect::EMPTY;
        self.refresh_picker_sheet();
        true
    }

    // ---- UI 命令 ----

    /// 执行一条 UI 命令。成功时发出对应事件；被拒绝的命令不发事件。
    pub fn apply(&mut self, command: EditorCommand) -> bool {
        match command {
            EditorCommand::SelectImage { image_id } => {
                self.select_image(&image_id);
                self.events.emit(EditorEvent::SelectedImage { image_id });
                true
            }
            EditorCommand::SelectTile { tile_id } => {
                let ok = self.picker.select_tile(tile_id);
                if ok {
                    self.picker_dirty = true;
                    self.redraw = true;
                }
                ok
            }
            EditorCommand::NewLayer { name } => {
                let layer = self.layers.add_layer(&name);
                let (id, name) = (layer.id, layer.name.clone());
                self.restack_scene();
                self.events.emit(EditorEvent::NewLayer { id, name });
                self.events.emit(EditorEvent::SelectLayer { id });
                true
            }
            EditorCommand::RenameLayer { id, name } => {
                if !self.layers.rename_layer(id, &name) {
                    return false;
                }
                self.events.emit(EditorEvent::RenameLayer { id, name });
                true
            }
            EditorCommand::DeleteLayer { id } => {
                if self.layers.delete_layer(id).is_none() {
                    return false;
                }
                for handle in self.index.remove_layer(id) {
                    self.scene.despawn(handle);
                }
                self.restack_scene();
                // session 里缓存的是被删图层：改存新选中的图层，重建时不会把旧格子带回来
                let cached = SessionBridge::load_layer(self.store.as_ref());
                if cached.is_some_and(|c| c.layer_id == id) {
                    if let Some(selected) = self.layers.selected_id() {
                        self.persist_layer(selected);
                    }
                }
                self.events.emit(EditorEvent::DeleteLayer { id });
                if let Some(selected) = self.layers.selected_id() {
                    self.events.emit(EditorEvent::SelectLayer { id: selected });
                }
                true
            }
            EditorCommand::SelectLayer { id } => {
                if !self.layers.select_layer(id) {
                    return false;
                }
                self.events.emit(EditorEvent::SelectLayer { id });
                true
            }
            EditorCommand::MoveUpLayer { id } => {
                if !self.layers.move_up(id) {
                    return false;
                }
                self.restack_scene();
                self.events.emit(EditorEvent::MoveUpLayer { id });
                true
            }
            EditorCommand::MoveDownLayer { id } => {
                if !self.layers.move_down(id) {
                    return false;
                }
                self.restack_scene();
                self.events.emit(EditorEvent::MoveDownLayer { id });
                true
            }
            EditorCommand::ToggleLockLayer { id } => {
                let Some(locked) = self.layers.layer(id).map(|l| !l.locked) else {
                    warn!("toggle lock: unknown layer {id}");
                    return false;
                };
                self.layers.set_locked(id, locked);
                self.events.emit(EditorEvent::ToggleLockLayer { id, locked });
                true
            }
            EditorCommand::ToggleDisplayLayer { id } => {
                let Some(visible) = self.layers.layer(id).map(|l| !l.visible) else {
                    warn!("toggle display: unknown layer {id}");
                    return false;
                };
                self.layers.set_visible(id, visible);
                self.scene.set_layer_visible(id, visible);
                self.events.emit(EditorEvent::ToggleDisplayLayer { id, visible });
                true
            }
        }
    }

    /// 销毁编辑器：先注销全部监听，再释放渲染对象，最后交还缓存与 session 存储。
    pub fn teardown(mut self) -> Teardown {
        let listeners_removed = self.events.unsubscribe_all();
        SessionBridge::save_viewport(
            self.store.as_mut(),
            self.viewport.pan_x,
            self.viewport.pan_y,
        );
        self.scene.despawn_all();
        self.index.clear();
        Teardown {
            cache: self.cache,
            store: self.store,
            listeners_removed,
            released: self.scene.drain_ops(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    fn config() -> EngineConfig {
        EngineConfig {
            columns: 10,
            rows: 8,
            tile_width: 32,
            tile_height: 32,
            surface_width: 800.0,
            surface_height: 600.0,
            map_height_ratio: 0.5,
            ..Default::default()
        }
    }

    fn painter() -> Painter {
        let mut p = Painter::new(
            config(),
            TileSheetCache::default(),
            Box::new(MemorySessionStore::default()),
        );
        p.tile_sheet_decoded("sheet", 128, 64);
        p.apply(EditorCommand::SelectImage {
            image_id: "sheet".into(),
        });
        p.drain_events();
        p.drain_render_ops();
        p
    }

    /// 地图格子中心（scale = 1，无平移）。
    fn cell_center(col: u32, row: u32) -> Point {
        Point::new(col as f64 * 32.0 + 16.0, row as f64 * 32.0 + 16.0)
    }

    #[test]
    fn construction_announces_first_layer() {
        let mut p = Painter::new(
            config(),
            TileSheetCache::default(),
            Box::new(MemorySessionStore::default()),
        );
        assert_eq!(
            p.drain_events(),
            vec![
                EditorEvent::NewLayer {
                    id: 1,
                    name: "Layer - 1".into()
                },
                EditorEvent::SelectLayer { id: 1 },
            ]
        );
    }

    #[test]
    fn click_paints_single_cell() {
        let mut p = painter();
        p.apply(EditorCommand::SelectTile { tile_id: 5 });
        p.pointer_down(cell_center(2, 3));
        p.pointer_up(cell_center(2, 3));
        assert_eq!(p.layers().get_cell(1, 2, 3), 5);
        assert!(p.index().contains(&CellKey::new(1, 2, 3)));
        assert_eq!(p.drain_render_ops().len(), 1);
    }

    #[test]
    fn drag_smears_without_double_stamping() {
        let mut p = painter();
        p.apply(EditorCommand::SelectTile { tile_id: 2 });
        p.pointer_down(cell_center(0, 0));
        for x in [16.0, 20.0, 30.0, 40.0, 50.0, 60.0, 80.0, 100.0] {
            p.pointer_move(Point::new(x, 16.0));
        }
        p.pointer_up(Point::new(100.0, 16.0));
        for col in 0..4 {
            assert_eq!(p.layers().get_cell(1, col, 0), 2);
        }
        assert_eq!(p.layers().get_cell(1, 4, 0), 0);
        assert_eq!(p.index().len(), 4);
        assert_eq!(p.drain_render_ops().len(), 4);
    }

    #[test]
    fn paint_is_idempotent() {
        let mut p = painter();
        assert!(p.paint_tile(1, 1, 3));
        assert!(!p.paint_tile(1, 1, 4));
        assert_eq!(p.layers().get_cell(1, 1, 1), 3);
        assert_eq!(p.index().len(), 1);
        assert_eq!(p.scene().len(), 1);
    }

    #[test]
    fn erase_is_idempotent() {
        let mut p = painter();
        assert!(!p.erase_tile(4, 4));
        assert!(p.index().is_empty());
        p.paint_tile(4, 4, 1);
        assert!(p.erase_tile(4, 4));
        assert!(!p.erase_tile(4, 4));
        assert_eq!(p.layers().get_cell(1, 4, 4), 0);
        assert!(p.scene().is_empty());
    }

    #[test]
    fn erase_mode_drag() {
        let mut p = painter();
        p.paint_tile(0, 0, 1);
        p.paint_tile(1, 0, 1);
        p.set_mode(PaintMode::Erase);
        p.pointer_down(cell_center(0, 0));
        p.pointer_move(cell_center(1, 0));
        p.pointer_up(cell_center(1, 0));
        assert!(p.index().is_empty());
        assert!(matches!(p.highlight(), Highlight::Eraser(_)));
    }

    #[test]
    fn translate_mode_pans_with_damping() {
        let mut p = painter();
        p.set_mode(PaintMode::Translate);
        p.pointer_down(cell_center(0, 0));
        p.pointer_move(Point::new(26.0, 16.0));
        p.pointer_up(Point::new(26.0, 16.0));
        assert_eq!(p.viewport().pan_x, 6.0);
        assert!(p.index().is_empty());
        assert!(p.drain_events().contains(&EditorEvent::Session {
            pan_x: 6.0,
            pan_y: 0.0
        }));
        assert!(p.take_scene_dirty());
    }

    #[test]
    fn press_outside_grid_pans_even_in_paint_mode() {
        let mut p = painter();
        p.apply(EditorCommand::SelectTile { tile_id: 1 });
        // 地图 320 宽，x=500 在地图区域内但不在格子上
        p.pointer_down(Point::new(500.0, 100.0));
        p.pointer_move(Point::new(490.0, 100.0));
        p.pointer_move(cell_center(1, 1));
        p.pointer_up(cell_center(1, 1));
        assert!(p.index().is_empty());
        assert_ne!(p.viewport().pan_x, 0.0);
    }

    #[test]
    fn picker_click_selects_brush_and_drag_pans_picker() {
        let mut p = painter();
        // 选择器从 y=300 开始，sheet 为 4x2
        p.pointer_down(Point::new(40.0, 340.0));
        p.pointer_up(Point::new(40.0, 340.0));
        assert_eq!(p.picker().brush(), Some(6));

        p.pointer_down(Point::new(40.0, 340.0));
        p.pointer_move(Point::new(50.0, 340.0));
        p.pointer_up(Point::new(50.0, 340.0));
        assert_eq!(p.picker().start_x, 6.0);
        assert_eq!(p.viewport().pan_x, 0.0);
        assert_eq!(p.picker().brush(), Some(6));
    }

    #[test]
    fn locked_layer_refuses_edits() {
        let mut p = painter();
        p.paint_tile(0, 0, 1);
        assert!(p.apply(EditorCommand::ToggleLockLayer { id: 1 }));
        assert!(!p.paint_tile(1, 0, 1));
        assert!(!p.erase_tile(0, 0));
        assert_eq!(p.layers().get_cell(1, 0, 0), 1);
    }

    #[test]
    fn hover_redraw_only_on_cell_change() {
        let mut p = painter();
        p.take_redraw();
        p.pointer_move(Point::new(5.0, 5.0));
        assert!(p.take_redraw());
        p.pointer_move(Point::new(6.0, 7.0));
        assert!(!p.take_redraw());
        p.pointer_move(Point::new(40.0, 7.0));
        assert!(p.take_redraw());
        assert_eq!(
            p.highlight(),
            Highlight::Cell(CellRect::new(32.0, 0.0, 32.0, 32.0))
        );
    }

    #[test]
    fn layer_commands_emit_events() {
        let mut p = painter();
        assert!(p.apply(EditorCommand::NewLayer { name: String::new() }));
        assert!(p.apply(EditorCommand::RenameLayer {
            id: 2,
            name: "Top".into()
        }));
        assert!(p.apply(EditorCommand::MoveUpLayer { id: 2 }));
        assert!(!p.apply(EditorCommand::MoveUpLayer { id: 2 }));
        assert!(p.apply(EditorCommand::ToggleDisplayLayer { id: 2 }));
        assert!(!p.apply(EditorCommand::SelectLayer { id: 99 }));
        let names: Vec<&str> = p.drain_events().iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec![
                "NEWLAYER",
                "SELECTLAYER",
                "RENAMELAYER",
                "MOVEUPLAYER",
                "TOGGLEDISPLAYLAYER"
            ]
        );
        assert_eq!(p.layers().order(), vec![2, 1]);
    }

    #[test]
    fn delete_layer_releases_its_sprites() {
        let mut p = painter();
        p.apply(EditorCommand::NewLayer { name: String::new() });
        p.paint_tile(0, 0, 1);
        p.paint_tile(1, 0, 1);
        p.apply(EditorCommand::SelectLayer { id: 1 });
        p.paint_tile(0, 0, 2);
        p.drain_render_ops();

        assert!(p.apply(EditorCommand::DeleteLayer { id: 2 }));
        assert_eq!(p.index().len(), 1);
        assert_eq!(p.scene().len(), 1);
        let despawned = p
            .drain_render_ops()
            .into_iter()
            .filter(|op| matches!(op, RenderOp::Despawn(_)))
            .count();
        assert_eq!(despawned, 2);
        assert!(!p.apply(EditorCommand::DeleteLayer { id: 1 }));
    }

    #[test]
    fn hidden_layer_keeps_handles_but_invisible() {
        let mut p = painter();
        p.paint_tile(3, 3, 1);
        p.apply(EditorCommand::ToggleDisplayLayer { id: 1 });
        let (_, meta) = p.scene().sprites().next().unwrap();
        assert!(!meta.visible);
        p.paint_tile(4, 3, 1);
        assert!(p.scene().sprites().all(|(_, m)| !m.visible));
    }

    #[test]
    fn pending_sheet_means_no_brush() {
        let mut p = Painter::new(
            config(),
            TileSheetCache::default(),
            Box::new(MemorySessionStore::default()),
        );
        p.tile_sheet_pending("late");
        p.apply(EditorCommand::SelectImage {
            image_id: "late".into(),
        });
        assert!(!p.picker().has_sheet());
        assert!(!p.apply(EditorCommand::SelectTile { tile_id: 1 }));
        p.pointer_down(cell_center(0, 0));
        p.pointer_up(cell_center(0, 0));
        assert!(p.index().is_empty());

        p.tile_sheet_decoded("late", 64, 64);
        assert!(p.picker().has_sheet());
        assert!(p.tile_sheet().is_some());
    }

    #[test]
    fn tile_size_change_reslices_sheet() {
        let mut p = painter();
        assert_eq!(p.tile_sheet().unwrap().columns(), 4);
        assert!(p.set_tile_size(16, 16));
        let sheet = p.tile_sheet().unwrap();
        assert_eq!(sheet.tile_width, 16);
        assert_eq!(sheet.columns(), 8);
        assert_eq!(p.picker().columns(), 8);
        assert!(!p.set_tile_size(0, 16));
    }

    #[test]
    fn wheel_in_picker_zooms_picker_only() {
        let mut p = painter();
        p.wheel(Point::new(10.0, 400.0), -10.0);
        assert!((p.picker().scale - 1.1).abs() < 1e-9);
        assert_eq!(p.viewport().scale, 1.0);
        p.wheel(Point::new(10.0, 100.0), -10.0);
        assert!((p.viewport().scale - 1.1).abs() < 1e-9);
    }

    #[test]
    fn teardown_unregisters_listeners_and_releases_sprites() {
        let mut p = painter();
        p.subscribe(|_| {});
        p.subscribe(|_| {});
        p.paint_tile(0, 0, 1);
        p.paint_tile(1, 0, 1);
        let parts = p.teardown();
        assert_eq!(parts.listeners_removed, 2);
        let despawns = parts
            .released
            .iter()
            .filter(|op| matches!(op, RenderOp::Despawn(_)))
            .count();
        assert_eq!(despawns, 2);
    }

    #[test]
    fn load_layers_rebuilds_index_from_grids() {
        let mut p = painter();
        p.paint_tile(0, 0, 1);
        let mut replacement = LayerManager::new(5, 5);
        replacement.add_layer("imported");
        replacement.set_cell(1, 4, 4, 7);
        replacement.set_cell(1, 2, 1, 3);
        p.drain_events();
        assert!(p.load_layers(replacement));
        assert_eq!(p.index().len(), 2);
        assert!(p.index().contains(&CellKey::new(1, 4, 4)));
        assert_eq!(p.viewport().columns(), 5);
        let names: Vec<&str> = p.drain_events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["DELETELAYER", "NEWLAYER", "SELECTLAYER"]);
        assert!(!p.load_layers(LayerManager::new(5, 5)));
    }

    #[test]
    fn pointer_phase_follows_press_drag_release() {
        let mut p = painter();
        p.set_mode(PaintMode::Translate);
        assert_eq!(p.pointer_phase(), PointerPhase::Idle);
        p.pointer_down(cell_center(1, 1));
        assert_eq!(p.pointer_phase(), PointerPhase::Pressed);
        // 原地移动不算拖动
        p.pointer_move(cell_center(1, 1));
        assert_eq!(p.pointer_phase(), PointerPhase::Pressed);
        p.pointer_move(cell_center(2, 1));
        assert_eq!(p.pointer_phase(), PointerPhase::Dragging);
        p.pointer_up(cell_center(2, 1));
        assert_eq!(p.pointer_phase(), PointerPhase::Idle);
    }
}
