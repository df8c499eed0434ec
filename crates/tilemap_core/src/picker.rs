//! Tile 选择器：表面下方的 tile sheet 网格，独立于地图视口的平移 / 缩放。
//!
//! 地图与选择器共用一个输入表面（上下堆叠），所以命中测试前要先减去地图区域高度。

use crate::config::{EngineConfig, ScaleBounds};
use crate::geometry::{locate_cell, locate_cell_index, rects_equal, CellRect, Point};
use crate::TileId;

#[derive(Clone, Debug)]
pub struct TilePicker {
    pub start_x: f64,
    pub start_y: f64,
    pub scale: f64,
    origin_y: f64,
    width: f64,
    height: f64,
    tile_width: f64,
    tile_height: f64,
    columns: u32,
    rows: u32,
    bounds: ScaleBounds,
    damping: f64,
    wheel_factor: f64,
    hovered: CellRect,
    chosen: Option<(u32, u32)>,
}

impl TilePicker {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            start_x: 0.0,
            start_y: 0.0,
            scale: 1.0,
            origin_y: config.map_region_height(),
            width: config.surface_width,
            height: config.picker_region_height(),
            tile_width: config.tile_width as f64,
            tile_height: config.tile_height as f64,
            columns: 0,
            rows: 0,
            bounds: config.picker_scale,
            damping: config.pan_damping,
            wheel_factor: config.wheel_zoom_factor,
            hovered: CellRect::EMPTY,
            chosen: None,
        }
    }

    /// 选择器区域在表面上的起始 y。
    pub fn origin_y(&self) -> f64 {
        self.origin_y
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn has_sheet(&self) -> bool {
        self.columns > 0 && self.rows > 0
    }

    /// 挂上已切片的 sheet。尺寸变化时清空当前笔刷。
    pub fn set_sheet(&mut self, columns: u32, rows: u32) {
        if columns != self.columns || rows != self.rows {
            self.chosen = None;
        }
        self.columns = columns;
        self.rows = rows;
        self.hovered = CellRect::EMPTY;
    }

    /// 图片仍在加载（或切换了图片）：选择器视为空。
    pub fn clear_sheet(&mut self) {
        self.columns = 0;
        self.rows = 0;
        self.hovered = CellRect::EMPTY;
        self.chosen = None;
    }

    pub fn set_tile_size(&mut self, width: u32, height: u32) {
        self.tile_width = width as f64;
        self.tile_height = height as f64;
    }

    pub fn in_region(&self, point: Point) -> bool {
        point.x >= 0.0
            && point.x <= self.width
            && point.y >= self.origin_y
            && point.y <= self.origin_y + self.height
    }

    /// 表面坐标 → 选择器局部坐标。
    pub fn to_local(&self, point: Point) -> Point {
        Point::new(point.x, point.y - self.origin_y)
    }

    /// 局部坐标下的格子矩形。
    pub fn cell_rect(&self, col: u32, row: u32) -> CellRect {
        let w = self.tile_width * self.scale;
        let h = self.tile_height * self.scale;
        CellRect::new(
            self.start_x + col as f64 * w,
            self.start_y + row as f64 * h,
            w,
            h,
        )
    }

    pub fn build_cell_grid(&self) -> Vec<Vec<CellRect>> {
        (0..self.rows)
            .map(|row| (0..self.columns).map(|col| self.cell_rect(col, row)).collect())
            .collect()
    }

    pub fn cell_at(&self, point: Point) -> Option<(u32, u32)> {
        if !self.in_region(point) {
            return None;
        }
        locate_cell_index(self.to_local(point), &self.build_cell_grid())
            .map(|(row, col)| (col as u32, row as u32))
    }

    /// 更新 hover 矩形，返回是否发生了变化。
    pub fn hover(&mut self, point: Point) -> bool {
        let next = if self.in_region(point) {
            locate_cell(self.to_local(point), &self.build_cell_grid())
        } else {
            CellRect::EMPTY
        };
        if rects_equal(&next, &self.hovered) {
            return false;
        }
        self.hovered = next;
        true
    }

    pub fn hovered(&self) -> CellRect {
        self.hovered
    }

    /// 点击选择笔刷。
    pub fn select_at(&mut self, point: Point) -> Option<TileId> {
        let (col, row) = self.cell_at(point)?;
        self.chosen = Some((col, row));
        self.brush()
    }

    pub fn select_tile(&mut self, tile_id: TileId) -> bool {
        if tile_id == 0 || !self.has_sheet() || tile_id > self.columns * self.rows {
            return false;
        }
        let index = tile_id - 1;
        self.chosen = Some((index % self.columns, index / self.columns));
        true
    }

    /// 当前笔刷的 tile id。
    pub fn brush(&self) -> Option<TileId> {
        let (col, row) = self.chosen?;
        Some(row * self.columns + col + 1)
    }

    /// 当前笔刷在选择器局部坐标下的矩形（随缩放 / 平移实时计算）。
    pub fn chosen_rect(&self) -> CellRect {
        match self.chosen {
            Some((col, row)) => self.cell_rect(col, row),
            None => CellRect::EMPTY,
        }
    }

    fn full_width(&self) -> f64 {
        self.columns as f64 * self.tile_width
    }

    fn full_height(&self) -> f64 {
        self.rows as f64 * self.tile_height
    }

    /// 滚轮缩放，范围外整体放弃。
    pub fn zoom(&mut self, delta_y: f64) -> bool {
        let scale_delta = -delta_y * self.wheel_factor;
        let next = self.scale + scale_delta;
        if scale_delta == 0.0 || !self.bounds.contains(next) {
            return false;
        }
        self.scale = next;
        let half_w = self.full_width() * 0.5;
        let half_h = self.full_height() * 0.5;
        self.start_x = (self.start_x - self.full_width() * scale_delta * 0.5).clamp(-half_w, half_w);
        self.start_y = (self.start_y - self.full_height() * scale_delta * 0.5).clamp(-half_h, half_h);
        true
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> (f64, f64) {
        self.start_x += dx * self.damping;
        self.start_y += dy * self.damping;
        (self.start_x, self.start_y)
    }
}
