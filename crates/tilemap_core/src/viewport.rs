//! 地图视口：平移 + 缩放，以及屏幕坐标 → 格子的换算。

use crate::config::{EngineConfig, ScaleBounds};
use crate::geometry::{locate_cell_index, CellRect, Point};

#[derive(Clone, Debug)]
pub struct Viewport {
    pub pan_x: f64,
    pub pan_y: f64,
    pub scale: f64,
    screen_width: f64,
    region_height: f64,
    columns: u32,
    rows: u32,
    tile_width: f64,
    tile_height: f64,
    wheel_bounds: ScaleBounds,
    button_bounds: ScaleBounds,
    damping: f64,
    wheel_factor: f64,
    step: f64,
}

impl Viewport {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            scale: 1.0,
            screen_width: config.surface_width,
            region_height: config.map_region_height(),
            columns: config.columns,
            rows: config.rows,
            tile_width: config.tile_width as f64,
            tile_height: config.tile_height as f64,
            wheel_bounds: config.map_wheel_scale,
            button_bounds: config.map_button_scale,
            damping: config.pan_damping,
            wheel_factor: config.wheel_zoom_factor,
            step: config.zoom_step,
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// 地图区域高度（选择器区域从这里开始）。
    pub fn region_height(&self) -> f64 {
        self.region_height
    }

    /// 未缩放的地图像素宽度。
    pub fn full_width(&self) -> f64 {
        self.columns as f64 * self.tile_width
    }

    pub fn full_height(&self) -> f64 {
        self.rows as f64 * self.tile_height
    }

    pub fn set_tile_size(&mut self, width: u32, height: u32) {
        self.tile_width = width as f64;
        self.tile_height = height as f64;
    }

    /// 恢复会话中的平移量。
    pub fn set_pan(&mut self, pan_x: f64, pan_y: f64) {
        self.pan_x = pan_x;
        self.pan_y = pan_y;
    }

    pub fn cell_rect(&self, col: u32, row: u32) -> CellRect {
        let w = self.tile_width * self.scale;
        let h = self.tile_height * self.scale;
        CellRect::new(
            self.pan_x + col as f64 * w,
            self.pan_y + row as f64 * h,
            w,
            h,
        )
    }

    /// `grid[row][col]` 为该格子在屏幕上的矩形。
    pub fn build_cell_grid(&self) -> Vec<Vec<CellRect>> {
        (0..self.rows)
            .map(|row| (0..self.columns).map(|col| self.cell_rect(col, row)).collect())
            .collect()
    }

    /// 点是否落在地图区域（而不是下方的选择器区域）。
    pub fn in_region(&self, point: Point) -> bool {
        point.x >= 0.0 && point.x <= self.screen_width && point.y >= 0.0 && point.y < self.region_height
    }

    /// 屏幕点 → `(col, row)`；区域外或未命中任何格子时返回 `None`。
    pub fn cell_at(&self, point: Point) -> Option<(u32, u32)> {
        if !self.in_region(point) {
            return None;
        }
        locate_cell_index(point, &self.build_cell_grid()).map(|(row, col)| (col as u32, row as u32))
    }

    fn clamp_pan(&mut self) {
        let half_w = self.full_width() * 0.5;
        let half_h = self.full_height() * 0.5;
        self.pan_x = self.pan_x.clamp(-half_w, half_w);
        self.pan_y = self.pan_y.clamp(-half_h, half_h);
    }

    fn recenter(&mut self, scale_delta: f64) {
        self.pan_x += -self.full_width() * scale_delta * 0.5;
        self.pan_y += -self.full_height() * scale_delta * 0.5;
        self.clamp_pan();
    }

    /// 滚轮缩放。超出范围时整体放弃（不做部分缩放），返回是否生效。
    pub fn zoom(&mut self, delta_y: f64) -> bool {
        let scale_delta = -delta_y * self.wheel_factor;
        let next = self.scale + scale_delta;
        if scale_delta == 0.0 || !self.wheel_bounds.contains(next) {
            return false;
        }
        self.scale = next;
        self.recenter(scale_delta);
        true
    }

    /// 按钮放大一档。
    pub fn zoom_in(&mut self) -> bool {
        self.step_zoom(self.step)
    }

    /// 按钮缩小一档。
    pub fn zoom_out(&mut self) -> bool {
        self.step_zoom(-self.step)
    }

    fn step_zoom(&mut self, scale_delta: f64) -> bool {
        // 档位按两位小数对齐，避免 0.1 累加误差把 2.0 判成越界
        let next = ((self.scale + scale_delta) * 100.0).round() / 100.0;
        if !self.button_bounds.contains(next) {
            return false;
        }
        self.scale = next;
        self.recenter(scale_delta);
        true
    }

    /// 拖拽平移。原始位移先乘阻尼系数，返回新的平移量。
    pub fn pan(&mut self, dx: f64, dy: f64) -> (f64, f64) {
        self.pan_x += dx * self.damping;
        self.pan_y += dy * self.damping;
        (self.pan_x, self.pan_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rects_equal;

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

    #[test]
    fn cell_grid_follows_pan_and_scale() {
        let mut vp = Viewport::new(&config());
        vp.pan_x = 5.0;
        vp.pan_y = -3.0;
        vp.scale = 0.5;
        let grid = vp.build_cell_grid();
        assert_eq!(grid.len(), 8);
        assert_eq!(grid[0].len(), 10);
        assert!(rects_equal(&grid[3][2], &CellRect::new(5.0 + 2.0 * 16.0, -3.0 + 3.0 * 16.0, 16.0, 16.0)));
    }

    #[test]
    fn cell_at_respects_region() {
        let vp = Viewport::new(&config());
        assert_eq!(vp.cell_at(Point::new(70.0, 100.0)), Some((2, 3)));
        // 选择器区域（y >= 300）不属于地图
        assert_eq!(vp.cell_at(Point::new(10.0, 310.0)), None);
        // 地图之外
        assert_eq!(vp.cell_at(Point::new(400.0, 10.0)), None);
    }

    #[test]
    fn pan_is_damped() {
        let mut vp = Viewport::new(&config());
        let (x, y) = vp.pan(10.0, 0.0);
        assert_eq!(x, 6.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn wheel_zoom_recenters_and_clamps() {
        let mut vp = Viewport::new(&config());
        assert!(vp.zoom(-10.0));
        assert!((vp.scale - 1.1).abs() < 1e-9);
        // 320 * 0.1 * 0.5 = 16
        assert!((vp.pan_x + 16.0).abs() < 1e-9);
        assert!((vp.pan_y + 12.8).abs() < 1e-9);
    }

    #[test]
    fn wheel_zoom_out_of_range_is_noop() {
        let mut vp = Viewport::new(&config());
        vp.pan_x = 7.0;
        assert!(!vp.zoom(500.0));
        assert_eq!(vp.scale, 1.0);
        assert_eq!(vp.pan_x, 7.0);
    }

    #[test]
    fn wheel_zoom_never_leaves_bounds() {
        let mut vp = Viewport::new(&config());
        let deltas = [-37.0, -90.0, 12.0, 150.0, -3.5, 66.0, 80.0, -200.0, 45.0];
        for _ in 0..20 {
            for d in deltas {
                vp.zoom(d);
                assert!(vp.scale >= 0.2 && vp.scale <= 2.0, "scale {}", vp.scale);
                assert!(vp.pan_x.abs() <= vp.full_width() * 0.5);
                assert!(vp.pan_y.abs() <= vp.full_height() * 0.5);
            }
        }
    }

    #[test]
    fn button_zoom_uses_tighter_bounds() {
        let mut vp = Viewport::new(&config());
        for _ in 0..7 {
            assert!(vp.zoom_out());
        }
        assert!((vp.scale - 0.3).abs() < 1e-9);
        assert!(!vp.zoom_out());

        let mut vp = Viewport::new(&config());
        for _ in 0..10 {
            assert!(vp.zoom_in());
        }
        assert_eq!(vp.scale, 2.0);
        assert!(!vp.zoom_in());
    }
}
