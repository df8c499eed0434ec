//! 引擎配置。
//!
//! 所有“手感”相关的常量（平移阻尼、缩放步长、缩放范围）集中在这里，宿主可通过 RON 覆盖。

use serde::{Deserialize, Serialize};

/// 缩放范围（闭区间）。
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
}

impl ScaleBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, scale: f64) -> bool {
        scale >= self.min && scale <= self.max
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// 地图列数 / 行数。
    pub columns: u32,
    pub rows: u32,
    /// 单个 tile 的像素尺寸（未缩放）。
    pub tile_width: u32,
    pub tile_height: u32,
    /// 绘制表面尺寸（地图区域在上，选择器区域在下）。
    pub surface_width: f64,
    pub surface_height: f64,
    /// 地图区域占表面高度的比例。
    pub map_height_ratio: f64,
    pub pan_damping: f64,
    pub wheel_zoom_factor: f64,
    pub zoom_step: f64,
    /// 滚轮缩放范围。
    pub map_wheel_scale: ScaleBounds,
    /// 缩放按钮（zoom in/out）范围，下限比滚轮略高。
    pub map_button_scale: ScaleBounds,
    pub picker_scale: ScaleBounds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            columns: 40,
            rows: 25,
            tile_width: 32,
            tile_height: 32,
            surface_width: 1280.0,
            surface_height: 720.0,
            map_height_ratio: 0.7,
            pan_damping: 0.6,
            wheel_zoom_factor: 0.01,
            zoom_step: 0.1,
            map_wheel_scale: ScaleBounds::new(0.2, 2.0),
            map_button_scale: ScaleBounds::new(0.3, 2.0),
            picker_scale: ScaleBounds::new(0.5, 1.5),
        }
    }
}

impl EngineConfig {
    /// 地图区域高度（像素）。
    pub fn map_region_height(&self) -> f64 {
        self.surface_height * self.map_height_ratio.clamp(0.0, 1.0)
    }

    /// 选择器区域高度（像素）。
    pub fn picker_region_height(&self) -> f64 {
        (self.surface_height - self.map_region_height()).max(0.0)
    }

    /// 同一份配置，换一个表面尺寸（resize 重建时使用）。
    pub fn with_surface(&self, width: f64, height: f64) -> Self {
        Self {
            surface_width: width,
            surface_height: height,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_split_the_surface() {
        let config = EngineConfig {
            surface_height: 1000.0,
            map_height_ratio: 0.75,
            ..Default::default()
        };
        assert_eq!(config.map_region_height(), 750.0);
        assert_eq!(config.picker_region_height(), 250.0);
    }

    #[test]
    fn partial_ron_falls_back_to_defaults() {
        let config: EngineConfig = ron::from_str("(columns: 10, rows: 8)").unwrap();
        assert_eq!(config.columns, 10);
        assert_eq!(config.rows, 8);
        assert_eq!(config.pan_damping, 0.6);
        assert_eq!(config.picker_scale, ScaleBounds::new(0.5, 1.5));
    }
}
