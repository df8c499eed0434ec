use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use tilemap_core::{CellRect, Highlight};

use crate::editor::host::EngineHost;
use crate::editor::types::HoverOverlay;
use crate::editor::util::surface_to_world;

/// 引擎请求重绘时重新计算 hover 反馈（每帧最多一次）。
pub fn refresh_hover_overlay(mut host: ResMut<EngineHost>, mut overlay: ResMut<HoverOverlay>) {
    let Some(painter) = host.painter_mut() else {
        return;
    };
    if !painter.take_redraw() {
        return;
    }

    (overlay.map_cell, overlay.eraser) = match painter.highlight() {
        Highlight::None => (None, false),
        Highlight::Cell(rect) => (Some(rect), false),
        Highlight::Eraser(rect) => (Some(rect), true),
    };
    overlay.picker_cell = Some(painter.picker_hover_rect()).filter(|r| !r.is_empty());
    overlay.brush = Some(painter.brush_rect()).filter(|r| !r.is_empty());
}

/// 画布辅助线：地图边界、区域分隔线、hover 格子（橡皮模式画叉）、选择器 hover 与当前笔刷。
pub fn draw_canvas(
    mut gizmos: Gizmos,
    windows: Query<&Window, With<PrimaryWindow>>,
    host: Res<EngineHost>,
    overlay: Res<HoverOverlay>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(painter) = host.painter() else {
        return;
    };

    let border_color = Color::srgba(1.0, 1.0, 1.0, 0.30);
    let hover_color = Color::srgba(1.0, 1.0, 1.0, 0.85);
    let eraser_color = Color::srgb(0.95, 0.3, 0.3);
    let picker_hover_color = Color::srgba(0.25, 0.45, 0.95, 0.9);
    let brush_color = Color::srgb(1.0, 0.85, 0.1);

    let viewport = painter.viewport();
    let region_h = viewport.region_height();
    let (cols, rows) = (viewport.columns(), viewport.rows());
    if cols > 0 && rows > 0 {
        let first = viewport.cell_rect(0, 0);
        let last = viewport.cell_rect(cols - 1, rows - 1);
        let bounds = CellRect::new(
            first.x,
            first.y,
            last.x + last.width - first.x,
            last.y + last.height - first.y,
        );
        outline(&mut gizmos, window, &clip_to_map(&bounds, region_h), border_color);
    }

    // 地图 / 选择器分隔线
    let surface_w = painter.config().surface_width;
    gizmos.line_2d(
        surface_to_world(window, 0.0, region_h),
        surface_to_world(window, surface_w, region_h),
        border_color,
    );

    if let Some(rect) = overlay.map_cell {
        if overlay.eraser {
            outline(&mut gizmos, window, &rect, eraser_color);
            gizmos.line_2d(
                surface_to_world(window, rect.x, rect.y),
                surface_to_world(window, rect.x + rect.width, rect.y + rect.height),
                eraser_color,
            );
            gizmos.line_2d(
                surface_to_world(window, rect.x + rect.width, rect.y),
                surface_to_world(window, rect.x, rect.y + rect.height),
                eraser_color,
            );
        } else {
            outline(&mut gizmos, window, &rect, hover_color);
        }
    }
    if let Some(rect) = overlay.picker_cell {
        outline(&mut gizmos, window, &rect, picker_hover_color);
    }
    if let Some(rect) = overlay.brush {
        outline(&mut gizmos, window, &rect, brush_color);
    }
}

/// 地图边框超出地图区域的部分截掉，避免画进选择器。
fn clip_to_map(rect: &CellRect, region_h: f64) -> CellRect {
    let bottom = (rect.y + rect.height).min(region_h);
    CellRect {
        height: (bottom - rect.y).max(0.0),
        ..*rect
    }
}

fn outline(gizmos: &mut Gizmos, window: &Window, rect: &CellRect, color: Color) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }
    let tl = surface_to_world(window, rect.x, rect.y);
    let tr = surface_to_world(window, rect.x + rect.width, rect.y);
    let br = surface_to_world(window, rect.x + rect.width, rect.y + rect.height);
    let bl = surface_to_world(window, rect.x, rect.y + rect.height);
    gizmos.line_2d(tl, tr, color);
    gizmos.line_2d(tr, br, color);
    gizmos.line_2d(br, bl, color);
    gizmos.line_2d(bl, tl, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_border_is_clipped_at_the_picker() {
        let clipped = clip_to_map(&CellRect::new(10.0, 20.0, 100.0, 300.0), 200.0);
        assert_eq!(clipped, CellRect::new(10.0, 20.0, 100.0, 180.0));

        let above = clip_to_map(&CellRect::new(0.0, 250.0, 50.0, 50.0), 200.0);
        assert_eq!(above.height, 0.0);
    }
}
