use bevy::ecs::message::MessageReader;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use tilemap_core::Point;

use crate::editor::host::EngineHost;
use crate::editor::types::EditorConfig;

/// 鼠标左键 / 光标 / 滚轮 → 引擎指针输入。
///
/// 光标坐标（原点左上）就是引擎的表面坐标，不经过相机换算。
/// 光标离开窗口时，松开按键按最后一次已知位置处理。
pub fn pointer_input(
    buttons: Res<ButtonInput<MouseButton>>,
    mut wheel: MessageReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<EditorConfig>,
    mut host: ResMut<EngineHost>,
    mut last_cursor: Local<Option<Vec2>>,
) {
    let wheel_events: Vec<MouseWheel> = wheel.read().cloned().collect();

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(painter) = host.painter_mut() else {
        return;
    };
    let Some(cursor) = window.cursor_position().or(*last_cursor) else {
        return;
    };
    let point = Point::new(cursor.x as f64, cursor.y as f64);

    if buttons.just_pressed(MouseButton::Left) {
        painter.pointer_down(point);
    }
    if *last_cursor != Some(cursor) {
        painter.pointer_move(point);
    }
    if buttons.just_released(MouseButton::Left) {
        painter.pointer_up(point);
    }

    for ev in wheel_events {
        // 向上滚（y > 0）对应负的 delta_y，即放大
        let delta_y = match ev.unit {
            MouseScrollUnit::Line => -(ev.y as f64) * config.wheel_line_pixels,
            MouseScrollUnit::Pixel => -(ev.y as f64),
        };
        if delta_y != 0.0 {
            painter.wheel(point, delta_y);
        }
    }

    *last_cursor = Some(cursor);
}
