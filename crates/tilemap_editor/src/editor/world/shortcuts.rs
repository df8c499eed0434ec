use bevy::prelude::*;

use tilemap_core::{EditorCommand, PaintMode};

use crate::editor::host::EngineHost;
use crate::editor::layer_panel::LayerListView;

const MIN_TILE_PX: u32 = 8;
const MAX_TILE_PX: u32 = 128;

/// 模式快捷键：1/2/3 切换（绘制 / 擦除 / 平移）。
pub fn mode_shortcuts(keys: Res<ButtonInput<KeyCode>>, mut host: ResMut<EngineHost>) {
    let Some(painter) = host.painter_mut() else {
        return;
    };
    let mode = if keys.just_pressed(KeyCode::Digit1) {
        PaintMode::Paint
    } else if keys.just_pressed(KeyCode::Digit2) {
        PaintMode::Erase
    } else if keys.just_pressed(KeyCode::Digit3) {
        PaintMode::Translate
    } else {
        return;
    };
    painter.set_mode(mode);
}

/// 视图快捷键：`=` / `-` 按档缩放，`[` / `]` 把 tile 尺寸减半 / 加倍。
pub fn view_shortcuts(keys: Res<ButtonInput<KeyCode>>, mut host: ResMut<EngineHost>) {
    let Some(painter) = host.painter_mut() else {
        return;
    };

    if keys.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        painter.zoom_in();
    }
    if keys.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        painter.zoom_out();
    }

    let (w, h) = (painter.config().tile_width, painter.config().tile_height);
    let next = if keys.just_pressed(KeyCode::BracketLeft) {
        Some((w / 2, h / 2))
    } else if keys.just_pressed(KeyCode::BracketRight) {
        Some((w.saturating_mul(2), h.saturating_mul(2)))
    } else {
        None
    };
    if let Some((nw, nh)) = next {
        let in_range = |v: u32| (MIN_TILE_PX..=MAX_TILE_PX).contains(&v);
        if in_range(nw) && in_range(nh) && painter.set_tile_size(nw, nh) {
            info!("tile size: {nw}x{nh}");
        }
    }
}

/// 图层快捷键。作用对象是图层列表里的选中项（由事件重建，而不是直接读引擎）。
///
/// - N：新建
/// - Delete：删除
/// - PageUp / PageDown：上移 / 下移
/// - H：显示 / 隐藏
/// - L：锁定 / 解锁
/// - Tab：选中下一个
pub fn layer_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    view: Res<LayerListView>,
    mut host: ResMut<EngineHost>,
) {
    let ctrl = keys.pressed(KeyCode::ControlLeft) || keys.pressed(KeyCode::ControlRight);
    if ctrl {
        return;
    }
    let Some(painter) = host.painter_mut() else {
        return;
    };

    if keys.just_pressed(KeyCode::KeyN) {
        painter.apply(EditorCommand::NewLayer {
            name: String::new(),
        });
    }

    let Some(id) = view.selected() else {
        return;
    };
    let command = if keys.just_pressed(KeyCode::Delete) {
        EditorCommand::DeleteLayer { id }
    } else if keys.just_pressed(KeyCode::PageUp) {
        EditorCommand::MoveUpLayer { id }
    } else if keys.just_pressed(KeyCode::PageDown) {
        EditorCommand::MoveDownLayer { id }
    } else if keys.just_pressed(KeyCode::KeyH) {
        EditorCommand::ToggleDisplayLayer { id }
    } else if keys.just_pressed(KeyCode::KeyL) {
        EditorCommand::ToggleLockLayer { id }
    } else if keys.just_pressed(KeyCode::Tab) {
        let Some(next) = view.next_after_selected() else {
            return;
        };
        EditorCommand::SelectLayer { id: next }
    } else {
        return;
    };

    if !painter.apply(command.clone()) {
        debug!("layer command refused: {command:?}");
    }
}
