use bevy::prelude::*;

use tilemap_core::EditorEvent;

use crate::editor::host::EngineHost;
use crate::editor::layer_panel::LayerListView;

/// 引擎事件 → 图层列表。列表只根据事件更新自己。
pub fn consume_editor_events(mut host: ResMut<EngineHost>, mut view: ResMut<LayerListView>) {
    let Some(painter) = host.painter_mut() else {
        return;
    };
    for event in painter.drain_events() {
        match &event {
            EditorEvent::Session { .. } => {}
            other => debug!("editor event: {other:?}"),
        }
        view.apply(&event);
    }
    if view.take_changed() {
        debug!("{}", view.describe().trim_end());
    }
}
