use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::editor::host::EngineHost;
use crate::editor::layer_panel::LayerListView;
use crate::editor::types::{EditorConfig, SpriteEntities};
use crate::editor::util::despawn_silently;

/// 以窗口实际尺寸挂载引擎。
pub fn mount_engine(
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<EditorConfig>,
    mut host: ResMut<EngineHost>,
) {
    let (width, height) = match windows.single() {
        Ok(window) => (window.width() as f64, window.height() as f64),
        Err(_) => (
            config.engine.surface_width,
            config.engine.surface_height,
        ),
    };
    host.mount(config.engine.with_surface(width, height));
    info!(
        "engine mounted at {width}x{height}: {}x{} cells of {}x{}",
        config.engine.columns, config.engine.rows, config.engine.tile_width, config.engine.tile_height
    );
}

/// 窗口尺寸变化：销毁并重建引擎。
///
/// 同一帧内的多次 resize 只处理最后一次；尺寸没变（例如窗口创建时的首个事件）直接忽略。
pub fn recreate_on_resize(
    mut commands: Commands,
    mut resized: MessageReader<WindowResized>,
    mut host: ResMut<EngineHost>,
    mut sprites: ResMut<SpriteEntities>,
    mut view: ResMut<LayerListView>,
) {
    let Some(last) = resized.read().last().cloned() else {
        return;
    };
    let (width, height) = (last.width as f64, last.height as f64);
    let unchanged = host.painter().is_none_or(|p| {
        p.config().surface_width == width && p.config().surface_height == height
    });
    if unchanged {
        return;
    }

    let released = host.recreate(width, height);
    debug!("released {} render ops from the old engine", released.len());

    // 新引擎的渲染句柄从头编号：旧实体必须全部清掉
    for (_, entity) in sprites.by_handle.drain() {
        despawn_silently(&mut commands, entity);
    }
    view.reset();
}
