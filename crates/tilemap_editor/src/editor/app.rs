//! 编辑器应用装配（Bevy App 构建与系统注册）。

use bevy::prelude::*;

use super::{
    host::EngineHost,
    layer_panel::LayerListView,
    paths::assets_dir,
    persistence::load_editor_config,
    tileset,
    types::{
        HoverOverlay, SheetLibrary, SheetLoading, SheetTextures, SpriteEntities, EDITOR_CONFIG_PATH,
    },
    ui, world, UI_BG,
};

/// 运行编辑器。
pub fn run() {
    let assets_dir = assets_dir();
    let config = load_editor_config(&assets_dir.join(EDITOR_CONFIG_PATH));

    App::new()
        // 用 ClearColor 控制背景色
        .insert_resource(ClearColor(UI_BG))
        .add_plugins(
            DefaultPlugins
                .set(AssetPlugin {
                    // 用绝对路径避免 cwd 差异导致找不到资源
                    file_path: assets_dir.to_string_lossy().to_string(),
                    ..default()
                })
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Tilemap Painter".to_string(),
                        ..default()
                    }),
                    ..default()
                }),
        )
        // --- Resources ---
        .insert_resource(config)
        .init_resource::<EngineHost>()
        .init_resource::<LayerListView>()
        .init_resource::<SheetLibrary>()
        .init_resource::<SheetTextures>()
        .init_resource::<SheetLoading>()
        .init_resource::<SpriteEntities>()
        .init_resource::<HoverOverlay>()
        .add_systems(
            Startup,
            (
                // 先挂载引擎，图片库才能把选中的图片交给它
                world::mount_engine,
                world::setup_world,
                tileset::load_sheet_library_startup,
                ui::setup_hud,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                // --- Engine lifecycle + tile sheets ---
                (
                    world::recreate_on_resize,
                    tileset::progress_sheet_loading,
                    tileset::open_sheet_shortcut,
                    world::save_load_shortcuts,
                )
                    .chain(),
                // --- Input ---
                (
                    world::mode_shortcuts,
                    world::view_shortcuts,
                    world::layer_shortcuts,
                    world::pointer_input,
                )
                    .chain(),
                // --- Engine → UI / render ---
                (
                    world::consume_editor_events,
                    world::sync_map_sprites,
                    world::rebuild_picker_sprites,
                    world::refresh_hover_overlay,
                    world::draw_canvas,
                    ui::update_hud_text,
                )
                    .chain(),
            )
                .chain(),
        )
        .run();
}
