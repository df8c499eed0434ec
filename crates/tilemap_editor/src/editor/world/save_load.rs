use bevy::prelude::*;

use tilemap_core::EditorCommand;
use tilemap_format::MapExport;

use crate::editor::host::EngineHost;
use crate::editor::paths::in_assets;
use crate::editor::persistence::{load_map_from_file, save_map_to_file};
use crate::editor::tileset::request_sheet;
use crate::editor::types::{EditorConfig, SheetLibrary, SheetLoading};

/// 保存 / 读取快捷键：Ctrl+S / Ctrl+O（路径取自 `EditorConfig::export_path`）。
pub fn save_load_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<EditorConfig>,
    asset_server: Res<AssetServer>,
    mut lib: ResMut<SheetLibrary>,
    mut loading: ResMut<SheetLoading>,
    mut host: ResMut<EngineHost>,
) {
    let ctrl = keys.pressed(KeyCode::ControlLeft) || keys.pressed(KeyCode::ControlRight);
    if !ctrl {
        return;
    }
    let path = in_assets(&config.export_path);

    if keys.just_pressed(KeyCode::KeyS) {
        let Some(painter) = host.painter() else {
            return;
        };
        let map = MapExport::from_layers(
            &config.map_name,
            painter.image_id().unwrap_or_default(),
            painter.layers(),
        );
        match save_map_to_file(&map, &path) {
            Ok(()) => info!("saved map: {}", path.display()),
            Err(err) => warn!("save failed: {err}"),
        }
    }

    if keys.just_pressed(KeyCode::KeyO) {
        let map = match load_map_from_file(&path) {
            Ok(map) => map,
            Err(err) => {
                warn!("load failed: {err}");
                return;
            }
        };
        let image_id = map.tileset_image.clone();
        let layers = match map.into_layer_manager() {
            Ok(layers) => layers,
            Err(err) => {
                warn!("invalid map {}: {err}", path.display());
                return;
            }
        };

        if !image_id.is_empty() {
            match lib.get(&image_id).cloned() {
                Some(entry) => request_sheet(&asset_server, &mut loading, &mut host, &entry),
                None => warn!("map uses a tile sheet missing from the library: {image_id}"),
            }
            lib.active_id = Some(image_id.clone());
        }

        let Some(painter) = host.painter_mut() else {
            return;
        };
        if !painter.load_layers(layers) {
            return;
        }
        if !image_id.is_empty() {
            painter.apply(EditorCommand::SelectImage { image_id });
        }
        info!("loaded map: {}", path.display());
    }
}
