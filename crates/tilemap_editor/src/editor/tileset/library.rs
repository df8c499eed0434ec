//! tile sheet 库（SheetLibrary）的读写与预加载。

use bevy::prelude::*;

use tilemap_core::EditorCommand;

use super::super::host::EngineHost;
use super::super::paths::in_assets;
use super::super::persistence::{load_sheet_library, save_sheet_library};
use super::super::types::{
    EditorConfig, PendingSheet, SheetEntry, SheetLibrary, SheetLoading, DEFAULT_LIBRARY_PATH,
};
use super::open::entry_for_asset;

/// 启动时读取库缓存，预加载所有 tile sheet，并选中上次使用的图片。
pub fn load_sheet_library_startup(
    asset_server: Res<AssetServer>,
    config: Res<EditorConfig>,
    mut lib: ResMut<SheetLibrary>,
    mut loading: ResMut<SheetLoading>,
    mut host: ResMut<EngineHost>,
) {
    match load_sheet_library(&in_assets(DEFAULT_LIBRARY_PATH)) {
        Ok(loaded) => *lib = loaded,
        Err(err) => warn!("failed to load tile sheet library: {err}"),
    }

    // 库为空：登记默认图片（若存在）
    if lib.entries.is_empty() {
        if let Some(rel) = config.default_tileset.as_deref() {
            let abs = in_assets(rel);
            if abs.exists() {
                match entry_for_asset(&abs, rel.to_string()) {
                    Ok(entry) => {
                        info!("registered default tile sheet {}", entry.asset_path);
                        lib.upsert(entry);
                        save_library(&lib);
                    }
                    Err(err) => warn!("failed to read default tile sheet: {err}"),
                }
            }
        }
    }

    let entries = lib.entries.clone();
    for entry in &entries {
        request_sheet(&asset_server, &mut loading, &mut host, entry);
    }

    if lib.active_id.is_none() {
        lib.active_id = lib.entries.first().map(|e| e.id.clone());
    }
    if let (Some(id), Some(painter)) = (lib.active_id.clone(), host.painter_mut()) {
        painter.apply(EditorCommand::SelectImage { image_id: id });
    }
}

/// 把库写回缓存文件。
pub fn save_library(lib: &SheetLibrary) {
    if let Err(err) = save_sheet_library(lib, &in_assets(DEFAULT_LIBRARY_PATH)) {
        warn!("failed to save tile sheet library: {err}");
    }
}

/// 发起图片加载，并告诉引擎该图片处于 pending。
pub fn request_sheet(
    asset_server: &AssetServer,
    loading: &mut SheetLoading,
    host: &mut EngineHost,
    entry: &SheetEntry,
) {
    if entry.asset_path.is_empty() || loading.pending.iter().any(|p| p.id == entry.id) {
        return;
    }
    let texture: Handle<Image> = asset_server.load(entry.asset_path.clone());
    loading.pending.push(PendingSheet {
        id: entry.id.clone(),
        texture,
    });
    if let Some(painter) = host.painter_mut() {
        painter.tile_sheet_pending(&entry.id);
    }
}
