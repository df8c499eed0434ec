//! tile sheet 导入（文件对话框选择 → 复制到 assets → 登记 → 触发加载）。

use std::path::Path;

use bevy::prelude::*;

use tilemap_core::EditorCommand;

use super::super::host::EngineHost;
use super::super::paths::{asset_path, assets_dir};
use super::super::types::{EditorConfig, SheetEntry, SheetLibrary, SheetLoading};
use super::library::{request_sheet, save_library};

/// 按 `O` 导入 tile sheet（`Ctrl+O` 留给读取地图）。
pub fn open_sheet_shortcut(
    keys: Res<ButtonInput<KeyCode>>,
    asset_server: Res<AssetServer>,
    config: Res<EditorConfig>,
    mut lib: ResMut<SheetLibrary>,
    mut loading: ResMut<SheetLoading>,
    mut host: ResMut<EngineHost>,
) {
    let ctrl = keys.pressed(KeyCode::ControlLeft) || keys.pressed(KeyCode::ControlRight);
    if ctrl || !keys.just_pressed(KeyCode::KeyO) {
        return;
    }

    let Some(picked) = rfd::FileDialog::new()
        .add_filter("Image", &["png", "jpg", "jpeg", "bmp"])
        .pick_file()
    else {
        return;
    };

    let entry = match import_sheet_file(&picked, &config.tileset_import_dir) {
        Ok(entry) => entry,
        Err(err) => {
            warn!("failed to import tile sheet: {err}");
            return;
        }
    };
    info!("imported tile sheet: id={} path={}", entry.id, entry.asset_path);

    lib.upsert(entry.clone());
    lib.active_id = Some(entry.id.clone());
    save_library(&lib);

    request_sheet(&asset_server, &mut loading, &mut host, &entry);
    if let Some(painter) = host.painter_mut() {
        painter.apply(EditorCommand::SelectImage { image_id: entry.id });
    }
}

/// 把图片复制到 `assets/{import_dir}/` 并生成库条目。
///
/// 复制是因为 AssetServer 只读 `AssetPlugin.file_path` 指向的目录。
pub fn import_sheet_file(source: &Path, import_dir: &str) -> Result<SheetEntry, String> {
    let file_name = source
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .ok_or_else(|| format!("not a file: {}", source.display()))?;

    let dest_dir = assets_dir().join(import_dir);
    std::fs::create_dir_all(&dest_dir).map_err(|e| e.to_string())?;
    let dest = dest_dir.join(&file_name);
    if dest != source {
        std::fs::copy(source, &dest).map_err(|e| e.to_string())?;
    }

    entry_for_asset(&dest, asset_path(import_dir, &file_name))
}

/// 为 assets 内已有的图片生成库条目：id 取图片内容的 blake3。
pub fn entry_for_asset(abs: &Path, rel: String) -> Result<SheetEntry, String> {
    let bytes = std::fs::read(abs).map_err(|e| e.to_string())?;
    let id = blake3::hash(&bytes).to_hex().to_string();
    let name = abs
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| id.clone());
    Ok(SheetEntry {
        id,
        name,
        asset_path: rel,
    })
}
