//! 文件读写：编辑器配置、tile sheet 库、地图导出（RON）。

use std::path::Path;

use bevy::prelude::*;
use tilemap_format::{decode_map_ron, encode_map_ron, MapExport};

use super::types::{EditorConfig, SheetLibrary};

fn write_text(path: &Path, text: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    std::fs::write(path, text).map_err(|e| e.to_string())
}

/// 读取编辑器配置。文件不存在用默认值；解析失败记日志后也用默认值。
pub fn load_editor_config(path: &Path) -> EditorConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return EditorConfig::default(),
    };
    match ron::from_str::<EditorConfig>(&text) {
        Ok(config) => config,
        Err(err) => {
            warn!("invalid editor config {}: {err}", path.display());
            EditorConfig::default()
        }
    }
}

pub fn save_sheet_library(lib: &SheetLibrary, path: &Path) -> Result<(), String> {
    let text = ron::ser::to_string_pretty(lib, ron::ser::PrettyConfig::default())
        .map_err(|e| e.to_string())?;
    write_text(path, &text)
}

pub fn load_sheet_library(path: &Path) -> Result<SheetLibrary, String> {
    if !path.exists() {
        return Ok(SheetLibrary::default());
    }
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    ron::from_str::<SheetLibrary>(&text).map_err(|e| e.to_string())
}

pub fn save_map_to_file(map: &MapExport, path: &Path) -> Result<(), String> {
    let text = encode_map_ron(map).map_err(|e| e.to_string())?;
    write_text(path, &text)
}

pub fn load_map_from_file(path: &Path) -> Result<MapExport, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    decode_map_ron(&text).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::types::SheetEntry;
    use tilemap_core::LayerManager;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("tilemap_editor_test_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn missing_config_uses_defaults() {
        let config = load_editor_config(&scratch("missing/editor.ron"));
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn malformed_config_uses_defaults() {
        let path = scratch("bad/editor.ron");
        write_text(&path, "(engine: [oops").unwrap();
        assert_eq!(load_editor_config(&path), EditorConfig::default());
    }

    #[test]
    fn bundled_config_matches_defaults() {
        let path = crate::editor::paths::in_assets(crate::editor::types::EDITOR_CONFIG_PATH);
        assert!(path.exists());
        assert_eq!(load_editor_config(&path), EditorConfig::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let path = scratch("partial/editor.ron");
        write_text(&path, "(map_name: \"forest\", engine: (columns: 12))").unwrap();
        let config = load_editor_config(&path);
        assert_eq!(config.map_name, "forest");
        assert_eq!(config.engine.columns, 12);
        assert_eq!(config.engine.rows, 25);
        assert_eq!(config.export_path, "maps/map.ron");
    }

    #[test]
    fn map_file_round_trip() {
        let mut manager = LayerManager::new(4, 4);
        manager.add_layer("");
        manager.set_cell(1, 3, 3, 2);
        let path = scratch("maps/map.ron");
        save_map_to_file(&MapExport::from_layers("m", "id", &manager), &path).unwrap();
        let loaded = load_map_from_file(&path).unwrap();
        assert_eq!(loaded.tileset_image, "id");
        assert_eq!(loaded.layers[0].grid[15], 2);
        assert!(load_map_from_file(&scratch("maps/none.ron")).is_err());
    }

    #[test]
    fn library_round_trip() {
        let path = scratch("tilesets/library.ron");
        assert!(load_sheet_library(&path).unwrap().entries.is_empty());
        let mut lib = SheetLibrary::default();
        lib.upsert(SheetEntry {
            id: "abc".into(),
            name: "grass".into(),
            asset_path: "tilesets/grass.png".into(),
        });
        lib.active_id = Some("abc".into());
        save_sheet_library(&lib, &path).unwrap();
        let loaded = load_sheet_library(&path).unwrap();
        assert_eq!(loaded.get("abc").unwrap().name, "grass");
        assert_eq!(loaded.active_id.as_deref(), Some("abc"));
    }
}
