//! workspace `assets/` 路径换算。

use std::path::PathBuf;

/// workspace 的 `assets/` 目录绝对路径。
///
/// `CARGO_MANIFEST_DIR` 指向 `crates/tilemap_editor`，向上两级是 workspace 根。
pub fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("assets")
}

/// 相对 assets 的路径 → 绝对路径。
pub fn in_assets(rel: &str) -> PathBuf {
    assets_dir().join(rel.trim_start_matches(['/', '\\']))
}

/// 拼接 Bevy 资产路径（统一用 `/`）。
pub fn asset_path(dir: &str, file: &str) -> String {
    let dir = dir.trim_matches(['/', '\\']);
    let file = file.trim_matches(['/', '\\']);
    match dir.is_empty() {
        true => file.to_string(),
        false => format!("{dir}/{file}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_path_uses_forward_slashes() {
        assert_eq!(asset_path("tilesets/", "a.png"), "tilesets/a.png");
        assert_eq!(asset_path("", "/a.png"), "a.png");
        assert!(in_assets("/maps/map.ron").ends_with("maps/map.ron"));
    }
}
