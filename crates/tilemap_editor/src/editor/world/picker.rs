use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use tilemap_core::CellRect;

use crate::editor::host::EngineHost;
use crate::editor::types::{PickerBackdrop, PickerTile, SheetTextures};
use crate::editor::util::{despawn_silently, rect_to_world};
use crate::editor::{PICKER_BACKDROP_Z, PICKER_TILE_Z, UI_PANEL};

/// 重建选择器区域：背景 + 当前 tile sheet 的每个 tile。
///
/// 只在引擎标记选择器脏（平移、缩放、换图、换 tile 尺寸）或纹理刚加载完时执行。
pub fn rebuild_picker_sprites(
    mut commands: Commands,
    mut host: ResMut<EngineHost>,
    textures: Res<SheetTextures>,
    windows: Query<&Window, With<PrimaryWindow>>,
    tiles_q: Query<Entity, With<PickerTile>>,
    backdrop_q: Query<Entity, With<PickerBackdrop>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(painter) = host.painter_mut() else {
        return;
    };
    if !painter.take_picker_dirty() && !textures.is_changed() {
        return;
    }

    for e in tiles_q.iter().chain(backdrop_q.iter()) {
        despawn_silently(&mut commands, e);
    }

    let config = painter.config();
    let region = CellRect::new(
        0.0,
        config.map_region_height(),
        config.surface_width,
        config.picker_region_height(),
    );
    let (center, size) = rect_to_world(window, &region);
    commands.spawn((
        PickerBackdrop,
        Sprite {
            color: UI_PANEL,
            custom_size: Some(size),
            ..default()
        },
        Transform::from_translation(center.extend(PICKER_BACKDROP_Z)),
    ));

    let (Some(sheet), Some(texture)) = (
        painter.tile_sheet(),
        painter.image_id().and_then(|id| textures.by_id.get(id)),
    ) else {
        return;
    };

    let mut spawned = 0usize;
    for row in &sheet.grid {
        for handle in row {
            let rect = painter.picker_cell_rect(handle.col, handle.row);
            // 中心点不在选择器区域里的 tile 不画
            if !painter.picker().in_region(rect.center()) {
                continue;
            }
            let (center, size) = rect_to_world(window, &rect);
            let src = handle.source;
            commands.spawn((
                PickerTile,
                Sprite {
                    image: texture.clone(),
                    rect: Some(Rect::new(
                        src.x as f32,
                        src.y as f32,
                        (src.x + src.width) as f32,
                        (src.y + src.height) as f32,
                    )),
                    custom_size: Some(size),
                    ..default()
                },
                Transform::from_translation(center.extend(PICKER_TILE_Z)),
            ));
            spawned += 1;
        }
    }
    debug!("picker rebuilt with {spawned} tiles");
}
