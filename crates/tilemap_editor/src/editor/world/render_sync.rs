use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use tilemap_core::{Painter, SpriteMeta};

use crate::editor::host::EngineHost;
use crate::editor::types::{MapTile, SheetTextures, SpriteEntities};
use crate::editor::util::{rect_to_world, release_sprites};
use crate::editor::MAP_Z_BASE;

/// 引擎渲染缓存 → 精灵实体。
///
/// - 先执行引擎排队的 spawn / despawn。
/// - 引擎标记脏（平移、缩放、层序、可见性）或纹理刚加载完时，整体同步所有精灵。
pub fn sync_map_sprites(
    mut commands: Commands,
    mut host: ResMut<EngineHost>,
    mut sprites: ResMut<SpriteEntities>,
    textures: Res<SheetTextures>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut tiles_q: Query<(&MapTile, &mut Sprite, &mut Transform, &mut Visibility)>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(painter) = host.painter_mut() else {
        return;
    };

    let spawns = release_sprites(&mut commands, &mut sprites, painter.drain_render_ops());
    let resync = painter.take_scene_dirty() || textures.is_changed();
    let painter: &Painter = painter;

    for handle in spawns {
        let Some(meta) = painter.scene().get(handle) else {
            continue;
        };
        let (sprite, tf, vis) = tile_visual(painter, &textures, window, meta);
        let entity = commands.spawn((MapTile(handle), sprite, tf, vis)).id();
        sprites.by_handle.insert(handle, entity);
    }

    if !resync {
        return;
    }
    for (tile, mut sprite, mut tf, mut vis) in tiles_q.iter_mut() {
        let Some(meta) = painter.scene().get(tile.0) else {
            continue;
        };
        (*sprite, *tf, *vis) = tile_visual(painter, &textures, window, meta);
    }
}

fn tile_visual(
    painter: &Painter,
    textures: &SheetTextures,
    window: &Window,
    meta: &SpriteMeta,
) -> (Sprite, Transform, Visibility) {
    let rect = painter.sprite_rect(meta);
    let (center, size) = rect_to_world(window, &rect);
    let tf = Transform::from_translation(center.extend(MAP_Z_BASE + meta.z_index as f32));

    let source = painter
        .tile_sheet()
        .and_then(|sheet| sheet.handle(meta.tile_id))
        .map(|handle| handle.source);
    let texture = painter.image_id().and_then(|id| textures.by_id.get(id));

    // 整个格子落在选择器区域里的精灵不显示；部分越界的由选择器背景遮住
    let in_map = rect.y < painter.viewport().region_height();

    match (source, texture) {
        (Some(src), Some(texture)) => {
            let sprite = Sprite {
                image: texture.clone(),
                rect: Some(Rect::new(
                    src.x as f32,
                    src.y as f32,
                    (src.x + src.width) as f32,
                    (src.y + src.height) as f32,
                )),
                custom_size: Some(size),
                ..default()
            };
            let vis = if meta.visible && in_map {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
            (sprite, tf, vis)
        }
        // 图片未就绪：保留实体，等纹理到了再同步
        _ => (Sprite::default(), tf, Visibility::Hidden),
    }
}
