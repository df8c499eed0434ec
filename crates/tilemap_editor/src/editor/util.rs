use bevy::ecs::system::Command;
use bevy::prelude::*;

use tilemap_core::{CellRect, RenderHandle, RenderOp};

use super::types::SpriteEntities;

struct DespawnIfAlive(Entity);

impl Command for DespawnIfAlive {
    fn apply(self, world: &mut World) {
        if world.entities().contains(self.0) {
            let _ = world.despawn(self.0);
        }
    }
}

/// 安全地 despawn：实体已不存在时不会触发 command error（重建引擎时可能重复释放）。
pub fn despawn_silently(commands: &mut Commands, entity: Entity) {
    commands.queue(DespawnIfAlive(entity));
}

/// 执行引擎交出的 despawn 操作，返回仍待 spawn 的句柄。
pub fn release_sprites(
    commands: &mut Commands,
    sprites: &mut SpriteEntities,
    ops: Vec<RenderOp>,
) -> Vec<RenderHandle> {
    let mut spawns = Vec::new();
    for op in ops {
        match op {
            RenderOp::Spawn(handle) => spawns.push(handle),
            RenderOp::Despawn(handle) => {
                spawns.retain(|h| *h != handle);
                if let Some(entity) = sprites.by_handle.remove(&handle) {
                    despawn_silently(commands, entity);
                }
            }
        }
    }
    spawns
}

/// 表面坐标（原点左上，y 向下）→ 世界坐标（相机在原点，y 向上）。
pub fn surface_to_world(window: &Window, x: f64, y: f64) -> Vec2 {
    Vec2::new(
        x as f32 - window.width() * 0.5,
        window.height() * 0.5 - y as f32,
    )
}

/// 表面矩形的世界中心点与尺寸。
pub fn rect_to_world(window: &Window, rect: &CellRect) -> (Vec2, Vec2) {
    let center = rect.center();
    (
        surface_to_world(window, center.x, center.y),
        Vec2::new(rect.width as f32, rect.height as f32),
    )
}
