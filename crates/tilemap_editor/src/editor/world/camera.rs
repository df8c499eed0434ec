use bevy::prelude::*;

use crate::editor::types::WorldCamera;

/// 初始化世界相机。
///
/// 相机固定在原点、不缩放：平移与缩放都由引擎视口计算，
/// 精灵直接摆在“表面坐标 → 世界坐标”换算后的位置上。
pub fn setup_world(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Transform::from_translation(Vec3::new(0.0, 0.0, 1000.0)),
        WorldCamera,
    ));
}
