//! HUD：右上角一段文字，显示模式、缩放、笔刷与图层列表。
//!
//! 图层列表来自 [`LayerListView`]（由引擎事件重建），不直接读引擎里的图层。

use bevy::prelude::*;

use super::host::EngineHost;
use super::layer_panel::LayerListView;
use super::types::HudText;

const HELP: &str = "1/2/3 paint/erase/move  N new  Del delete  PgUp/PgDn order  H hide  L lock  Tab next\n\
= / - zoom  [ / ] tile size  O open sheet  Ctrl+S save  Ctrl+O load";

pub fn setup_hud(mut commands: Commands) {
    commands.spawn((
        Text::new(HELP),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            right: Val::Px(8.0),
            ..default()
        },
        HudText,
    ));
}

/// 文本有变化才写回，避免每帧触发文字重排。
pub fn update_hud_text(
    host: Res<EngineHost>,
    view: Res<LayerListView>,
    mut last: Local<String>,
    mut hud_q: Query<&mut Text, With<HudText>>,
) {
    let Some(painter) = host.painter() else {
        return;
    };
    let Ok(mut text) = hud_q.single_mut() else {
        return;
    };

    let brush = painter
        .picker()
        .brush()
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    let sheet = match (view.image_id(), painter.tile_sheet()) {
        (None, _) => "no tile sheet (press O)".to_string(),
        (Some(_), None) => "tile sheet loading".to_string(),
        (Some(_), Some(sheet)) => format!("tiles {}x{}", sheet.columns(), sheet.rows()),
    };
    let (pan_x, pan_y) = view.pan();
    let msg = format!(
        "{HELP}\n\nmode: {:?} | zoom: {:.2} | pan: {pan_x:.0},{pan_y:.0} | tile {}x{} | brush: {brush}\n{sheet}\n{}",
        painter.mode(),
        painter.viewport().scale,
        painter.config().tile_width,
        painter.config().tile_height,
        view.describe(),
    );

    if *last != msg {
        text.0 = msg.clone();
        *last = msg;
    }
}
