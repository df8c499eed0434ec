//! tile sheet 图片加载进度轮询。

use bevy::prelude::*;

use super::super::host::EngineHost;
use super::super::types::{PendingSheet, SheetLoading, SheetTextures};

/// 轮询图片是否解码完毕；完成后登记纹理并把尺寸交给引擎切片。
pub fn progress_sheet_loading(
    mut loading: ResMut<SheetLoading>,
    mut textures: ResMut<SheetTextures>,
    mut host: ResMut<EngineHost>,
    images: Res<Assets<Image>>,
) {
    if loading.pending.is_empty() {
        return;
    }

    let mut still_pending: Vec<PendingSheet> = Vec::new();
    for p in loading.pending.drain(..) {
        let Some(image) = images.get(&p.texture) else {
            still_pending.push(p);
            continue;
        };

        let size = image.size();
        let (width, height) = (size.x as u32, size.y as u32);
        info!("tile sheet {} decoded: {width}x{height}", p.id);
        if let Some(painter) = host.painter_mut() {
            painter.tile_sheet_decoded(&p.id, width, height);
        }
        textures.by_id.insert(p.id, p.texture);
    }

    loading.pending = still_pending;
}
