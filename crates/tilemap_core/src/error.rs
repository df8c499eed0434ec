use thiserror::Error;

/// 结构性输入错误。引用类错误（未知图层 / 越界格子）不走这里，只记日志并返回 no-op。
#[derive(Debug, Error)]
pub enum TilemapError {
    #[error("tile size must be non-zero, got {width}x{height}")]
    ZeroTileSize { width: u32, height: u32 },
    #[error("image {image_id} ({image_width}x{image_height}) is smaller than one {tile_width}x{tile_height} tile")]
    ImageTooSmall {
        image_id: String,
        image_width: u32,
        image_height: u32,
        tile_width: u32,
        tile_height: u32,
    },
    #[error("session payload for key '{key}' is malformed: {message}")]
    SessionPayload { key: String, message: String },
}
