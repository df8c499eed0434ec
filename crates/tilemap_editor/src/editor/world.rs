//! 世界（World）侧逻辑：相机、指针输入、快捷键、引擎渲染缓存 ↔ 精灵同步。
//!
//! 关键点：
//! - 引擎使用“表面坐标”（原点在窗口左上，y 向下），正好是 `Window::cursor_position()` 的坐标系，
//!   所以指针输入直接交给引擎，不经过相机换算。
//! - 相机固定在原点，精灵位置由表面坐标换算成世界坐标（见 `util::surface_to_world`）。
//! - 窗口 resize 时整个引擎被销毁重建，精灵实体随之全部重建。

mod camera;
mod canvas;
mod input;
mod layer_events;
mod picker;
mod render_sync;
mod save_load;
mod shortcuts;
mod surface;

pub use camera::setup_world;
pub use canvas::{draw_canvas, refresh_hover_overlay};
pub use input::pointer_input;
pub use layer_events::consume_editor_events;
pub use picker::rebuild_picker_sprites;
pub use render_sync::sync_map_sprites;
pub use save_load::save_load_shortcuts;
pub use shortcuts::{layer_shortcuts, mode_shortcuts, view_shortcuts};
pub use surface::{mount_engine, recreate_on_resize};
