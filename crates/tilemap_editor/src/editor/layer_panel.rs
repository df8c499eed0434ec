//! 外部图层列表视图。
//!
//! 只根据引擎发出的事件维护自身，从不读取引擎内部的图层状态；
//! 快捷键发出的命令也以这里的“选中图层”为准。

use bevy::prelude::*;

use tilemap_core::{EditorEvent, LayerId};

#[derive(Clone, Debug, PartialEq)]
pub struct LayerRow {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
}

#[derive(Resource, Clone, Debug, Default)]
pub struct LayerListView {
    /// 第一个为最上层，与引擎一致。
    rows: Vec<LayerRow>,
    selected: Option<LayerId>,
    image_id: Option<String>,
    pan: (f64, f64),
    /// 内容变化（HUD 需要刷新）。
    changed: bool,
}

impl LayerListView {
    pub fn rows(&self) -> &[LayerRow] {
        &self.rows
    }

    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_deref()
    }

    pub fn pan(&self) -> (f64, f64) {
        self.pan
    }

    /// 引擎被重建：新引擎会重新宣告它的图层。
    pub fn reset(&mut self) {
        self.rows.clear();
        self.selected = None;
        self.changed = true;
    }

    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn position(&self, id: LayerId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    fn row_mut(&mut self, id: LayerId) -> Option<&mut LayerRow> {
        self.rows.iter_mut().find(|r| r.id == id)
    }

    pub fn apply(&mut self, event: &EditorEvent) {
        match event {
            EditorEvent::SelectedImage { image_id } => {
                self.image_id = Some(image_id.clone());
            }
            EditorEvent::NewLayer { id, name } => {
                self.rows.push(LayerRow {
                    id: *id,
                    name: name.clone(),
                    visible: true,
                    locked: false,
                });
            }
            EditorEvent::RenameLayer { id, name } => {
                if let Some(row) = self.row_mut(*id) {
                    row.name = name.clone();
                }
            }
            EditorEvent::DeleteLayer { id } => {
                self.rows.retain(|r| r.id != *id);
                if self.selected == Some(*id) {
                    self.selected = None;
                }
            }
            EditorEvent::SelectLayer { id } => self.selected = Some(*id),
            EditorEvent::MoveUpLayer { id } => {
                if let Some(i) = self.position(*id).filter(|i| *i > 0) {
                    self.rows.swap(i, i - 1);
                }
            }
            EditorEvent::MoveDownLayer { id } => {
                let len = self.rows.len();
                if let Some(i) = self.position(*id).filter(|i| i + 1 < len) {
                    self.rows.swap(i, i + 1);
                }
            }
            EditorEvent::ToggleLockLayer { id, locked } => {
                if let Some(row) = self.row_mut(*id) {
                    row.locked = *locked;
                }
            }
            EditorEvent::ToggleDisplayLayer { id, visible } => {
                if let Some(row) = self.row_mut(*id) {
                    row.visible = *visible;
                }
            }
            EditorEvent::Session { pan_x, pan_y } => {
                self.pan = (*pan_x, *pan_y);
                return;
            }
        }
        self.changed = true;
    }

    /// 列表中选中图层的下一个（循环）。
    pub fn next_after_selected(&self) -> Option<LayerId> {
        let current = self.selected.and_then(|id| self.position(id)).unwrap_or(0);
        let next = (current + 1) % self.rows.len().max(1);
        self.rows.get(next).map(|r| r.id)
    }

    pub fn describe(&self) -> String {
        let mut text = String::from("Layers\n");
        for row in &self.rows {
            let marker = if self.selected == Some(row.id) { ">" } else { " " };
            let vis = if row.visible { "V" } else { "-" };
            let lock = if row.locked { "L" } else { "-" };
            text.push_str(&format!("{marker} [{vis}{lock}] {}\n", row.name));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_with(ids: &[LayerId]) -> LayerListView {
        let mut view = LayerListView::default();
        for id in ids {
            view.apply(&EditorEvent::NewLayer {
                id: *id,
                name: format!("Layer - {id}"),
            });
        }
        view.apply(&EditorEvent::SelectLayer { id: ids[ids.len() - 1] });
        view
    }

    fn order(view: &LayerListView) -> Vec<LayerId> {
        view.rows().iter().map(|r| r.id).collect()
    }

    #[test]
    fn follows_layer_events() {
        let mut view = view_with(&[1, 2, 3]);
        view.apply(&EditorEvent::MoveUpLayer { id: 3 });
        assert_eq!(order(&view), vec![1, 3, 2]);
        view.apply(&EditorEvent::MoveDownLayer { id: 2 });
        assert_eq!(order(&view), vec![1, 3, 2]);
        view.apply(&EditorEvent::RenameLayer {
            id: 1,
            name: "Ground".into(),
        });
        view.apply(&EditorEvent::ToggleLockLayer { id: 1, locked: true });
        view.apply(&EditorEvent::DeleteLayer { id: 3 });
        view.apply(&EditorEvent::SelectLayer { id: 2 });

        assert_eq!(order(&view), vec![1, 2]);
        assert_eq!(view.rows()[0].name, "Ground");
        assert!(view.rows()[0].locked);
        assert_eq!(view.selected(), Some(2));
        assert!(view.describe().contains("> [V-] Layer - 2"));
    }

    #[test]
    fn session_event_does_not_mark_changed() {
        let mut view = view_with(&[1]);
        assert!(view.take_changed());
        view.apply(&EditorEvent::Session {
            pan_x: 3.0,
            pan_y: -1.5,
        });
        assert!(!view.take_changed());
        assert_eq!(view.pan(), (3.0, -1.5));
    }

    #[test]
    fn next_layer_wraps() {
        let mut view = view_with(&[1, 2]);
        assert_eq!(view.next_after_selected(), Some(1));
        view.apply(&EditorEvent::SelectLayer { id: 1 });
        assert_eq!(view.next_after_selected(), Some(2));
        view.reset();
        assert_eq!(view.next_after_selected(), None);
    }
}
