//! 领域事件协议。
//!
//! 单向同步：UI → 引擎走 [`EditorCommand`]（`Painter::apply`），引擎 → UI 走 [`EditorEvent`]。
//! 外部图层列表只根据事件更新自身，引擎从不回读 UI 状态。

use crate::{LayerId, TileId};

/// UI 发给引擎的命令。
#[derive(Clone, Debug, PartialEq)]
pub enum EditorCommand {
    SelectImage { image_id: String },
    SelectTile { tile_id: TileId },
    NewLayer { name: String },
    RenameLayer { id: LayerId, name: String },
    DeleteLayer { id: LayerId },
    SelectLayer { id: LayerId },
    MoveUpLayer { id: LayerId },
    MoveDownLayer { id: LayerId },
    ToggleLockLayer { id: LayerId },
    ToggleDisplayLayer { id: LayerId },
}

/// 引擎发出的事件。
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    SelectedImage { image_id: String },
    NewLayer { id: LayerId, name: String },
    RenameLayer { id: LayerId, name: String },
    DeleteLayer { id: LayerId },
    SelectLayer { id: LayerId },
    MoveUpLayer { id: LayerId },
    MoveDownLayer { id: LayerId },
    ToggleLockLayer { id: LayerId, locked: bool },
    ToggleDisplayLayer { id: LayerId, visible: bool },
    /// 视口平移变化（引擎内部事件，供 session 持久化）。
    Session { pan_x: f64, pan_y: f64 },
}

impl EditorEvent {
    /// 协议里的事件名。
    pub fn name(&self) -> &'static str {
        match self {
            EditorEvent::SelectedImage { .. } => "SELECTEDIMAGE",
            EditorEvent::NewLayer { .. } => "NEWLAYER",
            EditorEvent::RenameLayer { .. } => "RENAMELAYER",
            EditorEvent::DeleteLayer { .. } => "DELETELAYER",
            EditorEvent::SelectLayer { .. } => "SELECTLAYER",
            EditorEvent::MoveUpLayer { .. } => "MOVEUPLAYER",
            EditorEvent::MoveDownLayer { .. } => "MOVEDOWNLAYER",
            EditorEvent::ToggleLockLayer { .. } => "TOGGLELOCKLAYER",
            EditorEvent::ToggleDisplayLayer { .. } => "TOGGLEDISPLAYLAYER",
            EditorEvent::Session { .. } => "session",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&EditorEvent) + Send + Sync>;

/// 事件总线：回调订阅 + 可被宿主逐帧取走的发件箱。
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
    outbox: Vec<EditorEvent>,
}

impl EventBus {
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&EditorEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        before != self.listeners.len()
    }

    /// 注销全部监听，返回注销数量。
    pub fn unsubscribe_all(&mut self) -> usize {
        let count = self.listeners.len();
        self.listeners.clear();
        count
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn emit(&mut self, event: EditorEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
        self.outbox.push(event);
    }

    pub fn drain(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.outbox)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("outbox", &self.outbox)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn listeners_and_outbox_both_see_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::default();
        let sink = seen.clone();
        let id = bus.subscribe(move |e| sink.lock().unwrap().push(e.name()));

        bus.emit(EditorEvent::SelectLayer { id: 1 });
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(EditorEvent::DeleteLayer { id: 1 });

        assert_eq!(*seen.lock().unwrap(), vec!["SELECTLAYER"]);
        assert_eq!(bus.drain().len(), 2);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn unsubscribe_all_reports_count() {
        let mut bus = EventBus::default();
        bus.subscribe(|_| {});
        bus.subscribe(|_| {});
        assert_eq!(bus.unsubscribe_all(), 2);
        assert_eq!(bus.listener_count(), 0);
    }
}
