//! Change notifications dispatched by a shape after each mutation.

use shared::ShapeKind;

use super::ShapeId;

/// Typed change notification. Fired after the mutation and its rebuild.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeEvent {
    /// Vertex list replaced wholesale
    VerticesChanged,
    VertexUpdated { index: usize },
    /// New vertex inserted at `index` by an edge split
    EdgeSplit { index: usize },
    VertexRemoved { index: usize },
    /// Vertex appended at `index`
    PointAdded { index: usize },
    KindChanged { kind: ShapeKind },
    ClosedChanged { closed: bool },
    /// Color, volume height or appearance flags changed
    StyleChanged,
    /// Shape created by the factory
    ShapeAdded,
}

impl ShapeEvent {
    /// Whether the event changes vertex count or closure
    pub fn is_topology_change(&self) -> bool {
        matches!(
            self,
            ShapeEvent::VerticesChanged
                | ShapeEvent::EdgeSplit { .. }
                | ShapeEvent::VertexRemoved { .. }
                | ShapeEvent::PointAdded { .. }
                | ShapeEvent::KindChanged { .. }
                | ShapeEvent::ClosedChanged { .. }
        )
    }

    /// Event name as used by the command protocol
    pub fn name(&self) -> &'static str {
        match self {
            ShapeEvent::VerticesChanged => "vertices-changed",
            ShapeEvent::VertexUpdated { .. } => "vertex-updated",
            ShapeEvent::EdgeSplit { .. } => "edge-split",
            ShapeEvent::VertexRemoved { .. } => "vertex-removed",
            ShapeEvent::PointAdded { .. } => "point-added",
            ShapeEvent::KindChanged { .. } => "kind-changed",
            ShapeEvent::ClosedChanged { .. } => "closed-changed",
            ShapeEvent::StyleChanged => "style-changed",
            ShapeEvent::ShapeAdded => "shape-added",
        }
    }
}

/// Handle returned by [`EventHub::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(ShapeId, &ShapeEvent)>;

/// Callback registry owned by each shape
#[derive(Default)]
pub struct EventHub {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl EventHub {
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(ShapeId, &ShapeEvent) + 'static,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, source: ShapeId, event: &ShapeEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(source, event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
