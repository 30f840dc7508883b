//! Graphics resource accounting.
//!
//! Every geometry buffer and material a builder creates is represented by a
//! [`ResourceHandle`]. Dropping the handle releases the resource, so a
//! rebuild that replaces a renderable frees the previous one without any
//! explicit bookkeeping. The pool counts live handles.

use std::cell::Cell;
use std::rc::Rc;

/// Kind of resource a handle stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Geometry,
    Material,
}

#[derive(Debug, Default)]
struct Counters {
    live: Cell<usize>,
    allocated: Cell<u64>,
    next_id: Cell<u64>,
}

/// Shared allocation counter. Cloning shares the same counters.
#[derive(Debug, Clone, Default)]
pub struct ResourcePool {
    counters: Rc<Counters>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a resource handle of the given kind.
    pub fn allocate(&self, kind: ResourceKind) -> ResourceHandle {
        let c = &self.counters;
        c.live.set(c.live.get() + 1);
        c.allocated.set(c.allocated.get() + 1);
        ResourceHandle {
            pool: self.clone(),
            kind,
        }
    }

    /// Monotonic id for renderables created from this pool
    pub fn next_id(&self) -> u64 {
        let id = self.counters.next_id.get() + 1;
        self.counters.next_id.set(id);
        id
    }

    /// Number of handles currently alive
    pub fn live(&self) -> usize {
        self.counters.live.get()
    }

    /// Total number of handles ever allocated
    pub fn allocated(&self) -> u64 {
        self.counters.allocated.get()
    }

    fn release(&self) {
        let c = &self.counters;
        c.live.set(c.live.get().saturating_sub(1));
    }
}

/// RAII handle for one geometry or material resource
#[derive(Debug)]
pub struct ResourceHandle {
    pool: ResourcePool,
    kind: ResourceKind,
}

impl ResourceHandle {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        self.pool.release();
    }
}
