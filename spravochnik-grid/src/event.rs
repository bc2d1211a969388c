//! Change notifications emitted to grid observers.

/// What a view must redraw after a grid operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    /// Rows were added, removed, reloaded or reordered. Redisplay everything.
    RowsReset,
    /// One cell received a new value.
    CellChanged { row: usize, column: usize },
}

/// Callback registered with [`Observers::subscribe`].
pub type Observer = Box<dyn FnMut(&GridEvent)>;

/// The observers of one grid or adapter.
#[derive(Default)]
pub struct Observers {
    observers: Vec<Observer>,
}

impl Observers {
    pub fn subscribe(&mut self, observer: impl FnMut(&GridEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn emit(&mut self, event: GridEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.observers.len())
            .finish()
    }
}
