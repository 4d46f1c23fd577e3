// Per-document state registry. Entries are created lazily on first need
// and must be removed when the owning document closes; nothing else
// bounds the table's growth.

use crate::state::{MarkState, SharedMarkState};
use crate::surface::EditorSurface;
use std::collections::HashMap;
use std::rc::Rc;

/// Identity of one open editing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u32);

/// Mapping from document identity to its mark state
pub struct StateRegistry {
    table: HashMap<DocumentId, SharedMarkState>,
}

impl StateRegistry {
    pub fn new() -> Self {
        StateRegistry {
            table: HashMap::new(),
        }
    }

    /// Get the state for a document, creating it on first access.
    /// `editor` is only used when a new state has to be constructed.
    pub fn get_or_create(
        &mut self,
        id: DocumentId,
        editor: Box<dyn EditorSurface>,
    ) -> SharedMarkState {
        Rc::clone(self.table.entry(id).or_insert_with(|| MarkState::new(editor)))
    }

    /// Look up the state for a document without creating it
    pub fn get(&self, id: DocumentId) -> Option<SharedMarkState> {
        self.table.get(&id).map(Rc::clone)
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.table.contains_key(&id)
    }

    /// Drop the association for a closed document; no-op if absent
    pub fn remove(&mut self, id: DocumentId) {
        self.table.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for StateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
