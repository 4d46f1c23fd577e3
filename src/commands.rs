// Command surface and movement dispatch: the entry points a host binds
// its keys to, plus the lifecycle wiring that keeps one mark state per
// open document.

use crate::registry::{DocumentId, StateRegistry};
use crate::state::{on_editor_event, Action, OwnActionScope, SharedMarkState};
use crate::surface::{EditorSurface, Motion};
use crate::workbench::Workbench;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// The user-facing command surface: mark toggle, twelve movements and
/// copy. Serializes in kebab-case so keymaps can name commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    ToggleMark,
    NextChar,
    PrevChar,
    NextWord,
    PrevWord,
    NextSubword,
    PrevSubword,
    NextLine,
    PrevLine,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
    Copy,
}

impl Command {
    pub const ALL: [Command; 14] = [
        Command::ToggleMark,
        Command::NextChar,
        Command::PrevChar,
        Command::NextWord,
        Command::PrevWord,
        Command::NextSubword,
        Command::PrevSubword,
        Command::NextLine,
        Command::PrevLine,
        Command::LineStart,
        Command::LineEnd,
        Command::DocumentStart,
        Command::DocumentEnd,
        Command::Copy,
    ];

    /// The movement primitive behind a movement command
    pub fn motion(self) -> Option<Motion> {
        match self {
            Command::NextChar => Some(Motion::NextChar),
            Command::PrevChar => Some(Motion::PrevChar),
            Command::NextWord => Some(Motion::NextWord),
            Command::PrevWord => Some(Motion::PrevWord),
            Command::NextSubword => Some(Motion::NextSubword),
            Command::PrevSubword => Some(Motion::PrevSubword),
            Command::NextLine => Some(Motion::NextLine),
            Command::PrevLine => Some(Motion::PrevLine),
            Command::LineStart => Some(Motion::LineStart),
            Command::LineEnd => Some(Motion::LineEnd),
            Command::DocumentStart => Some(Motion::DocumentStart),
            Command::DocumentEnd => Some(Motion::DocumentEnd),
            Command::ToggleMark | Command::Copy => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::ToggleMark => "toggle-mark",
            Command::NextChar => "next-char",
            Command::PrevChar => "prev-char",
            Command::NextWord => "next-word",
            Command::PrevWord => "prev-word",
            Command::NextSubword => "next-subword",
            Command::PrevSubword => "prev-subword",
            Command::NextLine => "next-line",
            Command::PrevLine => "prev-line",
            Command::LineStart => "line-start",
            Command::LineEnd => "line-end",
            Command::DocumentStart => "document-start",
            Command::DocumentEnd => "document-end",
            Command::Copy => "copy",
        }
    }
}

/// Command handlers for the mark mechanism, bound to one workbench.
///
/// All handlers read the ambient active document and are silent no-ops
/// when there is none.
pub struct MarkCommands {
    workbench: Workbench,
    registry: Rc<RefCell<StateRegistry>>,
}

impl MarkCommands {
    /// Hook the mechanism into a workbench: on a document's first
    /// activation its state is created and the third-party detector is
    /// subscribed to the document's selection, caret and text
    /// notifications; on close the state is dropped again.
    pub fn install(workbench: &Workbench) -> Self {
        let registry = Rc::new(RefCell::new(StateRegistry::new()));

        {
            let registry = Rc::clone(&registry);
            let shell = workbench.clone();
            workbench.on_document_activated(move |id| {
                if registry.borrow().contains(id) {
                    return;
                }
                let Some(mut surface) = shell.surface(id) else {
                    return;
                };
                let state = registry
                    .borrow_mut()
                    .get_or_create(id, Box::new(surface.clone()));
                surface.subscribe(Rc::new(move |_event| on_editor_event(&state)));
            });
        }

        {
            let registry = Rc::clone(&registry);
            workbench.on_document_closing(move |id| {
                registry.borrow_mut().remove(id);
            });
        }

        MarkCommands {
            workbench: workbench.clone(),
            registry,
        }
    }

    /// Toggle the mark at the caret: unset it when the caret sits on the
    /// existing mark, otherwise drop any visible selection and anchor a
    /// new region at the caret.
    pub fn toggle_mark(&self) {
        let Some(state) = self.resolve_state() else {
            return;
        };
        let _own = OwnActionScope::begin(&state, Action::Other);
        let mut editor = state.borrow().editor();
        let caret = editor.caret_offset();
        if state.borrow().mark == Some(caret) {
            state.borrow_mut().mark = None;
        } else {
            editor.clear_selection();
            state.borrow_mut().mark = Some(caret);
        }
    }

    /// Apply a movement primitive: extend the selection from the mark
    /// when one is set, else a plain caret move. Exactly one editor
    /// mutation happens, entirely inside the suppression window.
    pub fn move_caret(&self, motion: Motion) {
        let Some(state) = self.resolve_state() else {
            return;
        };
        let _own = OwnActionScope::begin(&state, Action::Other);
        let mark = state.borrow().mark;
        let mut editor = state.borrow().editor();
        match mark {
            Some(anchor) => editor.extend_selection(anchor, motion),
            None => editor.move_caret(motion),
        }
    }

    /// Copy the region to the clipboard. Copy always ends the region:
    /// selection and mark are cleared afterwards, whether or not
    /// anything was selected.
    pub fn copy_region(&self) {
        let Some(state) = self.resolve_state() else {
            return;
        };
        let _own = OwnActionScope::begin(&state, Action::Other);
        let mut editor = state.borrow().editor();
        editor.copy_to_clipboard();
        editor.clear_selection();
        state.borrow_mut().mark = None;
    }

    /// Dispatch any command from the surface
    pub fn run(&self, command: Command) {
        match command {
            Command::ToggleMark => self.toggle_mark(),
            Command::Copy => self.copy_region(),
            movement => {
                if let Some(motion) = movement.motion() {
                    self.move_caret(motion);
                }
            }
        }
    }

    /// The mark state of a document, if one exists
    pub fn state(&self, id: DocumentId) -> Option<SharedMarkState> {
        self.registry.borrow().get(id)
    }

    /// Number of live per-document states
    pub fn state_count(&self) -> usize {
        self.registry.borrow().len()
    }

    // Resolve the active document's state, creating it lazily. No-op
    // path: no active document, or the document is gone.
    fn resolve_state(&self) -> Option<SharedMarkState> {
        let id = self.workbench.active_document()?;
        let surface = self.workbench.surface(id)?;
        Some(
            self.registry
                .borrow_mut()
                .get_or_create(id, Box::new(surface)),
        )
    }
}
