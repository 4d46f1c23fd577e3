// Mark and region core: per-document mark state, own-action scoping and
// third-party invalidation.
//
// Every mutation this crate performs on an editor runs inside an
// OwnActionScope, so the detector can tell the mechanism's own actions
// apart from everything else (mouse clicks, other commands, programmatic
// edits). Any editor notification arriving outside such a scope revokes
// the mark: once an untracked mutation happened, the anchor is no longer
// meaningful.

use crate::surface::EditorSurface;
use std::cell::RefCell;
use std::rc::Rc;

/// Classification of the most recently completed action on a document.
///
/// `KillWord` and `KillLine` are carried as distinct tags for kill-style
/// coalescing, but no command currently produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ThirdParty,
    KillWord,
    KillLine,
    Other,
}

/// Mutable mark state, exactly one per open document.
pub struct MarkState {
    /// Anchor of the active region, or `None` when no mark is set
    pub mark: Option<usize>,
    /// The most recently completed action, own or third-party
    pub last_action: Action,
    /// True exactly while an `OwnActionScope` for this document is open
    pub own_action: bool,
    editor: Box<dyn EditorSurface>,
}

/// Shared handle to a document's mark state
pub type SharedMarkState = Rc<RefCell<MarkState>>;

impl MarkState {
    pub fn new(editor: Box<dyn EditorSurface>) -> SharedMarkState {
        Rc::new(RefCell::new(MarkState {
            mark: None,
            last_action: Action::Other,
            own_action: false,
            editor,
        }))
    }

    /// Fresh handle to the document's editing surface
    pub fn editor(&self) -> Box<dyn EditorSurface> {
        self.editor.handle()
    }
}

/// Scoped marker for mutations performed by the mark mechanism itself.
///
/// While the scope is open, the third-party detector ignores editor
/// notifications. Dropping the scope records the action as the new last
/// action. Release happens on every exit path, including early returns
/// and unwinding; never pair the flag by hand.
pub struct OwnActionScope {
    state: SharedMarkState,
    action: Action,
}

impl OwnActionScope {
    pub fn begin(state: &SharedMarkState, action: Action) -> Self {
        state.borrow_mut().own_action = true;
        OwnActionScope {
            state: Rc::clone(state),
            action,
        }
    }
}

impl Drop for OwnActionScope {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.own_action = false;
        state.last_action = self.action;
    }
}

/// Third-party detector, invoked once per host-editor notification for
/// the document owning `state` (selection changed, caret moved, text
/// replaced).
///
/// Clearing the visible selection is itself an editor mutation that
/// would re-trigger this detector; the inner scope suppresses that
/// re-entrancy.
pub fn on_editor_event(state: &SharedMarkState) {
    if state.borrow().own_action {
        return;
    }

    if state.borrow().mark.is_some() {
        let mut editor = state.borrow().editor();
        let _own = OwnActionScope::begin(state, Action::ThirdParty);
        editor.clear_selection();
        state.borrow_mut().mark = None;
    } else {
        state.borrow_mut().last_action = Action::ThirdParty;
    }
}
