use std::rc::Rc;

/// One atomic caret-repositioning operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
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
}

/// Notification fired by an editing surface after one of its aspects
/// changed. Carries no payload; subscribers only need to know that
/// something happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    SelectionChanged,
    CaretMoved,
    TextReplaced,
}

/// Callback type for editor notifications
pub type EventListener = Rc<dyn Fn(EditorEvent)>;

/// A minimal abstraction over the host editor's caret, selection and
/// clipboard primitives.
///
/// It unifies the interactions the mark mechanism needs so different
/// editing surfaces can be driven without changing the coordination
/// logic. Implementations are expected to be cheap cloneable handles to
/// shared widget state; `handle()` hands out such a clone.
pub trait EditorSurface {
    fn caret_offset(&self) -> usize;
    fn set_caret_offset(&mut self, offset: usize);

    // Plain caret move vs. growing the selection from an anchor while
    // moving the caret.
    fn move_caret(&mut self, motion: Motion);
    fn extend_selection(&mut self, anchor: usize, motion: Motion);

    fn clear_selection(&mut self);

    // Copy the current selection to the clipboard. What gets copied when
    // nothing is selected is the surface's own business.
    fn copy_to_clipboard(&mut self);

    // Subscribe to selection/caret/text notifications for the lifetime
    // of the surface.
    fn subscribe(&mut self, listener: EventListener);

    /// Fresh handle to the same underlying surface.
    fn handle(&self) -> Box<dyn EditorSurface>;
}
