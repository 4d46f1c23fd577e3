// Reference text editing surface: an in-memory UTF-8 buffer with caret,
// selection, clipboard and change notifications. Stands in for a real
// editor widget in the demo binary and in tests.

use crate::surface::{EditorEvent, EditorSurface, EventListener, Motion};
use std::cell::RefCell;
use std::cmp::min;
use std::rc::Rc;
use unicode_segmentation::UnicodeSegmentation;

struct SurfaceInner {
    text: String,
    caret: usize,
    selection: Option<(usize, usize)>,
    clipboard: String,
}

/// Cheap cloneable handle to a shared editing surface.
///
/// Notifications fire only after the internal borrow has been released,
/// so listeners are free to call back into the surface.
#[derive(Clone)]
pub struct TextSurface {
    inner: Rc<RefCell<SurfaceInner>>,
    listeners: Rc<RefCell<Vec<EventListener>>>,
}

impl TextSurface {
    /// Create an empty surface
    pub fn new() -> Self {
        Self::with_text("")
    }

    /// Create a surface holding the given text, caret at the start
    pub fn with_text(text: &str) -> Self {
        TextSurface {
            inner: Rc::new(RefCell::new(SurfaceInner {
                text: text.to_string(),
                caret: 0,
                selection: None,
                clipboard: String::new(),
            })),
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Get the full buffer text
    pub fn text(&self) -> String {
        self.inner.borrow().text.clone()
    }

    /// Get the current selection range, if any
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.inner.borrow().selection
    }

    /// Get the clipboard contents
    pub fn clipboard(&self) -> String {
        self.inner.borrow().clipboard.clone()
    }

    /// Get the number of subscribed listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Drop all subscriptions. Called by the host when the owning
    /// document closes, so no stale listener outlives it.
    pub fn clear_listeners(&mut self) {
        self.listeners.borrow_mut().clear();
    }

    /// Insert text at a position, as an edit not originating from the
    /// mark mechanism (e.g. typing or a programmatic paste).
    pub fn insert_text(&mut self, pos: usize, text: &str) {
        let caret_moved = {
            let mut inner = self.inner.borrow_mut();
            let pos = inner.clamp(pos);
            inner.text.insert_str(pos, text);
            inner.shift_after_edit(pos, text.len(), 0)
        };
        self.emit(EditorEvent::TextReplaced);
        if caret_moved {
            self.emit(EditorEvent::CaretMoved);
        }
    }

    /// Delete a byte range, as a third-party edit
    pub fn delete_range(&mut self, start: usize, end: usize) {
        let caret_moved = {
            let mut inner = self.inner.borrow_mut();
            let start = inner.clamp(start);
            let end = inner.clamp(end);
            if start >= end {
                return;
            }
            inner.text.replace_range(start..end, "");
            inner.shift_after_edit(start, 0, end - start)
        };
        self.emit(EditorEvent::TextReplaced);
        if caret_moved {
            self.emit(EditorEvent::CaretMoved);
        }
    }

    /// Place the caret somewhere directly, the way a mouse click would
    pub fn click_at(&mut self, pos: usize) {
        let (caret_moved, selection_cleared) = {
            let mut inner = self.inner.borrow_mut();
            let pos = inner.clamp(pos);
            let moved = pos != inner.caret;
            inner.caret = pos;
            let cleared = inner.selection.take().is_some();
            (moved, cleared)
        };
        if caret_moved {
            self.emit(EditorEvent::CaretMoved);
        }
        if selection_cleared {
            self.emit(EditorEvent::SelectionChanged);
        }
    }

    fn emit(&self, event: EditorEvent) {
        // Invoke on a snapshot so listeners may subscribe or mutate the
        // surface while we iterate.
        let snapshot: Vec<EventListener> = self.listeners.borrow().clone();
        for listener in snapshot {
            listener(event);
        }
    }
}

impl Default for TextSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSurface for TextSurface {
    fn caret_offset(&self) -> usize {
        self.inner.borrow().caret
    }

    fn set_caret_offset(&mut self, offset: usize) {
        let moved = {
            let mut inner = self.inner.borrow_mut();
            let pos = inner.clamp(offset);
            let moved = pos != inner.caret;
            inner.caret = pos;
            moved
        };
        if moved {
            self.emit(EditorEvent::CaretMoved);
        }
    }

    fn move_caret(&mut self, motion: Motion) {
        let moved = {
            let mut inner = self.inner.borrow_mut();
            let target = inner.resolve(motion);
            let moved = target != inner.caret;
            inner.caret = target;
            moved
        };
        if moved {
            self.emit(EditorEvent::CaretMoved);
        }
    }

    fn extend_selection(&mut self, anchor: usize, motion: Motion) {
        let (moved, selection_changed) = {
            let mut inner = self.inner.borrow_mut();
            let anchor = inner.clamp(anchor);
            let target = inner.resolve(motion);
            let moved = target != inner.caret;
            inner.caret = target;
            let old_selection = inner.selection;
            inner.selection = if anchor == target {
                None
            } else {
                Some((min(anchor, target), anchor.max(target)))
            };
            (moved, inner.selection != old_selection)
        };
        if moved {
            self.emit(EditorEvent::CaretMoved);
        }
        if selection_changed {
            self.emit(EditorEvent::SelectionChanged);
        }
    }

    fn clear_selection(&mut self) {
        let cleared = self.inner.borrow_mut().selection.take().is_some();
        if cleared {
            self.emit(EditorEvent::SelectionChanged);
        }
    }

    fn copy_to_clipboard(&mut self) {
        let mut inner = self.inner.borrow_mut();
        let (start, end) = match inner.selection {
            Some(range) => range,
            // No selection: copy the line the caret is on.
            None => (inner.line_start(inner.caret), inner.line_end(inner.caret)),
        };
        inner.clipboard = inner.text[start..end].to_string();
    }

    fn subscribe(&mut self, listener: EventListener) {
        self.listeners.borrow_mut().push(listener);
    }

    fn handle(&self) -> Box<dyn EditorSurface> {
        Box::new(self.clone())
    }
}

impl SurfaceInner {
    /// Clip a position to the buffer and snap it back to a character
    /// boundary.
    fn clamp(&self, pos: usize) -> usize {
        let mut pos = min(pos, self.text.len());
        while pos > 0 && !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    /// Shift caret and selection after an edit at `pos`. Returns whether
    /// the caret moved.
    fn shift_after_edit(&mut self, pos: usize, inserted: usize, deleted: usize) -> bool {
        let old_caret = self.caret;
        self.caret = shift_caret(self.caret, pos, inserted, deleted);
        if let Some((start, end)) = self.selection {
            let start = shift_offset(start, pos, inserted, deleted);
            let end = shift_offset(end, pos, inserted, deleted);
            self.selection = if start < end { Some((start, end)) } else { None };
        }
        self.caret != old_caret
    }

    fn resolve(&self, motion: Motion) -> usize {
        let pos = self.caret;
        match motion {
            Motion::NextChar => self.next_char(pos),
            Motion::PrevChar => self.prev_char(pos),
            Motion::NextWord => self.next_word(pos),
            Motion::PrevWord => self.prev_word(pos),
            Motion::NextSubword => self.next_subword(pos),
            Motion::PrevSubword => self.prev_subword(pos),
            Motion::NextLine => self.line_down(pos),
            Motion::PrevLine => self.line_up(pos),
            Motion::LineStart => self.line_start(pos),
            Motion::LineEnd => self.line_end(pos),
            Motion::DocumentStart => 0,
            Motion::DocumentEnd => self.text.len(),
        }
    }

    /// Next UTF-8 character boundary
    fn next_char(&self, pos: usize) -> usize {
        self.text[pos..]
            .chars()
            .next()
            .map(|ch| pos + ch.len_utf8())
            .unwrap_or(self.text.len())
    }

    /// Previous UTF-8 character boundary
    fn prev_char(&self, pos: usize) -> usize {
        self.text[..pos]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// End of the word at or after pos
    fn next_word(&self, pos: usize) -> usize {
        for (start, word) in self.text.unicode_word_indices() {
            let end = start + word.len();
            if end > pos {
                return end;
            }
        }
        self.text.len()
    }

    /// Start of the word at or before pos
    fn prev_word(&self, pos: usize) -> usize {
        let mut result = 0;
        for (start, _) in self.text.unicode_word_indices() {
            if start < pos {
                result = start;
            } else {
                break;
            }
        }
        result
    }

    /// End of the subword unit at or after pos. Subword boundaries are
    /// word edges, underscores, lower-to-upper transitions and the end
    /// of an uppercase run followed by lowercase ("FOOBar" splits
    /// before "Bar").
    fn next_subword(&self, pos: usize) -> usize {
        let mut in_word = false;
        let mut prev: Option<(usize, char)> = None;
        let mut prev2: Option<char> = None;
        for (i, ch) in self.text[pos..].char_indices() {
            let at = pos + i;
            if !in_word {
                if ch.is_alphanumeric() {
                    in_word = true;
                }
            } else {
                if !ch.is_alphanumeric() {
                    return at;
                }
                if let Some((prev_at, p)) = prev {
                    if p.is_lowercase() && ch.is_uppercase() {
                        return at;
                    }
                    if ch.is_lowercase()
                        && p.is_uppercase()
                        && prev2.is_some_and(|q| q.is_uppercase())
                    {
                        return prev_at;
                    }
                }
            }
            prev2 = prev.map(|(_, c)| c);
            prev = Some((at, ch));
        }
        self.text.len()
    }

    /// Start of the subword unit at or before pos
    fn prev_subword(&self, pos: usize) -> usize {
        let chars: Vec<(usize, char)> = self.text[..pos].char_indices().collect();
        let mut i = chars.len();
        while i > 0 && !chars[i - 1].1.is_alphanumeric() {
            i -= 1;
        }
        let mut consumed_lower = false;
        while i > 0 {
            let ch = chars[i - 1].1;
            if !ch.is_alphanumeric() {
                break;
            }
            if ch.is_uppercase() {
                i -= 1;
                // A bare uppercase run counts as one unit ("FOO"), but an
                // uppercase char heading a lowercase tail does not pull
                // the run before it along ("FOOBar" stops at "Bar").
                if !consumed_lower {
                    while i > 0 && chars[i - 1].1.is_uppercase() {
                        i -= 1;
                    }
                }
                break;
            }
            consumed_lower = true;
            i -= 1;
        }
        chars.get(i).map_or(0, |&(offset, _)| offset)
    }

    /// Start of the line containing pos
    fn line_start(&self, pos: usize) -> usize {
        self.text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    /// End of the line containing pos (at the newline, or end of buffer)
    fn line_end(&self, pos: usize) -> usize {
        self.text[pos..]
            .find('\n')
            .map(|i| pos + i)
            .unwrap_or(self.text.len())
    }

    /// One line up, keeping the column where possible
    fn line_up(&self, pos: usize) -> usize {
        let start = self.line_start(pos);
        if start == 0 {
            return pos;
        }
        let column = self.text[start..pos].chars().count();
        let prev_start = self.line_start(start - 1);
        let prev_end = start - 1;
        self.advance_columns(prev_start, prev_end, column)
    }

    /// One line down, keeping the column where possible
    fn line_down(&self, pos: usize) -> usize {
        let end = self.line_end(pos);
        if end >= self.text.len() {
            return pos;
        }
        let start = self.line_start(pos);
        let column = self.text[start..pos].chars().count();
        let next_start = end + 1;
        let next_end = self.line_end(next_start);
        self.advance_columns(next_start, next_end, column)
    }

    /// Walk up to `columns` characters forward from `start`, clipped at
    /// `end`.
    fn advance_columns(&self, start: usize, end: usize, columns: usize) -> usize {
        let mut pos = start;
        for ch in self.text[start..end].chars().take(columns) {
            pos += ch.len_utf8();
        }
        pos
    }
}

/// Shift a selection bound across an edit at `pos`
fn shift_offset(offset: usize, pos: usize, inserted: usize, deleted: usize) -> usize {
    if offset <= pos {
        offset
    } else if offset <= pos + deleted {
        pos + inserted
    } else {
        offset - deleted + inserted
    }
}

/// Shift the caret across an edit at `pos`. Unlike a selection bound,
/// the caret rides along with an insertion happening exactly at it.
fn shift_caret(offset: usize, pos: usize, inserted: usize, deleted: usize) -> usize {
    if offset < pos {
        offset
    } else if offset <= pos + deleted {
        pos + inserted
    } else {
        offset - deleted + inserted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn surface(text: &str) -> TextSurface {
        TextSurface::with_text(text)
    }

    #[test]
    fn test_char_motion() {
        let mut s = surface("ab");
        s.move_caret(Motion::NextChar);
        assert_eq!(s.caret_offset(), 1);
        s.move_caret(Motion::NextChar);
        s.move_caret(Motion::NextChar);
        assert_eq!(s.caret_offset(), 2); // clipped at end
        s.move_caret(Motion::PrevChar);
        assert_eq!(s.caret_offset(), 1);
    }

    #[test]
    fn test_char_motion_utf8() {
        let mut s = surface("a世b");
        s.move_caret(Motion::NextChar);
        assert_eq!(s.caret_offset(), 1);
        s.move_caret(Motion::NextChar);
        assert_eq!(s.caret_offset(), 4); // skipped the 3-byte char
        s.move_caret(Motion::PrevChar);
        assert_eq!(s.caret_offset(), 1);
    }

    #[test]
    fn test_word_motion() {
        let mut s = surface("one two three");
        s.move_caret(Motion::NextWord);
        assert_eq!(s.caret_offset(), 3);
        s.move_caret(Motion::NextWord);
        assert_eq!(s.caret_offset(), 7);
        s.move_caret(Motion::PrevWord);
        assert_eq!(s.caret_offset(), 4);
        s.move_caret(Motion::PrevWord);
        assert_eq!(s.caret_offset(), 0);
    }

    #[test]
    fn test_subword_motion_camel_case() {
        let mut s = surface("fooBarBaz");
        s.move_caret(Motion::NextSubword);
        assert_eq!(s.caret_offset(), 3);
        s.move_caret(Motion::NextSubword);
        assert_eq!(s.caret_offset(), 6);
        s.move_caret(Motion::NextSubword);
        assert_eq!(s.caret_offset(), 9);
        s.move_caret(Motion::PrevSubword);
        assert_eq!(s.caret_offset(), 6);
        s.move_caret(Motion::PrevSubword);
        assert_eq!(s.caret_offset(), 3);
    }

    #[test]
    fn test_subword_motion_snake_case_and_acronyms() {
        let mut s = surface("snake_case FOOBar");
        s.move_caret(Motion::NextSubword);
        assert_eq!(s.caret_offset(), 5);
        s.move_caret(Motion::NextSubword);
        assert_eq!(s.caret_offset(), 10);
        s.move_caret(Motion::NextSubword);
        assert_eq!(s.caret_offset(), 14); // end of "FOO"
        s.move_caret(Motion::NextSubword);
        assert_eq!(s.caret_offset(), 17);
        s.move_caret(Motion::PrevSubword);
        assert_eq!(s.caret_offset(), 14); // start of "Bar"
    }

    #[test]
    fn test_line_motion_keeps_column() {
        let mut s = surface("first line\nsecond\nlast line");
        s.set_caret_offset(8);
        s.move_caret(Motion::NextLine);
        assert_eq!(s.caret_offset(), 17); // clipped to end of "second"
        s.move_caret(Motion::NextLine);
        assert_eq!(s.caret_offset(), 24); // column 6 of "last line"
        s.move_caret(Motion::PrevLine);
        assert_eq!(s.caret_offset(), 17);
    }

    #[test]
    fn test_line_motion_at_edges() {
        let mut s = surface("one\ntwo");
        s.set_caret_offset(1);
        s.move_caret(Motion::PrevLine);
        assert_eq!(s.caret_offset(), 1); // first line, no move
        s.set_caret_offset(5);
        s.move_caret(Motion::NextLine);
        assert_eq!(s.caret_offset(), 5); // last line, no move
    }

    #[test]
    fn test_line_start_end_and_document_motion() {
        let mut s = surface("one\ntwo\nthree");
        s.set_caret_offset(5);
        s.move_caret(Motion::LineStart);
        assert_eq!(s.caret_offset(), 4);
        s.move_caret(Motion::LineEnd);
        assert_eq!(s.caret_offset(), 7);
        s.move_caret(Motion::DocumentEnd);
        assert_eq!(s.caret_offset(), 13);
        s.move_caret(Motion::DocumentStart);
        assert_eq!(s.caret_offset(), 0);
    }

    #[test]
    fn test_extend_selection() {
        let mut s = surface("one two three");
        s.extend_selection(0, Motion::NextWord);
        assert_eq!(s.selection(), Some((0, 3)));
        assert_eq!(s.caret_offset(), 3);
        s.extend_selection(0, Motion::NextWord);
        assert_eq!(s.selection(), Some((0, 7)));
    }

    #[test]
    fn test_extend_selection_backward_normalizes() {
        let mut s = surface("one two");
        s.set_caret_offset(7);
        s.extend_selection(7, Motion::PrevWord);
        assert_eq!(s.selection(), Some((4, 7)));
        assert_eq!(s.caret_offset(), 4);
    }

    #[test]
    fn test_extend_selection_back_to_anchor_clears() {
        let mut s = surface("one two");
        s.extend_selection(0, Motion::NextChar);
        assert_eq!(s.selection(), Some((0, 1)));
        s.extend_selection(0, Motion::PrevChar);
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn test_copy_selection() {
        let mut s = surface("one two three");
        s.extend_selection(0, Motion::NextWord);
        s.copy_to_clipboard();
        assert_eq!(s.clipboard(), "one");
    }

    #[test]
    fn test_copy_without_selection_copies_line() {
        let mut s = surface("one\ntwo\nthree");
        s.set_caret_offset(5);
        s.copy_to_clipboard();
        assert_eq!(s.clipboard(), "two");
    }

    #[test]
    fn test_insert_text_shifts_caret_and_selection() {
        let mut s = surface("one two");
        s.set_caret_offset(7);
        s.extend_selection(4, Motion::PrevChar); // selection (4, 7) minus one
        assert_eq!(s.selection(), Some((4, 6)));
        s.insert_text(0, "x ");
        assert_eq!(s.text(), "x one two");
        assert_eq!(s.selection(), Some((6, 8)));
        assert_eq!(s.caret_offset(), 8);
    }

    #[test]
    fn test_delete_range_collapses_contained_selection() {
        let mut s = surface("one two three");
        s.click_at(4);
        s.extend_selection(4, Motion::NextWord);
        assert_eq!(s.selection(), Some((4, 7)));
        s.delete_range(4, 7);
        assert_eq!(s.selection(), None);
        assert_eq!(s.text(), "one  three");
    }

    #[test]
    fn test_click_clears_selection() {
        let mut s = surface("one two");
        s.extend_selection(0, Motion::NextWord);
        s.click_at(5);
        assert_eq!(s.selection(), None);
        assert_eq!(s.caret_offset(), 5);
    }

    #[test]
    fn test_events_fire_per_mutation() {
        let mut s = surface("one two");
        let caret_events = Rc::new(Cell::new(0));
        let selection_events = Rc::new(Cell::new(0));
        let text_events = Rc::new(Cell::new(0));
        let (c, sel, t) = (
            Rc::clone(&caret_events),
            Rc::clone(&selection_events),
            Rc::clone(&text_events),
        );
        s.subscribe(Rc::new(move |event| match event {
            EditorEvent::CaretMoved => c.set(c.get() + 1),
            EditorEvent::SelectionChanged => sel.set(sel.get() + 1),
            EditorEvent::TextReplaced => t.set(t.get() + 1),
        }));

        s.move_caret(Motion::NextChar);
        assert_eq!(caret_events.get(), 1);
        s.extend_selection(1, Motion::NextWord);
        assert_eq!(caret_events.get(), 2);
        assert_eq!(selection_events.get(), 1);
        s.insert_text(0, "x");
        assert_eq!(text_events.get(), 1);
        s.clear_selection();
        assert_eq!(selection_events.get(), 2);
        s.clear_selection(); // already clear, no event
        assert_eq!(selection_events.get(), 2);
    }

    #[test]
    fn test_listener_may_call_back_into_surface() {
        let mut s = surface("one two");
        let handle = s.clone();
        s.subscribe(Rc::new(move |event| {
            if event == EditorEvent::CaretMoved {
                // Must not panic from a re-entrant borrow.
                let _ = handle.selection();
            }
        }));
        s.move_caret(Motion::NextWord);
        assert_eq!(s.caret_offset(), 3);
    }

    #[test]
    fn test_set_caret_clamps_to_char_boundary() {
        let mut s = surface("a世b");
        s.set_caret_offset(2); // inside the 3-byte char
        assert_eq!(s.caret_offset(), 1);
        s.set_caret_offset(100);
        assert_eq!(s.caret_offset(), 5);
    }

    #[test]
    fn test_shared_handles_see_same_state() {
        let mut s = surface("one two");
        let mut other = s.handle();
        other.move_caret(Motion::NextWord);
        assert_eq!(s.caret_offset(), 3);
        s.clear_listeners();
        assert_eq!(s.listener_count(), 0);
    }
}
