// Reference host shell: open documents, the active document, and the
// lifecycle notifications the mark mechanism hooks into. Everything runs
// synchronously on one thread.

use crate::registry::DocumentId;
use crate::text_surface::TextSurface;
use std::cell::RefCell;
use std::rc::Rc;

/// One open editing session, owning its editing surface
pub struct Document {
    id: DocumentId,
    title: String,
    surface: TextSurface,
}

impl Document {
    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Handle to this document's editing surface
    pub fn surface(&self) -> TextSurface {
        self.surface.clone()
    }
}

type DocumentListener = Rc<dyn Fn(DocumentId)>;

struct WorkbenchInner {
    documents: Vec<Document>,
    active: Option<DocumentId>,
    next_id: u32,
    activated_listeners: Vec<DocumentListener>,
    closing_listeners: Vec<DocumentListener>,
}

/// Cheap cloneable handle to the shared workbench state
#[derive(Clone)]
pub struct Workbench {
    inner: Rc<RefCell<WorkbenchInner>>,
}

impl Workbench {
    pub fn new() -> Self {
        Workbench {
            inner: Rc::new(RefCell::new(WorkbenchInner {
                documents: Vec::new(),
                active: None,
                next_id: 1,
                activated_listeners: Vec::new(),
                closing_listeners: Vec::new(),
            })),
        }
    }

    /// Open a new document holding `text` and make it the active one
    pub fn open(&self, title: &str, text: &str) -> DocumentId {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = DocumentId(inner.next_id);
            inner.next_id += 1;
            inner.documents.push(Document {
                id,
                title: title.to_string(),
                surface: TextSurface::with_text(text),
            });
            id
        };
        self.activate(id);
        id
    }

    /// Make a document the active one and notify subscribers
    pub fn activate(&self, id: DocumentId) {
        {
            let mut inner = self.inner.borrow_mut();
            if !inner.documents.iter().any(|doc| doc.id == id) {
                return;
            }
            inner.active = Some(id);
        }
        for listener in self.activated_listeners() {
            listener(id);
        }
    }

    /// Close a document: notify subscribers, tear down its surface
    /// subscriptions and drop it. Activates the most recently opened
    /// remaining document, if any.
    pub fn close(&self, id: DocumentId) {
        if self.surface(id).is_none() {
            return;
        }
        for listener in self.closing_listeners() {
            listener(id);
        }
        let next_active = {
            let mut inner = self.inner.borrow_mut();
            if let Some(index) = inner.documents.iter().position(|doc| doc.id == id) {
                let mut doc = inner.documents.remove(index);
                doc.surface.clear_listeners();
            }
            if inner.active == Some(id) {
                inner.active = inner.documents.last().map(|doc| doc.id);
                inner.active
            } else {
                None
            }
        };
        if let Some(next) = next_active {
            self.activate(next);
        }
    }

    /// Identity of the active document, if any
    pub fn active_document(&self) -> Option<DocumentId> {
        self.inner.borrow().active
    }

    /// Handle to a document's editing surface
    pub fn surface(&self, id: DocumentId) -> Option<TextSurface> {
        self.inner
            .borrow()
            .documents
            .iter()
            .find(|doc| doc.id == id)
            .map(|doc| doc.surface())
    }

    /// Handle to the active document's editing surface
    pub fn active_surface(&self) -> Option<TextSurface> {
        self.active_document().and_then(|id| self.surface(id))
    }

    pub fn title(&self, id: DocumentId) -> Option<String> {
        self.inner
            .borrow()
            .documents
            .iter()
            .find(|doc| doc.id == id)
            .map(|doc| doc.title().to_string())
    }

    pub fn document_count(&self) -> usize {
        self.inner.borrow().documents.len()
    }

    /// Subscribe to document activation
    pub fn on_document_activated<F: Fn(DocumentId) + 'static>(&self, listener: F) {
        self.inner
            .borrow_mut()
            .activated_listeners
            .push(Rc::new(listener));
    }

    /// Subscribe to document closing; fires before the document is gone
    pub fn on_document_closing<F: Fn(DocumentId) + 'static>(&self, listener: F) {
        self.inner
            .borrow_mut()
            .closing_listeners
            .push(Rc::new(listener));
    }

    fn activated_listeners(&self) -> Vec<DocumentListener> {
        self.inner.borrow().activated_listeners.clone()
    }

    fn closing_listeners(&self) -> Vec<DocumentListener> {
        self.inner.borrow().closing_listeners.clone()
    }
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new()
    }
}
