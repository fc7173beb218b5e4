use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::rc::Rc;

use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct DocumentRegistry {
    inner: Rc<RefCell<Registry>>,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    live: HashMap<u64, usize>,
}

impl DocumentRegistry {
    pub fn new() -> DocumentRegistry {
        DocumentRegistry::default()
    }

    pub fn acquire(&self, bytes: Vec<u8>) -> DocumentHandle {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.live.insert(id, bytes.len());
        debug!(id, len = bytes.len(), "acquired document");

        DocumentHandle {
            id,
            bytes,
            registry: self.clone(),
        }
    }

    pub fn live_count(&self) -> usize {
        self.inner.borrow().live.len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        parse_url(url).map_or(false, |id| self.inner.borrow().live.contains_key(&id))
    }

    fn release(&self, id: u64) {
        if self.inner.borrow_mut().live.remove(&id).is_some() {
            debug!(id, "released document");
        }
    }
}

const URL_PREFIX: &str = "blob:collabdesk/";

fn parse_url(url: &str) -> Option<u64> {
    url.strip_prefix(URL_PREFIX)?.parse().ok()
}

/// A generated document that stays addressable for as long as the handle
/// lives. Dropping the handle releases it.
pub struct DocumentHandle {
    id: u64,
    bytes: Vec<u8>,
    registry: DocumentRegistry,
}

impl DocumentHandle {
    pub fn url(&self) -> String {
        format!("{}{}", URL_PREFIX, self.id)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn media_type(&self) -> &'static str {
        if self.bytes.starts_with(b"%PDF") {
            "application/pdf"
        } else {
            "application/octet-stream"
        }
    }
}

impl Drop for DocumentHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

impl Debug for DocumentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentHandle")
            .field("url", &self.url())
            .field("len", &self.bytes.len())
            .finish()
    }
}
