//! Flags that live for one browser session.

use std::collections::HashSet;

/// A set of named markers scoped to the current session.
pub trait SessionFlags {
    /// Whether `key` has been set during this session.
    fn is_set(&self, key: &str) -> bool;

    /// Mark `key` as set.
    fn set(&mut self, key: &str);
}

/// Session flags held in memory; the session ends with the value.
#[derive(Debug, Default, Clone)]
pub struct MemorySession {
    flags: HashSet<String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionFlags for MemorySession {
    fn is_set(&self, key: &str) -> bool {
        self.flags.contains(key)
    }

    fn set(&mut self, key: &str) {
        self.flags.insert(key.to_string());
    }
}

/// Session flags in the page's `sessionStorage`.
///
/// Without storage access (private mode, sandboxed iframe) flags are kept
/// in memory for the lifetime of this value instead.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct BrowserSession {
    fallback: MemorySession,
}

#[cfg(target_arch = "wasm32")]
impl BrowserSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.session_storage().ok()?
    }
}

#[cfg(target_arch = "wasm32")]
impl SessionFlags for BrowserSession {
    fn is_set(&self, key: &str) -> bool {
        match Self::storage() {
            Some(storage) => matches!(storage.get_item(key), Ok(Some(value)) if value == "true"),
            None => self.fallback.is_set(key),
        }
    }

    fn set(&mut self, key: &str) {
        let stored = Self::storage().is_some_and(|storage| storage.set_item(key, "true").is_ok());
        if !stored {
            log::warn!("sessionStorage unavailable, keeping '{}' in memory", key);
            self.fallback.set(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_session() {
        let mut session = MemorySession::new();
        assert!(!session.is_set("galleryCleanupDone"));
        session.set("galleryCleanupDone");
        assert!(session.is_set("galleryCleanupDone"));
        assert!(!session.is_set("other"));
    }
}
