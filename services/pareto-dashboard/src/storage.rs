//! Session store backed by the browser's `localStorage`.
//!
//! When storage is unavailable (private browsing, native builds) values live
//! in memory for the lifetime of the page.

use pareto_model::{MemoryStore, SessionStore};

#[derive(Debug, Default)]
pub struct LocalStore {
    #[cfg(all(feature = "csr", target_arch = "wasm32"))]
    storage: Option<web_sys::Storage>,
    fallback: MemoryStore,
}

impl LocalStore {
    pub fn open() -> Self {
        #[cfg(all(feature = "csr", target_arch = "wasm32"))]
        {
            let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
            if storage.is_none() {
                tracing::warn!("localStorage unavailable, session will not survive a reload");
            }
            Self {
                storage,
                fallback: MemoryStore::new(),
            }
        }

        #[cfg(not(all(feature = "csr", target_arch = "wasm32")))]
        {
            Self::default()
        }
    }
}

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
impl SessionStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        match &self.storage {
            Some(storage) => storage.get_item(key).ok().flatten(),
            None => self.fallback.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        match &self.storage {
            Some(storage) => {
                if storage.set_item(key, value).is_err() {
                    tracing::warn!("Failed to write {} to localStorage", key);
                }
            }
            None => self.fallback.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) {
        match &self.storage {
            Some(storage) => {
                let _ = storage.remove_item(key);
            }
            None => self.fallback.remove(key),
        }
    }
}

#[cfg(not(all(feature = "csr", target_arch = "wasm32")))]
impl SessionStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.fallback.get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.fallback.set(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.fallback.remove(key);
    }
}
