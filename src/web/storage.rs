use web_sys::{Storage, Window};

use crate::data::preferences::PreferenceStore;

/// The site-wide `localStorage`, shared with the language switcher of the
/// host page.
pub struct LocalStorage(Option<Storage>);

impl LocalStorage {
    pub fn new(window: &Window) -> Self {
        match window.local_storage() {
            Ok(Some(storage)) => LocalStorage(Some(storage)),
            _ => {
                // Private browsing modes may deny access.
                log::warn!("localStorage is unavailable, the language won't persist");
                LocalStorage(None)
            }
        }
    }
}

impl PreferenceStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.0.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        let Some(storage) = &self.0 else {
            return;
        };

        if let Err(error) = storage.set_item(key, value) {
            log::warn!("Failed to persist {key}: {error:?}");
        }
    }
}
