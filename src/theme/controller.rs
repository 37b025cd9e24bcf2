//! Theme state and persistence

use super::giscus::{CommentFrame, GiscusMessage, GISCUS_ORIGIN};
use super::store::PreferenceStore;
use super::system::SystemPreference;
use super::Theme;

/// Owns the active theme.
///
/// Store failures never surface to callers: reads fall back to the system
/// preference and writes are dropped with a warning.
pub struct ThemeController {
    store: Option<Box<dyn PreferenceStore>>,
    system: Box<dyn SystemPreference>,
    frame: Option<Box<dyn CommentFrame>>,
    storage_key: String,
    current: Theme,
}

impl ThemeController {
    /// Create a controller and pick the initial theme.
    ///
    /// `store` is `None` when no preference storage exists at all.
    pub fn new(
        store: Option<Box<dyn PreferenceStore>>,
        system: Box<dyn SystemPreference>,
        storage_key: impl Into<String>,
    ) -> Self {
        let mut controller = Self {
            store,
            system,
            frame: None,
            storage_key: storage_key.into(),
            current: Theme::default(),
        };
        controller.current = controller
            .saved()
            .unwrap_or_else(|| controller.system.theme());
        tracing::debug!("Initial theme: {}", controller.current);
        controller
    }

    /// Attach the comment widget frame; later theme changes are sent to it
    pub fn attach_frame(&mut self, frame: Box<dyn CommentFrame>) {
        self.frame = Some(frame);
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// The saved preference, if any can be read
    pub fn saved(&self) -> Option<Theme> {
        let store = self.store.as_ref()?;
        let value = match store.get(&self.storage_key) {
            Ok(value) => value?,
            Err(e) => {
                tracing::warn!("Failed to read theme preference: {}", e);
                return None;
            }
        };

        match value.parse() {
            Ok(theme) => Some(theme),
            Err(e) => {
                tracing::warn!("Ignoring saved theme preference: {}", e);
                None
            }
        }
    }

    /// Make `theme` active without persisting it
    pub fn apply(&mut self, theme: Theme) {
        self.current = theme;
        self.notify_frame();
    }

    /// Flip between light and dark, persist the choice and return it
    pub fn toggle(&mut self) -> Theme {
        let next = self.current.toggled();
        self.set(next);
        next
    }

    /// Make `theme` active and persist it
    pub fn set(&mut self, theme: Theme) {
        self.apply(theme);
        self.persist(theme);
    }

    /// Forget the saved preference and follow the system again
    pub fn reset(&mut self) -> Theme {
        if let Some(store) = &self.store {
            if let Err(e) = store.remove(&self.storage_key) {
                tracing::warn!("Failed to clear theme preference: {}", e);
            }
        }
        let theme = self.system.theme();
        self.apply(theme);
        theme
    }

    /// React to a system color scheme change.
    ///
    /// Only followed while the user has not saved a preference.
    pub fn on_system_change(&mut self, theme: Theme) {
        if self.saved().is_none() {
            self.apply(theme);
        }
    }

    /// Message that sets the widget to the current theme
    pub fn message(&self) -> GiscusMessage {
        GiscusMessage::set_theme(self.current)
    }

    fn persist(&self, theme: Theme) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.set(&self.storage_key, theme.as_str()) {
            tracing::warn!("Failed to save theme preference: {}", e);
        }
    }

    fn notify_frame(&self) {
        if let Some(frame) = self.frame.as_ref().filter(|f| f.is_present()) {
            frame.post_message(&self.message(), GISCUS_ORIGIN);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{FixedPreference, MemoryStore, StoreError};
    use std::sync::{Arc, Mutex};

    const KEY: &str = "blog-theme";

    /// Store whose every operation fails, like disabled browser storage
    struct BrokenStore;

    impl PreferenceStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("disabled".to_string()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disabled".to_string()))
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disabled".to_string()))
        }
    }

    /// Shares its store so tests can inspect what was persisted
    struct SharedStore(Arc<MemoryStore>);

    impl PreferenceStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.0.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.0.remove(key)
        }
    }

    #[derive(Clone, Default)]
    struct RecordingFrame {
        sent: Arc<Mutex<Vec<(GiscusMessage, String)>>>,
        present: bool,
    }

    impl CommentFrame for RecordingFrame {
        fn post_message(&self, message: &GiscusMessage, target_origin: &str) {
            self.sent
                .lock()
                .unwrap()
                .push((message.clone(), target_origin.to_string()));
        }

        fn is_present(&self) -> bool {
            self.present
        }
    }

    fn controller(store: Arc<MemoryStore>, system: Theme) -> ThemeController {
        ThemeController::new(
            Some(Box::new(SharedStore(store))),
            Box::new(FixedPreference(system)),
            KEY,
        )
    }

    #[test]
    fn test_initial_theme_prefers_saved() {
        let store = Arc::new(MemoryStore::new());
        store.set(KEY, "dark").unwrap();
        assert_eq!(controller(store, Theme::Light).current(), Theme::Dark);
    }

    #[test]
    fn test_initial_theme_falls_back_to_system() {
        let store = Arc::new(MemoryStore::new());
        assert_eq!(controller(store.clone(), Theme::Dark).current(), Theme::Dark);

        store.set(KEY, "sepia").unwrap();
        assert_eq!(controller(store, Theme::Light).current(), Theme::Light);
    }

    #[test]
    fn test_no_store_at_all() {
        let mut c = ThemeController::new(None, Box::new(FixedPreference(Theme::Dark)), KEY);
        assert_eq!(c.current(), Theme::Dark);
        assert_eq!(c.toggle(), Theme::Light);
        assert_eq!(c.saved(), None);
    }

    #[test]
    fn test_broken_store_is_swallowed() {
        let mut c = ThemeController::new(
            Some(Box::new(BrokenStore)),
            Box::new(FixedPreference(Theme::Light)),
            KEY,
        );
        assert_eq!(c.current(), Theme::Light);
        assert_eq!(c.toggle(), Theme::Dark);
        assert_eq!(c.current(), Theme::Dark);
        assert_eq!(c.reset(), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut c = controller(store.clone(), Theme::Light);

        assert_eq!(c.toggle(), Theme::Dark);
        assert_eq!(store.get(KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(c.toggle(), Theme::Light);
        assert_eq!(store.get(KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_system_change_only_without_saved_preference() {
        let store = Arc::new(MemoryStore::new());
        let mut c = controller(store.clone(), Theme::Light);

        c.on_system_change(Theme::Dark);
        assert_eq!(c.current(), Theme::Dark);

        c.set(Theme::Light);
        c.on_system_change(Theme::Dark);
        assert_eq!(c.current(), Theme::Light);

        c.reset();
        assert_eq!(store.get(KEY).unwrap(), None);
        c.on_system_change(Theme::Dark);
        assert_eq!(c.current(), Theme::Dark);
    }

    #[test]
    fn test_frame_notified_only_when_present() {
        let store = Arc::new(MemoryStore::new());
        let mut c = controller(store, Theme::Light);

        let absent = RecordingFrame::default();
        c.attach_frame(Box::new(absent.clone()));
        c.toggle();
        assert!(absent.sent.lock().unwrap().is_empty());

        let frame = RecordingFrame {
            present: true,
            ..Default::default()
        };
        c.attach_frame(Box::new(frame.clone()));
        c.toggle();

        let sent = frame.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, GiscusMessage::set_theme(Theme::Light));
        assert_eq!(sent[0].1, GISCUS_ORIGIN);
    }
}
