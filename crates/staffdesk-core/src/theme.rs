//! Dark/light preference, persisted in its own storage namespace.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::storage::KeyValueStore;

pub const THEME_NAMESPACE: &str = "theme-storage";
const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ThemeStore {
    store: Arc<dyn KeyValueStore>,
}

impl ThemeStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored preference; unknown or missing values fall back to dark.
    ///
    /// # Errors
    /// Returns an error if the namespace cannot be read.
    pub fn current(&self) -> Result<Theme> {
        let stored = self.store.get(THEME_NAMESPACE, THEME_KEY)?;
        Ok(stored.as_deref().and_then(Theme::parse).unwrap_or_default())
    }

    /// # Errors
    /// Returns an error if the preference cannot be written.
    pub fn set(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_NAMESPACE, THEME_KEY, theme.as_str())
    }

    /// Flips and persists the preference, returning the new value.
    ///
    /// # Errors
    /// Returns an error if the preference cannot be read or written.
    pub fn toggle(&self) -> Result<Theme> {
        let next = self.current()?.toggled();
        self.set(next)?;
        Ok(next)
    }
}
