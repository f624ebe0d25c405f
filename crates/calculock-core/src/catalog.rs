//! App identifiers and the catalog of blockable apps.
//!
//! The catalog is an immutable value handed to the [`Blocker`](crate::Blocker)
//! at construction. The standard catalog mirrors the mock app list of the
//! mobile app; tests and config can supply smaller or different ones.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier naming an application.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for AppId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Apps offered by the standard catalog, in display order.
pub const STANDARD_APPS: [&str; 15] = [
    "Instagram", "TikTok", "Facebook", "Twitter", "YouTube",
    "Snapchat", "WhatsApp", "Telegram", "Discord", "Reddit",
    "Netflix", "Spotify", "Games", "Safari", "Chrome",
];

/// Ordered, duplicate-free list of apps that can be blocked or categorised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCatalog {
    apps: Vec<AppId>,
}

impl AppCatalog {
    /// Build a catalog from names. Later duplicates are dropped.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<AppId>,
    {
        let mut apps: Vec<AppId> = Vec::new();
        for app in names.into_iter().map(Into::into) {
            if !apps.contains(&app) {
                apps.push(app);
            }
        }
        Self { apps }
    }

    /// The fixed 15-app catalog.
    pub fn standard() -> Self {
        Self::new(STANDARD_APPS)
    }

    pub fn apps(&self) -> &[AppId] {
        &self.apps
    }

    pub fn contains(&self, app: &AppId) -> bool {
        self.apps.contains(app)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Look up an app by name, ignoring ASCII case.
    ///
    /// Lets the shell accept `tiktok` for `TikTok`.
    pub fn find(&self, name: &str) -> Option<&AppId> {
        self.apps
            .iter()
            .find(|app| app.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl Default for AppCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
