//! User-defined groupings of apps.
//!
//! Categories are keyed by a trimmed, non-empty name and hold an ordered,
//! duplicate-free member list. Listing is lexicographic so displays are
//! stable; member order is insertion order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{AppCatalog, AppId};
use crate::error::CategoryError;

/// Default categories seeded on first use.
pub const DEFAULT_CATEGORIES: [(&str, &[&str]); 5] = [
    ("Social Media", &["Instagram", "TikTok", "Facebook", "Twitter", "Snapchat"]),
    ("Entertainment", &["YouTube", "Netflix", "Spotify"]),
    ("Messaging", &["WhatsApp", "Telegram", "Discord"]),
    ("Games", &["Games"]),
    ("Browsers", &["Safari", "Chrome"]),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStore {
    categories: BTreeMap<String, Vec<AppId>>,
}

impl CategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with [`DEFAULT_CATEGORIES`].
    pub fn with_defaults() -> Self {
        let categories = DEFAULT_CATEGORIES
            .iter()
            .map(|(name, apps)| {
                (
                    (*name).to_string(),
                    apps.iter().map(|app| AppId::from(*app)).collect(),
                )
            })
            .collect();
        Self { categories }
    }

    /// Create an empty category. The name is trimmed first.
    pub fn create_category(&mut self, name: &str) -> Result<(), CategoryError> {
        let name = normalize_name(name)?;
        if self.categories.contains_key(&name) {
            return Err(CategoryError::DuplicateName(name));
        }
        debug!(category = %name, "category created");
        self.categories.insert(name, Vec::new());
        Ok(())
    }

    /// Remove a category. Returns `false` if it did not exist.
    pub fn delete_category(&mut self, name: &str) -> bool {
        let removed = self.categories.remove(name).is_some();
        if removed {
            debug!(category = %name, "category deleted");
        }
        removed
    }

    /// Rename a category, keeping its members and their order.
    pub fn rename_category(&mut self, old: &str, new: &str) -> Result<(), CategoryError> {
        if !self.categories.contains_key(old) {
            return Err(CategoryError::UnknownCategory(old.to_string()));
        }
        let new = normalize_name(new)?;
        if new == old {
            return Ok(());
        }
        if self.categories.contains_key(&new) {
            return Err(CategoryError::DuplicateName(new));
        }
        if let Some(members) = self.categories.remove(old) {
            debug!(from = %old, to = %new, "category renamed");
            self.categories.insert(new, members);
        }
        Ok(())
    }

    /// Append an app to a category.
    pub fn add_app(&mut self, category: &str, app: AppId) -> Result<(), CategoryError> {
        let members = self
            .categories
            .get_mut(category)
            .ok_or_else(|| CategoryError::UnknownCategory(category.to_string()))?;
        if members.contains(&app) {
            return Err(CategoryError::AlreadyMember {
                category: category.to_string(),
                app,
            });
        }
        members.push(app);
        Ok(())
    }

    /// Remove an app from a category. Returns `false` if nothing changed.
    pub fn remove_app(&mut self, category: &str, app: &AppId) -> bool {
        match self.categories.get_mut(category) {
            Some(members) => {
                let before = members.len();
                members.retain(|member| member != app);
                members.len() != before
            }
            None => false,
        }
    }

    /// Category names in lexicographic order.
    pub fn list_categories(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    pub fn members(&self, category: &str) -> Option<&[AppId]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    pub fn app_count(&self, category: &str) -> Option<usize> {
        self.categories.get(category).map(Vec::len)
    }

    /// Catalog apps not yet in `category`, in catalog order.
    pub fn available_apps(
        &self,
        category: &str,
        catalog: &AppCatalog,
    ) -> Result<Vec<AppId>, CategoryError> {
        let members = self
            .members(category)
            .ok_or_else(|| CategoryError::UnknownCategory(category.to_string()))?;
        Ok(catalog
            .apps()
            .iter()
            .filter(|app| !members.contains(app))
            .cloned()
            .collect())
    }

    /// Drop members that fall outside `catalog` from every category.
    pub fn restrict_to(&mut self, catalog: &AppCatalog) {
        for members in self.categories.values_mut() {
            members.retain(|app| catalog.contains(app));
        }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn normalize_name(name: &str) -> Result<String, CategoryError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CategoryError::EmptyName);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(name: &str) -> AppId {
        AppId::from(name)
    }

    #[test]
    fn duplicate_and_blank_names_rejected() {
        let mut store = CategoryStore::new();
        store.create_category("Social").unwrap();
        assert_eq!(
            store.create_category("Social"),
            Err(CategoryError::DuplicateName("Social".into()))
        );
        assert_eq!(
            store.create_category("  Social "),
            Err(CategoryError::DuplicateName("Social".into()))
        );
        assert_eq!(store.create_category("  "), Err(CategoryError::EmptyName));
        assert_eq!(store.create_category(""), Err(CategoryError::EmptyName));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_app_twice_is_already_member() {
        let mut store = CategoryStore::new();
        store.create_category("Social").unwrap();
        store.add_app("Social", app("TikTok")).unwrap();
        assert_eq!(
            store.add_app("Social", app("TikTok")),
            Err(CategoryError::AlreadyMember {
                category: "Social".into(),
                app: app("TikTok"),
            })
        );
        assert_eq!(store.members("Social"), Some(&[app("TikTok")][..]));
    }

    #[test]
    fn add_to_missing_category_fails() {
        let mut store = CategoryStore::new();
        assert_eq!(
            store.add_app("Nope", app("Reddit")),
            Err(CategoryError::UnknownCategory("Nope".into()))
        );
    }

    #[test]
    fn members_keep_insertion_order() {
        let mut store = CategoryStore::new();
        store.create_category("Mixed").unwrap();
        for name in ["Safari", "Discord", "Games"] {
            store.add_app("Mixed", app(name)).unwrap();
        }
        assert_eq!(
            store.members("Mixed").unwrap(),
            &[app("Safari"), app("Discord"), app("Games")]
        );
    }

    #[test]
    fn listing_is_sorted() {
        let mut store = CategoryStore::new();
        store.create_category("B").unwrap();
        store.create_category("A").unwrap();
        assert_eq!(store.list_categories(), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn delete_and_remove_are_idempotent() {
        let mut store = CategoryStore::new();
        store.create_category("Games").unwrap();
        store.add_app("Games", app("Games")).unwrap();

        assert!(store.remove_app("Games", &app("Games")));
        assert!(!store.remove_app("Games", &app("Games")));
        assert!(!store.remove_app("Missing", &app("Games")));

        assert!(store.delete_category("Games"));
        assert!(!store.delete_category("Games"));
        assert!(store.is_empty());
    }

    #[test]
    fn rename_preserves_members() {
        let mut store = CategoryStore::with_defaults();
        store.rename_category("Games", "  Play ").unwrap();
        assert!(!store.contains("Games"));
        assert_eq!(store.members("Play"), Some(&[app("Games")][..]));

        assert_eq!(
            store.rename_category("Play", "Browsers"),
            Err(CategoryError::DuplicateName("Browsers".into()))
        );
        assert_eq!(
            store.rename_category("Missing", "X"),
            Err(CategoryError::UnknownCategory("Missing".into()))
        );
        assert_eq!(store.rename_category("Play", " "), Err(CategoryError::EmptyName));
        assert!(store.rename_category("Play", "Play").is_ok());
    }

    #[test]
    fn defaults_are_seeded() {
        let store = CategoryStore::with_defaults();
        assert_eq!(
            store.list_categories(),
            vec!["Browsers", "Entertainment", "Games", "Messaging", "Social Media"]
        );
        assert_eq!(store.app_count("Social Media"), Some(5));
    }

    #[test]
    fn available_apps_excludes_members() {
        let store = CategoryStore::with_defaults();
        let catalog = AppCatalog::standard();
        let available = store.available_apps("Browsers", &catalog).unwrap();
        assert_eq!(available.len(), 13);
        assert!(!available.contains(&app("Safari")));
        assert_eq!(available[0], app("Instagram"));
        assert!(store.available_apps("Missing", &catalog).is_err());
    }

    #[test]
    fn restrict_drops_apps_outside_catalog() {
        let mut store = CategoryStore::with_defaults();
        store.restrict_to(&AppCatalog::new(["Safari", "Games"]));
        assert_eq!(store.members("Browsers"), Some(&[app("Safari")][..]));
        assert_eq!(store.app_count("Social Media"), Some(0));
        assert_eq!(store.len(), 5);
    }
}
