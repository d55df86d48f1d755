//! Authors of primitive versions.
//!
//! Authors are deduplicated per import: every primitive written by the same
//! numeric user id shares one [`User`] record in the [`UserRegistry`].

use std::collections::HashMap;

/// Identity of an author.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UserKey {
    /// A server account with a numeric user id.
    Osm(i64),
    /// An anonymous author known only by display name.
    Local(String),
}

/// An author and every display name seen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    key: UserKey,
    names: Vec<String>,
}

impl User {
    /// Identity of the author.
    #[must_use]
    pub const fn key(&self) -> &UserKey {
        &self.key
    }

    /// Display names in the order they were first seen.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The first display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    fn remember(&mut self, name: &str) {
        if !self.names.iter().any(|known| known == name) {
            self.names.push(name.to_owned());
        }
    }
}

/// Deduplicating store of authors.
///
/// # Examples
/// ```
/// use waymark_core::{UserKey, UserRegistry};
///
/// let mut users = UserRegistry::default();
/// let first = users.osm_user(42, Some("alice"));
/// let second = users.osm_user(42, Some("alice_renamed"));
///
/// assert_eq!(first, second);
/// assert_eq!(users.len(), 1);
/// let names = users.get(&UserKey::Osm(42)).map(|user| user.names().len());
/// assert_eq!(names, Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRegistry {
    users: HashMap<UserKey, User>,
}

impl UserRegistry {
    /// Register (or reuse) a server account.
    pub fn osm_user(&mut self, uid: i64, name: Option<&str>) -> UserKey {
        let key = UserKey::Osm(uid);
        let user = self.users.entry(key.clone()).or_insert_with(|| User {
            key: key.clone(),
            names: Vec::new(),
        });
        if let Some(name) = name {
            user.remember(name);
        }
        key
    }

    /// Register (or reuse) an anonymous author.
    pub fn local_user(&mut self, name: &str) -> UserKey {
        let key = UserKey::Local(name.to_owned());
        self.users.entry(key.clone()).or_insert_with(|| User {
            key: key.clone(),
            names: vec![name.to_owned()],
        });
        key
    }

    /// Look up an author.
    #[must_use]
    pub fn get(&self, key: &UserKey) -> Option<&User> {
        self.users.get(key)
    }

    /// Number of distinct authors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no author has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Iterate over all authors in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn local_users_are_keyed_by_name() {
        let mut users = UserRegistry::default();
        let first = users.local_user("mapper");
        let second = users.local_user("mapper");
        let other = users.local_user("someone");
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(users.len(), 2);
    }

    #[rstest]
    fn osm_user_without_name_has_no_display_name() {
        let mut users = UserRegistry::default();
        let key = users.osm_user(7, None);
        let user = users.get(&key).expect("user registered");
        assert_eq!(user.name(), None);
    }

    #[rstest]
    fn repeated_names_are_recorded_once() {
        let mut users = UserRegistry::default();
        users.osm_user(7, Some("bob"));
        let key = users.osm_user(7, Some("bob"));
        let user = users.get(&key).expect("user registered");
        assert_eq!(user.names(), ["bob".to_owned()]);
    }
}
