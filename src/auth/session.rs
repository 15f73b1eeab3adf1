use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROLE_KEY: &str = "userRole";
pub const USERNAME_KEY: &str = "username";

/// Key/value storage that holds the logged-in session between requests.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "viewer" => Ok(Role::Viewer),
            other => anyhow::bail!("unknown role `{other}`"),
        }
    }
}

/// What the current user may do. Computed once per request from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_mutate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    pub username: String,
}

impl Session {
    pub fn new(role: Role, username: impl Into<String>) -> Self {
        Self {
            role,
            username: username.into(),
        }
    }

    /// Reads the session. Missing keys or an unknown role mean "not logged in".
    pub fn load(store: &impl SessionStore) -> Option<Self> {
        let role = store.get(ROLE_KEY)?.parse::<Role>().ok()?;
        let username = store.get(USERNAME_KEY).filter(|u| !u.is_empty())?;
        Some(Self { role, username })
    }

    pub fn persist(&self, store: &mut impl SessionStore) {
        store.set(ROLE_KEY, self.role.as_str());
        store.set(USERNAME_KEY, &self.username);
    }

    pub fn clear(store: &mut impl SessionStore) {
        store.remove(ROLE_KEY);
        store.remove(USERNAME_KEY);
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            can_mutate: self.role == Role::Admin,
        }
    }
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore(std::collections::HashMap<String, String>);

#[cfg(test)]
impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.0.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_then_load() {
        let mut store = MemoryStore::default();
        Session::new(Role::Viewer, "viewer").persist(&mut store);
        assert_eq!(store.get(ROLE_KEY).as_deref(), Some("viewer"));
        assert_eq!(
            Session::load(&store),
            Some(Session::new(Role::Viewer, "viewer"))
        );
    }

    #[test]
    fn either_key_missing_means_no_session() {
        let mut store = MemoryStore::default();
        store.set(ROLE_KEY, "admin");
        assert_eq!(Session::load(&store), None);

        let mut store = MemoryStore::default();
        store.set(USERNAME_KEY, "admin");
        assert_eq!(Session::load(&store), None);
    }

    #[test]
    fn unknown_role_means_no_session() {
        let mut store = MemoryStore::default();
        store.set(ROLE_KEY, "superuser");
        store.set(USERNAME_KEY, "mallory");
        assert_eq!(Session::load(&store), None);
    }

    #[test]
    fn clear_removes_both_keys() {
        let mut store = MemoryStore::default();
        Session::new(Role::Admin, "admin").persist(&mut store);
        Session::clear(&mut store);
        assert_eq!(store.get(ROLE_KEY), None);
        assert_eq!(store.get(USERNAME_KEY), None);
        assert_eq!(Session::load(&store), None);
    }

    #[test]
    fn only_admin_can_mutate() {
        assert!(Session::new(Role::Admin, "admin").capabilities().can_mutate);
        assert!(!Session::new(Role::Viewer, "viewer").capabilities().can_mutate);
    }
}
