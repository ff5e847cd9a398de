//! User identity type for core messages.

use serde::{Deserialize, Serialize};

/// User identity (id, username, names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// First and last name joined by a space; falls back to `@username`, then `"there"`.
    pub fn full_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !name.is_empty() {
            return name;
        }
        match self.username.as_deref() {
            Some(u) if !u.is_empty() => format!("@{}", u),
            _ => "there".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>, username: Option<&str>) -> User {
        User {
            id: 1,
            username: username.map(String::from),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
        }
    }

    #[test]
    fn full_name_joins_first_and_last() {
        assert_eq!(user(Some("Ada"), Some("Lovelace"), None).full_name(), "Ada Lovelace");
        assert_eq!(user(Some("Ada"), None, Some("ada")).full_name(), "Ada");
    }

    #[test]
    fn full_name_falls_back_to_username() {
        assert_eq!(user(None, None, Some("ada")).full_name(), "@ada");
        assert_eq!(user(Some(" "), None, None).full_name(), "there");
    }
}
