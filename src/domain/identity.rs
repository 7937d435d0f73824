use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including user management
    Admin,
    /// Runs the newsroom; shares financial duties with admins
    ChiefEditor,
    /// Manages content and categories
    Editor,
    /// Writes articles, gets paid per order
    Author,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ChiefEditor => "chief_editor",
            Role::Editor => "editor",
            Role::Author => "author",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "chief_editor" => Some(Role::ChiefEditor),
            "editor" => Some(Role::Editor),
            "author" => Some(Role::Author),
            _ => None,
        }
    }

    /// Roles allowed to touch the ledger directly. Payouts and manual
    /// entries move real money, so only the top of the masthead qualifies.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::ChiefEditor)
    }

    /// Roles that can edit shared content (categories, other people's articles).
    pub fn is_editorial(&self) -> bool {
        matches!(self, Role::Admin | Role::ChiefEditor | Role::Editor)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(email: String, name: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            role,
            created_at: Utc::now(),
            archived_at: None,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// The caller-facing identity snapshot for this user.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Who is performing an operation. Carried by value through the service
/// layer; the role here is what the caller claims, and privileged paths
/// re-check it against the stored user record before acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Admin, Role::ChiefEditor, Role::Editor, Role::Author] {
            let s = role.as_str();
            let parsed = Role::from_str(s).unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_privileged_roles() {
        assert!(Role::Admin.is_privileged());
        assert!(Role::ChiefEditor.is_privileged());
        assert!(!Role::Editor.is_privileged());
        assert!(!Role::Author.is_privileged());
    }

    #[test]
    fn test_editorial_roles() {
        assert!(Role::Editor.is_editorial());
        assert!(!Role::Author.is_editorial());
    }

    #[test]
    fn test_identity_snapshot() {
        let user = User::new("ivan@vestnik.bg".into(), "Ivan Petrov".into(), Role::Author);
        let identity = user.identity();
        assert_eq!(identity.id, user.id);
        assert_eq!(identity.role, Role::Author);
    }
}
