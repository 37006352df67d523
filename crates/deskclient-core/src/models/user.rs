use serde::{Deserialize, Serialize};

/// Role names that grant every permission
const ADMIN_ROLE_NAMES: &[&str] = &["Администратор", "Admin"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Permission {
    pub name: String,
    pub resource: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        ADMIN_ROLE_NAMES.contains(&self.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }

    /// Admins may do anything; everyone else needs a matching permission.
    pub fn has_permission(&self, resource: &str, action: &str) -> bool {
        if self.is_admin() {
            return true;
        }
        self.permissions
            .iter()
            .any(|p| p.resource == resource && p.action == action)
    }

    /// Full name when known, username otherwise
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Body returned by login and token refresh.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_user(json: &str) -> User {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_full_user() {
        let user = parse_user(
            r#"{
                "id": 12,
                "username": "ivanov",
                "email": "ivanov@example.com",
                "full_name": "Иван Иванов",
                "is_active": true,
                "last_login": null,
                "roles": [{"id": 3, "name": "Исполнитель", "description": "Works tickets"}],
                "permissions": [{"name": "tickets.read", "resource": "tickets", "action": "read"}]
            }"#,
        );
        assert_eq!(user.id, 12);
        assert_eq!(user.display_name(), "Иван Иванов");
        assert!(user.has_permission("tickets", "read"));
        assert!(!user.has_permission("tickets", "delete"));
        assert!(!user.has_permission("payments", "read"));
    }

    #[test]
    fn test_parse_sparse_user() {
        let user = parse_user(r#"{"id": 1, "username": "guest"}"#);
        assert!(user.is_active);
        assert!(user.roles.is_empty());
        assert_eq!(user.display_name(), "guest");
        assert!(!user.has_permission("tickets", "read"));
    }

    #[test]
    fn test_admin_roles_grant_everything() {
        for name in ["Администратор", "Admin"] {
            let user = User {
                id: 1,
                username: "root".into(),
                email: None,
                full_name: None,
                is_active: true,
                last_login: None,
                roles: vec![Role { id: 1, name: name.into(), description: None }],
                permissions: vec![],
            };
            assert!(user.has_permission("anything", "delete"), "role {}", name);
        }
    }

    #[test]
    fn test_login_response_debug_redacts_token() {
        let response: LoginResponse = serde_json::from_str(
            r#"{"token": "jwt-secret", "user": {"id": 1, "username": "a"}}"#,
        )
        .unwrap();
        assert!(!format!("{:?}", response).contains("jwt-secret"));
    }
}
