use crate::storage::{StorageContext, StorageError, AUTH_TOKEN_KEY, REMEMBER_ME_KEY};

/// Which storage scope is authoritative for the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Persistent,
    Session,
}

impl TokenSource {
    fn from_remember_me(flag: Option<&str>) -> Self {
        if flag == Some("true") {
            TokenSource::Persistent
        } else {
            TokenSource::Session
        }
    }
}

impl std::fmt::Display for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Persistent => write!(f, "persistent"),
            TokenSource::Session => write!(f, "session"),
        }
    }
}

/// A token together with the scope it was read from.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub source: TokenSource,
    pub token: String,
}

// Keep token values out of debug output and logs
impl std::fmt::Debug for ResolvedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedToken")
            .field("source", &self.source)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl StorageContext {
    /// Read the remember-me flag and pick the authoritative scope.
    pub fn token_source(&self) -> Result<TokenSource, StorageError> {
        let flag = self.persistent.get(REMEMBER_ME_KEY)?;
        Ok(TokenSource::from_remember_me(flag.as_deref()))
    }

    /// Look up the token in the authoritative scope. Read-only.
    /// An empty stored value counts as no token.
    pub fn resolve_token(&self) -> Result<Option<ResolvedToken>, StorageError> {
        let source = self.token_source()?;
        let token = match source {
            TokenSource::Persistent => self.persistent.get(AUTH_TOKEN_KEY)?,
            TokenSource::Session => self.session.get(AUTH_TOKEN_KEY)?,
        };
        Ok(token
            .filter(|t| !t.is_empty())
            .map(|token| ResolvedToken { source, token }))
    }

    /// Record a fresh login. Remembered logins go to the persistent scope
    /// and set the flag; others go to the session scope and clear it.
    pub fn store_login(&self, token: &str, remember_me: bool) -> Result<(), StorageError> {
        if remember_me {
            self.persistent.set(AUTH_TOKEN_KEY, token)?;
            self.persistent.set(REMEMBER_ME_KEY, "true")?;
        } else {
            self.session.set(AUTH_TOKEN_KEY, token)?;
            self.persistent.remove(REMEMBER_ME_KEY)?;
        }
        Ok(())
    }

    /// Overwrite the token in whichever scope is currently authoritative.
    pub fn replace_token(&self, token: &str) -> Result<TokenSource, StorageError> {
        let source = self.token_source()?;
        match source {
            TokenSource::Persistent => self.persistent.set(AUTH_TOKEN_KEY, token)?,
            TokenSource::Session => self.session.set(AUTH_TOKEN_KEY, token)?,
        }
        Ok(source)
    }

    /// Forget the token in both scopes along with the flag.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.persistent.remove(AUTH_TOKEN_KEY)?;
        self.session.remove(AUTH_TOKEN_KEY)?;
        self.persistent.remove(REMEMBER_ME_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn context(
        persistent: &[(&str, &str)],
        session: &[(&str, &str)],
    ) -> (StorageContext, Arc<MemoryStore>, Arc<MemoryStore>) {
        let p = Arc::new(MemoryStore::with_entries(persistent.iter().copied()));
        let s = Arc::new(MemoryStore::with_entries(session.iter().copied()));
        (StorageContext::new(p.clone(), s.clone()), p, s)
    }

    #[test]
    fn test_remember_me_selects_persistent() {
        let (ctx, _, _) = context(
            &[("remember_me", "true"), ("auth_token", "persistent-token")],
            &[("auth_token", "session-token")],
        );
        let resolved = ctx.resolve_token().unwrap().unwrap();
        assert_eq!(resolved.source, TokenSource::Persistent);
        assert_eq!(resolved.token, "persistent-token");
    }

    #[test]
    fn test_flag_must_be_exactly_true() {
        for flag in ["TRUE", "1", "yes", "false", ""] {
            let (ctx, _, _) = context(
                &[("remember_me", flag), ("auth_token", "persistent-token")],
                &[("auth_token", "session-token")],
            );
            let resolved = ctx.resolve_token().unwrap().unwrap();
            assert_eq!(resolved.source, TokenSource::Session, "flag {:?}", flag);
            assert_eq!(resolved.token, "session-token");
        }
    }

    #[test]
    fn test_missing_flag_ignores_persistent_token() {
        let (ctx, _, _) = context(&[("auth_token", "persistent-token")], &[]);
        assert_eq!(ctx.token_source().unwrap(), TokenSource::Session);
        assert!(ctx.resolve_token().unwrap().is_none());
    }

    #[test]
    fn test_remembered_but_no_token() {
        let (ctx, _, _) = context(&[("remember_me", "true")], &[("auth_token", "session-token")]);
        assert!(ctx.resolve_token().unwrap().is_none());
    }

    #[test]
    fn test_empty_token_counts_as_missing() {
        let (ctx, _, _) = context(&[("remember_me", "true"), ("auth_token", "")], &[]);
        assert!(ctx.resolve_token().unwrap().is_none());

        let (ctx, _, _) = context(&[], &[("auth_token", "")]);
        assert!(ctx.resolve_token().unwrap().is_none());
    }

    #[test]
    fn test_resolve_is_read_only() {
        let (ctx, p, s) = context(
            &[("remember_me", "true"), ("auth_token", "t")],
            &[("auth_token", "u")],
        );
        let before = (p.snapshot().unwrap(), s.snapshot().unwrap());
        for _ in 0..3 {
            ctx.resolve_token().unwrap();
        }
        assert_eq!(before, (p.snapshot().unwrap(), s.snapshot().unwrap()));
    }

    #[test]
    fn test_store_login_remembered() {
        let (ctx, p, s) = context(&[], &[]);
        ctx.store_login("abc", true).unwrap();
        assert_eq!(p.get("auth_token").unwrap().as_deref(), Some("abc"));
        assert_eq!(p.get("remember_me").unwrap().as_deref(), Some("true"));
        assert_eq!(s.get("auth_token").unwrap(), None);
    }

    #[test]
    fn test_store_login_session_clears_flag() {
        let (ctx, p, s) = context(&[("remember_me", "true")], &[]);
        ctx.store_login("abc", false).unwrap();
        assert_eq!(p.get("remember_me").unwrap(), None);
        assert_eq!(s.get("auth_token").unwrap().as_deref(), Some("abc"));
        assert_eq!(ctx.resolve_token().unwrap().unwrap().source, TokenSource::Session);
    }

    #[test]
    fn test_replace_token_follows_flag() {
        let (ctx, p, s) = context(&[("remember_me", "true"), ("auth_token", "old")], &[]);
        assert_eq!(ctx.replace_token("new").unwrap(), TokenSource::Persistent);
        assert_eq!(p.get("auth_token").unwrap().as_deref(), Some("new"));
        assert_eq!(s.get("auth_token").unwrap(), None);
    }

    #[test]
    fn test_clear_removes_everything() {
        let (ctx, p, s) = context(
            &[("remember_me", "true"), ("auth_token", "a"), ("other", "kept")],
            &[("auth_token", "b")],
        );
        ctx.clear().unwrap();
        assert_eq!(p.snapshot().unwrap().len(), 1);
        assert!(s.snapshot().unwrap().is_empty());
        assert!(ctx.resolve_token().unwrap().is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let resolved = ResolvedToken {
            source: TokenSource::Session,
            token: "super-secret".to_string(),
        };
        assert!(!format!("{:?}", resolved).contains("super-secret"));
    }
}
