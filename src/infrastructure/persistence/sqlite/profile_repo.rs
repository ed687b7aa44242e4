use async_trait::async_trait;
use rusqlite::{params, Row};

use super::SqliteStore;
use crate::domain::model::{AccountId, AccountProfile};
use crate::domain::repository::{AccountDirectory, ProfileRegistry, Result};

fn map_profile(row: &Row) -> rusqlite::Result<AccountProfile> {
    Ok(AccountProfile {
        id: AccountId(row.get(0)?),
        email: row.get(1)?,
        name: row.get(2)?,
    })
}

/// Escape LIKE wildcards so the term is matched literally
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// A local database has no sign-up flow, so profiles are registered here.
#[async_trait]
impl ProfileRegistry for SqliteStore {
    async fn save_profile(&self, profile: &AccountProfile) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO profiles (id, email, name) VALUES (?, ?, ?)",
            params![profile.id.as_str(), profile.email, profile.name],
        )?;

        Ok(())
    }
}

#[async_trait]
impl AccountDirectory for SqliteStore {
    async fn search_accounts(&self, term: &str, limit: usize) -> Result<Vec<AccountProfile>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, email, name FROM profiles
             WHERE email LIKE ?1 ESCAPE '\\' OR name LIKE ?1 ESCAPE '\\'
             ORDER BY email ASC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![like_pattern(term), limit as i64], map_profile)?;

        let mut profiles = Vec::new();
        for profile in rows {
            profiles.push(profile?);
        }

        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ann"), "%ann%");
        assert_eq!(like_pattern("100%_"), "%100\\%\\_%");
    }

    #[tokio::test]
    async fn test_search_profiles() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .save_profile(&AccountProfile::new("u1", "ann@x.com", Some("Ann Lee")))
            .await
            .unwrap();
        store
            .save_profile(&AccountProfile::new("u2", "bob@y.com", None))
            .await
            .unwrap();

        // Saving again replaces the row
        store
            .save_profile(&AccountProfile::new("u2", "bob@y.com", Some("Bob")))
            .await
            .unwrap();
        let found = store.search_accounts("bob", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name.as_deref(), Some("Bob"));

        let found = store.search_accounts("ANN", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "u1");

        let found = store.search_accounts("lee", 10).await.unwrap();
        assert_eq!(found.len(), 1);

        let found = store.search_accounts("%", 10).await.unwrap();
        assert!(found.is_empty());
    }
}
