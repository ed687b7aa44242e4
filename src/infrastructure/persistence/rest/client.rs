//! Client for a hosted PostgREST-style store.
//!
//! Each logical resource maps to `/rest/v1/<table>`. The client sees no
//! multi-statement transactions, so group creation uses the compensating
//! delete of the default `create_group_with_admin`.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::filter::{eq, ilike_any, in_list};
use crate::domain::error::DomainError;
use crate::domain::model::{
    AccountId, AccountProfile, Group, GroupId, GroupReminder, Membership, MembershipId, NewGroup,
    NewGroupReminder, NewMembership, ReminderId,
};
use crate::domain::repository::{
    AccountDirectory, GroupRepository, GroupStore, MembershipRepository, ReminderRepository,
    Result,
};
use crate::infrastructure::config::RestSettings;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

type Query = Vec<(&'static str, String)>;

#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Map a failed response to a domain error, keeping the server's message.
fn error_from_response(status: StatusCode, body: &str) -> DomainError {
    let parsed: PostgrestError = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.details)
        .unwrap_or_else(|| body.trim().to_string());

    // PostgREST answers 409 for foreign-key failures too
    if parsed.code.as_deref() == Some(UNIQUE_VIOLATION) {
        return DomainError::Conflict(message);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return DomainError::Forbidden(message);
    }
    DomainError::Remote(message)
}

pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

impl RestStore {
    pub fn new(settings: &RestSettings) -> anyhow::Result<Self> {
        if settings.base_url.is_empty() {
            anyhow::bail!("storage.rest.base_url is not set");
        }

        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            access_token: settings.access_token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);

        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!("Store request failed with status {}: {}", status, body);
        Err(error_from_response(status, &body))
    }

    async fn insert<B, T>(&self, table: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(body);
        let mut rows: Vec<T> = self.send(builder).await?.json().await?;

        if rows.is_empty() {
            return Err(DomainError::Remote(format!(
                "insert into {} returned no row",
                table
            )));
        }
        Ok(rows.swap_remove(0))
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, mut query: Query) -> Result<Vec<T>> {
        query.push(("select", "*".to_string()));
        let builder = self.request(Method::GET, table).query(&query);
        Ok(self.send(builder).await?.json().await?)
    }

    async fn delete(&self, table: &str, query: Query) -> Result<()> {
        let builder = self.request(Method::DELETE, table).query(&query);
        self.send(builder).await?;
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for RestStore {
    async fn insert_group(&self, group: &NewGroup) -> Result<Group> {
        self.insert("groups", group).await
    }

    async fn find_groups(&self, ids: &[GroupId]) -> Result<Vec<Group>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = vec![
            ("id", in_list(ids.iter().map(GroupId::as_str))),
            ("order", "created_at.desc".to_string()),
        ];
        self.select("groups", query).await
    }

    async fn delete_group(&self, id: &GroupId) -> Result<()> {
        // Foreign keys cascade server-side
        self.delete("groups", vec![("id", eq(id.as_str()))]).await
    }
}

#[async_trait]
impl MembershipRepository for RestStore {
    async fn insert_membership(&self, membership: &NewMembership) -> Result<Membership> {
        self.insert("memberships", membership).await
    }

    async fn memberships_for_account(&self, user_id: &AccountId) -> Result<Vec<Membership>> {
        let query = vec![
            ("user_id", eq(user_id.as_str())),
            ("order", "joined_at.asc".to_string()),
        ];
        self.select("memberships", query).await
    }

    async fn memberships_for_groups(&self, group_ids: &[GroupId]) -> Result<Vec<Membership>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = vec![
            ("group_id", in_list(group_ids.iter().map(GroupId::as_str))),
            ("order", "joined_at.asc".to_string()),
        ];
        self.select("memberships", query).await
    }

    async fn delete_membership(&self, id: &MembershipId) -> Result<()> {
        self.delete("memberships", vec![("id", eq(id.as_str()))])
            .await
    }

    async fn delete_membership_for(&self, group_id: &GroupId, user_id: &AccountId) -> Result<()> {
        let query = vec![
            ("group_id", eq(group_id.as_str())),
            ("user_id", eq(user_id.as_str())),
        ];
        self.delete("memberships", query).await
    }
}

#[async_trait]
impl ReminderRepository for RestStore {
    async fn insert_reminder(&self, reminder: &NewGroupReminder) -> Result<GroupReminder> {
        self.insert("group_reminders", reminder).await
    }

    async fn reminders_for_groups(&self, group_ids: &[GroupId]) -> Result<Vec<GroupReminder>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = vec![
            ("group_id", in_list(group_ids.iter().map(GroupId::as_str))),
            ("order", "time.asc,created_at.asc".to_string()),
        ];
        self.select("group_reminders", query).await
    }

    async fn delete_reminder(&self, id: &ReminderId) -> Result<()> {
        self.delete("group_reminders", vec![("id", eq(id.as_str()))])
            .await
    }
}

#[async_trait]
impl AccountDirectory for RestStore {
    async fn search_accounts(&self, term: &str, limit: usize) -> Result<Vec<AccountProfile>> {
        let query = vec![
            ("or", ilike_any(&["email", "name"], term)),
            ("order", "email.asc".to_string()),
            ("limit", limit.to_string()),
        ];
        self.select("profiles", query).await
    }
}

impl GroupStore for RestStore {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let body = r#"{"code":"23505","details":"Key (group_id, user_id)=(g, u) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"memberships_group_id_user_id_key\""}"#;
        let err = error_from_response(StatusCode::CONFLICT, body);
        assert!(err.is_conflict());
        assert!(err.user_message().contains("duplicate key"));
    }

    #[test]
    fn test_foreign_key_violation_is_not_a_conflict() {
        let body = r#"{"code":"23503","details":"Key (group_id)=(g) is not present in table \"groups\".","hint":null,"message":"insert or update on table \"memberships\" violates foreign key constraint \"memberships_group_id_fkey\""}"#;
        let err = error_from_response(StatusCode::CONFLICT, body);
        assert!(!err.is_conflict(), "got {:?}", err);
        assert!(err.user_message().contains("foreign key"));
    }

    #[test]
    fn test_permission_error_keeps_message() {
        let body = r#"{"code":"42501","message":"new row violates row-level security policy for table \"groups\""}"#;
        let err = error_from_response(StatusCode::FORBIDDEN, body);
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(err.user_message().contains("row-level security"));
    }

    #[test]
    fn test_unparseable_body_falls_back() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.user_message(), crate::domain::error::GENERIC_FAILURE);

        let err = error_from_response(StatusCode::INTERNAL_SERVER_ERROR, "upstream timeout");
        assert_eq!(err.user_message(), "upstream timeout");
    }

    #[test]
    fn test_rejects_missing_base_url() {
        let settings = RestSettings::default();
        assert!(RestStore::new(&settings).is_err());
    }

    #[test]
    fn test_deserializes_store_rows() {
        let json = r#"[{"id":"r1","group_id":"g1","title":"Stretch","why":null,"time":"09:00:00","repeat":"daily","active":true,"created_by":"u1","created_at":"2024-05-01T08:00:00.123456+00:00"}]"#;
        let rows: Vec<GroupReminder> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].time.to_string(), "09:00");
    }
}
