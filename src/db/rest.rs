//! Hosted backend: a PostgREST table API plus the auth admin API.
//!
//! Tables live under `{base}/rest/v1/{table}` and users under
//! `{base}/auth/v1/admin/users`. The service credential is sent as both the
//! `apikey` header and a bearer token.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::{AuthUser, CreateAuthUser};

use super::{Database, Filter, Row};

/// Ask PostgREST to echo affected rows back.
const PREFER_REPRESENTATION: &str = "return=representation";

#[derive(Debug, Deserialize)]
struct UserList {
    users: Vec<AuthUser>,
}

#[derive(Debug, Clone)]
pub struct RestDatabase {
    client: Client,
    base_url: Url,
}

impl RestDatabase {
    pub fn new(url: &Url, service_key: &str) -> Result<Self> {
        let mut base_url = url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let invalid_key = |_| AppError::Internal("service key is not a valid header value".into());
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(service_key).map_err(invalid_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", service_key)).map_err(invalid_key)?,
        );

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Internal(format!("Invalid endpoint {}: {}", path, e)))
    }

    pub fn table_url(&self, table: &str) -> Result<Url> {
        self.endpoint(&format!("rest/v1/{}", table))
    }

    fn users_url(&self) -> Result<Url> {
        self.endpoint("auth/v1/admin/users")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::Database(error_message(status.as_u16(), &body)))
    }

    async fn rows(&self, request: RequestBuilder) -> Result<Vec<Row>> {
        Ok(self.send(request).await?.json::<Vec<Row>>().await?)
    }
}

/// Pull the human-readable message out of a PostgREST / auth error body.
fn error_message(status: u16, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str))
        })
        .map(String::from)
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("HTTP {}", status)
            } else {
                body.to_string()
            }
        })
}

fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(Filter::to_query_pair).collect()
}

#[async_trait]
impl Database for RestDatabase {
    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>> {
        let request = self
            .client
            .get(self.table_url(table)?)
            .query(&[("select", "*")])
            .query(&filter_pairs(filters));
        self.rows(request).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>> {
        let body: Vec<Value> = rows.into_iter().map(Value::Object).collect();
        let request = self
            .client
            .post(self.table_url(table)?)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&body);
        self.rows(request).await
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> Result<Vec<Row>> {
        let request = self
            .client
            .patch(self.table_url(table)?)
            .query(&filter_pairs(filters))
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&Value::Object(patch));
        self.rows(request).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<usize> {
        let request = self
            .client
            .delete(self.table_url(table)?)
            .query(&filter_pairs(filters))
            .header("Prefer", PREFER_REPRESENTATION);
        Ok(self.rows(request).await?.len())
    }

    async fn list_auth_users(&self) -> Result<Vec<AuthUser>> {
        let request = self.client.get(self.users_url()?);
        let list: UserList = self.send(request).await?.json().await?;
        Ok(list.users)
    }

    async fn create_auth_user(&self, input: &CreateAuthUser) -> Result<AuthUser> {
        let request = self.client.post(self.users_url()?).json(input);
        Ok(self.send(request).await?.json().await?)
    }

    async fn update_auth_user_password(&self, user_id: &str, password: &str) -> Result<AuthUser> {
        let url = self.endpoint(&format!("auth/v1/admin/users/{}", user_id))?;
        let request = self.client.put(url).json(&json!({ "password": password }));
        Ok(self.send(request).await?.json().await?)
    }
}
