use crate::api::{Page, PageApi, QueryPage};
use crate::config::Config;
use crate::error::{Result, WorkoutError};
use crate::ids::PageId;
use crate::properties::PropertyBag;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// HTTP implementation of [`PageApi`] against the hosted page database.
///
/// Every request carries bearer authorization and the pinned API version
/// header. A non-2xx answer becomes [`WorkoutError::Api`] with the response
/// body kept as the diagnostic.
#[derive(Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    version: String,
}

/// Property names and types of a database, for schema inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseSchema {
    pub id: String,
    pub title: String,
    /// `(name, type)` pairs sorted by name.
    pub properties: Vec<(String, String)>,
}

#[derive(Deserialize)]
struct RawDatabase {
    id: String,
    #[serde(default)]
    title: Vec<serde_json::Value>,
    #[serde(default)]
    properties: PropertyBag,
}

impl NotionClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            version: config.notion_version.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.version)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(operation, status = status.as_u16(), "page API error: {body}");
            return Err(WorkoutError::Api {
                operation,
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// `GET /databases/{id}`: the property names and types of a database.
    pub async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseSchema> {
        let raw: RawDatabase = self
            .send(
                "retrieve database",
                self.request(Method::GET, &format!("databases/{database_id}")),
            )
            .await?;

        let title = raw
            .title
            .iter()
            .filter_map(|t| t.get("plain_text").and_then(|p| p.as_str()))
            .collect::<String>();
        let mut properties: Vec<(String, String)> = raw
            .properties
            .iter()
            .map(|(name, value)| {
                let kind = value
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("unknown");
                (name.clone(), kind.to_string())
            })
            .collect();
        properties.sort();

        Ok(DatabaseSchema {
            id: raw.id,
            title,
            properties,
        })
    }
}

impl PageApi for NotionClient {
    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<QueryPage> {
        let body = match start_cursor {
            Some(cursor) => serde_json::json!({ "start_cursor": cursor }),
            None => serde_json::json!({}),
        };
        let request = self
            .request(Method::POST, &format!("databases/{database_id}/query"))
            .json(&body);
        self.send("query database", request).await
    }

    async fn retrieve_page(&self, page_id: &PageId) -> Result<Page> {
        let request = self.request(Method::GET, &format!("pages/{page_id}"));
        self.send("retrieve page", request).await
    }

    async fn create_page(&self, database_id: &str, properties: PropertyBag) -> Result<Page> {
        let body = serde_json::json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });
        tracing::debug!("creating page: {body}");
        let request = self.request(Method::POST, "pages").json(&body);
        self.send("create page", request).await
    }
}
