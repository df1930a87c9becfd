//! Firestore client module
//!
//! Provides `FirestoreClient`, a [`Datastore`] backed by the Firestore REST
//! API (v1). Write units become a single `documents:commit` request, which
//! Firestore applies atomically.

use super::Auth;
use super::value::encode_fields;
use crate::batch::{StagedWrite, WriteUnit};
use crate::store::{Datastore, DocumentId};
use async_trait::async_trait;
use eyre::{Context, Result, eyre};
use owo_colors::OwoColorize;
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// Default REST root for production Firestore
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1/";

/// Default database ID
pub const DEFAULT_DATABASE: &str = "(default)";

const LIST_PAGE_SIZE: &str = "300";

/// Firestore client for committing write units.
///
/// One client is built per run and shared by reference for every commit.
///
/// # Example
/// ```no_run
/// use seedr::client::{Auth, FirestoreClient};
/// use url::Url;
///
/// # fn example() -> eyre::Result<()> {
/// let url = Url::parse("http://localhost:8080/v1/")?;
/// let client = FirestoreClient::try_new(url, "demo-project", "(default)", Auth::Emulator)?;
/// assert_eq!(
///     client.document_name("banners", "abc"),
///     "projects/demo-project/databases/(default)/documents/banners/abc"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct FirestoreClient {
    client: Client,
    base_url: Url,
    project_id: String,
    database: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<DocumentName>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

impl FirestoreClient {
    /// Create a new FirestoreClient.
    ///
    /// # Arguments
    /// * `base_url` - REST root, e.g. `https://firestore.googleapis.com/v1/`
    /// * `project_id` - Google Cloud project ID
    /// * `database` - Database ID, usually `(default)`
    /// * `auth` - Authentication method
    ///
    /// # Errors
    /// Returns an error if:
    /// - The project or database ID is empty
    /// - The auth header is not a valid header value
    /// - The HTTP client cannot be built
    pub fn try_new(
        mut base_url: Url,
        project_id: impl Into<String>,
        database: impl Into<String>,
        auth: Auth,
    ) -> Result<Self> {
        let project_id = project_id.into();
        let database = database.into();
        if project_id.trim().is_empty() {
            eyre::bail!("Firestore project ID must not be empty");
        }
        if database.trim().is_empty() {
            eyre::bail!("Firestore database ID must not be empty");
        }

        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(value) = auth.header_value() {
            headers.insert(
                reqwest::header::AUTHORIZATION,
                value.parse().context("Invalid access token")?,
            );
        }
        log::debug!("Using {} auth against {}", auth, base_url);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            project_id,
            database,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `projects/{project}/databases/{database}`
    pub fn database_path(&self) -> String {
        format!("projects/{}/databases/{}", self.project_id, self.database)
    }

    /// Full resource name of a document
    pub fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/documents/{}/{}", self.database_path(), collection, id)
    }

    /// Build the `documents:commit` request body for a unit
    pub fn commit_body(&self, unit: &WriteUnit) -> Value {
        let writes: Vec<Value> = unit
            .writes()
            .iter()
            .map(|write| match write {
                StagedWrite::Set { id, record } => json!({
                    "update": {
                        "name": self.document_name(unit.collection(), id.as_str()),
                        "fields": encode_fields(record),
                    }
                }),
                StagedWrite::Delete { id } => json!({
                    "delete": self.document_name(unit.collection(), id.as_str()),
                }),
            })
            .collect();
        json!({ "writes": writes })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid Firestore path: {}", path))
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Response> {
        log::trace!("{} {}", method.as_str().green(), url);
        let mut request = self.client.request(method, url).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        request
            .send()
            .await
            .map_err(|e| eyre!("Failed to send request to Firestore: {}", e))
    }
}

/// Turn a non-success response into an error, preferring Google's message
async fn error_for_response(response: Response, action: &str) -> eyre::Report {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<GoogleErrorBody>(&body) {
        Ok(parsed) if !parsed.error.message.is_empty() => eyre!(
            "{} failed ({} {}): {}",
            action,
            status,
            parsed.error.status,
            parsed.error.message
        ),
        _ => eyre!("{} failed ({}): {}", action, status, body),
    }
}

#[async_trait]
impl Datastore for FirestoreClient {
    async fn commit(&self, unit: &WriteUnit) -> Result<()> {
        let url = self.endpoint(&format!("{}/documents:commit", self.database_path()))?;
        let body = self.commit_body(unit);

        log::debug!(
            "{} {} write(s) to '{}'",
            "COMMIT".green(),
            unit.len(),
            unit.collection().cyan()
        );

        let response = self.send(Method::POST, url, &[], Some(&body)).await?;
        if !response.status().is_success() {
            return Err(error_for_response(response, "Commit").await);
        }

        Ok(())
    }

    async fn list_document_ids(&self, collection: &str) -> Result<Vec<DocumentId>> {
        let url = self.endpoint(&format!("{}/documents/{}", self.database_path(), collection))?;
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", LIST_PAGE_SIZE), ("mask.fieldPaths", "__name__")];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let response = self.send(Method::GET, url.clone(), &query, None).await?;
            if !response.status().is_success() {
                return Err(error_for_response(response, "Listing documents").await);
            }

            let page: ListDocumentsResponse = response
                .json()
                .await
                .with_context(|| format!("Failed to parse document list for '{}'", collection))?;

            ids.extend(page.documents.into_iter().filter_map(|doc| {
                doc.name
                    .rsplit_once('/')
                    .map(|(_, id)| DocumentId::new(id))
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        log::debug!("Found {} document(s) in '{}'", ids.len(), collection.cyan());
        Ok(ids)
    }
}

impl std::fmt::Display for FirestoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.base_url, self.database_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Record;

    fn client(base: &str) -> FirestoreClient {
        let url = Url::parse(base).unwrap();
        FirestoreClient::try_new(url, "demo-shop", DEFAULT_DATABASE, Auth::None).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = client("http://localhost:8080/v1");
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/v1/");
        assert_eq!(
            client
                .endpoint("projects/demo-shop/databases/(default)/documents:commit")
                .unwrap()
                .as_str(),
            "http://localhost:8080/v1/projects/demo-shop/databases/(default)/documents:commit"
        );
    }

    #[test]
    fn test_empty_project_rejected() {
        let url = Url::parse(DEFAULT_BASE_URL).unwrap();
        let err = FirestoreClient::try_new(url, "", DEFAULT_DATABASE, Auth::None).unwrap_err();
        assert!(err.to_string().contains("project ID"));
    }

    #[test]
    fn test_commit_body() {
        let client = client(DEFAULT_BASE_URL);
        let mut unit = WriteUnit::new("categories");
        unit.stage(
            DocumentId::new("abc"),
            Record::new().with("name", "More").with("iconName", "more_horiz"),
        );
        unit.stage_delete(DocumentId::new("old"));

        assert_eq!(
            client.commit_body(&unit),
            json!({
                "writes": [
                    {
                        "update": {
                            "name": "projects/demo-shop/databases/(default)/documents/categories/abc",
                            "fields": {
                                "iconName": {"stringValue": "more_horiz"},
                                "name": {"stringValue": "More"}
                            }
                        }
                    },
                    {
                        "delete": "projects/demo-shop/databases/(default)/documents/categories/old"
                    }
                ]
            })
        );
    }

    #[test]
    fn test_display() {
        let client = client(DEFAULT_BASE_URL);
        assert_eq!(
            client.to_string(),
            "https://firestore.googleapis.com/v1/ (projects/demo-shop/databases/(default))"
        );
    }

    #[test]
    fn test_parse_list_response() {
        let page: ListDocumentsResponse = serde_json::from_value(json!({
            "documents": [{"name": "projects/p/databases/(default)/documents/banners/x1"}],
            "nextPageToken": "next"
        }))
        .unwrap();
        assert_eq!(page.documents.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("next"));

        let empty: ListDocumentsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.documents.is_empty());
        assert!(empty.next_page_token.is_none());
    }
}
