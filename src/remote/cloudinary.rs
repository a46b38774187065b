//! Cloudinary asset backend.
//!
//! Talks to three Cloudinary APIs:
//! - Search API (`resources/search`) for folder contents, Basic auth
//! - Admin API (`resources`, `folders`) for prefix listings, folder
//!   management and batch deletes, Basic auth
//! - Upload API (`upload`, `rename`, `destroy`) for single-asset mutations,
//!   signed requests
//!
//! Signed requests use SHA-256 signatures, so the account's signature
//! algorithm must be set to SHA-256.

use super::backend::AssetBackend;
use super::types::{
    Asset, BatchDeleteResult, DeletionStatus, DestroyOutcome, FolderEntry, RenamedAsset,
    ResourceKind, ResourcePage, UploadRequest,
};
use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Cloudinary error body: `{"error": {"message": "..."}}`.
#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

#[derive(Deserialize)]
struct FolderList {
    #[serde(default)]
    folders: Vec<FolderEntry>,
}

#[derive(Deserialize)]
struct CreatedFolder {
    #[serde(default)]
    path: Option<String>,
}

#[derive(Deserialize)]
struct DeletedResources {
    #[serde(default)]
    deleted: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct DestroyResult {
    result: String,
}

/// Credentials and endpoint for one Cloudinary product environment.
#[derive(Clone)]
pub struct CloudinaryBackend {
    client: reqwest::Client,
    /// `{api_base_url}/{cloud_name}`
    base: Url,
    api_key: String,
    api_secret: String,
}

impl std::fmt::Debug for CloudinaryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryBackend")
            .field("base", &self.base.as_str())
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

impl CloudinaryBackend {
    /// Creates a backend from the `[remote]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if credentials are missing, the base URL is
    /// invalid, or the HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let cloud_name = required(&config.cloud_name, "remote.cloud_name")?;
        let api_key = required(&config.api_key, "remote.api_key")?;
        let api_secret = required(&config.api_secret, "remote.api_secret")?;

        let mut base = Url::parse(&config.api_base_url)
            .map_err(|e| Error::Config(format!("invalid remote.api_base_url: {e}")))?;
        base.path_segments_mut()
            .map_err(|()| Error::Config("remote.api_base_url cannot be a base".into()))?
            .pop_if_empty()
            .push(cloud_name);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        })
    }

    fn endpoint<'a, I>(&self, segments: I) -> Url
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn folder_endpoint(&self, path: &str) -> Url {
        self.endpoint(std::iter::once("folders").chain(path.split('/')))
    }

    fn admin(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
    }

    /// Signs upload API parameters: sorted `key=value` pairs joined by `&`,
    /// followed by the API secret, hashed with SHA-256.
    fn sign(&self, params: &BTreeMap<&str, String>) -> String {
        let to_sign = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn signed_form(&self, mut params: BTreeMap<&'static str, String>) -> BTreeMap<&'static str, String> {
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = self.sign(&params);
        params.insert("signature", signature);
        params.insert("api_key", self.api_key.clone());
        params
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request.send().await?;
        let response = check_status(response, what).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Decode(format!("{what}: {e}")))
    }

    /// Signed form for an upload. `file` is added after signing since the
    /// service excludes it from the signature.
    fn upload_form(&self, request: &UploadRequest) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::from([
            ("folder", request.folder.clone()),
            ("use_filename", "true".to_string()),
        ]);
        if let Some(filename) = &request.filename {
            params.insert("filename_override", filename.clone());
        }
        let mut form = self.signed_form(params);
        form.insert("file", request.file.clone());
        form
    }

    async fn search(&self, expression: String, cursor: Option<&str>, max_results: usize) -> Result<ResourcePage> {
        let mut body = json!({
            "expression": expression,
            "max_results": max_results,
            "sort_by": [{ "created_at": "desc" }],
        });
        if let Some(cursor) = cursor {
            body["next_cursor"] = json!(cursor);
        }
        debug!(%expression, ?cursor, "Searching assets");
        let request = self
            .admin(Method::POST, self.endpoint(["resources", "search"]))
            .json(&body);
        self.send(request, "search").await
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("{name} is required for the cloudinary backend")))
}

/// Quotes a folder path for a search expression.
fn quoted(path: &str) -> String {
    format!("\"{}\"", path.replace('\\', "\\\\").replace('"', "\\\""))
}

async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);
    let message = format!("{what}: {message}");

    Err(match status.as_u16() {
        404 => Error::NotFound(message),
        420 | 429 => Error::RateLimited(message),
        code if code >= 500 => Error::RemoteUnavailable(message),
        code => Error::remote(code, message),
    })
}

#[async_trait]
impl AssetBackend for CloudinaryBackend {
    async fn search_by_folder(
        &self,
        folder: &str,
        cursor: Option<&str>,
        max_results: usize,
    ) -> Result<ResourcePage> {
        self.search(format!("folder:{}", quoted(folder)), cursor, max_results)
            .await
    }

    async fn search_all(
        &self,
        root: &str,
        cursor: Option<&str>,
        max_results: usize,
    ) -> Result<ResourcePage> {
        self.search(format!("folder:{root}*"), cursor, max_results)
            .await
    }

    async fn list_resources_by_prefix(
        &self,
        prefix: &str,
        kind: ResourceKind,
        cursor: Option<&str>,
        max_results: usize,
    ) -> Result<ResourcePage> {
        let mut query = vec![
            ("prefix", prefix.to_string()),
            ("max_results", max_results.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("next_cursor", cursor.to_string()));
        }
        let request = self
            .admin(
                Method::GET,
                self.endpoint(["resources", kind.as_str(), "upload"]),
            )
            .query(&query);
        self.send(request, "list resources").await
    }

    async fn list_root_folders(&self) -> Result<Vec<FolderEntry>> {
        let request = self.admin(Method::GET, self.endpoint(["folders"]));
        let list: FolderList = self.send(request, "root folders").await?;
        Ok(list.folders)
    }

    async fn list_subfolders(&self, path: &str) -> Result<Vec<FolderEntry>> {
        let request = self.admin(Method::GET, self.folder_endpoint(path));
        let list: FolderList = self.send(request, "subfolders").await?;
        Ok(list.folders)
    }

    async fn create_folder(&self, path: &str) -> Result<String> {
        let request = self.admin(Method::POST, self.folder_endpoint(path));
        let created: CreatedFolder = self.send(request, "create folder").await?;
        Ok(created.path.unwrap_or_else(|| path.to_string()))
    }

    async fn delete_folder(&self, path: &str) -> Result<()> {
        let request = self.admin(Method::DELETE, self.folder_endpoint(path));
        let _: serde_json::Value = self.send(request, "delete folder").await?;
        Ok(())
    }

    async fn upload_asset(&self, request: &UploadRequest) -> Result<Asset> {
        debug!(folder = %request.folder, filename = ?request.filename, "Uploading asset");
        let request = self
            .client
            .post(self.endpoint(["auto", "upload"]))
            .form(&self.upload_form(request));
        self.send(request, "upload").await
    }

    async fn rename_asset(
        &self,
        from_id: &str,
        to_id: &str,
        kind: ResourceKind,
    ) -> Result<RenamedAsset> {
        let form = self.signed_form(BTreeMap::from([
            ("from_public_id", from_id.to_string()),
            ("to_public_id", to_id.to_string()),
        ]));
        let request = self
            .client
            .post(self.endpoint([kind.as_str(), "rename"]))
            .form(&form);
        self.send(request, "rename").await
    }

    async fn delete_assets_batch(
        &self,
        ids: &[String],
        kind: ResourceKind,
    ) -> Result<BatchDeleteResult> {
        let query: Vec<(&str, &str)> = ids.iter().map(|id| ("public_ids[]", id.as_str())).collect();
        let request = self
            .admin(
                Method::DELETE,
                self.endpoint(["resources", kind.as_str(), "upload"]),
            )
            .query(&query);
        let deleted: DeletedResources = self.send(request, "delete resources").await?;
        Ok(BatchDeleteResult {
            statuses: deleted
                .deleted
                .into_iter()
                .map(|(id, status)| (id, DeletionStatus::parse(&status)))
                .collect(),
        })
    }

    async fn destroy_asset(&self, id: &str, kind: ResourceKind) -> Result<DestroyOutcome> {
        let form = self.signed_form(BTreeMap::from([("public_id", id.to_string())]));
        let request = self
            .client
            .post(self.endpoint([kind.as_str(), "destroy"]))
            .form(&form);
        let result: DestroyResult = self.send(request, "destroy").await?;
        match DeletionStatus::parse(&result.result) {
            DeletionStatus::Deleted => Ok(DestroyOutcome::Deleted),
            DeletionStatus::NotFound => Ok(DestroyOutcome::NotFound),
            DeletionStatus::Other(other) => Err(Error::remote(
                400,
                format!("destroy {id}: unexpected result '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> CloudinaryBackend {
        let config = RemoteConfig {
            cloud_name: Some("demo".into()),
            api_key: Some("123".into()),
            api_secret: Some("secret".into()),
            ..RemoteConfig::default()
        };
        CloudinaryBackend::new(&config).unwrap()
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = CloudinaryBackend::new(&RemoteConfig::default()).unwrap_err();
        assert!(err.to_string().contains("remote.cloud_name"));
    }

    #[test]
    fn test_folder_endpoint_encodes_segments() {
        let url = backend().folder_endpoint("events/Test Debug Folder");
        assert_eq!(
            url.as_str(),
            "https://api.cloudinary.com/v1_1/demo/folders/events/Test%20Debug%20Folder"
        );
    }

    #[test]
    fn test_resource_endpoint() {
        let url = backend().endpoint(["resources", "raw", "upload"]);
        assert_eq!(
            url.as_str(),
            "https://api.cloudinary.com/v1_1/demo/resources/raw/upload"
        );
    }

    #[test]
    fn test_signature_is_sorted_sha256() {
        let backend = backend();
        let params = BTreeMap::from([
            ("timestamp", "1315060510".to_string()),
            ("public_id", "sample".to_string()),
        ]);
        let expected = {
            let mut hasher = Sha256::new();
            hasher.update(b"public_id=sample&timestamp=1315060510secret");
            hex::encode(hasher.finalize())
        };
        assert_eq!(backend.sign(&params), expected);
    }

    #[test]
    fn test_signed_form_fields() {
        let form = backend().signed_form(BTreeMap::from([("public_id", "a/b".to_string())]));
        assert!(form.contains_key("timestamp"));
        assert!(form.contains_key("signature"));
        assert_eq!(form["api_key"], "123");
        assert_eq!(form["signature"].len(), 64);
    }

    #[test]
    fn test_upload_form_leaves_file_unsigned() {
        let backend = backend();
        let request = UploadRequest {
            file: "data:image/png;base64,iVBORw0KGgo=".to_string(),
            folder: "home/events".to_string(),
            filename: Some("poster.png".to_string()),
        };
        let form = backend.upload_form(&request);

        assert_eq!(form["file"], request.file);
        assert_eq!(form["folder"], "home/events");
        assert_eq!(form["filename_override"], "poster.png");

        let signed: BTreeMap<&str, String> = form
            .iter()
            .filter(|(k, _)| !matches!(**k, "file" | "api_key" | "signature"))
            .map(|(k, v)| (*k, v.clone()))
            .collect();
        assert_eq!(backend.sign(&signed), form["signature"]);
    }

    #[test]
    fn test_search_expression_quoting() {
        assert_eq!(quoted("a/Test Folder"), "\"a/Test Folder\"");
        assert_eq!(quoted("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
