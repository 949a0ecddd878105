use std::path::Path;

use anyhow::Result;
use reqwest::{Method, Response};
use serde::Deserialize;
use url::Url;

use crate::config::Adls2Config;
use crate::error::StorageError;

/// REST API version sent with every request.
const API_VERSION: &str = "2023-11-03";

/// Credential attached to outgoing requests. Acquisition is out of scope:
/// a token is taken pre-acquired from the environment (`AZURE_STORAGE_TOKEN`);
/// without one requests go out unauthenticated, which is what emulators
/// expect.
#[derive(Debug, Clone)]
pub enum Credential {
    BearerToken(String),
    Anonymous,
}

impl Credential {
    pub fn from_env() -> Self {
        match std::env::var("AZURE_STORAGE_TOKEN") {
            Ok(token) if !token.is_empty() => Credential::BearerToken(token),
            _ => Credential::Anonymous,
        }
    }
}

/// Client for an Azure Data Lake Storage Gen2 account. Each method performs
/// exactly one remote operation (listings may page through continuation
/// tokens); success is the absence of an error from the service. No path
/// validation, no conflict checks, no retries.
pub struct DataLakeClient {
    http: reqwest::Client,
    endpoint: Url,
    credential: Credential,
    config: Adls2Config,
}

#[derive(Deserialize)]
struct NamedItem {
    name: String,
}

#[derive(Deserialize)]
struct FilesystemList {
    #[serde(default)]
    filesystems: Vec<NamedItem>,
}

#[derive(Deserialize)]
struct PathList {
    #[serde(default)]
    paths: Vec<NamedItem>,
}

impl DataLakeClient {
    pub fn new(config: Adls2Config, credential: Credential) -> Result<Self> {
        let http = reqwest::Client::builder()
            .read_timeout(std::time::Duration::from_secs(60))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .pool_max_idle_per_host(5)
            .build()?;
        let endpoint = config.account_endpoint()?;

        Ok(Self { http, endpoint, credential, config })
    }

    /// Whether the client is in read-only mode.
    pub fn read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn config(&self) -> &Adls2Config {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.endpoint.as_str().trim_end_matches('/'))
    }

    fn request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header("x-ms-version", API_VERSION);
        match &self.credential {
            Credential::BearerToken(token) => builder.bearer_auth(token),
            Credential::Anonymous => builder,
        }
    }

    /// Translate a non-success status into a `StorageError::Service` carrying
    /// the response body as the message.
    async fn check(operation: &'static str, response: Response) -> Result<Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StorageError::Service { operation, status, message })
    }

    fn continuation(response: &Response) -> Option<String> {
        response
            .headers()
            .get("x-ms-continuation")
            .and_then(|value| value.to_str().ok())
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
    }

    /// Create a new filesystem (container) in the storage account.
    pub async fn create_filesystem(&self, filesystem: &str) -> Result<(), StorageError> {
        let response = self
            .request(Method::PUT, self.url(filesystem))
            .query(&[("resource", "filesystem")])
            .send()
            .await?;
        Self::check("create filesystem", response).await?;
        Ok(())
    }

    /// List all filesystems in the storage account, in service order.
    pub async fn list_filesystems(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let mut request = self
                .request(Method::GET, self.url(""))
                .query(&[("resource", "account")]);
            if let Some(token) = &continuation {
                request = request.query(&[("continuation", token.as_str())]);
            }

            let response = Self::check("list filesystems", request.send().await?).await?;
            continuation = Self::continuation(&response);
            let body: FilesystemList = response.json().await?;
            names.extend(body.filesystems.into_iter().map(|item| item.name));

            if continuation.is_none() {
                return Ok(names);
            }
        }
    }

    /// Delete a filesystem from the storage account.
    pub async fn delete_filesystem(&self, filesystem: &str) -> Result<(), StorageError> {
        let response = self
            .request(Method::DELETE, self.url(filesystem))
            .query(&[("resource", "filesystem")])
            .send()
            .await?;
        Self::check("delete filesystem", response).await?;
        Ok(())
    }

    /// Create a directory in the specified filesystem.
    pub async fn create_directory(&self, filesystem: &str, path: &str) -> Result<(), StorageError> {
        let response = self
            .request(Method::PUT, self.url(&format!("{filesystem}/{path}")))
            .query(&[("resource", "directory")])
            .send()
            .await?;
        Self::check("create directory", response).await?;
        Ok(())
    }

    /// Delete a directory (and everything under it) from the filesystem.
    pub async fn delete_directory(&self, filesystem: &str, path: &str) -> Result<(), StorageError> {
        let response = self
            .request(Method::DELETE, self.url(&format!("{filesystem}/{path}")))
            .query(&[("recursive", "true")])
            .send()
            .await?;
        Self::check("delete directory", response).await?;
        Ok(())
    }

    /// Rename/move a directory within the filesystem.
    pub async fn rename_directory(
        &self,
        filesystem: &str,
        source_path: &str,
        destination_path: &str,
    ) -> Result<(), StorageError> {
        self.rename_path("rename directory", filesystem, source_path, destination_path)
            .await
    }

    /// List path names under a directory. `recursive` includes the full
    /// subtree; otherwise only immediate children are returned.
    pub async fn list_paths(
        &self,
        filesystem: &str,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<String>, StorageError> {
        let recursive = if recursive { "true" } else { "false" };
        let mut names = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let mut request = self.request(Method::GET, self.url(filesystem)).query(&[
                ("resource", "filesystem"),
                ("recursive", recursive),
                ("directory", directory),
            ]);
            if let Some(token) = &continuation {
                request = request.query(&[("continuation", token.as_str())]);
            }

            let response = Self::check("list paths", request.send().await?).await?;
            continuation = Self::continuation(&response);
            let body: PathList = response.json().await?;
            names.extend(body.paths.into_iter().map(|item| item.name));

            if continuation.is_none() {
                return Ok(names);
            }
        }
    }

    /// Upload a local file to the filesystem: create the remote file, append
    /// the contents, then flush to commit.
    pub async fn upload_file(
        &self,
        upload_file: &Path,
        filesystem: &str,
        destination: &str,
    ) -> Result<(), StorageError> {
        let contents = tokio::fs::read(upload_file).await?;
        let length = contents.len();
        let url = self.url(&format!("{filesystem}/{destination}"));

        let response = self
            .request(Method::PUT, url.clone())
            .query(&[("resource", "file")])
            .send()
            .await?;
        Self::check("upload file", response).await?;

        if length > 0 {
            let response = self
                .request(Method::PATCH, url.clone())
                .query(&[("action", "append"), ("position", "0")])
                .body(contents)
                .send()
                .await?;
            Self::check("upload file", response).await?;
        }

        let response = self
            .request(Method::PATCH, url)
            .query(&[("action", "flush")])
            .query(&[("position", length.to_string())])
            .send()
            .await?;
        Self::check("upload file", response).await?;
        Ok(())
    }

    /// Download a file from the filesystem to a local path.
    pub async fn download_file(
        &self,
        filesystem: &str,
        source: &str,
        download_path: &Path,
    ) -> Result<(), StorageError> {
        let response = self
            .request(Method::GET, self.url(&format!("{filesystem}/{source}")))
            .send()
            .await?;
        let response = Self::check("download file", response).await?;
        let contents = response.bytes().await?;

        if let Some(parent) = download_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(download_path, &contents).await?;
        Ok(())
    }

    /// Check whether a file exists in the filesystem. 404 is a negative
    /// answer, not an error.
    pub async fn file_exists(&self, filesystem: &str, path: &str) -> Result<bool, StorageError> {
        let response = self
            .request(Method::HEAD, self.url(&format!("{filesystem}/{path}")))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            Err(StorageError::Service {
                operation: "file exists",
                status,
                message: String::new(),
            })
        }
    }

    /// Rename/move a file within the filesystem.
    pub async fn rename_file(
        &self,
        filesystem: &str,
        source_path: &str,
        destination_path: &str,
    ) -> Result<(), StorageError> {
        self.rename_path("rename file", filesystem, source_path, destination_path)
            .await
    }

    async fn rename_path(
        &self,
        operation: &'static str,
        filesystem: &str,
        source_path: &str,
        destination_path: &str,
    ) -> Result<(), StorageError> {
        let response = self
            .request(Method::PUT, self.url(&format!("{filesystem}/{destination_path}")))
            .header("x-ms-rename-source", format!("/{filesystem}/{source_path}"))
            .send()
            .await?;
        Self::check(operation, response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use pretty_assertions::assert_eq;

    use super::*;

    async fn setup() -> (DataLakeClient, mockito::ServerGuard) {
        let server = mockito::Server::new_async().await;
        let config = Adls2Config::new("testaccount")
            .unwrap()
            .endpoint(Url::parse(&server.url()).unwrap());
        let client = DataLakeClient::new(config, Credential::Anonymous).unwrap();
        (client, server)
    }

    #[tokio::test]
    async fn test_create_filesystem() {
        let (client, mut server) = setup().await;
        let mock = server
            .mock("PUT", "/data")
            .match_query(Matcher::UrlEncoded("resource".into(), "filesystem".into()))
            .with_status(201)
            .create_async()
            .await;

        client.create_filesystem("data").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_list_delete_filesystem_round_trip() {
        let (client, mut server) = setup().await;

        server
            .mock("PUT", "/test")
            .match_query(Matcher::UrlEncoded("resource".into(), "filesystem".into()))
            .with_status(201)
            .create_async()
            .await;
        server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("resource".into(), "account".into()))
            .with_body(r#"{"filesystems":[{"name":"test"}]}"#)
            .create_async()
            .await;

        client.create_filesystem("test").await.unwrap();
        assert_eq!(client.list_filesystems().await.unwrap(), vec!["test"]);

        server
            .mock("DELETE", "/test")
            .match_query(Matcher::UrlEncoded("resource".into(), "filesystem".into()))
            .with_status(202)
            .create_async()
            .await;
        // Most recently registered mock wins, so the listing is now empty.
        server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("resource".into(), "account".into()))
            .with_body(r#"{"filesystems":[]}"#)
            .create_async()
            .await;

        client.delete_filesystem("test").await.unwrap();
        assert_eq!(client.list_filesystems().await.unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_list_filesystems_follows_continuation_tokens() {
        let (client, mut server) = setup().await;

        server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("resource".into(), "account".into()))
            .with_header("x-ms-continuation", "token-1")
            .with_body(r#"{"filesystems":[{"name":"alpha"}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("resource".into(), "account".into()),
                Matcher::UrlEncoded("continuation".into(), "token-1".into()),
            ]))
            .with_body(r#"{"filesystems":[{"name":"beta"}]}"#)
            .create_async()
            .await;

        let actual = client.list_filesystems().await.unwrap();
        assert_eq!(actual, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_create_and_delete_directory() {
        let (client, mut server) = setup().await;
        let create = server
            .mock("PUT", "/data/raw/2024")
            .match_query(Matcher::UrlEncoded("resource".into(), "directory".into()))
            .with_status(201)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/data/raw/2024")
            .match_query(Matcher::UrlEncoded("recursive".into(), "true".into()))
            .with_status(200)
            .create_async()
            .await;

        client.create_directory("data", "raw/2024").await.unwrap();
        client.delete_directory("data", "raw/2024").await.unwrap();
        create.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_paths_forwards_recursive_flag() {
        let (client, mut server) = setup().await;
        let mock = server
            .mock("GET", "/data")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("resource".into(), "filesystem".into()),
                Matcher::UrlEncoded("recursive".into(), "false".into()),
                Matcher::UrlEncoded("directory".into(), "raw".into()),
            ]))
            .with_body(r#"{"paths":[{"name":"raw/a.csv"},{"name":"raw/b.csv"}]}"#)
            .create_async()
            .await;

        let actual = client.list_paths("data", "raw", false).await.unwrap();
        assert_eq!(actual, vec!["raw/a.csv", "raw/b.csv"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_file_creates_appends_and_flushes() {
        let (client, mut server) = setup().await;

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("in.txt");
        std::fs::write(&local, "hello").unwrap();

        let create = server
            .mock("PUT", "/data/out/in.txt")
            .match_query(Matcher::UrlEncoded("resource".into(), "file".into()))
            .with_status(201)
            .create_async()
            .await;
        let append = server
            .mock("PATCH", "/data/out/in.txt")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "append".into()),
                Matcher::UrlEncoded("position".into(), "0".into()),
            ]))
            .match_body("hello")
            .with_status(202)
            .create_async()
            .await;
        let flush = server
            .mock("PATCH", "/data/out/in.txt")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "flush".into()),
                Matcher::UrlEncoded("position".into(), "5".into()),
            ]))
            .with_status(200)
            .create_async()
            .await;

        client.upload_file(&local, "data", "out/in.txt").await.unwrap();
        create.assert_async().await;
        append.assert_async().await;
        flush.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_then_exists_round_trip() {
        let (client, mut server) = setup().await;

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("in.txt");
        std::fs::write(&local, "hello").unwrap();

        server
            .mock("PUT", "/data/out/in.txt")
            .match_query(Matcher::Any)
            .with_status(201)
            .create_async()
            .await;
        server
            .mock("PATCH", "/data/out/in.txt")
            .match_query(Matcher::Any)
            .with_status(202)
            .create_async()
            .await;
        server
            .mock("HEAD", "/data/out/in.txt")
            .with_status(200)
            .create_async()
            .await;

        client.upload_file(&local, "data", "out/in.txt").await.unwrap();
        assert!(client.file_exists("data", "out/in.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_upload_missing_local_file_is_io_error() {
        let (client, _server) = setup().await;

        let actual = client
            .upload_file(Path::new("/nonexistent/in.txt"), "data", "out/in.txt")
            .await;
        assert!(matches!(actual, Err(StorageError::Io(_))));
    }

    #[tokio::test]
    async fn test_download_file_writes_contents() {
        let (client, mut server) = setup().await;
        server
            .mock("GET", "/data/raw/report.csv")
            .with_body("a,b\n1,2\n")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("nested/report.csv");
        client
            .download_file("data", "raw/report.csv", &local)
            .await
            .unwrap();

        let actual = std::fs::read_to_string(&local).unwrap();
        assert_eq!(actual, "a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_file_exists() {
        let (client, mut server) = setup().await;
        server
            .mock("HEAD", "/data/present.txt")
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("HEAD", "/data/absent.txt")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("HEAD", "/data/forbidden.txt")
            .with_status(403)
            .create_async()
            .await;

        assert!(client.file_exists("data", "present.txt").await.unwrap());
        assert!(!client.file_exists("data", "absent.txt").await.unwrap());
        assert!(matches!(
            client.file_exists("data", "forbidden.txt").await,
            Err(StorageError::Service { status, .. }) if status.as_u16() == 403
        ));
    }

    #[tokio::test]
    async fn test_rename_file_sends_rename_source_header() {
        let (client, mut server) = setup().await;
        let mock = server
            .mock("PUT", "/data/archive/new.txt")
            .match_header("x-ms-rename-source", "/data/old.txt")
            .with_status(201)
            .create_async()
            .await;

        client
            .rename_file("data", "old.txt", "archive/new.txt")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_service_error_carries_status_and_body() {
        let (client, mut server) = setup().await;
        server
            .mock("PUT", "/data")
            .match_query(Matcher::UrlEncoded("resource".into(), "filesystem".into()))
            .with_status(409)
            .with_body("FilesystemAlreadyExists")
            .create_async()
            .await;

        let actual = client.create_filesystem("data").await.unwrap_err();
        match actual {
            StorageError::Service { operation, status, message } => {
                assert_eq!(operation, "create filesystem");
                assert_eq!(status.as_u16(), 409);
                assert_eq!(message, "FilesystemAlreadyExists");
            }
            other => panic!("Expected service error, got {other:?}"),
        }
    }
}
