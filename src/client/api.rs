//! Core HTTP client for the PocketBase records API

use std::sync::Arc;

use compact_str::CompactString;
use reqwest::{header::AUTHORIZATION, Method, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use super::{
    auth::{AuthStore, Authorizer},
    collection::Collection,
    config::ClientConfig,
    error::{ClientError, Result},
    pagination::collect_pages,
    params::ParamsList,
    response::{Record, ResponseCreate, ResponseList},
    transport::{endpoint_url, Transport},
};

/// Authenticated client for PocketBase record collections.
///
/// Every operation authorizes first, then performs one round trip (or one
/// per page for [`Client::full_list`]). Nothing is cached between calls
/// except the token kept in the [`AuthStore`].
#[derive(Debug)]
pub struct Client {
    transport: Transport,
    base_url: Url,
    config: ClientConfig,
    authorizer: Authorizer,
}

impl Client {
    /// Create a new client from a validated configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::config_validation("base_url", e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::config_validation("base_url", "cannot be used as a base"));
        }

        let transport = Transport::new(&config.request, &config.debug)?;
        let authorizer = Authorizer::new(config.auth.clone());

        Ok(Self { transport, base_url, config, authorizer })
    }

    /// Unauthenticated client with default settings
    pub fn from_url(base_url: &str) -> Result<Self> {
        Self::new(ClientConfig::builder().base_url(base_url).build()?)
    }

    /// Typed view over one collection
    pub fn collection<T>(self: &Arc<Self>, name: &str) -> Collection<T>
    where
        T: Serialize + DeserializeOwned,
    {
        Collection::new(Arc::clone(self), name)
    }

    /// Get current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Result of the most recent authorization
    pub fn auth_store(&self) -> &AuthStore {
        self.authorizer.store()
    }

    /// Run the configured authorization strategy once
    pub async fn authorize(&self) -> Result<()> {
        self.authorizer.authorize(&self.transport, &self.base_url).await?;
        Ok(())
    }

    /// Create a record; the body may be a map or any serializable value
    #[instrument(skip(self, body))]
    pub async fn create<B>(&self, collection: &str, body: &B) -> Result<ResponseCreate>
    where
        B: Serialize + ?Sized,
    {
        let body = encode("create", body)?;
        let request = self
            .prepare(Method::POST, self.records_url(collection, None))
            .await?
            .body(body);

        self.transport.execute("create", request).await?.json("create")
    }

    /// Update a record with the fields present in `body`
    #[instrument(skip(self, body))]
    pub async fn update<B>(&self, collection: &str, id: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let body = encode("update", body)?;
        let request = self
            .prepare(Method::PATCH, self.records_url(collection, Some(id)))
            .await?
            .body(body);

        self.transport.execute("update", request).await?.error_for_status("update")?;
        Ok(())
    }

    /// Delete a record
    #[instrument(skip(self))]
    pub async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let request = self
            .prepare(Method::DELETE, self.records_url(collection, Some(id)))
            .await?;

        self.transport.execute("delete", request).await?.error_for_status("delete")?;
        Ok(())
    }

    /// Fetch a single record as an open map
    #[instrument(skip(self))]
    pub async fn one(&self, collection: &str, id: &str) -> Result<Record> {
        self.one_as("one", collection, id, &ParamsList::default()).await
    }

    /// Fetch a single record decoded into `T`
    #[instrument(skip(self))]
    pub async fn one_to<T>(&self, collection: &str, id: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.one_as("oneTo", collection, id, &ParamsList::default()).await
    }

    /// Fetch one page of records
    #[instrument(skip(self), fields(page = params.page, size = params.size))]
    pub async fn list(&self, collection: &str, params: &ParamsList) -> Result<ResponseList<Record>> {
        self.list_as(collection, params).await
    }

    /// Fetch every page of records, 500 per request, in page order.
    ///
    /// Pagination fields echo the first page. Any failed page fails the
    /// whole call.
    #[instrument(skip(self))]
    pub async fn full_list(
        &self,
        collection: &str,
        params: &ParamsList,
    ) -> Result<ResponseList<Record>> {
        self.full_list_as(collection, params).await
    }

    /// Authenticated GET of `path` relative to the base URL, with a hook to
    /// add query parameters or headers before sending
    #[instrument(skip(self, on_request))]
    pub async fn get<T>(
        &self,
        path: &str,
        on_request: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = Url::parse(&format!("{}{}", self.config.base_url, path))
            .map_err(|e| ClientError::config_validation("path", e.to_string()))?;
        let request = on_request(self.prepare(Method::GET, url).await?);

        self.transport.execute("get", request).await?.json("get")
    }

    pub(crate) async fn one_as<T>(
        &self,
        op: &'static str,
        collection: &str,
        id: &str,
        params: &ParamsList,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut request = self
            .prepare(Method::GET, self.records_url(collection, Some(id)))
            .await?;
        let query = params.one_query();
        if !query.is_empty() {
            request = request.query(&query);
        }

        self.transport.execute(op, request).await?.json(op)
    }

    pub(crate) async fn list_as<T>(
        &self,
        collection: &str,
        params: &ParamsList,
    ) -> Result<ResponseList<T>>
    where
        T: DeserializeOwned,
    {
        let mut request = self
            .prepare(Method::GET, self.records_url(collection, None))
            .await?;
        let query = params.list_query();
        if !query.is_empty() {
            request = request.query(&query);
        }

        let page: ResponseList<T> = self.transport.execute("list", request).await?.json("list")?;
        debug!(
            collection,
            page = page.page,
            total_pages = page.total_pages,
            item_count = page.items.len(),
            "Fetched page"
        );
        Ok(page)
    }

    pub(crate) async fn full_list_as<T>(
        &self,
        collection: &str,
        params: &ParamsList,
    ) -> Result<ResponseList<T>>
    where
        T: DeserializeOwned,
    {
        collect_pages(params, move |page_params| async move {
            self.list_as(collection, &page_params).await
        })
        .await
    }

    /// Base of every collection path: `<base>/api/collections/<name>`
    pub(crate) fn collection_url(&self, collection: &str) -> Url {
        endpoint_url(&self.base_url, &["api", "collections", collection])
    }

    fn records_url(&self, collection: &str, id: Option<&str>) -> Url {
        match id {
            Some(id) => endpoint_url(&self.base_url, &["api", "collections", collection, "records", id]),
            None => endpoint_url(&self.base_url, &["api", "collections", collection, "records"]),
        }
    }

    /// Authorize, then start a request carrying the issued token.
    /// Nothing is sent when authorization fails.
    async fn prepare(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token: CompactString = self.authorizer.authorize(&self.transport, &self.base_url).await?;
        let request = self.transport.request(method, url);

        Ok(if token.is_empty() {
            request
        } else {
            request.header(AUTHORIZATION, token.as_str())
        })
    }
}

fn encode<B>(op: &'static str, body: &B) -> Result<String>
where
    B: Serialize + ?Sized,
{
    serde_json::to_string(body).map_err(|e| ClientError::encode(op, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::auth::AuthState;

    fn test_client() -> Client {
        Client::from_url("http://localhost:8090").unwrap()
    }

    #[test]
    fn test_client_creation() {
        assert!(Client::from_url("http://localhost:8090").is_ok());
    }

    #[test]
    fn test_client_creation_invalid_config() {
        assert!(Client::from_url("").is_err());
        assert!(Client::from_url("ftp-ish").is_err());
    }

    #[test]
    fn test_records_url() {
        let client = test_client();
        assert_eq!(
            client.records_url("posts", None).as_str(),
            "http://localhost:8090/api/collections/posts/records"
        );
        assert_eq!(
            client.records_url("posts", Some("abc123")).as_str(),
            "http://localhost:8090/api/collections/posts/records/abc123"
        );
    }

    #[test]
    fn test_collection_url_escapes_name() {
        let client = test_client();
        assert_eq!(
            client.collection_url("a/b").as_str(),
            "http://localhost:8090/api/collections/a%2Fb"
        );
    }

    #[test]
    fn test_new_client_is_unauthorized() {
        let client = test_client();
        assert_eq!(client.auth_store().state(), AuthState::Unauthorized);
        assert!(client.auth_store().token().is_empty());
    }
}
