//! Typed facade over a single collection

use std::{fmt, marker::PhantomData, sync::Arc};

use compact_str::CompactString;
use serde::{de::DeserializeOwned, Serialize};
use tracing::instrument;

use super::{
    api::Client,
    error::Result,
    params::ParamsList,
    response::{ResponseCreate, ResponseList},
};

/// A collection bound to a record type `T`.
///
/// `T` is decoded straight from the response body with serde: unknown
/// fields are ignored, and fields marked `#[serde(default)]` fall back to
/// their default when the server leaves them out. Use
/// [`Record`](super::Record) for an open map.
pub struct Collection<T> {
    client: Arc<Client>,
    name: CompactString,
    base_path: CompactString,
    _record: PhantomData<fn() -> T>,
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(client: Arc<Client>, name: impl Into<CompactString>) -> Self {
        let name = name.into();
        let base_path = client.collection_url(&name).as_str().into();

        Self { client, name, base_path, _record: PhantomData }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<base url>/api/collections/<escaped name>`
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    #[instrument(skip(self, body), fields(collection = %self.name))]
    pub async fn update(&self, id: &str, body: &T) -> Result<()> {
        self.client.update(&self.name, id, body).await
    }

    #[instrument(skip(self, body), fields(collection = %self.name))]
    pub async fn create(&self, body: &T) -> Result<ResponseCreate> {
        self.client.create(&self.name, body).await
    }

    #[instrument(skip(self), fields(collection = %self.name))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&self.name, id).await
    }

    #[instrument(skip(self), fields(collection = %self.name))]
    pub async fn list(&self, params: &ParamsList) -> Result<ResponseList<T>> {
        self.client.list_as(&self.name, params).await
    }

    /// Every record across all pages; see [`Client::full_list`]
    #[instrument(skip(self), fields(collection = %self.name))]
    pub async fn full_list(&self, params: &ParamsList) -> Result<ResponseList<T>> {
        self.client.full_list_as(&self.name, params).await
    }

    #[instrument(skip(self), fields(collection = %self.name))]
    pub async fn one(&self, id: &str) -> Result<T> {
        self.client.one_as("one", &self.name, id, &ParamsList::default()).await
    }

    /// Like [`Collection::one`], honoring only `fields` and `expand` from `params`
    #[instrument(skip(self), fields(collection = %self.name))]
    pub async fn one_with_params(&self, id: &str, params: &ParamsList) -> Result<T> {
        self.client.one_as("one", &self.name, id, params).await
    }
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            name: self.name.clone(),
            base_path: self.base_path.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("base_path", &self.base_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Post {
        title: String,
    }

    #[test]
    fn test_base_path() {
        let client = Arc::new(Client::from_url("http://localhost:8090/").unwrap());
        let posts: Collection<Post> = client.collection("posts");
        assert_eq!(posts.name(), "posts");
        assert_eq!(posts.base_path(), "http://localhost:8090/api/collections/posts");

        let spaced: Collection<Post> = Collection::new(client, "my posts");
        assert_eq!(spaced.base_path(), "http://localhost:8090/api/collections/my%20posts");
    }
}
