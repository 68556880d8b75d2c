//! Typed REST resources
//!
//! [`Resource<T>`] covers the CRUD verbs every endpoint shares.
//! [`Collection<T>`] is a listable path, either the resource's own base
//! path or a sub-collection such as `builds/{id}/artifacts/built`.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use bc_core::error::{ConsoleError, ValidationErrors};
use bc_core::pagination::{Page, PageEnvelope, PageRequest};
use bc_core::result::{ConsoleResult, OptionalExt};
use bc_core::traits::{Entity, Id};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use crate::paginator::{PageFetcher, Paginator};
use crate::transport::Transport;

pub(crate) fn decode<V: DeserializeOwned>(value: Value) -> ConsoleResult<V> {
    Ok(serde_json::from_value(value)?)
}

/// A listable path returning `T` rows
pub struct Collection<T> {
    transport: Arc<dyn Transport>,
    path: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            path: self.path.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Collection<T> {
    pub(crate) fn new(transport: Arc<dyn Transport>, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
            _entity: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fetch one page
    pub async fn list(&self, request: &PageRequest) -> ConsoleResult<Page<T>> {
        let value = self
            .transport
            .get(&self.path, &request.query_pairs())
            .await?;
        let envelope: PageEnvelope<T> = decode(value)?;
        let page = Page::from(envelope);
        tracing::debug!(
            path = %self.path,
            index = page.index,
            rows = page.len(),
            total = page.total_count,
            "page loaded"
        );
        Ok(page)
    }

    /// A paginator over this collection starting from `request`
    pub fn paginator(&self, request: PageRequest) -> Paginator<T> {
        Paginator::new(Arc::new(self.clone()), request)
    }
}

#[async_trait]
impl<T: Entity> PageFetcher<T> for Collection<T> {
    async fn fetch(&self, request: PageRequest) -> ConsoleResult<Page<T>> {
        self.list(&request).await
    }
}

/// CRUD access to one entity type
pub struct Resource<T> {
    transport: Arc<dyn Transport>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Resource<T> {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            _entity: PhantomData,
        }
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// The resource's base collection
    pub fn collection(&self) -> Collection<T> {
        Collection::new(self.transport.clone(), T::RESOURCE_PATH)
    }

    /// A collection nested under one member, e.g. `products/{id}/versions`
    pub fn sub_collection<U: Entity>(&self, id: Id, name: &str) -> Collection<U> {
        Collection::new(
            self.transport.clone(),
            format!("{}/{}", T::member_path(id), name),
        )
    }

    pub async fn list(&self, request: &PageRequest) -> ConsoleResult<Page<T>> {
        self.collection().list(request).await
    }

    pub async fn get(&self, id: Id) -> ConsoleResult<T> {
        let value = self
            .transport
            .get(&T::member_path(id), &[])
            .await
            .map_err(|err| name_absent::<T>(err, id))?;
        decode(value)
    }

    /// Like [`get`](Self::get), with 404 meaning `None`
    pub async fn find(&self, id: Id) -> ConsoleResult<Option<T>> {
        self.get(id).await.optional()
    }

    /// Validate `input` locally, then POST it to the collection
    pub async fn create<D>(&self, input: &D) -> ConsoleResult<T>
    where
        D: Serialize + Validate + Sync,
    {
        input
            .validate()
            .map_err(|e| ConsoleError::Validation(ValidationErrors::from(e)))?;

        let body = serde_json::to_value(input)?;
        let value = self
            .transport
            .post(T::RESOURCE_PATH, &[], Some(&body))
            .await?;
        let created: T = decode(value)?;
        tracing::info!(entity = T::TYPE_NAME, id = created.id(), "created");
        Ok(created)
    }

    pub async fn update(&self, id: Id, entity: &T) -> ConsoleResult<T> {
        let body = serde_json::to_value(entity)?;
        let value = self
            .transport
            .put(&T::member_path(id), &body)
            .await
            .map_err(|err| name_absent::<T>(err, id))?;

        // some endpoints answer 204 to PUT
        if value.is_null() {
            return Ok(entity.clone());
        }
        decode(value)
    }

    pub async fn delete(&self, id: Id) -> ConsoleResult<()> {
        self.transport
            .delete(&T::member_path(id))
            .await
            .map_err(|err| name_absent::<T>(err, id))?;
        tracing::info!(entity = T::TYPE_NAME, id, "deleted");
        Ok(())
    }

    /// POST `{base}/{id}/{name}` with no body
    pub async fn action(&self, id: Id, name: &str) -> ConsoleResult<Value> {
        self.action_with(id, name, &[]).await
    }

    pub(crate) async fn action_with(
        &self,
        id: Id,
        name: &str,
        query: &[(&'static str, String)],
    ) -> ConsoleResult<Value> {
        let path = format!("{}/{}", T::member_path(id), name);
        tracing::debug!(entity = T::TYPE_NAME, id, action = name, "action");
        self.transport
            .post(&path, query, None)
            .await
            .map_err(|err| name_absent::<T>(err, id))
    }

    pub fn paginator(&self, request: PageRequest) -> Paginator<T> {
        self.collection().paginator(request)
    }
}

/// Report a 404 in terms of the entity rather than the request path
fn name_absent<T: Entity>(err: ConsoleError, id: Id) -> ConsoleError {
    match err {
        ConsoleError::NotFound { .. } => ConsoleError::not_found(T::TYPE_NAME, id),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use bc_models::{BuildRecord, BuildStatus, NewProductVersion, Product, ProductVersion};
    use serde_json::json;

    use super::*;
    use crate::testing::FakeTransport;

    fn envelope(rows: Value, index: u32, size: u32, total: u64) -> Value {
        json!({
            "pageIndex": index,
            "pageSize": size,
            "totalPages": total.div_ceil(size as u64),
            "totalHits": total,
            "content": rows,
        })
    }

    #[tokio::test]
    async fn test_list_sends_paging_parameters() {
        let transport = FakeTransport::new();
        transport.respond(
            "GET",
            "builds",
            Ok(envelope(json!([{"id": 1, "status": "BUILDING"}]), 2, 25, 120)),
        );
        let builds: Resource<BuildRecord> = Resource::new(transport.clone());

        let request = PageRequest::new(2, 25).with_query("status==BUILDING");
        let page = builds.list(&request).await.unwrap();
        assert_eq!(page.index, 2);
        assert_eq!(page.total_count, 120);
        assert_eq!(page.total_pages(), 5);
        assert_eq!(page.data[0].status, BuildStatus::Building);

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].query,
            vec![
                ("pageIndex", "2".to_string()),
                ("pageSize", "25".to_string()),
                ("q", "status==BUILDING".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_find_missing_is_none() {
        let transport = FakeTransport::new();
        let products: Resource<Product> = Resource::new(transport.clone());

        assert_eq!(products.find(7).await.unwrap(), None);
        let err = products.get(7).await.unwrap_err();
        assert_eq!(err, ConsoleError::not_found("Product", 7));
    }

    #[tokio::test]
    async fn test_create_validates_before_sending() {
        let transport = FakeTransport::new();
        let versions: Resource<ProductVersion> = Resource::new(transport.clone());

        let err = versions
            .create(&NewProductVersion::new(3, "1"))
            .await
            .unwrap_err();
        match err {
            ConsoleError::Validation(errors) => assert!(errors.has_error("version")),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_create_posts_body() {
        let transport = FakeTransport::new();
        transport.respond(
            "POST",
            "product-versions",
            Ok(json!({"id": 11, "version": "1.2", "productId": 3})),
        );
        let versions: Resource<ProductVersion> = Resource::new(transport.clone());

        let created = versions.create(&NewProductVersion::new(3, "1.2")).await.unwrap();
        assert_eq!(created.id, 11);
        let sent = transport.requests();
        assert_eq!(sent[0].body, Some(json!({"version": "1.2", "productId": 3})));
    }

    #[tokio::test]
    async fn test_delete_and_action_paths() {
        let transport = FakeTransport::new();
        transport.respond("DELETE", "products/4", Ok(Value::Null));
        transport.respond("POST", "products/4/archive", Ok(Value::Null));
        let products: Resource<Product> = Resource::new(transport.clone());

        products.delete(4).await.unwrap();
        products.action(4, "archive").await.unwrap();

        let err = products.delete(5).await.unwrap_err();
        assert!(err.is_expected_absence());

        let paths: Vec<_> = transport
            .requests()
            .into_iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect();
        assert_eq!(
            paths,
            vec!["DELETE products/4", "POST products/4/archive", "DELETE products/5"]
        );
    }

    #[tokio::test]
    async fn test_paginator_over_resource() {
        let transport = FakeTransport::new();
        transport.respond(
            "GET",
            "builds",
            Ok(envelope(json!([{"id": 1}, {"id": 2}]), 0, 2, 2)),
        );
        let builds: Resource<BuildRecord> = Resource::new(transport.clone());

        let pages = builds.paginator(PageRequest::new(0, 2));
        let page = pages.get(0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(!page.has_next());
        assert_eq!(pages.next().await.unwrap().index, 0);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_passed_through() {
        let transport = FakeTransport::new();
        transport.respond(
            "GET",
            "builds",
            Err(ConsoleError::Http {
                status: 502,
                message: "Bad Gateway".into(),
            }),
        );
        let builds: Resource<BuildRecord> = Resource::new(transport.clone());

        let err = builds.list(&PageRequest::default()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(502));
    }
}
