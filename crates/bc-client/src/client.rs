//! Entry point handing out one resource per endpoint

use std::sync::Arc;

use bc_core::config::{ConsoleConfig, PagingConfig};
use bc_core::pagination::PageRequest;
use bc_core::result::ConsoleResult;
use bc_core::traits::Entity;
use bc_models::{
    Artifact, BuildConfiguration, BuildRecord, GroupBuild, GroupConfiguration, Product,
    ProductVersion, Project,
};

use crate::paginator::Paginator;
use crate::resource::Resource;
use crate::transport::{HttpTransport, Transport};

/// REST client; cheap to clone, all resources share one transport
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    paging: PagingConfig,
}

impl Client {
    /// HTTP client for the configured API
    pub fn new(config: &ConsoleConfig) -> ConsoleResult<Self> {
        let transport = HttpTransport::new(config)?;
        tracing::info!(base_url = %config.api.base_url, "REST client ready");
        Ok(Self::with_transport(Arc::new(transport), config.paging.clone()))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, paging: PagingConfig) -> Self {
        Self { transport, paging }
    }

    /// First page with the configured default size
    pub fn page_request(&self) -> PageRequest {
        self.page_request_sized(0, None)
    }

    /// Page `index` of `size` rows, capped at the configured maximum
    pub fn page_request_sized(&self, index: u32, size: Option<u32>) -> PageRequest {
        let size = size.unwrap_or(self.paging.default_page_size);
        PageRequest::new(index, size.min(self.paging.max_page_size))
    }

    /// Paginator over a base collection honoring the configured maximum size
    pub fn paginator<T: Entity>(&self, request: PageRequest) -> Paginator<T> {
        Paginator::with_max_page_size(
            Arc::new(self.resource::<T>().collection()),
            request,
            self.paging.max_page_size,
        )
    }

    fn resource<T: Entity>(&self) -> Resource<T> {
        Resource::new(self.transport.clone())
    }

    pub fn products(&self) -> Resource<Product> {
        self.resource()
    }

    pub fn product_versions(&self) -> Resource<ProductVersion> {
        self.resource()
    }

    pub fn projects(&self) -> Resource<Project> {
        self.resource()
    }

    pub fn build_configurations(&self) -> Resource<BuildConfiguration> {
        self.resource()
    }

    pub fn group_configurations(&self) -> Resource<GroupConfiguration> {
        self.resource()
    }

    pub fn builds(&self) -> Resource<BuildRecord> {
        self.resource()
    }

    pub fn group_builds(&self) -> Resource<GroupBuild> {
        self.resource()
    }

    pub fn artifacts(&self) -> Resource<Artifact> {
        self.resource()
    }
}
