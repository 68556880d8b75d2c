//! Entity-specific endpoints beyond CRUD

use bc_core::pagination::{Page, PageRequest};
use bc_core::result::ConsoleResult;
use bc_core::traits::Id;
use bc_models::{
    Artifact, BuildConfiguration, BuildRecord, GroupBuild, GroupConfiguration, Product,
    ProductVersion,
};
use bc_queries::presets;

use crate::resource::{decode, Collection, Resource};

/// How the scheduler decides whether a dependency must be rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebuildMode {
    #[default]
    ImplicitDependencyCheck,
    ExplicitDependencyCheck,
    Force,
}

impl RebuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImplicitDependencyCheck => "IMPLICIT_DEPENDENCY_CHECK",
            Self::ExplicitDependencyCheck => "EXPLICIT_DEPENDENCY_CHECK",
            Self::Force => "FORCE",
        }
    }
}

/// Options of a build trigger, sent as query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildParameters {
    pub temporary_build: bool,
    pub rebuild_mode: RebuildMode,
    pub keep_pod_on_failure: bool,
}

impl BuildParameters {
    pub fn temporary() -> Self {
        Self {
            temporary_build: true,
            ..Default::default()
        }
    }

    pub fn forced(mut self) -> Self {
        self.rebuild_mode = RebuildMode::Force;
        self
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("temporaryBuild", self.temporary_build.to_string()),
            ("rebuildMode", self.rebuild_mode.as_str().to_string()),
            ("keepPodOnFailure", self.keep_pod_on_failure.to_string()),
        ]
    }
}

impl Resource<Product> {
    pub fn versions(&self, product_id: Id) -> Collection<ProductVersion> {
        self.sub_collection(product_id, "versions")
    }
}

impl Resource<ProductVersion> {
    pub fn build_configurations(&self, version_id: Id) -> Collection<BuildConfiguration> {
        self.sub_collection(version_id, "build-configurations")
    }
}

impl Resource<BuildConfiguration> {
    /// Trigger a build of the configuration
    pub async fn build(&self, id: Id, parameters: &BuildParameters) -> ConsoleResult<BuildRecord> {
        let value = self
            .action_with(id, "build", &parameters.query_pairs())
            .await?;
        let build: BuildRecord = decode(value)?;
        tracing::info!(build_configuration = id, build = build.id, "build triggered");
        Ok(build)
    }

    pub fn builds_of(&self, id: Id) -> Collection<BuildRecord> {
        self.sub_collection(id, "builds")
    }

    pub async fn builds_page(
        &self,
        id: Id,
        request: &PageRequest,
    ) -> ConsoleResult<Page<BuildRecord>> {
        self.builds_of(id).list(request).await
    }
}

impl Resource<GroupConfiguration> {
    pub async fn build(&self, id: Id, parameters: &BuildParameters) -> ConsoleResult<GroupBuild> {
        let value = self
            .action_with(id, "build", &parameters.query_pairs())
            .await?;
        let build: GroupBuild = decode(value)?;
        tracing::info!(group_configuration = id, group_build = build.id, "group build triggered");
        Ok(build)
    }
}

impl Resource<BuildRecord> {
    pub async fn cancel(&self, id: Id) -> ConsoleResult<()> {
        self.action(id, "cancel").await?;
        tracing::info!(build = id, "build cancelled");
        Ok(())
    }

    /// Builds that have not finished, narrowed by the request's own filter
    pub async fn running(&self, request: &PageRequest) -> ConsoleResult<Page<BuildRecord>> {
        self.list(&running_request(request)).await
    }

    /// Artifacts produced by a build
    pub fn artifacts_of(&self, build_id: Id) -> Collection<Artifact> {
        self.sub_collection(build_id, "artifacts/built")
    }
}

impl Resource<GroupBuild> {
    pub async fn cancel(&self, id: Id) -> ConsoleResult<()> {
        self.action(id, "cancel").await?;
        tracing::info!(group_build = id, "group build cancelled");
        Ok(())
    }
}

impl Resource<Artifact> {
    pub async fn of_build(
        &self,
        build_id: Id,
        request: &PageRequest,
    ) -> ConsoleResult<Page<Artifact>> {
        Resource::<BuildRecord>::new(self.transport().clone())
            .artifacts_of(build_id)
            .list(request)
            .await
    }
}

fn running_request(request: &PageRequest) -> PageRequest {
    let running = presets::running_builds();
    let q = match &request.q {
        Some(q) => format!("{};({})", running, q),
        None => running,
    };
    request.clone().with_query(q)
}
