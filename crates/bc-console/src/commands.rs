use std::io::Write;

use anyhow::Context;
use bc_client::{Client, Resource};
use bc_core::config::ConsoleConfig;
use bc_core::pagination::{Page, PageRequest};
use bc_core::preferences::{sort_key, PreferenceValue, Preferences};
use bc_core::traits::Entity;
use bc_models::BuildRecord;
use bc_notifications::{merge_update, ConsoleEvent, EventBus, EventBusAdapter, MergeOutcome};
use bc_queries::sorts::default_build_sort;
use futures::stream;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::EntityKind;

/// `page 3/5 (total 120)`, one-based for humans
pub fn footer<T>(page: &Page<T>) -> String {
    let shown = if page.total_pages() == 0 { 0 } else { page.index + 1 };
    format!("page {}/{} (total {})", shown, page.total_pages(), page.total_count)
}

fn print_rows<T: Serialize>(rows: &[T]) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for row in rows {
        writeln!(out, "{}", serde_json::to_string(row)?)?;
    }
    Ok(())
}

async fn print_page<T: Entity>(resource: Resource<T>, request: &PageRequest) -> anyhow::Result<()> {
    let page = resource.list(request).await?;
    print_rows(&page.data)?;
    println!("{}", footer(&page));
    Ok(())
}

/// Sort from the command line, else the one remembered for this list
fn resolve_sort(
    config: &ConsoleConfig,
    entity: EntityKind,
    sort: Option<String>,
) -> anyhow::Result<Option<String>> {
    let Some(path) = &config.preferences_path else {
        return Ok(sort);
    };
    let key = sort_key(entity.list_name());
    let mut preferences = Preferences::load(path)?;

    match sort {
        Some(sort) => {
            preferences.set(key, PreferenceValue::String(sort.clone()));
            preferences
                .save(path)
                .with_context(|| format!("saving preferences to {}", path.display()))?;
            Ok(Some(sort))
        }
        None => Ok(preferences.get_string(&key).map(str::to_string)),
    }
}

pub async fn list(
    config: &ConsoleConfig,
    entity: EntityKind,
    index: u32,
    size: Option<u32>,
    query: Option<String>,
    sort: Option<String>,
) -> anyhow::Result<()> {
    let client = Client::new(config)?;
    let mut request = client.page_request_sized(index, size);
    if let Some(q) = query {
        request = request.with_query(q);
    }
    if let Some(sort) = resolve_sort(config, entity, sort)? {
        request = request.with_sort(sort);
    }
    tracing::debug!(entity = entity.list_name(), ?request, "listing");

    match entity {
        EntityKind::Products => print_page(client.products(), &request).await,
        EntityKind::ProductVersions => print_page(client.product_versions(), &request).await,
        EntityKind::Projects => print_page(client.projects(), &request).await,
        EntityKind::BuildConfigurations => {
            print_page(client.build_configurations(), &request).await
        }
        EntityKind::GroupConfigurations => {
            print_page(client.group_configurations(), &request).await
        }
        EntityKind::Builds => print_page(client.builds(), &request).await,
        EntityKind::GroupBuilds => print_page(client.group_builds(), &request).await,
        EntityKind::Artifacts => print_page(client.artifacts(), &request).await,
    }
}

/// Stdin as a push channel, one frame per line
fn stdin_frames() -> impl futures::Stream<Item = Result<String, std::io::Error>> {
    let lines = BufReader::new(tokio::io::stdin()).lines();
    stream::unfold(lines, |mut lines| async move {
        match lines.next_line().await {
            Ok(Some(line)) => Some((Ok(line), lines)),
            Ok(None) => None,
            Err(err) => Some((Err(err), lines)),
        }
    })
}

/// Patch the build with the update's id; returns the patched row
fn apply_status(rows: &mut [BuildRecord], event: &ConsoleEvent) -> Option<BuildRecord> {
    let ConsoleEvent::BuildStatusChanged(update) = event else {
        return None;
    };
    match merge_update(rows, update) {
        MergeOutcome::Updated(position) => Some(rows[position].clone()),
        MergeOutcome::Ignored => None,
    }
}

pub async fn follow(config: &ConsoleConfig, size: Option<u32>) -> anyhow::Result<()> {
    let client = Client::new(config)?;
    let request = client
        .page_request_sized(0, size)
        .with_sort(default_build_sort().to_param());

    let pages = client.paginator::<BuildRecord>(request);
    let page = pages.get(0).await.context("loading latest builds")?;
    print_rows(&page.data)?;
    println!("{}", footer(&page));

    let bus = EventBus::new();
    let mut events = bus.subscribe();
    let adapter = EventBusAdapter::new(bus);
    let pump = tokio::spawn(async move { adapter.run(stdin_frames()).await });

    while let Some(event) = events.recv().await {
        match &event {
            ConsoleEvent::BuildStatusChanged(_) => {
                let mut patched = None;
                pages.patch(|rows| {
                    patched = apply_status(rows, &event);
                    patched.is_some()
                });
                match patched {
                    Some(row) => print_rows(&[row])?,
                    None => tracing::debug!("status change for a build not on this page"),
                }
            }
            ConsoleEvent::MaintenanceModeOn => tracing::warn!("maintenance mode on"),
            ConsoleEvent::MaintenanceModeOff => tracing::info!("maintenance mode off"),
            ConsoleEvent::Announcement(announcement) => {
                tracing::info!(banner = %announcement.banner, "announcement")
            }
            other => tracing::debug!(kind = other.kind().as_str(), "event"),
        }
    }

    let stats = pump.await.context("push channel task")??;
    tracing::info!(frames = stats.frames, published = stats.published, "done");
    Ok(())
}
