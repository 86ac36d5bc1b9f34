//! Subcommand bodies
//!
//! Each command opens a service over a JSON snapshot, loads what it needs
//! and returns a serializable result for `main` to print.

use anyhow::{Context, Result};
use roadmap_core::{RoadmapConfig, RoadmapService};
use roadmap_flow::{FlowEdge, FlowNode};
use roadmap_model::{NodeId, Roadmap};
use roadmap_progress::{Progress, ViewerKey};
use roadmap_store::MemoryStore;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory used for progress records when nothing else is configured
pub const DEFAULT_PROGRESS_DIR: &str = "progress";

/// Where to read the graph and keep progress
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub snapshot: PathBuf,
    pub config: Option<PathBuf>,
    pub progress_dir: Option<PathBuf>,
}

impl Sources {
    #[must_use]
    pub fn new(snapshot: impl Into<PathBuf>) -> Self {
        Self {
            snapshot: snapshot.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_progress_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.progress_dir = Some(dir.into());
        self
    }

    /// Configuration with the progress directory resolved
    ///
    /// Precedence: `--progress-dir`, then the config file, then a `progress`
    /// directory beside the snapshot.
    pub fn resolve_config(&self) -> Result<RoadmapConfig> {
        let mut config = match &self.config {
            Some(path) => RoadmapConfig::load(path)?,
            None => RoadmapConfig::default(),
        };
        if let Some(dir) = &self.progress_dir {
            config = config.with_progress_dir(dir);
        } else if config.progress.storage_dir.is_none() {
            let beside = self
                .snapshot
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(DEFAULT_PROGRESS_DIR);
            config = config.with_progress_dir(beside);
        }
        Ok(config)
    }

    /// Service over the snapshot
    pub fn open(&self) -> Result<RoadmapService> {
        let store = MemoryStore::load_json(&self.snapshot)
            .with_context(|| format!("failed to load snapshot {}", self.snapshot.display()))?;
        let config = self.resolve_config()?;
        tracing::debug!(snapshot = %self.snapshot.display(), "opened snapshot");
        Ok(RoadmapService::from_config(Arc::new(store), config))
    }
}

/// Canvas primitives of one roadmap
#[derive(Debug, Clone, Serialize)]
pub struct FlowView {
    pub roadmap: Roadmap,
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

/// What `progress` should do before reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressAction {
    Show,
    Toggle(NodeId),
    Reset,
}

/// Progress report with the viewer's completed nodes
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub viewer: String,
    #[serde(flatten)]
    pub progress: Progress,
    pub completed_nodes: Vec<NodeId>,
}

pub async fn list_roadmaps(service: &RoadmapService, published_only: bool) -> Result<Vec<Roadmap>> {
    let roadmaps = if published_only {
        service.fetch_published_roadmaps().await?
    } else {
        service.fetch_roadmaps().await?
    };
    Ok(roadmaps)
}

pub async fn flow(service: &RoadmapService, slug: &str) -> Result<FlowView> {
    let graph = service
        .fetch_roadmap_by_slug(slug)
        .await
        .with_context(|| format!("cannot load roadmap '{slug}'"))?;
    Ok(FlowView {
        roadmap: graph.roadmap,
        nodes: service.get_flow_nodes(),
        edges: service.get_flow_edges(),
    })
}

/// Integrity problems of a stored roadmap, as messages
pub async fn validate(service: &RoadmapService, slug: &str) -> Result<Vec<String>> {
    service
        .fetch_roadmap_by_slug(slug)
        .await
        .with_context(|| format!("cannot load roadmap '{slug}'"))?;
    let problems: Vec<String> = service.audit().iter().map(ToString::to_string).collect();
    if problems.is_empty() {
        tracing::info!("roadmap {} is consistent", slug);
    } else {
        tracing::warn!("roadmap {} has {} problem(s)", slug, problems.len());
    }
    Ok(problems)
}

pub async fn progress(
    service: &RoadmapService,
    slug: &str,
    viewer: ViewerKey,
    action: ProgressAction,
) -> Result<ProgressReport> {
    let graph = service
        .fetch_roadmap_by_slug(slug)
        .await
        .with_context(|| format!("cannot load roadmap '{slug}'"))?;
    service.switch_viewer(viewer.clone());

    match action {
        ProgressAction::Show => {}
        ProgressAction::Toggle(node) => {
            let done = service.toggle_node_completed(&node)?;
            tracing::info!("node {} is now {}", node, if done { "completed" } else { "open" });
        }
        ProgressAction::Reset => service.reset_progress(&graph.roadmap.id),
    }

    let completed = service.completed_nodes();
    let mut completed_nodes: Vec<NodeId> = graph
        .nodes
        .iter()
        .filter(|n| completed.contains(&n.id))
        .map(|n| n.id.clone())
        .collect();
    completed_nodes.sort();

    Ok(ProgressReport {
        viewer: viewer.to_string(),
        progress: service.get_progress(&graph.roadmap.id),
        completed_nodes,
    })
}
