//! A process model bound to an event log view, with result caches
//!
//! The artifact cache holds one slot keyed by the content fingerprint of the
//! materialized log view. A different fingerprint means the view now selects
//! different rows: the artifact is recomputed and every cached diagram is
//! dropped. Diagrams are cached per exact [`RenderOptions`].

use std::collections::HashMap;
use std::sync::Arc;

use chatflow_core::{EventTableExt, Result, TableFingerprint};
use chatflow_filters::EventLogView;
use tracing::{debug, instrument, trace};

use crate::artifact::{Diagram, ModelArtifact};
use crate::config::RenderOptions;
use crate::model::ProcessModel;

#[derive(Debug, Clone)]
pub struct ProcessModelView {
    log_view: EventLogView,
    model: Arc<dyn ProcessModel>,
    cached: Option<(TableFingerprint, Arc<ModelArtifact>)>,
    render_cache: HashMap<RenderOptions, Arc<Diagram>>,
}

impl ProcessModelView {
    pub fn new(log_view: EventLogView, model: impl ProcessModel + 'static) -> Self {
        Self::from_shared(log_view, Arc::new(model))
    }

    /// View over a model shared with other views
    pub fn from_shared(log_view: EventLogView, model: Arc<dyn ProcessModel>) -> Self {
        Self {
            log_view,
            model,
            cached: None,
            render_cache: HashMap::new(),
        }
    }

    pub fn log_view(&self) -> &EventLogView {
        &self.log_view
    }

    pub fn model(&self) -> &Arc<dyn ProcessModel> {
        &self.model
    }

    /// Bind another log view; caches are kept until the next
    /// [`compute`](Self::compute) finds different content
    pub fn set_log_view(&mut self, log_view: EventLogView) {
        self.log_view = log_view;
    }

    /// Artifact from the last computation, if any
    pub fn cached_artifact(&self) -> Option<&Arc<ModelArtifact>> {
        self.cached.as_ref().map(|(_, artifact)| artifact)
    }

    pub fn render_cache_len(&self) -> usize {
        self.render_cache.len()
    }

    /// Model artifact of the current log view.
    ///
    /// The model runs only when the materialized view differs from the one
    /// the cached artifact was computed from.
    #[instrument(skip(self), fields(model = self.model.name()))]
    pub fn compute(&mut self) -> Result<Arc<ModelArtifact>> {
        let table = self.log_view.compute()?;
        let fingerprint = table.fingerprint()?;

        if let Some((cached_fp, artifact)) = &self.cached {
            if *cached_fp == fingerprint {
                trace!(%fingerprint, "artifact cache hit");
                return Ok(Arc::clone(artifact));
            }
        }

        let artifact = Arc::new(self.model.compute(&table)?);
        debug!(%fingerprint, rows = table.height(), "model computed");
        self.render_cache.clear();
        self.cached = Some((fingerprint, Arc::clone(&artifact)));
        Ok(artifact)
    }

    /// Diagram of the current artifact rendered with `options`
    pub fn to_graphviz(&mut self, options: &RenderOptions) -> Result<Arc<Diagram>> {
        let artifact = self.compute()?;
        if let Some(diagram) = self.render_cache.get(options) {
            trace!("render cache hit");
            return Ok(Arc::clone(diagram));
        }

        let diagram = Arc::new(self.model.to_graphviz(&artifact, options)?);
        self.render_cache.insert(options.clone(), Arc::clone(&diagram));
        Ok(diagram)
    }
}
