//! Tests for process model view caching

mod common;

use std::sync::Arc;

use chatflow_filters::{CaseFilter, EventLogView};
use chatflow_models::{DfgModel, ProcessModel, ProcessModelView, RenderOptions};
use common::*;

fn counting_view(model: &Arc<CountingModel>) -> ProcessModelView {
    let shared: Arc<dyn ProcessModel> = Arc::clone(model) as Arc<dyn ProcessModel>;
    ProcessModelView::from_shared(EventLogView::new(two_cases()), shared)
}

#[test]
fn test_compute_runs_model_once_for_unchanged_view() {
    let model = CountingModel::shared();
    let mut view = counting_view(&model);

    let first = view.compute().unwrap();
    let second = view.compute().unwrap();

    assert_eq!(model.computes(), 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_changed_filters_recompute() {
    let model = CountingModel::shared();
    let mut view = counting_view(&model);
    let all = view.compute().unwrap();

    let narrowed = view.log_view().filter(CaseFilter::new(["c2"]));
    view.set_log_view(narrowed);
    let only_c2 = view.compute().unwrap();

    assert_eq!(model.computes(), 2);
    assert_ne!(all, only_c2);
    assert_eq!(only_c2.as_dfg().unwrap().weight("A", "B"), 0);
}

#[test]
fn test_equivalent_view_reuses_artifact() {
    let model = CountingModel::shared();
    let mut view = counting_view(&model);
    view.compute().unwrap();

    // a filter that keeps every row leaves the content unchanged
    let same_rows = view.log_view().filter(CaseFilter::new(["c1", "c2"]));
    view.set_log_view(same_rows);
    view.compute().unwrap();

    assert_eq!(model.computes(), 1);
}

#[test]
fn test_render_cache_per_options() {
    let model = CountingModel::shared();
    let mut view = counting_view(&model);
    let defaults = RenderOptions::default();
    let capped = RenderOptions::default().with_max_num_edges(1);

    let a = view.to_graphviz(&defaults).unwrap();
    let b = view.to_graphviz(&defaults).unwrap();
    let c = view.to_graphviz(&capped).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_ne!(a, c);
    assert_eq!(model.computes(), 1);
    assert_eq!(model.renders(), 2);
    assert_eq!(view.render_cache_len(), 2);
}

#[test]
fn test_new_content_clears_render_cache() {
    let model = CountingModel::shared();
    let mut view = counting_view(&model);
    view.to_graphviz(&RenderOptions::default()).unwrap();
    assert_eq!(view.render_cache_len(), 1);

    let narrowed = view.log_view().filter(CaseFilter::new(["c1"]));
    view.set_log_view(narrowed);
    view.compute().unwrap();

    assert_eq!(view.render_cache_len(), 0);
    view.to_graphviz(&RenderOptions::default()).unwrap();
    assert_eq!(model.renders(), 2);
}

#[test]
fn test_recompute_equals_cached_value() {
    let mut cached = ProcessModelView::new(EventLogView::new(two_cases()), DfgModel);
    let mut fresh = ProcessModelView::new(EventLogView::new(two_cases()), DfgModel);

    cached.compute().unwrap();
    assert_eq!(cached.compute().unwrap(), fresh.compute().unwrap());
    assert!(cached.cached_artifact().is_some());
}

#[test]
fn test_model_error_propagates() {
    let mut view = ProcessModelView::new(EventLogView::new(two_cases()), FailingModel);
    assert!(view.compute().is_err());
    assert!(view.cached_artifact().is_none());
}
