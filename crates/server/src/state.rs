//! Shared application state.

use std::sync::Arc;

use agentops_inference::TextAnalyzer;
use agentops_reporting::PerformanceMonitor;
use agentops_storage::DataStore;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Record store
    pub store: Arc<dyn DataStore>,
    /// Inference backend
    pub analyzer: Arc<dyn TextAnalyzer>,
    /// Reporting service over `store`
    pub monitor: PerformanceMonitor,
}

impl AppState {
    /// Build state from a store and an analyzer.
    pub fn new(store: Arc<dyn DataStore>, analyzer: Arc<dyn TextAnalyzer>) -> Self {
        Self {
            monitor: PerformanceMonitor::new(store.clone()),
            store,
            analyzer,
        }
    }
}
