use tripscan::TransitModel;

use crate::config::{Config, Limits, QueryDefaults};

/// Shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub model: TransitModel,
    pub defaults: QueryDefaults,
    pub limits: Limits,
}

impl AppState {
    pub fn new(model: TransitModel, config: &Config) -> Self {
        Self {
            model,
            defaults: config.query,
            limits: config.limits,
        }
    }
}
