use std::sync::Arc;

use crate::config::Config;
use crate::window::TimestampService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: TimestampService,
}

impl AppState {
    pub fn new(config: Config, service: TimestampService) -> Self {
        Self {
            config: Arc::new(config),
            service,
        }
    }
}
