use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::services::drill::DrillService;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    drill: Arc<DrillService>,
}

impl AppState {
    pub fn new(drill: Arc<DrillService>) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            drill,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn drill(&self) -> Arc<DrillService> {
        Arc::clone(&self.drill)
    }
}
