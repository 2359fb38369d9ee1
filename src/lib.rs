// src/lib.rs

use std::sync::Arc;

use services::deal_importer::DealImporter;

#[derive(Clone)]
pub struct AppState {
    pub importer: Arc<DealImporter>,
}

pub mod entities {
    pub mod prelude;
    pub mod deals;
}

pub mod services {
    pub mod deal_store;
    pub mod memory_deal_store;
    pub mod deal_validator;
    pub mod duplicate_checker;
    pub mod deal_importer;
}

pub mod models {
    pub mod deal;
}

pub mod handlers {
    pub mod deal;
}

pub mod config;
pub mod error;
pub mod router;
