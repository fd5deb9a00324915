use std::sync::Arc;

use crate::upstream::CitasBackend;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn CitasBackend>,
}
