mod callback_api;

pub use callback_api::{router, CallbackApi, CallbackState};

// Re-export for external use (e.g., integration tests)
#[allow(unused_imports)]
pub use callback_api::{PoolDestroyedRequest, PoolStatsRequest, PortRequest};
