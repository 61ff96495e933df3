// Client cache module
// Author: kelexine (https://github.com/kelexine)

pub mod clock;
pub mod context;
pub mod manager;
pub mod models;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{BoxError, ClusterContext};
pub use manager::{cluster_name, fingerprint, ClientCache};
pub use models::{CacheConfig, CacheStats, ExpiryPolicy, DEFAULT_TTL};
