pub mod config;
pub mod estimator;
pub mod fit;
pub mod status;
pub mod store;
pub mod window;

pub use config::EstimatorConfig;
pub use estimator::{CycleTimestamp, RefreshEstimator};
pub use status::EstimatorStatus;
