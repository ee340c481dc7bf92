pub mod detector;
pub mod features;
pub mod forest;

pub use detector::{detect_anomalies, AnomalyRecord};
pub use forest::IsolationForest;
