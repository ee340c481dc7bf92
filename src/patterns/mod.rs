pub mod detector;
pub mod risk;

pub use detector::{detect_patterns, PatternSet};
pub use risk::{confidence_score, score_risk, RiskAssessment};
