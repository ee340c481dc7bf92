use serde::Serialize;

use crate::graph::CircularFinding;

/// An address with frequent interaction with the root.
#[derive(Debug, Clone, Serialize)]
pub struct CounterpartyFinding {
    pub address: String,
    pub connection_type: String,
    pub risk_score: f64,
}

/// A recipient of at least one sub-threshold outgoing amount.
#[derive(Debug, Clone, Serialize)]
pub struct DustFinding {
    pub address: String,
    pub pattern: String,
    pub risk_score: f64,
    pub is_suspicious: bool,
}

/// A burst of transactions with short consecutive gaps.
#[derive(Debug, Clone, Serialize)]
pub struct TimingFinding {
    pub cluster_size: usize,
    pub time_range: String,
    pub pattern: String,
    pub risk_score: f64,
    pub is_suspicious: bool,
}

/// One amount value repeated across several distinct recipients.
#[derive(Debug, Clone, Serialize)]
pub struct AmountFinding {
    pub amount: f64,
    pub recipient_count: usize,
    pub pattern: String,
    pub risk_score: f64,
    pub is_suspicious: bool,
}

/// The fixed-shape clustering result map. `mixer_outputs` is reserved for
/// a dedicated mixer-output tracer and is currently always empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterReport {
    pub suspicious_counterparties: Vec<CounterpartyFinding>,
    pub mixer_outputs: Vec<DustFinding>,
    pub dust_attacks: Vec<DustFinding>,
    pub circular_patterns: Vec<CircularFinding>,
    pub timing_clusters: Vec<TimingFinding>,
    pub amount_clusters: Vec<AmountFinding>,
}
