use serde::Serialize;

use crate::anomaly::AnomalyRecord;
use crate::cluster::ClusterReport;
use crate::entity::EntityInfo;
use crate::graph::TaintTrace;
use crate::patterns::PatternSet;

/// Inclusive timestamp window for pre-filtering an analysis.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    pub start_ts: i64,
    pub end_ts: i64,
}

impl TimeWindow {
    pub fn contains(&self, timestamp: i64) -> bool {
        self.start_ts <= timestamp && timestamp <= self.end_ts
    }
}

/// A counterparty ranked by cumulative transferred value.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCounterparty {
    pub address: String,
    pub total_amount: f64,
}

/// The complete result of one analysis call: aggregate statistics, detected
/// patterns, risk assessment, clustering findings, anomalies and the taint
/// trace. Serializes to plain JSON so any rendering layer can consume it.
#[derive(Debug, Serialize)]
pub struct ForensicSummary {
    pub root_address: String,
    pub total_transactions: usize,
    pub total_volume_in: f64,
    pub total_volume_out: f64,
    pub net_flow: f64,
    pub unique_senders: usize,
    pub unique_receivers: usize,
    pub avg_transaction_value: f64,
    pub median_transaction_value: f64,
    pub max_transaction_value: f64,
    pub top_victims: Vec<RankedCounterparty>,
    pub top_suspects: Vec<RankedCounterparty>,
    pub cash_out_points: Vec<String>,
    pub patterns: PatternSet,
    pub risk_score: u8,
    pub risk_factors: Vec<String>,
    pub confidence_score: u8,
    pub entity_info: EntityInfo,
    pub clusters: ClusterReport,
    pub anomalies: Vec<AnomalyRecord>,
    pub taint: TaintTrace,
}
