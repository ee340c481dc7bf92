pub mod counterparty;
pub mod types;

pub use counterparty::cluster_counterparties;
pub use types::{
    AmountFinding, ClusterReport, CounterpartyFinding, DustFinding, TimingFinding,
};
