pub mod summary;
pub mod transaction;

pub use summary::{ForensicSummary, RankedCounterparty, TimeWindow};
pub use transaction::TxRecord;
