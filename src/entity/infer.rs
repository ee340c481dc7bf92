use serde::Serialize;

use super::directory::EntityDirectory;
use crate::model::TxRecord;

/// Best-effort classification of the root address.
#[derive(Debug, Clone, Serialize)]
pub struct EntityInfo {
    pub name: String,
    pub entity_type: String,
    pub risk_tier: String,
    pub confidence: String,
}

/// Classify the root address: a directory hit wins outright, otherwise the
/// in/out transaction shape is used as a weak heuristic.
pub fn infer_entity(
    root_address: &str,
    transactions: &[TxRecord],
    directory: &dyn EntityDirectory,
) -> EntityInfo {
    let root = root_address.trim().to_lowercase();

    if let Some(label) = directory.lookup(&root) {
        return EntityInfo {
            name: label.entity_name.clone(),
            entity_type: label.entity_type.clone(),
            risk_tier: label.risk_tier.clone(),
            confidence: "high".to_string(),
        };
    }

    let incoming = transactions
        .iter()
        .filter(|tx| tx.recipient() == root)
        .count();
    let outgoing = transactions.iter().filter(|tx| tx.sender() == root).count();

    if incoming > outgoing * 5 {
        return EntityInfo {
            name: "Possible exchange/aggregator".to_string(),
            entity_type: "exchange".to_string(),
            risk_tier: "low".to_string(),
            confidence: "medium".to_string(),
        };
    }
    if incoming > outgoing * 2 {
        return EntityInfo {
            name: "Possible mixer service".to_string(),
            entity_type: "mixer".to_string(),
            risk_tier: "high".to_string(),
            confidence: "medium".to_string(),
        };
    }
    if incoming == 0 && outgoing > 20 {
        return EntityInfo {
            name: "Distribution wallet".to_string(),
            entity_type: "contract".to_string(),
            risk_tier: "medium".to_string(),
            confidence: "medium".to_string(),
        };
    }

    EntityInfo {
        name: "Unknown address".to_string(),
        entity_type: "unknown".to_string(),
        risk_tier: "unknown".to_string(),
        confidence: "low".to_string(),
    }
}
