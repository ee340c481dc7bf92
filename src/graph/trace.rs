use serde::Serialize;
use std::collections::VecDeque;

use super::builder::FlowGraph;
use crate::config::TaintConfig;
use crate::entity::EntityDirectory;

/// A terminal fund-flow path from the traced source.
#[derive(Debug, Clone, Serialize)]
pub struct TaintPath {
    pub path: Vec<String>,
    pub depth: usize,
    pub terminated_at: String,
}

/// A known entity encountered while walking outbound flows.
#[derive(Debug, Clone, Serialize)]
pub struct TaintTouch {
    pub address: String,
    pub entity_name: String,
    pub found_at_depth: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaintRisk {
    pub risk_score: u8,
    pub risk_level: String,
    pub risk_factors: Vec<String>,
}

/// Where funds leaving the source ended up, and how obscured the route was.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaintTrace {
    pub source: String,
    pub paths: Vec<TaintPath>,
    pub mixer_hops: Vec<TaintTouch>,
    pub bridge_hops: Vec<TaintTouch>,
    pub exchange_deposits: Vec<TaintTouch>,
    pub max_depth_reached: usize,
    pub risk: TaintRisk,
}

// Dense graphs can branch into an enormous number of distinct paths even
// with the depth bound; recording stops once this many are collected.
const MAX_RECORDED_PATHS: usize = 100;

/// Breadth-first walk of outbound flows from `source`, avoiding per-path
/// revisits. A path is recorded when it cannot be extended, either because
/// the depth bound was hit or its tip has no unvisited successors. Known
/// mixers, bridges and exchanges along the way are reported via the
/// injected directory.
pub fn trace_taint(
    flow: &FlowGraph,
    source_address: &str,
    directory: &dyn EntityDirectory,
    config: &TaintConfig,
) -> TaintTrace {
    let source = source_address.trim().to_lowercase();
    let mut trace = TaintTrace {
        source: source.clone(),
        ..TaintTrace::default()
    };

    let mut queue: VecDeque<Vec<String>> = VecDeque::new();
    queue.push_back(vec![source]);

    while let Some(path) = queue.pop_front() {
        let current = path.last().cloned().unwrap_or_default();
        let depth = path.len() - 1;
        trace.max_depth_reached = trace.max_depth_reached.max(depth);

        if let Some(label) = directory.lookup(&current) {
            let touch = TaintTouch {
                address: current.clone(),
                entity_name: label.entity_name.clone(),
                found_at_depth: depth,
            };
            match label.entity_type.as_str() {
                "mixer" => trace.mixer_hops.push(touch),
                "bridge" => trace.bridge_hops.push(touch),
                "exchange" => trace.exchange_deposits.push(touch),
                _ => {}
            }
        }

        let successors: Vec<&String> = flow
            .successors(&current)
            .into_iter()
            .filter(|next| !path.contains(next))
            .collect();

        if depth >= config.max_depth || successors.is_empty() {
            if path.len() > 1 && trace.paths.len() < MAX_RECORDED_PATHS {
                trace.paths.push(TaintPath {
                    depth,
                    terminated_at: current,
                    path,
                });
            }
            continue;
        }

        for next in successors {
            let mut extended = path.clone();
            extended.push(next.clone());
            queue.push_back(extended);
        }
    }

    trace.risk = assess_taint_risk(&trace);
    trace
}

/// Additive taint risk: mixing raises it most, bridges somewhat, deposits
/// to known exchanges lower it (funds become traceable again), and long
/// transfer chains suggest deliberate obfuscation.
fn assess_taint_risk(trace: &TaintTrace) -> TaintRisk {
    let mut score: i32 = 0;
    let mut factors = Vec::new();

    if !trace.mixer_hops.is_empty() {
        score += 30;
        factors.push(format!(
            "Funds passed through {} mixer hop(s)",
            trace.mixer_hops.len()
        ));
    }
    if !trace.bridge_hops.is_empty() {
        score += 15;
        factors.push(format!(
            "Cross-chain bridge activity detected ({})",
            trace.bridge_hops.len()
        ));
    }
    if !trace.exchange_deposits.is_empty() {
        score -= 10;
        factors.push(format!(
            "Deposited to {} known exchange(s)",
            trace.exchange_deposits.len()
        ));
    }
    if trace.max_depth_reached > 5 {
        score += 15;
        factors.push("Deep chain of transfers (obfuscation attempt)".to_string());
    }

    let score = score.clamp(0, 100) as u8;
    let level = match score {
        80..=100 => "critical",
        60..=79 => "high",
        40..=59 => "medium",
        _ => "low",
    };

    TaintRisk {
        risk_score: score,
        risk_level: level.to_string(),
        risk_factors: factors,
    }
}
