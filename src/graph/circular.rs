use serde::Serialize;
use std::collections::HashSet;

use super::builder::AddressGraph;
use crate::config::CircularConfig;

/// A closed A -> ... -> A walk through the relationship graph.
#[derive(Debug, Clone, Serialize)]
pub struct CircularFinding {
    pub path: Vec<String>,
    pub pattern: String,
    pub risk_score: f64,
    pub is_suspicious: bool,
}

/// Depth-limited DFS from `start` over the undirected address graph,
/// collecting cycles that return to the start. Uses an explicit stack so
/// pathological graphs cannot blow the call stack. Nodes on the current
/// branch are excluded from revisits; nodes off the branch may appear in
/// other paths. A cycle needs at least two intermediate hops, which rules
/// out the trivial A -> B -> A reflection over a single undirected edge.
/// The first `max_findings` cycles in DFS order are returned; sorted
/// neighbor iteration makes that order reproducible.
pub fn find_circular_patterns(
    graph: &AddressGraph,
    start_address: &str,
    config: &CircularConfig,
) -> Vec<CircularFinding> {
    let start = start_address.trim().to_lowercase();
    let mut findings = Vec::new();
    if !graph.contains(&start) {
        return findings;
    }

    // path[i] is the node at depth i+1; visited mirrors it for O(1) lookups.
    let mut path: Vec<String> = vec![start.clone()];
    let mut visited: HashSet<String> = HashSet::from([start.clone()]);
    // One frame per node on the path: its sorted neighbor list and a cursor.
    let mut stack: Vec<(Vec<String>, usize)> =
        vec![(graph.neighbors(&start).cloned().collect(), 0)];

    while let Some((neighbors, cursor)) = stack.last_mut() {
        if *cursor >= neighbors.len() {
            stack.pop();
            if let Some(node) = path.pop() {
                visited.remove(&node);
            }
            continue;
        }

        let next = neighbors[*cursor].clone();
        *cursor += 1;

        if next == start {
            if path.len() >= 3 {
                let mut cycle = path.clone();
                cycle.push(start.clone());
                findings.push(CircularFinding {
                    path: cycle,
                    pattern: "circular".to_string(),
                    risk_score: 0.8,
                    is_suspicious: true,
                });
                if findings.len() >= config.max_findings {
                    return findings;
                }
            }
            continue;
        }

        if visited.contains(&next) {
            continue;
        }
        // Strict depth bound: never walk deeper than max_depth nodes.
        if path.len() + 1 > config.max_depth {
            continue;
        }

        visited.insert(next.clone());
        path.push(next.clone());
        stack.push((graph.neighbors(&next).cloned().collect(), 0));
    }

    findings
}
