//! Search bookkeeping shared by A* and JPS.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::trace;

use crate::graph::Graph;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Per-node search state. Lives for a single search call.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NodeRecord {
    /// Node this record was reached from; `None` for the start node.
    pub(crate) parent: Option<usize>,
    /// Accumulated connection cost from the start (g).
    pub(crate) cost_so_far: f32,
    /// `cost_so_far` plus the heuristic estimate to the goal (f).
    pub(crate) estimated_total_cost: f32,
    /// Heap entry that is current for this record.
    seq: u64,
    open: bool,
}

/// Heap entry, ordered so that `BinaryHeap` pops the lowest `f` first and
/// the earliest pushed entry among equal `f`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OpenEntry {
    pub(crate) node: usize,
    pub(crate) f: f32,
    pub(crate) seq: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both keys: BinaryHeap is a max-heap.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Best-first skeleton
// ---------------------------------------------------------------------------

/// Heuristic best-first search from `start` to `goal`.
///
/// `estimate(n)` is the heuristic cost from `n` to the goal.
/// `successors(n, parent, out)` appends `(node, step_cost)` pairs reachable
/// from `n`; A* lists graph connections, JPS lists jump points.
///
/// An existing open or closed record with a cost not above the tentative
/// cost blocks relaxation; otherwise the record is replaced and the node
/// (re)opened. Returns the node path from start to goal, `[start]` when
/// both are equal, or an empty path when the goal is unreachable or either
/// endpoint is inactive.
pub(crate) fn best_first_search<E, S>(
    graph: &Graph,
    start: usize,
    goal: usize,
    estimate: E,
    mut successors: S,
) -> Vec<usize>
where
    E: Fn(usize) -> f32,
    S: FnMut(usize, Option<usize>, &mut Vec<(usize, f32)>),
{
    if !graph.is_node_valid(start) || !graph.is_node_valid(goal) {
        return Vec::new();
    }
    if start == goal {
        return vec![start];
    }

    let mut records: Vec<Option<NodeRecord>> = vec![None; graph.nr_of_nodes()];
    let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
    let mut seq: u64 = 0;

    let start_f = estimate(start);
    records[start] = Some(NodeRecord {
        parent: None,
        cost_so_far: 0.0,
        estimated_total_cost: start_f,
        seq,
        open: true,
    });
    open.push(OpenEntry {
        node: start,
        f: start_f,
        seq,
    });
    seq += 1;

    let mut buf = Vec::new();
    let mut expanded = 0usize;

    let found = 'search: loop {
        let Some(current) = open.pop() else {
            break 'search false;
        };
        let Some(rec) = records[current.node].as_mut() else {
            continue;
        };
        // Skip stale entries.
        if !rec.open || rec.seq != current.seq {
            continue;
        }
        if current.node == goal {
            break 'search true;
        }
        rec.open = false;
        expanded += 1;
        let cost_so_far = rec.cost_so_far;
        let parent = rec.parent;

        buf.clear();
        successors(current.node, parent, &mut buf);

        for &(next, step) in &buf {
            let Some(slot) = records.get_mut(next) else {
                continue;
            };
            let tentative = cost_so_far + step;
            if let Some(existing) = slot {
                if existing.cost_so_far <= tentative {
                    continue;
                }
            }
            let f = tentative + estimate(next);
            *slot = Some(NodeRecord {
                parent: Some(current.node),
                cost_so_far: tentative,
                estimated_total_cost: f,
                seq,
                open: true,
            });
            open.push(OpenEntry { node: next, f, seq });
            seq += 1;
        }
    };

    if !found {
        trace!("search {start} -> {goal}: open set exhausted after {expanded} expansions");
        return Vec::new();
    }

    let path = reconstruct(&records, goal);
    trace!(
        "search {start} -> {goal}: {} nodes, cost {}, {expanded} expansions",
        path.len(),
        records[goal].map_or(f32::NAN, |r| r.estimated_total_cost)
    );
    path
}

/// Walk parent links back from `goal` and reverse. Bounded by the record
/// table size so a corrupt chain cannot loop.
fn reconstruct(records: &[Option<NodeRecord>], goal: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut cur = Some(goal);
    while let Some(idx) = cur {
        if path.len() > records.len() {
            return Vec::new();
        }
        path.push(idx);
        cur = records[idx].and_then(|r| r.parent);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_entries_pop_lowest_f_then_fifo() {
        let mut heap = BinaryHeap::new();
        heap.push(OpenEntry { node: 0, f: 5.0, seq: 0 });
        heap.push(OpenEntry { node: 1, f: 2.0, seq: 1 });
        heap.push(OpenEntry { node: 2, f: 2.0, seq: 2 });
        heap.push(OpenEntry { node: 3, f: 9.0, seq: 3 });
        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn reconstruct_follows_parents() {
        let rec = |parent| {
            Some(NodeRecord {
                parent,
                cost_so_far: 0.0,
                estimated_total_cost: 0.0,
                seq: 0,
                open: false,
            })
        };
        let records = vec![rec(None), rec(Some(2)), rec(Some(0))];
        assert_eq!(reconstruct(&records, 1), vec![0, 2, 1]);
    }
}
