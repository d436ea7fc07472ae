use std::collections::VecDeque;

use log::trace;

use crate::graph::Graph;
use crate::traits::Pathfinder;

/// Breadth-first search: shortest path by hop count, ignoring costs.
pub struct Bfs<'g> {
    graph: &'g Graph,
}

impl<'g> Bfs<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    /// Compute a minimum-hop node path from `start` to `goal`.
    ///
    /// Each node is discovered once; the first time the goal is dequeued its
    /// predecessor chain is a minimum-hop path.
    pub fn find_path(&self, start: usize, goal: usize) -> Vec<usize> {
        let graph = self.graph;
        if !graph.is_node_valid(start) || !graph.is_node_valid(goal) {
            return Vec::new();
        }
        if start == goal {
            return vec![start];
        }

        let len = graph.nr_of_nodes();
        let mut came_from: Vec<Option<usize>> = vec![None; len];
        let mut discovered = vec![false; len];
        let mut queue: VecDeque<usize> = VecDeque::new();

        discovered[start] = true;
        queue.push_back(start);

        let mut found = false;
        while let Some(current) = queue.pop_front() {
            if current == goal {
                found = true;
                break;
            }
            for conn in graph.node_connections(current) {
                let next = conn.to();
                if next < len && !discovered[next] {
                    discovered[next] = true;
                    came_from[next] = Some(current);
                    queue.push_back(next);
                }
            }
        }

        if !found {
            trace!("bfs {start} -> {goal}: unreachable");
            return Vec::new();
        }

        let mut path = vec![goal];
        let mut cur = goal;
        while let Some(prev) = came_from[cur] {
            path.push(prev);
            cur = prev;
        }
        path.reverse();
        path
    }
}

impl Pathfinder for Bfs<'_> {
    fn find_path(&self, start: usize, goal: usize) -> Vec<usize> {
        Bfs::find_path(self, start, goal)
    }
}
