/// Common interface of the node-path searches ([`AStar`](crate::AStar),
/// [`Bfs`](crate::Bfs), [`Jps`](crate::Jps)).
pub trait Pathfinder {
    /// Node indices from `start` to `goal`, both included.
    ///
    /// Returns `[start]` when `start == goal` is an active node, whatever
    /// its terrain, and an empty path when the goal cannot be reached or
    /// either endpoint is not an active node.
    fn find_path(&self, start: usize, goal: usize) -> Vec<usize>;
}
