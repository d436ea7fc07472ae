//! Jump Point Search (JPS) on uniform grids.
//!
//! JPS is an A* variant for grids where every passable step costs the
//! same. Instead of expanding every neighbour it jumps along straight lines
//! and only opens *jump points*: cells with forced neighbours (cells next
//! to impassable terrain) or the goal. Terrain cost factors are ignored, so
//! mud counts as ground.

use waypoint_core::Point;

use crate::grid::GridGraph;
use crate::heuristic::Heuristic;
use crate::record::best_first_search;
use crate::traits::Pathfinder;

const CARDINAL: [Point; 4] = [
    Point::new(1, 0),
    Point::new(-1, 0),
    Point::new(0, 1),
    Point::new(0, -1),
];

const DIAGONAL: [Point; 4] = [
    Point::new(1, 1),
    Point::new(1, -1),
    Point::new(-1, 1),
    Point::new(-1, -1),
];

/// Jump Point Search over a [`GridGraph`].
pub struct Jps<'g> {
    grid: &'g GridGraph,
    heuristic: Heuristic,
}

impl<'g> Jps<'g> {
    pub fn new(grid: &'g GridGraph, heuristic: Heuristic) -> Self {
        Self { grid, heuristic }
    }

    /// Compute a shortest cell-by-cell node path from `start` to `goal`.
    pub fn find_path(&self, start: usize, goal: usize) -> Vec<usize> {
        let grid = self.grid;
        let graph = grid.graph();
        let (Some(start_node), Some(goal_node)) = (graph.node(start), graph.node(goal)) else {
            return Vec::new();
        };
        if start != goal && !(start_node.is_passable() && goal_node.is_passable()) {
            return Vec::new();
        }
        let goal_pos = goal_node.position;
        let goal_cell = grid.cell_of(goal);
        let heuristic = self.heuristic;

        let jump_points = best_first_search(
            graph,
            start,
            goal,
            |n| graph.node_pos(n).map_or(0.0, |p| heuristic.between(p, goal_pos)),
            |n, parent, out| {
                let cell = grid.cell_of(n);
                let Some(pos) = graph.node_pos(n) else {
                    return;
                };
                let dirs = match parent {
                    None => self.all_dirs(),
                    Some(pi) => self.pruned_dirs(cell, grid.cell_of(pi)),
                };
                for dir in dirs {
                    let Some(jp) = self.jump(cell, dir, goal_cell) else {
                        continue;
                    };
                    let Some(ji) = grid.index_of(jp) else {
                        continue;
                    };
                    if let Some(jpos) = graph.node_pos(ji) {
                        out.push((ji, pos.distance(jpos)));
                    }
                }
            },
        );

        self.expand(&jump_points)
    }

    fn passable(&self, p: Point) -> bool {
        self.grid.is_passable(p)
    }

    fn all_dirs(&self) -> Vec<Point> {
        let mut dirs = CARDINAL.to_vec();
        if self.grid.has_diagonals() {
            dirs.extend_from_slice(&DIAGONAL);
        }
        dirs
    }

    /// Directions worth exploring from `p` when it was reached from
    /// `parent`: the natural continuation plus forced turns.
    fn pruned_dirs(&self, p: Point, parent: Point) -> Vec<Point> {
        let d = (p - parent).signum();
        let mut dirs = Vec::with_capacity(5);

        if self.grid.has_diagonals() {
            if d.x != 0 && d.y != 0 {
                dirs.push(Point::new(0, d.y));
                dirs.push(Point::new(d.x, 0));
                dirs.push(d);
                if !self.passable(p + Point::new(-d.x, 0)) {
                    dirs.push(Point::new(-d.x, d.y));
                }
                if !self.passable(p + Point::new(0, -d.y)) {
                    dirs.push(Point::new(d.x, -d.y));
                }
            } else if d.x != 0 {
                dirs.push(d);
                if !self.passable(p + Point::new(0, 1)) {
                    dirs.push(Point::new(d.x, 1));
                }
                if !self.passable(p + Point::new(0, -1)) {
                    dirs.push(Point::new(d.x, -1));
                }
            } else {
                dirs.push(d);
                if !self.passable(p + Point::new(1, 0)) {
                    dirs.push(Point::new(1, d.y));
                }
                if !self.passable(p + Point::new(-1, 0)) {
                    dirs.push(Point::new(-1, d.y));
                }
            }
        } else if d.x != 0 {
            dirs.push(d);
            dirs.push(Point::new(0, 1));
            dirs.push(Point::new(0, -1));
        } else {
            dirs.push(d);
            dirs.push(Point::new(1, 0));
            dirs.push(Point::new(-1, 0));
        }
        dirs
    }

    /// Whether `n`, entered moving along `dir`, has a forced neighbour.
    fn has_forced_neighbor(&self, n: Point, dir: Point) -> bool {
        let open = |dx: i32, dy: i32| self.passable(n + Point::new(dx, dy));
        let (dx, dy) = (dir.x, dir.y);

        if self.grid.has_diagonals() {
            if dx != 0 && dy != 0 {
                (open(-dx, dy) && !open(-dx, 0)) || (open(dx, -dy) && !open(0, -dy))
            } else if dx != 0 {
                (open(dx, 1) && !open(0, 1)) || (open(dx, -1) && !open(0, -1))
            } else {
                (open(1, dy) && !open(1, 0)) || (open(-1, dy) && !open(-1, 0))
            }
        } else if dx != 0 {
            (open(0, 1) && !open(-dx, 1)) || (open(0, -1) && !open(-dx, -1))
        } else {
            (open(1, 0) && !open(1, -dy)) || (open(-1, 0) && !open(-1, -dy))
        }
    }

    /// Straight sub-directions scanned at every step of a jump along `dir`:
    /// the two axes of a diagonal, or both horizontals of a vertical jump
    /// on a 4-way grid.
    fn branch_dirs(&self, dir: Point) -> Option<[Point; 2]> {
        if dir.x != 0 && dir.y != 0 {
            Some([Point::new(dir.x, 0), Point::new(0, dir.y)])
        } else if !self.grid.has_diagonals() && dir.y != 0 {
            Some([Point::new(1, 0), Point::new(-1, 0)])
        } else {
            None
        }
    }

    /// Step from `from` along `dir` until a jump point is found. Returns
    /// `None` when the walk leaves the passable area first.
    fn jump(&self, from: Point, dir: Point, goal: Point) -> Option<Point> {
        let branches = self.branch_dirs(dir);
        let mut n = from + dir;
        loop {
            if !self.passable(n) {
                return None;
            }
            if n == goal || self.has_forced_neighbor(n, dir) {
                return Some(n);
            }
            if let Some(sub) = branches {
                if sub.iter().any(|&d| self.scan(n, d, goal)) {
                    return Some(n);
                }
            }
            n = n + dir;
        }
    }

    /// Straight jump without branching; reports whether it hits a jump
    /// point.
    fn scan(&self, from: Point, dir: Point, goal: Point) -> bool {
        let mut n = from + dir;
        loop {
            if !self.passable(n) {
                return false;
            }
            if n == goal || self.has_forced_neighbor(n, dir) {
                return true;
            }
            n = n + dir;
        }
    }

    /// Expand a jump-point node path into consecutive cells.
    fn expand(&self, jump_points: &[usize]) -> Vec<usize> {
        let grid = self.grid;
        let Some((&first, rest)) = jump_points.split_first() else {
            return Vec::new();
        };
        let mut path = vec![first];
        let mut cur = grid.cell_of(first);
        for &jp in rest {
            let target = grid.cell_of(jp);
            while cur != target {
                cur = cur + (target - cur).signum();
                match grid.index_of(cur) {
                    Some(i) => path.push(i),
                    None => return Vec::new(),
                }
            }
        }
        path
    }
}

impl Pathfinder for Jps<'_> {
    fn find_path(&self, start: usize, goal: usize) -> Vec<usize> {
        Jps::find_path(self, start, goal)
    }
}
