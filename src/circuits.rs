//! Shortest-first wiring of 3D junction boxes (Kruskal over all pairs).
//!
//! Every pair of points is an edge weighted by squared Euclidean distance.
//! Edges are consumed in ascending `(dist2, a, b)` order by a size-weighted
//! union-find with path compression.

use std::io::BufRead;

use tracing::{debug, info};

use crate::error::{CapacityError, ParseError, Result};

/// Maximum number of points in one input.
pub const MAX_POINTS: usize = 4096;

/// Edges consumed for the circuit-size answer unless configured otherwise.
pub const DEFAULT_CONNECTIONS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Point {
    /// Parses an `<x>,<y>,<z>` line.
    pub fn parse(line: usize, text: &str) -> Result<Self, ParseError> {
        let bad = || ParseError::BadPoint {
            line,
            text: text.to_string(),
        };
        let mut values = text.split(',').map(|value| value.trim().parse::<i64>());
        let (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None) =
            (values.next(), values.next(), values.next(), values.next())
        else {
            return Err(bad());
        };
        Ok(Self { x, y, z })
    }

    /// Squared Euclidean distance, saturating instead of wrapping.
    pub fn distance2(&self, other: &Point) -> u64 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        let dz = self.z.abs_diff(other.z);
        dx.saturating_mul(dx)
            .saturating_add(dy.saturating_mul(dy))
            .saturating_add(dz.saturating_mul(dz))
    }
}

/// A pair of point indices with `a < b`.
///
/// Field order makes the derived ordering `(dist2, a, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    pub dist2: u64,
    pub a: usize,
    pub b: usize,
}

/// Parses points held in memory, skipping blank lines.
pub fn parse_points(input: &str) -> Result<Vec<Point>> {
    collect_points(input.lines().map(|line| Ok(line.to_string())))
}

/// Parses points from a line reader, skipping blank lines.
pub fn read_points(input: impl BufRead) -> Result<Vec<Point>> {
    collect_points(input.lines())
}

fn collect_points(lines: impl Iterator<Item = std::io::Result<String>>) -> Result<Vec<Point>> {
    let mut points = Vec::new();
    for (index, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if points.len() >= MAX_POINTS {
            return Err(CapacityError::TooManyPoints { max: MAX_POINTS }.into());
        }
        points.push(Point::parse(index + 1, &line)?);
    }
    Ok(points)
}

/// All `n * (n - 1) / 2` edges in ascending `(dist2, a, b)` order.
pub fn sorted_edges(points: &[Point]) -> Vec<Edge> {
    let n = points.len();
    let mut edges = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for (a, p) in points.iter().enumerate() {
        for (b, q) in points.iter().enumerate().skip(a + 1) {
            edges.push(Edge {
                dist2: p.distance2(q),
                a,
                b,
            });
        }
    }
    // the ordering is total, so an unstable sort is still deterministic
    edges.sort_unstable();
    edges
}

/// Disjoint sets with union by size and path compression.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
    components: usize,
}

impl UnionFind {
    /// `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
            components: n,
        }
    }

    /// Root of `x`'s set; every node on the path is re-pointed at the root.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merges the sets of `a` and `b`; `false` if they were already one.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let mut big = self.find(a);
        let mut small = self.find(b);
        if big == small {
            return false;
        }
        if self.size[big] < self.size[small] {
            std::mem::swap(&mut big, &mut small);
        }
        self.parent[small] = big;
        self.size[big] += self.size[small];
        self.components -= 1;
        true
    }

    /// Size of the set containing `x`.
    pub fn size_of(&mut self, x: usize) -> usize {
        let root = self.find(x);
        self.size[root]
    }

    pub fn components(&self) -> usize {
        self.components
    }

    /// Sizes of all sets, one per root, in root order.
    pub fn component_sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.parent
            .iter()
            .enumerate()
            .filter(|&(node, &parent)| node == parent)
            .map(|(root, _)| self.size[root])
    }
}

/// Unions the endpoints of the first `connections` edges.
pub fn connect_shortest(edges: &[Edge], circuits: &mut UnionFind, connections: usize) {
    for edge in edges.iter().take(connections) {
        circuits.union(edge.a, edge.b);
    }
}

/// Consumes edges until one set remains and returns the edge that merged
/// the last two sets, or `None` if the edges never connect everything.
pub fn connect_all(edges: &[Edge], circuits: &mut UnionFind) -> Option<Edge> {
    if circuits.components() <= 1 {
        return None;
    }
    for edge in edges {
        if circuits.union(edge.a, edge.b) && circuits.components() == 1 {
            return Some(*edge);
        }
    }
    None
}

/// Product of the three largest circuit sizes after `connections` edges.
///
/// With fewer than three circuits the product is 0.
pub fn largest_circuits_product(edges: &[Edge], n: usize, connections: usize) -> u64 {
    let mut circuits = UnionFind::new(n);
    connect_shortest(edges, &mut circuits, connections);

    let mut sizes: Vec<usize> = circuits.component_sizes().collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    debug!(
        circuits = sizes.len(),
        largest = ?sizes.iter().take(3).collect::<Vec<_>>(),
        "circuits after shortest connections"
    );
    match sizes.as_slice() {
        [a, b, c, ..] => *a as u64 * *b as u64 * *c as u64,
        _ => 0,
    }
}

/// Product of the x-coordinates joined by the final spanning-tree edge.
pub fn final_connection_product(points: &[Point], edges: &[Edge]) -> u64 {
    let mut circuits = UnionFind::new(points.len());
    let Some(edge) = connect_all(edges, &mut circuits) else {
        return 0;
    };
    debug!(a = edge.a, b = edge.b, dist2 = edge.dist2, "final connection");
    points[edge.a].x.wrapping_mul(points[edge.b].x) as u64
}

/// Both answers for one set of junction boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answers {
    pub part1: u64,
    pub part2: u64,
}

/// Builds the edge list once and answers both questions.
pub fn solve(points: &[Point], connections: usize) -> Result<Answers> {
    if points.len() < 2 {
        return Err(ParseError::TooFewPoints(points.len()).into());
    }
    let edges = sorted_edges(points);
    info!(points = points.len(), edges = edges.len(), "edge list sorted");

    Ok(Answers {
        part1: largest_circuits_product(&edges, points.len(), connections),
        part2: final_connection_product(points, &edges),
    })
}
