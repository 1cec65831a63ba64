//! Per-search node records, kept in an insertion ordered map so that a node's parent is just an
//! index into the same map.
use fxhash::{FxBuildHasher, FxHashSet};
use grid_util::point::Point;
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;

use crate::cost::Heading;

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Marks the root of the search tree.
pub const NO_PARENT: usize = usize::MAX;

/// A search node: a cell, and for heading-aware searches the heading it was entered with.
/// `lane` is `0` for searches that keep one record per cell and `heading.index() + 1` otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub cell: Point,
    pub lane: u8,
}

impl NodeKey {
    pub fn cell(cell: Point) -> NodeKey {
        NodeKey { cell, lane: 0 }
    }
    pub fn oriented(cell: Point, heading: Heading) -> NodeKey {
        NodeKey {
            cell,
            lane: heading.index() as u8 + 1,
        }
    }
}

/// What a search knows about a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeRecord {
    /// Distance score the mode relaxes on.
    pub accumulated: f64,
    /// Frontier priority.
    pub total: f64,
    pub heuristic: f64,
    /// Heading on arrival.
    pub heading: Heading,
    pub parent: usize,
    pub closed: bool,
}

/// Result of offering a node to the context.
pub enum Offer {
    /// The record was created or improved and lives at this index.
    Updated(usize),
    Rejected,
}

#[derive(Clone, Debug, Default)]
pub struct SearchContext {
    pub(crate) nodes: FxIndexMap<NodeKey, NodeRecord>,
    pub(crate) visited: Vec<Point>,
    seen: FxHashSet<Point>,
}

impl SearchContext {
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.visited.clear();
        self.seen.clear();
    }

    pub fn insert_root(&mut self, key: NodeKey, heading: Heading, heuristic: f64) -> usize {
        let (ix, _) = self.nodes.insert_full(
            key,
            NodeRecord {
                accumulated: 0.0,
                total: heuristic,
                heuristic,
                heading,
                parent: NO_PARENT,
                closed: false,
            },
        );
        ix
    }

    /// Stores `record` under `key` if the node is new, or open with a larger accumulated score.
    pub fn offer(&mut self, key: NodeKey, record: NodeRecord) -> Offer {
        match self.nodes.entry(key) {
            Vacant(e) => {
                let ix = e.index();
                e.insert(record);
                Offer::Updated(ix)
            }
            Occupied(mut e) => {
                let current = e.get();
                if !current.closed && record.accumulated < current.accumulated {
                    let ix = e.index();
                    e.insert(record);
                    Offer::Updated(ix)
                } else {
                    Offer::Rejected
                }
            }
        }
    }

    pub fn node(&self, ix: usize) -> (&NodeKey, &NodeRecord) {
        self.nodes
            .get_index(ix)
            .unwrap_or_else(|| panic!("search node {ix} does not exist"))
    }
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }
    pub fn is_closed(&self, key: &NodeKey) -> bool {
        self.nodes.get(key).map_or(false, |r| r.closed)
    }

    /// Closes a node and appends its cell to the visit order the first time the cell is seen.
    pub fn close(&mut self, ix: usize) {
        if let Some((key, record)) = self.nodes.get_index_mut(ix) {
            record.closed = true;
            if self.seen.insert(key.cell) {
                self.visited.push(key.cell);
            }
        }
    }

    /// Cheapest record of any lane of `cell`.
    pub fn best_record(&self, cell: &Point) -> Option<&NodeRecord> {
        (0..=Heading::ALL.len() as u8)
            .filter_map(|lane| self.nodes.get(&NodeKey { cell: *cell, lane }))
            .min_by(|a, b| a.accumulated.total_cmp(&b.accumulated))
    }

    /// Cells from the root to the node at `ix`, both included.
    pub fn reverse_path(&self, ix: usize) -> Vec<Point> {
        let mut path: Vec<Point> = itertools::unfold(ix, |i| {
            self.nodes.get_index(*i).map(|(key, record)| {
                *i = record.parent;
                key.cell
            })
        })
        .collect();
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store_grid::cell;

    fn record(accumulated: f64, parent: usize) -> NodeRecord {
        NodeRecord {
            accumulated,
            total: accumulated,
            heuristic: 0.0,
            heading: Heading::Right,
            parent,
            closed: false,
        }
    }

    #[test]
    fn offers_only_improve_open_nodes() {
        let mut ctx = SearchContext::default();
        let root = ctx.insert_root(NodeKey::cell(cell(0, 0)), Heading::Right, 0.0);
        let key = NodeKey::cell(cell(0, 1));
        assert!(matches!(ctx.offer(key, record(5.0, root)), Offer::Updated(1)));
        assert!(matches!(ctx.offer(key, record(6.0, root)), Offer::Rejected));
        assert!(matches!(ctx.offer(key, record(4.0, root)), Offer::Updated(1)));
        ctx.close(1);
        assert!(matches!(ctx.offer(key, record(1.0, root)), Offer::Rejected));
        assert_eq!(ctx.node(1).1.accumulated, 4.0);
    }

    #[test]
    fn path_and_visit_order() {
        let mut ctx = SearchContext::default();
        let root = ctx.insert_root(NodeKey::cell(cell(0, 0)), Heading::Right, 0.0);
        ctx.close(root);
        let Offer::Updated(a) = ctx.offer(NodeKey::cell(cell(0, 1)), record(1.0, root)) else {
            panic!("node not inserted");
        };
        let Offer::Updated(b) = ctx.offer(NodeKey::oriented(cell(1, 1), Heading::Down), record(3.0, a))
        else {
            panic!("node not inserted");
        };
        ctx.close(a);
        ctx.close(b);
        ctx.close(a);
        assert_eq!(ctx.reverse_path(b), vec![cell(0, 0), cell(0, 1), cell(1, 1)]);
        assert_eq!(ctx.visited, vec![cell(0, 0), cell(0, 1), cell(1, 1)]);
        assert_eq!(ctx.best_record(&cell(1, 1)).map(|r| r.accumulated), Some(3.0));
        ctx.clear();
        assert!(ctx.best_record(&cell(1, 1)).is_none());
    }
}
