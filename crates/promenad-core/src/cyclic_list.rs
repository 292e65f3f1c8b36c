//! Many circular doubly-linked lists threaded through one fixed node pool.
//!
//! Every node is in exactly one ring at any time: either the free ring,
//! rooted at [`SENTINEL`], or a ring owned by someone else (a limb's bone
//! chain). Node `SENTINEL` is never handed out, so a chain root of
//! `SENTINEL` means "no chain".

use crate::error::{PromenadError, Result};

/// Root of the free ring; never a usable node.
pub const SENTINEL: u16 = 0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CyclicNode {
    pub next: u16,
    pub prev: u16,
}

#[derive(Debug)]
pub struct CyclicPool {
    nodes: Vec<CyclicNode>,
}

crate::impl_reusing_clone!(CyclicPool { nodes });

impl CyclicPool {
    /// A pool of `size` nodes (sentinel included), all in the free ring.
    ///
    /// # Panics
    ///
    /// If `size` is zero or does not fit `u16` indices.
    pub fn new(size: usize) -> Self {
        assert!(size >= 1, "pool needs room for the sentinel");
        assert!(size <= u16::MAX as usize + 1, "pool indices are u16");
        let nodes = (0..size)
            .map(|i| CyclicNode {
                next: ((i + 1) % size) as u16,
                prev: ((i + size - 1) % size) as u16,
            })
            .collect();
        Self { nodes }
    }

    /// Total number of nodes, sentinel included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Nodes still available to [`CyclicPool::take_free`].
    pub fn free_len(&self) -> usize {
        self.ring_len(SENTINEL) - 1
    }

    pub fn node(&self, index: u16) -> CyclicNode {
        self.nodes[index as usize]
    }

    pub fn next(&self, index: u16) -> u16 {
        self.nodes[index as usize].next
    }

    pub fn prev(&self, index: u16) -> u16 {
        self.nodes[index as usize].prev
    }

    /// Detach the free ring's tail and hand it out as a self-linked ring.
    pub fn take_free(&mut self) -> Result<u16> {
        let node = self.prev(SENTINEL);
        if node == SENTINEL {
            log::debug!("bone pool exhausted ({} nodes)", self.nodes.len() - 1);
            return Err(PromenadError::PoolExhausted {
                capacity: self.nodes.len() - 1,
            });
        }
        self.unlink(node);
        Ok(node)
    }

    /// Splice a self-linked `node` into `anchor`'s ring, right after `anchor`.
    pub fn append_after(&mut self, anchor: u16, node: u16) {
        debug_assert_eq!(self.next(node), node, "node {node} is still linked");
        let next = self.next(anchor);
        self.nodes[node as usize] = CyclicNode { next, prev: anchor };
        self.nodes[anchor as usize].next = node;
        self.nodes[next as usize].prev = node;
    }

    /// Cut `node` out of its ring and leave it self-linked.
    pub fn unlink(&mut self, node: u16) {
        let CyclicNode { next, prev } = self.node(node);
        self.nodes[prev as usize].next = next;
        self.nodes[next as usize].prev = prev;
        self.nodes[node as usize] = CyclicNode { next: node, prev: node };
    }

    /// Return `node` to the free ring as its new tail.
    ///
    /// # Panics
    ///
    /// If `node` is the sentinel.
    pub fn release(&mut self, node: u16) {
        assert_ne!(node, SENTINEL, "the sentinel cannot be released");
        self.unlink(node);
        self.append_after(self.prev(SENTINEL), node);
    }

    /// Nodes of the ring containing `start`, beginning at `start`.
    pub fn ring(&self, start: u16) -> Ring<'_> {
        Ring {
            pool: self,
            start,
            current: Some(start),
        }
    }

    pub fn ring_len(&self, start: u16) -> usize {
        self.ring(start).count()
    }
}

pub struct Ring<'a> {
    pool: &'a CyclicPool,
    start: u16,
    current: Option<u16>,
}

impl Iterator for Ring<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        let here = self.current?;
        let next = self.pool.next(here);
        self.current = (next != self.start).then_some(next);
        Some(here)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_links_consistent(pool: &CyclicPool) {
        for i in 0..pool.len() as u16 {
            assert_eq!(pool.prev(pool.next(i)), i, "broken link at {i}");
        }
    }

    #[test]
    fn new_pool_is_one_free_ring() {
        let pool = CyclicPool::new(8);
        assert_eq!(pool.ring_len(SENTINEL), 8);
        assert_eq!(pool.free_len(), 7);
        assert_links_consistent(&pool);
    }

    #[test]
    fn take_free_returns_self_linked_tail() {
        let mut pool = CyclicPool::new(4);
        let node = pool.take_free().unwrap();
        assert_eq!(node, 3);
        assert_eq!(pool.node(node), CyclicNode { next: 3, prev: 3 });
        assert_eq!(pool.free_len(), 2);
        assert_links_consistent(&pool);
    }

    #[test]
    fn append_after_keeps_chain_order() {
        let mut pool = CyclicPool::new(8);
        let root = pool.take_free().unwrap();
        let mut last = root;
        let mut expected = vec![root];
        for _ in 0..3 {
            let node = pool.take_free().unwrap();
            pool.append_after(last, node);
            expected.push(node);
            last = node;
        }
        assert_eq!(pool.ring(root).collect::<Vec<_>>(), expected);
        assert_eq!(pool.prev(root), last);
        assert_links_consistent(&pool);
    }

    #[test]
    fn exhaustion_is_reported_and_sentinel_never_handed_out() {
        let mut pool = CyclicPool::new(3);
        let a = pool.take_free().unwrap();
        let b = pool.take_free().unwrap();
        assert_ne!(a, SENTINEL);
        assert_ne!(b, SENTINEL);
        assert!(matches!(
            pool.take_free(),
            Err(PromenadError::PoolExhausted { capacity: 2 })
        ));
    }

    #[test]
    fn release_returns_node_to_free_ring() {
        let mut pool = CyclicPool::new(6);
        let root = pool.take_free().unwrap();
        let second = pool.take_free().unwrap();
        pool.append_after(root, second);
        pool.release(second);
        assert_eq!(pool.ring_len(root), 1);
        assert_eq!(pool.free_len(), 4);
        assert_eq!(pool.take_free().unwrap(), second);
        assert_links_consistent(&pool);
    }

    #[test]
    fn nodes_are_conserved_across_rings() {
        let mut pool = CyclicPool::new(32);
        let mut roots: Vec<u16> = Vec::new();
        let mut seed: u32 = 12345;

        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let roll = (seed >> 16) % 4;
            match roll {
                0 if !roots.is_empty() => {
                    // Drop a whole ring
                    let root = roots.swap_remove((seed as usize >> 3) % roots.len());
                    let members: Vec<u16> = pool.ring(root).collect();
                    for node in members {
                        pool.release(node);
                    }
                }
                1 | 2 if !roots.is_empty() => {
                    let root = roots[(seed as usize >> 5) % roots.len()];
                    if let Ok(node) = pool.take_free() {
                        pool.append_after(pool.prev(root), node);
                    }
                }
                _ => {
                    if let Ok(node) = pool.take_free() {
                        roots.push(node);
                    }
                }
            }

            let used: usize = roots.iter().map(|&r| pool.ring_len(r)).sum();
            assert_eq!(pool.ring_len(SENTINEL) + used, pool.len());
        }
        assert_links_consistent(&pool);
    }
}
