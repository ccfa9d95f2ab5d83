// Candidate pair generation
//
// Every implementation must produce the same pair list for the same input:
// pairs of proxy indices `(a, b)` with `a < b`, sorted, whose bounding boxes
// overlap and which pass the static/layer filter.

use glam::Vec2;
use std::collections::HashMap;

use super::collision::CollisionLayer;
use super::shape::Aabb;

/// What the broad phase needs to know about a body
#[derive(Debug, Clone, Copy)]
pub struct Proxy {
    pub aabb: Aabb,
    pub is_static: bool,
    pub layer: CollisionLayer,
}

/// Indices into the proxy list, `a < b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollisionPair {
    pub a: usize,
    pub b: usize,
}

/// Pair filter shared by every broad phase
pub fn can_collide(a: &Proxy, b: &Proxy) -> bool {
    !(a.is_static && b.is_static) && a.layer.interacts_with(b.layer)
}

pub trait BroadPhase {
    /// Replace the contents of `pairs` with the candidate pairs for `proxies`
    fn find_pairs(&mut self, proxies: &[Proxy], pairs: &mut Vec<CollisionPair>);
}

/// Full pairwise scan, O(n²)
#[derive(Debug, Default)]
pub struct BruteForce;

impl BroadPhase for BruteForce {
    fn find_pairs(&mut self, proxies: &[Proxy], pairs: &mut Vec<CollisionPair>) {
        pairs.clear();
        for (i, a) in proxies.iter().enumerate() {
            for (j, b) in proxies.iter().enumerate().skip(i + 1) {
                if can_collide(a, b) && a.aabb.overlaps(&b.aabb) {
                    pairs.push(CollisionPair { a: i, b: j });
                }
            }
        }
    }
}

/// Proxies covering more cells than this skip the grid and are tested
/// against every other proxy
pub const MAX_CELLS_PER_PROXY: u32 = 256;

/// Uniform grid: proxies are bucketed by the cells their bounds cover and
/// only proxies sharing a cell are compared.
#[derive(Debug)]
pub struct UniformGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
    oversized: Vec<usize>,
}

impl UniformGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Inclusive cell range covered by `aabb`, or `None` when the bounds are
    /// not finite or span more than `MAX_CELLS_PER_PROXY` cells
    fn cell_range(&self, aabb: &Aabb) -> Option<((i32, i32), (i32, i32))> {
        let min = (aabb.min / self.cell_size).floor();
        let max = (aabb.max / self.cell_size).floor();
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }

        let span = (max - min + Vec2::ONE).max(Vec2::ZERO);
        if span.x * span.y > MAX_CELLS_PER_PROXY as f32 {
            return None;
        }

        Some((
            (min.x as i32, min.y as i32),
            (max.x as i32, max.y as i32),
        ))
    }
}

impl BroadPhase for UniformGrid {
    fn find_pairs(&mut self, proxies: &[Proxy], pairs: &mut Vec<CollisionPair>) {
        pairs.clear();
        self.cells.clear();
        self.oversized.clear();

        for (i, proxy) in proxies.iter().enumerate() {
            let Some(((min_x, min_y), (max_x, max_y))) = self.cell_range(&proxy.aabb) else {
                self.oversized.push(i);
                continue;
            };
            for cx in min_x..=max_x {
                for cy in min_y..=max_y {
                    self.cells.entry((cx, cy)).or_default().push(i);
                }
            }
        }

        for &i in &self.oversized {
            for (j, other) in proxies.iter().enumerate() {
                if j == i {
                    continue;
                }
                let (a, b) = (i.min(j), i.max(j));
                if can_collide(&proxies[i], other) && proxies[i].aabb.overlaps(&other.aabb) {
                    pairs.push(CollisionPair { a, b });
                }
            }
        }

        // indices within a cell are ascending because proxies were inserted in order
        for indices in self.cells.values() {
            for (x, &i) in indices.iter().enumerate() {
                for &j in &indices[x + 1..] {
                    let (a, b) = (&proxies[i], &proxies[j]);
                    if can_collide(a, b) && a.aabb.overlaps(&b.aabb) {
                        pairs.push(CollisionPair { a: i, b: j });
                    }
                }
            }
        }

        // pairs spanning several cells show up once per shared cell, and
        // pairs of two oversized proxies show up twice
        pairs.sort_unstable();
        pairs.dedup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(x: f32, y: f32, half: f32, is_static: bool) -> Proxy {
        Proxy {
            aabb: Aabb::from_center_half_extents(Vec2::new(x, y), Vec2::splat(half)),
            is_static,
            layer: CollisionLayer::ALL,
        }
    }

    /// Deterministic scatter of proxies for comparing implementations
    fn scatter(count: usize) -> Vec<Proxy> {
        let mut seed: u32 = 0x1234_5678;
        let mut next = move || {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (seed >> 8) as f32 / (1u32 << 24) as f32
        };
        (0..count)
            .map(|i| {
                let mut p = proxy(next() * 40.0 - 20.0, next() * 40.0 - 20.0, 0.25 + next() * 3.0, i % 7 == 0);
                p.layer = CollisionLayer::from_bits(1 + (i as u32 % 3));
                p
            })
            .collect()
    }

    #[test]
    fn test_static_pairs_are_skipped() {
        let proxies = [proxy(0.0, 0.0, 1.0, true), proxy(0.5, 0.0, 1.0, true)];
        let mut pairs = Vec::new();
        BruteForce.find_pairs(&proxies, &mut pairs);
        assert!(pairs.is_empty());

        UniformGrid::new(2.0).find_pairs(&proxies, &mut pairs);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_static_dynamic_pair_is_kept() {
        let proxies = [proxy(0.0, 0.0, 1.0, true), proxy(1.5, 0.0, 1.0, false)];
        let mut pairs = Vec::new();
        BruteForce.find_pairs(&proxies, &mut pairs);
        assert_eq!(pairs, vec![CollisionPair { a: 0, b: 1 }]);
    }

    #[test]
    fn test_disjoint_layers_are_skipped() {
        let mut a = proxy(0.0, 0.0, 1.0, false);
        let mut b = proxy(0.5, 0.0, 1.0, false);
        a.layer = CollisionLayer::bit(0);
        b.layer = CollisionLayer::bit(1);

        let mut pairs = Vec::new();
        BruteForce.find_pairs(&[a, b], &mut pairs);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_brute_force_order() {
        let proxies = [
            proxy(0.0, 0.0, 1.0, false),
            proxy(1.0, 0.0, 1.0, false),
            proxy(2.0, 0.0, 1.0, false),
        ];
        let mut pairs = Vec::new();
        BruteForce.find_pairs(&proxies, &mut pairs);
        assert_eq!(
            pairs,
            vec![
                CollisionPair { a: 0, b: 1 },
                CollisionPair { a: 0, b: 2 },
                CollisionPair { a: 1, b: 2 },
            ]
        );
    }

    #[test]
    fn test_grid_matches_brute_force() {
        let proxies = scatter(200);

        let mut expected = Vec::new();
        BruteForce.find_pairs(&proxies, &mut expected);
        assert!(!expected.is_empty());

        for cell_size in [0.5, 2.0, 7.5, 100.0] {
            let mut pairs = Vec::new();
            UniformGrid::new(cell_size).find_pairs(&proxies, &mut pairs);
            assert_eq!(pairs, expected, "cell size {cell_size}");
        }
    }

    #[test]
    fn test_grid_oversized_proxy_skips_cells() {
        let mut proxies = scatter(50);
        // would cover millions of cells
        proxies.push(proxy(0.0, 0.0, 1.0e6, false));
        proxies.push(Proxy {
            aabb: Aabb::new(Vec2::splat(f32::NEG_INFINITY), Vec2::splat(f32::INFINITY)),
            is_static: false,
            layer: CollisionLayer::ALL,
        });

        let mut expected = Vec::new();
        BruteForce.find_pairs(&proxies, &mut expected);

        let mut grid = UniformGrid::new(0.5);
        assert_eq!(grid.cell_size(), 0.5);
        let mut pairs = Vec::new();
        grid.find_pairs(&proxies, &mut pairs);

        assert_eq!(pairs, expected);
        assert_eq!(grid.oversized, vec![50, 51]);
        assert!(pairs.contains(&CollisionPair { a: 50, b: 51 }));
    }

    #[test]
    fn test_grid_touching_across_cell_boundary() {
        // touching exactly on the boundary x = 2.0
        let proxies = [proxy(1.0, 0.5, 1.0, false), proxy(3.0, 0.5, 1.0, false)];
        let mut pairs = Vec::new();
        UniformGrid::new(2.0).find_pairs(&proxies, &mut pairs);
        assert_eq!(pairs, vec![CollisionPair { a: 0, b: 1 }]);
    }
}
