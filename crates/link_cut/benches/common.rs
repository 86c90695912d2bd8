use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub const SIZES: [usize; 3] = [1_024, 8_192, 65_536];
pub const OPS_PER_SIZE: usize = 5_000;
pub const VALUE_RANGE: std::ops::RangeInclusive<i64> = -1_000_000_000..=1_000_000_000;
pub const DELTA_RANGE: std::ops::RangeInclusive<i64> = -1_000..=1_000;

const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

fn mix_seed(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn rng_for(kind: u64, size: usize) -> StdRng {
    let seed = 0x5EED_2026
        ^ (kind.wrapping_mul(SEED_MIX))
        ^ (size as u64).wrapping_mul(SEED_MIX.rotate_left(17));
    StdRng::seed_from_u64(mix_seed(seed))
}

fn generate_values(rng: &mut impl Rng, n: usize) -> Vec<i64> {
    let mut values = Vec::with_capacity(n);
    for _ in 0..n {
        values.push(rng.random_range(VALUE_RANGE));
    }
    values
}

#[derive(Clone, Copy, Debug)]
pub enum ConnOp {
    Link { parent: usize, child: usize },
    Cut { v: usize },
    Connected { u: usize, v: usize },
}

#[derive(Clone, Copy, Debug)]
pub enum PathOp {
    Update { u: usize, v: usize, delta: i64 },
    Query { u: usize, v: usize },
    Reattach { v: usize, parent: usize },
}

/// Initial edges are `(parent, child)` pairs linkable in order.
#[derive(Clone, Debug)]
pub struct ConnectivityCase {
    pub values: Vec<i64>,
    pub edges: Vec<(usize, usize)>,
    pub ops: Vec<ConnOp>,
}

#[derive(Clone, Debug)]
pub struct PathCase {
    pub values: Vec<i64>,
    pub edges: Vec<(usize, usize)>,
    pub ops: Vec<PathOp>,
}

struct RootedForest {
    parent: Vec<Option<usize>>,
    roots: Vec<usize>,
    root_pos: Vec<usize>,
}

impl RootedForest {
    const NOT_ROOT: usize = usize::MAX;

    fn random_tree(rng: &mut impl Rng, n: usize) -> (Self, Vec<(usize, usize)>) {
        let mut parent = vec![None; n];
        let mut edges = Vec::with_capacity(n.saturating_sub(1));
        for child in 1..n {
            let p = rng.random_range(0..child);
            parent[child] = Some(p);
            edges.push((p, child));
        }
        let mut root_pos = vec![Self::NOT_ROOT; n];
        if n > 0 {
            root_pos[0] = 0;
        }
        let forest = Self {
            parent,
            roots: if n > 0 { vec![0] } else { Vec::new() },
            root_pos,
        };
        (forest, edges)
    }

    fn root(&self, mut v: usize) -> usize {
        while let Some(p) = self.parent[v] {
            v = p;
        }
        v
    }

    fn cut(&mut self, v: usize) {
        debug_assert!(self.parent[v].is_some());
        self.parent[v] = None;
        self.root_pos[v] = self.roots.len();
        self.roots.push(v);
    }

    fn link(&mut self, parent: usize, child: usize) {
        debug_assert!(self.parent[child].is_none());
        debug_assert!(self.root(parent) != child);
        self.parent[child] = Some(parent);
        let pos = self.root_pos[child];
        self.root_pos[child] = Self::NOT_ROOT;
        let removed = self.roots.swap_remove(pos);
        debug_assert_eq!(removed, child);
        if pos < self.roots.len() {
            self.root_pos[self.roots[pos]] = pos;
        }
    }

    fn random_non_root(&self, rng: &mut impl Rng) -> Option<usize> {
        let n = self.parent.len();
        if self.roots.len() >= n {
            return None;
        }
        loop {
            let v = rng.random_range(0..n);
            if self.parent[v].is_some() {
                return Some(v);
            }
        }
    }

    /// Pick a root to re-attach and a parent vertex outside its tree.
    fn random_link_pair(&self, rng: &mut impl Rng) -> Option<(usize, usize)> {
        if self.roots.len() < 2 {
            return None;
        }
        let child = self.roots[rng.random_range(0..self.roots.len())];
        for _ in 0..100 {
            let u = rng.random_range(0..self.parent.len());
            if self.root(u) != child {
                return Some((u, child));
            }
        }
        // Fallback: another root is always outside `child`'s tree.
        let other = self
            .roots
            .iter()
            .copied()
            .find(|&r| r != child)
            .expect("two roots exist");
        Some((other, child))
    }
}

pub fn generate_connectivity_case(n: usize) -> ConnectivityCase {
    let mut rng = rng_for(1, n);
    let values = vec![0_i64; n];
    let (mut state, mut edges) = RootedForest::random_tree(&mut rng, n);

    // Start from a forest, not a single tree.
    let init_cuts = n / 4;
    for _ in 0..init_cuts {
        if let Some(v) = state.random_non_root(&mut rng) {
            state.cut(v);
            if let Some(pos) = edges.iter().position(|&(_, c)| c == v) {
                edges.swap_remove(pos);
            }
        }
    }

    let mut ops = Vec::with_capacity(OPS_PER_SIZE);
    for _ in 0..OPS_PER_SIZE {
        let roll = rng.random_range(0..100_u32);
        if roll < 50 {
            let u = rng.random_range(0..n);
            let v = rng.random_range(0..n);
            ops.push(ConnOp::Connected { u, v });
        } else if roll < 75 {
            if let Some((parent, child)) = state.random_link_pair(&mut rng) {
                state.link(parent, child);
                ops.push(ConnOp::Link { parent, child });
            } else {
                let u = rng.random_range(0..n);
                let v = rng.random_range(0..n);
                ops.push(ConnOp::Connected { u, v });
            }
        } else if let Some(v) = state.random_non_root(&mut rng) {
            state.cut(v);
            ops.push(ConnOp::Cut { v });
        } else {
            let u = rng.random_range(0..n);
            let v = rng.random_range(0..n);
            ops.push(ConnOp::Connected { u, v });
        }
    }

    ConnectivityCase { values, edges, ops }
}

pub fn generate_path_case(n: usize) -> PathCase {
    let mut rng = rng_for(2, n);
    let values = generate_values(&mut rng, n);
    let (mut state, edges) = RootedForest::random_tree(&mut rng, n);

    let mut ops = Vec::with_capacity(OPS_PER_SIZE);
    for _ in 0..OPS_PER_SIZE {
        let roll = rng.random_range(0..100_u32);
        if roll < 45 {
            let u = rng.random_range(0..n);
            let v = rng.random_range(0..n);
            ops.push(PathOp::Query { u, v });
        } else if roll < 80 {
            let u = rng.random_range(0..n);
            let v = rng.random_range(0..n);
            let delta = rng.random_range(DELTA_RANGE);
            ops.push(PathOp::Update { u, v, delta });
        } else if let Some(v) = state.random_non_root(&mut rng) {
            // Move a subtree: cut `v`, then re-link it under a vertex of
            // another tree so the workload stays mostly-connected.
            state.cut(v);
            let mut parent = None;
            for _ in 0..100 {
                let u = rng.random_range(0..n);
                if state.root(u) != v {
                    parent = Some(u);
                    break;
                }
            }
            let parent = parent.unwrap_or_else(|| {
                state
                    .roots
                    .iter()
                    .copied()
                    .find(|&r| r != v)
                    .expect("the old tree root remains")
            });
            state.link(parent, v);
            ops.push(PathOp::Reattach { v, parent });
        } else {
            let u = rng.random_range(0..n);
            let v = rng.random_range(0..n);
            ops.push(PathOp::Query { u, v });
        }
    }

    PathCase { values, edges, ops }
}
