use crate::error::{ForestError, Result};
use crate::policy::{Combine, SumAdd};

#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Id(u32);

impl Id {
    const NIL: Self = Self(u32::MAX);

    #[inline(always)]
    fn is_nil(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline(always)]
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a node of a [`LinkCutForest`].
///
/// Handles are issued by [`LinkCutForest::create_node`] and are only
/// meaningful for the forest that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Arena index of this node, stable for the lifetime of the forest.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    fn id(self) -> Id {
        Id(self.0)
    }
}

#[inline(always)]
fn handle(x: Id) -> NodeId {
    debug_assert!(!x.is_nil());
    NodeId(x.0)
}

#[derive(Clone, Copy, Debug)]
struct Node<C: Combine> {
    ch: [Id; 2],
    /// Splay parent; `NIL` iff this node is the root of its auxiliary tree.
    p: Id,
    /// Path-parent: set only at the root of a non-topmost auxiliary tree,
    /// pointing at the real-tree node the preferred path hangs below.
    pp: Id,
    sz: u32,

    value: C::Value,
    agg: C::Agg,

    lazy: C::Delta,
    lazy_pending: bool,
}

impl<C: Combine> Node<C> {
    fn new(value: C::Value) -> Self {
        Self {
            ch: [Id::NIL, Id::NIL],
            p: Id::NIL,
            pp: Id::NIL,
            sz: 1,
            agg: C::agg_from_value(&value),
            value,
            lazy: C::delta_unit(),
            lazy_pending: false,
        }
    }
}

/// Link-cut forest of rooted trees (splay-based).
///
/// Each preferred path is an auxiliary splay tree ordered by depth; the
/// auxiliary trees hang off each other through path-parent references.
/// Generic over a [`Combine`] policy for path aggregates.
///
/// All operations are amortized `O(log n)`. Paths are root-relative: there
/// is no evert, and path queries between `u` and `v` are composed around
/// their lowest common ancestor.
pub struct LinkCutForest<C: Combine = SumAdd> {
    nodes: Vec<Node<C>>,
    stack: Vec<Id>,
}

impl<C: Combine> Default for LinkCutForest<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Combine> LinkCutForest<C> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(n),
            stack: Vec::with_capacity(n),
        }
    }

    /// Build a forest of singleton trees, one per value.
    pub fn from_values(values: &[C::Value]) -> Self {
        let mut forest = Self::with_capacity(values.len());
        for &v in values {
            forest.create_node(v);
        }
        forest
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a new singleton tree holding `value` and return its handle.
    pub fn create_node(&mut self, value: C::Value) -> NodeId {
        debug_assert!(self.nodes.len() < u32::MAX as usize);
        let id = self.nodes.len() as u32;
        self.nodes.push(Node::new(value));
        NodeId(id)
    }

    /// Recover the handle for an arena index (inverse of [`NodeId::index`]).
    pub fn node_id(&self, index: usize) -> Result<NodeId> {
        if index < self.nodes.len() {
            Ok(NodeId(index as u32))
        } else {
            Err(ForestError::InvalidNode)
        }
    }

    fn check(&self, v: NodeId) -> Result<Id> {
        if (v.0 as usize) < self.nodes.len() {
            Ok(v.id())
        } else {
            Err(ForestError::InvalidNode)
        }
    }

    #[inline(always)]
    fn node(&self, x: Id) -> &Node<C> {
        debug_assert!(!x.is_nil());
        debug_assert!(x.idx() < self.nodes.len());
        if cfg!(debug_assertions) {
            &self.nodes[x.idx()]
        } else {
            // SAFETY: `Id` values are only created from valid indices and `NIL` is checked.
            unsafe { self.nodes.get_unchecked(x.idx()) }
        }
    }

    #[inline(always)]
    fn node_mut(&mut self, x: Id) -> &mut Node<C> {
        debug_assert!(!x.is_nil());
        debug_assert!(x.idx() < self.nodes.len());
        if cfg!(debug_assertions) {
            &mut self.nodes[x.idx()]
        } else {
            // SAFETY: `Id` values are only created from valid indices and `NIL` is checked.
            unsafe { self.nodes.get_unchecked_mut(x.idx()) }
        }
    }

    #[inline(always)]
    fn sz(&self, x: Id) -> u32 {
        if x.is_nil() { 0 } else { self.node(x).sz }
    }

    #[inline(always)]
    fn agg(&self, x: Id) -> C::Agg {
        if x.is_nil() {
            C::agg_unit()
        } else {
            self.node(x).agg
        }
    }

    #[inline(always)]
    fn is_aux_root(&self, x: Id) -> bool {
        self.node(x).p.is_nil()
    }

    fn apply_delta(&mut self, x: Id, delta: C::Delta) {
        if x.is_nil() {
            return;
        }
        let sz = self.node(x).sz as usize;
        let nx = self.node_mut(x);
        nx.value = C::delta_apply_value(&nx.value, &delta);
        nx.agg = C::delta_apply_agg(&nx.agg, &delta, sz);
        if nx.lazy_pending {
            nx.lazy = C::delta_compose(&delta, &nx.lazy);
        } else {
            nx.lazy = delta;
            nx.lazy_pending = true;
        }
    }

    fn push(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        let (pending, lazy, l, r) = {
            let nx = self.node(x);
            (nx.lazy_pending, nx.lazy, nx.ch[0], nx.ch[1])
        };
        if pending {
            self.apply_delta(l, lazy);
            self.apply_delta(r, lazy);
            let nx = self.node_mut(x);
            nx.lazy = C::delta_unit();
            nx.lazy_pending = false;
        }
    }

    fn pull(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        let (l, r, value) = {
            let nx = self.node(x);
            (nx.ch[0], nx.ch[1], nx.value)
        };
        let sz = 1_u32.wrapping_add(self.sz(l)).wrapping_add(self.sz(r));
        let agg = C::agg_merge(&self.agg(l), &value, &self.agg(r));
        let nx = self.node_mut(x);
        nx.sz = sz;
        nx.agg = agg;
    }

    fn rotate(&mut self, x: Id) {
        let p = self.node(x).p;
        let g = self.node(p).p;
        self.push(p);
        self.push(x);

        let dir = usize::from(self.node(p).ch[1] == x);
        let b = self.node(x).ch[dir ^ 1];

        // The path-parent reference lives at the auxiliary root; it follows
        // whichever node is promoted.
        let pp = self.node(p).pp;
        self.node_mut(p).pp = Id::NIL;
        self.node_mut(x).pp = pp;

        if !g.is_nil() {
            let gd = usize::from(self.node(g).ch[1] == p);
            self.node_mut(g).ch[gd] = x;
        }
        self.node_mut(x).p = g;

        self.node_mut(x).ch[dir ^ 1] = p;
        self.node_mut(p).p = x;

        self.node_mut(p).ch[dir] = b;
        if !b.is_nil() {
            self.node_mut(b).p = p;
        }

        self.pull(p);
        self.pull(x);
    }

    fn push_path(&mut self, x: Id) {
        self.stack.clear();
        let mut y = x;
        self.stack.push(y);
        while !self.is_aux_root(y) {
            y = self.node(y).p;
            self.stack.push(y);
        }
        for i in (0..self.stack.len()).rev() {
            let v = self.stack[i];
            self.push(v);
        }
    }

    fn splay(&mut self, x: Id) {
        self.push_path(x);

        while !self.is_aux_root(x) {
            let p = self.node(x).p;
            if !self.is_aux_root(p) {
                let g = self.node(p).p;
                let zigzig = (self.node(g).ch[0] == p) == (self.node(p).ch[0] == x);
                if zigzig {
                    self.rotate(p);
                } else {
                    self.rotate(x);
                }
            }
            self.rotate(x);
        }
    }

    /// Expose the path from the real root of `x`'s tree to `x` as a single
    /// auxiliary tree rooted at `x`.
    ///
    /// Returns the last path-parent spliced through: the topmost node of the
    /// previously preferred structure that the new path passes. Called right
    /// after an `access(u)`, this is the lowest common ancestor of `u` and
    /// `x`; on a cold access it is on the root path anyway and only used by
    /// callers that immediately re-derive what they need.
    fn access(&mut self, x: Id) -> Id {
        self.splay(x);
        let r = self.node(x).ch[1];
        if !r.is_nil() {
            // Nodes deeper than `x` on the old preferred path become a
            // separate auxiliary tree hanging below `x`.
            self.node_mut(r).p = Id::NIL;
            self.node_mut(r).pp = x;
            self.node_mut(x).ch[1] = Id::NIL;
            self.pull(x);
        }

        let mut last = x;
        loop {
            let w = self.node(x).pp;
            if w.is_nil() {
                break;
            }
            self.splay(w);
            let r = self.node(w).ch[1];
            if !r.is_nil() {
                self.node_mut(r).p = Id::NIL;
                self.node_mut(r).pp = w;
            }
            self.node_mut(w).ch[1] = x;
            self.node_mut(x).p = w;
            self.node_mut(x).pp = Id::NIL;
            self.pull(w);
            last = w;
            self.splay(x);
        }
        last
    }

    fn find_root_id(&mut self, x: Id) -> Id {
        self.access(x);
        let mut y = x;
        self.push(y);
        while !self.node(y).ch[0].is_nil() {
            y = self.node(y).ch[0];
            self.push(y);
        }
        // Splay the root to keep the amortized bound.
        self.splay(y);
        y
    }

    /// Root of the tree containing `v`.
    pub fn find_root(&mut self, v: NodeId) -> Result<NodeId> {
        let x = self.check(v)?;
        Ok(handle(self.find_root_id(x)))
    }

    /// Whether `u` and `v` are in the same tree.
    pub fn are_connected(&mut self, u: NodeId, v: NodeId) -> Result<bool> {
        let a = self.check(u)?;
        let b = self.check(v)?;
        if a == b {
            return Ok(true);
        }
        Ok(self.find_root_id(a) == self.find_root_id(b))
    }

    /// Attach `v`, the root of its own tree, as a child of `u`.
    ///
    /// Fails with [`ForestError::AlreadyConnected`] if `u` and `v` are in
    /// the same tree (including `u == v`), and with
    /// [`ForestError::NotARoot`] if `v` has a parent. The forest is
    /// unchanged on error.
    pub fn link(&mut self, u: NodeId, v: NodeId) -> Result<()> {
        let pu = self.check(u)?;
        let cv = self.check(v)?;
        let ru = self.find_root_id(pu);
        let rv = self.find_root_id(cv);
        if ru == rv {
            return Err(ForestError::AlreadyConnected);
        }
        if rv != cv {
            return Err(ForestError::NotARoot);
        }
        self.access(cv);
        debug_assert!(self.node(cv).ch[0].is_nil());
        self.node_mut(cv).pp = pu;
        Ok(())
    }

    /// Detach `v` from its parent, making it the root of its own tree.
    ///
    /// Fails with [`ForestError::NoParent`] if `v` already is a root.
    pub fn cut(&mut self, v: NodeId) -> Result<()> {
        let x = self.check(v)?;
        self.access(x);
        let l = self.node(x).ch[0];
        if l.is_nil() {
            return Err(ForestError::NoParent);
        }
        self.node_mut(l).p = Id::NIL;
        self.node_mut(x).ch[0] = Id::NIL;
        self.pull(x);
        Ok(())
    }

    /// Real-tree parent of `v`, or `None` if `v` is a root.
    pub fn parent(&mut self, v: NodeId) -> Result<Option<NodeId>> {
        let x = self.check(v)?;
        self.access(x);
        let mut y = self.node(x).ch[0];
        if y.is_nil() {
            return Ok(None);
        }
        // The parent is the in-order predecessor: rightmost of the left subtree.
        self.push(y);
        while !self.node(y).ch[1].is_nil() {
            y = self.node(y).ch[1];
            self.push(y);
        }
        self.splay(y);
        Ok(Some(handle(y)))
    }

    /// Lowest common ancestor of `u` and `v`.
    pub fn lca(&mut self, u: NodeId, v: NodeId) -> Result<NodeId> {
        let a = self.check(u)?;
        let b = self.check(v)?;
        if self.find_root_id(a) != self.find_root_id(b) {
            return Err(ForestError::NotConnected);
        }
        self.access(a);
        let w = self.access(b);
        Ok(handle(w))
    }

    pub fn value(&mut self, v: NodeId) -> Result<C::Value> {
        let x = self.check(v)?;
        self.access(x);
        Ok(self.node(x).value)
    }

    pub fn set_value(&mut self, v: NodeId, value: C::Value) -> Result<()> {
        let x = self.check(v)?;
        self.access(x);
        self.node_mut(x).value = value;
        self.pull(x);
        Ok(())
    }

    /// Apply `delta` to the single vertex `v`.
    pub fn update_value(&mut self, v: NodeId, delta: C::Delta) -> Result<()> {
        let x = self.check(v)?;
        self.access(x);
        let nx = self.node_mut(x);
        nx.value = C::delta_apply_value(&nx.value, &delta);
        self.pull(x);
        Ok(())
    }

    /// Expose both endpoints and return the meeting point plus the halves:
    /// after this, `w`'s right subtree is the `w → b` half (exclusive of
    /// `w`), and when `a != w`, `a` roots the auxiliary tree holding the
    /// `w → a` half (exclusive of `w`).
    fn expose_path(&mut self, a: Id, b: Id) -> Result<Id> {
        if self.find_root_id(a) != self.find_root_id(b) {
            return Err(ForestError::NotConnected);
        }
        self.access(a);
        let w = self.access(b);
        self.splay(w);
        Ok(w)
    }

    /// Aggregate over the vertices of the `u … v` path.
    ///
    /// Fails with [`ForestError::NotConnected`] if `u` and `v` are in
    /// different trees.
    pub fn path_query(&mut self, u: NodeId, v: NodeId) -> Result<C::Agg> {
        let a = self.check(u)?;
        let b = self.check(v)?;
        let w = self.expose_path(a, b)?;
        let down = self.agg(self.node(w).ch[1]);
        let up = if a == w {
            C::agg_unit()
        } else {
            self.splay(a);
            self.node(a).agg
        };
        Ok(C::agg_merge(&up, &self.node(w).value, &down))
    }

    /// Apply `delta` to every vertex on the `u … v` path.
    ///
    /// Fails with [`ForestError::NotConnected`] if `u` and `v` are in
    /// different trees.
    pub fn path_update(&mut self, u: NodeId, v: NodeId, delta: C::Delta) -> Result<()> {
        let a = self.check(u)?;
        let b = self.check(v)?;
        let w = self.expose_path(a, b)?;
        let down = self.node(w).ch[1];
        self.apply_delta(down, delta);
        {
            let nw = self.node_mut(w);
            nw.value = C::delta_apply_value(&nw.value, &delta);
        }
        if a != w {
            self.splay(a);
            self.apply_delta(a, delta);
        }
        self.pull(w);
        Ok(())
    }

    /// Number of vertices on the `u … v` path.
    pub fn path_len(&mut self, u: NodeId, v: NodeId) -> Result<usize> {
        let a = self.check(u)?;
        let b = self.check(v)?;
        let w = self.expose_path(a, b)?;
        let mut len = 1 + self.sz(self.node(w).ch[1]) as usize;
        if a != w {
            self.splay(a);
            len += self.node(a).sz as usize;
        }
        Ok(len)
    }
}

impl LinkCutForest<SumAdd> {
    /// Add `delta` to a single vertex value.
    pub fn value_add(&mut self, v: NodeId, delta: i64) -> Result<()> {
        self.update_value(v, delta)
    }

    /// Sum of the values on the `u … v` path.
    pub fn path_sum(&mut self, u: NodeId, v: NodeId) -> Result<i64> {
        self.path_query(u, v)
    }
}
