//! Persistent search tree stored in an index arena.
//!
//! Nodes live in a `Slab` and refer to each other by `NodeId`. Parent links
//! are plain indices, so dropping a subtree is a matter of releasing its
//! slots, and a re-expanded node simply receives fresh ones.

use std::cmp::Ordering;
use std::collections::VecDeque;

use log::trace;
use rustc_hash::FxHashSet;
use slab::Slab;

use super::node::{Children, NodeId, SearchNode};
use super::{EvaluationWeights, GameState};

pub struct SearchTree<S: GameState> {
    nodes: Slab<SearchNode<S>>,
    root: NodeId,
}

impl<S: GameState> SearchTree<S> {
    pub fn new(state: S) -> Self {
        let mut nodes = Slab::with_capacity(1024);
        let root = nodes.insert(SearchNode::new(state, None, 0));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &SearchNode<S> {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SearchNode<S> {
        &mut self.nodes[id]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Re-roots the tree at the explored node whose state equals `state`,
    /// discarding everything outside that node's subtree. Falls back to a
    /// single fresh root when no such node exists.
    ///
    /// Returns whether previously explored work was kept.
    pub fn reroot(&mut self, state: &S) -> bool {
        let found = self.find(state);
        match found {
            Some(id) if id == self.root => true,
            Some(id) => {
                let keep: FxHashSet<NodeId> = self.subtree(id).into_iter().collect();
                self.nodes.retain(|key, _| keep.contains(&key));
                self.nodes[id].parent = None;
                self.root = id;
                trace!("re-rooted at depth {}, kept {} nodes", self.nodes[id].depth(), keep.len());
                true
            }
            None => {
                self.reset(state.clone());
                false
            }
        }
    }

    /// Replaces the whole tree with one unevaluated root.
    pub fn reset(&mut self, state: S) {
        self.nodes.clear();
        self.root = self.nodes.insert(SearchNode::new(state, None, 0));
    }

    fn find(&self, state: &S) -> Option<NodeId> {
        let mut queue = VecDeque::from([self.root]);
        while let Some(id) = queue.pop_front() {
            let node = &self.nodes[id];
            if node.state() == state {
                return Some(id);
            }
            queue.extend(node.children.iter().copied());
        }
        None
    }

    /// All node ids of the subtree rooted at `id`, including `id`.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            ids.push(next);
            stack.extend(self.nodes[next].children.iter().copied());
        }
        ids
    }

    /// Generates one child per legal action if `id` is an unexpanded,
    /// non-terminal leaf. Returns the number of children created.
    pub fn expand(&mut self, id: NodeId) -> usize {
        let node = &self.nodes[id];
        if !node.is_leaf() || node.state().is_terminal() {
            return 0;
        }

        let depth = node.depth() + 1;
        let successors: Vec<_> = node
            .state()
            .legal_actions()
            .into_iter()
            .map(|action| {
                let state = node.state().apply(&action);
                SearchNode::new(state, Some(action), depth)
            })
            .collect();

        let mut children = Children::with_capacity(successors.len());
        for mut child in successors {
            child.parent = Some(id);
            children.push(self.nodes.insert(child));
        }
        let created = children.len();
        self.nodes[id].children = children;
        created
    }

    /// Cutoff: releases every descendant of `id` and marks `id`
    /// unevaluated so a later pass may grow it again.
    pub fn prune(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id].children);
        let mut stack: Vec<NodeId> = children.into_iter().collect();
        while let Some(next) = stack.pop() {
            let removed = self.nodes.remove(next);
            stack.extend(removed.children);
        }
        self.nodes[id].clear_evaluation();
    }

    /// Restores the values every node held before `pass` started writing.
    /// Nodes first evaluated during `pass` become unevaluated again.
    pub(crate) fn roll_back(&mut self, pass: u32) {
        for (_, node) in self.nodes.iter_mut() {
            node.roll_back(pass);
        }
    }

    /// Caches the static evaluation of every child of `id`.
    pub fn evaluate_children_statically(&mut self, id: NodeId, weights: &EvaluationWeights) {
        let children = self.nodes[id].children.clone();
        for child in children {
            self.nodes[child].static_evaluation(weights);
        }
    }

    /// Stable sort of the children of `id` by `compare`.
    pub fn sort_children<F>(&mut self, id: NodeId, mut compare: F)
    where
        F: FnMut(&SearchNode<S>, &SearchNode<S>) -> Ordering,
    {
        let mut children = std::mem::take(&mut self.nodes[id].children);
        children.sort_by(|&a, &b| compare(&self.nodes[a], &self.nodes[b]));
        self.nodes[id].children = children;
    }

    /// The child of `id` ranked highest by `compare`, if any.
    pub fn best_child<F>(&self, id: NodeId, mut compare: F) -> Option<NodeId>
    where
        F: FnMut(&SearchNode<S>, &SearchNode<S>) -> Ordering,
    {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .max_by(|&a, &b| compare(&self.nodes[a], &self.nodes[b]))
    }
}
