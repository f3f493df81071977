//! Pipeline registry: owns executives by `NodeId` and records edges.
//!
//! Execution itself is demand driven and lives in `Executive`; the registry
//! only adds bookkeeping on top (ids, edge list, upstream-first ordering for
//! diagnostics).

use crate::config::ExecutiveConfig;
use crate::pipeline::algorithm::Algorithm;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::executive::Executive;
use crate::pipeline::id::{EdgeId, NodeId};
use std::cell::{Ref, RefMut};
use std::rc::Rc;

/// An edge connecting an output port of one node to an input port of another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub from_node: NodeId,
    pub from_port: usize,
    pub to_node: NodeId,
    pub to_port: usize,
}

/// A slot holding a node's executive.
struct NodeSlot {
    executive: Rc<Executive>,
    /// Whether this node has been removed (slot is kept so ids stay stable).
    deleted: bool,
}

#[derive(Default)]
pub struct Pipeline {
    nodes: Vec<NodeSlot>,
    edges: Vec<Option<Edge>>,
    config: ExecutiveConfig,
}

impl Pipeline {
    pub fn new(config: ExecutiveConfig) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &ExecutiveConfig {
        &self.config
    }

    // ── Graph building ──

    /// Wrap `algorithm` in an executive and register it.
    pub fn add_node<A: Algorithm>(&mut self, algorithm: A) -> PipelineResult<NodeId> {
        let executive = Executive::new(algorithm, self.config.clone())?;
        Ok(self.add_executive(executive))
    }

    /// Register an executive built elsewhere.
    pub fn add_executive(&mut self, executive: Rc<Executive>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        tracing::info!("Added node {:?}: '{}'", id, executive.name());
        self.nodes.push(NodeSlot {
            executive,
            deleted: false,
        });
        id
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> PipelineResult<()> {
        self.node(id)?;
        let touching: Vec<EdgeId> = self
            .edges()
            .filter(|e| e.from_node == id || e.to_node == id)
            .map(|e| e.id)
            .collect();
        for edge in touching {
            self.disconnect(edge)?;
        }
        self.nodes[id.index()].deleted = true;
        tracing::info!("Removed node {:?}", id);
        Ok(())
    }

    /// Connect output `from_port` of `from` to input `to_port` of `to`.
    pub fn connect(
        &mut self,
        from: NodeId,
        from_port: usize,
        to: NodeId,
        to_port: usize,
    ) -> PipelineResult<EdgeId> {
        let producer = self.node(from)?.clone();
        let consumer = self.node(to)?.clone();
        consumer.add_input_connection(to_port, &producer, from_port)?;
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(Edge {
            id,
            from_node: from,
            from_port,
            to_node: to,
            to_port,
        }));
        tracing::info!("Added edge {:?}: {:?} -> {:?}", id, from, to);
        Ok(id)
    }

    pub fn disconnect(&mut self, id: EdgeId) -> PipelineResult<()> {
        let edge = self
            .edges
            .get(id.index())
            .and_then(Option::as_ref)
            .cloned()
            .ok_or(PipelineError::UnknownEdge(id))?;
        let producer = self.node(edge.from_node)?.clone();
        let consumer = self.node(edge.to_node)?.clone();
        let index = consumer
            .connections()
            .get(edge.to_port)
            .and_then(|conns| {
                conns
                    .iter()
                    .position(|c| Rc::ptr_eq(c.producer(), &producer) && c.port() == edge.from_port)
            })
            .ok_or(PipelineError::UnknownEdge(id))?;
        consumer.remove_input_connection(edge.to_port, index)?;
        self.edges[id.index()] = None;
        tracing::info!("Removed edge {:?}", id);
        Ok(())
    }

    // ── Lookup ──

    pub fn node(&self, id: NodeId) -> PipelineResult<&Rc<Executive>> {
        self.nodes
            .get(id.index())
            .filter(|slot| !slot.deleted)
            .map(|slot| &slot.executive)
            .ok_or(PipelineError::UnknownNode(id))
    }

    /// Typed view of a node's algorithm.
    pub fn algorithm<A: Algorithm>(&self, id: NodeId) -> Option<Ref<'_, A>> {
        self.node(id).ok()?.algorithm::<A>()
    }

    /// Typed mutable view of a node's algorithm.
    pub fn algorithm_mut<A: Algorithm>(&self, id: NodeId) -> Option<RefMut<'_, A>> {
        self.node(id).ok()?.algorithm_mut::<A>()
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|slot| !slot.deleted && slot.executive.name() == name)
            .map(|i| NodeId(i as u32))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| !slot.deleted).count()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().flatten()
    }

    // ── Execution ──

    /// Pull every output of `id` up to date.
    pub fn update(&self, id: NodeId) -> PipelineResult<()> {
        self.node(id)?.update()
    }

    pub fn update_port(&self, id: NodeId, port: usize) -> PipelineResult<()> {
        self.node(id)?.update_port(port)
    }

    /// Upstream-first order over live nodes (Kahn's algorithm).
    pub fn execution_order(&self) -> Vec<NodeId> {
        let n = self.nodes.len();
        let mut in_degree = vec![0u32; n];
        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];

        for edge in self.edges() {
            let from = edge.from_node.index();
            let to = edge.to_node.index();
            if from < n && to < n {
                adj[from].push(to);
                in_degree[to] += 1;
            }
        }

        let live = |i: &usize| !self.nodes[*i].deleted;
        let mut queue: Vec<usize> = (0..n).filter(live).filter(|&i| in_degree[i] == 0).collect();
        queue.reverse();
        let mut order = Vec::with_capacity(n);

        while let Some(node) = queue.pop() {
            order.push(NodeId(node as u32));
            for &next in &adj[node] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push(next);
                }
            }
        }

        let expected = (0..n).filter(live).count();
        if order.len() != expected {
            tracing::warn!(
                "Pipeline graph has a cycle! Only {} of {} nodes ordered.",
                order.len(),
                expected
            );
        }
        order
    }
}
