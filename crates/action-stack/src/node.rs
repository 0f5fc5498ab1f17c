//! Arena nodes wrapping user actions with their stack linkage.

use crate::action::Action;
use crate::agent::Agent;
use crate::arena::NodeId;
use crate::pending::PendingEventSlot;
use crate::result::{EventPriority, ResultKind};

/// One action instance on a behavior's stack.
///
/// Linkage:
/// - `parent`: the node whose current work this node represents.
/// - `child`: the active (top) node of this node's own contained stack.
/// - `buried`: the node this one suspended, resumed when this one is done.
/// - `covering`: the node directly on top of this one while it is buried.
pub(crate) struct Node<A: Agent> {
    /// `None` only while one of its hooks is running.
    pub action: Option<Box<dyn Action<A>>>,
    pub name: String,
    pub actor: Option<A::Id>,
    pub parent: Option<NodeId>,
    pub child: Option<NodeId>,
    pub buried: Option<NodeId>,
    pub covering: Option<NodeId>,
    pub started: bool,
    pub suspended: bool,
    pub pending: PendingEventSlot<A>,
}

impl<A: Agent> Node<A> {
    pub fn new(action: Box<dyn Action<A>>) -> Self {
        Self {
            name: action.name().to_owned(),
            action: Some(action),
            actor: None,
            parent: None,
            child: None,
            buried: None,
            covering: None,
            started: false,
            suspended: false,
            pending: PendingEventSlot::new(),
        }
    }
}

/// Read-only view of a node, for diagnostics and tests.
pub struct NodeInfo<'a, A: Agent> {
    pub(crate) id: NodeId,
    pub(crate) node: &'a Node<A>,
}

impl<'a, A: Agent> NodeInfo<'a, A> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    /// Identity of the actor performing this action, set between start and end.
    pub fn actor(&self) -> Option<A::Id> {
        self.node.actor
    }

    /// The node this one is running inside of.
    pub fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    /// The active contained node.
    pub fn active_child(&self) -> Option<NodeId> {
        self.node.child
    }

    /// The node this one will resume to when it finishes.
    pub fn buried_under(&self) -> Option<NodeId> {
        self.node.buried
    }

    /// The node stacked directly on top of this one.
    pub fn covered_by(&self) -> Option<NodeId> {
        self.node.covering
    }

    pub fn is_started(&self) -> bool {
        self.node.started
    }

    pub fn is_suspended(&self) -> bool {
        self.node.suspended
    }

    pub fn pending_kind(&self) -> ResultKind {
        self.node.pending.kind()
    }

    pub fn pending_priority(&self) -> EventPriority {
        self.node.pending.priority()
    }

    pub fn pending_target(&self) -> Option<&'a str> {
        self.node.pending.target_name()
    }
}
