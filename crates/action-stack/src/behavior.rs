//! The behavior root: owner of an action stack and its per-tick driver.

use tracing::{debug, trace, warn};

use crate::action::Action;
use crate::agent::Agent;
use crate::arena::{Arena, NodeId};
use crate::config::{ActorBinding, BehaviorConfig};
use crate::error::Result;
use crate::node::{Node, NodeInfo};
use crate::transition::Drive;

/// Root of an action stack driving one actor.
///
/// A behavior owns every action instance it runs. Hosts feed it ticks with
/// [`update`](Self::update), events with [`on_event`](Self::on_event), and
/// ask it questions with [`query`](Self::query). The first action is not
/// started until the first update.
///
/// # Example
///
/// ```
/// use action_stack::{Action, ActionResult, Agent, BehaviorConfig, BehaviorRoot, NoEvent, NoQuery};
///
/// struct Npc {
///     steps: u32,
/// }
///
/// impl Agent for Npc {
///     type Id = u32;
///     type Event = NoEvent;
///     type Query = NoQuery;
///
///     fn id(&self) -> u32 {
///         1
///     }
/// }
///
/// struct Walk;
///
/// impl Action<Npc> for Walk {
///     fn name(&self) -> &str {
///         "Walk"
///     }
///
///     fn update(&mut self, npc: &mut Npc, _interval: f32) -> ActionResult<Npc> {
///         npc.steps += 1;
///         if npc.steps == 3 { ActionResult::done() } else { ActionResult::proceed() }
///     }
/// }
///
/// let mut npc = Npc { steps: 0 };
/// let mut behavior = BehaviorRoot::new(Walk, BehaviorConfig::named("npc"));
/// while !behavior.is_empty() {
///     behavior.update(&mut npc, 0.1);
/// }
/// assert_eq!(npc.steps, 3);
/// ```
pub struct BehaviorRoot<A: Agent> {
    pub(crate) nodes: Arena<Node<A>>,
    pub(crate) top: Option<NodeId>,
    pub(crate) bound: Option<A::Id>,
    pub(crate) config: BehaviorConfig,
}

impl<A: Agent> BehaviorRoot<A> {
    /// Creates a behavior whose stack initially holds `initial`, not yet
    /// started.
    pub fn new(initial: impl Action<A>, config: BehaviorConfig) -> Self {
        let mut behavior = Self::empty(config);
        behavior.top = Some(behavior.alloc(Box::new(initial)));
        behavior
    }

    /// Creates a behavior with nothing on its stack.
    pub fn empty(config: BehaviorConfig) -> Self {
        Self {
            nodes: Arena::new(),
            top: None,
            bound: None,
            config,
        }
    }

    /// Renames the behavior, keeping the rest of its configuration.
    ///
    /// The new name goes through [`BehaviorConfig::validate`].
    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self> {
        self.config.name = name.into();
        self.config.validate()?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    /// Identity of the actor this behavior is currently bound to.
    pub fn bound_actor(&self) -> Option<A::Id> {
        self.bound
    }

    /// `true` once the stack has finished (or was never given an action).
    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Number of live action instances owned by this behavior.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Executes one tick of the stack.
    ///
    /// Starts the top action if it has not started yet, otherwise applies any
    /// pending event transition, then updates contained actions before their
    /// containers and applies whatever they return.
    pub fn update(&mut self, actor: &mut A, interval: f32) {
        self.drive(actor, Drive::Update(interval));
    }

    /// Notifies the stack that the actor is active again after the host
    /// paused it.
    ///
    /// Runs like [`update`](Self::update) but calls `on_resume` with no
    /// interruptor where `update` would be called.
    pub fn resume(&mut self, actor: &mut A) {
        self.drive(actor, Drive::Resume);
    }

    fn drive(&mut self, actor: &mut A, drive: Drive) {
        let Some(top) = self.top else {
            return;
        };
        if !self.bind(actor) {
            return;
        }

        let step = self.invoke_drive(actor, top, drive);
        self.top = self.apply(actor, top, step);

        if self.top.is_none() {
            trace!(behavior = %self.config.name, "stack finished");
        }
    }

    /// Ends the current stack and replaces it with `action`, to be started
    /// at the next update.
    ///
    /// Suspended actions end newest first, each one's contained actions
    /// before the action itself.
    ///
    /// With [`ActorBinding::Cached`] and an actor other than the bound one,
    /// the old stack is discarded without running its hooks and `actor`
    /// becomes the bound actor.
    pub fn reset(&mut self, actor: &mut A, action: impl Action<A>) {
        self.teardown(actor);
        self.top = Some(self.alloc(Box::new(action)));
    }

    /// Ends the current stack and leaves the behavior empty.
    pub fn clear(&mut self, actor: &mut A) {
        self.teardown(actor);
    }

    fn teardown(&mut self, actor: &mut A) {
        let id = actor.id();
        let foreign = matches!(
            (self.config.actor_binding, self.bound),
            (ActorBinding::Cached, Some(bound)) if bound != id
        );

        if let Some(top) = self.top {
            if foreign {
                warn!(
                    behavior = %self.config.name,
                    bound = ?self.bound,
                    presented = ?id,
                    "discarding stack of previously bound actor"
                );
            } else {
                self.log_teardown(top);
            }

            // Newest first: each node ends after everything stacked on it.
            let mut bottom = top;
            let mut cursor = Some(top);
            while let Some(node) = cursor {
                if !foreign {
                    self.invoke_end(actor, node, None);
                }
                bottom = node;
                cursor = self.buried_of(node);
            }
            self.destroy(bottom);
        }

        self.top = None;
        self.bound = Some(id);
    }

    fn log_teardown(&self, top: NodeId) {
        if self.config.log_transitions {
            debug!(
                behavior = %self.config.name,
                top = self.name_of(Some(top)),
                "ending stack"
            );
        }
    }

    /// Checks `actor` against the binding policy, rebinding if allowed.
    ///
    /// Returns `false` if the call must be refused.
    pub(crate) fn bind(&mut self, actor: &A) -> bool {
        let id = actor.id();
        match self.bound {
            None => {
                self.bound = Some(id);
                true
            }
            Some(bound) if bound == id => true,
            Some(bound) => match self.config.actor_binding {
                ActorBinding::Live => {
                    debug!(
                        behavior = %self.config.name,
                        old = ?bound,
                        new = ?id,
                        "rebinding to live actor"
                    );
                    self.bound = Some(id);
                    true
                }
                ActorBinding::Cached => {
                    warn!(
                        behavior = %self.config.name,
                        bound = ?bound,
                        presented = ?id,
                        "refusing call from foreign actor"
                    );
                    false
                }
            },
        }
    }

    /// `true` if `actor` may read from this behavior without rebinding.
    pub(crate) fn accepts(&self, actor: &A) -> bool {
        match (self.config.actor_binding, self.bound) {
            (ActorBinding::Cached, Some(bound)) => bound == actor.id(),
            _ => true,
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// The top-level action currently on top of the stack.
    pub fn top(&self) -> Option<NodeInfo<'_, A>> {
        self.top.and_then(|id| self.node(id))
    }

    /// The innermost active action, found by following active children down
    /// from the top.
    pub fn active_leaf(&self) -> Option<NodeInfo<'_, A>> {
        let mut leaf = self.top?;
        while let Some(child) = self.child_of(leaf) {
            leaf = child;
        }
        self.node(leaf)
    }

    /// Looks up a node by id. Returns `None` once the node has been freed.
    pub fn node(&self, id: NodeId) -> Option<NodeInfo<'_, A>> {
        self.nodes.get(id).map(|node| NodeInfo { id, node })
    }

    /// Borrows the action instance held by node `id`.
    pub fn action(&self, id: NodeId) -> Option<&dyn Action<A>> {
        self.nodes.get(id)?.action.as_deref()
    }

    /// Names of the active lineage from the top-level action down to the
    /// innermost one, joined by `/`, e.g. `Behavior/Patrol/MoveTo`.
    pub fn full_name(&self) -> String {
        let mut lineage = Vec::new();
        let mut cursor = self.active_leaf().map(|leaf| leaf.id());
        while let Some(id) = cursor {
            let Some(node) = self.nodes.get(id) else {
                break;
            };
            lineage.push(node.name.as_str());
            cursor = node.parent;
        }
        lineage.reverse();
        lineage.join("/")
    }

    /// One-line rendering of the whole stack.
    ///
    /// Each action is written as `Name( child )<<buried`, where `child` is
    /// the rendering of its active contained action and `buried` the action
    /// it suspended. The result is cut to
    /// [`debug_string_limit`](BehaviorConfig::debug_string_limit) bytes.
    pub fn debug_string(&self) -> String {
        let mut out = String::new();
        if let Some(top) = self.top {
            self.render(top, &mut out);
        }

        let limit = self.config.debug_string_limit;
        if out.len() > limit {
            let mut cut = limit;
            while !out.is_char_boundary(cut) {
                cut -= 1;
            }
            out.truncate(cut);
        }
        out
    }

    fn render(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        out.push_str(&node.name);

        if let Some(child) = node.child {
            out.push_str("( ");
            self.render(child, out);
            out.push_str(" )");
        }

        if let Some(buried) = node.buried {
            out.push_str("<<");
            self.render(buried, out);
        }
    }

    /// `true` if the node still exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }
}

impl<A: Agent> Drop for BehaviorRoot<A> {
    fn drop(&mut self) {
        if self.top.is_some() {
            debug!(
                behavior = %self.config.name,
                live = self.nodes.len(),
                "dropping behavior without ending its stack"
            );
        }
    }
}
