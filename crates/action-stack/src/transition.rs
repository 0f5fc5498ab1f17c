//! The transition engine.
//!
//! Every structural change to a behavior goes through [`BehaviorRoot::apply`]:
//! hooks return results, results are adopted into the arena, and `apply`
//! ends, starts, suspends, resumes and frees nodes in a fixed order. The
//! `invoke_*` methods do the bookkeeping around each user hook and propagate
//! the activity through contained and stacked nodes.

use tracing::{debug, trace};

use crate::action::Action;
use crate::agent::Agent;
use crate::arena::NodeId;
use crate::behavior::BehaviorRoot;
use crate::node::Node;
use crate::result::{ActionResult, ResultKind};

/// A result whose target, if any, already lives in the arena.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Step {
    pub kind: ResultKind,
    pub target: Option<NodeId>,
    pub reason: Option<&'static str>,
}

impl Step {
    pub fn proceed() -> Self {
        Self {
            kind: ResultKind::Continue,
            target: None,
            reason: None,
        }
    }

    pub fn change_to(target: NodeId, reason: &'static str) -> Self {
        Self {
            kind: ResultKind::ChangeTo,
            target: Some(target),
            reason: Some(reason),
        }
    }

    pub fn done(reason: &'static str) -> Self {
        Self {
            kind: ResultKind::Done,
            target: None,
            reason: Some(reason),
        }
    }

    pub fn is_continue(&self) -> bool {
        self.kind == ResultKind::Continue
    }
}

/// Which per-tick hook a drive pass invokes on each node.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Drive {
    Update(f32),
    Resume,
}

impl<A: Agent> BehaviorRoot<A> {
    // ------------------------------------------------------------------
    // Arena helpers
    // ------------------------------------------------------------------

    pub(crate) fn alloc(&mut self, action: Box<dyn Action<A>>) -> NodeId {
        let id = self.nodes.insert(Node::new(action));
        trace!(behavior = %self.config.name, node = ?id, "node allocated");
        id
    }

    /// Frees `id` together with its contained stack and everything stacked
    /// above it. Stale ids are ignored, so a node is never freed twice.
    pub(crate) fn destroy(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let (parent, child, buried, covering) =
            (node.parent, node.child, node.buried, node.covering);

        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p))
            && parent.child == Some(id)
        {
            parent.child = buried;
        }

        let mut cursor = child;
        while let Some(contained) = cursor {
            cursor = self.buried_of(contained);
            self.destroy(contained);
        }

        if let Some(below) = buried.and_then(|b| self.nodes.get_mut(b))
            && below.covering == Some(id)
        {
            below.covering = None;
        }

        if let Some(above) = covering {
            self.destroy(above);
        }

        if let Some(node) = self.nodes.remove(id) {
            trace!(behavior = %self.config.name, node = %node.name, "node freed");
        }
    }

    pub(crate) fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub(crate) fn child_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.child)
    }

    pub(crate) fn buried_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.buried)
    }

    fn covering_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.covering)
    }

    fn set_child(&mut self, id: NodeId, child: Option<NodeId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.child = child;
        }
    }

    pub(crate) fn name_of(&self, id: Option<NodeId>) -> &str {
        id.and_then(|id| self.nodes.get(id))
            .map_or("<none>", |n| n.name.as_str())
    }

    /// Runs `f` on the action of `id`, handing it the action of `peer` as
    /// the other party of the transition.
    ///
    /// The action is moved out of its slot for the duration of the call so
    /// that both can be borrowed at once.
    pub(crate) fn with_action<R>(
        &mut self,
        id: NodeId,
        peer: Option<NodeId>,
        f: impl FnOnce(&mut dyn Action<A>, Option<&dyn Action<A>>) -> R,
    ) -> Option<R> {
        let mut action = self.nodes.get_mut(id)?.action.take()?;
        let peer = peer
            .filter(|&p| p != id)
            .and_then(|p| self.nodes.get(p))
            .and_then(|n| n.action.as_deref());

        let out = f(&mut *action, peer);

        if let Some(node) = self.nodes.get_mut(id) {
            node.action = Some(action);
        }
        Some(out)
    }

    /// Moves the action carried by `result` into the arena.
    pub(crate) fn adopt(&mut self, result: ActionResult<A>) -> Step {
        let ActionResult {
            kind,
            action,
            reason,
        } = result;
        let target = match kind {
            ResultKind::ChangeTo | ResultKind::SuspendFor => action.map(|a| self.alloc(a)),
            _ => None,
        };
        Step {
            kind,
            target,
            reason,
        }
    }

    /// Adopts a result returned by one of `id`'s own hooks.
    ///
    /// A suspend requested by the action itself discards its pending event
    /// so a stale proposal cannot immediately undo the suspension.
    fn adopt_hook_result(&mut self, id: NodeId, result: ActionResult<A>) -> Step {
        if result.kind == ResultKind::SuspendFor
            && let Some(node) = self.nodes.get_mut(id)
        {
            node.pending.clear();
        }
        self.adopt(result)
    }

    // ------------------------------------------------------------------
    // Applying results
    // ------------------------------------------------------------------

    /// Applies `step`, produced by node `id`, and returns the node that now
    /// occupies `id`'s position, or `None` if the stack there is finished.
    pub(crate) fn apply(&mut self, actor: &mut A, id: NodeId, step: Step) -> Option<NodeId> {
        match step.kind {
            ResultKind::ChangeTo => {
                let Some(next) = step.target else {
                    return Some(id);
                };
                self.log_transition(step, id, Some(next));

                self.invoke_end(actor, id, Some(next));
                let parent = self.parent_of(id);
                let buried = self.buried_of(id);
                let start = self.invoke_start(actor, next, Some(id), parent, buried);
                if next != id {
                    self.destroy(id);
                }
                self.apply(actor, next, start)
            }
            ResultKind::SuspendFor => {
                let Some(next) = step.target else {
                    return Some(id);
                };

                let mut top = id;
                while let Some(above) = self.covering_of(top) {
                    top = above;
                }
                self.log_transition(step, top, Some(next));

                let parent = self.parent_of(id);
                let base = self.invoke_suspend(actor, top, Some(next));
                let start = self.invoke_start(actor, next, base, parent, base);
                self.apply(actor, next, start)
            }
            ResultKind::Done => {
                let resumed = self.buried_of(id);
                self.log_transition(step, id, resumed);

                self.invoke_end(actor, id, resumed);
                match resumed {
                    None => {
                        self.destroy(id);
                        None
                    }
                    Some(resumed) => {
                        let resume = self.invoke_resume(actor, resumed, Some(id));
                        self.destroy(id);
                        self.apply(actor, resumed, resume)
                    }
                }
            }
            ResultKind::Continue | ResultKind::Sustain => Some(id),
        }
    }

    fn log_transition(&self, step: Step, from: NodeId, to: Option<NodeId>) {
        if self.config.log_transitions {
            debug!(
                behavior = %self.config.name,
                kind = %step.kind,
                from = self.name_of(Some(from)),
                to = self.name_of(to),
                reason = step.reason.unwrap_or(""),
                "transition"
            );
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle propagation
    // ------------------------------------------------------------------

    /// Enters node `id`: links it into the stack, starts its initial child,
    /// then runs its `on_start` hook.
    pub(crate) fn invoke_start(
        &mut self,
        actor: &mut A,
        id: NodeId,
        prior: Option<NodeId>,
        parent: Option<NodeId>,
        buried: Option<NodeId>,
    ) -> Step {
        let actor_id = actor.id();
        let Some(node) = self.nodes.get_mut(id) else {
            return Step::proceed();
        };
        node.started = true;
        node.suspended = false;
        node.actor = Some(actor_id);
        node.parent = parent;
        node.buried = buried;
        node.covering = None;

        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.child = Some(id);
        }
        if let Some(below) = buried.and_then(|b| self.nodes.get_mut(b)) {
            below.covering = Some(id);
        }

        let initial = self
            .with_action(id, None, |action, _| action.initial_child(actor))
            .flatten();
        if let Some(initial) = initial {
            let child = self.alloc(initial);
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Some(id);
            }
            let top = self.apply(actor, child, Step::change_to(child, "Starting child Action"));
            self.set_child(id, top);
        }

        let result = self
            .with_action(id, prior, |action, prior| action.on_start(actor, prior))
            .unwrap_or_default();
        self.adopt_hook_result(id, result)
    }

    /// Runs one drive pass on node `id`: contained nodes react before their
    /// container, and a pending event transition takes precedence over both.
    pub(crate) fn invoke_drive(&mut self, actor: &mut A, id: NodeId, drive: Drive) -> Step {
        if self.is_out_of_scope(id) {
            return Step::done("Out of scope");
        }

        let Some(node) = self.nodes.get(id) else {
            return Step::proceed();
        };
        if !node.started {
            return Step::change_to(id, "Starting Action");
        }

        let pending = self.process_pending_events(id);
        if !pending.is_continue() {
            return pending;
        }

        if let Some(child) = self.child_of(id) {
            let step = self.invoke_drive(actor, child, drive);
            let top = self.apply(actor, child, step);
            self.set_child(id, top);
        }

        let result = self
            .with_action(id, None, |action, _| match drive {
                Drive::Update(interval) => action.update(actor, interval),
                Drive::Resume => action.on_resume(actor, None),
            })
            .unwrap_or_default();
        self.adopt_hook_result(id, result)
    }

    /// Calls `on_end` on `id`'s contained stack, on `id`, and on everything
    /// stacked above it. Links are left intact: the node must stay valid as
    /// the peer of the transition that ended it.
    pub(crate) fn invoke_end(&mut self, actor: &mut A, id: NodeId, next: Option<NodeId>) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.started {
            return;
        }
        node.started = false;

        let mut cursor = node.child;
        while let Some(contained) = cursor {
            cursor = self.buried_of(contained);
            self.invoke_end(actor, contained, next);
        }

        self.with_action(id, next, |action, next| action.on_end(actor, next));

        let covering = self.nodes.get_mut(id).and_then(|node| {
            node.actor = None;
            node.covering
        });
        if let Some(above) = covering {
            self.invoke_end(actor, above, next);
        }
    }

    /// Suspends `id` (contained stack first) for `interruptor`.
    ///
    /// Returns the node that ends up on top of this position: `id` itself,
    /// or the node it buried if its `on_suspend` hook chose to finish.
    fn invoke_suspend(
        &mut self,
        actor: &mut A,
        id: NodeId,
        interruptor: Option<NodeId>,
    ) -> Option<NodeId> {
        if let Some(child) = self.child_of(id) {
            let top = self.invoke_suspend(actor, child, interruptor);
            self.set_child(id, top);
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.suspended = true;
        }

        let result = self
            .with_action(id, interruptor, |action, interruptor| {
                action.on_suspend(actor, interruptor)
            })
            .unwrap_or_default();

        match result.kind {
            ResultKind::Done => {
                if self.config.log_transitions {
                    debug!(
                        behavior = %self.config.name,
                        node = self.name_of(Some(id)),
                        reason = result.reason.unwrap_or(""),
                        "finished instead of suspending"
                    );
                }
                self.invoke_end(actor, id, None);
                let buried = self.buried_of(id);
                self.destroy(id);
                buried
            }
            ResultKind::Continue => Some(id),
            kind => {
                trace!(
                    behavior = %self.config.name,
                    node = self.name_of(Some(id)),
                    %kind,
                    "on_suspend result treated as CONTINUE"
                );
                Some(id)
            }
        }
    }

    /// Makes buried node `id` active again after `interruptor` finished.
    pub(crate) fn invoke_resume(
        &mut self,
        actor: &mut A,
        id: NodeId,
        interruptor: Option<NodeId>,
    ) -> Step {
        let Some(node) = self.nodes.get_mut(id) else {
            return Step::proceed();
        };
        if !node.suspended || node.pending.is_requesting_change() {
            return Step::proceed();
        }
        node.suspended = false;
        node.covering = None;
        let (parent, child) = (node.parent, node.child);

        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.child = Some(id);
        }

        if let Some(child) = child {
            let step = self.invoke_resume(actor, child, interruptor);
            let top = self.apply(actor, child, step);
            self.set_child(id, top);
        }

        let result = self
            .with_action(id, interruptor, |action, interruptor| {
                action.on_resume(actor, interruptor)
            })
            .unwrap_or_default();
        self.adopt_hook_result(id, result)
    }

    // ------------------------------------------------------------------
    // Pending events
    // ------------------------------------------------------------------

    /// `true` if anything buried under `id` is about to change or finish.
    pub(crate) fn is_out_of_scope(&self, id: NodeId) -> bool {
        let mut under = self.buried_of(id);
        while let Some(below) = under {
            let Some(node) = self.nodes.get(below) else {
                break;
            };
            if matches!(node.pending.kind(), ResultKind::ChangeTo | ResultKind::Done) {
                return true;
            }
            under = node.buried;
        }
        false
    }

    /// Consumes the pending event transition that applies to `id`: its own
    /// change request, or else a suspend requested by a node buried under it.
    fn process_pending_events(&mut self, id: NodeId) -> Step {
        let Some(node) = self.nodes.get_mut(id) else {
            return Step::proceed();
        };
        if node.pending.is_requesting_change() {
            let result = node.pending.take();
            return self.adopt(result);
        }

        let mut under = node.buried;
        while let Some(below) = under {
            let Some(node) = self.nodes.get_mut(below) else {
                break;
            };
            if node.pending.kind() == ResultKind::SuspendFor {
                let result = node.pending.take();
                return self.adopt(result);
            }
            under = node.buried;
        }

        Step::proceed()
    }
}

#[cfg(test)]
mod tests {
    use crate::action::Action;
    use crate::behavior::BehaviorRoot;
    use crate::config::BehaviorConfig;
    use crate::result::{ActionResult, EventDesiredResult};
    use crate::testing::{Dummy, Idle};

    /// Asks to be suspended, then refuses to be buried.
    struct Fragile;

    impl Action<Dummy> for Fragile {
        fn name(&self) -> &str {
            "Fragile"
        }

        fn update(&mut self, _actor: &mut Dummy, _interval: f32) -> ActionResult<Dummy> {
            ActionResult::suspend_for(Idle("Panic"))
        }

        fn on_suspend(
            &mut self,
            _actor: &mut Dummy,
            _interruptor: Option<&dyn Action<Dummy>>,
        ) -> ActionResult<Dummy> {
            ActionResult::done().because("cannot wait")
        }
    }

    struct Stubborn;

    impl Action<Dummy> for Stubborn {
        fn name(&self) -> &str {
            "Stubborn"
        }

        fn update(&mut self, _actor: &mut Dummy, _interval: f32) -> ActionResult<Dummy> {
            ActionResult::suspend_for(Idle("Nap"))
        }

        fn on_suspend(
            &mut self,
            _actor: &mut Dummy,
            _interruptor: Option<&dyn Action<Dummy>>,
        ) -> ActionResult<Dummy> {
            ActionResult::change_to(Idle("Ignored"))
        }
    }

    fn started(action: impl Action<Dummy>) -> BehaviorRoot<Dummy> {
        let mut behavior = BehaviorRoot::new(action, BehaviorConfig::default());
        behavior.update(&mut Dummy, 0.1);
        behavior
    }

    #[test]
    fn suspend_refused_with_done_replaces_the_suspended_action() {
        let mut behavior = started(Fragile);
        behavior.update(&mut Dummy, 0.1);

        let top = behavior.top().unwrap();
        assert_eq!(top.name(), "Panic");
        assert_eq!(top.buried_under(), None);
        assert_eq!(behavior.len(), 1);
    }

    #[test]
    fn other_suspend_results_are_treated_as_continue() {
        let mut behavior = started(Stubborn);
        behavior.update(&mut Dummy, 0.1);

        assert_eq!(behavior.debug_string(), "Nap<<Stubborn");
        assert_eq!(behavior.len(), 2);
    }

    #[test]
    fn destroying_a_stale_id_is_a_no_op() {
        let mut behavior = started(Idle("Gone"));
        let id = behavior.top().unwrap().id();
        behavior.clear(&mut Dummy);

        behavior.destroy(id);
        assert_eq!(behavior.len(), 0);
    }

    #[test]
    fn buried_change_request_puts_the_top_out_of_scope() {
        let mut behavior = started(Stubborn);
        behavior.update(&mut Dummy, 0.1);
        let top = behavior.top().unwrap().id();
        let buried = behavior.top().unwrap().buried_under().unwrap();

        behavior
            .nodes
            .get_mut(buried)
            .unwrap()
            .pending
            .store(EventDesiredResult::try_done(), "test");
        assert!(behavior.is_out_of_scope(top));

        // The top finishes; the buried action keeps its request for the next tick.
        behavior.update(&mut Dummy, 0.1);
        assert_eq!(behavior.top().unwrap().id(), buried);
        assert!(!behavior.contains(top));

        behavior.update(&mut Dummy, 0.1);
        assert!(behavior.is_empty());
        assert_eq!(behavior.len(), 0);
    }
}
