//! Event delivery and contextual queries.
//!
//! # Events
//!
//! An event is offered to the active action at each level of containment,
//! starting with the top-level stack. At each level it travels down the
//! buried chain until some action proposes something other than `Continue`;
//! that proposal goes into the responding action's pending slot. Then the
//! event moves on to the active child of the level's top action.
//!
//! # Queries
//!
//! A query starts at the innermost active action and walks its buried chain,
//! then climbs to the containing action and walks that level's buried chain,
//! and so on up to the top-level stack. The first defined answer wins.

use tracing::trace;

use crate::action::AnswerOf;
use crate::agent::{Agent, Answer, Event, Query};
use crate::arena::NodeId;
use crate::behavior::BehaviorRoot;
use crate::pending::MergeOutcome;

impl<A: Agent> BehaviorRoot<A> {
    /// Delivers `event` to the stack.
    ///
    /// Events arriving before the top action has started are ignored, as are
    /// events presented with a foreign actor under
    /// [`ActorBinding::Cached`](crate::ActorBinding::Cached).
    pub fn on_event(&mut self, actor: &mut A, event: &A::Event) {
        let Some(top) = self.top else {
            return;
        };
        if !self.nodes.get(top).is_some_and(|n| n.started) {
            trace!(behavior = %self.config.name, event = event.name(), "event before start ignored");
            return;
        }
        if !self.bind(actor) {
            return;
        }

        self.propagate_event(actor, top, event);
    }

    fn propagate_event(&mut self, actor: &mut A, id: NodeId, event: &A::Event) {
        if !self.nodes.get(id).is_some_and(|n| n.started) {
            return;
        }

        let mut cursor = Some(id);
        while let Some(responder) = cursor {
            let proposal = self
                .with_action(responder, None, |action, _| action.on_event(actor, event))
                .unwrap_or_default();

            if !proposal.is_continue() {
                if let Some(node) = self.nodes.get_mut(responder) {
                    let outcome = node.pending.store(proposal, event.name());
                    if outcome == MergeOutcome::Stored {
                        trace!(
                            behavior = %self.config.name,
                            event = event.name(),
                            responder = %node.name,
                            "event claimed"
                        );
                    }
                }
                break;
            }

            cursor = self.buried_of(responder);
        }

        if let Some(child) = self.child_of(id) {
            self.propagate_event(actor, child, event);
        }
    }

    /// Asks the stack a contextual question.
    ///
    /// Returns the undefined answer if no action on the active path has an
    /// opinion, if the stack is empty, or if `actor` is refused by a cached
    /// binding.
    pub fn query(&self, actor: &A, query: &A::Query) -> AnswerOf<A> {
        if !self.accepts(actor) {
            trace!(behavior = %self.config.name, query = query.name(), "query from foreign actor");
            return Answer::undefined();
        }
        let Some(mut leaf) = self.top else {
            return Answer::undefined();
        };
        while let Some(child) = self.child_of(leaf) {
            leaf = child;
        }

        let mut level = Some(leaf);
        while let Some(start) = level {
            let container = self.parent_of(start);

            let mut cursor = Some(start);
            while let Some(id) = cursor {
                let Some(node) = self.nodes.get(id) else {
                    break;
                };
                if let Some(action) = node.action.as_deref() {
                    let answer = action.query(actor, query);
                    if !answer.is_undefined() {
                        return answer;
                    }
                }
                cursor = node.buried;
            }

            level = container;
        }

        Answer::undefined()
    }
}
