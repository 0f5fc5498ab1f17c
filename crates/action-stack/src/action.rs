//! Core action trait.
//!
//! This module defines the [`Action`] trait, the unit of behavior managed by a
//! [`BehaviorRoot`](crate::BehaviorRoot). The trait is generic over the agent
//! type `A`, which gives every hook mutable access to the actor and fixes the
//! event and query vocabulary the action understands.
//!
//! Every hook except [`Action::name`] has a no-op default, so a concrete
//! action only overrides what it cares about.

use crate::agent::{Agent, Answer, Query};
use crate::result::{ActionResult, EventDesiredResult};

/// Answer type of the agent's query vocabulary.
pub type AnswerOf<A> = <<A as Agent>::Query as Query>::Answer;

/// Something an actor does.
///
/// Actions can contain actions (see [`Action::initial_child`]), representing
/// the precise context of the actor's behavior, and can bury each other on a
/// suspend stack. The engine guarantees that every `on_start` is eventually
/// followed by exactly one `on_end` when teardown is driven with an actor.
pub trait Action<A: Agent>: 'static {
    /// Name of this action, used in diagnostics.
    fn name(&self) -> &str;

    /// Returns `true` if `name` matches this action's name.
    fn is_named(&self, name: &str) -> bool {
        self.name() == name
    }

    /// Called once when the action becomes active.
    ///
    /// `prior` is the action being replaced or buried, if any. The returned
    /// result is applied immediately, so an action may transition again
    /// straight from its start hook.
    fn on_start(&mut self, _actor: &mut A, _prior: Option<&dyn Action<A>>) -> ActionResult<A> {
        ActionResult::proceed()
    }

    /// The action contained by this one when it starts.
    ///
    /// The returned child is started before [`Action::on_start`] runs.
    fn initial_child(&mut self, _actor: &mut A) -> Option<Box<dyn Action<A>>> {
        None
    }

    /// Does the work of the action.
    ///
    /// It is possible for `update` never to be called between a start and
    /// end pair because of immediate transitions.
    fn update(&mut self, _actor: &mut A, _interval: f32) -> ActionResult<A> {
        ActionResult::proceed()
    }

    /// Called when `interruptor` is about to be stacked on top of this action.
    ///
    /// Only [`ActionResult::proceed`] and [`ActionResult::done`] are
    /// meaningful. Returning `done` ends this action instead of burying it.
    /// Anything else is treated as `proceed`.
    fn on_suspend(
        &mut self,
        _actor: &mut A,
        _interruptor: Option<&dyn Action<A>>,
    ) -> ActionResult<A> {
        ActionResult::proceed()
    }

    /// Called when this action becomes active again after being buried.
    fn on_resume(
        &mut self,
        _actor: &mut A,
        _interruptor: Option<&dyn Action<A>>,
    ) -> ActionResult<A> {
        ActionResult::proceed()
    }

    /// Called exactly once when the action leaves the stack for any reason.
    fn on_end(&mut self, _actor: &mut A, _next: Option<&dyn Action<A>>) {}

    /// Responds to an event delivered while this action is on the stack.
    ///
    /// Returning [`EventDesiredResult::try_continue`] lets the event fall
    /// through to the action buried beneath this one.
    fn on_event(&mut self, _actor: &mut A, _event: &A::Event) -> EventDesiredResult<A> {
        EventDesiredResult::try_continue()
    }

    /// Answers a contextual query, or returns the undefined answer to defer
    /// to other actions on the stack.
    fn query(&self, _actor: &A, _query: &A::Query) -> AnswerOf<A> {
        Answer::undefined()
    }
}

/// Blanket implementation for boxed actions.
///
/// This lets `Box<dyn Action<A>>` be handed back wherever an `impl Action<A>`
/// is expected (e.g. [`ActionResult::change_to`]).
impl<A: Agent> Action<A> for Box<dyn Action<A>> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_named(&self, name: &str) -> bool {
        (**self).is_named(name)
    }

    fn on_start(&mut self, actor: &mut A, prior: Option<&dyn Action<A>>) -> ActionResult<A> {
        (**self).on_start(actor, prior)
    }

    fn initial_child(&mut self, actor: &mut A) -> Option<Box<dyn Action<A>>> {
        (**self).initial_child(actor)
    }

    fn update(&mut self, actor: &mut A, interval: f32) -> ActionResult<A> {
        (**self).update(actor, interval)
    }

    fn on_suspend(
        &mut self,
        actor: &mut A,
        interruptor: Option<&dyn Action<A>>,
    ) -> ActionResult<A> {
        (**self).on_suspend(actor, interruptor)
    }

    fn on_resume(
        &mut self,
        actor: &mut A,
        interruptor: Option<&dyn Action<A>>,
    ) -> ActionResult<A> {
        (**self).on_resume(actor, interruptor)
    }

    fn on_end(&mut self, actor: &mut A, next: Option<&dyn Action<A>>) {
        (**self).on_end(actor, next)
    }

    fn on_event(&mut self, actor: &mut A, event: &A::Event) -> EventDesiredResult<A> {
        (**self).on_event(actor, event)
    }

    fn query(&self, actor: &A, query: &A::Query) -> AnswerOf<A> {
        (**self).query(actor, query)
    }
}
