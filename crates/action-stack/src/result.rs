//! Results returned by actions and event handlers.
//!
//! Transitions are driven exclusively by return values. An action never
//! switches state in the middle of its own code: it returns an
//! [`ActionResult`] and the engine applies it atomically once the hook has
//! finished. Event handlers return an [`EventDesiredResult`] instead, which is
//! only a *proposal* that competes with other proposals by priority and is
//! executed at the next update.
//!
//! Both types can only be built through their named constructors so that the
//! origin of every transition stays auditable.

use std::fmt;

use crate::action::Action;
use crate::agent::Agent;

/// The kind of transition carried by a result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultKind {
    /// Keep running the current action. Nothing changes.
    #[default]
    Continue,
    /// Replace the current action with a new one in the same slot.
    ChangeTo,
    /// Put the current action on hold and run a new one on top of it.
    SuspendFor,
    /// The current action has finished; resume whatever it buried.
    Done,
    /// Event handlers only: keep doing what I am doing and do not let a
    /// weaker proposal override it.
    Sustain,
}

impl ResultKind {
    /// Returns `true` for kinds that alter the stack.
    #[inline]
    pub fn is_requesting_change(self) -> bool {
        matches!(
            self,
            ResultKind::ChangeTo | ResultKind::SuspendFor | ResultKind::Done
        )
    }

    /// Upper-case label used in logs (`CHANGE_TO`, `DONE`, ...).
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of an event proposal.
///
/// When several event handlers propose transitions for the same action before
/// it is next updated, the highest priority wins.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum EventPriority {
    /// No result. Used for an empty mailbox.
    None,
    /// Use this result or toss it out, either is fine.
    #[default]
    Try,
    /// Try extra hard to use this result.
    Important,
    /// This result must be used.
    Critical,
}

/// Outcome of running an action hook (`on_start`, `update`, `on_resume`, ...).
pub struct ActionResult<A: Agent> {
    pub(crate) kind: ResultKind,
    pub(crate) action: Option<Box<dyn Action<A>>>,
    pub(crate) reason: Option<&'static str>,
}

impl<A: Agent> ActionResult<A> {
    fn new(kind: ResultKind, action: Option<Box<dyn Action<A>>>) -> Self {
        Self {
            kind,
            action,
            reason: None,
        }
    }

    /// Continue executing this action next tick.
    pub fn proceed() -> Self {
        Self::new(ResultKind::Continue, None)
    }

    /// Replace this action with `next`.
    pub fn change_to(next: impl Action<A>) -> Self {
        Self::new(ResultKind::ChangeTo, Some(Box::new(next)))
    }

    /// Replace this action with an already boxed `next`.
    pub fn change_to_boxed(next: Box<dyn Action<A>>) -> Self {
        Self::new(ResultKind::ChangeTo, Some(next))
    }

    /// Put this action on hold and run `next` on top of it.
    pub fn suspend_for(next: impl Action<A>) -> Self {
        Self::new(ResultKind::SuspendFor, Some(Box::new(next)))
    }

    /// Suspend for an already boxed `next`.
    pub fn suspend_for_boxed(next: Box<dyn Action<A>>) -> Self {
        Self::new(ResultKind::SuspendFor, Some(next))
    }

    /// This action is finished.
    pub fn done() -> Self {
        Self::new(ResultKind::Done, None)
    }

    /// Attaches a human-readable reason, reported in transition logs.
    pub fn because(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn reason(&self) -> Option<&'static str> {
        self.reason
    }

    /// Name of the action this result would transition to, if any.
    pub fn target_name(&self) -> Option<&str> {
        self.action.as_deref().map(|a| a.name())
    }

    #[inline]
    pub fn is_continue(&self) -> bool {
        self.kind == ResultKind::Continue
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.kind == ResultKind::Done
    }

    #[inline]
    pub fn is_requesting_change(&self) -> bool {
        self.kind.is_requesting_change()
    }
}

impl<A: Agent> Default for ActionResult<A> {
    fn default() -> Self {
        Self::proceed()
    }
}

impl<A: Agent> fmt::Debug for ActionResult<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionResult")
            .field("kind", &self.kind)
            .field("action", &self.target_name())
            .field("reason", &self.reason)
            .finish()
    }
}

/// A transition proposed by an event handler.
///
/// The proposal may or may not happen, depending on other proposals made for
/// the same action before its next update. See
/// [`PendingEventSlot`](crate::PendingEventSlot) for the merge rules.
pub struct EventDesiredResult<A: Agent> {
    pub(crate) kind: ResultKind,
    pub(crate) action: Option<Box<dyn Action<A>>>,
    pub(crate) reason: Option<&'static str>,
    pub(crate) priority: EventPriority,
}

impl<A: Agent> EventDesiredResult<A> {
    fn new(kind: ResultKind, action: Option<Box<dyn Action<A>>>) -> Self {
        Self {
            kind,
            action,
            reason: None,
            priority: EventPriority::Try,
        }
    }

    /// No opinion: let the event fall through to the action buried below.
    pub fn try_continue() -> Self {
        Self::new(ResultKind::Continue, None)
    }

    pub fn try_change_to(next: impl Action<A>) -> Self {
        Self::new(ResultKind::ChangeTo, Some(Box::new(next)))
    }

    pub fn try_suspend_for(next: impl Action<A>) -> Self {
        Self::new(ResultKind::SuspendFor, Some(Box::new(next)))
    }

    pub fn try_done() -> Self {
        Self::new(ResultKind::Done, None)
    }

    /// Claim the event without requesting a change, so that weaker proposals
    /// arriving later cannot override the current activity.
    pub fn try_sustain() -> Self {
        Self::new(ResultKind::Sustain, None)
    }

    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn because(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }

    /// An empty mailbox value.
    pub(crate) fn vacant() -> Self {
        Self::try_continue().with_priority(EventPriority::None)
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn priority(&self) -> EventPriority {
        self.priority
    }

    pub fn reason(&self) -> Option<&'static str> {
        self.reason
    }

    pub fn target_name(&self) -> Option<&str> {
        self.action.as_deref().map(|a| a.name())
    }

    #[inline]
    pub fn is_continue(&self) -> bool {
        self.kind == ResultKind::Continue
    }

    #[inline]
    pub fn is_requesting_change(&self) -> bool {
        self.kind.is_requesting_change()
    }

    /// Converts an accepted proposal into the result the engine applies.
    pub(crate) fn into_action_result(self) -> ActionResult<A> {
        ActionResult {
            kind: self.kind,
            action: self.action,
            reason: self.reason,
        }
    }
}

impl<A: Agent> Default for EventDesiredResult<A> {
    fn default() -> Self {
        Self::try_continue()
    }
}

impl<A: Agent> fmt::Debug for EventDesiredResult<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDesiredResult")
            .field("kind", &self.kind)
            .field("priority", &self.priority)
            .field("action", &self.target_name())
            .field("reason", &self.reason)
            .finish()
    }
}
