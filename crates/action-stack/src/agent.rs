//! The actor-facing vocabulary of the engine.
//!
//! The engine never interprets the actor it drives. An [`Agent`] only has to
//! provide a stable identity and name the event and query types its actions
//! understand. Everything else (position, health, perception) stays in the
//! host's own types and is reached by actions through `&mut A`.

use std::fmt;

/// An actor whose behavior is driven by a [`BehaviorRoot`](crate::BehaviorRoot).
pub trait Agent: 'static {
    /// Identity of the actor, used to detect when a behavior is driven by a
    /// different (or recreated) actor.
    type Id: Copy + Eq + fmt::Debug;

    /// Events the world delivers to this actor's behavior.
    type Event: Event;

    /// Read-only questions the host asks this actor's behavior.
    type Query: Query;

    fn id(&self) -> Self::Id;
}

/// A named event with its arguments.
///
/// Implement this on an enum with one variant per event kind, e.g.
/// `Injured { amount }`, `Sight(target)`, `CommandApproach(pos)`.
pub trait Event {
    /// Stable name for diagnostics.
    fn name(&self) -> &'static str;
}

/// A named contextual query whose answer type carries an "undefined"
/// sentinel meaning "this action has no opinion".
pub trait Query {
    type Answer: Answer;

    fn name(&self) -> &'static str;
}

/// An answer to a [`Query`] with a distinguished undefined value.
pub trait Answer {
    fn undefined() -> Self;

    fn is_undefined(&self) -> bool;
}

/// Tri-state answer for yes/no questions ("should I hurry?").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Verdict {
    No,
    Yes,
    #[default]
    Undefined,
}

impl Verdict {
    /// `true` only for [`Verdict::Yes`].
    #[inline]
    pub fn is_yes(self) -> bool {
        matches!(self, Verdict::Yes)
    }

    #[inline]
    pub fn is_no(self) -> bool {
        matches!(self, Verdict::No)
    }
}

impl From<bool> for Verdict {
    fn from(value: bool) -> Self {
        if value { Verdict::Yes } else { Verdict::No }
    }
}

impl Answer for Verdict {
    fn undefined() -> Self {
        Verdict::Undefined
    }

    fn is_undefined(&self) -> bool {
        matches!(self, Verdict::Undefined)
    }
}

/// Value-returning queries ("which point should I aim at?") use `None` as
/// the undefined answer.
impl<T> Answer for Option<T> {
    fn undefined() -> Self {
        None
    }

    fn is_undefined(&self) -> bool {
        self.is_none()
    }
}

/// Event type for agents that receive no events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoEvent {}

impl Event for NoEvent {
    fn name(&self) -> &'static str {
        match *self {}
    }
}

/// Query type for agents that are never queried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoQuery {}

impl Query for NoQuery {
    type Answer = Verdict;

    fn name(&self) -> &'static str {
        match *self {}
    }
}
