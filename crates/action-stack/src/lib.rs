//! Interruptible, hierarchical action stacks for real-time agents.
//!
//! An actor's behavior is a stack of [`Action`]s owned by a [`BehaviorRoot`].
//! Each action can *contain* a child action representing the detail of its
//! current work, and can be *suspended* by a new action stacked on top of it,
//! resuming when that action is done. All changes happen through returned
//! results, never by mutating the stack from inside a hook.
//!
//! - **Result-driven**: hooks return an [`ActionResult`]; the engine applies
//!   it once the hook has returned
//! - **Deferred events**: event handlers propose an [`EventDesiredResult`]
//!   that competes by [`EventPriority`] in a [`PendingEventSlot`] until the
//!   next update
//! - **Owned stack**: every action instance lives in the root's arena and is
//!   freed exactly once
//!
//! # Architecture
//!
//! - [`Agent`]: the actor type, with its [`Event`] and [`Query`] vocabulary
//! - [`Action`]: hooks for start, update, suspend, resume, end, events and
//!   queries
//! - [`BehaviorRoot`]: owns the stack and drives it each tick
//! - [`BehaviorConfig`]: naming, logging and [`ActorBinding`] policy

pub mod action;
pub mod agent;
pub mod arena;
pub mod behavior;
pub mod config;
pub mod error;
pub mod node;
pub mod pending;
pub mod result;

mod dispatch;
mod transition;

pub use action::{Action, AnswerOf};
pub use agent::{Agent, Answer, Event, NoEvent, NoQuery, Query, Verdict};
pub use arena::NodeId;
pub use behavior::BehaviorRoot;
pub use config::{ActorBinding, BehaviorConfig, MAX_NAME_LEN};
pub use error::{ConfigError, Result};
pub use node::NodeInfo;
pub use pending::{MergeOutcome, PendingEventSlot};
pub use result::{ActionResult, EventDesiredResult, EventPriority, ResultKind};

/// Minimal agent and actions shared by the unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use crate::action::Action;
    use crate::agent::{Agent, NoEvent, NoQuery};

    pub struct Dummy;

    impl Agent for Dummy {
        type Id = u8;
        type Event = NoEvent;
        type Query = NoQuery;

        fn id(&self) -> u8 {
            0
        }
    }

    /// An action that does nothing but carry a name.
    pub struct Idle(pub &'static str);

    impl Action<Dummy> for Idle {
        fn name(&self) -> &str {
            self.0
        }
    }
}
