//! Single-slot mailbox for deferred event transitions.
//!
//! Event handlers cannot transition immediately: they may run in the middle
//! of another action's update, deep inside the stack, or several times per
//! tick. Instead each action owns one [`PendingEventSlot`] that keeps the
//! strongest proposal received since the slot was last consumed. The next
//! update turns it into a real transition.

use tracing::trace;

use crate::agent::Agent;
use crate::result::{ActionResult, EventDesiredResult, EventPriority, ResultKind};

/// Outcome of offering a proposal to a [`PendingEventSlot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The proposal was a `Continue` and there was nothing to store.
    Ignored,
    /// The proposal replaced whatever the slot held.
    Stored,
    /// The slot kept its current content; the proposal was dropped.
    Rejected,
}

/// Mailbox holding at most one undelivered transition request.
///
/// [`PendingEventSlot::store`] is the only way to write the slot; the merge
/// rules are:
///
/// - `Continue` proposals are dropped without comparison.
/// - A proposal with strictly higher priority replaces the stored one.
/// - A proposal with equal priority replaces a stored `Sustain`.
/// - Otherwise the proposal is rejected.
///
/// Any action carried by a displaced or rejected proposal is dropped on the
/// spot, so proposals never leak.
pub struct PendingEventSlot<A: Agent> {
    result: EventDesiredResult<A>,
}

impl<A: Agent> PendingEventSlot<A> {
    pub fn new() -> Self {
        Self {
            result: EventDesiredResult::vacant(),
        }
    }

    /// Offers `proposal`, produced while handling `event`, to the slot.
    pub fn store(&mut self, proposal: EventDesiredResult<A>, event: &str) -> MergeOutcome {
        if proposal.is_continue() {
            return MergeOutcome::Ignored;
        }

        let held = &self.result;
        let replace = proposal.priority > held.priority
            || (proposal.priority == held.priority && held.kind == ResultKind::Sustain);

        if replace {
            trace!(
                event,
                kind = %proposal.kind,
                priority = ?proposal.priority,
                displaced = %held.kind,
                "pending event stored"
            );
            // Assigning drops the displaced proposal and its action.
            self.result = proposal;
            MergeOutcome::Stored
        } else {
            trace!(
                event,
                kind = %proposal.kind,
                priority = ?proposal.priority,
                held = %held.kind,
                held_priority = ?held.priority,
                "pending event rejected"
            );
            drop(proposal);
            MergeOutcome::Rejected
        }
    }

    pub fn kind(&self) -> ResultKind {
        self.result.kind
    }

    pub fn priority(&self) -> EventPriority {
        self.result.priority
    }

    /// Name of the action waiting in the slot, if any.
    pub fn target_name(&self) -> Option<&str> {
        self.result.target_name()
    }

    pub fn is_requesting_change(&self) -> bool {
        self.result.is_requesting_change()
    }

    /// Empties the slot and returns its content as a transition to apply.
    pub(crate) fn take(&mut self) -> ActionResult<A> {
        std::mem::replace(&mut self.result, EventDesiredResult::vacant()).into_action_result()
    }

    /// Empties the slot, dropping any proposal it held.
    pub(crate) fn clear(&mut self) {
        self.result = EventDesiredResult::vacant();
    }
}

impl<A: Agent> Default for PendingEventSlot<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Agent> std::fmt::Debug for PendingEventSlot<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PendingEventSlot").field(&self.result).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::action::Action;
    use crate::testing::{Dummy, Idle};

    /// Counts how many instances have been dropped.
    struct Tracked {
        drops: Rc<Cell<u32>>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    impl Action<Dummy> for Tracked {
        fn name(&self) -> &str {
            "tracked"
        }
    }

    fn tracked(drops: &Rc<Cell<u32>>) -> Tracked {
        Tracked {
            drops: Rc::clone(drops),
        }
    }

    #[test]
    fn continue_is_never_stored() {
        let mut slot = PendingEventSlot::<Dummy>::new();
        let outcome = slot.store(
            EventDesiredResult::try_continue().with_priority(EventPriority::Critical),
            "test",
        );
        assert_eq!(outcome, MergeOutcome::Ignored);
        assert_eq!(slot.priority(), EventPriority::None);
    }

    #[test]
    fn higher_priority_replaces_and_drops_displaced_action() {
        let drops = Rc::new(Cell::new(0));
        let mut slot = PendingEventSlot::<Dummy>::new();

        slot.store(EventDesiredResult::try_change_to(tracked(&drops)), "sight");
        assert_eq!(drops.get(), 0);

        let outcome = slot.store(
            EventDesiredResult::try_suspend_for(Idle("flee")).with_priority(EventPriority::Critical),
            "injured",
        );
        assert_eq!(outcome, MergeOutcome::Stored);
        assert_eq!(drops.get(), 1);
        assert_eq!(slot.kind(), ResultKind::SuspendFor);
        assert_eq!(slot.target_name(), Some("flee"));
    }

    #[test]
    fn weaker_proposal_is_rejected_and_dropped() {
        let drops = Rc::new(Cell::new(0));
        let mut slot = PendingEventSlot::<Dummy>::new();
        slot.store(
            EventDesiredResult::try_done().with_priority(EventPriority::Critical),
            "killed",
        );

        let outcome = slot.store(EventDesiredResult::try_change_to(tracked(&drops)), "sound");
        assert_eq!(outcome, MergeOutcome::Rejected);
        assert_eq!(drops.get(), 1);
        assert_eq!(slot.kind(), ResultKind::Done);
        assert_eq!(slot.priority(), EventPriority::Critical);
    }

    #[test]
    fn equal_priority_overrides_only_sustain() {
        let mut slot = PendingEventSlot::<Dummy>::new();
        slot.store(EventDesiredResult::try_sustain(), "contact");

        let outcome = slot.store(EventDesiredResult::try_change_to(Idle("dodge")), "shoved");
        assert_eq!(outcome, MergeOutcome::Stored);
        assert_eq!(slot.kind(), ResultKind::ChangeTo);

        let outcome = slot.store(EventDesiredResult::try_done(), "stuck");
        assert_eq!(outcome, MergeOutcome::Rejected);
        assert_eq!(slot.target_name(), Some("dodge"));
    }

    #[test]
    fn take_empties_the_slot() {
        let mut slot = PendingEventSlot::<Dummy>::new();
        slot.store(EventDesiredResult::try_change_to(Idle("chase")), "sight");

        let result = slot.take();
        assert_eq!(result.kind(), ResultKind::ChangeTo);
        assert_eq!(result.target_name(), Some("chase"));
        assert!(!slot.is_requesting_change());
        assert_eq!(slot.priority(), EventPriority::None);
    }
}
