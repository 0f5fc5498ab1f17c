//! Guard actions.
//!
//! ```text
//! Patrol( MoveTo | Wait )        routine, interrupted by
//!   Investigate                  a sound
//!   Attack -> Retreat            an enemy in sight, until badly hurt
//! Dead                           replaces everything once killed
//! ```

use action_stack::{Action, ActionResult, EventDesiredResult, EventPriority, Verdict};
use tracing::info;

use crate::npc::{Npc, NpcEvent, NpcQuery, RETREAT_HEALTH};

/// Walks the waypoint route forever.
pub struct Patrol;

impl Action<Npc> for Patrol {
    fn name(&self) -> &str {
        "Patrol"
    }

    fn initial_child(&mut self, npc: &mut Npc) -> Option<Box<dyn Action<Npc>>> {
        Some(Box::new(MoveTo {
            goal: npc.take_waypoint(),
        }))
    }

    fn on_resume(&mut self, npc: &mut Npc, interruptor: Option<&dyn Action<Npc>>) -> ActionResult<Npc> {
        info!(
            after = interruptor.map_or("pause", |a| a.name()),
            position = npc.position,
            "back on patrol"
        );
        ActionResult::proceed()
    }

    fn on_event(&mut self, _npc: &mut Npc, event: &NpcEvent) -> EventDesiredResult<Npc> {
        match *event {
            NpcEvent::Sight { target } => {
                EventDesiredResult::try_suspend_for(Attack { target, swings: 0 })
                    .with_priority(EventPriority::Important)
                    .because("enemy in sight")
            }
            NpcEvent::Sound { at } => {
                EventDesiredResult::try_suspend_for(Investigate { at }).because("heard something")
            }
            NpcEvent::Killed => EventDesiredResult::try_change_to(Dead)
                .with_priority(EventPriority::Critical)
                .because("killed"),
            _ => EventDesiredResult::try_continue(),
        }
    }

    fn query(&self, _npc: &Npc, query: &NpcQuery) -> Verdict {
        match query {
            NpcQuery::ShouldHurry => Verdict::No,
            NpcQuery::ShouldRetreat => Verdict::Undefined,
        }
    }
}

struct MoveTo {
    goal: f32,
}

impl Action<Npc> for MoveTo {
    fn name(&self) -> &str {
        "MoveTo"
    }

    fn update(&mut self, npc: &mut Npc, interval: f32) -> ActionResult<Npc> {
        if npc.step_toward(self.goal, interval) {
            ActionResult::change_to(Wait { remaining: 1.0 }).because("reached waypoint")
        } else {
            ActionResult::proceed()
        }
    }
}

struct Wait {
    remaining: f32,
}

impl Action<Npc> for Wait {
    fn name(&self) -> &str {
        "Wait"
    }

    fn update(&mut self, npc: &mut Npc, interval: f32) -> ActionResult<Npc> {
        self.remaining -= interval;
        if self.remaining > 0.0 {
            return ActionResult::proceed();
        }
        ActionResult::change_to(MoveTo {
            goal: npc.take_waypoint(),
        })
        .because("done looking around")
    }
}

/// Walks to a noise, then returns to whatever it interrupted.
struct Investigate {
    at: f32,
}

impl Action<Npc> for Investigate {
    fn name(&self) -> &str {
        "Investigate"
    }

    fn update(&mut self, npc: &mut Npc, interval: f32) -> ActionResult<Npc> {
        if npc.step_toward(self.at, interval) {
            ActionResult::done().because("nothing here")
        } else {
            ActionResult::proceed()
        }
    }

    fn on_suspend(&mut self, _npc: &mut Npc, _interruptor: Option<&dyn Action<Npc>>) -> ActionResult<Npc> {
        ActionResult::done().because("no longer curious")
    }
}

struct Attack {
    target: u32,
    swings: u32,
}

impl Action<Npc> for Attack {
    fn name(&self) -> &str {
        "Attack"
    }

    fn on_start(&mut self, npc: &mut Npc, _prior: Option<&dyn Action<Npc>>) -> ActionResult<Npc> {
        npc.target = Some(self.target);
        ActionResult::proceed()
    }

    fn update(&mut self, _npc: &mut Npc, _interval: f32) -> ActionResult<Npc> {
        self.swings += 1;
        if self.swings < 8 {
            ActionResult::proceed()
        } else {
            ActionResult::done().because("target defeated")
        }
    }

    fn on_end(&mut self, npc: &mut Npc, _next: Option<&dyn Action<Npc>>) {
        info!(target = self.target, swings = self.swings, "combat over");
        npc.target = None;
    }

    fn on_event(&mut self, npc: &mut Npc, event: &NpcEvent) -> EventDesiredResult<Npc> {
        match *event {
            NpcEvent::LostSight => EventDesiredResult::try_done().because("target gone"),
            NpcEvent::Injured { .. } if npc.health < RETREAT_HEALTH => {
                EventDesiredResult::try_change_to(Retreat { from: npc.position })
                    .with_priority(EventPriority::Important)
                    .because("too hurt to fight")
            }
            // Already busy with this fight; a sound is not worth dropping it.
            NpcEvent::Sight { .. } | NpcEvent::Sound { .. } => EventDesiredResult::try_sustain(),
            _ => EventDesiredResult::try_continue(),
        }
    }

    fn query(&self, _npc: &Npc, query: &NpcQuery) -> Verdict {
        match query {
            NpcQuery::ShouldHurry => Verdict::Yes,
            NpcQuery::ShouldRetreat => Verdict::No,
        }
    }
}

struct Retreat {
    from: f32,
}

impl Action<Npc> for Retreat {
    fn name(&self) -> &str {
        "Retreat"
    }

    fn update(&mut self, npc: &mut Npc, interval: f32) -> ActionResult<Npc> {
        if npc.step_toward(self.from - 5.0, interval) {
            ActionResult::done().because("out of reach")
        } else {
            ActionResult::proceed()
        }
    }

    fn query(&self, _npc: &Npc, query: &NpcQuery) -> Verdict {
        match query {
            NpcQuery::ShouldHurry | NpcQuery::ShouldRetreat => Verdict::Yes,
        }
    }
}

struct Dead;

impl Action<Npc> for Dead {
    fn name(&self) -> &str {
        "Dead"
    }

    fn on_start(&mut self, npc: &mut Npc, prior: Option<&dyn Action<Npc>>) -> ActionResult<Npc> {
        info!(
            was = prior.map_or("-", |a| a.name()),
            position = npc.position,
            "guard is down"
        );
        ActionResult::done()
    }
}
