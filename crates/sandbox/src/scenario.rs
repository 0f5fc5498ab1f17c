//! Scripted world events fed to the guard.

use crate::npc::{Npc, NpcEvent};

/// Events to deliver, keyed by the tick they fire on.
pub struct Scenario {
    script: Vec<(u32, NpcEvent)>,
}

impl Scenario {
    /// A noise, a fight the guard wins, then a second fight it loses.
    pub fn encounter() -> Self {
        Self {
            script: vec![
                (6, NpcEvent::Sound { at: 3.0 }),
                (24, NpcEvent::Sight { target: 7 }),
                (28, NpcEvent::Injured { amount: 25 }),
                (31, NpcEvent::Sound { at: 9.0 }),
                (46, NpcEvent::Sight { target: 8 }),
                (48, NpcEvent::Injured { amount: 35 }),
                (50, NpcEvent::Injured { amount: 20 }),
                (58, NpcEvent::Killed),
            ],
        }
    }

    pub fn events_at(&self, tick: u32) -> impl Iterator<Item = NpcEvent> + '_ {
        self.script
            .iter()
            .filter(move |(at, _)| *at == tick)
            .map(|(_, event)| *event)
    }

    /// Applies an event's direct effect on the world before the behavior
    /// sees it.
    pub fn apply(npc: &mut Npc, event: &NpcEvent) {
        if let NpcEvent::Injured { amount } = *event {
            npc.health = (npc.health - amount).max(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_fire_on_their_tick() {
        let scenario = Scenario::encounter();
        assert_eq!(scenario.events_at(6).count(), 1);
        assert_eq!(scenario.events_at(7).count(), 0);
    }

    #[test]
    fn injuries_reduce_health_without_going_negative() {
        let mut npc = Npc::guard(1);
        Scenario::apply(&mut npc, &NpcEvent::Injured { amount: 150 });
        assert_eq!(npc.health, 0);
    }
}
