//! The guard NPC and the vocabulary its behavior understands.

use action_stack::{Agent, Event, Query, Verdict};

/// Walking speed in units per second.
pub const SPEED: f32 = 2.0;

/// Health below which the guard stops fighting.
pub const RETREAT_HEALTH: i32 = 30;

#[derive(Debug)]
pub struct Npc {
    pub id: u32,
    pub health: i32,
    pub position: f32,
    pub waypoints: Vec<f32>,
    pub next_waypoint: usize,
    /// Entity currently being fought, if any.
    pub target: Option<u32>,
}

impl Npc {
    pub fn guard(id: u32) -> Self {
        Self {
            id,
            health: 100,
            position: 0.0,
            waypoints: vec![0.0, 6.0, 10.0, 4.0],
            next_waypoint: 1,
            target: None,
        }
    }

    /// Returns the next patrol waypoint and advances the route.
    ///
    /// A guard without a route holds its current position.
    pub fn take_waypoint(&mut self) -> f32 {
        let len = self.waypoints.len();
        if len == 0 {
            return self.position;
        }
        let goal = self.waypoints[self.next_waypoint % len];
        self.next_waypoint = (self.next_waypoint + 1) % len;
        goal
    }

    /// Moves toward `goal`; returns `true` once there.
    pub fn step_toward(&mut self, goal: f32, interval: f32) -> bool {
        let max_step = SPEED * interval;
        let delta = goal - self.position;
        if delta.abs() <= max_step {
            self.position = goal;
            true
        } else {
            self.position += max_step * delta.signum();
            false
        }
    }
}

impl Agent for Npc {
    type Id = u32;
    type Event = NpcEvent;
    type Query = NpcQuery;

    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Clone, Copy, Debug, PartialEq, strum::IntoStaticStr)]
pub enum NpcEvent {
    Sight { target: u32 },
    LostSight,
    Sound { at: f32 },
    Injured { amount: i32 },
    Killed,
}

impl Event for NpcEvent {
    fn name(&self) -> &'static str {
        self.into()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
pub enum NpcQuery {
    ShouldHurry,
    ShouldRetreat,
}

impl Query for NpcQuery {
    type Answer = Verdict;

    fn name(&self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_wraps_around() {
        let mut npc = Npc::guard(1);
        let goals: Vec<f32> = (0..5).map(|_| npc.take_waypoint()).collect();
        assert_eq!(goals, [6.0, 10.0, 4.0, 0.0, 6.0]);
    }

    #[test]
    fn guard_without_route_stays_put() {
        let mut npc = Npc::guard(1);
        npc.waypoints.clear();
        npc.position = 3.5;

        assert_eq!(npc.take_waypoint(), 3.5);
        assert_eq!(npc.take_waypoint(), 3.5);
    }
}
