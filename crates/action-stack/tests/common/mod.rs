//! Shared fixtures: a guard actor that records every hook call, and a
//! scriptable probe action.
#![allow(dead_code)]

use std::collections::VecDeque;

use action_stack::{
    Action, ActionResult, Agent, BehaviorConfig, BehaviorRoot, Event, EventDesiredResult, Query,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
pub enum GuardEvent {
    Sight,
    Sound,
    Injured,
    Killed,
}

impl Event for GuardEvent {
    fn name(&self) -> &'static str {
        self.into()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
pub enum GuardQuery {
    Target,
    ShouldHurry,
}

impl Query for GuardQuery {
    type Answer = Option<&'static str>;

    fn name(&self) -> &'static str {
        self.into()
    }
}

/// Actor whose log receives one entry per hook call, e.g.
/// `Attack.start(Patrol)` or `Patrol.update`.
#[derive(Debug, Default)]
pub struct Guard {
    pub id: u32,
    pub log: Vec<String>,
}

impl Guard {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            log: Vec::new(),
        }
    }

    /// Returns the log recorded so far and starts a fresh one.
    pub fn take_log(&mut self) -> Vec<String> {
        std::mem::take(&mut self.log)
    }

    fn record(&mut self, entry: String) {
        self.log.push(entry);
    }
}

impl Agent for Guard {
    type Id = u32;
    type Event = GuardEvent;
    type Query = GuardQuery;

    fn id(&self) -> u32 {
        self.id
    }
}

pub type Script = Box<dyn FnOnce() -> ActionResult<Guard>>;
pub type Reply = Box<dyn FnMut() -> EventDesiredResult<Guard>>;

/// Action driven by a script of results.
///
/// Each `update` pops the next scripted result, continuing once the script
/// runs out.
pub struct Probe {
    name: &'static str,
    on_start: Option<Script>,
    updates: VecDeque<Script>,
    on_suspend: Option<Script>,
    child: Option<Box<dyn Action<Guard>>>,
    replies: Vec<(GuardEvent, Reply)>,
    answers: Vec<(GuardQuery, &'static str)>,
}

impl Probe {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            on_start: None,
            updates: VecDeque::new(),
            on_suspend: None,
            child: None,
            replies: Vec::new(),
            answers: Vec::new(),
        }
    }

    pub fn starts_with(mut self, result: impl FnOnce() -> ActionResult<Guard> + 'static) -> Self {
        self.on_start = Some(Box::new(result));
        self
    }

    /// Appends one update result to the script.
    pub fn then(mut self, result: impl FnOnce() -> ActionResult<Guard> + 'static) -> Self {
        self.updates.push_back(Box::new(result));
        self
    }

    /// Skips one update.
    pub fn idle(self) -> Self {
        self.then(ActionResult::proceed)
    }

    /// Finish instead of being buried.
    pub fn refuses_suspension(mut self) -> Self {
        self.on_suspend = Some(Box::new(|| ActionResult::done().because("refused")));
        self
    }

    pub fn contains(mut self, child: impl Action<Guard>) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    pub fn on(
        mut self,
        event: GuardEvent,
        reply: impl FnMut() -> EventDesiredResult<Guard> + 'static,
    ) -> Self {
        self.replies.push((event, Box::new(reply)));
        self
    }

    pub fn answers(mut self, query: GuardQuery, answer: &'static str) -> Self {
        self.answers.push((query, answer));
        self
    }
}

fn peer(action: Option<&dyn Action<Guard>>) -> &str {
    action.map_or("-", |a| a.name())
}

impl Action<Guard> for Probe {
    fn name(&self) -> &str {
        self.name
    }

    fn on_start(&mut self, guard: &mut Guard, prior: Option<&dyn Action<Guard>>) -> ActionResult<Guard> {
        guard.record(format!("{}.start({})", self.name, peer(prior)));
        self.on_start.take().map_or_else(ActionResult::proceed, |f| f())
    }

    fn initial_child(&mut self, _guard: &mut Guard) -> Option<Box<dyn Action<Guard>>> {
        self.child.take()
    }

    fn update(&mut self, guard: &mut Guard, _interval: f32) -> ActionResult<Guard> {
        guard.record(format!("{}.update", self.name));
        self.updates
            .pop_front()
            .map_or_else(ActionResult::proceed, |f| f())
    }

    fn on_suspend(
        &mut self,
        guard: &mut Guard,
        interruptor: Option<&dyn Action<Guard>>,
    ) -> ActionResult<Guard> {
        guard.record(format!("{}.suspend({})", self.name, peer(interruptor)));
        self.on_suspend
            .take()
            .map_or_else(ActionResult::proceed, |f| f())
    }

    fn on_resume(
        &mut self,
        guard: &mut Guard,
        interruptor: Option<&dyn Action<Guard>>,
    ) -> ActionResult<Guard> {
        guard.record(format!("{}.resume({})", self.name, peer(interruptor)));
        ActionResult::proceed()
    }

    fn on_end(&mut self, guard: &mut Guard, next: Option<&dyn Action<Guard>>) {
        guard.record(format!("{}.end({})", self.name, peer(next)));
    }

    fn on_event(&mut self, guard: &mut Guard, event: &GuardEvent) -> EventDesiredResult<Guard> {
        guard.record(format!("{}.event({})", self.name, event.name()));
        self.replies
            .iter_mut()
            .find(|(kind, _)| kind == event)
            .map_or_else(EventDesiredResult::try_continue, |(_, reply)| reply())
    }

    fn query(&self, _guard: &Guard, query: &GuardQuery) -> Option<&'static str> {
        self.answers
            .iter()
            .find(|(kind, _)| kind == query)
            .map(|(_, answer)| *answer)
    }
}

pub fn behavior(initial: impl Action<Guard>) -> BehaviorRoot<Guard> {
    BehaviorRoot::new(initial, BehaviorConfig::named("test"))
}

/// Runs `ticks` updates and returns what was logged during them.
pub fn tick(behavior: &mut BehaviorRoot<Guard>, guard: &mut Guard, ticks: usize) -> Vec<String> {
    guard.log.clear();
    for _ in 0..ticks {
        behavior.update(guard, 0.1);
    }
    guard.take_log()
}
