//! Query resolution order: innermost first, buried before containing.

mod common;

use action_stack::{ActionResult, BehaviorConfig, BehaviorRoot};
use common::{Guard, GuardQuery, Probe, behavior, tick};

#[test]
fn innermost_action_answers_first() {
    let mut guard = Guard::new(1);
    let mut behavior = behavior(
        Probe::new("Patrol")
            .answers(GuardQuery::Target, "patrol")
            .contains(Probe::new("MoveTo").answers(GuardQuery::Target, "move")),
    );
    tick(&mut behavior, &mut guard, 1);

    assert_eq!(behavior.query(&guard, &GuardQuery::Target), Some("move"));
}

#[test]
fn undefined_answer_defers_to_the_container() {
    let mut guard = Guard::new(1);
    let mut behavior = behavior(
        Probe::new("Patrol")
            .answers(GuardQuery::Target, "patrol")
            .contains(Probe::new("MoveTo").answers(GuardQuery::ShouldHurry, "hurry")),
    );
    tick(&mut behavior, &mut guard, 1);

    assert_eq!(behavior.query(&guard, &GuardQuery::Target), Some("patrol"));
    assert_eq!(behavior.query(&guard, &GuardQuery::ShouldHurry), Some("hurry"));
}

#[test]
fn buried_actions_answer_before_the_container() {
    let mut guard = Guard::new(1);
    let mut behavior = behavior(
        Probe::new("Patrol")
            .answers(GuardQuery::Target, "patrol")
            .contains(
                Probe::new("MoveTo")
                    .answers(GuardQuery::Target, "move")
                    .then(|| ActionResult::suspend_for(Probe::new("Dodge"))),
            ),
    );
    tick(&mut behavior, &mut guard, 2);
    assert_eq!(behavior.debug_string(), "Patrol( Dodge<<MoveTo )");

    assert_eq!(behavior.query(&guard, &GuardQuery::Target), Some("move"));
}

#[test]
fn top_level_buried_actions_are_consulted() {
    let mut guard = Guard::new(1);
    let mut behavior = behavior(
        Probe::new("Patrol")
            .answers(GuardQuery::Target, "patrol")
            .then(|| {
                ActionResult::suspend_for(
                    Probe::new("Attack").answers(GuardQuery::ShouldHurry, "charge"),
                )
            }),
    );
    tick(&mut behavior, &mut guard, 2);

    assert_eq!(behavior.query(&guard, &GuardQuery::ShouldHurry), Some("charge"));
    assert_eq!(behavior.query(&guard, &GuardQuery::Target), Some("patrol"));
}

#[test]
fn unanswered_query_is_undefined() {
    let mut guard = Guard::new(1);
    let mut behavior = behavior(Probe::new("Patrol").contains(Probe::new("MoveTo")));
    tick(&mut behavior, &mut guard, 1);
    assert_eq!(behavior.query(&guard, &GuardQuery::Target), None);

    let empty = BehaviorRoot::<Guard>::empty(BehaviorConfig::default());
    assert_eq!(empty.query(&guard, &GuardQuery::Target), None);
}

#[test]
fn scan_climbs_from_the_leaf_through_the_top_level_stack() {
    let mut guard = Guard::new(1);
    let mut behavior = behavior(
        Probe::new("Patrol")
            .answers(GuardQuery::Target, "patrol")
            .then(|| ActionResult::suspend_for(Probe::new("Attack").contains(Probe::new("Aim")))),
    );
    tick(&mut behavior, &mut guard, 2);
    assert_eq!(behavior.debug_string(), "Attack( Aim )<<Patrol");

    assert_eq!(behavior.query(&guard, &GuardQuery::Target), Some("patrol"));
}
