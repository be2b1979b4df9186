// tests/scheduler_scenarios.rs

use critpath::dag::{analyze, compute_schedule, Durations, ScheduleResult, TaskGraph, TaskRecord};
use critpath::errors::CritpathError;
use critpath_test_utils::builders::chain;
use critpath_test_utils::init_tracing;

fn result(es: i64, ef: i64, ls: i64, lf: i64, slack: i64) -> ScheduleResult {
    ScheduleResult {
        earliest_start: es,
        earliest_finish: ef,
        latest_start: ls,
        latest_finish: lf,
        slack,
    }
}

#[test]
fn single_chain_is_fully_critical() {
    init_tracing();

    let (graph, schedule) = analyze(&chain(&[2, 3, 1]), 0).unwrap();

    assert_eq!(schedule.get(1), Some(&result(0, 2, 0, 2, 0)));
    assert_eq!(schedule.get(2), Some(&result(2, 5, 2, 5, 0)));
    assert_eq!(schedule.get(3), Some(&result(5, 6, 5, 6, 0)));
    assert_eq!(schedule.project_finish(), 6);
    assert_eq!(schedule.duration(), 6);
    assert_eq!(schedule.critical_tasks(), vec![1, 2, 3]);
    assert_eq!(schedule.critical_path(&graph), vec![1, 2, 3]);
}

#[test]
fn parallel_task_gets_slack_up_to_project_finish() {
    let mut tasks = chain(&[2, 3, 1]);
    tasks.push(TaskRecord::new(4, 1));

    let (graph, schedule) = analyze(&tasks, 0).unwrap();

    let task4 = schedule.get(4).unwrap();
    assert_eq!(task4, &result(0, 1, 5, 6, 5));
    assert!(!task4.is_critical());

    for id in [1, 2, 3] {
        assert_eq!(schedule.get(id).unwrap().slack, 0, "task {id} should stay critical");
    }
    assert_eq!(schedule.project_finish(), 6);
    assert_eq!(schedule.critical_tasks(), vec![1, 2, 3]);
    assert_eq!(schedule.critical_path(&graph), vec![1, 2, 3]);
}

#[test]
fn diamond_uses_latest_predecessor_and_earliest_successor() {
    let tasks = vec![
        TaskRecord::new(1, 2),
        TaskRecord::new(2, 4).after(1),
        TaskRecord::new(3, 1).after(1),
        TaskRecord::new(4, 3).after(2).after(3),
    ];

    let (graph, schedule) = analyze(&tasks, 0).unwrap();

    assert_eq!(schedule.get(1), Some(&result(0, 2, 0, 2, 0)));
    assert_eq!(schedule.get(2), Some(&result(2, 6, 2, 6, 0)));
    assert_eq!(schedule.get(3), Some(&result(2, 3, 5, 6, 3)));
    assert_eq!(schedule.get(4), Some(&result(6, 9, 6, 9, 0)));
    assert_eq!(schedule.critical_path(&graph), vec![1, 2, 4]);
}

#[test]
fn equal_branches_resolve_to_smallest_ids() {
    // Two roots of equal length feeding one sink: both are critical.
    let tasks = vec![
        TaskRecord::new(2, 3),
        TaskRecord::new(1, 3),
        TaskRecord::new(3, 2).after(1).after(2),
    ];

    let (graph, schedule) = analyze(&tasks, 0).unwrap();

    assert_eq!(schedule.critical_tasks(), vec![1, 2, 3]);
    assert_eq!(schedule.critical_path(&graph), vec![1, 3]);
}

#[test]
fn shorter_disjoint_chain_is_not_on_the_critical_path() {
    let tasks = vec![
        TaskRecord::new(1, 1),
        TaskRecord::new(2, 1).after(1),
        TaskRecord::new(10, 5),
        TaskRecord::new(11, 2).after(10),
    ];

    let (graph, schedule) = analyze(&tasks, 0).unwrap();

    assert_eq!(schedule.project_finish(), 7);
    assert_eq!(schedule.get(1).unwrap().slack, 5);
    assert_eq!(schedule.get(2).unwrap().slack, 5);
    assert_eq!(schedule.critical_path(&graph), vec![10, 11]);
}

#[test]
fn isolated_task_is_measured_against_global_finish() {
    let tasks = vec![TaskRecord::new(1, 10), TaskRecord::new(2, 4)];

    let (_, schedule) = analyze(&tasks, 0).unwrap();

    assert_eq!(schedule.get(2), Some(&result(0, 4, 6, 10, 6)));
    assert_eq!(schedule.get(1).unwrap().slack, 0);
}

#[test]
fn project_start_shifts_every_value() {
    let (_, at_zero) = analyze(&chain(&[2, 3]), 0).unwrap();
    let (_, at_hundred) = analyze(&chain(&[2, 3]), 100).unwrap();

    assert_eq!(at_hundred.project_start(), 100);
    assert_eq!(at_hundred.project_finish(), 105);
    for (id, r) in at_zero.iter() {
        let shifted = at_hundred.get(id).unwrap();
        assert_eq!(shifted.earliest_start, r.earliest_start + 100);
        assert_eq!(shifted.latest_finish, r.latest_finish + 100);
        assert_eq!(shifted.slack, r.slack);
    }
}

#[test]
fn empty_project_yields_empty_schedule() {
    let (graph, schedule) = analyze(&[], 3).unwrap();

    assert!(schedule.is_empty());
    assert_eq!(schedule.project_finish(), 3);
    assert!(schedule.critical_path(&graph).is_empty());
}

#[test]
fn alternative_durations_can_be_supplied() {
    let graph = TaskGraph::build(&chain(&[2, 3, 1])).unwrap();
    let mut what_if: Durations = graph.durations().clone();
    what_if.insert(2, 10);

    let schedule = compute_schedule(&graph, &what_if, 0).unwrap();

    assert_eq!(schedule.project_finish(), 13);
    assert_eq!(schedule.get(3).unwrap().earliest_start, 12);
}

#[test]
fn missing_duration_is_an_invariant_violation() {
    let graph = TaskGraph::build(&chain(&[2, 3, 1])).unwrap();
    let mut durations = graph.durations().clone();
    durations.remove(&2);

    match compute_schedule(&graph, &durations, 0) {
        Err(CritpathError::InvariantViolation(msg)) => assert!(msg.contains("task 2")),
        other => panic!("Expected InvariantViolation, got: {:?}", other),
    }
}

#[test]
fn zero_duration_is_an_invariant_violation() {
    let graph = TaskGraph::build(&chain(&[2, 3])).unwrap();
    let mut durations = graph.durations().clone();
    durations.insert(1, 0);

    assert!(matches!(
        compute_schedule(&graph, &durations, 0),
        Err(CritpathError::InvariantViolation(_))
    ));
}

#[test]
fn cyclic_input_produces_no_schedule() {
    let tasks = vec![TaskRecord::new(1, 1).after(2), TaskRecord::new(2, 1).after(1)];

    assert!(matches!(
        analyze(&tasks, 0),
        Err(CritpathError::CyclicDependencyError { .. })
    ));
}

#[test]
fn identical_inputs_serialise_identically() {
    let mut tasks = chain(&[2, 3, 1]);
    tasks.push(TaskRecord::new(4, 1));

    let (_, first) = analyze(&tasks, 0).unwrap();
    let (_, second) = analyze(&tasks, 0).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    let json = serde_json::to_value(&first).unwrap();
    assert_eq!(json["projectFinish"], 6);
    assert_eq!(json["tasks"]["4"]["slack"], 5);
    assert_eq!(json["tasks"]["1"]["earliestFinish"], 2);
}

#[test]
fn day_overflow_is_an_invariant_violation() {
    let tasks = vec![TaskRecord::new(1, i64::MAX), TaskRecord::new(2, 1).after(1)];

    match analyze(&tasks, 0) {
        Err(CritpathError::InvariantViolation(msg)) => assert!(msg.contains("task 2")),
        other => panic!("Expected InvariantViolation, got: {:?}", other),
    }

    // A single huge task still fits, but not once the start is shifted.
    assert!(analyze(&[TaskRecord::new(1, i64::MAX)], 0).is_ok());
    assert!(matches!(
        analyze(&[TaskRecord::new(1, i64::MAX)], 1),
        Err(CritpathError::InvariantViolation(_))
    ));
}

#[test]
fn negative_start_with_long_durations_does_not_overflow_backwards() {
    let tasks = vec![TaskRecord::new(1, i64::MAX - 1)];

    let (_, schedule) = analyze(&tasks, i64::MIN + 1).unwrap();

    assert_eq!(schedule.get(1).unwrap().slack, 0);
    assert_eq!(schedule.duration(), i64::MAX - 1);
}
