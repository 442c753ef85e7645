//! End-to-end scheduler scenarios

use std::sync::{Arc, Mutex};

use memoview_core::{Callback, EqualityError, EqualityPolicy, InputSet, StableCallback, Value};
use memoview_tree::{
    render_delegate, with_toggle, wrap, ChangeSource, CommitFrame, Key, KeyedChildren, Phase,
    RecordingSurface, Scheduler, SchedulerConfig, SchedulerError, Scope, View,
};

// =============================================================================
// Counter
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
struct Counter {
    count: i64,
}

fn counter_view() -> View<Counter> {
    View::new("counter", |inputs| {
        Ok(Value::text(inputs.int("count")?.to_string()))
    })
    .with_inputs(|scope: &Scope<'_, Counter>| InputSet::new().with("count", scope.state.count))
}

#[test]
fn test_counter_commits_once_per_change() {
    let mut scheduler =
        Scheduler::new(counter_view(), Counter { count: 0 }, RecordingSurface::new());
    scheduler.mount();
    assert_eq!(
        scheduler.surface().last().and_then(|f| f.output("counter")),
        Some(&Value::text("0"))
    );

    scheduler.notify(Counter { count: 1 });
    let report = scheduler.run_pending().unwrap();

    assert_eq!(
        report.phases,
        vec![
            Phase::Idle,
            Phase::Collecting,
            Phase::Propagating,
            Phase::Committed,
            Phase::Idle
        ]
    );
    assert_eq!(scheduler.surface().commit_count(), 2);
    let frame = scheduler.surface().last().unwrap();
    assert_eq!(frame.len(), 1);
    assert_eq!(frame.output("counter"), Some(&Value::text("1")));
    assert_eq!(frame.render_count("counter"), Some(2));
    assert_eq!(
        report.changed_inputs.iter().map(|n| &**n).collect::<Vec<_>>(),
        vec!["count"]
    );

    assert!(scheduler.run_pending().is_none());
    assert_eq!(scheduler.surface().commit_count(), 2);
}

#[test]
fn test_notifications_coalesce_into_one_pass() {
    let mut scheduler =
        Scheduler::new(counter_view(), Counter { count: 0 }, RecordingSurface::new());
    scheduler.mount();

    let source = scheduler.change_source();
    source.notify(Counter { count: 1 });
    source.notify(Counter { count: 2 });

    let reports = scheduler.flush().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].coalesced_events, 2);
    assert_eq!(scheduler.surface().commit_count(), 2);
    assert_eq!(
        scheduler.surface().last().and_then(|f| f.output("counter")),
        Some(&Value::text("2"))
    );
    // the intermediate state was never rendered
    assert_eq!(scheduler.tree().root().render_count(), 2);
}

#[test]
fn test_flush_stops_at_pass_limit() {
    let slot: Arc<Mutex<Option<ChangeSource<Counter>>>> = Arc::new(Mutex::new(None));
    let feedback = slot.clone();
    let surface = move |frame: &CommitFrame| {
        if let Some(source) = feedback.lock().unwrap().as_ref() {
            source.notify(Counter {
                count: frame.pass as i64,
            });
        }
    };

    let mut scheduler = Scheduler::with_config(
        counter_view(),
        Counter { count: 0 },
        surface,
        SchedulerConfig::new().max_passes_per_flush(4),
    );
    *slot.lock().unwrap() = Some(scheduler.change_source());

    let err = scheduler.flush().unwrap_err();
    assert_eq!(err, SchedulerError::PassLimitExceeded { limit: 4 });
    assert_eq!(scheduler.passes(), 4);
}

/// Counter whose `echo` child notifies `source` while its inputs are derived
fn echoing_counter(
    slot: Arc<Mutex<Option<ChangeSource<Counter>>>>,
    trigger: i64,
    queued: Vec<i64>,
) -> View<Counter> {
    let echo = View::new("echo", |inputs| {
        Ok(Value::text(inputs.int("count")?.to_string()))
    })
    .with_inputs(move |scope: &Scope<'_, Counter>| {
        if scope.state.count == trigger {
            if let Some(source) = slot.lock().unwrap().as_ref() {
                for &count in &queued {
                    source.notify(Counter { count });
                }
            }
        }
        InputSet::new().with("count", scope.state.count)
    });
    counter_view().with_child(echo)
}

#[test]
fn test_change_during_propagation_waits_for_next_pass() {
    let slot = Arc::new(Mutex::new(None));
    let mut scheduler = Scheduler::new(
        echoing_counter(slot.clone(), 1, vec![5, 6]),
        Counter { count: 0 },
        RecordingSurface::new(),
    );
    *slot.lock().unwrap() = Some(scheduler.change_source());
    scheduler.mount();

    scheduler.notify(Counter { count: 1 });
    let report = scheduler.run_pending().unwrap();
    assert_eq!(report.coalesced_events, 1);

    // the whole frame still shows the state the pass started with
    let frame = scheduler.surface().last().unwrap();
    assert_eq!(frame.output("counter"), Some(&Value::text("1")));
    assert_eq!(frame.output("counter/echo"), Some(&Value::text("1")));
    assert_eq!(scheduler.state(), Some(&Counter { count: 1 }));
    assert!(scheduler.change_source().has_pending());

    let report = scheduler.run_pending().unwrap();
    assert_eq!(report.coalesced_events, 2);
    let frame = scheduler.surface().last().unwrap();
    assert_eq!(frame.output("counter"), Some(&Value::text("6")));
    assert_eq!(frame.output("counter/echo"), Some(&Value::text("6")));
    // 5 was superseded and never rendered
    assert_eq!(scheduler.tree().root().render_count(), 3);

    assert!(scheduler.run_pending().is_none());
    assert_eq!(scheduler.surface().commit_count(), 3);
}

#[test]
fn test_change_during_collecting_waits_for_next_pass() {
    let slot: Arc<Mutex<Option<ChangeSource<Counter>>>> = Arc::new(Mutex::new(None));
    let feedback = slot.clone();
    let root = View::new("counter", |inputs| {
        Ok(Value::text(inputs.int("count")?.to_string()))
    })
    .with_inputs(move |scope: &Scope<'_, Counter>| {
        if scope.state.count == 1 {
            if let Some(source) = feedback.lock().unwrap().as_ref() {
                source.notify(Counter { count: 2 });
            }
        }
        InputSet::new().with("count", scope.state.count)
    });

    let mut scheduler = Scheduler::new(root, Counter { count: 0 }, RecordingSurface::new());
    *slot.lock().unwrap() = Some(scheduler.change_source());
    scheduler.mount();
    scheduler.notify(Counter { count: 1 });

    let reports = scheduler.flush().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].coalesced_events, 1);
    assert_eq!(reports[1].coalesced_events, 1);

    let outputs: Vec<_> = scheduler
        .surface()
        .frames()
        .iter()
        .filter_map(|f| f.output("counter").cloned())
        .collect();
    assert_eq!(
        outputs,
        vec![Value::text("0"), Value::text("1"), Value::text("2")]
    );
}

#[test]
fn test_same_named_siblings_are_all_committed() {
    let cell = |side: &'static str| {
        View::new("cell", move |inputs| {
            Ok(Value::text(format!("{side} {}", inputs.int("count")?)))
        })
        .with_inputs(|scope: &Scope<'_, Counter>| InputSet::new().with("count", scope.state.count))
    };
    let row = View::new("row", |_| Ok(Value::Null))
        .with_child(cell("left"))
        .with_child(cell("right"));

    let mut scheduler = Scheduler::new(row, Counter { count: 0 }, RecordingSurface::new());
    scheduler.mount();
    scheduler.notify(Counter { count: 1 });
    scheduler.run_pending().unwrap();

    let frame = scheduler.surface().last().unwrap();
    assert_eq!(frame.len(), scheduler.tree().len());
    assert_eq!(frame.output("row/cell"), Some(&Value::text("left 1")));
    assert_eq!(frame.output("row/cell#1"), Some(&Value::text("right 1")));
    assert_eq!(frame.render_count("row/cell#1"), Some(2));
}

// =============================================================================
// Keyed lists
// =============================================================================

#[derive(Clone, Debug)]
struct Todos {
    items: Vec<(i64, &'static str)>,
}

fn todo_list() -> View<Todos> {
    let items = KeyedChildren::new(
        "items",
        |scope: &Scope<'_, Todos>| scope.state.items.iter().map(|(id, _)| Key::from(*id)).collect(),
        |key: &Key| {
            let id = match key {
                Key::Int(id) => *id,
                Key::Str(_) => -1,
            };
            View::new("item", |inputs| Ok(Value::text(inputs.text("title")?)))
                .with_inputs(move |scope: &Scope<'_, Todos>| {
                    let title = scope
                        .state
                        .items
                        .iter()
                        .find(|(item, _)| *item == id)
                        .map_or("", |(_, title)| *title);
                    InputSet::new().with("title", title)
                })
        },
    );

    View::new("todos", |inputs| Ok(Value::Int(inputs.int("len")?)))
        .with_inputs(|scope: &Scope<'_, Todos>| InputSet::new().with("len", scope.state.items.len()))
        .with_keyed(items)
}

#[test]
fn test_reorder_recomputes_no_children() {
    let mut scheduler = Scheduler::new(
        todo_list(),
        Todos {
            items: vec![(1, "a"), (2, "b"), (3, "c")],
        },
        RecordingSurface::new(),
    );
    scheduler.mount();

    scheduler.notify(Todos {
        items: vec![(3, "c"), (1, "a"), (2, "b")],
    });
    let report = scheduler.run_pending().unwrap();

    assert!(report.recomputed.is_empty());
    assert!(report.created.is_empty());
    assert_eq!(report.reused, 4);

    let frame = scheduler.surface().last().unwrap();
    assert_eq!(
        frame.ids().map(|id| id.as_str()).collect::<Vec<_>>(),
        vec!["todos", "todos/items[3]", "todos/items[1]", "todos/items[2]"]
    );
    for id in ["todos/items[1]", "todos/items[2]", "todos/items[3]"] {
        assert_eq!(frame.render_count(id), Some(1));
    }
}

#[test]
fn test_readded_key_starts_fresh() {
    let mut scheduler = Scheduler::new(
        todo_list(),
        Todos {
            items: vec![(1, "a"), (2, "b")],
        },
        RecordingSurface::new(),
    );
    scheduler.mount();

    scheduler.notify(Todos {
        items: vec![(1, "a")],
    });
    let report = scheduler.run_pending().unwrap();
    assert_eq!(report.removed, vec!["todos/items[2]"]);
    assert!(!scheduler.tree().contains("todos/items[2]"));

    scheduler.notify(Todos {
        items: vec![(1, "a"), (2, "B")],
    });
    let report = scheduler.run_pending().unwrap();
    assert_eq!(report.created, vec!["todos/items[2]"]);
    assert!(report.was_recomputed("todos/items[2]"));
    assert!(!report.was_recomputed("todos/items[1]"));

    let node = scheduler.tree().node("todos/items[2]").unwrap();
    assert_eq!(node.render_count(), 1);
    assert_eq!(node.committed(), Some(&Value::text("B")));
}

#[test]
fn test_parent_hit_still_visits_children() {
    let mut scheduler = Scheduler::new(
        todo_list(),
        Todos {
            items: vec![(1, "a"), (2, "b")],
        },
        RecordingSurface::new(),
    );
    scheduler.mount();

    // same length, so the list node hits; one title changed
    scheduler.notify(Todos {
        items: vec![(1, "a"), (2, "changed")],
    });
    let report = scheduler.run_pending().unwrap();

    assert!(!report.was_recomputed("todos"));
    assert_eq!(report.recomputed, vec!["todos/items[2]"]);
    assert_eq!(
        scheduler
            .surface()
            .last()
            .and_then(|f| f.output("todos/items[2]")),
        Some(&Value::text("changed"))
    );
}

#[test]
fn test_duplicate_keys_keep_first() {
    let mut scheduler = Scheduler::new(
        todo_list(),
        Todos {
            items: vec![(1, "a"), (1, "again"), (2, "b")],
        },
        RecordingSurface::new(),
    );
    let report = scheduler.mount().unwrap();

    assert_eq!(report.created, vec!["todos/items[1]", "todos/items[2]"]);
    assert_eq!(scheduler.tree().len(), 3);
}

// =============================================================================
// Faults
// =============================================================================

#[derive(Clone, Debug)]
struct Profile {
    name: &'static str,
    broken: bool,
}

fn profile_view() -> View<Profile> {
    let badge = View::new("badge", |inputs| {
        Ok(Value::text(format!("[{}]", inputs.text("initial")?)))
    })
    .with_inputs(|scope: &Scope<'_, Profile>| {
        let initial = scope
            .parent
            .and_then(Value::as_text)
            .and_then(|name| name.get(..1))
            .unwrap_or("?");
        InputSet::new().with("initial", initial)
    });

    let card = View::new("card", |inputs| {
        if inputs.bool("broken")? {
            return Err(memoview_core::RenderError::failed("bad avatar"));
        }
        Ok(Value::text(inputs.text("name")?))
    })
    .with_inputs(|scope: &Scope<'_, Profile>| {
        InputSet::new()
            .with("name", scope.state.name)
            .with("broken", scope.state.broken)
    })
    .with_child(badge);

    View::new("app", |_| Ok(Value::text("app")))
        .with_child(card)
        .with_child(View::new("footer", |_| Ok(Value::text("footer"))))
}

#[test]
fn test_render_fault_keeps_previous_outputs() {
    let mut scheduler = Scheduler::new(
        profile_view(),
        Profile {
            name: "ada",
            broken: false,
        },
        RecordingSurface::new(),
    );
    scheduler.mount();

    scheduler.notify(Profile {
        name: "grace",
        broken: true,
    });
    let report = scheduler.run_pending().unwrap();

    assert!(!report.is_clean());
    let fault = report.fault_for("app/card").unwrap();
    assert!(fault.to_string().contains("bad avatar"));

    let frame = scheduler.surface().last().unwrap();
    assert_eq!(frame.output("app/card"), Some(&Value::text("ada")));
    assert_eq!(frame.output("app/card/badge"), Some(&Value::text("[a]")));
    // siblings after the faulted subtree are still visited
    assert_eq!(frame.output("app/footer"), Some(&Value::text("footer")));
    assert_eq!(scheduler.stats().faults, 1);

    // recovery re-renders from the new state
    scheduler.notify(Profile {
        name: "grace",
        broken: false,
    });
    let report = scheduler.run_pending().unwrap();
    assert!(report.is_clean());
    let frame = scheduler.surface().last().unwrap();
    assert_eq!(frame.output("app/card/badge"), Some(&Value::text("[g]")));
}

#[test]
fn test_fault_before_first_commit_is_absent() {
    let scheduler_view = profile_view();
    let mut scheduler = Scheduler::new(
        scheduler_view,
        Profile {
            name: "ada",
            broken: true,
        },
        RecordingSurface::new(),
    );
    let report = scheduler.mount().unwrap();

    assert_eq!(report.faults.len(), 1);
    let frame = scheduler.surface().last().unwrap();
    assert!(frame.output("app/card").is_none());
    assert!(frame.output("app").is_some());
}

#[test]
fn test_comparator_fault_forces_recompute() {
    #[derive(Clone)]
    struct Doc {
        body: Value,
    }

    let view = View::new("doc", |inputs| Ok(inputs.require("body")?.clone()))
        .with_inputs(|scope: &Scope<'_, Doc>| InputSet::new().with("body", scope.state.body.clone()))
        .with_policy(
            EqualityPolicy::shallow().with_comparator("body", |_: &Value, _: &Value| {
                Err(EqualityError::new("cannot compare"))
            }),
        );

    let body = Value::text("same");
    let mut scheduler = Scheduler::new(view, Doc { body: body.clone() }, RecordingSurface::new());
    scheduler.mount();

    scheduler.notify(Doc { body });
    let report = scheduler.run_pending().unwrap();

    assert!(report.was_recomputed("doc"));
    assert!(report.is_clean());
    assert_eq!(scheduler.stats().tree.memo.equality_faults, 1);
}

// =============================================================================
// Callbacks and composition
// =============================================================================

#[derive(Clone)]
struct Toolbar {
    on_save: Callback,
}

fn toolbar_view() -> View<Toolbar> {
    View::new("save", |inputs| {
        inputs.callback("on_save")?;
        Ok(Value::text("Save"))
    })
    .with_inputs(|scope: &Scope<'_, Toolbar>| {
        InputSet::new().with("on_save", scope.state.on_save.clone())
    })
}

#[test]
fn test_fresh_callbacks_defeat_the_cache() {
    let fresh = || Callback::new(|_| Ok(Value::Null));
    let mut scheduler =
        Scheduler::new(toolbar_view(), Toolbar { on_save: fresh() }, RecordingSurface::new());
    scheduler.mount();

    for _ in 0..3 {
        scheduler.notify(Toolbar { on_save: fresh() });
        scheduler.run_pending();
    }
    assert_eq!(scheduler.tree().root().render_count(), 4);
}

#[test]
fn test_stable_callbacks_keep_the_cache() {
    let mut handler = StableCallback::new();
    let mut stable = || handler.get(InputSet::new(), || Callback::new(|_| Ok(Value::Null)));

    let mut scheduler =
        Scheduler::new(toolbar_view(), Toolbar { on_save: stable() }, RecordingSurface::new());
    scheduler.mount();

    for _ in 0..3 {
        scheduler.notify(Toolbar { on_save: stable() });
        scheduler.run_pending();
    }
    assert_eq!(scheduler.tree().root().render_count(), 1);
}

#[derive(Clone, Debug)]
struct Panel {
    open: bool,
    count: i64,
    theme: &'static str,
}

fn panel_body() -> View<Panel> {
    View::new("body", |inputs| {
        Ok(Value::text(format!(
            "{} {}",
            inputs.int("count")?,
            inputs.text("theme")?
        )))
    })
    .with_inputs(|scope: &Scope<'_, Panel>| InputSet::new().with("count", scope.state.count))
}

#[test]
fn test_wrapped_view_recomputes_on_either_input() {
    let themed = wrap("themed", panel_body(), |scope: &Scope<'_, Panel>| {
        InputSet::new().with("theme", scope.state.theme)
    });
    let mut state = Panel {
        open: true,
        count: 1,
        theme: "dark",
    };
    let mut scheduler = Scheduler::new(themed, state.clone(), RecordingSurface::new());
    scheduler.mount();

    state.open = false;
    scheduler.notify(state.clone());
    assert!(scheduler.run_pending().unwrap().recomputed.is_empty());

    state.theme = "light";
    scheduler.notify(state.clone());
    assert!(scheduler.run_pending().unwrap().was_recomputed("themed"));

    state.count = 2;
    scheduler.notify(state.clone());
    scheduler.run_pending();
    assert_eq!(
        scheduler.surface().last().and_then(|f| f.output("themed")),
        Some(&Value::text("2 light"))
    );
}

#[test]
fn test_toggle_mounts_and_drops_content() {
    let body = wrap("body", panel_body(), |_: &Scope<'_, Panel>| {
        InputSet::new().with("theme", "dark")
    });
    let view = with_toggle("panel", body, |panel: &Panel| panel.open);
    let mut state = Panel {
        open: false,
        count: 0,
        theme: "dark",
    };
    let mut scheduler = Scheduler::new(view, state.clone(), RecordingSurface::new());
    scheduler.mount();
    assert_eq!(scheduler.surface().last().map(CommitFrame::len), Some(1));

    state.open = true;
    scheduler.notify(state.clone());
    let report = scheduler.run_pending().unwrap();
    assert_eq!(report.created, vec![r#"panel/content["open"]"#]);
    let frame = scheduler.surface().last().unwrap();
    assert_eq!(frame.output(r#"panel/content["open"]"#), Some(&Value::text("0 dark")));
    assert_eq!(
        frame.output("panel").and_then(|o| o.field("label")),
        Some(&Value::text("Close"))
    );

    state.open = false;
    scheduler.notify(state.clone());
    let report = scheduler.run_pending().unwrap();
    assert_eq!(report.removed, vec![r#"panel/content["open"]"#]);
    assert!(scheduler.tree().node(r#"panel/content["open"]"#).is_none());
}

#[derive(Clone)]
struct Shapes {
    count: i64,
    render: Callback,
}

#[test]
fn test_render_delegate_follows_callback_identity() {
    let circle = Callback::named("circle", |count| {
        Ok(Value::text(format!("circle {}", count.as_int().unwrap_or(0))))
    });
    let view = render_delegate(
        "counter",
        |shapes: &Shapes| Value::Int(shapes.count),
        |scope: &Scope<'_, Shapes>| scope.state.render.clone(),
    );
    let mut scheduler = Scheduler::new(
        view,
        Shapes {
            count: 0,
            render: circle.clone(),
        },
        RecordingSurface::new(),
    );
    scheduler.mount();

    scheduler.notify(Shapes {
        count: 0,
        render: circle.clone(),
    });
    assert!(scheduler.run_pending().unwrap().recomputed.is_empty());

    scheduler.notify(Shapes {
        count: 1,
        render: circle,
    });
    scheduler.run_pending();
    assert_eq!(
        scheduler.surface().last().and_then(|f| f.output("counter")),
        Some(&Value::text("circle 1"))
    );

    let square = Callback::named("square", |count| {
        Ok(Value::text(format!("square {}", count.as_int().unwrap_or(0))))
    });
    scheduler.notify(Shapes {
        count: 1,
        render: square,
    });
    assert!(scheduler.run_pending().unwrap().was_recomputed("counter"));
}
