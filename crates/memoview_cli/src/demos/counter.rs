//! A parent counter next to a child whose inputs never really change
//!
//! The naive parent rebuilds the child's data record, its item list and its
//! click handler on every pass, so the child and the derived total re-render
//! with every increment.

use std::sync::Arc;

use memoview_core::{InputSet, Value};
use memoview_tree::{Scope, View};

use super::{Demo, Handler, Step};

const ITEMS: [i64; 5] = [1, 2, 3, 4, 5];

#[derive(Clone, Debug)]
pub struct CounterState {
    pub counter: i64,
    pub message: Arc<str>,
}

pub fn demo(naive: bool) -> Demo<CounterState> {
    let on_click = Handler::with_body("child_click", naive, |_| {
        Ok(Value::text("Clicked from the child!"))
    });
    let clicker = on_click.clone();

    Demo {
        root: view(naive, on_click),
        initial: CounterState {
            counter: 0,
            message: "".into(),
        },
        script: vec![
            Step::new("increment counter", |state: &CounterState| CounterState {
                counter: state.counter + 1,
                ..state.clone()
            }),
            Step::new("increment counter", |state: &CounterState| CounterState {
                counter: state.counter + 1,
                ..state.clone()
            }),
            Step::new("click child", move |state: &CounterState| {
                let message = clicker
                    .get()
                    .call(&Value::Null)
                    .ok()
                    .and_then(|reply| reply.as_text().map(Arc::<str>::from))
                    .unwrap_or_else(|| "".into());
                CounterState {
                    message,
                    ..state.clone()
                }
            }),
        ],
    }
}

fn child_data() -> Value {
    Value::record([("id", Value::Int(1)), ("name", Value::text("Child component"))])
}

fn view(naive: bool, on_click: Handler) -> View<CounterState> {
    let items = Value::list(ITEMS);
    let data = child_data();

    let total = View::new("total", |inputs| {
        let total: i64 = inputs
            .list("items")?
            .iter()
            .filter_map(Value::as_int)
            .map(|item| item * 2)
            .sum();
        Ok(Value::text(format!("Total: {total}")))
    })
    .with_inputs(move |_: &Scope<'_, CounterState>| {
        let items = if naive { Value::list(ITEMS) } else { items.clone() };
        InputSet::new().with("items", items)
    });

    let child = View::new("child", |inputs| {
        inputs.callback("on_click")?;
        Ok(Value::text(format!(
            "{} {}",
            inputs.text("title")?,
            inputs.require("data")?
        )))
    })
    .with_inputs(move |_: &Scope<'_, CounterState>| {
        let data = if naive { child_data() } else { data.clone() };
        InputSet::new()
            .with("title", "Child component")
            .with("on_click", on_click.get())
            .with("data", data)
    });

    View::new("parent", |inputs| {
        let message = inputs.text("message")?;
        let counter = inputs.int("counter")?;
        Ok(if message.is_empty() {
            Value::text(format!("Counter: {counter}"))
        } else {
            Value::text(format!("Counter: {counter} | {message}"))
        })
    })
    .with_inputs(|scope: &Scope<'_, CounterState>| {
        InputSet::new()
            .with("counter", scope.state.counter)
            .with("message", scope.state.message.clone())
    })
    .with_child(total)
    .with_child(child)
}
