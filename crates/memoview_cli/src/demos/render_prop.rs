//! Counters that delegate their rendering
//!
//! Each counter owns its count and receives a `render` callback that draws a
//! shape. Passing a fresh render closure every pass re-renders both counters
//! whenever anything on the page changes.

use memoview_core::{InputSet, Value};
use memoview_tree::{render_delegate, Scope, View};

use super::{Demo, Handler, Step};

#[derive(Clone, Debug, Default)]
pub struct ShapesState {
    pub circle: i64,
    pub rectangle: i64,
    pub ticks: i64,
}

fn shape(name: &'static str, glyph: &'static str, naive: bool) -> Handler {
    Handler::with_body(name, naive, move |count| {
        Ok(Value::text(format!(
            "{glyph} {}",
            count.as_int().unwrap_or_default()
        )))
    })
}

pub fn demo(naive: bool) -> Demo<ShapesState> {
    let circle = shape("circle", "(●)", naive);
    let rectangle = shape("rectangle", "[■]", naive);

    let root = View::new("shapes", |inputs| {
        Ok(Value::text(format!("Ticks: {}", inputs.int("ticks")?)))
    })
    .with_inputs(|scope: &Scope<'_, ShapesState>| InputSet::new().with("ticks", scope.state.ticks))
    .with_child(render_delegate(
        "circle_counter",
        |state: &ShapesState| Value::Int(state.circle),
        move |_: &Scope<'_, ShapesState>| circle.get(),
    ))
    .with_child(render_delegate(
        "rectangle_counter",
        |state: &ShapesState| Value::Int(state.rectangle),
        move |_: &Scope<'_, ShapesState>| rectangle.get(),
    ));

    Demo {
        root,
        initial: ShapesState::default(),
        script: vec![
            Step::new("click circle", |state: &ShapesState| ShapesState {
                circle: state.circle + 1,
                ..state.clone()
            }),
            Step::new("tick", |state: &ShapesState| ShapesState {
                ticks: state.ticks + 1,
                ..state.clone()
            }),
            Step::new("click rectangle", |state: &ShapesState| ShapesState {
                rectangle: state.rectangle + 1,
                ..state.clone()
            }),
        ],
    }
}
