//! A modal behind a toggle wrapper
//!
//! The modal is mounted only while the toggle is open. It receives a `close`
//! handler; a naive parent passes a new closure every pass, so the open modal
//! re-renders on every unrelated click.

use memoview_core::{InputSet, Value};
use memoview_tree::{with_toggle, wrap, Scope, View};

use super::{Demo, Handler, Step};

#[derive(Clone, Debug, Default)]
pub struct PageState {
    pub open: bool,
    pub clicks: i64,
}

pub fn demo(naive: bool) -> Demo<PageState> {
    let close = Handler::new("close", naive);

    let modal = View::new("modal", |inputs| {
        inputs.callback("close")?;
        Ok(Value::text(format!(
            "[{}] {} (open: {})",
            inputs.text("title")?,
            inputs.text("body")?,
            inputs.bool("is_open")?
        )))
    })
    .with_inputs(|_: &Scope<'_, PageState>| {
        InputSet::new()
            .with("title", "Modal")
            .with("body", "Wrapped component content")
    });

    let modal = wrap("modal", modal, move |_: &Scope<'_, PageState>| {
        InputSet::new().with("close", close.get())
    });

    let root = View::new("page", |inputs| {
        Ok(Value::text(format!("Clicks: {}", inputs.int("clicks")?)))
    })
    .with_inputs(|scope: &Scope<'_, PageState>| InputSet::new().with("clicks", scope.state.clicks))
    .with_child(with_toggle("toggle", modal, |page: &PageState| page.open));

    let click = |state: &PageState| PageState {
        clicks: state.clicks + 1,
        ..state.clone()
    };

    Demo {
        root,
        initial: PageState::default(),
        script: vec![
            Step::new("open modal", |state: &PageState| PageState {
                open: true,
                ..state.clone()
            }),
            Step::new("click elsewhere", click),
            Step::new("click elsewhere", click),
            Step::new("close modal", |state: &PageState| PageState {
                open: false,
                ..state.clone()
            }),
        ],
    }
}
