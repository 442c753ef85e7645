//! View composition helpers
//!
//! Wrapping and render delegation are plain functions from views to views;
//! the result is an ordinary [`View`] that caches like any other node.

use std::sync::Arc;

use memoview_core::{Callback, InputSet, Value};

use crate::id::Key;
use crate::view::{KeyedChildren, Scope, View};

/// Wrap `inner` under a new name, extending its inputs with `inject`
///
/// Injected inputs override inner inputs of the same name. Rendering, the
/// equality policy, and the child slots are taken from `inner`, so the
/// wrapper recomputes exactly when the inner inputs or the injected inputs
/// change.
pub fn wrap<S, F>(name: impl Into<Arc<str>>, inner: View<S>, inject: F) -> View<S>
where
    S: 'static,
    F: Fn(&Scope<'_, S>) -> InputSet + Send + Sync + 'static,
{
    let policy = inner.policy().clone();
    let children = inner.children().to_vec();
    let render = inner.clone();

    View::new(name, move |inputs| render.render(inputs))
        .with_inputs(move |scope: &Scope<'_, S>| inner.derive_inputs(scope).merged(&inject(scope)))
        .with_policy(policy)
        .with_children(children)
}

/// Show `inner` only while `is_open` holds
///
/// The toggle node renders `{ is_open, label }`. While open it owns a single
/// keyed child `content["open"]`, the inner view with `is_open = true`
/// injected; closing drops that subtree together with its caches.
pub fn with_toggle<S, F>(name: impl Into<Arc<str>>, inner: View<S>, is_open: F) -> View<S>
where
    S: 'static,
    F: Fn(&S) -> bool + Send + Sync + 'static,
{
    let content = KeyedChildren::new(
        "content",
        |scope: &Scope<'_, S>| {
            let open = scope
                .parent
                .and_then(|output| output.field("is_open"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if open {
                vec![Key::from("open")]
            } else {
                Vec::new()
            }
        },
        move |_: &Key| {
            wrap(inner.name().clone(), inner.clone(), |_: &Scope<'_, S>| {
                InputSet::new().with("is_open", true)
            })
        },
    );

    View::new(name, |inputs| {
        let open = inputs.bool("is_open")?;
        Ok(Value::record([
            ("is_open", Value::Bool(open)),
            ("label", Value::text(if open { "Close" } else { "Open" })),
        ]))
    })
    .with_inputs(move |scope: &Scope<'_, S>| InputSet::new().with("is_open", is_open(scope.state)))
    .with_keyed(content)
}

/// A view that owns some local state but delegates rendering to a callback
///
/// Its inputs are `state` (from `local`) and `render` (from `render`). The
/// render function only ever calls the callback with its own state, so a
/// render callback with a fresh identity forces a recompute even when the
/// state is unchanged.
pub fn render_delegate<S, L, R>(name: impl Into<Arc<str>>, local: L, render: R) -> View<S>
where
    S: 'static,
    L: Fn(&S) -> Value + Send + Sync + 'static,
    R: Fn(&Scope<'_, S>) -> Callback + Send + Sync + 'static,
{
    View::new(name, |inputs| {
        let state = inputs.require("state")?;
        inputs.callback("render")?.call(state)
    })
    .with_inputs(move |scope: &Scope<'_, S>| {
        InputSet::new()
            .with("state", local(scope.state))
            .with("render", render(scope))
    })
}
