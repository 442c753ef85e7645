//! A validated form
//!
//! Three fields, a submit button and an unrelated counter. Each field gets its
//! value and a validation callback; the button gets a `disabled` flag and a
//! submit handler. With stable callbacks, typing into one field re-renders
//! that field only, and the button only re-renders when validity flips.

use memoview_core::{InputSet, Value};
use memoview_tree::{Scope, View};

use super::{Demo, Handler, Step};

#[derive(Clone, Debug, Default)]
pub struct FormState {
    pub name: String,
    pub email: String,
    pub password: String,
    pub counter: i64,
    pub submitted: bool,
}

fn name_error(value: &str) -> Option<&'static str> {
    (value.chars().count() < 3).then_some("Name must be at least 3 characters")
}

fn email_error(value: &str) -> Option<&'static str> {
    (!value.contains('@')).then_some("Invalid email")
}

fn password_error(value: &str) -> Option<&'static str> {
    (value.chars().count() < 6).then_some("Password must be at least 6 characters")
}

impl FormState {
    pub fn is_valid(&self) -> bool {
        name_error(&self.name).is_none()
            && email_error(&self.email).is_none()
            && password_error(&self.password).is_none()
    }
}

fn name(state: &FormState) -> &str {
    &state.name
}

fn email(state: &FormState) -> &str {
    &state.email
}

fn password(state: &FormState) -> &str {
    &state.password
}

/// Wrap a validation rule as a callback handler
fn validator(name: &'static str, naive: bool, rule: fn(&str) -> Option<&'static str>) -> Handler {
    Handler::with_body(name, naive, move |value| {
        let value = value.as_text().unwrap_or_default();
        Ok(rule(value).map_or(Value::Null, |message| Value::text(message)))
    })
}

fn field(label: &'static str, value: fn(&FormState) -> &str, validation: Handler) -> View<FormState> {
    View::new(label.to_lowercase(), |inputs| {
        let label = inputs.text("label")?;
        let value = inputs.require("value")?;
        let error = inputs.callback("validation")?.call(value)?;
        Ok(match error {
            Value::Null => Value::text(format!("{label}: '{value}'")),
            error => Value::text(format!("{label}: '{value}' ({error})")),
        })
    })
    .with_inputs(move |scope: &Scope<'_, FormState>| {
        InputSet::new()
            .with("label", label)
            .with("value", value(scope.state))
            .with("validation", validation.get())
    })
}

pub fn demo(naive: bool) -> Demo<FormState> {
    let on_submit = Handler::new("submit", naive);

    let submit = View::new("submit", |inputs| {
        inputs.callback("on_submit")?;
        Ok(Value::text(if inputs.bool("disabled")? {
            "[Submit] (disabled)"
        } else {
            "[Submit]"
        }))
    })
    .with_inputs(move |scope: &Scope<'_, FormState>| {
        InputSet::new()
            .with("disabled", !scope.state.is_valid())
            .with("on_submit", on_submit.get())
    });

    let root = View::new("form", |inputs| {
        let counter = inputs.int("counter")?;
        Ok(Value::text(if inputs.bool("submitted")? {
            format!("Counter: {counter} | Form submitted successfully!")
        } else {
            format!("Counter: {counter}")
        }))
    })
    .with_inputs(|scope: &Scope<'_, FormState>| {
        InputSet::new()
            .with("counter", scope.state.counter)
            .with("submitted", scope.state.submitted)
    })
    .with_child(field("Name", name, validator("validate_name", naive, name_error)))
    .with_child(field("Email", email, validator("validate_email", naive, email_error)))
    .with_child(field(
        "Password",
        password,
        validator("validate_password", naive, password_error),
    ))
    .with_child(submit);

    Demo {
        root,
        initial: FormState::default(),
        script: vec![
            Step::new("increment counter", |state: &FormState| FormState {
                counter: state.counter + 1,
                ..state.clone()
            }),
            Step::new("type name", |state: &FormState| FormState {
                name: "Ada".into(),
                ..state.clone()
            }),
            Step::new("type email", |state: &FormState| FormState {
                email: "ada@analytical.engine".into(),
                ..state.clone()
            }),
            Step::new("type password", |state: &FormState| FormState {
                password: "difference".into(),
                ..state.clone()
            }),
            Step::new("submit", |state: &FormState| FormState {
                submitted: true,
                ..state.clone()
            }),
            Step::new("increment counter", |state: &FormState| FormState {
                counter: state.counter + 1,
                submitted: false,
                ..state.clone()
            }),
        ],
    }
}
