//! Demo scenarios
//!
//! Each demo builds a view tree plus a short script of interactions, then
//! runs it through a [`Scheduler`] and prints what every pass recomputed.
//! With `naive` set, the demo hands out fresh values and callbacks every pass,
//! which is the pitfall the memoized version avoids.

pub mod cart;
pub mod counter;
pub mod form;
pub mod render_prop;
pub mod toggle;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use clap::ValueEnum;
use memoview_core::{Callback, InputSet, RenderError, StableCallback, Value};
use memoview_tree::{PassReport, RecordingSurface, Scheduler, SchedulerConfig, View};
use tracing::{info, warn};

/// Available demos
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DemoKind {
    Counter,
    Form,
    Cart,
    Toggle,
    RenderProp,
}

impl fmt::Display for DemoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DemoKind::Counter => "counter",
            DemoKind::Form => "form",
            DemoKind::Cart => "cart",
            DemoKind::Toggle => "toggle",
            DemoKind::RenderProp => "render-prop",
        };
        f.write_str(name)
    }
}

/// How to run a demo
#[derive(Clone, Debug)]
pub struct DemoOptions {
    /// Scripted interactions after the initial pass
    pub steps: usize,
    pub naive: bool,
    pub scheduler: SchedulerConfig,
    /// Print every committed frame
    pub print_frames: bool,
}

/// One scripted interaction
pub struct Step<S> {
    label: &'static str,
    apply: Box<dyn FnMut(&S) -> S>,
}

impl<S> Step<S> {
    pub fn new<F>(label: &'static str, apply: F) -> Self
    where
        F: FnMut(&S) -> S + 'static,
    {
        Self {
            label,
            apply: Box::new(apply),
        }
    }
}

/// A runnable demo
pub struct Demo<S> {
    pub root: View<S>,
    pub initial: S,
    /// Interactions, repeated in order until the step budget is used up
    pub script: Vec<Step<S>>,
}

/// Totals of a demo run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DemoSummary {
    pub passes: u64,
    /// Live nodes after the last pass
    pub nodes: usize,
    /// Render function runs over all passes, removed nodes included
    pub total_renders: u64,
    pub reused: usize,
}

impl DemoSummary {
    fn record(&mut self, report: &PassReport) {
        self.passes += 1;
        self.total_renders += report.recomputed.len() as u64;
        self.reused += report.reused;
    }
}

/// Event handler handed to views as a callback input
///
/// In naive mode every call to [`get`](Self::get) builds a new callback, the
/// way a closure literal in a render function would. Otherwise the callback
/// comes from a [`StableCallback`] and keeps its identity.
#[derive(Clone)]
pub struct Handler {
    name: &'static str,
    naive: bool,
    body: Arc<dyn Fn(&Value) -> Result<Value, RenderError> + Send + Sync>,
    cell: Arc<Mutex<StableCallback>>,
}

impl Handler {
    /// Handler that echoes its argument
    pub fn new(name: &'static str, naive: bool) -> Self {
        Self::with_body(name, naive, |arg| Ok(arg.clone()))
    }

    pub fn with_body<F>(name: &'static str, naive: bool, body: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, RenderError> + Send + Sync + 'static,
    {
        Self {
            name,
            naive,
            body: Arc::new(body),
            cell: Arc::new(Mutex::new(StableCallback::new())),
        }
    }

    fn make(&self) -> Callback {
        let body = self.body.clone();
        Callback::named(self.name, move |arg| body(arg))
    }

    pub fn get(&self) -> Callback {
        if self.naive {
            return self.make();
        }
        self.cell
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(InputSet::new(), || self.make())
    }
}

/// Run the demo of the given kind
pub fn run(kind: DemoKind, options: &DemoOptions) -> Result<DemoSummary> {
    info!(
        "Running {} demo ({}, {} steps)",
        kind,
        if options.naive { "naive" } else { "memoized" },
        options.steps
    );

    match kind {
        DemoKind::Counter => execute(counter::demo(options.naive), options),
        DemoKind::Form => execute(form::demo(options.naive), options),
        DemoKind::Cart => execute(cart::demo(options.naive), options),
        DemoKind::Toggle => execute(toggle::demo(options.naive), options),
        DemoKind::RenderProp => execute(render_prop::demo(options.naive), options),
    }
}

/// Drive a demo through its script
pub fn execute<S: 'static>(demo: Demo<S>, options: &DemoOptions) -> Result<DemoSummary> {
    let Demo {
        root,
        initial,
        mut script,
    } = demo;
    let mut scheduler = Scheduler::with_config(
        root,
        initial,
        RecordingSurface::new(),
        options.scheduler.clone(),
    );
    let mut summary = DemoSummary::default();

    for report in scheduler.flush()? {
        summary.record(&report);
        print_pass("mount", &report, scheduler.surface(), options);
    }
    scheduler.surface_mut().clear();

    if script.is_empty() {
        warn!("Demo has no scripted interactions");
    }

    for index in 0..options.steps {
        let count = script.len();
        let Some(step) = script.get_mut(index % count.max(1)) else {
            break;
        };

        scheduler.update(|state| (step.apply)(state));
        for report in scheduler.flush()? {
            summary.record(&report);
            print_pass(step.label, &report, scheduler.surface(), options);
        }
        scheduler.surface_mut().clear();
    }

    summary.nodes = scheduler.tree().len();

    println!();
    println!(
        "{} passes, {} renders, {} reused across {} nodes",
        summary.passes, summary.total_renders, summary.reused, summary.nodes
    );

    Ok(summary)
}

fn print_pass(label: &str, report: &PassReport, surface: &RecordingSurface, options: &DemoOptions) {
    println!();
    println!(
        "pass {} - {}: {} recomputed, {} reused",
        report.pass,
        label,
        report.recomputed.len(),
        report.reused
    );

    for fault in &report.faults {
        warn!("{}", fault);
    }

    let Some(frame) = surface.frames().iter().find(|f| f.pass == report.pass) else {
        return;
    };
    for (id, node) in frame.iter() {
        let recomputed = report.was_recomputed(id.as_str());
        if !options.print_frames && !recomputed {
            continue;
        }
        println!(
            "  {} {:<36} renders {:>3}  {}",
            if recomputed { "*" } else { " " },
            id.as_str(),
            node.render_count,
            node.output
        );
    }
}
