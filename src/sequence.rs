//! Sequence diagrams from recorded call sites.
//!
//! Traversal and formatting are separate: [`trace_entry`] and
//! [`trace_all_entry_points`] walk the model and produce a [`SequenceDiagram`]
//! made of [`Step`] records; its `Display` impl writes the Mermaid text.
//!
//! The walk is bounded twice. Expansion stops once the depth passes
//! [`SequenceOptions::max_depth`], and a method already being expanded on the
//! current path is not expanded again. The path set is per branch, so the
//! same method can appear again on a sibling branch.

use indexmap::IndexSet;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

use crate::classify::Visibility;
use crate::library::{is_library_class, is_system_method};
use crate::model::{CallKind, CodeModel, MethodDescriptor, SELF_TARGET};

pub const HEADER: &str = "sequenceDiagram";
pub const CLIENT: &str = "Client";

/// Hard ceiling on `max_depth`; the walk recurses once per level.
pub const MAX_DEPTH_CEILING: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceOptions {
    pub max_depth: usize,
    pub max_entries: usize,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_entries: 5,
        }
    }
}

impl SequenceOptions {
    /// Caps `max_depth` at [`MAX_DEPTH_CEILING`].
    pub fn clamped(self) -> Self {
        if self.max_depth <= MAX_DEPTH_CEILING {
            return self;
        }
        warn!(
            requested = self.max_depth,
            ceiling = MAX_DEPTH_CEILING,
            "max_depth above ceiling, clamping"
        );
        Self {
            max_depth: MAX_DEPTH_CEILING,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    /// `->>+`: call that opens an activation.
    Activate,
    /// `->>`
    Call,
    /// `-->`
    Reply,
    /// `-->>-`: reply that closes an activation.
    Return,
}

impl Arrow {
    pub fn token(self) -> &'static str {
        match self {
            Self::Activate => "->>+",
            Self::Call => "->>",
            Self::Reply => "-->",
            Self::Return => "-->>-",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Message {
        from: String,
        to: String,
        arrow: Arrow,
        label: String,
    },
    Note {
        over: String,
        text: String,
    },
    /// Blank line between independent entry sequences.
    Break,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceDiagram {
    /// First-seen order, no duplicates.
    pub participants: IndexSet<String>,
    pub steps: Vec<Step>,
}

impl SequenceDiagram {
    fn add_participant(&mut self, name: &str) {
        if !self.participants.contains(name) {
            self.participants.insert(name.to_string());
        }
    }

    fn message(&mut self, from: &str, to: &str, arrow: Arrow, label: impl Into<String>) {
        self.steps.push(Step::Message {
            from: from.to_string(),
            to: to.to_string(),
            arrow,
            label: label.into(),
        });
    }

    fn note(&mut self, over: &str, text: impl Into<String>) {
        self.steps.push(Step::Note {
            over: over.to_string(),
            text: text.into(),
        });
    }

    pub fn notes(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|s| match s {
            Step::Note { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message {
                from,
                to,
                arrow,
                label,
            } => write!(f, "{from}{}{to}: {label}", arrow.token()),
            Self::Note { over, text } => write!(f, "Note over {over}: {text}"),
            Self::Break => Ok(()),
        }
    }
}

impl fmt::Display for SequenceDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{HEADER}")?;
        if !self.participants.is_empty() {
            for participant in &self.participants {
                writeln!(f, "    participant {participant}")?;
            }
            writeln!(f)?;
        }
        for step in &self.steps {
            match step {
                Step::Break => writeln!(f)?,
                _ => writeln!(f, "    {step}")?,
            }
        }
        Ok(())
    }
}

/// Sequence for one entry method, rendered with default options.
pub fn render_for_entry(model: &CodeModel, class_name: &str, method_name: &str) -> String {
    trace_entry(model, class_name, method_name, SequenceOptions::default()).to_string()
}

/// Sequences for up to five public entry methods, rendered with default options.
pub fn render_all_entry_points(model: &CodeModel) -> String {
    trace_all_entry_points(model, SequenceOptions::default()).to_string()
}

pub fn trace_entry(
    model: &CodeModel,
    class_name: &str,
    method_name: &str,
    options: SequenceOptions,
) -> SequenceDiagram {
    let Some(entry) = model.find_method(class_name, method_name) else {
        debug!(class = class_name, method = method_name, "entry method not found");
        let mut diagram = SequenceDiagram::default();
        diagram.note(class_name, format!("Method '{method_name}' not found"));
        return diagram;
    };

    let mut walker = Walker::new(model, options);
    walker.diagram.add_participant(CLIENT);
    walker.run_entry(class_name, entry);
    walker.diagram
}

pub fn trace_all_entry_points(model: &CodeModel, options: SequenceOptions) -> SequenceDiagram {
    let candidates: Vec<&MethodDescriptor> = model
        .methods
        .values()
        .flatten()
        .filter(|m| is_entry_candidate(m))
        .take(options.max_entries)
        .collect();
    debug!(candidates = candidates.len(), "selected entry points");

    let mut walker = Walker::new(model, options);
    if candidates.is_empty() {
        walker.diagram.note(CLIENT, "No public methods found to display");
        return walker.diagram;
    }

    walker.diagram.add_participant(CLIENT);
    for entry in candidates {
        walker.run_entry(&entry.owner, entry);
        walker.diagram.steps.push(Step::Break);
    }
    walker.diagram
}

fn is_entry_candidate(method: &MethodDescriptor) -> bool {
    method.visibility == Visibility::Public
        && !method.is_constructor
        && !looks_like_accessor(&method.name)
        && !is_system_method(&method.name)
}

fn looks_like_accessor(name: &str) -> bool {
    name.starts_with("get") || name.starts_with("set") || name.starts_with("is")
}

fn return_label(method: &MethodDescriptor) -> &str {
    if method.returns_void() {
        "return"
    } else {
        &method.return_type
    }
}

struct Walker<'m> {
    model: &'m CodeModel,
    options: SequenceOptions,
    diagram: SequenceDiagram,
    /// (owner, method) keys currently being expanded on this path.
    exploring: HashSet<(&'m str, &'m str)>,
}

impl<'m> Walker<'m> {
    fn new(model: &'m CodeModel, options: SequenceOptions) -> Self {
        Self {
            model,
            options: options.clamped(),
            diagram: SequenceDiagram::default(),
            exploring: HashSet::new(),
        }
    }

    fn run_entry(&mut self, class_name: &str, entry: &'m MethodDescriptor) {
        self.diagram.add_participant(class_name);
        self.diagram
            .message(CLIENT, class_name, Arrow::Activate, format!("{}()", entry.name));
        self.expand(entry, class_name, 1);
        self.diagram
            .message(class_name, CLIENT, Arrow::Return, return_label(entry));
        self.exploring.clear();
    }

    fn expand(&mut self, method: &'m MethodDescriptor, caller: &str, depth: usize) {
        if depth > self.options.max_depth {
            self.diagram.note(caller, "... (call depth limit reached)");
            return;
        }

        let key = (method.owner.as_str(), method.name.as_str());
        if !self.exploring.insert(key) {
            self.diagram
                .note(caller, format!("{}() (already called)", method.name));
            return;
        }

        let model = self.model;
        for call in &method.calls {
            let target = call.target.as_str();
            if is_library_class(target)
                || target == SELF_TARGET
                || target == caller
                || !model.is_known(target)
            {
                continue;
            }
            self.diagram.add_participant(target);

            if call.kind == CallKind::Construction {
                self.diagram
                    .message(caller, target, Arrow::Activate, format!("new {}()", call.member));
                self.diagram
                    .message(target, caller, Arrow::Reply, "new instance");
                continue;
            }

            let callee = model.find_method(target, &call.member);
            let is_static =
                call.kind == CallKind::StaticCall || callee.is_some_and(|m| m.is_static);
            let label = if is_static {
                format!("{}() [static]", call.member)
            } else {
                format!("{}()", call.member)
            };
            self.diagram.message(caller, target, Arrow::Call, label);

            if let Some(callee) = callee {
                self.expand(callee, target, depth + 1);
                self.diagram
                    .message(target, caller, Arrow::Reply, return_label(callee));
            }
        }

        self.exploring.remove(&key);
    }
}
