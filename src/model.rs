//! The code model: one record per parsed class, interface and enum, the three
//! derived edge maps, and the per-class method records used for call-graph
//! traversal.
//!
//! The model is grown by [`CodeModel::ingest`] and only read afterwards. Each
//! declaration is built completely before anything is committed, so a failing
//! declaration never leaves partial state behind.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::classify::{MethodKind, Visibility, classify_method};
use crate::error::DeclarationError;
use crate::syntax::{Modifiers, RawClass, RawDeclaration, RawEnum, RawMethod, RawSite, SyntaxUnit};
use crate::typename::normalize_type;

/// Receiver sentinel for calls without an explicit receiver.
pub const SELF_TARGET: &str = "this";

/// Class name → related class names for one relation kind, in first-seen
/// order of the source class.
pub type EdgeMap = IndexMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassKind {
    Class,
    AbstractClass,
    Interface,
}

impl ClassKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Class => "🅲Class",
            Self::AbstractClass => "🅰Abstract Class",
            Self::Interface => "🅘Interface",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub visibility: Visibility,
    pub annotations: Vec<String>,
    pub type_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub type_name: String,
    pub name: String,
}

/// Display data for a method or constructor inside a class block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSignature {
    pub visibility: Visibility,
    pub annotations: Vec<String>,
    /// `None` for constructors.
    pub return_type: Option<String>,
    pub name: String,
    pub params: Vec<Parameter>,
    /// `None` for constructors, which are never classified.
    pub kind: Option<MethodKind>,
}

impl MemberSignature {
    /// `[@Ann ]<glyph> [<ret> ]<name>(<T a>, ...)`
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| format!("{} {}", p.type_name, p.name))
            .collect::<Vec<_>>()
            .join(", ");

        let mut sig = match &self.return_type {
            Some(ret) => format!("{} {ret} {}({params})", self.visibility, self.name),
            None => format!("{} {}({params})", self.visibility, self.name),
        };
        if !self.annotations.is_empty() {
            sig = format!("{} {sig}", join_annotations(&self.annotations));
        }
        sig
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassEntity {
    pub name: String,
    pub kind: ClassKind,
    pub annotations: Vec<String>,
    pub comment: String,
    pub fields: Vec<FieldDescriptor>,
    pub constructors: Vec<MemberSignature>,
    pub accessors: Vec<MemberSignature>,
    pub user_methods: Vec<MemberSignature>,
    pub framework_methods: Vec<MemberSignature>,
}

impl ClassEntity {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotations: Vec::new(),
            comment: String::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            accessors: Vec::new(),
            user_methods: Vec::new(),
            framework_methods: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumEntity {
    pub name: String,
    pub constants: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallKind {
    InstanceCall,
    StaticCall,
    Construction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    /// Best-effort, from the receiver text; [`SELF_TARGET`] without a receiver.
    pub target: String,
    pub member: String,
    pub kind: CallKind,
    pub line: usize,
}

impl CallRecord {
    pub fn new(target: impl Into<String>, member: impl Into<String>, kind: CallKind, line: usize) -> Self {
        Self {
            target: target.into(),
            member: member.into(),
            kind,
            line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowPattern {
    ThreadCreation,
    ThreadJoin,
    ForLoop,
    Conditional,
    ArrayCreation,
    Synchronized,
    SystemOutput,
    ThreadSleep,
}

impl FlowPattern {
    pub fn description(self) -> &'static str {
        match self {
            Self::ThreadCreation => "Creates and starts threads",
            Self::ThreadJoin => "Waits for threads to complete",
            Self::ForLoop => "Contains for loop",
            Self::Conditional => "Contains conditional logic",
            Self::ArrayCreation => "Creates arrays",
            Self::Synchronized => "Synchronized method",
            Self::SystemOutput => "Prints to console",
            Self::ThreadSleep => "Thread sleeps",
        }
    }
}

/// Text heuristics over a method body.
pub fn detect_flow_patterns(body: &str, is_synchronized: bool) -> Vec<FlowPattern> {
    let mut patterns = Vec::new();
    if body.contains("new Thread") && body.contains(".start()") {
        patterns.push(FlowPattern::ThreadCreation);
    }
    if body.contains(".join()") {
        patterns.push(FlowPattern::ThreadJoin);
    }
    if body.contains("for (") || body.contains("for(") {
        patterns.push(FlowPattern::ForLoop);
    }
    if body.contains("Math.random()") || body.contains("if (") {
        patterns.push(FlowPattern::Conditional);
    }
    if body.contains("new ") && body.contains("[]") {
        patterns.push(FlowPattern::ArrayCreation);
    }
    if is_synchronized || body.contains("synchronized") {
        patterns.push(FlowPattern::Synchronized);
    }
    if body.contains("println") {
        patterns.push(FlowPattern::SystemOutput);
    }
    if body.contains("Thread.sleep") {
        patterns.push(FlowPattern::ThreadSleep);
    }
    patterns
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDescriptor {
    pub owner: String,
    pub name: String,
    pub return_type: String,
    pub param_types: Vec<String>,
    pub visibility: Visibility,
    pub is_constructor: bool,
    pub is_static: bool,
    pub flow_patterns: Vec<FlowPattern>,
    pub calls: Vec<CallRecord>,
}

impl MethodDescriptor {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            return_type: return_type.into(),
            param_types: Vec::new(),
            visibility: Visibility::Public,
            is_constructor: false,
            is_static: false,
            flow_patterns: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_call(mut self, call: CallRecord) -> Self {
        self.calls.push(call);
        self
    }

    pub fn returns_void(&self) -> bool {
        self.return_type.is_empty() || self.return_type == "void"
    }
}

/// Outcome of ingesting one source unit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub origin: String,
    pub ingested: Vec<String>,
    /// Names that replaced an earlier declaration with the same simple name.
    pub collisions: Vec<String>,
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<DeclarationError>,
}

fn serialize_errors<S: Serializer>(errors: &[DeclarationError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(|e| e.to_string()))
}

/// Tables keep declaration order. Re-inserting a name replaces the entity in
/// place, so a later declaration wins but keeps the earlier position.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CodeModel {
    pub classes: IndexMap<String, ClassEntity>,
    pub enums: IndexMap<String, EnumEntity>,
    pub uses: EdgeMap,
    pub extends: EdgeMap,
    pub implements: EdgeMap,
    pub methods: IndexMap<String, Vec<MethodDescriptor>>,
}

impl CodeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every declaration of `unit`. Declarations that failed extraction,
    /// or fail here, are skipped and listed in the report.
    pub fn ingest(&mut self, unit: SyntaxUnit) -> IngestReport {
        let mut report = IngestReport {
            origin: unit.origin.clone(),
            ..IngestReport::default()
        };

        for declaration in unit.declarations {
            let built = declaration.and_then(|raw| build_declaration(&unit.origin, raw));
            match built {
                Ok(decl) => {
                    let name = decl.name().to_string();
                    if self.commit(decl) {
                        warn!(origin = %unit.origin, name = %name, "declaration replaces an earlier one with the same name");
                        report.collisions.push(name.clone());
                    }
                    report.ingested.push(name);
                }
                Err(err) => {
                    warn!(error = %err, "skipping declaration");
                    report.errors.push(err);
                }
            }
        }

        debug!(
            origin = %report.origin,
            ingested = report.ingested.len(),
            skipped = report.errors.len(),
            "ingested source unit"
        );
        report
    }

    /// Returns `true` when an earlier entity with the same name was replaced.
    fn commit(&mut self, decl: Declaration) -> bool {
        match decl {
            Declaration::Enum { entity, methods } => {
                let name = entity.name.clone();
                let replaced = self.insert_enum(entity).is_some();
                self.methods.insert(name, methods);
                replaced
            }
            Declaration::Class(class) => {
                let ClassDeclaration {
                    entity,
                    uses,
                    extends,
                    implements,
                    methods,
                } = class;
                let name = entity.name.clone();
                let replaced = self.insert_class(entity).is_some();
                self.methods.insert(name.clone(), methods);

                self.uses.entry(name.clone()).or_default().extend(uses);
                for sup in extends {
                    self.add_extends(&name, &sup);
                }
                for iface in implements {
                    self.add_implements(&name, &iface);
                }
                replaced
            }
        }
    }

    pub fn insert_class(&mut self, entity: ClassEntity) -> Option<ClassEntity> {
        self.classes.insert(entity.name.clone(), entity)
    }

    pub fn insert_enum(&mut self, entity: EnumEntity) -> Option<EnumEntity> {
        self.enums.insert(entity.name.clone(), entity)
    }

    pub fn add_uses(&mut self, from: &str, to: &str) {
        self.uses
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    pub fn add_extends(&mut self, sub: &str, sup: &str) {
        self.extends
            .entry(sub.to_string())
            .or_default()
            .insert(sup.to_string());
    }

    pub fn add_implements(&mut self, implementor: &str, iface: &str) {
        self.implements
            .entry(implementor.to_string())
            .or_default()
            .insert(iface.to_string());
    }

    pub fn add_method(&mut self, method: MethodDescriptor) {
        self.methods
            .entry(method.owner.clone())
            .or_default()
            .push(method);
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.classes.contains_key(name) || self.enums.contains_key(name)
    }

    pub fn methods_of(&self, owner: &str) -> &[MethodDescriptor] {
        self.methods.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First method named `name` declared on `owner`; overloads are ambiguous.
    pub fn find_method(&self, owner: &str, name: &str) -> Option<&MethodDescriptor> {
        self.methods_of(owner).iter().find(|m| m.name == name)
    }
}

enum Declaration {
    Class(ClassDeclaration),
    Enum {
        entity: EnumEntity,
        methods: Vec<MethodDescriptor>,
    },
}

impl Declaration {
    fn name(&self) -> &str {
        match self {
            Self::Class(c) => &c.entity.name,
            Self::Enum { entity, .. } => &entity.name,
        }
    }
}

struct ClassDeclaration {
    entity: ClassEntity,
    uses: BTreeSet<String>,
    extends: Vec<String>,
    implements: Vec<String>,
    methods: Vec<MethodDescriptor>,
}

fn build_declaration(origin: &str, raw: RawDeclaration) -> Result<Declaration, DeclarationError> {
    if raw.name().trim().is_empty() {
        let (kind, line) = match &raw {
            RawDeclaration::Class(c) if c.is_interface => ("interface", c.line),
            RawDeclaration::Class(c) => ("class", c.line),
            RawDeclaration::Enum(e) => ("enum", e.line),
        };
        return Err(DeclarationError::Unnamed {
            origin: origin.to_string(),
            kind,
            line,
        });
    }

    Ok(match raw {
        RawDeclaration::Class(class) => Declaration::Class(build_class(&class)),
        RawDeclaration::Enum(raw_enum) => build_enum(&raw_enum),
    })
}

fn build_enum(raw: &RawEnum) -> Declaration {
    let methods = raw
        .methods
        .iter()
        .map(|m| method_descriptor(&raw.name, m, false))
        .collect();
    Declaration::Enum {
        entity: EnumEntity {
            name: raw.name.clone(),
            constants: raw.constants.clone(),
        },
        methods,
    }
}

fn build_class(raw: &RawClass) -> ClassDeclaration {
    let name = raw.name.clone();
    let kind = if raw.is_interface {
        ClassKind::Interface
    } else if raw.modifiers.is_abstract {
        ClassKind::AbstractClass
    } else {
        ClassKind::Class
    };

    let mut entity = ClassEntity::new(name.clone(), kind);
    entity.annotations = raw.annotations.clone();
    entity.comment = raw.javadoc.as_deref().map(javadoc_summary).unwrap_or_default();

    let mut uses = BTreeSet::new();
    let mut methods = Vec::new();

    for field in &raw.fields {
        let type_name = normalize_type(&field.type_text);
        if type_name != name {
            uses.insert(type_name.clone());
        }
        entity.fields.push(FieldDescriptor {
            visibility: visibility_of(&field.modifiers),
            annotations: field.annotations.clone(),
            type_name,
            name: field.name.clone(),
        });
    }

    for method in &raw.methods {
        let param_count = method.params.len();
        let kind = classify_method(&method.name, param_count, method.has_annotation("Override"));
        let signature = member_signature(method, Some(kind));
        match kind {
            MethodKind::Accessor => entity.accessors.push(signature),
            MethodKind::User => entity.user_methods.push(signature),
            MethodKind::Framework { .. } | MethodKind::Override => {
                entity.framework_methods.push(signature)
            }
        }

        if let Some(body) = &method.body {
            for site in &body.sites {
                if let RawSite::Construction { type_text, .. } = site {
                    let constructed = normalize_type(type_text);
                    if constructed != name {
                        uses.insert(constructed);
                    }
                }
            }
        }
        methods.push(method_descriptor(&name, method, false));
    }

    for ctor in &raw.constructors {
        entity.constructors.push(member_signature(ctor, None));
        methods.push(method_descriptor(&name, ctor, true));
    }

    ClassDeclaration {
        entity,
        uses,
        extends: raw.extends.iter().map(|t| normalize_type(t)).collect(),
        implements: raw.implements.iter().map(|t| normalize_type(t)).collect(),
        methods,
    }
}

fn member_signature(method: &RawMethod, kind: Option<MethodKind>) -> MemberSignature {
    MemberSignature {
        visibility: visibility_of(&method.modifiers),
        annotations: method.annotations.clone(),
        return_type: method.return_type.as_deref().map(normalize_type),
        name: method.name.clone(),
        params: method
            .params
            .iter()
            .map(|p| Parameter {
                type_name: normalize_type(&p.type_text),
                name: p.name.clone(),
            })
            .collect(),
        kind,
    }
}

fn method_descriptor(owner: &str, method: &RawMethod, is_constructor: bool) -> MethodDescriptor {
    let return_type = match &method.return_type {
        Some(ret) => normalize_type(ret),
        None => owner.to_string(),
    };

    let (calls, flow_patterns) = match &method.body {
        Some(body) => (
            body.sites.iter().map(call_record).collect(),
            detect_flow_patterns(&body.text, method.modifiers.is_synchronized),
        ),
        None => (
            Vec::new(),
            detect_flow_patterns("", method.modifiers.is_synchronized),
        ),
    };

    MethodDescriptor {
        owner: owner.to_string(),
        name: method.name.clone(),
        return_type,
        param_types: method.params.iter().map(|p| normalize_type(&p.type_text)).collect(),
        visibility: visibility_of(&method.modifiers),
        is_constructor,
        is_static: method.modifiers.is_static,
        flow_patterns,
        calls,
    }
}

/// Lexical target resolution: the first `.`-segment of the receiver text, or
/// [`SELF_TARGET`] without a receiver. Chained calls and variables are
/// misattributed; no type information is used.
pub fn call_record(site: &RawSite) -> CallRecord {
    match site {
        RawSite::Construction { type_text, line } => {
            let constructed = normalize_type(type_text);
            CallRecord::new(constructed.clone(), constructed, CallKind::Construction, *line)
        }
        RawSite::Call {
            receiver,
            name,
            line,
        } => {
            let target = receiver
                .as_deref()
                .map(|r| r.split('.').next().unwrap_or(r).trim())
                .unwrap_or(SELF_TARGET);
            CallRecord::new(target, name.clone(), CallKind::InstanceCall, *line)
        }
    }
}

fn visibility_of(m: &Modifiers) -> Visibility {
    Visibility::from_modifiers(m.is_private, m.is_public, m.is_protected)
}

pub fn join_annotations(annotations: &[String]) -> String {
    annotations
        .iter()
        .map(|a| format!("@{a}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Description part of a Javadoc comment: everything before the first block
/// tag, with comment markers and leading `*` removed.
pub fn javadoc_summary(raw: &str) -> String {
    let inner = raw
        .trim()
        .trim_start_matches("/**")
        .trim_start_matches("/*")
        .trim_end_matches("*/");

    let mut lines = Vec::new();
    for line in inner.lines() {
        let line = line.trim().trim_start_matches('*').trim();
        if line.starts_with('@') {
            break;
        }
        lines.push(line);
    }

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
