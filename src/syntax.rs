//! Structured syntax handed over by the parser for one source unit.
//!
//! Everything here is raw source text: types are not normalized and members
//! are not classified. That happens in [`crate::model`].

use crate::error::DeclarationError;

#[derive(Debug, Clone, Default)]
pub struct SyntaxUnit {
    pub origin: String,
    pub declarations: Vec<Result<RawDeclaration, DeclarationError>>,
}

#[derive(Debug, Clone)]
pub enum RawDeclaration {
    Class(RawClass),
    Enum(RawEnum),
}

impl RawDeclaration {
    pub fn name(&self) -> &str {
        match self {
            Self::Class(c) => &c.name,
            Self::Enum(e) => &e.name,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub is_public: bool,
    pub is_private: bool,
    pub is_protected: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_synchronized: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RawClass {
    pub name: String,
    pub is_interface: bool,
    pub modifiers: Modifiers,
    /// Annotation names without the leading `@`.
    pub annotations: Vec<String>,
    pub javadoc: Option<String>,
    /// Superclass for classes, extended interfaces for interfaces.
    pub extends: Vec<String>,
    pub implements: Vec<String>,
    pub fields: Vec<RawField>,
    pub methods: Vec<RawMethod>,
    pub constructors: Vec<RawMethod>,
    pub line: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RawEnum {
    pub name: String,
    pub constants: Vec<String>,
    pub methods: Vec<RawMethod>,
    pub line: usize,
}

/// One declared variable; `private int a, b;` yields two fields.
#[derive(Debug, Clone, Default)]
pub struct RawField {
    pub modifiers: Modifiers,
    pub annotations: Vec<String>,
    pub type_text: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct RawParam {
    pub type_text: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct RawMethod {
    pub name: String,
    pub modifiers: Modifiers,
    pub annotations: Vec<String>,
    /// `None` for constructors.
    pub return_type: Option<String>,
    pub params: Vec<RawParam>,
    pub body: Option<RawBody>,
    pub line: usize,
}

impl RawMethod {
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a == name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RawBody {
    pub text: String,
    /// Calls and `new` expressions in source order.
    pub sites: Vec<RawSite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSite {
    Call {
        receiver: Option<String>,
        name: String,
        line: usize,
    },
    Construction {
        type_text: String,
        line: usize,
    },
}
