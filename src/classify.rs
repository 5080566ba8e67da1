use serde::Serialize;
use std::fmt;

/// Access level of a field, method or constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    Private,
    Public,
    Protected,
    Package,
}

impl Visibility {
    /// Exactly one visibility per member; `private` wins over `public`, which
    /// wins over `protected`. No modifier means package-private.
    pub fn from_modifiers(is_private: bool, is_public: bool, is_protected: bool) -> Self {
        if is_private {
            Self::Private
        } else if is_public {
            Self::Public
        } else if is_protected {
            Self::Protected
        } else {
            Self::Package
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Private => "🔒",
            Self::Public => "🟢",
            Self::Protected => "🛡️",
            Self::Package => "~",
        }
    }

    /// Fields mark package-private access with `🅾️`; methods and
    /// constructors use `~`.
    pub fn field_glyph(self) -> &'static str {
        match self {
            Self::Package => "🅾️",
            other => other.glyph(),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum MethodKind {
    /// `getX()` / `isX()` with no parameters, or `setX(..)` with at least one.
    Accessor,
    /// `toString`, `hashCode` or `equals`.
    Framework { overridden: bool },
    /// `@Override` on anything outside the framework set.
    Override,
    User,
}

impl MethodKind {
    /// Prefix shown in front of the signature in the class diagram.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Accessor => "🔘",
            Self::Framework { overridden: true } => "🔁🏛",
            Self::Framework { overridden: false } => "🏛",
            Self::Override => "🔁",
            Self::User => "🛠",
        }
    }
}

const FRAMEWORK_METHODS: [&str; 3] = ["toString", "hashCode", "equals"];

pub fn classify_method(name: &str, param_count: usize, is_override: bool) -> MethodKind {
    if is_accessor(name, param_count) {
        return MethodKind::Accessor;
    }
    if FRAMEWORK_METHODS.contains(&name) {
        return MethodKind::Framework {
            overridden: is_override,
        };
    }
    if is_override {
        return MethodKind::Override;
    }
    MethodKind::User
}

pub fn is_accessor(name: &str, param_count: usize) -> bool {
    if param_count > 0 {
        name.starts_with("set")
    } else {
        name.starts_with("get") || name.starts_with("is")
    }
}
