//! Fixed allowlist of standard-library and framework types that never show up
//! as sequence participants. Names missing from the list are treated as user
//! classes.

const LIBRARY_PREFIXES: [&str; 4] = ["java.", "javax.", "org.springframework.", "com.fasterxml."];

const LIBRARY_NAMES: [&str; 19] = [
    "String",
    "Object",
    "System",
    "StringBuilder",
    "StringBuffer",
    "ArrayList",
    "HashMap",
    "LinkedList",
    "HashSet",
    "TreeSet",
    "List",
    "Map",
    "Set",
    "Collection",
    "Optional",
    "Stream",
    "Logger",
    "Exception",
    "RuntimeException",
];

/// Method names inherited from `Object` that are never useful entry points.
pub const SYSTEM_METHODS: [&str; 8] = [
    "toString",
    "hashCode",
    "equals",
    "clone",
    "finalize",
    "wait",
    "notify",
    "notifyAll",
];

pub fn is_library_class(name: &str) -> bool {
    if name.is_empty() {
        return true;
    }
    LIBRARY_PREFIXES.iter().any(|p| name.starts_with(p)) || LIBRARY_NAMES.contains(&name)
}

pub fn is_system_method(name: &str) -> bool {
    SYSTEM_METHODS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_prefixes_and_literal_names() {
        assert!(is_library_class("java.util.List"));
        assert!(is_library_class("org.springframework.beans.Bean"));
        assert!(is_library_class("StringBuilder"));
        assert!(is_library_class(""));
        assert!(!is_library_class("OrderService"));
        // Not on the list, so it leaks through.
        assert!(!is_library_class("ConcurrentHashMap"));
    }

    #[test]
    fn system_methods() {
        assert!(is_system_method("notifyAll"));
        assert!(!is_system_method("place"));
    }
}
