//! Full-name helpers.

/// `scope.name`, or just `name` at the root (empty package).
pub(crate) fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

/// Scope that an enum's values live in: the enum's own enclosing scope.
/// `pkg.Outer.Kind` → `pkg.Outer`, `Kind` → ``.
pub(crate) fn enum_value_scope(enum_full_name: &str) -> &str {
    enum_full_name
        .rsplit_once('.')
        .map(|(scope, _)| scope)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualify_skips_empty_scope() {
        assert_eq!(qualify("", "Foo"), "Foo");
        assert_eq!(qualify("a.b", "Foo"), "a.b.Foo");
    }

    #[test]
    fn enum_values_are_siblings_of_their_enum() {
        assert_eq!(enum_value_scope("pkg.Outer.Kind"), "pkg.Outer");
        assert_eq!(enum_value_scope("pkg.Kind"), "pkg");
        assert_eq!(enum_value_scope("Kind"), "");
    }
}
