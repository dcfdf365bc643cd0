//! Typed, named component variables.

use core::fmt;
use core::hash::{Hash, Hasher};

use crate::ids::ComponentId;
use crate::value::ValueKind;

/// A typed input or output variable of a registered component.
///
/// Identity is the `(component, variable)` pair; the kind is derived
/// metadata (each variable has exactly one kind), so equality and hashing
/// deliberately ignore it. Immutable once created. Obtain ports through the
/// master, which validates the variable against the component's backend and
/// fills in the kind.
#[derive(Debug, Clone, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Port {
    component: ComponentId,
    variable: String,
    kind: ValueKind,
}

impl Port {
    /// Create a port handle.
    pub fn new(component: ComponentId, variable: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            component,
            variable: variable.into(),
            kind,
        }
    }

    /// The component this variable belongs to.
    pub fn component(&self) -> ComponentId {
        self.component
    }

    /// The variable name within the component.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// The value kind this port carries.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }
}

// Structural identity over (component, variable) only; see type docs.
impl PartialEq for Port {
    fn eq(&self, other: &Self) -> bool {
        self.component == other.component && self.variable == other.variable
    }
}

impl Hash for Port {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.component.hash(state);
        self.variable.hash(state);
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.component, self.variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identity_ignores_kind() {
        let c = ComponentId::from_index(0);
        let a = Port::new(c, "x", ValueKind::Real);
        let b = Port::new(c, "x", ValueKind::Integer);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    proptest::proptest! {
        #[test]
        fn identity_ignores_kind_for_any_variable(idx in 0u32..10_000, name in "[a-z_]{1,16}") {
            let c = ComponentId::from_index(idx);
            let a = Port::new(c, name.clone(), ValueKind::Real);
            let b = Port::new(c, name, ValueKind::Boolean);
            proptest::prop_assert_eq!(&a, &b);
        }
    }

    #[test]
    fn identity_distinguishes_component_and_variable() {
        let c0 = ComponentId::from_index(0);
        let c1 = ComponentId::from_index(1);
        assert_ne!(
            Port::new(c0, "x", ValueKind::Real),
            Port::new(c1, "x", ValueKind::Real)
        );
        assert_ne!(
            Port::new(c0, "x", ValueKind::Real),
            Port::new(c0, "y", ValueKind::Real)
        );
    }
}
