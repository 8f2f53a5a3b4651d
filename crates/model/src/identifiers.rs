//! Newtype identifiers for objects the service reads and writes.
//!
//! The service addresses everything through plain strings on the wire. Each
//! kind of string gets its own newtype so that, for example, a
//! [`WorkspaceName`] cannot be passed where an [`ObjectRef`] is expected.
//! All of them serialize transparently as the bare string.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), into_string(),
// Display. `Default` is the empty string; it only exists for struct-update
// syntax on parameter types and is never a valid identifier.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier and returns the owned string.
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// A workspace object reference: `"ws/obj"` or `"ws/obj/ver"`, where each
    /// part is either a name or a numeric id.
    ///
    /// Returned by every operation that saves a new object.
    ObjectRef
}

string_id! {
    /// Name of a workspace that output objects are saved into.
    WorkspaceName
}

string_id! {
    /// Name of a single object within a workspace.
    ObjectName
}

string_id! {
    /// Identifier of a file held in the blob store (Shock node id).
    ShockId
}

string_id! {
    /// Identifier of a genome feature (a matrix row id).
    FeatureId
}

impl ObjectRef {
    /// Builds a reference from a workspace name and an object name.
    pub fn from_parts(workspace: &WorkspaceName, object: &ObjectName) -> Self {
        Self(format!("{workspace}/{object}"))
    }

    /// Splits the reference into its `/`-separated parts.
    ///
    /// Returns `None` unless there are two or three non-empty parts.
    pub fn parts(&self) -> Option<(&str, &str, Option<&str>)> {
        let mut it = self.0.split('/');
        let ws = it.next().filter(|s| !s.is_empty())?;
        let obj = it.next().filter(|s| !s.is_empty())?;
        let ver = match it.next() {
            Some(v) if !v.is_empty() => Some(v),
            Some(_) => return None,
            None => None,
        };
        if it.next().is_some() {
            return None;
        }
        Some((ws, obj, ver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_rejected() {
        assert!(ObjectRef::new("").is_none());
        assert!(WorkspaceName::new(String::new()).is_none());
        assert_eq!(ShockId::new("abc").map(ShockId::into_string), Some("abc".to_string()));
    }

    #[test]
    fn object_ref_parts() {
        let r = ObjectRef::new("12/7/3").unwrap();
        assert_eq!(r.parts(), Some(("12", "7", Some("3"))));

        let r = ObjectRef::new("my_ws/matrix").unwrap();
        assert_eq!(r.parts(), Some(("my_ws", "matrix", None)));

        assert_eq!(ObjectRef::new("only").unwrap().parts(), None);
        assert_eq!(ObjectRef::new("a/b/c/d").unwrap().parts(), None);
        assert_eq!(ObjectRef::new("a//c").unwrap().parts(), None);
    }

    #[test]
    fn from_parts_joins_with_slash() {
        let ws = WorkspaceName::new("test_ws").unwrap();
        let obj = ObjectName::new("expr").unwrap();
        assert_eq!(ObjectRef::from_parts(&ws, &obj).as_str(), "test_ws/expr");
    }

    #[test]
    fn serializes_as_bare_string() {
        let r = ObjectRef::new("1/2/3").unwrap();
        assert_eq!(serde_json::to_string(&r).unwrap(), "\"1/2/3\"");
        let back: ObjectRef = serde_json::from_str("\"1/2/3\"").unwrap();
        assert_eq!(back, r);
    }
}
