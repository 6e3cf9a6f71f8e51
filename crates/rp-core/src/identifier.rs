//! Macro for defining validated identifier newtypes.
//!
//! Query ids and warehouse codes end up in output file names and, for
//! warehouses, inside quoted filter literals. Each newtype carries a
//! validation function that decides which strings are acceptable; the
//! macro generates the shared trait impls around it.

/// Reject identifiers that cannot be used as part of a file name.
pub(crate) fn check_file_safe(s: &str) -> Result<(), &'static str> {
    if s.is_empty() {
        return Err("must not be empty");
    }
    if s.trim() != s {
        return Err("must not start or end with whitespace");
    }
    if s.chars().any(|c| c.is_control()) {
        return Err("must not contain control characters");
    }
    if s.contains(['/', '\\']) || s == "." || s == ".." {
        return Err("must not contain path separators");
    }
    Ok(())
}

/// Define a validated string newtype.
///
/// Generates:
/// - The struct with `Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize`
/// - Custom `Deserialize` that runs the validator
/// - `parse()` (returns the validator's reason on failure), `as_str()`, `into_inner()`
/// - `Display`, `AsRef<str>`, `Deref<Target=str>`, `Borrow<str>`
/// - `TryFrom<String>`, `TryFrom<&str>`
/// - `PartialEq<str>`, `PartialEq<&str>`
macro_rules! define_identifier {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
        validate = $check:path;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $Name::parse(s).map_err(|reason| {
                    serde::de::Error::custom(format!(concat!(stringify!($Name), " {}"), reason))
                })
            }
        }

        impl $Name {
            /// Validate and wrap a string.
            pub fn parse(value: impl Into<String>) -> Result<Self, &'static str> {
                let s = value.into();
                $check(&s)?;
                Ok(Self(s))
            }

            /// Return the underlying value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str { &self.0 }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str { &self.0 }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str { &self.0 }
        }

        impl TryFrom<String> for $Name {
            type Error = &'static str;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl TryFrom<&str> for $Name {
            type Error = &'static str;
            fn try_from(s: &str) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool { self.0 == other }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool { self.0 == *other }
        }
    };
}

pub(crate) use define_identifier;
