//! Opaque identifiers
//!
//! Both the document store and the auth provider hand out string ids whose
//! structure is their own business. The domain only compares and prints them.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw id string
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw id string
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Get the inner String value
            #[inline]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Check if the id is empty (never assigned)
            #[inline]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

opaque_id!(
    /// Id of a stored document, assigned by the store on creation
    DocumentId
);

opaque_id!(
    /// Stable principal id of an authenticated user
    IdentityId
);
