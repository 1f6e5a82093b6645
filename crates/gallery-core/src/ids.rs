//! Typed ID wrappers providing compile-time safety for entity identifiers.
//!
//! Each ID type is a newtype over the `i64` row id used by the record store,
//! preventing accidental misuse (e.g. passing a `BloggerId` where a
//! `PictureId` is expected).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Generate a newtype ID wrapper over `i64`.
///
/// The macro produces a struct with:
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`,
///   `Serialize`, `Deserialize`
/// - `Display` and `FromStr` delegating to the inner integer
/// - `From<i64>` and `Into<i64>` conversions
macro_rules! typed_id {
    ($($(#[doc = $doc:expr])* $name:ident),+ $(,)?) => {
        $(
            $(#[doc = $doc])*
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(i64);

            impl $name {
                /// Return the inner integer value.
                #[must_use]
                pub fn get(&self) -> i64 {
                    self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = ParseIntError;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    s.trim().parse::<i64>().map(Self)
                }
            }

            impl From<i64> for $name {
                fn from(value: i64) -> Self {
                    Self(value)
                }
            }

            impl From<$name> for i64 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )+
    };
}

typed_id! {
    /// Identifier of a picture record, assigned by the record store.
    PictureId,
    /// Identifier of the blogger owning a picture.
    BloggerId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_i64() {
        let id = PictureId::from(42);
        let back: i64 = id.into();
        assert_eq!(back, 42);
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn display_and_from_str() {
        let id = BloggerId::from(7);
        let parsed: BloggerId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert_eq!(" 12 ".parse::<PictureId>().unwrap(), PictureId::from(12));
    }

    #[test]
    fn serde_is_transparent() {
        let id = PictureId::from(9);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "9");
        let back: PictureId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn invalid_from_str() {
        assert!("not-a-number".parse::<BloggerId>().is_err());
    }

    #[test]
    fn ordering_follows_inner_value() {
        assert!(PictureId::from(1) < PictureId::from(2));
    }
}
