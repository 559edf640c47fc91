//! Macro for implementing Display and FromStr for small domain enums
//!
//! Scheduled-job kinds and similar enums are persisted and logged as
//! lowercase strings. This macro derives both conversions from one table.
//!
//! # Example
//!
//! ```rust
//! use liftoff_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Phase {
//!     Foreground,
//!     Background,
//! }
//!
//! impl_domain_enum_conversions!(Phase {
//!     Foreground => "foreground",
//!     Background => "background",
//! });
//!
//! assert_eq!(Phase::Background.to_string(), "background");
//! ```

/// Implements Display and FromStr for a fieldless enum.
///
/// Parsing is case-insensitive; display always uses the table spelling.
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
