//! Macro for implementing Display and FromStr for unit-variant enums
//!
//! Used by the configuration and job-state enums so that their textual form
//! (config files, environment variables, log fields) stays in one place.
//!
//! # Example
//!
//! ```rust
//! use activity_export_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum RunStatus {
//!     Pending,
//!     Done,
//! }
//!
//! impl_domain_status_conversions!(RunStatus {
//!     Pending => "pending",
//!     Done => "done",
//! });
//!
//! assert_eq!(RunStatus::Done.to_string(), "done");
//! assert_eq!("PENDING".parse::<RunStatus>(), Ok(RunStatus::Pending));
//! ```

/// Implements Display and FromStr traits for unit-variant enums
///
/// - Display writes the mapped lowercase string
/// - FromStr parses case-insensitively, surrounding whitespace ignored
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
