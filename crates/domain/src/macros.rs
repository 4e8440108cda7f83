//! String conversions for configuration enums
//!
//! Enums read from environment variables and config files declare their
//! string form once. Parsing trims surrounding whitespace, ignores case and
//! treats `-` like `_`, so `Abort-On-First-Failure` matches
//! `abort_on_first_failure`.
//!
//! # Example
//!
//! ```rust
//! use cachestorm_domain::impl_config_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum LocatorMode {
//!     Registered,
//!     Program,
//! }
//!
//! impl_config_enum_conversions!(LocatorMode {
//!     Registered => "registered",
//!     Program => "program",
//! });
//!
//! assert_eq!(" Program ".parse::<LocatorMode>().unwrap(), LocatorMode::Program);
//! ```

/// Implements `Display`, `FromStr` and `as_str` for a configuration enum.
///
/// Parse failures return [`InvalidConfig`](crate::InvalidConfig) listing the
/// accepted values.
#[macro_export]
macro_rules! impl_config_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical configuration spelling
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::InvalidConfig;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
                match normalized.as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err($crate::InvalidConfig(format!(
                        "unknown {} '{}', expected one of: {}",
                        stringify!($enum_name),
                        s.trim(),
                        [$($str),+].join(", ")
                    ))),
                }
            }
        }
    };
}
