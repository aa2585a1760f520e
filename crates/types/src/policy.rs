//! Policy switches for comparison and fetching

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What to do with archive entries that are not valid UTF-8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodePolicy {
    /// Fail the whole comparison for the version
    Strict,
    /// Keep the bytes and report the path as differing unless both sides are identical
    MarkDifferent,
}

impl Default for DecodePolicy {
    fn default() -> Self {
        Self::Strict
    }
}

/// How an entry path is anchored to the package root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathMatch {
    /// A whole path segment must equal the package name
    Segment,
    /// `"{package}/"` may appear anywhere in the path, even inside another segment
    Substring,
}

impl Default for PathMatch {
    fn default() -> Self {
        Self::Segment
    }
}

/// Which registry client enumerates versions and downloads artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistryBackend {
    /// Registry JSON API over HTTP
    Api,
    /// The local `pip` executable
    Pip,
}

impl Default for RegistryBackend {
    fn default() -> Self {
        Self::Api
    }
}

macro_rules! string_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    other => Err(other.to_string()),
                }
            }
        }

        impl clap::ValueEnum for $ty {
            fn value_variants<'a>() -> &'a [Self] {
                &[$(Self::$variant),+]
            }

            fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
                Some(clap::builder::PossibleValue::new(self.as_str()))
            }
        }
    };
}

string_enum!(DecodePolicy {
    Strict => "strict",
    MarkDifferent => "mark-different",
});

string_enum!(PathMatch {
    Segment => "segment",
    Substring => "substring",
});

string_enum!(RegistryBackend {
    Api => "api",
    Pip => "pip",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip_names() {
        assert_eq!("mark-different".parse(), Ok(DecodePolicy::MarkDifferent));
        assert_eq!("substring".parse(), Ok(PathMatch::Substring));
        assert_eq!("pip".parse(), Ok(RegistryBackend::Pip));
        assert_eq!("bogus".parse::<PathMatch>(), Err("bogus".to_string()));
    }

    #[test]
    fn test_serde_names_match_display() {
        let json = serde_json::to_string(&DecodePolicy::MarkDifferent).unwrap();
        assert_eq!(json, "\"mark-different\"");
        assert_eq!(PathMatch::default().to_string(), "segment");
    }
}
