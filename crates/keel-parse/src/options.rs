//! Language version and feature gates consulted by the grammar.

use std::fmt;
use std::str::FromStr;

use keel_errors::{Diagnostic, ErrorCode, TextRange};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("unknown language version `{0}`")]
    UnknownVersion(String),
    #[error("unknown feature `{0}`")]
    UnknownFeature(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LanguageVersion {
    V1 = 1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
    V9,
    V10,
    V11,
    V12,
    Preview,
}

impl LanguageVersion {
    pub const LATEST: Self = Self::V12;

    const ALL: [Self; 13] = [
        Self::V1,
        Self::V2,
        Self::V3,
        Self::V4,
        Self::V5,
        Self::V6,
        Self::V7,
        Self::V8,
        Self::V9,
        Self::V10,
        Self::V11,
        Self::V12,
        Self::Preview,
    ];
}

impl Default for LanguageVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preview => f.write_str("preview"),
            version => write!(f, "{}", *version as u8),
        }
    }
}

impl FromStr for LanguageVersion {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" | "default" => Ok(Self::LATEST),
            "preview" => Ok(Self::Preview),
            _ => Self::ALL
                .into_iter()
                .find(|version| version.to_string() == s)
                .ok_or_else(|| OptionsError::UnknownVersion(s.to_owned())),
        }
    }
}

macro_rules! features {
    ($($variant:ident => $key:literal, $name:literal, $since:expr;)*) => {
        /// A construct that only some language versions accept.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Feature {
            $($variant,)*
        }

        impl Feature {
            pub const ALL: &[Self] = &[$(Self::$variant,)*];

            /// The command-line spelling, e.g. `local-functions`.
            pub const fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)*
                }
            }

            /// The name used in diagnostics.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// `None` for experimental features, which no version enables.
            pub const fn required_version(self) -> Option<LanguageVersion> {
                match self {
                    $(Self::$variant => $since,)*
                }
            }
        }
    };
}

use LanguageVersion::*;

features! {
    PartialTypes => "partial-types", "partial types", Some(V2);
    ObjectInitializer => "object-initializer", "object initializer", Some(V3);
    CollectionInitializer => "collection-initializer", "collection initializer", Some(V3);
    AnonymousTypes => "anonymous-types", "anonymous types", Some(V3);
    ImplicitArray => "implicit-array", "implicitly typed array", Some(V3);
    Lambda => "lambda", "lambda expression", Some(V3);
    NamedArgument => "named-argument", "named argument", Some(V4);
    OptionalParameter => "optional-parameter", "optional parameter", Some(V4);
    ExpressionBodiedMethod => "expression-bodied-method", "expression-bodied method", Some(V6);
    ExpressionBodiedProperty =>
        "expression-bodied-property", "expression-bodied property", Some(V6);
    AutoPropertyInitializer =>
        "auto-property-initializer", "auto property initializer", Some(V6);
    ExceptionFilter => "exception-filter", "exception filter", Some(V6);
    NullPropagatingOperator =>
        "null-propagating-operator", "null propagating operator", Some(V6);
    InterpolatedStrings => "interpolated-strings", "interpolated strings", Some(V6);
    Records => "records", "records", Some(V9);
    InitOnlySetters => "init-only-setters", "init-only setters", Some(V9);
    RecordStructs => "record-structs", "record structs", Some(V10);
    FileScopedNamespace => "file-scoped-namespace", "file-scoped namespace", Some(V10);
    GlobalUsingDirective => "global-using-directive", "global using directive", Some(V10);
    FileTypes => "file-types", "file types", Some(V11);
    RequiredMembers => "required-members", "required members", Some(V11);
    PrimaryConstructors => "primary-constructors", "primary constructors", Some(V12);
    LocalFunctions => "local-functions", "local functions", None;
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Feature {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|feature| feature.key() == s)
            .ok_or_else(|| OptionsError::UnknownFeature(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    pub language_version: LanguageVersion,
    /// Experimental features switched on explicitly.
    pub experimental: Vec<Feature>,
    /// Maximum nesting of statements, expressions, types and members.
    pub max_depth: u32,
}

impl ParseOptions {
    pub const DEFAULT_MAX_DEPTH: u32 = 256;

    pub fn with_version(mut self, language_version: LanguageVersion) -> Self {
        self.language_version = language_version;
        self
    }

    pub fn with_experimental(mut self, feature: Feature) -> Self {
        if !self.experimental.contains(&feature) {
            self.experimental.push(feature);
        }
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The diagnostic for using `feature` at `range`, if these options do
    /// not allow it.
    pub fn check(&self, feature: Feature, range: TextRange) -> Option<Diagnostic> {
        match feature.required_version() {
            Some(required) if self.language_version < required => Some(Diagnostic::with_args(
                ErrorCode::FeatureNotAvailableInVersion,
                range,
                [
                    feature.name().to_owned(),
                    self.language_version.to_string(),
                    required.to_string(),
                ],
            )),
            Some(_) => None,
            None if self.experimental.contains(&feature) => None,
            None => Some(Diagnostic::with_args(
                ErrorCode::FeatureIsExperimental,
                range,
                [feature.name(), feature.key()],
            )),
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            language_version: LanguageVersion::default(),
            experimental: Vec::new(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use keel_errors::TextSize;

    use super::*;

    #[test]
    fn versions_round_trip_through_strings() {
        for version in LanguageVersion::ALL {
            assert_eq!(version.to_string().parse::<LanguageVersion>(), Ok(version));
        }
        assert_eq!("latest".parse(), Ok(LanguageVersion::LATEST));
        assert_eq!(
            "13".parse::<LanguageVersion>(),
            Err(OptionsError::UnknownVersion("13".to_owned()))
        );
    }

    #[test]
    fn features_parse_from_keys() {
        assert_eq!("local-functions".parse(), Ok(Feature::LocalFunctions));
        assert!("generators".parse::<Feature>().is_err());
    }

    #[test]
    fn version_gate() {
        let range = TextRange::empty(TextSize::new(0));
        let options = ParseOptions::default().with_version(LanguageVersion::V8);

        let diagnostic = options.check(Feature::Records, range).unwrap();
        assert_eq!(diagnostic.code(), ErrorCode::FeatureNotAvailableInVersion);
        assert_eq!(diagnostic.args().collect::<Vec<_>>(), ["records", "8", "9"]);

        assert!(options.check(Feature::Lambda, range).is_none());
    }

    #[test]
    fn experimental_gate() {
        let range = TextRange::empty(TextSize::new(0));
        let options = ParseOptions::default();

        let diagnostic = options.check(Feature::LocalFunctions, range).unwrap();
        assert_eq!(diagnostic.code(), ErrorCode::FeatureIsExperimental);
        assert_eq!(diagnostic.args().collect::<Vec<_>>(), ["local functions", "local-functions"]);

        let options = options.with_experimental(Feature::LocalFunctions);
        assert!(options.check(Feature::LocalFunctions, range).is_none());
    }
}
