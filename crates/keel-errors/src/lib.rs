//! The closed diagnostic catalogue shared by every stage of the pipeline.
//!
//! A [`Diagnostic`] is plain data: a code, the text range it points at and the
//! ordered arguments for its message template. Formatting happens late, either
//! through [`Diagnostic::message`] or the annotated [`Diagnostic::render`].

use std::fmt;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::{TextRange, TextSize};

macro_rules! error_codes {
    ($($name:ident = $id:literal => $template:literal,)*) => {
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
        pub enum ErrorCode {
            $($name,)*
        }

        impl ErrorCode {
            pub const ALL: &'static [Self] = &[$(Self::$name,)*];

            /// Numeric identifier, rendered as `CS{id:04}`.
            pub const fn number(self) -> u16 {
                match self {
                    $(Self::$name => $id,)*
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }

            /// Message template with positional `{0}`, `{1}`, ... slots.
            pub const fn template(self) -> &'static str {
                match self {
                    $(Self::$name => $template,)*
                }
            }
        }
    };
}

error_codes! {
    BadMemberProtection = 107 => "More than one protection modifier",
    BadForeachDecl = 230 => "Type and identifier are both required in a foreach statement",
    AddRemoveMustHaveBody = 73 => "An add or remove accessor must have a body",
    ConstraintOnlyAllowedOnGenericDecl = 80 => "Constraints are not allowed on non-generic declarations",
    TypeConstraintsMustBeUniqueAndFirst = 449 => "The 'class' or 'struct' constraint must come before any other constraints",
    InvalidAnonymousTypeMemberDeclarator = 746 => "Invalid anonymous type member declarator. Anonymous type members must be declared with a member assignment, simple name or member access.",
    IdentifierExpected = 1001 => "Identifier expected",
    SemicolonExpected = 1002 => "; expected",
    SyntaxError = 1003 => "Syntax error, '{0}' expected",
    DuplicateModifier = 1004 => "Duplicate '{0}' modifier",
    DuplicateAccessor = 1007 => "Property accessor already defined",
    GetOrSetExpected = 1014 => "A get or set accessor expected",
    TooManyCatches = 1017 => "Catch clauses cannot follow the general catch clause of a try statement",
    ThisOrBaseExpected = 1018 => "Keyword 'this' or 'base' expected",
    OvlUnaryOperatorExpected = 1019 => "Overloadable unary operator expected",
    OvlBinaryOperatorExpected = 1020 => "Overloadable binary operator expected",
    EOFExpected = 1022 => "Type or namespace definition, or end-of-file expected",
    CloseParenExpected = 1026 => ") expected",
    TypeExpected = 1031 => "Type expected",
    OvlOperatorExpected = 1037 => "Overloadable operator expected",
    IdentifierExpectedKW = 1041 => "Identifier expected; '{1}' is a keyword",
    SemiOrLBraceExpected = 1043 => "{ or ; expected",
    AddOrRemoveExpected = 1055 => "An add or remove accessor expected",
    RbraceExpected = 1513 => "} expected",
    LbraceExpected = 1514 => "{ expected",
    InExpected = 1515 => "'in' expected",
    InvalidMemberDecl = 1519 => "Invalid token '{0}' in class, record, struct, or interface member declaration",
    ExpectedEndTry = 1524 => "Expected catch or finally",
    BadVarDecl = 1528 => "Expected ; or = (cannot specify constructor arguments in declaration)",
    InvalidExprTerm = 1525 => "Invalid expression term '{0}'",
    BadOperatorSyntax = 1553 => "Declaration is not valid; use '{0} operator <dest-type> (...' instead",
    NoModifiersOnAccessor = 1609 => "Modifiers cannot be placed on event accessor declarations",
    FeatureIsExperimental = 8058 => "Feature '{0}' is experimental and unsupported; use '/features:{1}' to enable.",
    InsufficientStack = 8078 => "An expression is too long or complex to compile",
    FeatureNotAvailableInVersion = 8107 => "Feature '{0}' is not available in C# {1}. Please use language version {2} or greater.",
}

impl ErrorCode {
    /// Only a fatal diagnostic ends a parse early.
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::InsufficientStack)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CS{:04}", self.number())
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Diagnostic {
    code: ErrorCode,
    range: TextRange,
    args: Box<[Box<str>]>,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, range: TextRange) -> Self {
        Self { code, range, args: Box::default() }
    }

    pub fn with_args<I>(code: ErrorCode, range: TextRange, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Box<str>>,
    {
        Self { code, range, args: args.into_iter().map(Into::into).collect() }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn args(&self) -> impl ExactSizeIterator<Item = &str> {
        self.args.iter().map(AsRef::as_ref)
    }

    /// The template with every `{n}` slot replaced by its argument.
    ///
    /// Slots without a matching argument are kept verbatim.
    pub fn message(&self) -> String {
        let template = self.code.template();
        let mut message = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            message.push_str(&rest[..open]);
            rest = &rest[open..];

            let slot = rest[1..]
                .find('}')
                .and_then(|close| Some((close, rest[1..=close].parse::<usize>().ok()?)));

            match slot.and_then(|(close, index)| Some((close, self.args.get(index)?))) {
                Some((close, arg)) => {
                    message.push_str(arg);
                    rest = &rest[close + 2..];
                }
                None => {
                    message.push('{');
                    rest = &rest[1..];
                }
            }
        }

        message.push_str(rest);
        message
    }

    pub fn render(&self, renderer: &Renderer, path: &str, text: &str) -> String {
        let title = format!("{}: {}", self.code, self.message());
        let message = Level::Error.title(&title).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range.into()).label("here"))
                .fold(true),
        );
        renderer.render(message).to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error {}: {}", self.code, self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn codes_render_with_prefix() {
        assert_eq!(ErrorCode::IdentifierExpected.to_string(), "CS1001");
        assert_eq!(ErrorCode::AddRemoveMustHaveBody.to_string(), "CS0073");
    }

    #[test]
    fn numbers_are_unique() {
        let mut numbers = ErrorCode::ALL.iter().map(|code| code.number()).collect::<Vec<_>>();
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), ErrorCode::ALL.len());
    }

    #[test]
    fn message_interpolates_arguments() {
        let diagnostic = Diagnostic::with_args(ErrorCode::SyntaxError, at(3, 4), [":", ","]);
        assert_eq!(diagnostic.message(), "Syntax error, ':' expected");

        let diagnostic = Diagnostic::with_args(
            ErrorCode::FeatureNotAvailableInVersion,
            at(0, 6),
            ["records", "8", "9"],
        );
        assert_eq!(
            diagnostic.message(),
            "Feature 'records' is not available in C# 8. Please use language version 9 or greater."
        );
    }

    #[test]
    fn missing_argument_keeps_slot() {
        let diagnostic = Diagnostic::new(ErrorCode::InvalidExprTerm, at(0, 0));
        assert_eq!(diagnostic.message(), "Invalid expression term '{0}'");
    }

    #[test]
    fn literal_braces_and_later_slots() {
        let diagnostic = Diagnostic::new(ErrorCode::SemiOrLBraceExpected, at(0, 1));
        assert_eq!(diagnostic.message(), "{ or ; expected");

        let diagnostic =
            Diagnostic::with_args(ErrorCode::IdentifierExpectedKW, at(0, 8), ["", "operator"]);
        assert_eq!(diagnostic.message(), "Identifier expected; 'operator' is a keyword");
    }

    #[test]
    fn render_points_at_range() {
        let text = "class {}\n";
        let diagnostic = Diagnostic::new(ErrorCode::IdentifierExpected, at(6, 7));
        let renderer = Renderer::plain();
        let rendered = diagnostic.render(&renderer, "main.cs", text);

        assert!(rendered.contains("CS1001: Identifier expected"), "{rendered}");
        assert!(rendered.contains("main.cs"), "{rendered}");
    }
}
