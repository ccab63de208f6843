#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u16)]
pub enum SyntaxKind {
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    LEFT_BRACE,
    RIGHT_BRACE,
    SEMICOLON,
    COMMA,
    DOT,
    COLON,
    COLON2,
    QUESTION,
    QUESTION2,
    QUESTION2_EQ,
    EQ,
    EQ2,
    NEQ,
    FAT_ARROW,
    THIN_ARROW,
    BANG,
    TILDE,
    PLUS,
    PLUS2,
    PLUS_EQ,
    MINUS,
    MINUS2,
    MINUS_EQ,
    STAR,
    STAR_EQ,
    SLASH,
    SLASH_EQ,
    PERCENT,
    PERCENT_EQ,
    AMP,
    AMP2,
    AMP_EQ,
    PIPE,
    PIPE2,
    PIPE_EQ,
    CARET,
    CARET_EQ,
    LT,
    LTEQ,
    SHL,
    SHL_EQ,
    GT,
    GTEQ,
    /// Only produced by the parser from two adjacent `>`.
    SHR,
    /// Only produced by the parser from an adjacent `>` and `>=`.
    SHR_EQ,

    ABSTRACT_KW,
    AS_KW,
    BASE_KW,
    BOOL_KW,
    BREAK_KW,
    BYTE_KW,
    CASE_KW,
    CATCH_KW,
    CHAR_KW,
    CHECKED_KW,
    CLASS_KW,
    CONST_KW,
    CONTINUE_KW,
    DECIMAL_KW,
    DEFAULT_KW,
    DELEGATE_KW,
    DO_KW,
    DOUBLE_KW,
    ELSE_KW,
    ENUM_KW,
    EVENT_KW,
    EXPLICIT_KW,
    EXTERN_KW,
    FALSE_KW,
    FINALLY_KW,
    FIXED_KW,
    FLOAT_KW,
    FOR_KW,
    FOREACH_KW,
    GOTO_KW,
    IF_KW,
    IMPLICIT_KW,
    IN_KW,
    INT_KW,
    INTERFACE_KW,
    INTERNAL_KW,
    IS_KW,
    LOCK_KW,
    LONG_KW,
    NAMESPACE_KW,
    NEW_KW,
    NULL_KW,
    OBJECT_KW,
    OPERATOR_KW,
    OUT_KW,
    OVERRIDE_KW,
    PARAMS_KW,
    PRIVATE_KW,
    PROTECTED_KW,
    PUBLIC_KW,
    READONLY_KW,
    REF_KW,
    RETURN_KW,
    SBYTE_KW,
    SEALED_KW,
    SHORT_KW,
    SIZEOF_KW,
    STACKALLOC_KW,
    STATIC_KW,
    STRING_KW,
    STRUCT_KW,
    SWITCH_KW,
    THIS_KW,
    THROW_KW,
    TRUE_KW,
    TRY_KW,
    TYPEOF_KW,
    UINT_KW,
    ULONG_KW,
    UNCHECKED_KW,
    UNSAFE_KW,
    USHORT_KW,
    USING_KW,
    VIRTUAL_KW,
    VOID_KW,
    VOLATILE_KW,
    WHILE_KW,

    IDENT,
    INT_NUMBER,
    FLOAT_NUMBER,
    CHAR_LITERAL,
    STRING_LITERAL,
    INTERPOLATED_STRING,

    UNKNOWN,
    EOF,

    COMPILATION_UNIT,
    USING_DIRECTIVE,
    NAME_EQUALS,
    NAMESPACE_DECL,
    FILE_SCOPED_NAMESPACE_DECL,
    ATTRIBUTE_LIST,
    ATTRIBUTE_TARGET,
    ATTRIBUTE,
    ATTRIBUTE_ARG_LIST,
    ATTRIBUTE_ARG,

    CLASS_DECL,
    STRUCT_DECL,
    INTERFACE_DECL,
    ENUM_DECL,
    RECORD_DECL,
    RECORD_STRUCT_DECL,
    DELEGATE_DECL,
    ENUM_MEMBER_DECL,
    TYPE_PARAM_LIST,
    TYPE_PARAM,
    PARAM_LIST,
    BRACKETED_PARAM_LIST,
    PARAM,
    EQUALS_VALUE_CLAUSE,
    BASE_LIST,
    SIMPLE_BASE_TYPE,
    PRIMARY_CTOR_BASE_TYPE,
    CONSTRAINT_CLAUSE,
    TYPE_CONSTRAINT,
    CLASS_OR_STRUCT_CONSTRAINT,
    CONSTRUCTOR_CONSTRAINT,

    FIELD_DECL,
    EVENT_FIELD_DECL,
    VARIABLE_DECL,
    VARIABLE_DECLARATOR,
    BRACKETED_ARG_LIST,
    PROPERTY_DECL,
    INDEXER_DECL,
    EVENT_DECL,
    ACCESSOR_LIST,
    GET_ACCESSOR,
    SET_ACCESSOR,
    INIT_ACCESSOR,
    ADD_ACCESSOR,
    REMOVE_ACCESSOR,
    UNKNOWN_ACCESSOR,
    ARROW_EXPR_CLAUSE,
    METHOD_DECL,
    CONSTRUCTOR_DECL,
    CONSTRUCTOR_INITIALIZER,
    DESTRUCTOR_DECL,
    OPERATOR_DECL,
    CONVERSION_OPERATOR_DECL,
    INCOMPLETE_MEMBER,

    IDENTIFIER_NAME,
    GENERIC_NAME,
    TYPE_ARG_LIST,
    QUALIFIED_NAME,
    ALIAS_QUALIFIED_NAME,
    PREDEFINED_TYPE,
    ARRAY_TYPE,
    ARRAY_RANK_SPECIFIER,
    OMITTED_ARRAY_SIZE_EXPR,
    NULLABLE_TYPE,
    POINTER_TYPE,
    TUPLE_TYPE,
    TUPLE_ELEMENT,

    BLOCK,
    EMPTY_STMT,
    LOCAL_DECL_STMT,
    LOCAL_FUNCTION_STMT,
    EXPR_STMT,
    IF_STMT,
    ELSE_CLAUSE,
    WHILE_STMT,
    DO_STMT,
    FOR_STMT,
    FOREACH_STMT,
    BREAK_STMT,
    CONTINUE_STMT,
    RETURN_STMT,
    THROW_STMT,
    GOTO_STMT,
    LABELED_STMT,
    YIELD_RETURN_STMT,
    YIELD_BREAK_STMT,
    TRY_STMT,
    CATCH_CLAUSE,
    CATCH_DECL,
    CATCH_FILTER,
    FINALLY_CLAUSE,
    SWITCH_STMT,
    SWITCH_SECTION,
    CASE_LABEL,
    DEFAULT_LABEL,
    LOCK_STMT,
    USING_STMT,
    CHECKED_STMT,

    LITERAL_EXPR,
    PAREN_EXPR,
    TUPLE_EXPR,
    ARG_LIST,
    BRACKETED_ARGS,
    ARGUMENT,
    NAME_COLON,
    BINARY_EXPR,
    ASSIGNMENT_EXPR,
    CONDITIONAL_EXPR,
    PREFIX_UNARY_EXPR,
    POSTFIX_UNARY_EXPR,
    CAST_EXPR,
    IS_EXPR,
    AS_EXPR,
    MEMBER_ACCESS_EXPR,
    CONDITIONAL_ACCESS_EXPR,
    MEMBER_BINDING_EXPR,
    ELEMENT_BINDING_EXPR,
    INVOCATION_EXPR,
    ELEMENT_ACCESS_EXPR,
    THIS_EXPR,
    BASE_EXPR,
    TYPEOF_EXPR,
    SIZEOF_EXPR,
    DEFAULT_EXPR,
    CHECKED_EXPR,
    OBJECT_CREATION_EXPR,
    ARRAY_CREATION_EXPR,
    IMPLICIT_ARRAY_CREATION_EXPR,
    ANONYMOUS_OBJECT_CREATION_EXPR,
    ANONYMOUS_OBJECT_MEMBER_DECL,
    OBJECT_INITIALIZER,
    COLLECTION_INITIALIZER,
    ARRAY_INITIALIZER,
    COMPLEX_ELEMENT_INITIALIZER,
    SIMPLE_LAMBDA_EXPR,
    PAREN_LAMBDA_EXPR,
    ANONYMOUS_METHOD_EXPR,
    THROW_EXPR,
    AWAIT_EXPR,
    DECLARATION_EXPR,

    ERROR,
    TOMBSTONE,
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    pub const COUNT: usize = __LAST as usize;

    pub const fn is_keyword(self) -> bool {
        self as u16 >= ABSTRACT_KW as u16 && self as u16 <= WHILE_KW as u16
    }

    pub const fn is_punct(self) -> bool {
        self as u16 <= SHR_EQ as u16
    }

    pub const fn is_token(self) -> bool {
        self as u16 <= EOF as u16
    }

    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            INT_NUMBER
                | FLOAT_NUMBER
                | CHAR_LITERAL
                | STRING_LITERAL
                | INTERPOLATED_STRING
                | TRUE_KW
                | FALSE_KW
                | NULL_KW
        )
    }

    /// Keywords naming a built-in type.
    pub const fn is_predefined_type(self) -> bool {
        matches!(
            self,
            BOOL_KW
                | BYTE_KW
                | CHAR_KW
                | DECIMAL_KW
                | DOUBLE_KW
                | FLOAT_KW
                | INT_KW
                | LONG_KW
                | OBJECT_KW
                | SBYTE_KW
                | SHORT_KW
                | STRING_KW
                | UINT_KW
                | ULONG_KW
                | USHORT_KW
                | VOID_KW
        )
    }

    pub const fn is_accessibility(self) -> bool {
        matches!(self, PUBLIC_KW | PRIVATE_KW | PROTECTED_KW | INTERNAL_KW)
    }

    pub const fn is_assignment_op(self) -> bool {
        matches!(
            self,
            EQ | PLUS_EQ
                | MINUS_EQ
                | STAR_EQ
                | SLASH_EQ
                | PERCENT_EQ
                | AMP_EQ
                | PIPE_EQ
                | CARET_EQ
                | SHL_EQ
                | SHR_EQ
                | QUESTION2_EQ
        )
    }

    pub fn from_keyword(text: &str) -> Option<Self> {
        let kind = match text {
            "abstract" => ABSTRACT_KW,
            "as" => AS_KW,
            "base" => BASE_KW,
            "bool" => BOOL_KW,
            "break" => BREAK_KW,
            "byte" => BYTE_KW,
            "case" => CASE_KW,
            "catch" => CATCH_KW,
            "char" => CHAR_KW,
            "checked" => CHECKED_KW,
            "class" => CLASS_KW,
            "const" => CONST_KW,
            "continue" => CONTINUE_KW,
            "decimal" => DECIMAL_KW,
            "default" => DEFAULT_KW,
            "delegate" => DELEGATE_KW,
            "do" => DO_KW,
            "double" => DOUBLE_KW,
            "else" => ELSE_KW,
            "enum" => ENUM_KW,
            "event" => EVENT_KW,
            "explicit" => EXPLICIT_KW,
            "extern" => EXTERN_KW,
            "false" => FALSE_KW,
            "finally" => FINALLY_KW,
            "fixed" => FIXED_KW,
            "float" => FLOAT_KW,
            "for" => FOR_KW,
            "foreach" => FOREACH_KW,
            "goto" => GOTO_KW,
            "if" => IF_KW,
            "implicit" => IMPLICIT_KW,
            "in" => IN_KW,
            "int" => INT_KW,
            "interface" => INTERFACE_KW,
            "internal" => INTERNAL_KW,
            "is" => IS_KW,
            "lock" => LOCK_KW,
            "long" => LONG_KW,
            "namespace" => NAMESPACE_KW,
            "new" => NEW_KW,
            "null" => NULL_KW,
            "object" => OBJECT_KW,
            "operator" => OPERATOR_KW,
            "out" => OUT_KW,
            "override" => OVERRIDE_KW,
            "params" => PARAMS_KW,
            "private" => PRIVATE_KW,
            "protected" => PROTECTED_KW,
            "public" => PUBLIC_KW,
            "readonly" => READONLY_KW,
            "ref" => REF_KW,
            "return" => RETURN_KW,
            "sbyte" => SBYTE_KW,
            "sealed" => SEALED_KW,
            "short" => SHORT_KW,
            "sizeof" => SIZEOF_KW,
            "stackalloc" => STACKALLOC_KW,
            "static" => STATIC_KW,
            "string" => STRING_KW,
            "struct" => STRUCT_KW,
            "switch" => SWITCH_KW,
            "this" => THIS_KW,
            "throw" => THROW_KW,
            "true" => TRUE_KW,
            "try" => TRY_KW,
            "typeof" => TYPEOF_KW,
            "uint" => UINT_KW,
            "ulong" => ULONG_KW,
            "unchecked" => UNCHECKED_KW,
            "unsafe" => UNSAFE_KW,
            "ushort" => USHORT_KW,
            "using" => USING_KW,
            "virtual" => VIRTUAL_KW,
            "void" => VOID_KW,
            "volatile" => VOLATILE_KW,
            "while" => WHILE_KW,
            _ => return None,
        };
        Some(kind)
    }

    /// Fixed source text of punctuation and keyword tokens.
    pub const fn text(self) -> Option<&'static str> {
        let text = match self {
            LEFT_PAREN => "(",
            RIGHT_PAREN => ")",
            LEFT_BRACKET => "[",
            RIGHT_BRACKET => "]",
            LEFT_BRACE => "{",
            RIGHT_BRACE => "}",
            SEMICOLON => ";",
            COMMA => ",",
            DOT => ".",
            COLON => ":",
            COLON2 => "::",
            QUESTION => "?",
            QUESTION2 => "??",
            QUESTION2_EQ => "??=",
            EQ => "=",
            EQ2 => "==",
            NEQ => "!=",
            FAT_ARROW => "=>",
            THIN_ARROW => "->",
            BANG => "!",
            TILDE => "~",
            PLUS => "+",
            PLUS2 => "++",
            PLUS_EQ => "+=",
            MINUS => "-",
            MINUS2 => "--",
            MINUS_EQ => "-=",
            STAR => "*",
            STAR_EQ => "*=",
            SLASH => "/",
            SLASH_EQ => "/=",
            PERCENT => "%",
            PERCENT_EQ => "%=",
            AMP => "&",
            AMP2 => "&&",
            AMP_EQ => "&=",
            PIPE => "|",
            PIPE2 => "||",
            PIPE_EQ => "|=",
            CARET => "^",
            CARET_EQ => "^=",
            LT => "<",
            LTEQ => "<=",
            SHL => "<<",
            SHL_EQ => "<<=",
            GT => ">",
            GTEQ => ">=",
            SHR => ">>",
            SHR_EQ => ">>=",
            ABSTRACT_KW => "abstract",
            AS_KW => "as",
            BASE_KW => "base",
            BOOL_KW => "bool",
            BREAK_KW => "break",
            BYTE_KW => "byte",
            CASE_KW => "case",
            CATCH_KW => "catch",
            CHAR_KW => "char",
            CHECKED_KW => "checked",
            CLASS_KW => "class",
            CONST_KW => "const",
            CONTINUE_KW => "continue",
            DECIMAL_KW => "decimal",
            DEFAULT_KW => "default",
            DELEGATE_KW => "delegate",
            DO_KW => "do",
            DOUBLE_KW => "double",
            ELSE_KW => "else",
            ENUM_KW => "enum",
            EVENT_KW => "event",
            EXPLICIT_KW => "explicit",
            EXTERN_KW => "extern",
            FALSE_KW => "false",
            FINALLY_KW => "finally",
            FIXED_KW => "fixed",
            FLOAT_KW => "float",
            FOR_KW => "for",
            FOREACH_KW => "foreach",
            GOTO_KW => "goto",
            IF_KW => "if",
            IMPLICIT_KW => "implicit",
            IN_KW => "in",
            INT_KW => "int",
            INTERFACE_KW => "interface",
            INTERNAL_KW => "internal",
            IS_KW => "is",
            LOCK_KW => "lock",
            LONG_KW => "long",
            NAMESPACE_KW => "namespace",
            NEW_KW => "new",
            NULL_KW => "null",
            OBJECT_KW => "object",
            OPERATOR_KW => "operator",
            OUT_KW => "out",
            OVERRIDE_KW => "override",
            PARAMS_KW => "params",
            PRIVATE_KW => "private",
            PROTECTED_KW => "protected",
            PUBLIC_KW => "public",
            READONLY_KW => "readonly",
            REF_KW => "ref",
            RETURN_KW => "return",
            SBYTE_KW => "sbyte",
            SEALED_KW => "sealed",
            SHORT_KW => "short",
            SIZEOF_KW => "sizeof",
            STACKALLOC_KW => "stackalloc",
            STATIC_KW => "static",
            STRING_KW => "string",
            STRUCT_KW => "struct",
            SWITCH_KW => "switch",
            THIS_KW => "this",
            THROW_KW => "throw",
            TRUE_KW => "true",
            TRY_KW => "try",
            TYPEOF_KW => "typeof",
            UINT_KW => "uint",
            ULONG_KW => "ulong",
            UNCHECKED_KW => "unchecked",
            UNSAFE_KW => "unsafe",
            USHORT_KW => "ushort",
            USING_KW => "using",
            VIRTUAL_KW => "virtual",
            VOID_KW => "void",
            VOLATILE_KW => "volatile",
            WHILE_KW => "while",
            _ => return None,
        };
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_table_is_consistent() {
        for text in ["abstract", "class", "foreach", "operator", "stackalloc", "while"] {
            let kind = SyntaxKind::from_keyword(text).unwrap();
            assert_eq!(kind.text(), Some(text));
            assert!(kind.is_keyword());
        }
        assert!(!IDENT.is_keyword());
        assert!(SHR_EQ.is_punct() && !ABSTRACT_KW.is_punct());
    }

    #[test]
    fn contextual_keywords_are_identifiers() {
        for text in ["partial", "record", "where", "get", "var", "value", "file"] {
            assert_eq!(SyntaxKind::from_keyword(text), None);
        }
    }
}
