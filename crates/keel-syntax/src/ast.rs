use crate::SyntaxKind::{self, *};
use crate::{NodeOrToken, SyntaxNode, SyntaxToken};

pub trait AstNode {
    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized;

    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn cast(syntax: SyntaxNode) -> Option<Self> {
                matches!(syntax.kind(), $($kind)|+).then_some(Self(syntax))
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(CompilationUnit, COMPILATION_UNIT);
ast_node!(UsingDirective, USING_DIRECTIVE);
ast_node!(NamespaceDecl, NAMESPACE_DECL | FILE_SCOPED_NAMESPACE_DECL);
ast_node!(
    /// Any of the type declarations, delegates included.
    TypeDecl,
    CLASS_DECL
        | STRUCT_DECL
        | INTERFACE_DECL
        | ENUM_DECL
        | RECORD_DECL
        | RECORD_STRUCT_DECL
        | DELEGATE_DECL
);
ast_node!(BaseList, BASE_LIST);
ast_node!(ConstraintClause, CONSTRAINT_CLAUSE);
ast_node!(ParamList, PARAM_LIST | BRACKETED_PARAM_LIST);
ast_node!(AccessorList, ACCESSOR_LIST);
ast_node!(Block, BLOCK);

fn children<N: AstNode>(node: &SyntaxNode) -> impl Iterator<Item = N> + use<N> {
    node.children().filter_map(N::cast)
}

fn tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + use<> {
    node.children_with_tokens().filter_map(NodeOrToken::into_token)
}

impl CompilationUnit {
    pub fn usings(&self) -> impl Iterator<Item = UsingDirective> + use<> {
        children(&self.0)
    }

    pub fn members(&self) -> impl Iterator<Item = Member> + use<> {
        children(&self.0)
    }
}

impl UsingDirective {
    pub fn is_global(&self) -> bool {
        tokens(&self.0).any(|token| token.kind() == IDENT && token.text_trimmed() == "global")
    }
}

impl NamespaceDecl {
    pub fn is_file_scoped(&self) -> bool {
        self.0.kind() == FILE_SCOPED_NAMESPACE_DECL
    }

    pub fn name(&self) -> Option<SyntaxNode> {
        self.0.children().find(|child| is_name(child.kind()))
    }

    pub fn members(&self) -> impl Iterator<Item = Member> + use<> {
        children(&self.0)
    }
}

impl TypeDecl {
    /// The declaring keyword: `class`, `struct`, `interface`, `enum`,
    /// `record` or `delegate`.
    pub fn keyword(&self) -> Option<SyntaxToken> {
        tokens(&self.0).find(|token| {
            matches!(token.kind(), CLASS_KW | STRUCT_KW | INTERFACE_KW | ENUM_KW | DELEGATE_KW)
                || (token.kind() == IDENT && token.text_trimmed() == "record")
        })
    }

    /// The declared identifier; a missing token when the input lacks one.
    pub fn name(&self) -> Option<SyntaxToken> {
        let keyword_end = self.keyword()?.text_range().end();
        tokens(&self.0).find(|token| {
            token.kind() == IDENT && token.text_range().start() >= keyword_end
        })
    }

    pub fn modifiers(&self) -> impl Iterator<Item = SyntaxToken> + use<> {
        modifiers(&self.0)
    }

    pub fn type_params(&self) -> Option<SyntaxNode> {
        self.0.child_by_kind(TYPE_PARAM_LIST)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        children(&self.0).next()
    }

    pub fn base_list(&self) -> Option<BaseList> {
        children(&self.0).next()
    }

    pub fn constraint_clauses(&self) -> impl Iterator<Item = ConstraintClause> + use<> {
        children(&self.0)
    }

    /// `true` when the body is a single `;` instead of braces.
    pub fn has_semicolon_body(&self) -> bool {
        self.0.children_with_tokens().last().is_some_and(|last| last.kind() == SEMICOLON)
    }

    pub fn members(&self) -> impl Iterator<Item = Member> + use<> {
        children(&self.0)
    }
}

impl BaseList {
    pub fn types(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.0
            .children()
            .filter(|child| matches!(child.kind(), SIMPLE_BASE_TYPE | PRIMARY_CTOR_BASE_TYPE))
    }
}

impl ConstraintClause {
    pub fn constraints(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.0.children().filter(|child| {
            matches!(
                child.kind(),
                TYPE_CONSTRAINT | CLASS_OR_STRUCT_CONSTRAINT | CONSTRUCTOR_CONSTRAINT
            )
        })
    }
}

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.0.children().filter(|child| child.kind() == PARAM)
    }
}

impl AccessorList {
    pub fn accessors(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.0.children().filter(|child| is_accessor(child.kind()))
    }
}

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.0.children()
    }
}

/// A member of a compilation unit, namespace or type body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Namespace(NamespaceDecl),
    Type(TypeDecl),
    Other(SyntaxNode),
}

impl AstNode for Member {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        let kind = syntax.kind();
        if let Some(namespace) = NamespaceDecl::cast(syntax.clone()) {
            return Some(Self::Namespace(namespace));
        }
        if let Some(ty) = TypeDecl::cast(syntax.clone()) {
            return Some(Self::Type(ty));
        }
        is_member(kind).then_some(Self::Other(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Namespace(it) => it.syntax(),
            Self::Type(it) => it.syntax(),
            Self::Other(it) => it,
        }
    }
}

impl Member {
    /// A short label for outlines: the declared name, or the declarators of a
    /// field, or the operator token.
    pub fn label(&self) -> String {
        match self {
            Self::Namespace(namespace) => {
                namespace.name().map(|name| name.to_string().trim().to_owned()).unwrap_or_default()
            }
            Self::Type(ty) => {
                ty.name().map(|name| name.text_trimmed().to_owned()).unwrap_or_default()
            }
            Self::Other(node) => member_label(node),
        }
    }

    pub fn members(&self) -> Vec<Self> {
        match self {
            Self::Namespace(namespace) => namespace.members().collect(),
            Self::Type(ty) => ty.members().collect(),
            Self::Other(_) => Vec::new(),
        }
    }
}

fn member_label(node: &SyntaxNode) -> String {
    match node.kind() {
        FIELD_DECL | EVENT_FIELD_DECL => node
            .descendants()
            .filter(|child| child.kind() == VARIABLE_DECLARATOR)
            .filter_map(|declarator| declarator.token_by_kind(IDENT))
            .map(|ident| ident.text_trimmed().to_owned())
            .collect::<Vec<_>>()
            .join(", "),
        INDEXER_DECL => "this[]".to_owned(),
        OPERATOR_DECL | CONVERSION_OPERATOR_DECL => {
            let mut tokens = tokens(node).skip_while(|token| token.kind() != OPERATOR_KW);
            tokens.next();
            let op = tokens.next().map(|token| token.text_trimmed().to_owned()).unwrap_or_default();
            format!("operator {op}")
        }
        DESTRUCTOR_DECL => {
            let name = node.token_by_kind(IDENT).map(|ident| ident.text_trimmed().to_owned());
            format!("~{}", name.unwrap_or_default())
        }
        _ => tokens(node)
            .filter(|token| token.kind() == IDENT)
            .last()
            .map(|ident| ident.text_trimmed().to_owned())
            .unwrap_or_default(),
    }
}

fn modifiers(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + use<> {
    tokens(node).take_while(|token| is_modifier_token(token))
}

pub fn is_modifier_token(token: &SyntaxToken) -> bool {
    match token.kind() {
        IDENT => matches!(token.text_trimmed(), "partial" | "async" | "file" | "required"),
        kind => is_modifier_kind(kind),
    }
}

pub const fn is_modifier_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        PUBLIC_KW
            | PRIVATE_KW
            | PROTECTED_KW
            | INTERNAL_KW
            | STATIC_KW
            | ABSTRACT_KW
            | SEALED_KW
            | READONLY_KW
            | UNSAFE_KW
            | NEW_KW
            | VIRTUAL_KW
            | OVERRIDE_KW
            | EXTERN_KW
            | VOLATILE_KW
            | CONST_KW
            | FIXED_KW
            | REF_KW
    )
}

pub const fn is_name(kind: SyntaxKind) -> bool {
    matches!(kind, IDENTIFIER_NAME | GENERIC_NAME | QUALIFIED_NAME | ALIAS_QUALIFIED_NAME)
}

pub const fn is_accessor(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        GET_ACCESSOR
            | SET_ACCESSOR
            | INIT_ACCESSOR
            | ADD_ACCESSOR
            | REMOVE_ACCESSOR
            | UNKNOWN_ACCESSOR
    )
}

pub const fn is_member(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        NAMESPACE_DECL
            | FILE_SCOPED_NAMESPACE_DECL
            | CLASS_DECL
            | STRUCT_DECL
            | INTERFACE_DECL
            | ENUM_DECL
            | RECORD_DECL
            | RECORD_STRUCT_DECL
            | DELEGATE_DECL
            | ENUM_MEMBER_DECL
            | FIELD_DECL
            | EVENT_FIELD_DECL
            | PROPERTY_DECL
            | INDEXER_DECL
            | EVENT_DECL
            | METHOD_DECL
            | CONSTRUCTOR_DECL
            | DESTRUCTOR_DECL
            | OPERATOR_DECL
            | CONVERSION_OPERATOR_DECL
            | INCOMPLETE_MEMBER
    )
}
