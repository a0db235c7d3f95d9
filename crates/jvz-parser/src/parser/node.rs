//! Syntax node model.
//!
//! A `Node` is a header (span + flags) plus a `NodeData` variant. Children
//! are referenced by `NodeIndex` into the same `NodeArena`, so a tree never
//! shares nodes with another compilation unit.

use jvz_scanner::SyntaxKind;

use super::base::{NodeIndex, NodeList};
use super::flags::{ModifierFlags, NodeFlags};

#[derive(Clone, Debug)]
pub struct Node {
    pub pos: u32,
    pub end: u32,
    pub flags: NodeFlags,
    pub data: NodeData,
}

impl Node {
    #[inline]
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.flags
            .intersects(NodeFlags::THIS_NODE_HAS_ERROR | NodeFlags::MISSING)
            || matches!(self.data, NodeData::Error)
    }

    #[inline]
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.flags.contains(NodeFlags::MISSING)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.pos)
    }
}

/// Declaration modifiers together with their annotations.
#[derive(Clone, Debug, Default)]
pub struct Modifiers {
    pub flags: ModifierFlags,
    pub annotations: NodeList,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeDeclarationKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl PrimitiveKind {
    #[must_use]
    pub fn from_token(kind: SyntaxKind) -> Option<PrimitiveKind> {
        Some(match kind {
            SyntaxKind::BooleanKeyword => PrimitiveKind::Boolean,
            SyntaxKind::ByteKeyword => PrimitiveKind::Byte,
            SyntaxKind::ShortKeyword => PrimitiveKind::Short,
            SyntaxKind::IntKeyword => PrimitiveKind::Int,
            SyntaxKind::LongKeyword => PrimitiveKind::Long,
            SyntaxKind::CharKeyword => PrimitiveKind::Char,
            SyntaxKind::FloatKeyword => PrimitiveKind::Float,
            SyntaxKind::DoubleKeyword => PrimitiveKind::Double,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    None,
    Extends,
    Super,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Long,
    Float,
    Double,
    Character,
    String,
    Boolean,
    Null,
}

#[derive(Clone, Debug)]
pub struct CompilationUnit {
    pub file_name: String,
    pub package: NodeIndex,
    pub imports: NodeList,
    pub types: NodeList,
}

#[derive(Clone, Debug)]
pub struct TypeDeclaration {
    pub kind: TypeDeclarationKind,
    pub modifiers: Modifiers,
    pub name: NodeIndex,
    pub type_parameters: NodeList,
    /// Superclass for classes, superinterfaces for interfaces.
    pub extends: NodeList,
    pub implements: NodeList,
    pub enum_constants: NodeList,
    pub members: NodeList,
}

#[derive(Clone, Debug)]
pub struct MethodDeclaration {
    pub modifiers: Modifiers,
    pub type_parameters: NodeList,
    /// `NONE` for constructors.
    pub return_type: NodeIndex,
    pub name: NodeIndex,
    pub parameters: NodeList,
    /// Array dimensions written after the parameter list (`int m()[]`).
    pub extra_dimensions: u32,
    pub throws: NodeList,
    /// `NONE` when the method has no body.
    pub body: NodeIndex,
    /// Annotation element default value.
    pub default_value: NodeIndex,
    pub is_constructor: bool,
}

/// Closed set of syntax node variants.
#[derive(Clone, Debug)]
pub enum NodeData {
    // =========================================================================
    // Declarations
    // =========================================================================
    CompilationUnit(Box<CompilationUnit>),
    PackageDeclaration {
        annotations: NodeList,
        name: NodeIndex,
    },
    ImportDeclaration {
        name: NodeIndex,
        is_static: bool,
        on_demand: bool,
    },
    TypeDeclaration(Box<TypeDeclaration>),
    EnumConstant {
        annotations: NodeList,
        name: NodeIndex,
        arguments: Option<NodeList>,
        body: Option<NodeList>,
    },
    FieldDeclaration {
        modifiers: Modifiers,
        ty: NodeIndex,
        declarators: NodeList,
    },
    VariableDeclarator {
        name: NodeIndex,
        extra_dimensions: u32,
        initializer: NodeIndex,
    },
    MethodDeclaration(Box<MethodDeclaration>),
    Parameter {
        modifiers: Modifiers,
        ty: NodeIndex,
        name: NodeIndex,
        is_varargs: bool,
        extra_dimensions: u32,
    },
    Initializer {
        is_static: bool,
        body: NodeIndex,
    },
    TypeParameter {
        name: NodeIndex,
        bounds: NodeList,
    },
    Annotation {
        name: NodeIndex,
        arguments: NodeList,
    },
    ElementValuePair {
        name: NodeIndex,
        value: NodeIndex,
    },
    ElementValueArrayInitializer {
        values: NodeList,
    },

    // =========================================================================
    // Names and types
    // =========================================================================
    Identifier {
        text: String,
    },
    QualifiedName {
        qualifier: NodeIndex,
        name: NodeIndex,
    },
    PrimitiveType(PrimitiveKind),
    VoidType,
    ClassType {
        /// Enclosing type for `Outer<T>.Inner`, or `NONE`.
        qualifier: NodeIndex,
        name: NodeIndex,
        /// `Some(empty)` is the diamond `<>`.
        type_arguments: Option<NodeList>,
    },
    ArrayType {
        element: NodeIndex,
    },
    WildcardType {
        bound_kind: WildcardBound,
        bound: NodeIndex,
    },
    /// Alternatives of a multi-catch parameter.
    UnionType {
        types: NodeList,
    },

    // =========================================================================
    // Statements
    // =========================================================================
    Block {
        statements: NodeList,
    },
    LocalVariableDeclaration {
        modifiers: Modifiers,
        ty: NodeIndex,
        declarators: NodeList,
    },
    ExpressionStatement {
        expression: NodeIndex,
    },
    IfStatement {
        condition: NodeIndex,
        then_statement: NodeIndex,
        else_statement: NodeIndex,
    },
    WhileStatement {
        condition: NodeIndex,
        body: NodeIndex,
    },
    DoStatement {
        body: NodeIndex,
        condition: NodeIndex,
    },
    ForStatement {
        initializers: NodeList,
        condition: NodeIndex,
        updates: NodeList,
        body: NodeIndex,
    },
    ForEachStatement {
        variable: NodeIndex,
        iterable: NodeIndex,
        body: NodeIndex,
    },
    ReturnStatement {
        expression: NodeIndex,
    },
    BreakStatement {
        label: NodeIndex,
    },
    ContinueStatement {
        label: NodeIndex,
    },
    ThrowStatement {
        expression: NodeIndex,
    },
    TryStatement {
        resources: NodeList,
        block: NodeIndex,
        catches: NodeList,
        finally_block: NodeIndex,
    },
    CatchClause {
        parameter: NodeIndex,
        block: NodeIndex,
    },
    SwitchStatement {
        selector: NodeIndex,
        cases: NodeList,
    },
    SwitchCase {
        /// `NONE` for `default:`.
        label: NodeIndex,
        statements: NodeList,
    },
    SynchronizedStatement {
        lock: NodeIndex,
        block: NodeIndex,
    },
    LabeledStatement {
        label: NodeIndex,
        statement: NodeIndex,
    },
    AssertStatement {
        condition: NodeIndex,
        message: NodeIndex,
    },
    EmptyStatement,
    ExplicitConstructorInvocation {
        is_super: bool,
        qualifier: NodeIndex,
        type_arguments: NodeList,
        arguments: NodeList,
    },

    // =========================================================================
    // Expressions
    // =========================================================================
    Literal {
        kind: LiteralKind,
        text: String,
    },
    ThisExpression {
        qualifier: NodeIndex,
    },
    SuperExpression {
        qualifier: NodeIndex,
    },
    FieldAccess {
        expression: NodeIndex,
        name: NodeIndex,
    },
    MethodInvocation {
        /// `NONE` for unqualified calls.
        expression: NodeIndex,
        type_arguments: NodeList,
        name: NodeIndex,
        arguments: NodeList,
    },
    ClassInstanceCreation {
        outer: NodeIndex,
        ty: NodeIndex,
        arguments: NodeList,
        body: Option<NodeList>,
    },
    ArrayCreation {
        element_type: NodeIndex,
        dimensions: NodeList,
        extra_dimensions: u32,
        initializer: NodeIndex,
    },
    ArrayInitializer {
        elements: NodeList,
    },
    ArrayAccess {
        array: NodeIndex,
        index: NodeIndex,
    },
    PrefixUnary {
        operator: SyntaxKind,
        operand: NodeIndex,
    },
    PostfixUnary {
        operator: SyntaxKind,
        operand: NodeIndex,
    },
    Binary {
        operator: SyntaxKind,
        left: NodeIndex,
        right: NodeIndex,
    },
    InstanceOf {
        expression: NodeIndex,
        ty: NodeIndex,
    },
    Conditional {
        condition: NodeIndex,
        when_true: NodeIndex,
        when_false: NodeIndex,
    },
    Assignment {
        operator: SyntaxKind,
        target: NodeIndex,
        value: NodeIndex,
    },
    Cast {
        ty: NodeIndex,
        expression: NodeIndex,
    },
    Parenthesized {
        expression: NodeIndex,
    },
    ClassLiteral {
        ty: NodeIndex,
    },

    /// Placeholder for source that could not be parsed.
    Error,
}

impl NodeData {
    /// Short name of the variant, used in debug output and tests.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeData::CompilationUnit(_) => "CompilationUnit",
            NodeData::PackageDeclaration { .. } => "PackageDeclaration",
            NodeData::ImportDeclaration { .. } => "ImportDeclaration",
            NodeData::TypeDeclaration(_) => "TypeDeclaration",
            NodeData::EnumConstant { .. } => "EnumConstant",
            NodeData::FieldDeclaration { .. } => "FieldDeclaration",
            NodeData::VariableDeclarator { .. } => "VariableDeclarator",
            NodeData::MethodDeclaration(_) => "MethodDeclaration",
            NodeData::Parameter { .. } => "Parameter",
            NodeData::Initializer { .. } => "Initializer",
            NodeData::TypeParameter { .. } => "TypeParameter",
            NodeData::Annotation { .. } => "Annotation",
            NodeData::ElementValuePair { .. } => "ElementValuePair",
            NodeData::ElementValueArrayInitializer { .. } => "ElementValueArrayInitializer",
            NodeData::Identifier { .. } => "Identifier",
            NodeData::QualifiedName { .. } => "QualifiedName",
            NodeData::PrimitiveType(_) => "PrimitiveType",
            NodeData::VoidType => "VoidType",
            NodeData::ClassType { .. } => "ClassType",
            NodeData::ArrayType { .. } => "ArrayType",
            NodeData::WildcardType { .. } => "WildcardType",
            NodeData::UnionType { .. } => "UnionType",
            NodeData::Block { .. } => "Block",
            NodeData::LocalVariableDeclaration { .. } => "LocalVariableDeclaration",
            NodeData::ExpressionStatement { .. } => "ExpressionStatement",
            NodeData::IfStatement { .. } => "IfStatement",
            NodeData::WhileStatement { .. } => "WhileStatement",
            NodeData::DoStatement { .. } => "DoStatement",
            NodeData::ForStatement { .. } => "ForStatement",
            NodeData::ForEachStatement { .. } => "ForEachStatement",
            NodeData::ReturnStatement { .. } => "ReturnStatement",
            NodeData::BreakStatement { .. } => "BreakStatement",
            NodeData::ContinueStatement { .. } => "ContinueStatement",
            NodeData::ThrowStatement { .. } => "ThrowStatement",
            NodeData::TryStatement { .. } => "TryStatement",
            NodeData::CatchClause { .. } => "CatchClause",
            NodeData::SwitchStatement { .. } => "SwitchStatement",
            NodeData::SwitchCase { .. } => "SwitchCase",
            NodeData::SynchronizedStatement { .. } => "SynchronizedStatement",
            NodeData::LabeledStatement { .. } => "LabeledStatement",
            NodeData::AssertStatement { .. } => "AssertStatement",
            NodeData::EmptyStatement => "EmptyStatement",
            NodeData::ExplicitConstructorInvocation { .. } => "ExplicitConstructorInvocation",
            NodeData::Literal { .. } => "Literal",
            NodeData::ThisExpression { .. } => "ThisExpression",
            NodeData::SuperExpression { .. } => "SuperExpression",
            NodeData::FieldAccess { .. } => "FieldAccess",
            NodeData::MethodInvocation { .. } => "MethodInvocation",
            NodeData::ClassInstanceCreation { .. } => "ClassInstanceCreation",
            NodeData::ArrayCreation { .. } => "ArrayCreation",
            NodeData::ArrayInitializer { .. } => "ArrayInitializer",
            NodeData::ArrayAccess { .. } => "ArrayAccess",
            NodeData::PrefixUnary { .. } => "PrefixUnary",
            NodeData::PostfixUnary { .. } => "PostfixUnary",
            NodeData::Binary { .. } => "Binary",
            NodeData::InstanceOf { .. } => "InstanceOf",
            NodeData::Conditional { .. } => "Conditional",
            NodeData::Assignment { .. } => "Assignment",
            NodeData::Cast { .. } => "Cast",
            NodeData::Parenthesized { .. } => "Parenthesized",
            NodeData::ClassLiteral { .. } => "ClassLiteral",
            NodeData::Error => "Error",
        }
    }

    /// Whether this node is a type (as opposed to an expression or statement).
    #[must_use]
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            NodeData::PrimitiveType(_)
                | NodeData::VoidType
                | NodeData::ClassType { .. }
                | NodeData::ArrayType { .. }
                | NodeData::WildcardType { .. }
                | NodeData::UnionType { .. }
        )
    }
}

/// Arena owning every node of one compilation unit.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    pub(crate) nodes: Vec<Node>,
}
