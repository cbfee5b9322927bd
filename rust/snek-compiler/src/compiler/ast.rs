//! Abstract syntax tree produced by the parser.

use serde::{Deserialize, Serialize};
use snek_core::Position;

/// A complete parsed module (one source file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub statements: Vec<Statement>,
}

// ── Expressions ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LeftShift,
    RightShift,
    LogicalAnd,
    LogicalOr,
    QuestionQuestion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LeftShift,
    RightShift,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    LogicalAnd,
    LogicalOr,
    QuestionQuestion,
}

impl BinaryOp {
    /// Textual operator form used to dispatch to a prototype method,
    /// per the evaluator's operator-method table. Logical operators are
    /// short-circuited by the evaluator itself and never reach here.
    pub fn method_name(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            BitwiseAnd => "&",
            BitwiseOr => "|",
            BitwiseXor => "^",
            LeftShift => "<<",
            RightShift => ">>",
            Equal => "==",
            NotEqual => "!=",
            LessThan => "<",
            GreaterThan => ">",
            LessThanOrEqual => "<=",
            GreaterThanOrEqual => ">=",
            LogicalAnd | LogicalOr | QuestionQuestion => {
                unreachable!("short-circuit operators never dispatch to a method")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Negate,
    Not,
    BitwiseNot,
}

impl UnaryOp {
    pub fn method_name(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+@",
            UnaryOp::Negate => "-@",
            UnaryOp::Not => "!",
            UnaryOp::BitwiseNot => "~",
        }
    }
}

/// One element of a list literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Element {
    Value(Expression),
    Spread(Expression),
}

/// One field of a record literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Field {
    Named {
        position: Position,
        name: String,
        value: Expression,
    },
    Shorthand {
        position: Position,
        name: String,
    },
    Computed {
        position: Position,
        key: Expression,
        value: Expression,
    },
    Function {
        position: Position,
        name: String,
        params: Vec<Parameter>,
        return_type: Option<Type>,
        body: Box<Statement>,
    },
    Spread {
        position: Position,
        value: Expression,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expression {
    Null {
        position: Position,
    },
    Boolean {
        position: Position,
        value: bool,
    },
    Int {
        position: Position,
        value: i64,
    },
    Float {
        position: Position,
        value: f64,
    },
    String {
        position: Position,
        value: String,
    },
    Id {
        position: Position,
        name: String,
    },
    List {
        position: Position,
        elements: Vec<Element>,
    },
    Record {
        position: Position,
        fields: Vec<Field>,
    },
    Function {
        position: Position,
        params: Vec<Parameter>,
        return_type: Option<Type>,
        body: Box<Statement>,
    },
    Assign {
        position: Position,
        op: AssignOp,
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Binary {
        position: Position,
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        position: Position,
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Increment {
        position: Position,
        pre: bool,
        target: Box<Expression>,
    },
    Decrement {
        position: Position,
        pre: bool,
        target: Box<Expression>,
    },
    Ternary {
        position: Position,
        condition: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
    },
    Call {
        position: Position,
        conditional: bool,
        callee: Box<Expression>,
        arguments: Vec<Element>,
    },
    Property {
        position: Position,
        conditional: bool,
        receiver: Box<Expression>,
        name: String,
    },
    Subscript {
        position: Position,
        conditional: bool,
        receiver: Box<Expression>,
        index: Box<Expression>,
    },
    Spread {
        position: Position,
        value: Box<Expression>,
    },
}

impl Expression {
    pub fn position(&self) -> &Position {
        use Expression::*;
        match self {
            Null { position }
            | Boolean { position, .. }
            | Int { position, .. }
            | Float { position, .. }
            | String { position, .. }
            | Id { position, .. }
            | List { position, .. }
            | Record { position, .. }
            | Function { position, .. }
            | Assign { position, .. }
            | Binary { position, .. }
            | Unary { position, .. }
            | Increment { position, .. }
            | Decrement { position, .. }
            | Ternary { position, .. }
            | Call { position, .. }
            | Property { position, .. }
            | Subscript { position, .. }
            | Spread { position, .. } => position,
        }
    }

    /// Whether this expression may appear as the target of assignment,
    /// `++`/`--`, or a destructuring pattern.
    pub fn is_assignable(&self) -> bool {
        match self {
            Expression::Id { .. } => true,
            Expression::Property { .. } | Expression::Subscript { .. } => true,
            Expression::List { elements, .. } => elements.iter().all(|e| match e {
                Element::Value(v) => v.is_assignable(),
                Element::Spread(v) => v.is_assignable(),
            }),
            Expression::Record { fields, .. } => fields.iter().all(|f| match f {
                Field::Named { value, .. } => value.is_assignable(),
                Field::Shorthand { .. } => true,
                Field::Spread { value, .. } => value.is_assignable(),
                Field::Computed { .. } | Field::Function { .. } => false,
            }),
            _ => false,
        }
    }
}

// ── Statements ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpKind {
    Break,
    Continue,
    Return,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ImportSpecifier {
    Named {
        position: Position,
        name: String,
        alias: Option<String>,
    },
    Star {
        position: Position,
        alias: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    Block {
        position: Position,
        statements: Vec<Statement>,
    },
    Expression {
        position: Position,
        expression: Expression,
    },
    DeclareVar {
        position: Position,
        is_export: bool,
        is_read_only: bool,
        variable: Expression,
        initializer: Option<Expression>,
    },
    DeclareType {
        position: Position,
        is_export: bool,
        name: String,
        value: Type,
    },
    If {
        position: Position,
        condition: Expression,
        consequent: Box<Statement>,
        alternate: Option<Box<Statement>>,
    },
    While {
        position: Position,
        condition: Expression,
        body: Box<Statement>,
    },
    Jump {
        position: Position,
        kind: JumpKind,
        value: Option<Expression>,
    },
    Import {
        position: Position,
        specifiers: Vec<ImportSpecifier>,
        path: Option<String>,
    },
}

impl Statement {
    pub fn position(&self) -> &Position {
        use Statement::*;
        match self {
            Block { position, .. }
            | Expression { position, .. }
            | DeclareVar { position, .. }
            | DeclareType { position, .. }
            | If { position, .. }
            | While { position, .. }
            | Jump { position, .. }
            | Import { position, .. } => position,
        }
    }
}

// ── Types (syntactic) ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultipleTag {
    Intersection,
    Tuple,
    Union,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Type {
    Null {
        position: Position,
    },
    BooleanLiteral {
        position: Position,
        value: bool,
    },
    StringLiteral {
        position: Position,
        value: String,
    },
    Named {
        position: Position,
        name: String,
    },
    List {
        position: Position,
        element: Box<Type>,
    },
    Record {
        position: Position,
        fields: Vec<(String, Type)>,
    },
    Function {
        position: Position,
        params: Vec<Parameter>,
        return_type: Box<Type>,
    },
    Multiple {
        position: Position,
        tag: MultipleTag,
        members: Vec<Type>,
    },
}

impl Type {
    pub fn position(&self) -> &Position {
        use Type::*;
        match self {
            Null { position }
            | BooleanLiteral { position, .. }
            | StringLiteral { position, .. }
            | Named { position, .. }
            | List { position, .. }
            | Record { position, .. }
            | Function { position, .. }
            | Multiple { position, .. } => position,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub position: Position,
    pub name: String,
    pub type_annotation: Option<Type>,
    pub default: Option<Expression>,
    pub rest: bool,
}
