//! Type resolver: turns syntactic type annotations into semantic `Type`s,
//! and produces the best static approximation of an expression's value
//! type, per spec.md §4.3.

use crate::error::Error;
use crate::scope::Scope;
use crate::types::{Builtin, Type, TypeParameter};
use snek_compiler::compiler::ast::{self, BinaryOp, Element, Expression, Field, JumpKind, MultipleTag, Statement};
use std::rc::Rc;

pub fn resolve_type(scope: &Scope, ty: &ast::Type) -> Result<Type, Error> {
    match ty {
        ast::Type::Null { .. } => Ok(Type::void()),
        ast::Type::BooleanLiteral { value, .. } => Ok(Type::BooleanLiteral(*value)),
        ast::Type::StringLiteral { value, .. } => Ok(Type::StringLiteral(Rc::from(value.as_str()))),
        ast::Type::Named { name, position } => scope
            .lookup_type(name, false)
            .ok_or_else(|| Error::at(position.clone(), format!("Unknown type '{}'.", name))),
        ast::Type::List { element, .. } => Ok(Type::List(Rc::new(resolve_type(scope, element)?))),
        ast::Type::Record { fields, .. } => {
            let mut resolved = Vec::with_capacity(fields.len());
            for (name, field_ty) in fields {
                resolved.push((name.clone(), resolve_type(scope, field_ty)?));
            }
            Ok(Type::Record(Rc::new(resolved)))
        }
        ast::Type::Function { params, return_type, .. } => {
            let mut resolved_params = Vec::with_capacity(params.len());
            for p in params {
                resolved_params.push(TypeParameter {
                    name: p.name.clone(),
                    ty: p.type_annotation.as_ref().map(|t| resolve_type(scope, t)).transpose()?,
                    has_default: p.default.is_some(),
                    rest: p.rest,
                });
            }
            Ok(Type::Function {
                params: Rc::new(resolved_params),
                return_type: Rc::new(resolve_type(scope, return_type)?),
            })
        }
        ast::Type::Multiple { tag, members, .. } => {
            let mut resolved = Vec::with_capacity(members.len());
            for m in members {
                resolved.push(resolve_type(scope, m)?);
            }
            Ok(match tag {
                MultipleTag::Intersection => Type::Intersection(Rc::new(resolved)),
                MultipleTag::Tuple => Type::Tuple(Rc::new(resolved)),
                MultipleTag::Union => Type::Union(Rc::new(resolved)),
            })
        }
    }
}

/// Best static approximation of an expression's type, or `None` for
/// "unknown" (treated as `Any` by callers).
pub fn resolve_expression(scope: &Scope, expr: &Expression) -> Option<Type> {
    match expr {
        Expression::Null { .. } => Some(Type::void()),
        Expression::Boolean { value, .. } => Some(Type::BooleanLiteral(*value)),
        Expression::Int { .. } => Some(Type::Builtin(Builtin::Int)),
        Expression::Float { .. } => Some(Type::Builtin(Builtin::Float)),
        Expression::String { value, .. } => Some(Type::StringLiteral(Rc::from(value.as_str()))),
        Expression::List { elements, .. } => resolve_list_literal(scope, elements),
        Expression::Record { fields, .. } => resolve_record_literal(scope, fields),
        Expression::Function { params, return_type, body, .. } => {
            resolve_function_literal(scope, params, return_type.as_ref(), body)
        }
        Expression::Call { callee, conditional, .. } => {
            let callee_ty = resolve_expression(scope, callee)?;
            let ret = match callee_ty {
                Type::Function { return_type, .. } => (*return_type).clone(),
                _ => return None,
            };
            Some(if *conditional { union_with_void(ret) } else { ret })
        }
        Expression::Property { receiver, name, conditional, .. } => {
            let receiver_ty = resolve_expression(scope, receiver)?;
            let field_ty = match receiver_ty {
                Type::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, t)| t.clone())?,
                _ => return None,
            };
            Some(if *conditional { union_with_void(field_ty) } else { field_ty })
        }
        Expression::Ternary { consequent, alternate, .. } => {
            let a = resolve_expression(scope, consequent)?;
            let b = resolve_expression(scope, alternate)?;
            Some(Type::reify(vec![a, b]))
        }
        Expression::Binary { op, left, right, .. }
            if matches!(op, BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::QuestionQuestion) =>
        {
            let a = resolve_expression(scope, left)?;
            let b = resolve_expression(scope, right)?;
            Some(Type::reify(vec![a, b, Type::Builtin(Builtin::Boolean), Type::void()]))
        }
        Expression::Unary { op, .. } if *op == ast::UnaryOp::Not => Some(Type::Builtin(Builtin::Boolean)),
        _ => None,
    }
}

fn union_with_void(ty: Type) -> Type {
    Type::reify(vec![ty, Type::void()])
}

fn resolve_list_literal(scope: &Scope, elements: &[Element]) -> Option<Type> {
    let mut member_types = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            Element::Value(e) => member_types.push(resolve_expression(scope, e)?),
            Element::Spread(_) => return Some(Type::Builtin(Builtin::List)),
        }
    }
    Some(Type::Tuple(Rc::new(member_types)))
}

fn resolve_record_literal(scope: &Scope, fields: &[Field]) -> Option<Type> {
    let mut entries = Vec::with_capacity(fields.len());
    for field in fields {
        match field {
            Field::Named { name, value, .. } => entries.push((name.clone(), resolve_expression(scope, value)?)),
            Field::Shorthand { name, .. } => {
                entries.push((name.clone(), resolve_expression(scope, &Expression::Id {
                    position: snek_core::Position::synthetic(),
                    name: name.clone(),
                })?));
            }
            Field::Function { name, params, return_type, body, .. } => {
                entries.push((name.clone(), resolve_function_literal(scope, params, return_type.as_ref(), body)?));
            }
            Field::Computed { .. } | Field::Spread { .. } => return Some(Type::Builtin(Builtin::Record)),
        }
    }
    Some(Type::Record(Rc::new(entries)))
}

fn resolve_function_literal(
    scope: &Scope,
    params: &[ast::Parameter],
    return_type: Option<&ast::Type>,
    body: &Statement,
) -> Option<Type> {
    let mut resolved_params = Vec::with_capacity(params.len());
    for p in params {
        resolved_params.push(TypeParameter {
            name: p.name.clone(),
            ty: p.type_annotation.as_ref().and_then(|t| resolve_type(scope, t).ok()),
            has_default: p.default.is_some(),
            rest: p.rest,
        });
    }
    let ret = match return_type {
        Some(t) => resolve_type(scope, t).ok()?,
        None => infer_return_type(scope, body),
    };
    Some(Type::Function { params: Rc::new(resolved_params), return_type: Rc::new(ret) })
}

/// Walk a function body collecting every `return` value expression
/// (descending into Block/If/While, never into nested Function bodies),
/// and reify the resolved set.
fn infer_return_type(scope: &Scope, body: &Statement) -> Type {
    let mut returns = Vec::new();
    collect_returns(scope, body, &mut returns);
    Type::reify(returns)
}

fn collect_returns(scope: &Scope, stmt: &Statement, out: &mut Vec<Type>) {
    match stmt {
        Statement::Block { statements, .. } => {
            for s in statements {
                collect_returns(scope, s, out);
            }
        }
        Statement::If { consequent, alternate, .. } => {
            collect_returns(scope, consequent, out);
            if let Some(alt) = alternate {
                collect_returns(scope, alt, out);
            }
        }
        Statement::While { body, .. } => collect_returns(scope, body, out),
        Statement::Jump { kind: JumpKind::Return, value, .. } => {
            out.push(match value {
                Some(expr) => resolve_expression(scope, expr).unwrap_or(Type::Any),
                None => Type::void(),
            });
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snek_core::Position;

    fn pos() -> Position {
        Position::synthetic()
    }

    #[test]
    fn literal_resolves_to_literal_type() {
        let scope = Scope::root();
        let expr = Expression::Int { position: pos(), value: 5 };
        assert!(matches!(resolve_expression(&scope, &expr), Some(Type::Builtin(Builtin::Int))));
    }

    #[test]
    fn list_of_literals_resolves_to_tuple() {
        let scope = Scope::root();
        let expr = Expression::List {
            position: pos(),
            elements: vec![
                Element::Value(Expression::Int { position: pos(), value: 1 }),
                Element::Value(Expression::Int { position: pos(), value: 2 }),
            ],
        };
        assert!(matches!(resolve_expression(&scope, &expr), Some(Type::Tuple(_))));
    }

    #[test]
    fn list_with_spread_demotes_to_builtin() {
        let scope = Scope::root();
        let expr = Expression::List {
            position: pos(),
            elements: vec![Element::Spread(Expression::Id { position: pos(), name: "xs".into() })],
        };
        assert!(matches!(resolve_expression(&scope, &expr), Some(Type::Builtin(Builtin::List))));
    }

    #[test]
    fn unknown_named_type_errors() {
        let scope = Scope::root();
        let ty = ast::Type::Named { position: pos(), name: "Frobnicate".into() };
        assert!(resolve_type(&scope, &ty).is_err());
    }
}
