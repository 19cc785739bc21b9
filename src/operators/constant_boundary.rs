//! Constant boundary operator: any relational comparison whose left or
//! right operand is a numeric literal.
//!
//! Variants, in order: `constant + 1`, `constant - 1`. If both operands
//! are literals, the right operand is mutated.

use syn::{BinOp, Expr, ExprBinary, ExprParen};

use super::{CallOperator, Variant};

pub struct ConstantBoundaryOperator;

fn is_relational(op: &BinOp) -> bool {
    matches!(op, BinOp::Gt(_) | BinOp::Lt(_) | BinOp::Ge(_) | BinOp::Le(_))
}

fn is_numeric_literal(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Lit(lit) if matches!(lit.lit, syn::Lit::Int(_) | syn::Lit::Float(_))
    )
}

enum Side {
    Left,
    Right,
}

fn literal_side(binary: &ExprBinary) -> Option<Side> {
    if is_numeric_literal(&binary.right) {
        Some(Side::Right)
    } else if is_numeric_literal(&binary.left) {
        Some(Side::Left)
    } else {
        None
    }
}

fn adjust(operand: &Expr, op: BinOp) -> Expr {
    let one: Expr = syn::parse_quote!(1);
    Expr::Paren(ExprParen {
        attrs: Vec::new(),
        paren_token: Default::default(),
        expr: Box::new(Expr::Binary(ExprBinary {
            attrs: Vec::new(),
            left: Box::new(operand.clone()),
            op,
            right: Box::new(one),
        })),
    })
}

fn rebuild(binary: &ExprBinary, side: &Side, new_operand: Expr) -> Expr {
    let mut binary = binary.clone();
    match side {
        Side::Left => binary.left = Box::new(new_operand),
        Side::Right => binary.right = Box::new(new_operand),
    }
    Expr::Binary(binary)
}

impl CallOperator for ConstantBoundaryOperator {
    fn name(&self) -> &'static str {
        "constant_boundary"
    }

    fn matches(&self, expr: &Expr) -> bool {
        matches!(expr, Expr::Binary(b) if is_relational(&b.op) && literal_side(b).is_some())
    }

    fn variants(&self, expr: &Expr) -> Vec<Variant<Expr>> {
        let Expr::Binary(binary) = expr else {
            return Vec::new();
        };
        let Some(side) = literal_side(binary) else {
            return Vec::new();
        };
        let operand = match side {
            Side::Left => (*binary.left).clone(),
            Side::Right => (*binary.right).clone(),
        };
        let binary = binary.clone();

        let plus_operand = operand.clone();
        let plus_binary = binary.clone();
        let plus_side = matches!(side, Side::Right);

        let minus_operand = operand;
        let minus_binary = binary;
        let minus_side = plus_side;

        vec![
            Variant::new("constant + 1", move || {
                let side = if plus_side { Side::Right } else { Side::Left };
                rebuild(&plus_binary, &side, adjust(&plus_operand, BinOp::Add(Default::default())))
            }),
            Variant::new("constant - 1", move || {
                let side = if minus_side { Side::Right } else { Side::Left };
                rebuild(
                    &minus_binary,
                    &side,
                    adjust(&minus_operand, BinOp::Sub(Default::default())),
                )
            }),
        ]
    }

    fn original_description(&self, expr: &Expr) -> String {
        let Expr::Binary(binary) = expr else {
            return String::new();
        };
        match literal_side(binary) {
            Some(Side::Left) => {
                let operand = &binary.left;
                quote::quote!(#operand).to_string()
            }
            Some(Side::Right) => {
                let operand = &binary.right;
                quote::quote!(#operand).to_string()
            }
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Expr {
        syn::parse_str(src).unwrap()
    }

    #[test]
    fn matches_when_right_operand_is_literal() {
        let op = ConstantBoundaryOperator;
        assert!(op.matches(&parse("x > 0")));
        assert!(!op.matches(&parse("x > y")));
    }

    #[test]
    fn prefers_right_operand_when_both_are_literals() {
        let op = ConstantBoundaryOperator;
        let expr = parse("1 > 2");
        let variants = op.variants(&expr);
        let v0 = (variants[0].build)();
        assert_eq!(quote::quote!(#v0).to_string(), quote::quote!((1 > (2 + 1))).to_string());
    }

    #[test]
    fn variant_order_is_plus_then_minus() {
        let op = ConstantBoundaryOperator;
        let expr = parse("x > 0");
        let variants = op.variants(&expr);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].description, "constant + 1");
        assert_eq!(variants[1].description, "constant - 1");
    }
}
