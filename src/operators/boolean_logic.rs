//! Boolean-logic operator: short-circuit `&&`, `||`.
//!
//! `a && b` short-circuits to the constant `false` when `a` is false and
//! otherwise evaluates the conditional branch `b`; `a || b` is the dual.
//! The single variant for each swaps which side the constant and the
//! conditional branch come from, i.e. swaps the operator itself.

use syn::{BinOp, Expr, ExprBinary};

use super::{CallOperator, Variant};

pub struct BooleanLogicOperator;

fn op_symbol(op: &BinOp) -> &'static str {
    match op {
        BinOp::And(_) => "&&",
        BinOp::Or(_) => "||",
        _ => "?",
    }
}

fn swap(binary: &ExprBinary, op: BinOp) -> Expr {
    let mut binary = binary.clone();
    binary.op = op;
    Expr::Binary(binary)
}

impl CallOperator for BooleanLogicOperator {
    fn name(&self) -> &'static str {
        "boolean_logic"
    }

    fn matches(&self, expr: &Expr) -> bool {
        matches!(expr, Expr::Binary(b) if matches!(b.op, BinOp::And(_) | BinOp::Or(_)))
    }

    fn variants(&self, expr: &Expr) -> Vec<Variant<Expr>> {
        let Expr::Binary(binary) = expr else {
            return Vec::new();
        };

        match binary.op {
            BinOp::And(_) => {
                let binary = binary.clone();
                vec![Variant::new("||", move || swap(&binary, BinOp::Or(Default::default())))]
            }
            BinOp::Or(_) => {
                let binary = binary.clone();
                vec![Variant::new("&&", move || swap(&binary, BinOp::And(Default::default())))]
            }
            _ => Vec::new(),
        }
    }

    fn original_description(&self, expr: &Expr) -> String {
        match expr {
            Expr::Binary(b) => op_symbol(&b.op).to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn parse(src: &str) -> Expr {
        syn::parse_str(src).unwrap()
    }

    #[test]
    fn matches_short_circuit_operators_only() {
        let op = BooleanLogicOperator;
        assert!(op.matches(&parse("a && b")));
        assert!(op.matches(&parse("a || b")));
        assert!(!op.matches(&parse("a & b")));
        assert!(!op.matches(&parse("a | b")));
    }

    #[test]
    fn and_swaps_to_or() {
        let op = BooleanLogicOperator;
        let expr = parse("a && b");
        let variants = op.variants(&expr);
        assert_eq!(variants[0].description, "||");
        let built = (variants[0].build)();
        assert_eq!(quote!(#built).to_string(), quote!(a || b).to_string());
    }

    #[test]
    fn or_swaps_to_and() {
        let op = BooleanLogicOperator;
        let expr = parse("a || b");
        let variants = op.variants(&expr);
        assert_eq!(variants[0].description, "&&");
        let built = (variants[0].build)();
        assert_eq!(quote!(#built).to_string(), quote!(a && b).to_string());
    }
}
