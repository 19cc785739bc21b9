//! Equality operator: `==`, `!=`.
//!
//! Variants: `== → !=` (wrap the original comparison with logical-not),
//! `!= → ==` (flip the operator directly — there is no wrapping `Not` to
//! unwrap in source, so the "unwrap" variant is the plain `Eq` form). The
//! `==` variant wraps rather than flips so the synthetic node is a `Not`
//! over the untouched original binary: the inner `==` is never presented
//! to the catalogue as a fresh candidate, since the transformer only ever
//! walks the original source tree, not a variant's built output.

use syn::{BinOp, Expr, ExprBinary, ExprUnary, UnOp};

use super::{CallOperator, Variant};

pub struct EqualityOperator;

fn op_symbol(op: &BinOp) -> &'static str {
    match op {
        BinOp::Eq(_) => "==",
        BinOp::Ne(_) => "!=",
        _ => "?",
    }
}

fn wrap_not(binary: &ExprBinary) -> Expr {
    Expr::Unary(ExprUnary {
        attrs: Vec::new(),
        op: UnOp::Not(Default::default()),
        expr: Box::new(Expr::Paren(syn::ExprParen {
            attrs: Vec::new(),
            paren_token: Default::default(),
            expr: Box::new(Expr::Binary(binary.clone())),
        })),
    })
}

fn flip_to_eq(binary: &ExprBinary) -> Expr {
    let mut binary = binary.clone();
    binary.op = BinOp::Eq(Default::default());
    Expr::Binary(binary)
}

impl CallOperator for EqualityOperator {
    fn name(&self) -> &'static str {
        "equality"
    }

    fn matches(&self, expr: &Expr) -> bool {
        matches!(expr, Expr::Binary(b) if matches!(b.op, BinOp::Eq(_) | BinOp::Ne(_)))
    }

    fn variants(&self, expr: &Expr) -> Vec<Variant<Expr>> {
        let Expr::Binary(binary) = expr else {
            return Vec::new();
        };

        match binary.op {
            BinOp::Eq(_) => {
                let binary = binary.clone();
                vec![Variant::new("!=", move || wrap_not(&binary))]
            }
            BinOp::Ne(_) => {
                let binary = binary.clone();
                vec![Variant::new("==", move || flip_to_eq(&binary))]
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
    fn matches_eq_and_ne_only() {
        let op = EqualityOperator;
        assert!(op.matches(&parse("a == b")));
        assert!(op.matches(&parse("a != b")));
        assert!(!op.matches(&parse("a > b")));
    }

    #[test]
    fn eq_variant_wraps_with_not() {
        let op = EqualityOperator;
        let expr = parse("a == b");
        let variants = op.variants(&expr);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].description, "!=");
        let built = (variants[0].build)();
        assert!(matches!(built, Expr::Unary(u) if matches!(u.op, UnOp::Not(_))));
    }

    #[test]
    fn ne_variant_flips_to_eq() {
        let op = EqualityOperator;
        let expr = parse("a != b");
        let variants = op.variants(&expr);
        assert_eq!(variants[0].description, "==");
        let built = (variants[0].build)();
        assert_eq!(quote!(#built).to_string(), quote!(a == b).to_string());
    }

    #[test]
    fn original_description_reports_symbol() {
        let op = EqualityOperator;
        assert_eq!(op.original_description(&parse("a != b")), "!=");
    }
}
