//! Relational operator: `>`, `<`, `>=`, `<=`.
//!
//! Variants, in order: boundary toggle (include/exclude equality), then
//! direction flip.

use syn::{BinOp, Expr, ExprBinary};

use super::{CallOperator, Variant};

pub struct RelationalOperator;

fn relational_ops(op: &BinOp) -> bool {
    matches!(op, BinOp::Gt(_) | BinOp::Lt(_) | BinOp::Ge(_) | BinOp::Le(_))
}

fn boundary_toggle(op: &BinOp) -> BinOp {
    match op {
        BinOp::Gt(t) => BinOp::Ge(syn::token::Ge(t.span)),
        BinOp::Lt(t) => BinOp::Le(syn::token::Le(t.span)),
        BinOp::Ge(t) => BinOp::Gt(syn::token::Gt(t.span)),
        BinOp::Le(t) => BinOp::Lt(syn::token::Lt(t.span)),
        other => other.clone(),
    }
}

fn direction_flip(op: &BinOp) -> BinOp {
    match op {
        BinOp::Gt(t) => BinOp::Lt(syn::token::Lt(t.span)),
        BinOp::Lt(t) => BinOp::Gt(syn::token::Gt(t.span)),
        BinOp::Ge(t) => BinOp::Le(syn::token::Le(t.span)),
        BinOp::Le(t) => BinOp::Ge(syn::token::Ge(t.span)),
        other => other.clone(),
    }
}

fn op_symbol(op: &BinOp) -> &'static str {
    match op {
        BinOp::Gt(_) => ">",
        BinOp::Lt(_) => "<",
        BinOp::Ge(_) => ">=",
        BinOp::Le(_) => "<=",
        _ => "?",
    }
}

fn rebuild(binary: &ExprBinary, op: BinOp) -> Expr {
    Expr::Binary(ExprBinary {
        attrs: binary.attrs.clone(),
        left: binary.left.clone(),
        op,
        right: binary.right.clone(),
    })
}

impl CallOperator for RelationalOperator {
    fn name(&self) -> &'static str {
        "relational"
    }

    fn matches(&self, expr: &syn::Expr) -> bool {
        matches!(expr, Expr::Binary(b) if relational_ops(&b.op))
    }

    fn variants(&self, expr: &syn::Expr) -> Vec<Variant<Expr>> {
        let Expr::Binary(binary) = expr else {
            return Vec::new();
        };
        let binary = binary.clone();
        let original = binary.op.clone();

        let boundary = boundary_toggle(&original);
        let boundary_desc = op_symbol(&boundary).to_string();
        let boundary_binary = binary.clone();

        let flipped = direction_flip(&original);
        let flipped_desc = op_symbol(&flipped).to_string();
        let flipped_binary = binary.clone();

        vec![
            Variant::new(boundary_desc, move || rebuild(&boundary_binary, boundary.clone())),
            Variant::new(flipped_desc, move || rebuild(&flipped_binary, flipped.clone())),
        ]
    }

    fn original_description(&self, expr: &syn::Expr) -> String {
        match expr {
            Expr::Binary(b) => op_symbol(&b.op).to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn parse(src: &str) -> Expr {
        syn::parse_str(src).unwrap()
    }

    #[test]
    fn matches_all_four_relational_operators() {
        let op = RelationalOperator;
        assert!(op.matches(&parse("a > b")));
        assert!(op.matches(&parse("a < b")));
        assert!(op.matches(&parse("a >= b")));
        assert!(op.matches(&parse("a <= b")));
        assert!(!op.matches(&parse("a == b")));
    }

    #[test]
    fn variant_order_is_boundary_then_flip() {
        let op = RelationalOperator;
        let expr = parse("a > b");
        let variants = op.variants(&expr);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].description, ">=");
        assert_eq!(variants[1].description, "<");
    }

    #[test]
    fn variants_build_independent_trees() {
        let op = RelationalOperator;
        let expr: Expr = parse_quote!(a > b);
        let variants = op.variants(&expr);
        let v0 = (variants[0].build)();
        let v1 = (variants[1].build)();
        let Expr::Binary(b0) = &v0 else { panic!() };
        let Expr::Binary(b1) = &v1 else { panic!() };
        assert!(matches!(b0.op, BinOp::Ge(_)));
        assert!(matches!(b1.op, BinOp::Lt(_)));
    }

    #[test]
    fn original_description_reports_symbol() {
        let op = RelationalOperator;
        assert_eq!(op.original_description(&parse("a <= b")), "<=");
    }
}
