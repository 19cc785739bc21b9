//! Boolean-return operator: explicit `return` statements in a function
//! declared to return `bool`, whose value is not already a `bool`
//! literal.
//!
//! Variants, in order: `return true`, `return false`.

use syn::{Expr, ExprLit, ExprReturn, Lit, ReturnType, Type};

use super::{FnContext, ReturnOperator, Variant};

pub struct BooleanReturnOperator;

fn is_bool_return_type(return_type: &ReturnType) -> bool {
    match return_type {
        ReturnType::Type(_, ty) => is_bool_type(ty),
        ReturnType::Default => false,
    }
}

fn is_bool_type(ty: &Type) -> bool {
    matches!(ty, Type::Path(p) if p.path.is_ident("bool"))
}

fn is_bool_literal(expr: &Expr) -> bool {
    matches!(expr, Expr::Lit(ExprLit { lit: Lit::Bool(_), .. }))
}

fn bool_lit(value: bool) -> Expr {
    Expr::Lit(ExprLit {
        attrs: Vec::new(),
        lit: Lit::Bool(syn::LitBool::new(value, proc_macro2::Span::call_site())),
    })
}

impl ReturnOperator for BooleanReturnOperator {
    fn name(&self) -> &'static str {
        "boolean_return"
    }

    fn matches(&self, ret: &ExprReturn, ctx: &FnContext) -> bool {
        is_bool_return_type(ctx.return_type)
            && ret
                .expr
                .as_ref()
                .is_some_and(|expr| !is_bool_literal(expr))
    }

    fn variants(&self, _ret: &ExprReturn, _ctx: &FnContext) -> Vec<Variant<Expr>> {
        vec![
            Variant::new("return true", || bool_lit(true)),
            Variant::new("return false", || bool_lit(false)),
        ]
    }

    fn original_description(&self, ret: &ExprReturn) -> String {
        ret.expr
            .as_ref()
            .map(|expr| quote::quote!(return #expr).to_string())
            .unwrap_or_else(|| "return".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(return_type: &ReturnType) -> FnContext<'_> {
        FnContext { return_type }
    }

    fn parse_ret(src: &str) -> ExprReturn {
        let Expr::Return(r) = syn::parse_str::<Expr>(src).unwrap() else {
            panic!("not a return expr");
        };
        r
    }

    #[test]
    fn matches_non_constant_bool_return() {
        let op = BooleanReturnOperator;
        let rt: ReturnType = syn::parse_quote!(-> bool);
        let ret = parse_ret("return x.is_empty()");
        assert!(op.matches(&ret, &ctx(&rt)));
    }

    #[test]
    fn does_not_match_already_constant_return() {
        let op = BooleanReturnOperator;
        let rt: ReturnType = syn::parse_quote!(-> bool);
        let ret = parse_ret("return true");
        assert!(!op.matches(&ret, &ctx(&rt)));
    }

    #[test]
    fn does_not_match_non_bool_return_type() {
        let op = BooleanReturnOperator;
        let rt: ReturnType = syn::parse_quote!(-> u32);
        let ret = parse_ret("return x.is_empty()");
        assert!(!op.matches(&ret, &ctx(&rt)));
    }

    #[test]
    fn variant_order_is_true_then_false() {
        let op = BooleanReturnOperator;
        let rt: ReturnType = syn::parse_quote!(-> bool);
        let ret = parse_ret("return x.is_empty()");
        let variants = op.variants(&ret, &ctx(&rt));
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].description, "return true");
        assert_eq!(variants[1].description, "return false");
    }
}
