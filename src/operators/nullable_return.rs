//! Nullable-return operator: explicit `return` statements in a function
//! whose declared return type admits absence (`Option<T>`), whose
//! returned value is not already the absent value (`None`).
//!
//! Single variant: `return absent` (`None`).

use syn::{Expr, ExprPath, ExprReturn, ReturnType, Type};

use super::{FnContext, ReturnOperator, Variant};

pub struct NullableReturnOperator;

fn is_option_return_type(return_type: &ReturnType) -> bool {
    match return_type {
        ReturnType::Type(_, ty) => is_option_type(ty),
        ReturnType::Default => false,
    }
}

fn is_option_type(ty: &Type) -> bool {
    match ty {
        Type::Path(p) => p
            .path
            .segments
            .last()
            .is_some_and(|seg| seg.ident == "Option"),
        _ => false,
    }
}

fn is_none_literal(expr: &Expr) -> bool {
    matches!(expr, Expr::Path(ExprPath { path, .. }) if path.is_ident("None"))
}

fn none_expr() -> Expr {
    syn::parse_quote!(None)
}

impl ReturnOperator for NullableReturnOperator {
    fn name(&self) -> &'static str {
        "nullable_return"
    }

    fn matches(&self, ret: &ExprReturn, ctx: &FnContext) -> bool {
        is_option_return_type(ctx.return_type)
            && ret
                .expr
                .as_ref()
                .is_some_and(|expr| !is_none_literal(expr))
    }

    fn variants(&self, _ret: &ExprReturn, _ctx: &FnContext) -> Vec<Variant<Expr>> {
        vec![Variant::new("return absent", none_expr)]
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
    fn matches_non_none_option_return() {
        let op = NullableReturnOperator;
        let rt: ReturnType = syn::parse_quote!(-> Option<u32>);
        let ret = parse_ret("return Some(x)");
        assert!(op.matches(&ret, &ctx(&rt)));
    }

    #[test]
    fn does_not_match_already_none() {
        let op = NullableReturnOperator;
        let rt: ReturnType = syn::parse_quote!(-> Option<u32>);
        let ret = parse_ret("return None");
        assert!(!op.matches(&ret, &ctx(&rt)));
    }

    #[test]
    fn does_not_match_non_option_return_type() {
        let op = NullableReturnOperator;
        let rt: ReturnType = syn::parse_quote!(-> u32);
        let ret = parse_ret("return x");
        assert!(!op.matches(&ret, &ctx(&rt)));
    }

    #[test]
    fn single_variant_returns_none() {
        let op = NullableReturnOperator;
        let rt: ReturnType = syn::parse_quote!(-> Option<u32>);
        let ret = parse_ret("return Some(x)");
        let variants = op.variants(&ret, &ctx(&rt));
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].description, "return absent");
        let built = (variants[0].build)();
        assert!(matches!(built, Expr::Path(p) if p.path.is_ident("None")));
    }
}
