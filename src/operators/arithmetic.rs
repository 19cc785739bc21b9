//! Arithmetic operator: `+`, `-`, `*`, `/`, `%`.
//!
//! Paired swap: `+` ↔ `-`, `*` ↔ `/`, `%` → `/`. The `*` → `/` variant is
//! safe-divide: if `b≠0` return `a/b`; else if `a≠0` return `b/a`; else
//! return `1`. Operands are bound once to locals so they are evaluated
//! exactly once regardless of how many times the variant references them.

use quote::quote;
use syn::{BinOp, Expr, ExprBinary};

use super::{CallOperator, Variant};

pub struct ArithmeticOperator;

fn op_symbol(op: &BinOp) -> &'static str {
    match op {
        BinOp::Add(_) => "+",
        BinOp::Sub(_) => "-",
        BinOp::Mul(_) => "*",
        BinOp::Div(_) => "/",
        BinOp::Rem(_) => "%",
        _ => "?",
    }
}

fn simple_swap(binary: &ExprBinary, op: BinOp) -> Expr {
    let mut binary = binary.clone();
    binary.op = op;
    Expr::Binary(binary)
}

fn safe_divide(binary: &ExprBinary) -> Expr {
    let left = &binary.left;
    let right = &binary.right;
    syn::parse_quote! {
        {
            let __mutflow_a = #left;
            let __mutflow_b = #right;
            if __mutflow_b != 0 {
                __mutflow_a / __mutflow_b
            } else if __mutflow_a != 0 {
                __mutflow_b / __mutflow_a
            } else {
                1
            }
        }
    }
}

impl CallOperator for ArithmeticOperator {
    fn name(&self) -> &'static str {
        "arithmetic"
    }

    fn matches(&self, expr: &Expr) -> bool {
        matches!(
            expr,
            Expr::Binary(b) if matches!(
                b.op,
                BinOp::Add(_) | BinOp::Sub(_) | BinOp::Mul(_) | BinOp::Div(_) | BinOp::Rem(_)
            )
        )
    }

    fn variants(&self, expr: &Expr) -> Vec<Variant<Expr>> {
        let Expr::Binary(binary) = expr else {
            return Vec::new();
        };
        let binary = binary.clone();

        match binary.op {
            BinOp::Add(_) => {
                let binary = binary.clone();
                vec![Variant::new("-", move || {
                    simple_swap(&binary, BinOp::Sub(Default::default()))
                })]
            }
            BinOp::Sub(_) => {
                let binary = binary.clone();
                vec![Variant::new("+", move || {
                    simple_swap(&binary, BinOp::Add(Default::default()))
                })]
            }
            BinOp::Mul(_) => {
                let binary = binary.clone();
                vec![Variant::new("/ (safe-divide)", move || safe_divide(&binary))]
            }
            BinOp::Div(_) => {
                let binary = binary.clone();
                vec![Variant::new("*", move || {
                    simple_swap(&binary, BinOp::Mul(Default::default()))
                })]
            }
            BinOp::Rem(_) => {
                let binary = binary.clone();
                vec![Variant::new("/", move || {
                    simple_swap(&binary, BinOp::Div(Default::default()))
                })]
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

    fn parse(src: &str) -> Expr {
        syn::parse_str(src).unwrap()
    }

    #[test]
    fn add_swaps_to_sub() {
        let op = ArithmeticOperator;
        let expr = parse("a + b");
        let variants = op.variants(&expr);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].description, "-");
        let built = (variants[0].build)();
        assert_eq!(quote!(#built).to_string(), quote!(a - b).to_string());
    }

    #[test]
    fn mul_produces_safe_divide_block() {
        let op = ArithmeticOperator;
        let expr = parse("a * b");
        let variants = op.variants(&expr);
        let built = (variants[0].build)();
        assert!(matches!(built, Expr::Block(_)));
    }

    #[test]
    fn rem_swaps_to_div_only_one_direction() {
        let op = ArithmeticOperator;
        let expr = parse("a % b");
        let variants = op.variants(&expr);
        assert_eq!(variants[0].description, "/");
        let div_expr = parse("a / b");
        let div_variants = op.variants(&div_expr);
        assert_eq!(div_variants[0].description, "*");
    }
}
