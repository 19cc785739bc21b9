//! Dispatch synthesis (spec.md §4.3 "Dispatch synthesis").
//!
//! Builds the `match ::mutflow::registry::check(...) { Some(0) => V0,
//! Some(1) => V1, ..., _ => fallback }` tree described by the spec's
//! `dispatch(...)` pseudocode. Each branch rebuilds the `check` call
//! rather than binding it to a temporary — `check` is idempotent and
//! O(1), so the inline style the spec calls "the reference design" costs
//! nothing in the non-active case and sidesteps any question of parent-
//! pointer propagation through a synthesized `let`.

use quote::quote;
use syn::{Block, Expr};

#[allow(clippy::too_many_arguments)]
fn check_call(
    point_id: &str,
    variant_count: u32,
    file: &str,
    line: u32,
    original_operator: &str,
    variant_descriptions: &[String],
    occurrence_on_line: u32,
) -> proc_macro2::TokenStream {
    quote! {
        ::mutflow::registry::check(
            #point_id,
            #variant_count,
            ::mutflow::registry::SourceLocation { file: #file.to_string(), line: #line },
            #original_operator,
            &[#(#variant_descriptions),*],
            #occurrence_on_line,
        )
    }
}

/// Build an expression-valued dispatch (call- and return-operator
/// variants; `fallback` is either the next composed operator's dispatch
/// or, at the end of the chain, the untouched original node).
#[allow(clippy::too_many_arguments)]
pub fn build_expr_dispatch(
    point_id: &str,
    file: &str,
    line: u32,
    original_operator: &str,
    variant_descriptions: &[String],
    occurrence_on_line: u32,
    variants: Vec<Expr>,
    fallback: Expr,
) -> Expr {
    let call = check_call(
        point_id,
        variants.len() as u32,
        file,
        line,
        original_operator,
        variant_descriptions,
        occurrence_on_line,
    );
    let arms = variants.into_iter().enumerate().map(|(i, variant)| {
        let idx = i as u32;
        quote! { Some(#idx) => { #variant } }
    });
    syn::parse_quote! {
        match #call {
            #(#arms)*
            _ => { #fallback }
        }
    }
}

/// Build a block-valued dispatch (the function-body operator: `when
/// check(...)==k → empty; else → original block`). The original block
/// is moved into the `_` arm exactly once — no duplication.
#[allow(clippy::too_many_arguments)]
pub fn build_block_dispatch(
    point_id: &str,
    file: &str,
    line: u32,
    original_operator: &str,
    variant_descriptions: &[String],
    occurrence_on_line: u32,
    variants: Vec<Block>,
    fallback: Block,
) -> Block {
    let call = check_call(
        point_id,
        variants.len() as u32,
        file,
        line,
        original_operator,
        variant_descriptions,
        occurrence_on_line,
    );
    let arms = variants.into_iter().enumerate().map(|(i, variant)| {
        let idx = i as u32;
        quote! { Some(#idx) => #variant }
    });
    syn::parse_quote! {
        {
            match #call {
                #(#arms)*
                _ => #fallback
            }
        }
    }
}
