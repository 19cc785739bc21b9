//! Void-body operator: functions returning "no value" with a non-empty
//! body.
//!
//! Rust has no first-class property-accessor syntax (unlike the
//! getter/setter distinction the spec's source language draws), so the
//! "not a property accessor" guard narrows to the one case where
//! removing the body would change semantics the test suite can't observe
//! through ordinary assertions: `Drop::drop`, excluded so destructor
//! mutation doesn't need its own run-time reset hook.
//!
//! Single variant: empty body (all side effects removed).

use syn::{Block, ItemFn, ReturnType};

use super::{FunctionBodyOperator, Variant};

pub struct VoidBodyOperator;

fn empty_block() -> Block {
    syn::parse_quote!({})
}

impl FunctionBodyOperator for VoidBodyOperator {
    fn name(&self) -> &'static str {
        "void_body"
    }

    fn matches(&self, item_fn: &ItemFn) -> bool {
        matches!(item_fn.sig.output, ReturnType::Default)
            && !item_fn.block.stmts.is_empty()
            && item_fn.sig.ident != "drop"
    }

    fn variants(&self, _item_fn: &ItemFn) -> Vec<Variant<Block>> {
        vec![Variant::new("empty body", empty_block)]
    }

    fn original_description(&self, item_fn: &ItemFn) -> String {
        format!("{} body", item_fn.sig.ident)
    }
}
