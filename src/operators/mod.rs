//! C2 — the mutation operator catalogue.
//!
//! Three operator kinds share the same matching/variant-enumeration
//! shape but act on different node types: call-expression operators
//! (binary-operator calls), return-statement operators, and
//! function-body operators. Composition on a single node is recursion,
//! not inheritance — see [`crate::transform`].

pub mod arithmetic;
pub mod boolean_logic;
pub mod boolean_return;
pub mod constant_boundary;
pub mod equality;
pub mod nullable_return;
pub mod relational;
pub mod void_body;

/// One alternative program fragment offered at a point. Index within
/// the enclosing `Vec<Variant>` is the variant's stable order.
pub struct Variant<T> {
    pub description: String,
    pub build: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T> Variant<T> {
    pub fn new(description: impl Into<String>, build: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            description: description.into(),
            build: Box::new(build),
        }
    }
}

/// Applied to binary-operator call nodes. Multiple call operators may
/// match the same node; all matches are composed (nested dispatch).
pub trait CallOperator: Send + Sync {
    fn name(&self) -> &'static str;
    fn matches(&self, expr: &syn::Expr) -> bool;
    fn variants(&self, expr: &syn::Expr) -> Vec<Variant<syn::Expr>>;
    fn original_description(&self, expr: &syn::Expr) -> String;
}

/// The enclosing function's declared return type, threaded to return
/// operators so they can recognize boolean- and `Option`-typed returns
/// without re-deriving scope from the node alone.
pub struct FnContext<'a> {
    pub return_type: &'a syn::ReturnType,
}

/// Applied to explicit `return` statements. Only the first matching
/// operator in the catalogue is applied to a given node.
pub trait ReturnOperator: Send + Sync {
    fn name(&self) -> &'static str;
    fn matches(&self, ret: &syn::ExprReturn, ctx: &FnContext) -> bool;
    fn variants(&self, ret: &syn::ExprReturn, ctx: &FnContext) -> Vec<Variant<syn::Expr>>;
    fn original_description(&self, ret: &syn::ExprReturn) -> String;
}

/// Applied at the function-declaration level. Only the first matching
/// operator in the catalogue is applied to a given function.
pub trait FunctionBodyOperator: Send + Sync {
    fn name(&self) -> &'static str;
    fn matches(&self, item_fn: &syn::ItemFn) -> bool;
    fn variants(&self, item_fn: &syn::ItemFn) -> Vec<Variant<syn::Block>>;
    fn original_description(&self, item_fn: &syn::ItemFn) -> String;
}

/// The default catalogue: one instance of each required operator
/// family, in a fixed evaluation order.
pub struct OperatorCatalogue {
    pub call_operators: Vec<Box<dyn CallOperator>>,
    pub return_operators: Vec<Box<dyn ReturnOperator>>,
    pub function_body_operators: Vec<Box<dyn FunctionBodyOperator>>,
}

impl OperatorCatalogue {
    pub fn new() -> Self {
        Self {
            call_operators: vec![
                Box::new(relational::RelationalOperator),
                Box::new(constant_boundary::ConstantBoundaryOperator),
                Box::new(arithmetic::ArithmeticOperator),
                Box::new(equality::EqualityOperator),
                Box::new(boolean_logic::BooleanLogicOperator),
            ],
            return_operators: vec![
                Box::new(boolean_return::BooleanReturnOperator),
                Box::new(nullable_return::NullableReturnOperator),
            ],
            function_body_operators: vec![Box::new(void_body::VoidBodyOperator)],
        }
    }

    /// All call operators matching `expr`, in catalogue order.
    pub fn matching_call_operators(&self, expr: &syn::Expr) -> Vec<&dyn CallOperator> {
        self.call_operators
            .iter()
            .map(|op| op.as_ref())
            .filter(|op| op.matches(expr))
            .collect()
    }

    /// The first return operator matching `ret`, if any.
    pub fn matching_return_operator(
        &self,
        ret: &syn::ExprReturn,
        ctx: &FnContext,
    ) -> Option<&dyn ReturnOperator> {
        self.return_operators
            .iter()
            .map(|op| op.as_ref())
            .find(|op| op.matches(ret, ctx))
    }

    /// The first function-body operator matching `item_fn`, if any.
    pub fn matching_function_body_operator(
        &self,
        item_fn: &syn::ItemFn,
    ) -> Option<&dyn FunctionBodyOperator> {
        self.function_body_operators
            .iter()
            .map(|op| op.as_ref())
            .find(|op| op.matches(item_fn))
    }
}

impl Default for OperatorCatalogue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_all_required_families() {
        let catalogue = OperatorCatalogue::new();
        assert_eq!(catalogue.call_operators.len(), 5);
        assert_eq!(catalogue.return_operators.len(), 2);
        assert_eq!(catalogue.function_body_operators.len(), 1);
    }
}
