//! C3 — the IR transformer.
//!
//! Walks a parsed `syn::File` bottom-up via [`syn::visit_mut::VisitMut`],
//! honouring target-class scoping, declaration-level suppression, and
//! line-pragma suppression (spec.md §4.3), and rewrites matched nodes
//! into the dispatch trees [`dispatch`] builds. Operator composition on
//! a single node is recursion over the matching operator list, not
//! inheritance — the else-branch of one operator's dispatch is the
//! result of applying the remaining operators to the original node
//! (spec.md §9).

pub mod dispatch;
pub mod ids;
pub mod markers;
pub mod pragma;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use syn::spanned::Spanned;
use syn::visit_mut::VisitMut;
use syn::{Attribute, Block, Expr, ExprReturn, ImplItemFn, ItemFn, ItemImpl, ItemMod, ReturnType, Signature};

use crate::core::{Error, Result};
use crate::operators::{CallOperator, FnContext, OperatorCatalogue};
use crate::registry::{DiscoveredPoint, SourceLocation};

use ids::OwnerCounters;
use markers::{is_marked, is_suppressed, strip_markers};
use pragma::SuppressedLines;

/// One marker-scoped level of the transformer's scope stack (spec.md
/// §4.3: "a stack of scope flags").
#[derive(Debug, Clone)]
struct Scope {
    /// Owner key for point-id assignment, set once an enclosing-or-self
    /// item carries the mutation-target marker. `None` outside any
    /// marked unit — such nodes pass through unchanged.
    owner: Option<String>,
    /// Whether this scope or an ancestor carries an explicit
    /// `#[mutflow::no_mutate]` suppression marker.
    suppressed: bool,
}

/// The bottom-up rewrite pass for a single parsed file.
pub struct Transformer<'a> {
    catalogue: &'a OperatorCatalogue,
    file_display: String,
    owner_counters: OwnerCounters,
    /// Keyed by `(line, original_operator)` — spec.md §4.3 "Occurrence
    /// disambiguation".
    occurrence_counts: HashMap<(u32, String), u32>,
    suppressed_lines: SuppressedLines,
    /// Path segments accumulated from enclosing modules/impls/fns, used
    /// to compute the fully-qualified owner key for a newly marked unit.
    path_stack: Vec<String>,
    scopes: Vec<Scope>,
    return_types: Vec<ReturnType>,
    /// Points emitted during this pass, mirroring exactly what a live
    /// registry session would discover at runtime — surfaced so a
    /// "report only" caller (no live session) can still list dispatch
    /// points (SPEC_FULL.md §0.5).
    pub points: Vec<DiscoveredPoint>,
    /// Non-fatal diagnostics (spec.md §7: unreadable pragma source).
    pub diagnostics: Vec<String>,
}

impl<'a> Transformer<'a> {
    pub fn new(catalogue: &'a OperatorCatalogue, file_display: impl Into<String>, content: &str) -> Self {
        Self {
            catalogue,
            file_display: file_display.into(),
            owner_counters: OwnerCounters::new(),
            occurrence_counts: HashMap::new(),
            suppressed_lines: pragma::scan(content),
            path_stack: Vec::new(),
            scopes: vec![Scope { owner: None, suppressed: false }],
            return_types: Vec::new(),
            points: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn transform_file(&mut self, file: &mut syn::File) {
        self.visit_file_mut(file);
    }

    fn current_scope(&self) -> &Scope {
        self.scopes.last().expect("scope stack never empty")
    }

    fn should_transform(&self, line: u32) -> Option<String> {
        let scope = self.current_scope();
        if scope.suppressed {
            return None;
        }
        let owner = scope.owner.clone()?;
        if self.suppressed_lines.contains(line) {
            None
        } else {
            Some(owner)
        }
    }

    fn owner_path(&self) -> String {
        self.path_stack.join("::")
    }

    fn enter(&mut self, segment: String, marked: bool, suppressed_here: bool) {
        self.path_stack.push(segment);
        let parent = self.current_scope().clone();
        let owner = if marked { Some(self.owner_path()) } else { parent.owner };
        let suppressed = parent.suppressed || suppressed_here;
        self.scopes.push(Scope { owner, suppressed });
    }

    fn exit(&mut self) {
        self.scopes.pop();
        self.path_stack.pop();
    }

    fn next_point_id(&mut self, owner: &str) -> String {
        self.owner_counters.next(owner)
    }

    fn next_occurrence(&mut self, line: u32, original_operator: &str) -> u32 {
        let key = (line, original_operator.to_string());
        let counter = self.occurrence_counts.entry(key).or_insert(0);
        *counter += 1;
        *counter
    }

    fn record_point(
        &mut self,
        point_id: &str,
        variant_count: u32,
        line: u32,
        original_operator: &str,
        variant_descriptions: &[String],
        occurrence_on_line: u32,
    ) {
        self.points.push(DiscoveredPoint {
            point_id: point_id.to_string(),
            variant_count,
            source_location: SourceLocation {
                file: self.file_display.clone(),
                line,
            },
            original_operator: original_operator.to_string(),
            variant_operators: variant_descriptions.to_vec(),
            occurrence_on_line,
        });
    }

    /// Build the (possibly nested) dispatch for every call operator that
    /// matches `original`, composing independently — each match gets its
    /// own point id, and the final fallback (once all matching operators
    /// are exhausted) is the untouched, already-children-transformed node.
    fn build_call_chain(&mut self, operators: &[&'a dyn CallOperator], original: &Expr, owner: &str, line: u32) -> Expr {
        let Some((op, rest)) = operators.split_first() else {
            return original.clone();
        };
        let point_id = self.next_point_id(owner);
        let original_operator = op.original_description(original);
        let occurrence = self.next_occurrence(line, &original_operator);
        let variants = op.variants(original);
        let variant_descriptions: Vec<String> = variants.iter().map(|v| v.description.clone()).collect();
        let variant_exprs: Vec<Expr> = variants.iter().map(|v| (v.build)()).collect();
        self.record_point(&point_id, variant_exprs.len() as u32, line, &original_operator, &variant_descriptions, occurrence);

        let fallback = self.build_call_chain(rest, original, owner, line);

        dispatch::build_expr_dispatch(
            &point_id,
            &self.file_display,
            line,
            &original_operator,
            &variant_descriptions,
            occurrence,
            variant_exprs,
            fallback,
        )
    }

    fn maybe_transform_return(&mut self, node: &mut ExprReturn) {
        let Some(inner) = node.expr.take() else {
            return;
        };
        let line = node.span().start().line as u32;
        let Some(owner) = self.should_transform(line) else {
            node.expr = Some(inner);
            return;
        };
        let Some(return_type) = self.return_types.last().cloned() else {
            node.expr = Some(inner);
            return;
        };
        let ctx = FnContext { return_type: &return_type };
        let synthetic = ExprReturn {
            attrs: node.attrs.clone(),
            return_token: node.return_token,
            expr: Some(inner.clone()),
        };

        let Some(op) = self.catalogue.matching_return_operator(&synthetic, &ctx) else {
            node.expr = Some(inner);
            return;
        };

        let point_id = self.next_point_id(&owner);
        let original_operator = op.original_description(&synthetic);
        let occurrence = self.next_occurrence(line, &original_operator);
        let variants = op.variants(&synthetic, &ctx);
        let variant_descriptions: Vec<String> = variants.iter().map(|v| v.description.clone()).collect();
        let variant_exprs: Vec<Expr> = variants.iter().map(|v| (v.build)()).collect();
        self.record_point(&point_id, variant_exprs.len() as u32, line, &original_operator, &variant_descriptions, occurrence);

        let dispatch_expr = dispatch::build_expr_dispatch(
            &point_id,
            &self.file_display,
            line,
            &original_operator,
            &variant_descriptions,
            occurrence,
            variant_exprs,
            *inner,
        );
        node.expr = Some(Box::new(dispatch_expr));
    }

    fn maybe_transform_function_body(&mut self, sig: &Signature, attrs: &[Attribute], block: &mut Block) {
        let line = sig.fn_token.span().start().line as u32;
        let Some(owner) = self.should_transform(line) else {
            return;
        };
        let synthetic = ItemFn {
            attrs: attrs.to_vec(),
            vis: syn::Visibility::Inherited,
            sig: sig.clone(),
            block: Box::new(block.clone()),
        };
        let Some(op) = self.catalogue.matching_function_body_operator(&synthetic) else {
            return;
        };

        let point_id = self.next_point_id(&owner);
        let original_operator = op.original_description(&synthetic);
        let occurrence = self.next_occurrence(line, &original_operator);
        let variants = op.variants(&synthetic);
        let variant_descriptions: Vec<String> = variants.iter().map(|v| v.description.clone()).collect();
        let variant_blocks: Vec<Block> = variants.iter().map(|v| (v.build)()).collect();
        self.record_point(&point_id, variant_blocks.len() as u32, line, &original_operator, &variant_descriptions, occurrence);

        let fallback = block.clone();
        *block = dispatch::build_block_dispatch(
            &point_id,
            &self.file_display,
            line,
            &original_operator,
            &variant_descriptions,
            occurrence,
            variant_blocks,
            fallback,
        );
    }
}

fn type_to_string(ty: &syn::Type) -> String {
    quote::quote!(#ty).to_string().replace(' ', "")
}

impl<'a> VisitMut for Transformer<'a> {
    fn visit_item_mod_mut(&mut self, node: &mut ItemMod) {
        let marked = is_marked(&node.attrs);
        let suppressed = is_suppressed(&node.attrs);
        strip_markers(&mut node.attrs);

        self.enter(node.ident.to_string(), marked, suppressed);
        syn::visit_mut::visit_item_mod_mut(self, node);
        self.exit();
    }

    fn visit_item_impl_mut(&mut self, node: &mut ItemImpl) {
        let marked = is_marked(&node.attrs);
        let suppressed = is_suppressed(&node.attrs);
        strip_markers(&mut node.attrs);

        self.enter(type_to_string(&node.self_ty), marked, suppressed);
        syn::visit_mut::visit_item_impl_mut(self, node);
        self.exit();
    }

    fn visit_item_fn_mut(&mut self, node: &mut ItemFn) {
        let marked = is_marked(&node.attrs);
        let suppressed = is_suppressed(&node.attrs);
        strip_markers(&mut node.attrs);

        self.enter(node.sig.ident.to_string(), marked, suppressed);
        self.return_types.push(node.sig.output.clone());

        syn::visit_mut::visit_item_fn_mut(self, node);

        self.return_types.pop();
        self.maybe_transform_function_body(&node.sig, &node.attrs, &mut node.block);
        self.exit();
    }

    fn visit_impl_item_fn_mut(&mut self, node: &mut ImplItemFn) {
        let marked = is_marked(&node.attrs);
        let suppressed = is_suppressed(&node.attrs);
        strip_markers(&mut node.attrs);

        self.enter(node.sig.ident.to_string(), marked, suppressed);
        self.return_types.push(node.sig.output.clone());

        syn::visit_mut::visit_impl_item_fn_mut(self, node);

        self.return_types.pop();
        self.maybe_transform_function_body(&node.sig, &node.attrs, &mut node.block);
        self.exit();
    }

    fn visit_expr_return_mut(&mut self, node: &mut ExprReturn) {
        syn::visit_mut::visit_expr_return_mut(self, node);
        self.maybe_transform_return(node);
    }

    fn visit_expr_mut(&mut self, node: &mut Expr) {
        syn::visit_mut::visit_expr_mut(self, node);

        // Expr::Return is handled by visit_expr_return_mut (it wraps only
        // the inner value, keeping the `return` keyword); call operators
        // never match an ExprReturn node itself.
        if matches!(node, Expr::Return(_)) {
            return;
        }

        let line = node.span().start().line as u32;
        let Some(owner) = self.should_transform(line) else {
            return;
        };

        let matching = self.catalogue.matching_call_operators(node);
        if matching.is_empty() {
            return;
        }

        let original = node.clone();
        *node = self.build_call_chain(&matching, &original, &owner, line);
    }
}

/// Per-compile-pass driver: one [`Transformer`] per file, sharing an
/// operator catalogue and a per-path pragma cache (spec.md §4.3: "read
/// the unit's source file once, cached per path").
pub struct TransformPass {
    catalogue: OperatorCatalogue,
    pragma_cache: HashMap<PathBuf, SuppressedLines>,
}

/// The result of transforming one file.
pub struct TransformedFile {
    pub file: syn::File,
    pub points: Vec<DiscoveredPoint>,
    pub diagnostics: Vec<String>,
}

impl TransformPass {
    pub fn new(catalogue: OperatorCatalogue) -> Self {
        Self {
            catalogue,
            pragma_cache: HashMap::new(),
        }
    }

    /// Transform one already-loaded source file. `path` is used only as
    /// the pragma-cache key; `file_display` is the string embedded in
    /// emitted `SourceLocation`s (spec.md §6 display-name format).
    pub fn transform(&mut self, path: &Path, file_display: &str, content: &str) -> Result<TransformedFile> {
        let mut file = syn::parse_file(content).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        // The content we already have in hand is authoritative; populate
        // the cache from it rather than re-reading the file from disk.
        self.pragma_cache
            .entry(path.to_path_buf())
            .or_insert_with(|| pragma::scan(content));

        let mut transformer = Transformer::new(&self.catalogue, file_display, content);
        transformer.transform_file(&mut file);

        Ok(TransformedFile {
            file,
            points: transformer.points,
            diagnostics: transformer.diagnostics,
        })
    }
}
