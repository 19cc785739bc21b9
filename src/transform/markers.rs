//! Source-annotation markers (spec.md §6 "Markers").
//!
//! `#[mutflow::mutate]` is the mutation-target marker (class/module/
//! freestanding-fn level; required for any transformation to apply).
//! `#[mutflow::no_mutate]` is the suppression marker, skipping the
//! annotated declaration and its descendants.
//!
//! Both are inert: recognized by path during the `syn::File` walk, then
//! stripped from the item's attribute list as part of rewriting it, so
//! the transformed output never asks `rustc` to resolve them as real
//! attribute macros.

use syn::Attribute;

fn path_is(attr: &Attribute, segments: &[&str]) -> bool {
    let path = attr.path();
    path.segments.len() == segments.len()
        && path
            .segments
            .iter()
            .zip(segments.iter())
            .all(|(seg, expected)| seg.ident == expected)
}

pub fn is_mutate_marker(attr: &Attribute) -> bool {
    path_is(attr, &["mutflow", "mutate"])
}

pub fn is_no_mutate_marker(attr: &Attribute) -> bool {
    path_is(attr, &["mutflow", "no_mutate"])
}

/// Whether `attrs` carries the mutation-target marker.
pub fn is_marked(attrs: &[Attribute]) -> bool {
    attrs.iter().any(is_mutate_marker)
}

/// Whether `attrs` carries the suppression marker.
pub fn is_suppressed(attrs: &[Attribute]) -> bool {
    attrs.iter().any(is_no_mutate_marker)
}

/// Remove both marker attributes from `attrs` in place.
pub fn strip_markers(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !is_mutate_marker(attr) && !is_no_mutate_marker(attr));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_attrs(src: &str) -> Vec<Attribute> {
        let item: syn::ItemFn = syn::parse_str(&format!("{src}\nfn f() {{}}")).unwrap();
        item.attrs
    }

    #[test]
    fn recognizes_mutate_marker() {
        let attrs = parse_attrs("#[mutflow::mutate]");
        assert!(is_marked(&attrs));
        assert!(!is_suppressed(&attrs));
    }

    #[test]
    fn recognizes_no_mutate_marker() {
        let attrs = parse_attrs("#[mutflow::no_mutate]");
        assert!(is_suppressed(&attrs));
        assert!(!is_marked(&attrs));
    }

    #[test]
    fn unrelated_attribute_matches_neither() {
        let attrs = parse_attrs("#[allow(dead_code)]");
        assert!(!is_marked(&attrs));
        assert!(!is_suppressed(&attrs));
    }

    #[test]
    fn strip_markers_removes_both_but_keeps_others() {
        let mut attrs = parse_attrs("#[mutflow::mutate]\n#[allow(dead_code)]");
        strip_markers(&mut attrs);
        assert_eq!(attrs.len(), 1);
        assert!(!is_marked(&attrs));
    }
}
