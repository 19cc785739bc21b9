//! Display-name canonicalization (spec.md §4.4, §6) and trap resolution
//! (spec.md §4.4 "Trap resolution").
//!
//! Format: `(<fileName>:<lineNumber>) <originalOperator> → <variantOperator>`
//! with an optional ` #<occurrence>` suffix when `occurrenceOnLine > 1`.
//! This string is both the survivor-report token and the valid form for
//! traps — point ids are never exposed here (spec.md §9 Open Questions).

use crate::registry::{ActiveMutation, DiscoveredPoint};

/// Render the canonical display name for one variant of a discovered
/// point.
pub fn display_name(point: &DiscoveredPoint, variant_index: u32) -> String {
    let variant_operator = point
        .variant_operators
        .get(variant_index as usize)
        .map(String::as_str)
        .unwrap_or("?");
    let suffix = if point.occurrence_on_line > 1 {
        format!(" #{}", point.occurrence_on_line)
    } else {
        String::new()
    };
    format!(
        "({}:{}) {} → {}{}",
        point.source_location.file,
        point.source_location.line,
        point.original_operator,
        variant_operator,
        suffix,
    )
}

/// Resolve user-supplied trap strings against every discovered point's
/// variants, in the trap list's declared order. Unresolved traps are
/// returned separately so the caller can emit a diagnostic listing
/// candidates and ignore them (spec.md §7 "Unresolved trap").
pub struct TrapResolution {
    pub resolved: Vec<ActiveMutation>,
    pub unresolved: Vec<String>,
    pub candidates: Vec<String>,
}

pub fn resolve_traps<'a>(
    traps: &[String],
    points: impl Iterator<Item = &'a DiscoveredPoint>,
) -> TrapResolution {
    let mut table: Vec<(String, ActiveMutation)> = Vec::new();
    for point in points {
        for variant_index in 0..point.variant_count {
            table.push((
                display_name(point, variant_index),
                ActiveMutation {
                    point_id: point.point_id.clone(),
                    variant_index,
                },
            ));
        }
    }
    let candidates: Vec<String> = table.iter().map(|(name, _)| name.clone()).collect();

    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();
    for trap in traps {
        match table.iter().find(|(name, _)| name == trap) {
            Some((_, mutation)) => resolved.push(mutation.clone()),
            None => unresolved.push(trap.clone()),
        }
    }

    TrapResolution {
        resolved,
        unresolved,
        candidates,
    }
}
