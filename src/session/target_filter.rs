//! Target filter (spec.md §4.4 "Target filter"): restricts
//! selection/exhaustion/summary to an include/exclude owner-name set.
//! Never applied to discovery or touch counting, so touch weights stay
//! accurate across the whole baseline regardless of filtering.

use crate::registry::PointId;

/// Extract the owner (fully-qualified containing compilation unit) from
/// a `<owner>_<n>` point id: everything before the last `_`.
pub fn owner_of(point_id: &PointId) -> &str {
    point_id.rsplit_once('_').map(|(owner, _)| owner).unwrap_or(point_id.as_str())
}

#[derive(Debug, Clone, Default)]
pub struct TargetFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl TargetFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Whether a point belongs in the filtered pool.
    pub fn allows(&self, point_id: &PointId) -> bool {
        let owner = owner_of(point_id);
        if !self.include.is_empty() && !self.include.iter().any(|t| t == owner) {
            return false;
        }
        !self.exclude.iter().any(|t| t == owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_of_strips_trailing_counter() {
        assert_eq!(owner_of(&"my.pkg.Calc_12".to_string()), "my.pkg.Calc");
    }

    #[test]
    fn empty_filter_allows_everything() {
        let filter = TargetFilter::default();
        assert!(filter.allows(&"Calc_0".to_string()));
    }

    #[test]
    fn include_restricts_to_listed_owners() {
        let filter = TargetFilter::new(vec!["Calc".into()], vec![]);
        assert!(filter.allows(&"Calc_0".to_string()));
        assert!(!filter.allows(&"Other_0".to_string()));
    }

    #[test]
    fn exclude_removes_listed_owners() {
        let filter = TargetFilter::new(vec![], vec!["Calc".into()]);
        assert!(!filter.allows(&"Calc_0".to_string()));
        assert!(filter.allows(&"Other_0".to_string()));
    }
}
