//! Session summary (spec.md §4.4 "Summary"): total (filter-aware)
//! mutations, tested/killed/survived/remaining counts, per-tested
//! mutation result, and copy-pastable trap lines for every survivor.

use serde::Serialize;

use crate::registry::ActiveMutation;

use super::MutationOutcome;

#[derive(Debug, Clone, Serialize)]
pub struct TestedMutationSummary {
    pub display_name: String,
    pub outcome: OutcomeSummary,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum OutcomeSummary {
    Killed { by_test: String },
    Survived,
    TimedOut { hint: String },
}

impl From<&MutationOutcome> for OutcomeSummary {
    fn from(outcome: &MutationOutcome) -> Self {
        match outcome {
            MutationOutcome::Killed(test) => OutcomeSummary::Killed { by_test: test.clone() },
            MutationOutcome::Survived => OutcomeSummary::Survived,
            MutationOutcome::TimedOut(hint) => OutcomeSummary::TimedOut { hint: hint.clone() },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub tested: usize,
    pub killed: usize,
    pub survived: usize,
    pub timed_out: usize,
    pub remaining: usize,
    pub mutations: Vec<TestedMutationSummary>,
    pub survivor_traps: Vec<String>,
    pub partial_run: bool,
}

impl Summary {
    pub fn build(
        total: usize,
        tested: Vec<(ActiveMutation, MutationOutcome, String)>,
        partial_run: bool,
    ) -> Self {
        let mut killed = 0;
        let mut survived = 0;
        let mut timed_out = 0;
        let mut mutations = Vec::with_capacity(tested.len());
        let mut survivor_traps = Vec::new();

        for (_mutation, outcome, display_name) in &tested {
            match outcome {
                MutationOutcome::Killed(_) => killed += 1,
                MutationOutcome::Survived => {
                    survived += 1;
                    survivor_traps.push(display_name.clone());
                }
                MutationOutcome::TimedOut(_) => timed_out += 1,
            }
            mutations.push(TestedMutationSummary {
                display_name: display_name.clone(),
                outcome: OutcomeSummary::from(outcome),
            });
        }

        let remaining = total.saturating_sub(tested.len());

        Self {
            total,
            tested: tested.len(),
            killed,
            survived,
            timed_out,
            remaining,
            mutations,
            survivor_traps,
            partial_run,
        }
    }

    pub fn has_survivors(&self) -> bool {
        self.survived > 0
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.partial_run {
            writeln!(f, "Partial run detected — no mutations reported.")?;
            return Ok(());
        }
        writeln!(
            f,
            "Mutations: {} total, {} tested, {} killed, {} survived, {} timed out, {} remaining",
            self.total, self.tested, self.killed, self.survived, self.timed_out, self.remaining
        )?;
        for mutation in &self.mutations {
            let result = match &mutation.outcome {
                OutcomeSummary::Killed { by_test } => format!("killed by {by_test}"),
                OutcomeSummary::Survived => "SURVIVED".to_string(),
                OutcomeSummary::TimedOut { hint } => format!("TIMED OUT ({hint})"),
            };
            writeln!(f, "  {} — {}", mutation.display_name, result)?;
        }
        if !self.survivor_traps.is_empty() {
            writeln!(f, "\nTraps for survivors (copy into harness config):")?;
            for trap in &self.survivor_traps {
                writeln!(f, "  {trap}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mutation(id: &str) -> ActiveMutation {
        ActiveMutation {
            point_id: id.to_string(),
            variant_index: 0,
        }
    }

    #[test]
    fn summary_counts_outcomes() {
        let tested = vec![
            (mutation("a"), MutationOutcome::Killed("t1".into()), "(a) x → y".to_string()),
            (mutation("b"), MutationOutcome::Survived, "(b) x → y".to_string()),
            (mutation("c"), MutationOutcome::TimedOut("suppress".into()), "(c) x → y".to_string()),
        ];
        let summary = Summary::build(5, tested, false);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.tested, 3);
        assert_eq!(summary.killed, 1);
        assert_eq!(summary.survived, 1);
        assert_eq!(summary.timed_out, 1);
        assert_eq!(summary.remaining, 2);
        assert_eq!(summary.survivor_traps, vec!["(b) x → y".to_string()]);
    }

    #[test]
    fn partial_run_summary_reports_no_mutations() {
        let summary = Summary::build(0, Vec::new(), true);
        assert!(summary.partial_run);
        assert_eq!(summary.to_string(), "Partial run detected — no mutations reported.\n");
    }
}
