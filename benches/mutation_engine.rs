//! Benchmarks for the mutation engine's hot paths: `Registry::check`
//! under concurrent access (every injected dispatch branch calls this at
//! runtime) and the IR transformer's per-file pass (every marked source
//! file pays this once per compile).

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mutflow::operators::OperatorCatalogue;
use mutflow::registry::{self, ActiveMutation, SourceLocation};
use mutflow::transform::TransformPass;

fn registry_check_uncontended(c: &mut Criterion) {
    registry::reset_for_test();
    c.bench_function("registry_check_no_session", |b| {
        b.iter(|| {
            black_box(registry::check(
                "Calc_0",
                2,
                SourceLocation {
                    file: "Calc.rs".into(),
                    line: 1,
                },
                ">",
                &[">=", "<"],
                1,
            ))
        })
    });
}

fn registry_check_within_session(c: &mut Criterion) {
    registry::reset_for_test();
    let active = ActiveMutation {
        point_id: "Calc_0".into(),
        variant_index: 0,
    };
    let loc = SourceLocation {
        file: "Calc.rs".into(),
        line: 1,
    };
    registry::with_session(Some(active), |_handle| {
        c.bench_function("registry_check_active_session", |b| {
            b.iter(|| {
                black_box(registry::check(
                    "Calc_0",
                    2,
                    loc.clone(),
                    ">",
                    &[">=", "<"],
                    1,
                ))
            })
        });
    });
}

fn registry_check_under_contention(c: &mut Criterion) {
    use std::sync::Arc;
    use std::thread;

    registry::reset_for_test();
    c.bench_function("registry_check_8_threads", |b| {
        b.iter(|| {
            registry::with_session(None, |_handle| {
                let loc = Arc::new(SourceLocation {
                    file: "Calc.rs".into(),
                    line: 1,
                });
                let handles: Vec<_> = (0..8)
                    .map(|t| {
                        let loc = Arc::clone(&loc);
                        thread::spawn(move || {
                            for i in 0..100 {
                                let point_id = format!("Calc_{}", i % 4);
                                black_box(registry::check(
                                    &point_id,
                                    2,
                                    (*loc).clone(),
                                    ">",
                                    &[">=", "<"],
                                    1,
                                ));
                            }
                            t
                        })
                    })
                    .collect();
                for h in handles {
                    h.join().unwrap();
                }
            });
        })
    });
}

const REPRESENTATIVE_FILE: &str = r#"
#[mutflow::mutate]
impl Calculator {
    fn add(&self, a: i32, b: i32) -> i32 {
        a + b
    }

    fn is_in_range(&self, x: i32, min: i32, max: i32) -> bool {
        x >= min && x <= max
    }

    fn safe_divide_candidate(&self, a: i32, b: i32) -> i32 {
        a * b
    }

    fn classify(&self, x: i32) -> bool {
        if x > 0 {
            return true;
        }
        return false;
    }

    fn record(&mut self, last: i32) {
        self.last = last;
    }
}
"#;

fn ir_transform_representative_file(c: &mut Criterion) {
    c.bench_function("transform_representative_file", |b| {
        b.iter(|| {
            let mut pass = TransformPass::new(OperatorCatalogue::new());
            let result = pass
                .transform(
                    std::path::Path::new("Calculator.rs"),
                    "Calculator.rs",
                    REPRESENTATIVE_FILE,
                )
                .unwrap();
            black_box(result.points.len())
        })
    });
}

criterion_group!(
    benches,
    registry_check_uncontended,
    registry_check_within_session,
    registry_check_under_contention,
    ir_transform_representative_file,
);
criterion_main!(benches);
