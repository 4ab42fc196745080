use cogex_core::{Gate, HookKind, Stage, StimulusPair};
use cogex_experiment::{ExperimentConfig, Protocol, TimelineBuilder, TrialOrder};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn dataset(n: usize) -> Vec<StimulusPair> {
    (0..n)
        .map(|i| StimulusPair::new(format!("w{i}a"), format!("w{i}b")))
        .collect()
}

fn bench_trial_block(c: &mut Criterion) {
    let pairs = dataset(500);
    let mut group = c.benchmark_group("trial_block");
    for order in [TrialOrder::Sequential, TrialOrder::Randomized] {
        group.bench_function(format!("{order:?}_500"), |b| {
            b.iter(|| {
                TimelineBuilder::new(ExperimentConfig::default(), StdRng::seed_from_u64(1))
                    .stage(
                        Stage::static_content("personal_info", "Taustatiedot", Some("next"))
                            .with_gate(
                                Gate::ParticipantInfo,
                                Some(HookKind::CommitParticipantProperties),
                            ),
                    )
                    .trial_block(black_box(pairs.clone()), order)
                    .build()
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_demo_protocol(c: &mut Criterion) {
    let protocol = Protocol::from_toml_str(include_str!("../../demos/word_choice.toml")).unwrap();
    c.bench_function("demo_protocol", |b| {
        b.iter(|| protocol.build_timeline(StdRng::seed_from_u64(1)).unwrap())
    });
}

criterion_group!(benches, bench_trial_block, bench_demo_protocol);
criterion_main!(benches);
