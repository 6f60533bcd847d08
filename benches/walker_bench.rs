//! Benchmarks for filter-walker
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn benchmark_queue_operations(c: &mut Criterion) {
    use filter_walker::walker::queue::{DirTask, WorkQueue};

    c.bench_function("queue_push_pop", |b| {
        let queue = WorkQueue::new(10000);
        let sender = queue.sender();
        let receiver = queue.receiver();

        b.iter(|| {
            let task = DirTask::new("/test/path".into());
            sender.try_push(task).unwrap();
            let received = receiver.try_pop().unwrap();
            black_box(received);
        })
    });
}

fn benchmark_glob_matching(c: &mut Criterion) {
    use filter_walker::filter::match_glob;

    c.bench_function("glob_single_star", |b| {
        b.iter(|| black_box(match_glob(black_box("src/walker/queue.rs"), "src/*/*.rs", false)))
    });

    c.bench_function("glob_double_star", |b| {
        b.iter(|| {
            black_box(match_glob(
                black_box("docs/guide/deep/nested/page.html"),
                "docs/**/*.html",
                true,
            ))
        })
    });
}

fn benchmark_rule_evaluation(c: &mut Criterion) {
    use filter_walker::filter::RuleSet;

    let rules = RuleSet::from_lines([
        "# build output",
        "target/",
        "build/",
        "*.o",
        "*.log",
        "!important.log",
        "/node_modules/",
        "**/*.tmp",
        "docs/**/*.html",
    ]);

    c.bench_function("rules_file_kept", |b| {
        b.iter(|| black_box(rules.is_ignored(black_box("project/src/main.rs"), false)))
    });

    c.bench_function("rules_file_ignored", |b| {
        b.iter(|| black_box(rules.is_ignored(black_box("project/logs/server.log"), false)))
    });

    c.bench_function("rules_dir_pruned", |b| {
        b.iter(|| black_box(rules.is_ignored(black_box("project/crate/target"), true)))
    });
}

fn benchmark_seen_set(c: &mut Criterion) {
    use filter_walker::walker::SeenSet;

    c.bench_function("seen_set_insert", |b| {
        let seen = SeenSet::new();
        let mut i = 0u64;

        b.iter(|| {
            i += 1;
            black_box(seen.insert(&format!("dir/sub/File{}.txt", i)))
        })
    });
}

criterion_group!(
    benches,
    benchmark_queue_operations,
    benchmark_glob_matching,
    benchmark_rule_evaluation,
    benchmark_seen_set,
);
criterion_main!(benches);
