// SPDX-License-Identifier: MIT OR Apache-2.0
//! Launch latency for the process-creating launchers.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use plaunch_core::{LaunchOptions, LaunchPlugin, WORKDIR_KEY};
use plaunch_registry::builtin;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn launchers() -> Vec<&'static str> {
    let mut names = vec![plaunch_spawn::NAME];
    #[cfg(unix)]
    names.push(plaunch_forkexec::NAME);
    names
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn build(name: &str) -> Box<dyn LaunchPlugin> {
    let dir = std::env::temp_dir();
    let opts = LaunchOptions::new().with(WORKDIR_KEY, dir.to_string_lossy().into_owned());
    builtin()
        .build_with_options(name, &opts)
        .expect("built-in launcher")
}

// ── Benchmarks ──────────────────────────────────────────────────────────

fn bench_true(c: &mut Criterion) {
    let mut group = c.benchmark_group("launch_true");
    let cmd = argv(&["true"]);
    for name in launchers() {
        let launcher = build(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), &cmd, |b, cmd| {
            b.iter(|| black_box(launcher.launch(cmd)));
        });
    }
    group.finish();
}

fn bench_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("launch_output");
    for kib in [4usize, 256] {
        let bytes = kib * 1024;
        let cmd = argv(&["head", "-c", &bytes.to_string(), "/dev/zero"]);
        group.throughput(Throughput::Bytes(bytes as u64));
        for name in launchers() {
            let launcher = build(name);
            group.bench_with_input(BenchmarkId::new(name, kib), &cmd, |b, cmd| {
                b.iter(|| black_box(launcher.launch(cmd)));
            });
        }
    }
    group.finish();
}

fn bench_mock(c: &mut Criterion) {
    let launcher = builtin().build(plaunch_mock::NAME).expect("mock launcher");
    let cmd = argv(&["noop"]);
    c.bench_function("launch_mock", |b| b.iter(|| black_box(launcher.launch(&cmd))));
}

criterion_group!(benches, bench_true, bench_output, bench_mock);
criterion_main!(benches);
