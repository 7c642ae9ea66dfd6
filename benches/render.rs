// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nodegram::PageOptions;

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group names in this file: `render.tree`, `layout.tree`, `render.paginated`
// - Case IDs (the string after the `/`) must remain stable across refactors so
//   results stay comparable over time (e.g. `small`, `medium_dense`, `routing_stress`).
fn benches_render(c: &mut Criterion) {
    let cases = [
        fixtures::tree::Case::Small,
        fixtures::tree::Case::MediumDense,
        fixtures::tree::Case::LargeLongText,
        fixtures::tree::Case::RoutingStress,
    ];

    let mut group = c.benchmark_group("layout.tree");
    for case in cases {
        let diagram = fixtures::tree::fixture(case);
        group.bench_function(case.id(), move |b| {
            b.iter(|| {
                let layout = black_box(&diagram).layout();
                black_box(layout.edges().len())
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("render.tree");
    for case in cases {
        let diagram = fixtures::tree::fixture(case);
        group.bench_function(case.id(), move |b| {
            b.iter(|| {
                let rendered = black_box(&diagram).render(false).expect("render");
                black_box(rendered.len())
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("render.paginated");
    let diagram = fixtures::tree::fixture(fixtures::tree::Case::LargeLongText);
    group.bench_function("large_long_text", move |b| {
        b.iter(|| {
            let pages = black_box(&diagram)
                .render_paginated(PageOptions { overlap: 2, ..PageOptions::default() })
                .expect("render_paginated");
            black_box(pages.len())
        })
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_render
}
criterion_main!(benches);
