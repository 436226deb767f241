// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use parley_agent::agent::AgentState;
use parley_agent::policy::{DsaVariant, PolicySpec};
use parley_model::constraint::NotEqual;
use parley_model::domain::Domain;
use parley_model::index::{AgentIndex, ValueIndex};
use parley_model::model::{Model, ModelBuilder};
use std::hint::black_box;
use std::sync::Arc;

/// Ring of `size` agents over a three-value domain, one not-equal
/// constraint per edge.
fn ring_model(size: usize) -> Arc<Model<i64, f64>> {
    let mut builder = ModelBuilder::new();
    let domain = Domain::new([0i64, 1, 2]);
    let agents = builder.add_agents(size, &domain);
    for i in 0..size {
        builder.add_constraint(NotEqual::new(agents[i], agents[(i + 1) % size]));
    }
    Arc::new(builder.build().expect("ring model must build"))
}

fn bench_compute_utility(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_utility");

    for size in [16usize, 256, 4096] {
        let model = ring_model(size);
        let probe = AgentIndex::new(size / 2);
        let mut agent = AgentState::build(
            Arc::clone(&model),
            probe,
            &PolicySpec::dsa(DsaVariant::A, 0.5),
            7,
        );
        for &neighbor in model.neighbors(probe) {
            agent.ingest(neighbor, (neighbor.get() % 3) as i64);
        }

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let mut total = 0.0f64;
                for position in 0..3 {
                    total += agent.compute_utility(black_box(ValueIndex::new(position)));
                }
                total
            })
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("agent_update");

    let model = ring_model(256);
    let probe = AgentIndex::new(128);
    for spec in [
        ("wrmi", PolicySpec::wrmi()),
        ("dsa_a", PolicySpec::dsa(DsaVariant::A, 0.5)),
        ("dsan", PolicySpec::dsan()),
    ] {
        let mut agent = AgentState::build(Arc::clone(&model), probe, &spec.1, 7);
        for &neighbor in model.neighbors(probe) {
            agent.ingest(neighbor, (neighbor.get() % 3) as i64);
        }
        group.bench_function(spec.0, |b| b.iter(|| black_box(agent.update())));
    }

    group.finish();
}

criterion_group!(benches, bench_compute_utility, bench_update);
criterion_main!(benches);
