use criterion::{criterion_group, criterion_main, Criterion};
use officine::nodes::kinds::NodeKind;
use officine::nodes::managed_object::ManagedObjectState;
use officine::nodes::office::OfficeState;
use officine::nodes::section::FunctionObjectState;
use officine::{AutoWire, AutoWirer, CompileGraph, MatchDirection};

fn autowire_resolution(c: &mut Criterion) {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let office = graph.add(root, "OFFICE", || NodeKind::Office(OfficeState));
    let source = graph.add(root, "REQ", || {
        NodeKind::FunctionObject(FunctionObjectState::default())
    });

    let wirer = AutoWirer::new(MatchDirection::SourceRequiresTarget);
    for i in 0..200 {
        let wire = AutoWire::qualified(format!("q{}", i), format!("example.Type{}", i));
        let name = format!("MO{}", i);
        let target = graph.add(root, &name, || {
            NodeKind::ManagedObject(ManagedObjectState {
                source: None,
                offered: vec![wire.clone()],
            })
        });
        wirer.add_target(target, vec![wire]);
    }

    let last = AutoWire::qualified("q199", "example.Type199");
    c.bench_function("autowire_200_targets_worst_case", |b| {
        b.iter(|| wirer.find_links(&mut graph, office, source, std::slice::from_ref(&last)))
    });

    let scope = wirer.scoped();
    c.bench_function("autowire_scoped_parent_delegation", |b| {
        b.iter(|| scope.find_links(&mut graph, office, source, std::slice::from_ref(&last)))
    });
}

criterion_group!(benches, autowire_resolution);
criterion_main!(benches);
