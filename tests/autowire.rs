//! Auto-wiring resolution: scoping, direction policies and lazy targets.

use officine::nodes::kinds::NodeKind;
use officine::nodes::managed_object::ManagedObjectState;
use officine::nodes::office::OfficeState;
use officine::nodes::section::FunctionObjectState;
use officine::{AutoWire, AutoWirer, CompileGraph, MatchDirection, NodeId};

fn object(graph: &mut CompileGraph, parent: NodeId, name: &str, wire: AutoWire) -> NodeId {
    graph.add(parent, name, || {
        NodeKind::ManagedObject(ManagedObjectState {
            source: None,
            offered: vec![wire],
        })
    })
}

fn requirer(graph: &mut CompileGraph, parent: NodeId, name: &str) -> NodeId {
    graph.add(parent, name, || {
        NodeKind::FunctionObject(FunctionObjectState::default())
    })
}

#[test]
fn exact_qualified_match_beats_nothing_else() {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let office = graph.add(root, "OFFICE", || NodeKind::Office(OfficeState));
    let db1 = object(&mut graph, root, "ONE", AutoWire::qualified("db1", "Conn"));
    let source = requirer(&mut graph, root, "REQ");

    let wirer = AutoWirer::new(MatchDirection::SourceRequiresTarget);
    wirer.add_target(db1, vec![AutoWire::qualified("db1", "Conn")]);

    let links = wirer.get_links(
        &mut graph,
        office,
        source,
        &[AutoWire::qualified("db1", "Conn")],
    );
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].target, db1);
    assert!(graph.issues().is_empty());
}

#[test]
fn source_requires_target_rejects_unqualified_target_for_qualified_source() {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let office = graph.add(root, "OFFICE", || NodeKind::Office(OfficeState));
    let plain = object(&mut graph, root, "PLAIN", AutoWire::new("Conn"));
    let source = requirer(&mut graph, root, "REQ");

    let wirer = AutoWirer::new(MatchDirection::SourceRequiresTarget);
    wirer.add_target(plain, vec![AutoWire::new("Conn")]);

    // A qualified requirement is not satisfied by an unqualified offer.
    let links = wirer.find_links(
        &mut graph,
        office,
        source,
        &[AutoWire::qualified("db2", "Conn")],
    );
    assert!(links.is_empty());

    // An unqualified requirement takes the unqualified offer.
    let links = wirer.find_links(&mut graph, office, source, &[AutoWire::new("Conn")]);
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].target, plain);
}

#[test]
fn target_categorises_source_flips_the_fallback() {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let office = graph.add(root, "OFFICE", || NodeKind::Office(OfficeState));
    let team = object(&mut graph, root, "TEAM", AutoWire::new("Work"));
    let source = requirer(&mut graph, root, "FN");

    let wirer = AutoWirer::new(MatchDirection::TargetCategorisesSource);
    wirer.add_target(team, vec![AutoWire::new("Work")]);

    // An unqualified classifier accepts any qualifier on the source.
    let links = wirer.find_links(
        &mut graph,
        office,
        source,
        &[AutoWire::qualified("urgent", "Work")],
    );
    assert_eq!(links.len(), 1);

    // A qualified classifier constrains the source.
    let picky = AutoWirer::new(MatchDirection::TargetCategorisesSource);
    picky.add_target(team, vec![AutoWire::qualified("urgent", "Work")]);
    assert!(picky
        .find_links(&mut graph, office, source, &[AutoWire::new("Work")])
        .is_empty());
    assert_eq!(
        picky
            .find_links(
                &mut graph,
                office,
                source,
                &[AutoWire::qualified("urgent", "Work")],
            )
            .len(),
        1
    );
}

#[test]
fn identical_fixture_resolves_differently_per_direction() {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let office = graph.add(root, "OFFICE", || NodeKind::Office(OfficeState));
    let qualified = object(&mut graph, root, "QUALIFIED", AutoWire::qualified("q", "X"));
    let plain = object(&mut graph, root, "PLAIN", AutoWire::new("X"));
    let source = requirer(&mut graph, root, "REQ");

    let fixture = [
        (qualified, AutoWire::qualified("q", "X")),
        (plain, AutoWire::new("X")),
    ];

    let forward = AutoWirer::new(MatchDirection::SourceRequiresTarget);
    let reverse = AutoWirer::new(MatchDirection::TargetCategorisesSource);
    for (node, wire) in &fixture {
        forward.add_target(*node, vec![wire.clone()]);
        reverse.add_target(*node, vec![wire.clone()]);
    }

    // Unqualified requirement: the forward policy takes the first
    // registered candidate; the reverse policy skips the qualified
    // classifier.
    let want = [AutoWire::new("X")];
    let links = forward.find_links(&mut graph, office, source, &want);
    assert_eq!(links[0].target, qualified);
    let links = reverse.find_links(&mut graph, office, source, &want);
    assert_eq!(links[0].target, plain);
}

#[test]
fn first_registered_target_wins() {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let office = graph.add(root, "OFFICE", || NodeKind::Office(OfficeState));
    let first = object(&mut graph, root, "FIRST", AutoWire::new("Conn"));
    let second = object(&mut graph, root, "SECOND", AutoWire::new("Conn"));
    let source = requirer(&mut graph, root, "REQ");

    let wirer = AutoWirer::new(MatchDirection::SourceRequiresTarget);
    wirer.add_target(first, vec![AutoWire::new("Conn")]);
    wirer.add_target(second, vec![AutoWire::new("Conn")]);

    let links = wirer.get_links(&mut graph, office, source, &[AutoWire::new("Conn")]);
    assert_eq!(links[0].target, first);
}

#[test]
fn scoped_wirer_shadows_parent_without_mutating_it() {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let office = graph.add(root, "OFFICE", || NodeKind::Office(OfficeState));
    let floor_level = object(&mut graph, root, "FLOOR", AutoWire::new("Conn"));
    let office_level = object(&mut graph, office, "LOCAL", AutoWire::new("Conn"));
    let source = requirer(&mut graph, root, "REQ");

    let parent = AutoWirer::new(MatchDirection::SourceRequiresTarget);
    parent.add_target(floor_level, vec![AutoWire::new("Conn"), AutoWire::new("Log")]);

    let scope = parent.scoped();
    scope.add_target(office_level, vec![AutoWire::new("Conn")]);

    // Child scope consults its own targets first.
    let links = scope.get_links(&mut graph, office, source, &[AutoWire::new("Conn")]);
    assert_eq!(links[0].target, office_level);

    // Delegation still reaches the parent for keys the child lacks.
    let links = scope.get_links(&mut graph, office, source, &[AutoWire::new("Log")]);
    assert_eq!(links[0].target, floor_level);

    // The parent scope itself is untouched by the child's registrations.
    let parent_links = parent.get_links(&mut graph, office, source, &[AutoWire::new("Conn")]);
    assert_eq!(parent_links[0].target, floor_level);
    assert!(graph.issues().is_empty());
}

#[test]
fn find_is_silent_and_get_raises_one_issue_per_wire() {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let office = graph.add(root, "OFFICE", || NodeKind::Office(OfficeState));
    let source = requirer(&mut graph, root, "REQ");

    let wirer = AutoWirer::new(MatchDirection::SourceRequiresTarget);

    assert!(wirer
        .find_links(&mut graph, office, source, &[AutoWire::new("Nope")])
        .is_empty());
    assert!(graph.issues().is_empty());
    assert!(!graph.node(source).flagged);

    let links = wirer.get_links(
        &mut graph,
        office,
        source,
        &[AutoWire::qualified("db2", "Conn")],
    );
    assert!(links.is_empty());
    let issues = graph.issues().snapshot();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].message, "No target found by auto-wiring db2:Conn");
    assert!(graph.node(source).flagged);
}

#[test]
fn lazy_target_materialises_only_when_selected() {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let office = graph.add(root, "OFFICE", || NodeKind::Office(OfficeState));
    let source = requirer(&mut graph, root, "REQ");
    let before = graph.len();

    let wirer = AutoWirer::new(MatchDirection::SourceRequiresTarget);
    wirer.add_lazy_target(
        |graph: &mut CompileGraph, _office| {
            let root = graph.root();
            graph.add(root, "SUPPLIED", || {
                NodeKind::ManagedObject(ManagedObjectState {
                    source: None,
                    offered: vec![AutoWire::new("Conn")],
                })
            })
        },
        vec![AutoWire::new("Conn")],
    );

    // Unselected lazy targets never construct nodes.
    assert!(wirer
        .find_links(&mut graph, office, source, &[AutoWire::new("Other")])
        .is_empty());
    assert_eq!(graph.len(), before);

    let links = wirer.get_links(&mut graph, office, source, &[AutoWire::new("Conn")]);
    assert_eq!(links.len(), 1);
    assert_eq!(graph.len(), before + 1);
    assert_eq!(graph.node(links[0].target).name, "SUPPLIED");

    // A second selection reuses the materialised node.
    let again = wirer.get_links(&mut graph, office, source, &[AutoWire::new("Conn")]);
    assert_eq!(again[0].target, links[0].target);
    assert_eq!(graph.len(), before + 1);
}

#[test]
#[should_panic(expected = "re-entered during materialisation")]
fn lazy_factory_selecting_itself_panics() {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let office = graph.add(root, "OFFICE", || NodeKind::Office(OfficeState));
    let source = requirer(&mut graph, root, "REQ");

    let wirer = AutoWirer::new(MatchDirection::SourceRequiresTarget);
    let reentrant = std::rc::Rc::clone(&wirer);
    wirer.add_lazy_target(
        move |graph: &mut CompileGraph, office| {
            // Resolves the same wire the factory itself serves.
            let links = reentrant.find_links(graph, office, source, &[AutoWire::new("Conn")]);
            links[0].target
        },
        vec![AutoWire::new("Conn")],
    );

    wirer.get_links(&mut graph, office, source, &[AutoWire::new("Conn")]);
}

#[test]
fn ordering_is_case_insensitive_with_exact_equality() {
    let lower = AutoWire::qualified("db", "conn");
    let upper = AutoWire::qualified("DB", "CONN");
    // Equality stays exact while ordering folds case.
    assert_ne!(lower, upper);
    assert_eq!(upper.cmp(&lower), std::cmp::Ordering::Less);

    let mut wires = vec![AutoWire::new("zeta"), AutoWire::new("Alpha")];
    wires.sort();
    assert_eq!(wires[0].type_name(), "Alpha");
}
