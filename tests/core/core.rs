//! Graph and naming behaviour at the crate boundary.

use officine::nodes::kinds::NodeKind;
use officine::nodes::managed_object::ManagedObjectSourceState;
use officine::nodes::node::qualify;
use officine::nodes::office::{OfficeInputState, OfficeState};
use officine::nodes::section::{SectionState, SectionInputState};
use officine::{CompileGraph, LinkRole};

#[test]
fn qualify_joins_present_segments() {
    assert_eq!(
        qualify(&[Some("A"), Some("B"), Some("C")]),
        "A.B.C".to_string()
    );
}

#[test]
fn qualify_marks_absent_inner_segment() {
    assert_eq!(qualify(&[Some("A"), None, Some("C")]), "A.[null].C");
}

#[test]
fn qualify_marks_blank_inner_segment() {
    assert_eq!(qualify(&[Some("A"), Some(""), Some("C")]), "A.[].C");
}

#[test]
fn qualify_suppresses_leading_absent_segments() {
    assert_eq!(qualify(&[None, Some("B")]), "B");
    assert_eq!(qualify(&[Some(""), Some("B")]), "B");
}

#[test]
fn qualify_escapes_inner_dots() {
    assert_eq!(qualify(&[Some("A"), Some("b.c")]), "A.b_c");
}

#[test]
fn second_add_keeps_first_node_and_raises_one_issue() {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let first = graph.add(root, "SECTION", || {
        NodeKind::Section(SectionState::default())
    });
    let second = graph.add(root, "SECTION", || {
        NodeKind::Section(SectionState::default())
    });
    assert_eq!(first, second);
    let issues = graph.issues().snapshot();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].message, "Section SECTION already added");
    assert_eq!(issues[0].kind, "Section");
}

#[test]
fn second_single_valued_link_keeps_first_and_raises_one_issue() {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let office = graph.add(root, "OFFICE", || NodeKind::Office(OfficeState));
    let input = graph.add(office, "INPUT", || {
        NodeKind::OfficeInput(OfficeInputState::default())
    });
    let section = graph.add(office, "SECTION", || {
        NodeKind::Section(SectionState::default())
    });
    let a = graph.add(section, "A", || NodeKind::SectionInput(SectionInputState));
    let b = graph.add(section, "B", || NodeKind::SectionInput(SectionInputState));

    assert!(graph.link(input, LinkRole::Flow, a).unwrap());
    assert!(!graph.link(input, LinkRole::Flow, b).unwrap());
    assert_eq!(graph.linked(input, LinkRole::Flow), Some(a));

    let issues = graph.issues().snapshot();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].message, "Office Input INPUT linked more than once");
    assert_eq!(issues[0].node, "OFFICE.INPUT");
}

#[test]
fn ordering_link_set_is_idempotent_and_ordered() {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let a = graph.add(root, "A", || {
        NodeKind::ManagedObjectSource(ManagedObjectSourceState::default())
    });
    let b = graph.add(root, "B", || {
        NodeKind::ManagedObjectSource(ManagedObjectSourceState::default())
    });
    let c = graph.add(root, "C", || {
        NodeKind::ManagedObjectSource(ManagedObjectSourceState::default())
    });

    assert!(graph.link(a, LinkRole::StartAfter, b).unwrap());
    assert!(graph.link(a, LinkRole::StartAfter, c).unwrap());
    // Duplicate is a no-op, no issue raised.
    assert!(!graph.link(a, LinkRole::StartAfter, b).unwrap());
    assert!(graph.issues().is_empty());

    match &graph.node(a).kind {
        NodeKind::ManagedObjectSource(state) => {
            assert_eq!(state.start_after.peers(), &[b, c]);
        }
        _ => unreachable!(),
    }
}

#[test]
fn unsupported_role_is_programmer_error_not_issue() {
    let mut graph = CompileGraph::new("");
    let root = graph.root();
    let section = graph.add(root, "SECTION", || {
        NodeKind::Section(SectionState::default())
    });
    let err = graph.link(section, LinkRole::Pool, section).unwrap_err();
    assert!(err.to_string().contains("does not carry link role"));
    assert!(graph.issues().is_empty());
}
