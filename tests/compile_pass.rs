//! Whole-pass behaviour: lowering, wiring, type loading and gated emission.

use officine::{Compiler, RecordingSink};

fn compile(toml: &str) -> (officine::CompileReport, RecordingSink) {
    let compiler = Compiler::stock();
    let mut sink = RecordingSink::new();
    let report = compiler.compile_str(toml, &mut sink).unwrap();
    (report, sink)
}

const APP: &str = r#"
[officefloor]
name = ""

[[executives]]
name = "EXEC"

[[pools]]
name = "POOL"

[[teams]]
name = "WORKERS"
source = "passive"
type = "worker"
oversight = "EXEC"

[[managed_object_sources]]
name = "DB"
source = "value"
pool = "POOL"
[managed_object_sources.properties]
type = "example.Connection"

[[managed_objects]]
name = "CONNECTION"
source = "DB"
type = "example.Connection"

[[offices]]
name = "OFFICE"

[[offices.inputs]]
name = "INPUT"
section = "SECTION"
input = "IN"

[[offices.sections]]
name = "SECTION"
inputs = ["IN"]

[[offices.sections.outputs]]
name = "OUT"
link = "SECTION.IN"

[[offices.sections.functions]]
name = "HANDLE"
team_type = "worker"

[[offices.sections.functions.objects]]
name = "conn"
type = "example.Connection"

[[governances]]
name = "TX"
source = "simple"
governs = ["CONNECTION"]
[governances.properties]
extension = "example.Tx"

[[administrations]]
name = "AUDIT"
source = "simple"
administers = ["CONNECTION"]
order = "post"
[administrations.properties]
extension = "example.Audit"
"#;

#[test]
fn clean_pass_builds_and_emits_in_order() {
    let (report, sink) = compile(APP);
    assert!(report.built, "issues: {:?}", report.issues);
    assert!(report.issues.is_empty());

    let executive = sink.position("executive EXEC").unwrap();
    let pool = sink.position("pool POOL").unwrap();
    let team = sink.position("team WORKERS").unwrap();
    let source = sink.position("managed_object_source DB").unwrap();
    let object = sink.position("managed_object CONNECTION").unwrap();
    let office = sink.position("office OFFICE").unwrap();
    let input = sink.position("office_input OFFICE.INPUT").unwrap();
    let section = sink.position("section OFFICE.SECTION").unwrap();
    let function = sink.position("function OFFICE.SECTION.HANDLE").unwrap();
    let governance = sink.position("governance TX").unwrap();
    let administration = sink.position("administration AUDIT").unwrap();

    assert!(executive < pool && pool < team && team < source);
    assert!(source < object, "sources precede the objects they back");
    assert!(object < office && office < input && input < section);
    assert!(section < function, "teams already bound when functions arrive");
    assert!(function < governance && governance < administration);
}

#[test]
fn clean_pass_resolves_wiring_and_registers_mbeans() {
    let (report, sink) = compile(APP);
    assert!(report.built);

    let team_line = &sink.calls[sink.position("team WORKERS").unwrap()];
    assert!(team_line.contains("oversight=Some(\"EXEC\")"));

    let function_line = &sink.calls[sink.position("function").unwrap()];
    assert!(function_line.contains("team=Some(\"WORKERS\")"));

    let object_line = &sink.calls[sink.position("managed_object CONNECTION").unwrap()];
    assert!(object_line.contains("source=DB"));

    let source_line = &sink.calls[sink.position("managed_object_source DB").unwrap()];
    assert!(source_line.contains("pool=Some(\"POOL\")"));

    let governance_line = &sink.calls[sink.position("governance TX").unwrap()];
    assert!(governance_line.contains("governed=[\"CONNECTION\"]"));

    let administration_line = &sink.calls[sink.position("administration AUDIT").unwrap()];
    assert!(administration_line.contains("pre=false"));

    assert!(report
        .mbeans
        .iter()
        .any(|m| m.kind == "Managed Object Source" && m.name == "DB"));
    assert!(report.mbeans.iter().any(|m| m.kind == "Team"));
}

#[test]
fn ordering_roles_reach_the_source_binding() {
    let (report, sink) = compile(
        r#"
        [[managed_object_sources]]
        name = "CACHE"
        source = "value"
        [managed_object_sources.properties]
        type = "example.Cache"

        [[managed_object_sources]]
        name = "QUEUE"
        source = "value"
        [managed_object_sources.properties]
        type = "example.Queue"

        [[managed_object_sources]]
        name = "DB"
        source = "value"
        start_before = ["QUEUE"]
        start_after = ["CACHE"]
        startup_before = ["QUEUE"]
        startup_after = ["CACHE"]
        [managed_object_sources.properties]
        type = "example.Connection"
        "#,
    );
    assert!(report.built);

    let db_line = &sink.calls[sink.position("managed_object_source DB").unwrap()];
    assert!(db_line.contains("start_before=[\"QUEUE\"]"));
    assert!(db_line.contains("start_after=[\"CACHE\"]"));
    assert!(db_line.contains("startup_before=[\"QUEUE\"]"));
    assert!(db_line.contains("startup_after=[\"CACHE\"]"));

    // Peers carry no ordering of their own.
    let cache_line = &sink.calls[sink.position("managed_object_source CACHE").unwrap()];
    assert!(cache_line.contains("start_before=[] start_after=[] startup_before=[] startup_after=[]"));
}

#[test]
fn duplicate_source_name_reports_and_withholds_sink() {
    let (report, sink) = compile(
        r#"
        [[managed_object_sources]]
        name = "MO"
        source = "value"
        [managed_object_sources.properties]
        type = "example.A"

        [[managed_object_sources]]
        name = "MO"
        source = "value"
        [managed_object_sources.properties]
        type = "example.B"
        "#,
    );
    assert!(!report.built);
    assert!(sink.calls.is_empty(), "sink receives nothing on a dirty pass");
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].message, "Managed Object Source MO already added");
}

#[test]
fn duplicate_section_name_is_one_issue() {
    let (report, _sink) = compile(
        r#"
        [[offices]]
        name = "OFFICE"

        [[offices.sections]]
        name = "SECTION"

        [[offices.sections]]
        name = "SECTION"
        "#,
    );
    assert!(!report.built);
    assert!(report
        .issues
        .iter()
        .any(|i| i.message == "Section SECTION already added"));
}

#[test]
fn input_managed_object_binds_once() {
    let (report, _sink) = compile(
        r#"
        [[managed_object_sources]]
        name = "A"
        source = "value"
        [managed_object_sources.properties]
        type = "example.A"

        [[managed_object_sources]]
        name = "B"
        source = "value"
        [managed_object_sources.properties]
        type = "example.B"

        [[input_managed_objects]]
        name = "EVENTS"
        sources = ["A", "B"]
        "#,
    );
    assert!(!report.built);
    assert!(report
        .issues
        .iter()
        .any(|i| i.message == "Input Managed Object EVENTS linked more than once"));
}

#[test]
fn unresolved_required_wire_is_reported_once_per_wire() {
    let (report, sink) = compile(
        r#"
        [[offices]]
        name = "OFFICE"

        [[offices.sections]]
        name = "SECTION"

        [[offices.sections.functions]]
        name = "HANDLE"

        [[offices.sections.functions.objects]]
        name = "conn"
        type = "example.Connection"
        qualifier = "db2"
        "#,
    );
    assert!(!report.built);
    assert!(sink.calls.is_empty());
    let unresolved: Vec<_> = report
        .issues
        .iter()
        .filter(|i| i.message == "No target found by auto-wiring db2:example.Connection")
        .collect();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].node, "OFFICE.SECTION.HANDLE.conn");
}

#[test]
fn office_scoped_object_shadows_officefloor_object() {
    let (report, sink) = compile(
        r#"
        [[managed_object_sources]]
        name = "SHARED"
        source = "value"
        [managed_object_sources.properties]
        type = "example.Connection"

        [[managed_object_sources]]
        name = "LOCAL"
        source = "value"
        [managed_object_sources.properties]
        type = "example.Connection"

        [[managed_objects]]
        name = "FLOOR_CONN"
        source = "SHARED"
        type = "example.Connection"

        [[managed_objects]]
        name = "OFFICE_CONN"
        source = "LOCAL"
        type = "example.Connection"
        office = "OFFICE"

        [[offices]]
        name = "OFFICE"

        [[offices.sections]]
        name = "SECTION"

        [[offices.sections.functions]]
        name = "HANDLE"

        [[offices.sections.functions.objects]]
        name = "conn"
        type = "example.Connection"
        "#,
    );
    assert!(report.built, "issues: {:?}", report.issues);
    // Both objects emit, the office-scoped one after the floor-scoped one.
    let floor = sink.position("managed_object FLOOR_CONN").unwrap();
    let scoped = sink.position("managed_object OFFICE.OFFICE_CONN").unwrap();
    assert!(floor < scoped);
}

#[test]
fn supplier_materialises_only_selected_sources() {
    let (report, sink) = compile(
        r#"
        [[suppliers]]
        name = "SUP"
        source = "properties"
        [suppliers.properties]
        CACHE = "example.Cache"
        SPARE = "example.Spare"

        [[offices]]
        name = "OFFICE"

        [[offices.sections]]
        name = "SECTION"

        [[offices.sections.functions]]
        name = "HANDLE"

        [[offices.sections.functions.objects]]
        name = "cache"
        type = "example.Cache"
        "#,
    );
    assert!(report.built, "issues: {:?}", report.issues);
    // The selected supply materialises a source and its backing object.
    assert!(sink.position("managed_object_source CACHE").is_some());
    assert!(sink.position("managed_object CACHE_OBJECT source=CACHE").is_some());
    // The unselected supply never becomes a node.
    assert!(sink.position("SPARE").is_none());
}

#[test]
fn unknown_source_name_is_an_issue_not_a_crash() {
    let (report, sink) = compile(
        r#"
        [[teams]]
        name = "T"
        source = "nope"
        "#,
    );
    assert!(!report.built);
    assert!(sink.calls.is_empty());
    assert!(report.issues.iter().any(|i| i.message == "Unknown source 'nope'"));
}

#[test]
fn sized_team_without_size_is_an_issue() {
    let (report, _sink) = compile(
        r#"
        [[teams]]
        name = "T"
        source = "executor"
        "#,
    );
    assert!(!report.built);
    assert!(report
        .issues
        .iter()
        .any(|i| i.message == "Team size must be specified"));
}

#[test]
fn issues_accumulate_across_nodes_in_one_pass() {
    let (report, _sink) = compile(
        r#"
        [[teams]]
        name = "T"
        source = "nope"

        [[managed_object_sources]]
        name = "MO"
        source = "value"
        [managed_object_sources.properties]
        type = "example.A"

        [[managed_object_sources]]
        name = "MO"
        source = "value"
        [managed_object_sources.properties]
        type = "example.A"
        "#,
    );
    assert!(!report.built);
    assert!(report.issues.len() >= 2, "one pass reports every problem");
}
