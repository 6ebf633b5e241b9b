use std::fs;
use unfold::DefinitionError;
use unfold::EngineConfig;
use unfold::dsl::builder::{WorkflowBuilder, decision, do_while, simple};
use unfold::dsl::loader;
use unfold::dsl::{ConstructType, NodeKind};
use unfold::runtime::catalog::{InMemoryCatalog, TaskDefCatalog};
use unfold::runtime::ids::IdStrategy;

fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let file_path = dir.path().join(name);
    fs::write(&file_path, content).expect("Failed to write temp file");
    file_path
}

#[test]
fn test_load_loop_workflow_from_yaml() {
    let yaml_content = r#"
name: "crawl"
version: 2
input_parameters: ["start_url"]
tasks:
  - reference_name: "pages"
    name: "page_loop"
    type: "DO_WHILE"
    loop_condition: "${fetch_has_next} == true"
    loop_over:
      - reference_name: "fetch"
        name: "fetch_page"
        type: "SIMPLE"
        input_parameters:
          url: "${workflow.input.start_url}"
      - reference_name: "route"
        name: "DECISION"
        type: "DECISION"
        case_expression: "${kind}"
        decision_cases:
          html:
            - reference_name: "parse"
              name: "parse_html"
              type: "SIMPLE"
        default_case:
          - reference_name: "skip"
            name: "noop"
            type: "SIMPLE"
"#;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = write_temp(&temp_dir, "crawl.yaml", yaml_content);

    let loaded = loader::load_workflow_from_yaml(&file_path).expect("Failed to load workflow from YAML");

    let expected = WorkflowBuilder::new("crawl")
        .version(2)
        .input_parameter("start_url")
        .do_while("pages", "page_loop", "${fetch_has_next} == true", vec![
            simple("fetch", "fetch_page").param("url", "${workflow.input.start_url}"),
            decision(
                "route",
                "${kind}",
                vec![("html", vec![simple("parse", "parse_html")])],
                vec![simple("skip", "noop")],
            ),
        ])
        .build();

    assert_eq!(loaded, expected);
    assert_eq!(loaded.first_node().map(|n| n.construct_type()), Some(ConstructType::Loop));
    assert_eq!(loaded.find_node("parse").map(|n| n.name.as_str()), Some("parse_html"));
    assert!(matches!(
        loaded.find_node("route").map(|n| &n.kind),
        Some(NodeKind::Decision { .. })
    ));
}

#[test]
fn test_load_rejects_invalid_definitions() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = write_temp(&temp_dir, "bad.yaml", r#"
name: "bad"
tasks:
  - reference_name: "T__1"
    name: "t1_def"
    type: "SIMPLE"
"#);

    let err = loader::load_workflow_from_yaml(&file_path).unwrap_err();

    assert!(format!("{:#}", err).contains("reserved loop delimiter"));
}

#[test]
fn test_validate_definition_rules() {
    let duplicate = WorkflowBuilder::new("dup")
        .simple("T1", "a")
        .do_while("L", "loop_def", "false", vec![simple("T1", "b")])
        .build();
    assert_eq!(duplicate.validate(), Err(DefinitionError::DuplicateReference("T1".to_string())));

    let empty_body = WorkflowBuilder::new("empty")
        .task(do_while("L", "loop_def", "false", vec![]))
        .build();
    assert_eq!(empty_body.validate(), Err(DefinitionError::EmptyLoopBody("L".to_string())));

    let nested_delimiter = WorkflowBuilder::new("nested")
        .do_while("L", "loop_def", "false", vec![simple("bad__name", "a")])
        .build();
    assert_eq!(
        nested_delimiter.validate(),
        Err(DefinitionError::ReservedDelimiter("bad__name".to_string()))
    );

    let no_tasks = WorkflowBuilder::new("nothing").build();
    assert_eq!(no_tasks.validate(), Err(DefinitionError::NoTasks("nothing".to_string())));

    let fine = WorkflowBuilder::new("fine")
        .do_while("L", "loop_def", "false", vec![simple("T_1", "a")])
        .build();
    assert_eq!(fine.validate(), Ok(()));
}

#[test]
fn test_load_catalog_from_yaml() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = write_temp(&temp_dir, "catalog.yaml", r#"
- name: "fetch_page"
  description: "Downloads one page"
  retry_count: 3
  rate_limit_per_frequency: 5
  rate_limit_frequency_in_seconds: 10
- name: "page_loop"
"#);

    let definitions = loader::load_catalog_from_yaml(&file_path).expect("Failed to load catalog");
    let catalog = InMemoryCatalog::from_definitions(definitions);

    assert_eq!(catalog.len(), 2);
    let fetch = catalog.lookup("fetch_page").expect("fetch_page missing");
    assert_eq!(fetch.retry_count, 3);
    assert_eq!(fetch.rate_limit_per_frequency, 5);
    assert_eq!(fetch.rate_limit_frequency_in_seconds, 10);

    let page_loop = catalog.lookup("page_loop").expect("page_loop missing");
    assert_eq!(page_loop.rate_limit_per_frequency, 0);
    assert_eq!(page_loop.rate_limit_frequency_in_seconds, 1);
    assert!(catalog.lookup("unknown").is_none());
}

#[test]
fn test_load_config_from_yaml() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let full = write_temp(&temp_dir, "engine.yaml", "max_loop_iterations: 50\nid_strategy: sequential\n");
    let partial = write_temp(&temp_dir, "partial.yaml", "id_strategy: sequential\n");

    let config = loader::load_config_from_yaml(&full).expect("Failed to load config");
    assert_eq!(config, EngineConfig { max_loop_iterations: 50, id_strategy: IdStrategy::Sequential });

    let config = loader::load_config_from_yaml(&partial).expect("Failed to load config");
    assert_eq!(config.max_loop_iterations, 1000);
    assert_eq!(config.id_strategy, IdStrategy::Sequential);
}

#[test]
fn test_load_missing_file_reports_path() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("nope.yaml");

    let err = loader::load_workflow_from_yaml(&missing).unwrap_err();

    assert!(err.to_string().contains("nope.yaml"));
}
