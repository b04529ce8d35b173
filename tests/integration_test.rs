use publisher_lib::config::PublisherConfig;
use publisher_lib::error::{PublisherError, PublisherResult};
use publisher_lib::logger::MemoryLogger;
use publisher_lib::pipeline::stages::{
    ManifestExtract, RecordPush, StaticCollector, WhitespaceCheck,
};
use publisher_lib::pipeline::{
    CallbackKind, Category, ErrorItem, Manager, Process, ProcessScope, ProcessState, ValueKind,
};
use publisher_lib::state_machine::ProcessStatus;
use serde_json::json;
use std::io::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

type Journal = Arc<Mutex<Vec<String>>>;

fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Test process: notes that it ran, then reports `errors` problems
struct Step {
    name: &'static str,
    category: Category,
    mandatory: bool,
    errors: usize,
    journal: Journal,
}

impl Step {
    fn new(name: &'static str, category: Category, journal: &Journal) -> Self {
        Self {
            name,
            category,
            mandatory: true,
            errors: 0,
            journal: journal.clone(),
        }
    }

    fn optional(mut self) -> Self {
        self.mandatory = false;
        self
    }

    fn with_errors(mut self, errors: usize) -> Self {
        self.errors = errors;
        self
    }
}

impl Process for Step {
    fn name(&self) -> &str {
        self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    fn mandatory(&self) -> bool {
        self.mandatory
    }

    fn process(&mut self, scope: &mut ProcessScope<'_>) -> PublisherResult<()> {
        self.journal.lock().unwrap().push(self.name.to_string());
        for i in 0..self.errors {
            scope.add_error(
                format!("{} error", self.name),
                format!("problem {}", i + 1),
                vec![ErrorItem::new("node", format!("|root|node{}", i + 1))],
            );
        }
        Ok(())
    }
}

/// Fails on its first run only
struct Flaky {
    runs: usize,
}

impl Process for Flaky {
    fn name(&self) -> &str {
        "Check scene"
    }

    fn category(&self) -> Category {
        Category::Check
    }

    fn process(&mut self, scope: &mut ProcessScope<'_>) -> PublisherResult<()> {
        self.runs += 1;
        if self.runs == 1 {
            scope.add_error("Pasted nodes", "1 pasted node", vec![ErrorItem::new("pasted__body", "|pasted__body")]);
        }
        Ok(())
    }
}

struct Erroring;

impl Process for Erroring {
    fn name(&self) -> &str {
        "Extract USD"
    }

    fn category(&self) -> Category {
        Category::Extract
    }

    fn process(&mut self, scope: &mut ProcessScope<'_>) -> PublisherResult<()> {
        let file = scope.context().get_string("file")?;
        scope.context_mut().set_string("usd", file);
        Ok(())
    }
}

struct Panicking;

impl Process for Panicking {
    fn name(&self) -> &str {
        "Push Version"
    }

    fn category(&self) -> Category {
        Category::Push
    }

    fn mandatory(&self) -> bool {
        false
    }

    fn process(&mut self, _scope: &mut ProcessScope<'_>) -> PublisherResult<()> {
        panic!("tracker unreachable");
    }
}

/// Task id collected, optional BID left empty, mandatory check fails:
/// the publish stops before extract and push
#[test]
fn test_publish_aborts_on_failed_check() {
    let journal = journal();
    let mut manager = Manager::new();

    manager
        .register(StaticCollector::new("task_id", ValueKind::Integer, Some(json!(512))))
        .unwrap();
    manager
        .register(StaticCollector::new("BID", ValueKind::String, None).optional())
        .unwrap();
    manager
        .register(Step::new("CheckX", Category::Check, &journal).with_errors(2))
        .unwrap();
    manager
        .register(Step::new("ExtractX", Category::Extract, &journal))
        .unwrap();
    manager
        .register(Step::new("PushX", Category::Push, &journal))
        .unwrap();

    let err = manager.publish().unwrap_err();

    match &err {
        PublisherError::PublishAborted { process, details } => {
            assert_eq!(process, "CheckX");
            assert_eq!(details, "CheckX error:problem 1\nCheckX error:problem 2");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().starts_with("CheckX failed:"));

    assert_eq!(manager.process("task_id").unwrap().status(), ProcessStatus::Success);
    assert_eq!(manager.context().get("task_id"), Some(&json!(512)));

    let bid = manager.process("BID").unwrap();
    assert_eq!(bid.status(), ProcessStatus::Warning);
    assert_eq!(bid.errors().len(), 1);
    assert_eq!(bid.errors()[0].code(), "Failed collect");
    assert_eq!(bid.errors()[0].details(), "missing value");
    assert!(!manager.context().has("BID"));

    assert_eq!(manager.process("CheckX").unwrap().status(), ProcessStatus::Failed);
    assert_eq!(entries(&journal), vec!["CheckX"]);
    for name in ["ExtractX", "PushX"] {
        assert_eq!(
            manager.process(name).unwrap().status(),
            ProcessStatus::Uninitialized
        );
    }
}

#[test]
fn test_categories_run_in_fixed_order() {
    let journal = journal();
    let mut manager = Manager::new();

    // Registered back to front
    manager.register(Step::new("push", Category::Push, &journal)).unwrap();
    manager.register(Step::new("extract", Category::Extract, &journal)).unwrap();
    manager.register(Step::new("check b", Category::Check, &journal)).unwrap();
    manager.register(Step::new("check a", Category::Check, &journal)).unwrap();
    manager
        .register(StaticCollector::new("task_id", ValueKind::Integer, Some(json!(512))))
        .unwrap();

    let collect_journal = journal.clone();
    manager.process_mut("task_id").unwrap().add_callback(
        CallbackKind::PreProcess,
        move |state: &ProcessState| {
            collect_journal.lock().unwrap().push(state.name().to_string());
        },
    );

    let report = manager.publish().unwrap();

    assert_eq!(
        entries(&journal),
        vec!["task_id", "check b", "check a", "extract", "push"]
    );
    let categories: Vec<Category> = report.outcomes.iter().map(|o| o.category).collect();
    assert_eq!(
        categories,
        vec![
            Category::Collect,
            Category::Check,
            Category::Check,
            Category::Extract,
            Category::Push
        ]
    );
    assert!(report.is_clean());
}

#[test]
fn test_optional_failure_does_not_abort() {
    let journal = journal();
    let mut manager = Manager::new();

    manager
        .register(Step::new("Check unknown nodes", Category::Check, &journal).optional().with_errors(1))
        .unwrap();
    manager
        .register(Step::new("Extract USD", Category::Extract, &journal))
        .unwrap();

    let report = manager.publish().unwrap();

    assert_eq!(entries(&journal), vec!["Check unknown nodes", "Extract USD"]);
    assert_eq!(
        manager.process("Check unknown nodes").unwrap().status(),
        ProcessStatus::Warning
    );
    let degraded: Vec<&str> = report.degraded().map(|o| o.name.as_str()).collect();
    assert_eq!(degraded, vec!["Check unknown nodes"]);
    assert!(!report.is_clean());
}

#[test]
fn test_errors_reset_between_runs() {
    let journal = journal();
    let mut manager = Manager::new();
    manager
        .register(Step::new("Check", Category::Check, &journal).optional().with_errors(1))
        .unwrap();

    manager.publish().unwrap();
    manager.publish().unwrap();

    let check = manager.process("Check").unwrap();
    assert_eq!(check.errors().len(), 1);
    assert_eq!(check.status(), ProcessStatus::Warning);
    assert_eq!(entries(&journal).len(), 2);
}

#[test]
fn test_returned_error_fails_process() {
    let mut manager = Manager::new();
    manager.register(Erroring).unwrap();

    let err = manager.publish().unwrap_err();

    let process = manager.process("Extract USD").unwrap();
    assert_eq!(process.status(), ProcessStatus::Failed);
    assert_eq!(process.errors().len(), 1);
    assert_eq!(process.errors()[0].code(), "Failed process");
    assert_eq!(
        process.errors()[0].details(),
        "Required context key not found: file"
    );
    assert!(err.to_string().contains("Failed process:Required context key not found: file"));
}

#[test]
fn test_panic_is_contained() {
    let mut manager = Manager::new();
    manager.register(Panicking).unwrap();

    // Optional, so the publish itself succeeds
    let report = manager.publish().unwrap();

    let process = manager.process("Push Version").unwrap();
    assert_eq!(process.status(), ProcessStatus::Failed);
    assert_eq!(process.errors()[0].code(), "Failed process");
    assert_eq!(process.errors()[0].details(), "tracker unreachable");
    assert_eq!(report.degraded().count(), 1);
}

#[test]
fn test_status_callbacks_on_failure() {
    let journal = journal();
    let events = journal.clone();
    let mut manager = Manager::new();
    manager
        .register(Step::new("Check", Category::Check, &Arc::new(Mutex::new(Vec::new()))).with_errors(1))
        .unwrap();

    let handle = manager.process_mut("Check").unwrap();
    let pre = journal.clone();
    handle.add_callback(CallbackKind::PreProcess, move |_: &ProcessState| {
        pre.lock().unwrap().push("pre".to_string());
    });
    handle.add_callback(CallbackKind::StatusChanged, move |state: &ProcessState| {
        events.lock().unwrap().push(state.status().to_string());
    });
    let post = journal.clone();
    handle.add_callback(CallbackKind::PostProcess, move |_: &ProcessState| {
        post.lock().unwrap().push("post".to_string());
    });

    assert!(manager.publish().is_err());

    assert_eq!(
        entries(&journal),
        vec![
            ProcessStatus::Executing.to_string(),
            "pre".to_string(),
            ProcessStatus::Failed.to_string()
        ]
    );
}

#[test]
fn test_set_value_is_visible_without_publish() {
    let journal = journal();
    let mut manager = Manager::new();
    manager
        .register(StaticCollector::new("Description", ValueKind::String, None))
        .unwrap();
    manager
        .register(Step::new("Check", Category::Check, &journal))
        .unwrap();

    manager.set_value("Description", json!("Layout pass")).unwrap();
    assert_eq!(
        manager.context().get_string("Description").unwrap(),
        "Layout pass"
    );
    assert_eq!(
        manager.process("Description").unwrap().value(),
        Some(&json!("Layout pass"))
    );

    let mismatch = manager.set_value("Description", json!(42));
    assert!(matches!(mismatch, Err(PublisherError::TypeMismatch { .. })));
    assert_eq!(
        manager.context().get_string("Description").unwrap(),
        "Layout pass"
    );
    assert_eq!(
        manager.process("Description").unwrap().errors()[0].details(),
        "Value must be of type string"
    );

    assert!(matches!(
        manager.set_value("Check", json!("x")),
        Err(PublisherError::NotACollector(_))
    ));
    assert!(matches!(
        manager.set_value("Nope", json!("x")),
        Err(PublisherError::ProcessNotFound(_))
    ));
}

#[test]
fn test_duplicate_names_rejected() {
    let mut manager = Manager::new();
    manager
        .register(StaticCollector::new("file", ValueKind::String, None))
        .unwrap();

    let result = manager.register(StaticCollector::new("file", ValueKind::String, None));

    assert!(matches!(result, Err(PublisherError::DuplicateProcess(_))));
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_unknown_category_tag() {
    assert_eq!(Category::from_str("Extract").unwrap(), Category::Extract);
    assert!(matches!(
        Category::from_str("deploy"),
        Err(PublisherError::UnknownCategory(_))
    ));
}

#[test]
fn test_resume_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{ "skipSucceeded": true, "logLevel": "debug" }}"#).unwrap();
    let config = PublisherConfig::load(file.path()).unwrap();

    let collects = journal();
    let seen = collects.clone();
    let mut manager = Manager::with_config(config);
    manager
        .register(StaticCollector::new("task_id", ValueKind::Integer, Some(json!(512))))
        .unwrap();
    manager.register(Flaky { runs: 0 }).unwrap();
    manager.process_mut("task_id").unwrap().add_callback(
        CallbackKind::PreProcess,
        move |state: &ProcessState| seen.lock().unwrap().push(state.name().to_string()),
    );

    assert!(manager.publish().is_err());
    let report = manager.publish().unwrap();

    assert_eq!(entries(&collects), vec!["task_id"]);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.executed_count(), 1);
    assert_eq!(
        manager.process("Check scene").unwrap().status(),
        ProcessStatus::Success
    );
}

#[test]
fn test_edited_value_is_checked_again_on_resume() {
    let config = PublisherConfig {
        skip_succeeded: true,
        ..PublisherConfig::default()
    };
    let mut manager = Manager::with_config(config);
    manager
        .register(StaticCollector::new("Description", ValueKind::String, None))
        .unwrap();
    manager
        .register(WhitespaceCheck::new("Check padded values", ["Description"]))
        .unwrap();

    manager.set_value("Description", json!("layout")).unwrap();
    manager.publish().unwrap();
    assert_eq!(
        manager.process("Check padded values").unwrap().status(),
        ProcessStatus::Success
    );

    manager.set_value("Description", json!("  layout  ")).unwrap();
    let report = manager.publish().unwrap();

    assert_eq!(report.skipped_count(), 0);
    assert_eq!(
        manager.process("Check padded values").unwrap().status(),
        ProcessStatus::Warning
    );
}

#[test]
fn test_logs_reach_injected_sink() {
    let logger = Arc::new(MemoryLogger::new(1000));
    let mut manager = Manager::with_logger(PublisherConfig::default(), logger.clone());
    manager
        .register(StaticCollector::new("task_id", ValueKind::Integer, Some(json!(512))))
        .unwrap();

    manager.publish().unwrap();

    let session = manager.context().session_id().to_string();
    let logs = logger.get_logs();
    assert!(logs
        .iter()
        .any(|entry| entry.message.starts_with("Publisher starting publish with 1 processes")));
    assert!(logs
        .iter()
        .any(|entry| entry.message.contains("task_id") && entry.message.contains(&session)));
}

#[test]
fn test_full_pipeline_pushes_version() {
    let mut manager = Manager::new();
    manager
        .register(StaticCollector::new("task_id", ValueKind::Integer, Some(json!(512))))
        .unwrap();
    manager
        .register(StaticCollector::new("file", ValueKind::String, Some(json!("/test_folder/file.ma"))))
        .unwrap();
    manager
        .register(ManifestExtract::new("Extract manifest", ["task_id", "file"]))
        .unwrap();
    manager.register(RecordPush::new("Push Version")).unwrap();

    let report = manager.publish().unwrap();

    assert!(report.is_clean());
    assert_eq!(report.executed_count(), 4);
    let history = manager.context().get("published_versions").unwrap();
    assert_eq!(history[0]["version"], 1);
    assert_eq!(
        history[0]["record"]["data"],
        json!({ "task_id": 512, "file": "/test_folder/file.ma" })
    );

    let snapshot = serde_json::to_value(manager.snapshot()).unwrap();
    let statuses: Vec<&str> = snapshot
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["SUCCESS"; 4]);
}
