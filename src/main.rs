use publisher_lib::config::PublisherConfig;
use publisher_lib::error::PublisherResult;
use publisher_lib::events::status_emitter;
use publisher_lib::logger::LogLevel;
use publisher_lib::pipeline::stages::{
    ManifestExtract, RecordPush, RepeatedNamesCheck, RequiredKeysCheck, StaticCollector,
    WhitespaceCheck,
};
use publisher_lib::pipeline::{CallbackKind, Manager, Process, ValueKind};
use serde_json::json;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Path of an optional JSON config file
const CONFIG_ENV: &str = "PUBLISHER_CONFIG";

fn load_config() -> PublisherResult<PublisherConfig> {
    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => PublisherConfig::load(path)?,
        Err(_) => PublisherConfig::default(),
    };
    config.with_env_overrides()
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Register `process` with a status emitter attached
fn register<P: Process + 'static>(manager: &mut Manager, process: P) -> PublisherResult<()> {
    let name = process.name().to_string();
    manager.register(process)?;
    if let Some(handle) = manager.process_mut(&name) {
        handle.add_callback(
            CallbackKind::StatusChanged,
            status_emitter(|event| {
                tracing::debug!(
                    process = %event.process_name,
                    status = %event.status,
                    "{}",
                    event.event
                );
            }),
        );
    }
    Ok(())
}

fn build_manager(config: PublisherConfig, description: Option<String>) -> PublisherResult<Manager> {
    let mut manager = Manager::with_config(config);

    register(
        &mut manager,
        StaticCollector::new("task_id", ValueKind::Integer, Some(json!(512)))
            .with_info("Unique identifier for the task in the publishing context."),
    )?;
    register(
        &mut manager,
        StaticCollector::new("file", ValueKind::String, Some(json!("/test_folder/file.ma")))
            .with_info("Path to the main file for the task."),
    )?;
    register(
        &mut manager,
        StaticCollector::new("preview", ValueKind::String, Some(json!("/test_folder/preview.jpg")))
            .with_info("Path to the preview image for the task."),
    )?;
    register(
        &mut manager,
        StaticCollector::new("BID", ValueKind::String, None)
            .optional()
            .with_info("Job time in version, optional for some tasks."),
    )?;
    register(
        &mut manager,
        StaticCollector::new("Description", ValueKind::String, description.map(|d| json!(d)))
            .with_info("Short description or summary of the task."),
    )?;

    register(
        &mut manager,
        RequiredKeysCheck::new("Check inputs", ["task_id", "file", "preview"]),
    )?;
    register(
        &mut manager,
        RepeatedNamesCheck::new("Check repeated node names", "nodes"),
    )?;
    register(
        &mut manager,
        WhitespaceCheck::new("Check padded values", ["Description"]),
    )?;
    register(
        &mut manager,
        ManifestExtract::new(
            "Extract manifest",
            ["task_id", "file", "preview", "BID", "Description"],
        ),
    )?;
    register(&mut manager, RecordPush::new("Push Version"))?;

    manager
        .context_mut()
        .set("nodes", json!(["|root|geo|body", "|root|geo|head", "|root|rig|root_ctrl"]));

    Ok(manager)
}

fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_level);

    let description = std::env::args().nth(1);
    let mut manager = match build_manager(config, description) {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!("Failed to assemble the publish: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = manager.publish();

    match serde_json::to_string_pretty(&manager.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("Failed to serialize snapshot: {}", e),
    }

    match result {
        Ok(report) => {
            tracing::info!(
                "Published version {} in {:.2}s ({} warning(s))",
                manager.context().get_i64("version").unwrap_or_default(),
                report.total_duration.as_secs_f64(),
                report.degraded().count()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
