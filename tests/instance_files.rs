//! Exported Data Integration Tests
//!
//! Load instance, context, scene and config files the way the CLI does and
//! submit them against the mock service.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use nuke_deadline::config::EffectiveConfig;
use nuke_deadline::instance::{InstanceError, RenderTarget};
use nuke_deadline::{Context, Instance, MockTransport, NukeSubmitDeadline};
use nuke_scene::Scene;
use serde_json::json;

fn write_json(dir: &Path, name: &str, value: serde_json::Value) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    path
}

#[test]
fn test_exported_files_round_through_submission() {
    let dir = tempfile::tempdir().unwrap();
    let renders = dir.path().join("renders").display().to_string();

    let instance_path = write_json(
        dir.path(),
        "instance.json",
        json!({
            "name": "renderKeyMain",
            "productType": "render",
            "families": ["render.farm"],
            "farm": true,
            "renderTarget": "farm",
            "frameStartHandle": 1001,
            "frameEndHandle": 1005,
            "path": format!("{}/key.####.exr", renders),
            "writeNode": "WriteKey",
            "slate": true,
            "attributeValues": {"priority": 80, "chunk": 5, "use_gpu": false},
            "primaryPool": "comp",
            "deadline": {
                "url": "http://deadline:8082",
                "plugin_info_data": {"RenderMode": "Use Proxies"}
            },
            "jobEnv": {"SEQ": "sh"}
        }),
    );
    let context_path = write_json(
        dir.path(),
        "context.json",
        json!({
            "currentFile": "/proj/sh010/work/sh010_key_v004.nk",
            "hostVersion": "15.0v4",
            "comment": "",
            "deadlineUser": "rotoartist"
        }),
    );
    let scene_path = write_json(
        dir.path(),
        "scene.json",
        json!({"nodes": [
            {"name": "WriteKey", "class": "Write"},
            {"name": "Neat1", "class": "OFXcom.absoft.neatvideo5_v5"}
        ]}),
    );
    let project_config = dir.path().join("nuke.toml");
    fs::write(
        &project_config,
        r#"
[nuke]
department = "comp"
use_published_workfile = false

[[nuke.node_class_limit_groups]]
name = "neatvideo"
value = ["OFXcom.absoft.neatvideo5_v5"]
"#,
    )
    .unwrap();

    let config = EffectiveConfig::build(None, Some(&project_config), None).unwrap();
    let mut instance = Instance::load(&instance_path).unwrap();
    let context = Context::load(&context_path).unwrap();
    let scene = Scene::load(&scene_path).unwrap();
    assert_eq!(instance.render_target, RenderTarget::Farm);

    let transport = MockTransport::new();
    NukeSubmitDeadline::new(config.settings().unwrap())
        .with_transport(Arc::new(transport.clone()))
        .with_env(std::collections::BTreeMap::<String, String>::new())
        .with_scene(scene)
        .process(&mut instance, &context)
        .unwrap();

    let job = &transport.service().jobs()[0];
    assert_eq!(job.job_info("Priority").unwrap(), 80);
    assert_eq!(job.job_info("ChunkSize").unwrap(), 5);
    assert_eq!(job.job_info("Department").unwrap(), "comp");
    assert_eq!(job.job_info("Pool").unwrap(), "comp");
    assert_eq!(job.job_info("UserName").unwrap(), "rotoartist");
    assert_eq!(job.job_info("Frames").unwrap(), "1001-1005");
    assert_eq!(job.job_info("LimitGroups").unwrap(), "neatvideo");
    assert_eq!(job.job_info("EnvironmentKeyValue0").unwrap(), "SEQ=sh");
    assert_eq!(job.plugin_info("UseGpu").unwrap(), false);
    assert_eq!(job.plugin_info("Version").unwrap(), "15.0");
    assert_eq!(job.plugin_info("RenderMode").unwrap(), "Use Proxies");

    // Slate frame precedes the range.
    assert_eq!(instance.expected_files.len(), 6);
    assert!(instance.expected_files[0].ends_with("/key.1000.exr"));
    assert!(instance.expected_files[5].ends_with("/key.1005.exr"));

    let written: serde_json::Value = serde_json::to_value(&instance).unwrap();
    assert_eq!(written["productType"], "write");
    assert_eq!(written["publishJobState"], "Suspended");
    assert_eq!(written["deadlineSubmissionJob"]["_id"], job.id.as_str());
}

#[test]
fn test_unreadable_instance_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");

    let err = Instance::load(&missing).unwrap_err();

    assert!(matches!(err, InstanceError::Io { .. }));
    assert!(err.to_string().contains("missing.json"));
}

#[test]
fn test_malformed_context_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("context.json");
    fs::write(&path, "{\"currentFile\": 12}").unwrap();

    let err = Context::load(&path).unwrap_err();
    assert!(matches!(err, InstanceError::Parse { .. }));
}
