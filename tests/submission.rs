//! Submission Integration Tests
//!
//! Drive the full submission of publish instances against the in-process
//! mock Deadline service.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use nuke_deadline::config::{SearchReplace, SubmitSettings};
use nuke_deadline::frames::to_forward_slashes;
use nuke_deadline::host::{ClientError, TransportError};
use nuke_deadline::instance::{BakingScript, PublishJobState, RenderTarget};
use nuke_deadline::{Context, Instance, MockTransport, NukeSubmitDeadline, PipelineError};
use nuke_scene::{LimitGroupRule, Scene, SnapshotNode};
use serde_json::json;

// =============================================================================
// Test Helpers
// =============================================================================

fn settings() -> SubmitSettings {
    let mut settings = SubmitSettings::default();
    settings.deadline.url = "http://deadline:8082".to_string();
    settings.nuke.use_published_workfile = false;
    settings
}

fn submitter(transport: &MockTransport, settings: SubmitSettings) -> NukeSubmitDeadline {
    NukeSubmitDeadline::new(settings)
        .with_transport(Arc::new(transport.clone()))
        .with_env(HashMap::<String, String>::new())
}

fn slash(path: &Path) -> String {
    to_forward_slashes(&path.display().to_string())
}

fn render_instance(dir: &Path) -> Instance {
    Instance {
        name: "renderCompMain".to_string(),
        product_type: "render".to_string(),
        families: vec!["render.farm".to_string()],
        farm: true,
        render_target: RenderTarget::Farm,
        frame_start_handle: 1,
        frame_end_handle: 3,
        path: format!("{}/renders/comp.%04d.exr", slash(dir)),
        write_node: "WriteMain".to_string(),
        ..Default::default()
    }
}

fn context() -> Context {
    Context {
        current_file: "/proj/sh010/work/sh010_comp_v012.nk".to_string(),
        host_version: "14.0v5".to_string(),
        comment: "lighting update".to_string(),
        deadline_user: Some("jdoe".to_string()),
        ..Default::default()
    }
}

fn baking_script(dir: &Path) -> BakingScript {
    BakingScript {
        bake_render_path: format!("{}/review/sh010_comp_v012.mov", slash(dir)),
        bake_script_path: "/proj/sh010/work/sh010_comp_v012_baking.nk".to_string(),
        bake_write_node_name: "WriteReview".to_string(),
    }
}

// =============================================================================
// Main Render Job
// =============================================================================

#[test]
fn test_single_render_job_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let mut instance = render_instance(dir.path());
    instance.publish_job_state = Some(PublishJobState::Active);

    let outcome = submitter(&transport, settings())
        .process(&mut instance, &context())
        .unwrap()
        .expect("farm instance is submitted");

    let jobs = transport.service().jobs();
    assert_eq!(jobs.len(), 1, "exactly one POST");
    let job = &jobs[0];
    assert_eq!(job.url, "http://deadline:8082/api/jobs");

    assert_eq!(job.job_info("BatchName").unwrap(), "sh010_comp_v012.nk");
    assert_eq!(job.job_info("Name").unwrap(), "comp.%04d.exr");
    assert_eq!(job.job_info("UserName").unwrap(), "jdoe");
    assert_eq!(job.job_info("Frames").unwrap(), "1-3");
    assert_eq!(job.job_info("Plugin").unwrap(), "Nuke");
    assert_eq!(job.job_info("Priority").unwrap(), 50);
    assert_eq!(job.job_info("ChunkSize").unwrap(), 10);
    assert_eq!(job.job_info("Comment").unwrap(), "lighting update");
    assert_eq!(
        job.job_info("OutputDirectory0").unwrap().as_str().unwrap(),
        format!("{}/renders", slash(dir.path()))
    );
    assert_eq!(
        job.job_info("OutputFilename0").unwrap().as_str().unwrap(),
        format!("{}/renders/comp.####.exr", slash(dir.path()))
    );
    assert_eq!(
        job.job_info("AssetDependency0").unwrap(),
        "/proj/sh010/work/sh010_comp_v012.nk"
    );
    assert!(job.job_info("JobDependency0").is_none());

    assert_eq!(job.plugin_info("Version").unwrap(), "14.0");
    assert_eq!(job.plugin_info("WriteNode").unwrap(), "WriteMain");
    assert_eq!(job.plugin_info("UseGpu").unwrap(), true);
    assert_eq!(job.payload["AuxFiles"], json!([]));

    assert_eq!(outcome.expected_files, 3);
    let renders = format!("{}/renders", slash(dir.path()));
    assert_eq!(
        instance.expected_files,
        vec![
            format!("{}/comp.0001.exr", renders),
            format!("{}/comp.0002.exr", renders),
            format!("{}/comp.0003.exr", renders),
        ]
    );
    assert!(dir.path().join("renders").is_dir());
    assert_eq!(instance.output_dir.as_deref(), Some(renders.as_str()));
    assert_eq!(
        instance.deadline_submission_job.as_ref().unwrap().job_id(),
        Some(job.id.as_str())
    );
    assert_eq!(instance.publish_job_state, Some(PublishJobState::Suspended));

    assert_eq!(instance.product_type, "write");
    assert_eq!(instance.family.as_deref(), Some("write"));
    assert_eq!(instance.families, vec!["render2d", "render.farm"]);
}

#[test]
fn test_prerender_relabeled_as_prerender() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let mut instance = render_instance(dir.path());
    instance.product_type = "prerender".to_string();
    instance.families.clear();

    submitter(&transport, settings())
        .process(&mut instance, &context())
        .unwrap();

    assert_eq!(instance.product_type, "write");
    assert_eq!(instance.families, vec!["prerender"]);
}

// =============================================================================
// Baking Jobs
// =============================================================================

#[test]
fn test_baking_jobs_chain_behind_render() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let mut instance = render_instance(dir.path());
    instance.baking_nuke_scripts = vec![baking_script(dir.path())];

    let outcome = submitter(&transport, settings())
        .process(&mut instance, &context())
        .unwrap()
        .unwrap();

    let jobs = transport.service().jobs();
    assert_eq!(jobs.len(), 2);
    assert_eq!(outcome.job_count(), 2);

    let (render, bake) = (&jobs[0], &jobs[1]);
    assert_eq!(bake.job_info("JobDependency0").unwrap(), render.id.as_str());
    assert_eq!(
        bake.job_info("BatchName").unwrap(),
        render.job_info("BatchName").unwrap()
    );
    assert_eq!(bake.job_info("JobType").unwrap(), "Normal");
    assert_eq!(bake.job_info("ChunkSize").unwrap(), 99_999_999);
    assert_eq!(bake.job_info("Name").unwrap(), "sh010_comp_v012.mov");
    assert_eq!(bake.plugin_info("WriteNode").unwrap(), "WriteReview");
    assert_eq!(
        bake.plugin_info("SceneFile").unwrap(),
        "/proj/sh010/work/sh010_comp_v012_baking.nk"
    );
    assert!(dir.path().join("review").is_dir());

    assert_eq!(instance.baking_submission_jobs, vec![bake.id.clone()]);
    assert_eq!(
        instance.deadline_submission_job.as_ref().unwrap().job_id(),
        Some(bake.id.as_str())
    );
    assert_eq!(instance.expected_files.len(), 3);
}

#[test]
fn test_custom_frames_skip_baking_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let mut instance = render_instance(dir.path());
    instance.frame_end_handle = 10;
    instance.frames = Some("1-3,8".to_string());
    instance.baking_nuke_scripts = vec![baking_script(dir.path())];

    submitter(&transport, settings())
        .process(&mut instance, &context())
        .unwrap();

    let jobs = transport.service().jobs();
    assert_eq!(jobs[0].job_info("Frames").unwrap(), "1-3,8");
    assert_eq!(jobs[1].job_info("Frames").unwrap(), "1-10");
}

#[test]
fn test_frames_farm_has_no_render_job() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let mut instance = render_instance(dir.path());
    instance.render_target = RenderTarget::FramesFarm;

    let outcome = submitter(&transport, settings())
        .process(&mut instance, &context())
        .unwrap()
        .unwrap();

    assert_eq!(outcome.job_count(), 0);
    assert_eq!(transport.service().job_count(), 0);
    assert!(instance.expected_files.is_empty());
    assert!(instance.deadline_submission_job.is_none());
    assert!(instance.publish_job_state.is_none());
    assert_eq!(instance.product_type, "write");
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_missing_url_aborts_instance() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let mut settings = settings();
    settings.deadline.url.clear();
    let mut instance = render_instance(dir.path());

    let err = submitter(&transport, settings)
        .process(&mut instance, &context())
        .unwrap_err();

    assert!(matches!(err, PipelineError::MissingDeadlineUrl(_)));
    assert_eq!(transport.service().job_count(), 0);
    assert_eq!(instance.product_type, "render");
}

#[test]
fn test_instance_url_used_over_settings() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let mut instance = render_instance(dir.path());
    instance.deadline.url = Some("http://deadline-b:8082".to_string());

    submitter(&transport, settings())
        .process(&mut instance, &context())
        .unwrap();

    assert_eq!(
        transport.service().jobs()[0].url,
        "http://deadline-b:8082/api/jobs"
    );
}

#[test]
fn test_rejected_submission_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    transport.service().fail_next(500);
    let mut instance = render_instance(dir.path());

    let err = submitter(&transport, settings())
        .process(&mut instance, &context())
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Client(ClientError::Transport(TransportError::Status { status: 500, .. }))
    ));
    assert!(instance.deadline_submission_job.is_none());
    assert!(instance.expected_files.is_empty());
    assert!(instance.output_dir.is_none());
    assert!(instance.publish_job_state.is_none());
    // The render directory exists before the POST is attempted.
    assert!(dir.path().join("renders").is_dir());
    assert_eq!(transport.service().job_count(), 0);
}

#[test]
fn test_custom_frames_outside_range_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let mut instance = render_instance(dir.path());
    instance.frames = Some("0-5".to_string());

    let err = submitter(&transport, settings())
        .process(&mut instance, &context())
        .unwrap_err();

    assert!(matches!(err, PipelineError::Validation(_)));
    assert_eq!(transport.service().job_count(), 0);
}

// =============================================================================
// Environment and Limit Groups
// =============================================================================

#[test]
fn test_environment_and_limit_groups() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();

    let mut settings = settings();
    settings.nuke.env_allowed_keys = vec!["STUDIO_ROOT".to_string()];
    settings.nuke.env_search_replace_values = vec![SearchReplace {
        name: "P:/".to_string(),
        value: "/mnt/projects/".to_string(),
    }];
    settings.nuke.node_class_limit_groups = vec![
        LimitGroupRule::new("neatvideo", &["OFXcom.absoft.neatvideo5_v5"]),
        LimitGroupRule::new("sapphire", &["OFXcom.genarts.sapphire.blur_v1"]),
    ];

    let env: HashMap<String, String> = [
        ("OCIO", "P:/config/aces.ocio"),
        ("STUDIO_ROOT", "P:/studio"),
        ("UNLISTED", "ignored"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let scene = Scene::new(vec![
        SnapshotNode::new("Neat1", "OFXcom.absoft.neatvideo5_v5"),
        SnapshotNode::new("Blur1", "OFXcom.genarts.sapphire.blur_v1").disabled(),
    ]);

    let mut instance = render_instance(dir.path());
    instance
        .job_env
        .insert("SHOT".to_string(), "sh010".to_string());
    let mut context = context();
    context
        .render_job_env
        .insert("PIPELINE_RENDER_JOB".to_string(), "1".to_string());

    NukeSubmitDeadline::new(settings)
        .with_transport(Arc::new(transport.clone()))
        .with_env(env)
        .with_scene(scene)
        .process(&mut instance, &context)
        .unwrap();

    let job = &transport.service().jobs()[0];
    assert_eq!(job.job_info("LimitGroups").unwrap(), "neatvideo");

    let environment: Vec<&str> = (0..)
        .map_while(|i| job.job_info(&format!("EnvironmentKeyValue{}", i)))
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(
        environment,
        vec![
            "OCIO=/mnt/projects/config/aces.ocio",
            "PIPELINE_RENDER_JOB=1",
            "SHOT=sh010",
            "STUDIO_ROOT=/mnt/projects/studio",
        ]
    );
}
