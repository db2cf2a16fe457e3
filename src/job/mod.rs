//! Job payload builder
//!
//! Turns a publish instance plus one render request into a complete
//! Deadline job payload. Every call builds a fresh value; nothing carries
//! over from one job to the next.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use deadline_protocol::{JobInfo, JobPayload, JobType, PluginInfo, SubmissionResponse, SINGLE_CHUNK};
use nuke_scene::{resolve_limit_groups, SceneGraph};
use regex_lite::Regex;
use thiserror::Error;
use tracing::debug;

use crate::config::NukeSettings;
use crate::environment::{collect_environment, EnvSource, ProcessEnv};
use crate::frames::{printf_to_hashes, split_dir, to_forward_slashes};
use crate::instance::{Context, Instance};

/// Payload construction errors
#[derive(Debug, Error)]
pub enum JobError {
    #[error("host version '{0}' has no major.minor component")]
    InvalidHostVersion(String),

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: io::Error,
    },
}

fn version_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\.\d+").expect("valid version pattern"))
}

/// Extract the `major.minor` Deadline expects from a host version string.
///
/// `15.1v3` yields `15.1`.
pub fn host_version(version: &str) -> Result<String, JobError> {
    version_pattern()
        .find(version)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| JobError::InvalidHostVersion(version.to_string()))
}

/// Last path component, accepting either separator.
pub fn basename(path: &str) -> &str {
    split_dir(path).1
}

/// Output filename for Monitor previews, frame numbers as hashes.
pub fn preview_filename(render_path: &str) -> String {
    to_forward_slashes(&printf_to_hashes(render_path))
}

/// Create the render output directory.
///
/// An existing directory is fine; any other failure is returned.
pub fn ensure_output_dir(render_path: &str) -> Result<(), JobError> {
    let (dir, _) = split_dir(render_path);
    if dir.is_empty() {
        return Ok(());
    }
    match fs::create_dir_all(Path::new(dir)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && Path::new(dir).is_dir() => Ok(()),
        Err(source) => Err(JobError::OutputDir {
            path: dir.to_string(),
            source,
        }),
    }
}

/// One render to submit
#[derive(Debug, Clone)]
pub struct JobRequest<'a> {
    /// Script the farm opens
    pub scene_path: String,
    /// Output template of the rendered write node
    pub render_path: String,
    pub write_node: String,
    pub frame_start: i64,
    pub frame_end: i64,
    /// Previous submission this job waits for
    pub dependency: Option<&'a SubmissionResponse>,
    /// Baking jobs render in a single task
    pub baking: bool,
}

impl<'a> JobRequest<'a> {
    pub fn new(
        scene_path: impl Into<String>,
        render_path: impl Into<String>,
        write_node: impl Into<String>,
        frame_start: i64,
        frame_end: i64,
    ) -> Self {
        Self {
            scene_path: scene_path.into(),
            render_path: render_path.into(),
            write_node: write_node.into(),
            frame_start,
            frame_end,
            dependency: None,
            baking: false,
        }
    }

    /// Wait for a previously submitted job
    pub fn depends_on(mut self, response: Option<&'a SubmissionResponse>) -> Self {
        self.dependency = response;
        self
    }

    /// Mark as a baking job
    pub fn baking(mut self) -> Self {
        self.baking = true;
        self
    }
}

/// Builds job payloads for one publish context
pub struct PayloadBuilder<'a> {
    settings: &'a NukeSettings,
    context: &'a Context,
    scene: &'a dyn SceneGraph,
    env: &'a dyn EnvSource,
}

impl<'a> PayloadBuilder<'a> {
    /// Create a builder reading the process environment
    pub fn new(settings: &'a NukeSettings, context: &'a Context, scene: &'a dyn SceneGraph) -> Self {
        Self {
            settings,
            context,
            scene,
            env: &ProcessEnv,
        }
    }

    /// Read forwarded environment from another source
    pub fn with_env(mut self, env: &'a dyn EnvSource) -> Self {
        self.env = env;
        self
    }

    /// Build the payload for one render of `instance`
    pub fn build(&self, instance: &Instance, request: &JobRequest<'_>) -> Result<JobPayload, JobError> {
        let attributes = &instance.attribute_values;
        let settings = self.settings;

        let (render_dir, _) = split_dir(&request.render_path);
        let render_dir = to_forward_slashes(render_dir);

        let limit_groups = resolve_limit_groups(self.scene, &settings.node_class_limit_groups);
        debug!(?limit_groups, "resolved limit groups");

        let frames = match instance.frames.as_deref() {
            Some(custom) if !request.baking && !custom.trim().is_empty() => custom.to_string(),
            _ => format!("{}-{}", request.frame_start, request.frame_end),
        };

        let mut job_info = JobInfo {
            batch_name: basename(&self.context.current_file).to_string(),
            name: basename(&request.render_path).to_string(),
            user_name: self.context.user(),
            priority: attributes.priority.unwrap_or(settings.priority),
            chunk_size: attributes.chunk.unwrap_or(settings.chunk_size),
            concurrent_tasks: attributes.concurrency.unwrap_or(settings.concurrent_tasks),
            department: settings.department.clone(),
            pool: instance.primary_pool.clone(),
            secondary_pool: instance.secondary_pool.clone(),
            group: settings.group.clone(),
            plugin: settings.plugin_name().to_string(),
            frames,
            comment: self.context.comment.clone(),
            output_directories: vec![render_dir.clone()],
            output_filenames: vec![preview_filename(&request.render_path)],
            limit_groups,
            ..Default::default()
        };

        let workfile_dependency = attributes
            .workfile_dependency
            .unwrap_or(settings.workfile_dependency);
        if workfile_dependency {
            job_info.asset_dependencies.push(request.scene_path.clone());
        }

        if request.baking {
            job_info.job_type = Some(JobType::Normal);
            job_info.chunk_size = SINGLE_CHUNK;
        }

        if let Some(dependency) = request.dependency {
            if let Some(job_id) = dependency.job_id() {
                if let Some(batch) = dependency.batch() {
                    job_info.batch_name = batch.to_string();
                }
                job_info.job_dependencies.push(job_id.to_string());
            }
        }

        job_info.environment = collect_environment(instance, self.context, settings, self.env)
            .into_iter()
            .collect();

        let mut plugin_info = PluginInfo {
            scene_file: request.scene_path.clone(),
            output_file_path: render_dir,
            version: host_version(&self.context.host_version)?,
            project_path: request.scene_path.clone(),
            aws_asset_file0: request.render_path.clone(),
            use_gpu: attributes.use_gpu.unwrap_or(settings.use_gpu),
            write_node: request.write_node.clone(),
            ..Default::default()
        };
        if !instance.deadline.plugin_info_data.is_empty() {
            plugin_info.apply_additional(&instance.deadline.plugin_info_data);
        }

        let payload = JobPayload::new(job_info, plugin_info);
        debug!(plugin = %payload.job_info.plugin, "using render plugin");
        if let Ok(json) = serde_json::to_string_pretty(&payload) {
            debug!(payload = %json, "assembled job payload");
        }
        Ok(payload)
    }
}
