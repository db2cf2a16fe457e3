//! Submission pipeline
//!
//! Drives one publish instance through the farm submission:
//! - Resolve the Deadline endpoint
//! - Validate job settings
//! - Submit the main render job
//! - Record its expected output files
//! - Submit baking jobs chained behind it
//! - Write results back onto the instance

use std::sync::Arc;

use deadline_protocol::SubmissionResponse;
use nuke_scene::{Scene, SceneGraph};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{BasicAuth, SubmitSettings};
use crate::environment::{EnvSource, ProcessEnv};
use crate::expected::resolve_expected_files;
use crate::frames::{split_dir, to_forward_slashes};
use crate::host::{ClientError, DeadlineClient, HttpConfig, HttpTransport, Transport};
use crate::instance::{Context, Instance, PublishJobState};
use crate::job::{ensure_output_dir, JobError, JobRequest, PayloadBuilder};
use crate::validate::{validate_custom_frames, validate_priority, ValidationError};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("instance {0} has no Deadline web service URL")]
    MissingDeadlineUrl(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("job error: {0}")]
    Job(#[from] JobError),

    #[error("submission failed: {0}")]
    Client(#[from] ClientError),
}

impl PipelineError {
    /// Exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::MissingDeadlineUrl(_) => 10,
            PipelineError::Validation(_) => 12,
            PipelineError::Job(_) => 30,
            PipelineError::Client(_) => 20,
        }
    }
}

/// What was submitted for one instance
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubmissionOutcome {
    /// Web service the jobs went to
    pub deadline_url: String,
    /// Main render job, absent for `frames_farm` instances
    pub render_job: Option<SubmissionResponse>,
    /// Baking jobs in submission order
    pub baking_jobs: Vec<SubmissionResponse>,
    /// Expected files recorded by this run
    pub expected_files: usize,
}

impl SubmissionOutcome {
    /// Total number of jobs submitted
    pub fn job_count(&self) -> usize {
        usize::from(self.render_job.is_some()) + self.baking_jobs.len()
    }
}

/// Submits Nuke write-node renders to Deadline
pub struct NukeSubmitDeadline {
    settings: SubmitSettings,
    transport: Option<Arc<dyn Transport>>,
    scene: Box<dyn SceneGraph>,
    env: Box<dyn EnvSource>,
}

impl NukeSubmitDeadline {
    /// Create a submitter sending over HTTP
    pub fn new(settings: SubmitSettings) -> Self {
        Self {
            settings,
            transport: None,
            scene: Box::new(Scene::default()),
            env: Box::new(ProcessEnv),
        }
    }

    /// Send through a fixed transport instead of HTTP
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Scene graph scanned for limit groups
    pub fn with_scene(mut self, scene: impl SceneGraph + 'static) -> Self {
        self.scene = Box::new(scene);
        self
    }

    /// Environment the forwarded variables are read from
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn settings(&self) -> &SubmitSettings {
        &self.settings
    }

    /// Web service root for an instance: instance override, then settings.
    pub fn deadline_url(&self, instance: &Instance) -> Option<String> {
        instance
            .deadline
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| Some(self.settings.deadline.url.as_str()).filter(|url| !url.trim().is_empty()))
            .map(|url| url.trim_end_matches('/').to_string())
    }

    fn client(&self, url: String, auth: Option<&BasicAuth>) -> DeadlineClient {
        let transport = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(HttpTransport::new(HttpConfig {
                verify_ssl: self.settings.deadline.verify_ssl,
                auth: auth.cloned(),
            })),
        };
        DeadlineClient::new(url, transport)
    }

    /// Script the farm opens: the published workfile when enabled and known.
    fn scene_path(&self, instance: &Instance, context: &Context) -> String {
        let use_published = instance
            .attribute_values
            .use_published_workfile
            .unwrap_or(self.settings.nuke.use_published_workfile);
        if !use_published {
            return context.current_file.clone();
        }
        match context.published_workfile.as_deref() {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => {
                warn!(
                    instance = %instance.name,
                    "no published workfile, using current file"
                );
                context.current_file.clone()
            }
        }
    }

    fn validate(&self, instance: &Instance) -> Result<(), ValidationError> {
        let priority = instance
            .attribute_values
            .priority
            .unwrap_or(self.settings.nuke.priority);
        validate_priority(priority)?;

        if let Some(frames) = instance.frames.as_deref().filter(|f| !f.trim().is_empty()) {
            validate_custom_frames(frames, instance.frame_start_handle, instance.frame_end_handle)?;
        }
        Ok(())
    }

    /// Submit all jobs for one instance.
    ///
    /// Returns `None` when the instance is not rendered on the farm.
    pub fn process(
        &self,
        instance: &mut Instance,
        context: &Context,
    ) -> Result<Option<SubmissionOutcome>, PipelineError> {
        if !instance.farm {
            debug!(instance = %instance.name, "should not be processed on farm, skipping");
            return Ok(None);
        }

        let url = self
            .deadline_url(instance)
            .ok_or_else(|| PipelineError::MissingDeadlineUrl(instance.name.clone()))?;
        let auth = instance
            .deadline
            .auth
            .as_ref()
            .or(self.settings.deadline.auth.as_ref());
        let client = self.client(url.clone(), auth);

        self.validate(instance)?;

        let scene_path = self.scene_path(instance, context);
        let frame_start = instance.frame_start_handle;
        let frame_end = instance.frame_end_handle;
        let render_path = instance.path.clone();

        let builder = PayloadBuilder::new(&self.settings.nuke, context, self.scene.as_ref())
            .with_env(self.env.as_ref());

        let mut outcome = SubmissionOutcome {
            deadline_url: url,
            ..Default::default()
        };

        if instance.render_target.defers_render() {
            debug!(instance = %instance.name, "frames rendered on farm later, no main job");
        } else {
            ensure_output_dir(&render_path)?;
            let request = JobRequest::new(
                scene_path.as_str(),
                render_path.as_str(),
                instance.write_node.as_str(),
                frame_start,
                frame_end,
            );
            let payload = builder.build(instance, &request)?;
            let response = client.submit(&payload)?;

            // Only a submitted render produces files.
            outcome.expected_files =
                resolve_expected_files(instance, &render_path, frame_start, frame_end);
            instance.deadline_submission_job = Some(response.clone());
            instance.output_dir = Some(to_forward_slashes(split_dir(&render_path).0));
            instance.publish_job_state = Some(PublishJobState::Suspended);
            outcome.render_job = Some(response);
        }

        let baking_scripts = instance.baking_nuke_scripts.clone();
        for script in &baking_scripts {
            ensure_output_dir(&script.bake_render_path)?;
            let request = JobRequest::new(
                script.bake_script_path.as_str(),
                script.bake_render_path.as_str(),
                script.bake_write_node_name.as_str(),
                frame_start,
                frame_end,
            )
            .depends_on(outcome.render_job.as_ref())
            .baking();
            let payload = builder.build(instance, &request)?;
            let response = client.submit(&payload)?;

            instance.deadline_submission_job = Some(response.clone());
            instance.publish_job_state = Some(PublishJobState::Suspended);
            if let Some(job_id) = response.job_id() {
                instance.baking_submission_jobs.push(job_id.to_string());
            }
            outcome.baking_jobs.push(response);
        }

        instance.relabel_product();

        info!(
            instance = %instance.name,
            jobs = outcome.job_count(),
            expected_files = outcome.expected_files,
            "instance submitted"
        );
        Ok(Some(outcome))
    }
}
