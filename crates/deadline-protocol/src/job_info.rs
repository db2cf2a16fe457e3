//! `JobInfo` section of a job submission.
//!
//! Deadline expects repeated values as flat, numbered keys
//! (`JobDependency0`, `EnvironmentKeyValue1`, ...). The struct keeps them as
//! vectors and flattens them during serialization.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Deadline job type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobType {
    /// Regular render job.
    Normal,
}

impl JobType {
    /// Wire name of the job type.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Normal => "Normal",
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job-level metadata of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobInfo {
    /// Top-level group name shown in the Monitor.
    pub batch_name: String,
    /// Job name as seen in the Monitor.
    pub name: String,
    /// Submitting user.
    pub user_name: String,
    pub priority: u32,
    pub chunk_size: u32,
    pub concurrent_tasks: u32,
    pub department: String,
    pub pool: Option<String>,
    pub secondary_pool: Option<String>,
    pub group: String,
    /// Deadline plugin executing the job.
    pub plugin: String,
    /// Frame list, e.g. `1001-1050`.
    pub frames: String,
    pub comment: String,
    /// `OutputDirectory0..N`
    pub output_directories: Vec<String>,
    /// `OutputFilename0..N`, enables frame preview from the Monitor.
    pub output_filenames: Vec<String>,
    /// Serialized comma-joined as `LimitGroups`.
    pub limit_groups: Vec<String>,
    pub job_type: Option<JobType>,
    /// `AssetDependency0..N`
    pub asset_dependencies: Vec<String>,
    /// `JobDependency0..N`
    pub job_dependencies: Vec<String>,
    /// `EnvironmentKeyValue0..N` as `KEY=VALUE`.
    pub environment: Vec<(String, String)>,
}

fn serialize_indexed<M: SerializeMap>(
    map: &mut M,
    prefix: &str,
    values: &[String],
) -> Result<(), M::Error> {
    for (index, value) in values.iter().enumerate() {
        map.serialize_entry(&format!("{}{}", prefix, index), value)?;
    }
    Ok(())
}

impl Serialize for JobInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("BatchName", &self.batch_name)?;
        map.serialize_entry("Name", &self.name)?;
        map.serialize_entry("UserName", &self.user_name)?;
        map.serialize_entry("Priority", &self.priority)?;
        map.serialize_entry("ChunkSize", &self.chunk_size)?;
        map.serialize_entry("ConcurrentTasks", &self.concurrent_tasks)?;
        map.serialize_entry("Department", &self.department)?;
        if let Some(pool) = &self.pool {
            map.serialize_entry("Pool", pool)?;
        }
        if let Some(pool) = &self.secondary_pool {
            map.serialize_entry("SecondaryPool", pool)?;
        }
        map.serialize_entry("Group", &self.group)?;
        map.serialize_entry("Plugin", &self.plugin)?;
        map.serialize_entry("Frames", &self.frames)?;
        map.serialize_entry("Comment", &self.comment)?;
        serialize_indexed(&mut map, "OutputDirectory", &self.output_directories)?;
        serialize_indexed(&mut map, "OutputFilename", &self.output_filenames)?;
        map.serialize_entry("LimitGroups", &self.limit_groups.join(","))?;
        if let Some(job_type) = self.job_type {
            map.serialize_entry("JobType", job_type.as_str())?;
        }
        serialize_indexed(&mut map, "AssetDependency", &self.asset_dependencies)?;
        serialize_indexed(&mut map, "JobDependency", &self.job_dependencies)?;
        for (index, (key, value)) in self.environment.iter().enumerate() {
            map.serialize_entry(
                &format!("EnvironmentKeyValue{}", index),
                &format!("{}={}", key, value),
            )?;
        }
        map.end()
    }
}
