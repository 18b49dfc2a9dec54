//! Pointer analysis configuration
//!
//! `context_depth` bounds both call-string and allocation-context truncation
//! (the `k` of k-limited context sensitivity). The output directory and dump
//! flags only govern diagnostic exports and never change solving semantics.

use super::error::{ConfigError, ConfigResult};
use super::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest accepted context depth
pub const MAX_CONTEXT_DEPTH: i64 = 8;

/// Default pop budget for one cyclic call-graph component
pub const DEFAULT_SCC_ITERATION_CAP: usize = 1_000_000;

/// Configuration for one pointer analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerAnalysisConfig {
    /// k: number of call sites kept in a context
    context_depth: usize,

    /// Directory receiving DOT / JSON dumps
    output_directory: PathBuf,

    /// Write `pag.dot` after solving
    dump_pag: bool,

    /// Write `call_graph.dot` after solving
    dump_call_graph: bool,

    /// Write `stats.json` after solving
    dump_stats: bool,

    /// Host budget on worklist pops (None = unlimited)
    max_worklist_pops: Option<usize>,

    /// Pops a cyclic call-graph component may consume before it is frozen
    scc_iteration_cap: usize,
}

impl Default for PointerAnalysisConfig {
    fn default() -> Self {
        Self {
            context_depth: 1,
            output_directory: PathBuf::from("out"),
            dump_pag: false,
            dump_call_graph: false,
            dump_stats: false,
            max_worklist_pops: None,
            scc_iteration_cap: DEFAULT_SCC_ITERATION_CAP,
        }
    }
}

impl PointerAnalysisConfig {
    /// Create a validated configuration.
    ///
    /// `context_depth` is taken signed so hosts passing through untyped
    /// values get a range error instead of a wrap-around.
    pub fn new(
        context_depth: i64,
        output_directory: impl Into<PathBuf>,
        dump_pag: bool,
        dump_call_graph: bool,
    ) -> ConfigResult<Self> {
        check_depth(context_depth)?;
        let config = Self {
            context_depth: context_depth as usize,
            output_directory: output_directory.into(),
            dump_pag,
            dump_call_graph,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from YAML text (v1 schema)
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let raw: PointerAnalysisConfigV1 = serde_yaml::from_str(content)?;
        let version = raw.version.ok_or(ConfigError::MissingVersion)?;
        if version != 1 {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: vec![1],
            });
        }

        let mut config = Self::new(
            raw.context_depth,
            raw.output_directory.unwrap_or_else(|| PathBuf::from("out")),
            raw.dump_pag,
            raw.dump_call_graph,
        )?;
        config.dump_stats = raw.dump_stats;
        config.max_worklist_pops = raw.max_worklist_pops;
        if let Some(cap) = raw.scc_iteration_cap {
            config.scc_iteration_cap = cap;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load from YAML file (v1 schema)
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Builder: Set worklist pop budget
    pub fn with_max_worklist_pops(mut self, v: Option<usize>) -> ConfigResult<Self> {
        self.max_worklist_pops = v;
        self.validate()?;
        Ok(self)
    }

    /// Builder: Set per-SCC pop cap
    pub fn with_scc_iteration_cap(mut self, v: usize) -> ConfigResult<Self> {
        self.scc_iteration_cap = v;
        self.validate()?;
        Ok(self)
    }

    /// Builder: Set dump directory
    pub fn with_output_directory(mut self, dir: impl Into<PathBuf>) -> ConfigResult<Self> {
        self.output_directory = dir.into();
        self.validate()?;
        Ok(self)
    }

    /// Builder: Set stats dump
    pub fn with_dump_stats(mut self, v: bool) -> Self {
        self.dump_stats = v;
        self
    }

    pub fn context_depth(&self) -> usize {
        self.context_depth
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn dump_pag(&self) -> bool {
        self.dump_pag
    }

    pub fn dump_call_graph(&self) -> bool {
        self.dump_call_graph
    }

    pub fn dump_stats(&self) -> bool {
        self.dump_stats
    }

    pub fn max_worklist_pops(&self) -> Option<usize> {
        self.max_worklist_pops
    }

    pub fn scc_iteration_cap(&self) -> usize {
        self.scc_iteration_cap
    }

    /// Whether any dump is requested
    pub fn wants_dumps(&self) -> bool {
        self.dump_pag || self.dump_call_graph || self.dump_stats
    }
}

impl Validatable for PointerAnalysisConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_depth(self.context_depth as i64)?;

        if let Some(0) = self.max_worklist_pops {
            return Err(ConfigError::range_with_hint(
                "max_worklist_pops",
                0,
                1,
                usize::MAX,
                "Use None for an unlimited budget",
            ));
        }

        if self.scc_iteration_cap == 0 {
            return Err(ConfigError::range_with_hint(
                "scc_iteration_cap",
                0,
                1,
                usize::MAX,
                "A zero cap would freeze every recursive component immediately",
            ));
        }

        if self.wants_dumps() && self.output_directory.as_os_str().is_empty() {
            return Err(ConfigError::Custom(
                "output_directory must be set when a dump is requested".to_string(),
            ));
        }

        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "PointerAnalysisConfig"
    }
}

fn check_depth(depth: i64) -> ConfigResult<()> {
    if !(0..=MAX_CONTEXT_DEPTH).contains(&depth) {
        return Err(ConfigError::range_with_hint(
            "context_depth",
            depth,
            0,
            MAX_CONTEXT_DEPTH,
            "Context depth is the number of call sites kept per context",
        ));
    }
    Ok(())
}

/// On-disk YAML shape
#[derive(Debug, Deserialize)]
struct PointerAnalysisConfigV1 {
    version: Option<u32>,
    #[serde(default)]
    context_depth: i64,
    output_directory: Option<PathBuf>,
    #[serde(default)]
    dump_pag: bool,
    #[serde(default)]
    dump_call_graph: bool,
    #[serde(default)]
    dump_stats: bool,
    max_worklist_pops: Option<usize>,
    scc_iteration_cap: Option<usize>,
}
