use config::{Config, ConfigError, File, FileFormat};
use gdl_api::core::ElementKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, PartialEq, Clone, Serialize)]
pub struct LoggingConfig {
    pub log_level: String,
}

impl LoggingConfig {
    pub fn get_log_env(&self) -> EnvFilter {
        gdl_api::core::utils::logging::get_log_env(self.log_level.clone())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
        }
    }
}

/// Labels assumed for elements declared without one. An element whose label
/// equals its kind's default gets no implicit label predicate.
#[derive(Debug, Deserialize, PartialEq, Clone, Serialize)]
#[serde(default)]
pub struct GdlConfig {
    pub default_graph_label: String,
    pub default_vertex_label: String,
    pub default_edge_label: String,
    pub logging: LoggingConfig,
}

impl Default for GdlConfig {
    fn default() -> Self {
        Self {
            default_graph_label: "DefaultGraph".to_string(),
            default_vertex_label: "DefaultVertex".to_string(),
            default_edge_label: "DefaultEdge".to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GdlConfig {
    pub fn default_label(&self, kind: ElementKind) -> &str {
        match kind {
            ElementKind::Graph => &self.default_graph_label,
            ElementKind::Vertex => &self.default_vertex_label,
            ElementKind::Edge => &self.default_edge_label,
        }
    }
}

pub struct GdlConfigBuilder {
    default_graph_label: String,
    default_vertex_label: String,
    default_edge_label: String,
    logging: LoggingConfig,
}

impl From<GdlConfig> for GdlConfigBuilder {
    fn from(config: GdlConfig) -> Self {
        Self {
            default_graph_label: config.default_graph_label,
            default_vertex_label: config.default_vertex_label,
            default_edge_label: config.default_edge_label,
            logging: config.logging,
        }
    }
}

impl Default for GdlConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GdlConfigBuilder {
    pub fn new() -> Self {
        GdlConfig::default().into()
    }

    pub fn with_default_graph_label(mut self, label: impl Into<String>) -> Self {
        self.default_graph_label = label.into();
        self
    }

    pub fn with_default_vertex_label(mut self, label: impl Into<String>) -> Self {
        self.default_vertex_label = label.into();
        self
    }

    pub fn with_default_edge_label(mut self, label: impl Into<String>) -> Self {
        self.default_edge_label = label.into();
        self
    }

    pub fn with_log_level(mut self, log_level: String) -> Self {
        self.logging.log_level = log_level;
        self
    }

    pub fn build(self) -> GdlConfig {
        GdlConfig {
            default_graph_label: self.default_graph_label,
            default_vertex_label: self.default_vertex_label,
            default_edge_label: self.default_edge_label,
            logging: self.logging,
        }
    }
}

// Order of precedence of config loading: config path >> config args >> config default
pub fn load_config(
    gdl_config: Option<GdlConfig>,
    config_path: Option<PathBuf>,
) -> Result<GdlConfig, ConfigError> {
    let gdl_config = gdl_config.unwrap_or_default();
    let json =
        serde_json::to_string(&gdl_config).map_err(|err| ConfigError::Foreign(Box::new(err)))?;
    let mut builder = Config::builder().add_source(File::from_str(&json, FileFormat::Json));
    if let Some(config_path) = config_path {
        builder = builder.add_source(File::from(config_path));
    }
    builder.build()?.try_deserialize::<GdlConfig>()
}
