//! Client configuration, fixed at build time.

use map_notes_core::{LngLat, WorkflowConfig};

/// OpenFreeMap vector style: free, no API key.
pub const DEFAULT_STYLE_URL: &str = "https://tiles.openfreemap.org/styles/bright";

/// Berlin.
pub const DEFAULT_CENTER: LngLat = LngLat::new(13.405, 52.52);

pub const DEFAULT_ZOOM: f64 = 11.2;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub style_url: String,
    pub center: LngLat,
    pub zoom: f64,
    /// Notes API base URL. Local storage is used when unset.
    pub api_base: Option<String>,
    pub workflow: WorkflowConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            style_url: DEFAULT_STYLE_URL.to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            api_base: None,
            workflow: WorkflowConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults plus `MAP_NOTES_API_BASE` from the build environment. An
    /// empty value means same-origin.
    pub fn from_build_env() -> Self {
        Self {
            api_base: option_env!("MAP_NOTES_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string()),
            ..Self::default()
        }
    }
}
