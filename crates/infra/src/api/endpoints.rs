//! URL layout of the destination API

use paramsync_domain::{ApiConfig, Result, SyncError};
use url::Url;

/// Resolved URLs for the collection and its parameter resources
#[derive(Debug, Clone)]
pub struct Endpoints {
    collection: Url,
    version: String,
    entity_prefix: String,
    interface: String,
}

impl Endpoints {
    /// Resolve `<base><collection>` once; fails on an unparsable base URL.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let raw = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            normalize_path(&config.collection_path)
        );
        let collection = Url::parse(&raw)
            .map_err(|e| SyncError::Config(format!("Invalid destination URL {raw}: {e}")))?;
        if collection.cannot_be_a_base() {
            return Err(SyncError::Config(format!("Destination URL cannot carry a path: {raw}")));
        }

        Ok(Self {
            collection,
            version: config.version.clone(),
            entity_prefix: config.entity_prefix.clone(),
            interface: config.interface.clone(),
        })
    }

    /// `<base><collection>?api-version=<v>`
    pub fn collection(&self) -> Url {
        let mut url = self.collection.clone();
        url.query_pairs_mut().append_pair("api-version", &self.version);
        url
    }

    /// `<base><collection>/<prefix><id>/interfaces/<interface>/parameters/<name>?api-version=<v>`
    ///
    /// Each segment is percent-encoded, so parameter names may contain spaces
    /// or slashes.
    pub fn parameter(&self, entity_id: i64, parameter_name: &str) -> Url {
        let mut url = self.collection.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&format!("{}{entity_id}", self.entity_prefix))
                .push("interfaces")
                .push(&self.interface)
                .push("parameters")
                .push(parameter_name);
        }
        url.query_pairs_mut().append_pair("api-version", &self.version);
        url
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
