use crate::{LoaderConfig, RemoteError};
use artman_schema::Manifest;
use std::io::Read;
use tracing::{debug, warn};

/// Downloads and decodes published manifest files.
///
/// One GET per [`load`](Self::load): no authentication, no retries, redirects
/// followed with the HTTP client's defaults. Only a `200` response is accepted.
pub struct ManifestLoader {
    config: LoaderConfig,
    agent: ureq::Agent,
}

impl Default for ManifestLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl ManifestLoader {
    pub fn new(config: LoaderConfig) -> Self {
        let agent = match config.timeout() {
            Some(timeout) => {
                let agent_config = ureq::Agent::config_builder()
                    .timeout_global(Some(timeout))
                    .build();
                ureq::Agent::new_with_config(agent_config)
            }
            None => ureq::Agent::new_with_defaults(),
        };
        Self { config, agent }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn load(&self, url: &str) -> Result<Manifest, RemoteError> {
        debug!("GET {url}");
        let resp = match self.agent.get(url).call() {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(status)) => {
                return Err(RemoteError::Status {
                    status,
                    url: url.to_owned(),
                });
            }
            Err(e) => return Err(RemoteError::Http(e.to_string())),
        };

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(RemoteError::Status {
                status,
                url: url.to_owned(),
            });
        }

        let mut body = Vec::new();
        resp.into_body().into_reader().read_to_end(&mut body)?;
        debug!("GET {url}: {} bytes", body.len());

        match serde_json::from_slice(&body) {
            Ok(manifest) => Ok(manifest),
            Err(e) if self.config.lenient_decode => {
                warn!("manifest at {url} did not decode, using an empty manifest: {e}");
                Ok(Manifest::default())
            }
            Err(e) => Err(RemoteError::Decode(e)),
        }
    }
}

/// Fetch a manifest with the default loader configuration.
pub fn load_manifest_from_url(url: &str) -> Result<Manifest, RemoteError> {
    ManifestLoader::default().load(url)
}
