use std::path::PathBuf;

use log::debug;
use reqwest::Client;
use url::Url;

use crate::error::Error;

/// Source of the page resources, addressed by paths relative to the site root.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, Error>;

    /// The address the rendered page uses to reference `path`.
    fn url(&self, path: &str) -> String;
}

pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base: &str) -> Result<Self, Error> {
        let mut base = Url::parse(base).map_err(|e| Error::Config(format!("{}: {}", base, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(concat!("trailmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(HttpFetcher { client, base })
    }

    fn resolve(&self, path: &str) -> Result<Url, Error> {
        self.base.join(path).map_err(|e| Error::load(path, e))
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, Error> {
        let url = self.resolve(path)?;
        debug!("GET {}", url);

        let resp = self.client.get(url).send().await.map_err(|e| Error::load(path, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::load(path, format!("HTTP {}", status)));
        }

        let bytes = resp.bytes().await.map_err(|e| Error::load(path, e))?;
        Ok(bytes.to_vec())
    }

    fn url(&self, path: &str) -> String {
        self.resolve(path).map(String::from).unwrap_or_else(|_| path.to_owned())
    }
}

/// Reads resources from a local site directory.
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        DirFetcher { root: root.into() }
    }
}

impl Fetch for DirFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, Error> {
        let file = self.root.join(path);
        debug!("reading {}", file.display());
        tokio::fs::read(&file).await.map_err(|e| Error::load(path, e))
    }

    fn url(&self, path: &str) -> String {
        path.to_owned()
    }
}
