// ─── Launch-File Loader ───
// Fetches a launch file, merges its includes and follows `chain` hops.

use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::core::config::{Environment, Interpreter, LaunchDescriptor, Resource};
use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::props::PropertySource;

/// Upper bound on `chain` hops before giving up.
pub const MAX_CHAIN_DEPTH: usize = 16;

pub struct Loader<'a> {
    downloader: &'a Downloader,
    properties: Arc<dyn PropertySource>,
}

impl<'a> Loader<'a> {
    pub fn new(downloader: &'a Downloader, properties: Arc<dyn PropertySource>) -> Self {
        Self {
            downloader,
            properties,
        }
    }

    /// Load `source`, following chained launch files to the last one.
    pub async fn load(&self, source: &Resource) -> LauncherResult<LaunchDescriptor> {
        let mut current = source.clone();
        for _ in 0..MAX_CHAIN_DEPTH {
            let desc = self.load_merged(&current).await?;
            match &desc.chain {
                Some(next) => {
                    info!("{} chains to {}", current.uri, next.uri);
                    current = next.clone();
                }
                None => return Ok(desc),
            }
        }
        Err(LauncherError::ChainTooDeep(current.uri.to_string()))
    }

    /// Interpret `source` and every file it includes into one descriptor.
    ///
    /// Includes are processed in declaration order, including those added by
    /// included files; each URI is read at most once.
    pub async fn load_merged(&self, source: &Resource) -> LauncherResult<LaunchDescriptor> {
        let mut desc = LaunchDescriptor::new();
        self.read_into(&mut desc, source).await?;

        let mut next = 0;
        while let Some(include) = desc.include.get(next).cloned() {
            next += 1;
            if desc.included.contains(&include.uri) {
                debug!("Already included: {}", include.uri);
                continue;
            }
            self.read_into(&mut desc, &include).await?;
        }

        Ok(desc)
    }

    async fn read_into(&self, desc: &mut LaunchDescriptor, res: &Resource) -> LauncherResult<()> {
        desc.included.insert(res.uri.clone());

        let in_file = |source: LauncherError| LauncherError::InFile {
            uri: res.uri.to_string(),
            source: Box::new(source),
        };
        let path = self.downloader.fetch(res).await.map_err(in_file)?;
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| in_file(LauncherError::Io { path: path.clone(), source }))?;

        let mut interp = Interpreter::with_descriptor(std::mem::take(desc), self.properties.clone());
        interp
            .read(text.as_bytes(), Environment::from_resource(res))
            .map_err(in_file)?;
        *desc = interp.into_descriptor();

        info!("Loaded launch file {}", res.uri);
        Ok(())
    }
}

/// Turn a command-line argument (URL or local path) into a resource.
pub fn source_resource(arg: &str) -> LauncherResult<Resource> {
    let uri = match Url::parse(arg) {
        // Single-letter schemes are Windows drive letters.
        Ok(url) if url.scheme().len() > 1 => url,
        _ => {
            let path = std::fs::canonicalize(arg).map_err(|source| LauncherError::Io {
                path: arg.into(),
                source,
            })?;
            Url::from_file_path(&path)
                .map_err(|_| LauncherError::Other(format!("cannot express {path:?} as a URL")))?
        }
    };
    Ok(Resource::new(uri, Arc::from(Vec::new())))
}
