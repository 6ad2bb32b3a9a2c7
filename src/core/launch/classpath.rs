// ─── Launch Plan ───
// Fetches every resource a descriptor needs and lays out the local files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use url::Url;

use crate::core::config::LaunchDescriptor;
use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};

/// Local files backing a descriptor, ready to be turned into a command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchPlan {
    pub classpath: Vec<PathBuf>,
    pub exec_jar: Option<PathBuf>,
    pub splash_image: Option<PathBuf>,
    pub icon: Option<PathBuf>,
    /// Directory holding the native libraries for this host, when any apply.
    pub natives_dir: Option<PathBuf>,
}

impl LaunchPlan {
    /// Fetch and validate everything `desc` references.
    ///
    /// Native libraries whose patterns match `os`/`arch` are copied into
    /// `natives_dir`.
    pub async fn prepare(
        desc: &LaunchDescriptor,
        downloader: &Downloader,
        os: &str,
        arch: &str,
        natives_dir: &Path,
    ) -> LauncherResult<Self> {
        let classpath = downloader.fetch_all(&desc.classpath).await?;

        let mut plan = Self {
            classpath,
            ..Self::default()
        };
        if let Some(res) = &desc.exec_jar {
            plan.exec_jar = Some(downloader.fetch(res).await?);
        }
        if let Some(res) = &desc.splash_image {
            plan.splash_image = Some(downloader.fetch(res).await?);
        }
        if let Some(res) = &desc.icon {
            plan.icon = Some(downloader.fetch(res).await?);
        }

        let natives: Vec<_> = desc
            .native_libs_for(os, arch)
            .map(|lib| lib.lib.clone())
            .collect();
        let mut names: HashMap<String, &Url> = HashMap::new();
        for res in &natives {
            if let Some(first) = names.insert(res.file_name(), &res.uri) {
                if *first != res.uri {
                    return Err(LauncherError::NativeNameClash {
                        name: res.file_name(),
                        first: first.to_string(),
                        second: res.uri.to_string(),
                    });
                }
            }
        }
        if !natives.is_empty() {
            debug!("{} native libraries apply to {} / {}", natives.len(), os, arch);
            tokio::fs::create_dir_all(natives_dir)
                .await
                .map_err(|source| LauncherError::Io {
                    path: natives_dir.to_path_buf(),
                    source,
                })?;
            let fetched = downloader.fetch_all(&natives).await?;
            for (res, src) in natives.iter().zip(fetched) {
                let dest = natives_dir.join(res.file_name());
                tokio::fs::copy(&src, &dest)
                    .await
                    .map_err(|source| LauncherError::Io {
                        path: dest.clone(),
                        source,
                    })?;
            }
            plan.natives_dir = Some(natives_dir.to_path_buf());
        }

        info!(
            "Prepared launch: {} classpath entries, natives={}",
            plan.classpath.len(),
            plan.natives_dir.is_some()
        );
        Ok(plan)
    }
}

/// Join classpath entries with the platform separator.
pub fn build_classpath(entries: &[PathBuf]) -> String {
    entries
        .iter()
        .map(|p| safe_path_str(p))
        .collect::<Vec<_>>()
        .join(get_classpath_separator())
}

/// Uses `;` on Windows, `:` on Linux/macOS.
pub fn get_classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

pub fn safe_path_str(path: &Path) -> String {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let text = resolved.to_string_lossy().to_string();

    #[cfg(target_os = "windows")]
    {
        // Java mishandles extended-length paths (`\\?\C:\...`) on the classpath.
        if let Some(stripped) = text.strip_prefix(r"\\?\") {
            return stripped.to_string();
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Environment, Interpreter};
    use crate::core::props::HostProperties;
    use std::sync::Arc;
    use url::Url;

    fn interpret(dir: &Path, src: &str) -> LaunchDescriptor {
        let base = Url::from_directory_path(dir).unwrap();
        let mut interp = Interpreter::new(Arc::new(HostProperties::detect()));
        interp
            .read(src.as_bytes(), Environment::new().with_base(base))
            .unwrap();
        interp.into_descriptor()
    }

    #[test]
    fn classpath_uses_platform_separator() {
        let cp = build_classpath(&[PathBuf::from("/nonexistent/a.jar"), PathBuf::from("/nonexistent/b.jar")]);
        let parts: Vec<_> = cp.split(get_classpath_separator()).collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].ends_with("a.jar"));
        assert!(parts[1].ends_with("b.jar"));
    }

    #[tokio::test]
    async fn prepare_fetches_and_copies_matching_natives() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.jar", "app.jar", "splash.png", "lin.so", "win.dll"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }
        let desc = interpret(
            dir.path(),
            "class-path a.jar\nexec-jar app.jar\nsplash-image splash.png\n\
             native-lib linux amd64 lin.so\nnative-lib (?i)win.* .* win.dll\n",
        );

        let downloader = Downloader::new(dir.path().join("cache")).unwrap();
        let natives = dir.path().join("natives");
        let plan = LaunchPlan::prepare(&desc, &downloader, "Linux", "amd64", &natives)
            .await
            .unwrap();

        assert_eq!(plan.classpath.len(), 1);
        assert!(plan.exec_jar.unwrap().ends_with("app.jar"));
        assert!(plan.splash_image.is_some());
        assert!(plan.icon.is_none());
        assert_eq!(plan.natives_dir.as_deref(), Some(natives.as_path()));
        assert!(natives.join("lin.so").exists());
        assert!(!natives.join("win.dll").exists());
    }

    #[tokio::test]
    async fn prepare_rejects_natives_sharing_a_file_name() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b"] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
            std::fs::write(dir.path().join(sub).join("lib.so"), sub).unwrap();
        }
        let desc = interpret(
            dir.path(),
            "native-lib linux .* a/lib.so\nnative-lib linux .* b/lib.so\n",
        );

        let downloader = Downloader::new(dir.path().join("cache")).unwrap();
        let natives = dir.path().join("natives");
        let err = LaunchPlan::prepare(&desc, &downloader, "Linux", "amd64", &natives)
            .await
            .unwrap_err();
        match err {
            LauncherError::NativeNameClash { name, .. } => assert_eq!(name, "lib.so"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!natives.exists());
    }

    #[tokio::test]
    async fn prepare_skips_natives_dir_when_nothing_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lin.so"), "").unwrap();
        let desc = interpret(dir.path(), "native-lib linux amd64 lin.so\n");

        let downloader = Downloader::new(dir.path().join("cache")).unwrap();
        let natives = dir.path().join("natives");
        let plan = LaunchPlan::prepare(&desc, &downloader, "Mac OS X", "aarch64", &natives)
            .await
            .unwrap();
        assert!(plan.natives_dir.is_none());
        assert!(!natives.exists());
    }
}
