// ─── Host Properties ───
// Configuration properties visible to launch files through `${p:NAME}`.

use std::collections::HashMap;

/// Read-only lookup of host configuration properties.
pub trait PropertySource: Send + Sync {
    fn property(&self, name: &str) -> Option<String>;
}

impl PropertySource for HashMap<String, String> {
    fn property(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Properties describing the running host, named the way Java runtimes name them.
#[derive(Debug, Clone, Default)]
pub struct HostProperties {
    values: HashMap<String, String>,
}

impl HostProperties {
    /// Snapshot of the current host.
    pub fn detect() -> Self {
        let mut values = HashMap::new();
        values.insert("os.name".to_string(), java_os_name().to_string());
        values.insert("os.arch".to_string(), java_os_arch().to_string());
        values.insert(
            "file.separator".to_string(),
            std::path::MAIN_SEPARATOR.to_string(),
        );
        values.insert(
            "path.separator".to_string(),
            if cfg!(target_os = "windows") { ";" } else { ":" }.to_string(),
        );
        values.insert(
            "java.io.tmpdir".to_string(),
            std::env::temp_dir().to_string_lossy().to_string(),
        );
        if let Some(home) = dirs::home_dir() {
            values.insert("user.home".to_string(), home.to_string_lossy().to_string());
        }
        if let Some(user) = std::env::var("USER")
            .ok()
            .or_else(|| std::env::var("USERNAME").ok())
        {
            values.insert("user.name".to_string(), user);
        }
        values.insert(
            "haven.launcher.version".to_string(),
            format!(
                "{}.{}",
                crate::core::config::MAJOR_VERSION,
                crate::core::config::MINOR_VERSION
            ),
        );
        Self { values }
    }

    /// Add or replace a property.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn extend<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.values.extend(overrides);
        self
    }

    pub fn os_name(&self) -> &str {
        self.values.get("os.name").map(String::as_str).unwrap_or("")
    }

    pub fn os_arch(&self) -> &str {
        self.values.get("os.arch").map(String::as_str).unwrap_or("")
    }
}

impl PropertySource for HostProperties {
    fn property(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

fn java_os_name() -> &'static str {
    match std::env::consts::OS {
        "windows" => "Windows",
        "macos" => "Mac OS X",
        "linux" => "Linux",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

fn java_os_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "x86",
        "aarch64" => "aarch64",
        "arm" => "arm",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_fills_os_properties() {
        let props = HostProperties::detect();
        assert!(!props.os_name().is_empty());
        assert!(!props.os_arch().is_empty());
        assert_eq!(props.property("haven.launcher.version").as_deref(), Some("1.2"));
    }

    #[test]
    fn overrides_replace_detected_values() {
        let props = HostProperties::detect()
            .with("os.name", "Windows 10")
            .extend([("custom".to_string(), "yes".to_string())]);
        assert_eq!(props.os_name(), "Windows 10");
        assert_eq!(props.property("custom").as_deref(), Some("yes"));
        assert_eq!(props.property("absent"), None);
    }
}
