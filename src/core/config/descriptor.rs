use std::collections::{BTreeMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use url::Url;

use crate::core::error::LauncherResult;
use crate::core::validate::Validator;

/// An absolute locator plus the validators in effect when it was declared.
///
/// Equality and hashing consider only the locator.
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub uri: Url,
    pub validators: Arc<[Validator]>,
}

impl Resource {
    pub fn new(uri: Url, validators: Arc<[Validator]>) -> Self {
        Self { uri, validators }
    }

    /// Last path segment, used for naming cached and copied files.
    pub fn file_name(&self) -> String {
        self.uri
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or("resource")
            .to_string()
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for Resource {}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

/// A native library restricted to matching operating systems and architectures.
#[derive(Debug, Clone, Serialize)]
pub struct NativeLib {
    #[serde(rename = "os")]
    pub os_pattern: String,
    #[serde(rename = "arch")]
    pub arch_pattern: String,
    pub lib: Resource,
    #[serde(skip)]
    os: Regex,
    #[serde(skip)]
    arch: Regex,
}

impl NativeLib {
    /// Compile both patterns case-insensitively.
    pub fn new(os_pattern: &str, arch_pattern: &str, lib: Resource) -> LauncherResult<Self> {
        Ok(Self {
            os: compile_full_match(os_pattern, true)?,
            arch: compile_full_match(arch_pattern, true)?,
            os_pattern: os_pattern.to_string(),
            arch_pattern: arch_pattern.to_string(),
            lib,
        })
    }

    /// Whether this library applies to the given `os.name` / `os.arch` pair.
    pub fn matches(&self, os: &str, arch: &str) -> bool {
        self.os.is_match(os) && self.arch.is_match(arch)
    }
}

/// Compile `pattern` so that it must match the whole subject.
///
/// The raw pattern must compile on its own, so an unbalanced group cannot
/// close the anchoring wrapper.
pub fn compile_full_match(pattern: &str, case_insensitive: bool) -> LauncherResult<Regex> {
    RegexBuilder::new(pattern).build()?;
    Ok(RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(case_insensitive)
        .build()?)
}

/// Everything a launch file declares; built by one interpretation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LaunchDescriptor {
    pub classpath: Vec<Resource>,
    pub include: Vec<Resource>,
    pub included: HashSet<Url>,
    pub jvm_args: Vec<String>,
    pub cmd_args: Vec<String>,
    pub libraries: Vec<NativeLib>,
    pub sysprops: BTreeMap<String, String>,
    pub chain: Option<Resource>,
    pub main_class: Option<String>,
    pub exec_jar: Option<Resource>,
    pub title: Option<String>,
    pub splash_image: Option<Resource>,
    pub icon: Option<Resource>,
    /// Megabytes; zero or below means unset.
    pub heap_size: i32,
}

impl LaunchDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Native libraries that apply to the given host.
    pub fn native_libs_for<'a>(
        &'a self,
        os: &'a str,
        arch: &'a str,
    ) -> impl Iterator<Item = &'a NativeLib> + 'a {
        self.libraries.iter().filter(move |lib| lib.matches(os, arch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LauncherError;

    fn resource(uri: &str) -> Resource {
        Resource::new(Url::parse(uri).unwrap(), Arc::from(Vec::new()))
    }

    #[test]
    fn resources_compare_by_uri_only() {
        let v = Validator::parse("md5:5d41402abc4b2a76b9719d911017c592")
            .unwrap()
            .unwrap();
        let a = resource("https://example.com/a.jar");
        let b = Resource::new(a.uri.clone(), Arc::from(vec![v]));
        assert_eq!(a, b);

        let set: HashSet<Resource> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(resource("https://example.com/lib/x.jar").file_name(), "x.jar");
        assert_eq!(resource("https://example.com/").file_name(), "resource");
    }

    #[test]
    fn native_lib_matches_case_insensitively_and_fully() {
        let lib = NativeLib::new("(?i)win.*", "x86_64|amd64", resource("https://e.com/n.dll")).unwrap();
        assert!(lib.matches("Windows 10", "AMD64"));
        assert!(lib.matches("WINDOWS", "x86_64"));
        assert!(!lib.matches("Linux", "amd64"));
        assert!(!lib.matches("Windows", "amd64-ish"));
    }

    #[test]
    fn native_libs_are_filtered_for_host() {
        let mut desc = LaunchDescriptor::new();
        desc.libraries
            .push(NativeLib::new("linux", ".*", resource("https://e.com/a.so")).unwrap());
        desc.libraries
            .push(NativeLib::new("mac os x", ".*", resource("https://e.com/a.dylib")).unwrap());
        let picked: Vec<_> = desc.native_libs_for("Linux", "amd64").collect();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].lib.file_name(), "a.so");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(NativeLib::new("(", ".*", resource("https://e.com/a.so")).is_err());
    }

    #[test]
    fn unbalanced_group_cannot_escape_the_anchors() {
        let err = NativeLib::new("linux)|(.*", ".*", resource("https://e.com/a.so")).unwrap_err();
        assert!(matches!(err, LauncherError::MalformedPattern(_)));
        assert!(compile_full_match("a)|(b", false).is_err());
    }
}
