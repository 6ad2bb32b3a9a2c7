use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use url::Url;

use super::descriptor::Resource;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::validate::Validator;

/// Base reference used before anything resolvable is known. Relative
/// locators cannot be resolved against it.
pub const OPAQUE_BASE: &str = "urn:nothing";

static OPAQUE: LazyLock<Arc<Url>> = LazyLock::new(|| {
    Arc::new(Url::parse(OPAQUE_BASE).expect("opaque base is a valid URN"))
});

/// Scoping context threaded through interpretation.
///
/// Updates return a new value sharing the untouched fields, so resources
/// built under an earlier environment never observe later changes.
#[derive(Debug, Clone)]
pub struct Environment {
    validators: Arc<[Validator]>,
    parameters: Arc<HashMap<String, String>>,
    base: Arc<Url>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            validators: Arc::from(Vec::new()),
            parameters: Arc::new(HashMap::new()),
            base: OPAQUE.clone(),
        }
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment whose relative references resolve against `res` and
    /// which inherits its validators.
    pub fn from_resource(res: &Resource) -> Self {
        Self::default()
            .with_validators(res.validators.clone())
            .with_base(res.uri.clone())
    }

    pub fn with_validators(&self, validators: Arc<[Validator]>) -> Self {
        Self {
            validators,
            ..self.clone()
        }
    }

    pub fn with_parameters(&self, parameters: HashMap<String, String>) -> Self {
        Self {
            parameters: Arc::new(parameters),
            ..self.clone()
        }
    }

    pub fn with_base(&self, base: Url) -> Self {
        Self {
            base: Arc::new(base),
            ..self.clone()
        }
    }

    /// Copy of the parameters with `name` bound to `value`.
    pub fn with_parameter(&self, name: String, value: String) -> Self {
        let mut parameters = (*self.parameters).clone();
        parameters.insert(name, value);
        self.with_parameters(parameters)
    }

    pub fn validators(&self) -> &Arc<[Validator]> {
        &self.validators
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn has_resolvable_base(&self) -> bool {
        !self.base.cannot_be_a_base()
    }

    /// Resolve `uri` against the base reference.
    pub fn resolve_uri(&self, uri: &str) -> LauncherResult<Url> {
        self.base
            .join(uri)
            .map_err(|source| LauncherError::MalformedUri {
                uri: uri.to_string(),
                source,
            })
    }

    /// Resolve `uri` and snapshot the current validators into a resource.
    pub fn resource(&self, uri: &str) -> LauncherResult<Resource> {
        Ok(Resource::new(self.resolve_uri(uri)?, self.validators.clone()))
    }
}
