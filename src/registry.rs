use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path};

/// One plugin category: the descriptor file it produces and the marker
/// interfaces that qualify a class for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginType {
    pub file_name: String,
    pub markers: Vec<String>,
}

impl PluginType {
    pub fn new(file_name: &str, markers: &[&str]) -> Self {
        Self {
            file_name: file_name.to_string(),
            markers: markers.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Descriptors are written directly into PF-INF, so the name may not walk
/// out of it or into a subdirectory.
fn is_single_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}

const DEFAULT_PLUGIN_TYPES: &[(&str, &[&str])] = &[
    (
        "authentication-selectors",
        &[
            "com.pingidentity.sdk.AdapterSelector",
            "com.pingidentity.sdk.AuthenticationSelector",
        ],
    ),
    (
        "bearer-access-token-management-plugins",
        &["com.pingidentity.sdk.oauth20.BearerAccessTokenManagementPlugin"],
    ),
    (
        "custom-drivers",
        &["com.pingidentity.sources.CustomDataSourceDriver"],
    ),
    (
        "dynamic-client-registration",
        &["com.pingidentity.sdk.oauth20.registration.DynamicClientRegistrationPlugin"],
    ),
    (
        "identity-store-provisioners",
        &["com.pingidentity.sdk.provision.IdentityStoreProvisionerWithFiltering"],
    ),
    (
        "idp-authn-adapters",
        &[
            "org.sourceid.saml20.adapter.idp.authn.IdpAuthenticationAdapter",
            "com.pingidentity.sdk.IdpAuthenticationAdapterV2",
        ],
    ),
    (
        "notification-sender",
        &["com.pingidentity.sdk.notification.NotificationPublisherPlugin"],
    ),
    (
        "oob-auth-plugins",
        &["com.pingidentity.sdk.oobauth.OOBAuthPlugin"],
    ),
    (
        "password-credential-validators",
        &["com.pingidentity.sdk.password.PasswordCredentialValidator"],
    ),
    (
        "saas-provisioning-plugin-descriptor",
        &["saas-provisioning-plugin-descriptor"],
    ),
    (
        "sp-authn-adapters",
        &["org.sourceid.saml20.adapter.sp.authn.SpAuthenticationAdapter"],
    ),
    (
        "token-generators",
        &["org.sourceid.wstrust.plugin.generate.TokenGenerator"],
    ),
    (
        "token-processors",
        &["org.sourceid.wstrust.plugin.process.TokenProcessor"],
    ),
];

/// Immutable table of plugin categories. Built once, then only read.
#[derive(Debug, Clone)]
pub struct Registry {
    types: Vec<PluginType>,
}

impl Registry {
    pub fn new(types: Vec<PluginType>) -> Result<Self> {
        let mut seen = HashSet::new();
        for t in &types {
            if t.file_name.is_empty() {
                anyhow::bail!("Plugin type with empty file name");
            }
            if !is_single_file_name(&t.file_name) {
                anyhow::bail!(
                    "Plugin type file name must be a single path component: {}",
                    t.file_name
                );
            }
            if t.markers.is_empty() {
                anyhow::bail!("Plugin type {} has no marker interfaces", t.file_name);
            }
            if !seen.insert(t.file_name.as_str()) {
                anyhow::bail!("Duplicate plugin type file name: {}", t.file_name);
            }
        }
        Ok(Self { types })
    }

    /// Loads a JSON array of `{ "file_name": ..., "markers": [...] }`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plugin types file: {}", path.display()))?;
        let types: Vec<PluginType> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse plugin types file: {}", path.display()))?;
        Self::new(types).with_context(|| format!("Invalid plugin types file: {}", path.display()))
    }

    pub fn types(&self) -> &[PluginType] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            types: DEFAULT_PLUGIN_TYPES
                .iter()
                .map(|(file_name, markers)| PluginType::new(file_name, markers))
                .collect(),
        }
    }
}
