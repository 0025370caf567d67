//! Repository card entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Description used when the hosting API has none for a repository
pub const DEFAULT_DESCRIPTION: &str = "No description available";

/// Banner used when a manifest only provides a demo link
pub const DEFAULT_BANNER: &str = "https://via.placeholder.com/600x200?text=No+Banner";

/// Name of the manifest file looked up on a repository's default branch
pub const MANIFEST_FILE_NAME: &str = "project.json";

/// Repository as listed by the hosting API
///
/// Only the fields the proxy uses are decoded; everything else in the
/// listing payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub default_branch: String,
}

impl RepositorySummary {
    pub fn new(
        name: impl Into<String>,
        html_url: impl Into<String>,
        default_branch: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            html_url: html_url.into(),
            description: None,
            default_branch: default_branch.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Opt-in manifest (`project.json`) read from a repository's default branch
///
/// Only a JSON object decodes into a manifest; arrays and scalars are
/// rejected instead of being mapped onto fields by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct ManifestDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(rename = "demoLink", skip_serializing_if = "Option::is_none")]
    pub demo_link: Option<String>,
}

impl ManifestDocument {
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    pub fn with_demo_link(mut self, demo_link: impl Into<String>) -> Self {
        self.demo_link = Some(demo_link.into());
        self
    }

    /// Banner URL, if present and non-empty
    pub fn banner(&self) -> Option<&str> {
        non_empty(self.banner.as_deref())
    }

    /// Demo link, if present and non-empty
    pub fn demo_link(&self) -> Option<&str> {
        non_empty(self.demo_link.as_deref())
    }

    /// A repository is shown only when its manifest sets a banner or a demo link
    pub fn is_qualifying(&self) -> bool {
        self.banner().is_some() || self.demo_link().is_some()
    }
}

/// UI-ready record for one qualifying repository
///
/// Decodes from a JSON object only, like [`ManifestDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct DisplayCard {
    pub name: String,
    pub html_url: String,
    pub description: String,
    pub banner: String,
    #[serde(rename = "demoLink")]
    pub demo_link: String,
}

#[derive(Deserialize)]
struct ManifestFields {
    #[serde(default)]
    banner: Option<String>,
    #[serde(rename = "demoLink", default)]
    demo_link: Option<String>,
}

#[derive(Deserialize)]
struct DisplayCardFields {
    name: String,
    html_url: String,
    description: String,
    banner: String,
    #[serde(rename = "demoLink")]
    demo_link: String,
}

impl TryFrom<Map<String, Value>> for ManifestDocument {
    type Error = serde_json::Error;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        let fields: ManifestFields = serde_json::from_value(Value::Object(object))?;

        Ok(Self {
            banner: fields.banner,
            demo_link: fields.demo_link,
        })
    }
}

impl TryFrom<Map<String, Value>> for DisplayCard {
    type Error = serde_json::Error;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        let fields: DisplayCardFields = serde_json::from_value(Value::Object(object))?;

        Ok(Self {
            name: fields.name,
            html_url: fields.html_url,
            description: fields.description,
            banner: fields.banner,
            demo_link: fields.demo_link,
        })
    }
}

impl DisplayCard {
    /// Builds a card, substituting defaults for absent or empty fields
    pub fn from_parts(repository: &RepositorySummary, manifest: &ManifestDocument) -> Self {
        Self {
            name: repository.name.clone(),
            html_url: repository.html_url.clone(),
            description: non_empty(repository.description.as_deref())
                .unwrap_or(DEFAULT_DESCRIPTION)
                .to_string(),
            banner: manifest.banner().unwrap_or(DEFAULT_BANNER).to_string(),
            demo_link: manifest.demo_link().unwrap_or_default().to_string(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
