use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::{self, MetaPixelType};
use crate::document::MetaPixelDocument;
use crate::error_codes::MetaPixelError;
use crate::meta_pixel::MetaPixel;
use crate::persistence::SaveOptions;

pub const MANIFEST_VERSION: u32 = 1;

/// YAML description of a hat's metapixels, in row order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HatManifest {
    #[serde(default = "default_manifest_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub clear_trailing_rows: bool,
    #[serde(default)]
    pub metapixels: Vec<MetaPixelEntry>,
}

/// A catalog type written either by name or by numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    Id(u8),
    Name(String),
}

impl TypeRef {
    pub fn resolve(&self) -> Result<&'static MetaPixelType, MetaPixelError> {
        match self {
            Self::Id(id) => catalog::require(*id),
            Self::Name(name) => catalog::resolve(name),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetaPixelEntry {
    #[serde(rename = "type")]
    pub kind: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<[u8; 2]>,
}

impl MetaPixelEntry {
    fn build(&self) -> Result<MetaPixel> {
        let kind = self.kind.resolve()?;
        match (&self.value, self.colors) {
            (Some(_), Some(_)) => bail!(
                "metapixel '{}' sets both value and colors; pick one",
                self.kind
            ),
            (Some(value), None) => {
                if value.len() != kind.domain.arity() {
                    bail!(
                        "metapixel '{}' is a {} and takes {} value component(s), got {}",
                        kind.name,
                        kind.domain.kind().name(),
                        kind.domain.arity(),
                        value.len()
                    );
                }
                if let Some(bad) = value.iter().find(|component| !component.is_finite()) {
                    bail!("metapixel '{}' value {bad} must be finite", kind.name);
                }
                let mut pixel = MetaPixel::new(kind, 0, 0);
                pixel.set_value(
                    value.first().copied().unwrap_or(0.0),
                    value.get(1).copied().unwrap_or(0.0),
                );
                Ok(pixel)
            }
            (None, Some([g, b])) => Ok(MetaPixel::new(kind, g, b)),
            (None, None) => Ok(MetaPixel::with_default(kind)),
        }
    }
}

impl HatManifest {
    pub fn from_document(document: &MetaPixelDocument) -> Self {
        let metapixels = document
            .iter()
            .map(|pixel| {
                let (g, b) = pixel.colors();
                MetaPixelEntry {
                    kind: TypeRef::Name(pixel.name().to_owned()),
                    value: None,
                    colors: Some([g, b]),
                }
            })
            .collect();
        Self {
            version: MANIFEST_VERSION,
            clear_trailing_rows: false,
            metapixels,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != MANIFEST_VERSION {
            bail!(
                "unsupported hat manifest version {} (expected {})",
                self.version,
                MANIFEST_VERSION
            );
        }
        self.build_document().map(|_| ())
    }

    pub fn build_document(&self) -> Result<MetaPixelDocument> {
        let mut document = MetaPixelDocument::new();
        for (index, entry) in self.metapixels.iter().enumerate() {
            let pixel = entry
                .build()
                .with_context(|| format!("failed validating metapixels[{index}]"))?;
            document
                .insert(pixel)
                .with_context(|| format!("failed validating metapixels[{index}]"))?;
        }
        Ok(document)
    }

    pub fn save_options(&self) -> SaveOptions {
        SaveOptions {
            clear_trailing_rows: self.clear_trailing_rows,
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize hat manifest")
    }
}

pub fn parse_manifest(contents: &str, origin: &str) -> Result<HatManifest> {
    let manifest: HatManifest = serde_yaml::from_str(contents).map_err(|error| {
        let location = error
            .location()
            .map(|location| format!("line {}, column {}", location.line(), location.column()))
            .unwrap_or_else(|| "unknown location".to_owned());
        anyhow!(
            "failed to parse yaml in {} at {}: {}",
            origin,
            location,
            error
        )
    })?;
    manifest.validate()?;
    Ok(manifest)
}

pub fn load_manifest(path: &Path) -> Result<HatManifest> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read hat manifest {}", path.display()))?;
    parse_manifest(&contents, &path.display().to_string())
}

fn default_manifest_version() -> u32 {
    MANIFEST_VERSION
}

fn is_false(value: &bool) -> bool {
    !*value
}
