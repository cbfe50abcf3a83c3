//! Registry records
//!
//! Records are stored as flat JSON objects and handed back to clients
//! unchanged. Each record type keeps the full ordered object and only checks
//! the fields the registry itself depends on.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{RegistryError, Result};

macro_rules! json_record {
    ($(#[$meta:meta])* $name:ident, required = [$($field:literal),*]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            fields: Map<String, Value>,
        }

        impl $name {
            /// Wrap a JSON object, checking required string fields
            pub fn from_fields(fields: Map<String, Value>) -> Result<Self> {
                $(
                    if !fields.get($field).map_or(false, Value::is_string) {
                        return Err(RegistryError::SerializationError(format!(
                            "{} record is missing string field `{}`",
                            stringify!($name),
                            $field
                        )));
                    }
                )*
                Ok(Self { fields })
            }

            /// All fields in document order
            pub fn fields(&self) -> &Map<String, Value> {
                &self.fields
            }

            /// String value of a field, if present and a string
            pub fn str_field(&self, key: &str) -> Option<&str> {
                self.fields.get(key).and_then(Value::as_str)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                self.fields.serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let fields: Map<String, Value> = Map::deserialize(deserializer)?;
                Self::from_fields(fields).map_err(serde::de::Error::custom)
            }
        }
    };
}

json_record!(
    /// A package version record (`packages/<registry>/<name>/<version>.json`)
    PackageEntry,
    required = ["canonical", "version"]
);

impl PackageEntry {
    /// Canonical name as written in the record
    pub fn canonical(&self) -> &str {
        self.str_field("canonical").unwrap_or_default()
    }

    /// Version as written in the record
    pub fn version(&self) -> &str {
        self.str_field("version").unwrap_or_default()
    }
}

json_record!(
    /// An application release record (`apps/<app-id>/<version>.json`)
    AppEntry,
    required = []
);

/// A downloadable file listed in an [`AppEntry`]
#[derive(Debug, Clone, Copy)]
pub struct AppFile<'a> {
    /// Download URL
    pub url: &'a str,
    /// Checksums keyed `<algo>-hex` / `<algo>-base64`
    pub checksums: Option<&'a Map<String, Value>>,
}

impl AppEntry {
    /// Download URLs from `file_urls`, in document order
    pub fn file_urls(&self) -> impl Iterator<Item = &str> {
        self.fields
            .get("file_urls")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|urls| urls.values())
            .filter_map(Value::as_str)
    }

    /// Entries of `files` that carry a URL, in document order
    pub fn files(&self) -> impl Iterator<Item = AppFile<'_>> {
        self.fields
            .get("files")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|files| files.values())
            .filter_map(|file| {
                let file = file.as_object()?;
                Some(AppFile {
                    url: file.get("url")?.as_str()?,
                    checksums: file.get("checksums").and_then(Value::as_object),
                })
            })
    }
}

json_record!(
    /// An AWS Lambda layer record (`aws-lambda-layers/<runtime>/latest.json`)
    LambdaLayerEntry,
    required = ["canonical"]
);

impl LambdaLayerEntry {
    /// Canonical name of the layer
    pub fn canonical(&self) -> &str {
        self.str_field("canonical").unwrap_or_default()
    }
}

json_record!(
    /// A marketing slug definition from `misc/marketing-slugs.json`
    MarketingSlug,
    required = ["type"]
);

/// What a marketing slug points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugKind {
    Sdk,
    Package,
    Integration,
    Other,
}

impl MarketingSlug {
    /// Slug kind from the `type` field
    pub fn kind(&self) -> SlugKind {
        match self.str_field("type") {
            Some("sdk") => SlugKind::Sdk,
            Some("package") => SlugKind::Package,
            Some("integration") => SlugKind::Integration,
            _ => SlugKind::Other,
        }
    }

    /// Target identifier (SDK id or canonical, depending on kind)
    pub fn target(&self) -> Option<&str> {
        self.str_field("target")
    }

    /// SDK id an integration belongs to
    pub fn sdk(&self) -> Option<&str> {
        self.str_field("sdk").filter(|s| !s.is_empty())
    }

    /// Package canonical an integration belongs to
    pub fn package(&self) -> Option<&str> {
        self.str_field("package").filter(|s| !s.is_empty())
    }

    /// Integration value, passed through as-is
    pub fn integration(&self) -> Value {
        self.fields.get("integration").cloned().unwrap_or(Value::Null)
    }
}
