//! Utility functions for writing API objects and CRDs in the YAML file format
use std::{io::Write, path::Path};

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Represents every error which can be encountered during YAML serialization.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize YAML"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to write YAML document separator"))]
    WriteDocumentSeparator { source: std::io::Error },

    #[snafu(display("failed to write YAML to file {path:?}"))]
    WriteToFile {
        source: std::io::Error,
        path: std::path::PathBuf,
    },

    #[snafu(display("failed to write YAML to stdout"))]
    WriteToStdout { source: std::io::Error },

    #[snafu(display("failed to parse bytes as valid UTF-8 string"))]
    ParseUtf8Bytes { source: std::string::FromUtf8Error },
}

/// Provides configurable options during YAML serialization.
///
/// For most people the default implementation [`SerializeOptions::default()`] is sufficient as it
/// enables explicit document and singleton map serialization.
pub struct SerializeOptions {
    /// Adds leading triple dashes (`---`) to the output string.
    pub explicit_document: bool,

    /// Serialize enum variants as YAML maps using the variant name as the key.
    pub singleton_map: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            explicit_document: true,
            singleton_map: true,
        }
    }
}

/// Serializes any type `T` which is [serializable](serde::Serialize) as YAML using the provided
/// [`SerializeOptions`].
pub trait YamlSchema: Sized + serde::Serialize {
    /// Generates the YAML representation of `self` using the provided [`SerializeOptions`].
    fn generate_yaml_schema(&self, options: SerializeOptions) -> Result<String> {
        let mut buffer = Vec::new();
        serialize(&self, &mut buffer, options)?;

        String::from_utf8(buffer).context(ParseUtf8BytesSnafu)
    }

    /// Generates and writes the YAML representation of `self` to a file at `path`.
    fn write_yaml_schema<P: AsRef<Path>>(&self, path: P, options: SerializeOptions) -> Result<()> {
        let path = path.as_ref();
        let schema = self.generate_yaml_schema(options)?;

        std::fs::write(path, schema).context(WriteToFileSnafu { path })
    }

    /// Generates and prints the YAML representation of `self` to stdout.
    fn print_yaml_schema(&self, options: SerializeOptions) -> Result<()> {
        let schema = self.generate_yaml_schema(options)?;

        let mut writer = std::io::stdout();
        writer
            .write_all(schema.as_bytes())
            .context(WriteToStdoutSnafu)
    }
}

impl<T> YamlSchema for T where T: serde::ser::Serialize {}

/// Provides YAML schema generation and output capabilities for Kubernetes custom resources.
///
/// All output is an explicit document with leading dashes (`---`).
pub trait CustomResourceExt: kube::CustomResourceExt {
    /// The `CustomResourceDefinition` that is written out. Defaults to the generated one.
    fn custom_resource_definition() -> CustomResourceDefinition {
        Self::crd()
    }

    /// Generates the YAML schema of the `CustomResourceDefinition` and writes it to the file at
    /// `path`.
    fn write_yaml_schema<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::custom_resource_definition().write_yaml_schema(path, SerializeOptions::default())
    }

    /// Generates the YAML schema of the `CustomResourceDefinition` and prints it to [stdout].
    ///
    /// [stdout]: std::io::stdout
    fn print_yaml_schema() -> Result<()> {
        Self::custom_resource_definition().print_yaml_schema(SerializeOptions::default())
    }

    /// Generates the YAML schema of the `CustomResourceDefinition` and returns it as a [`String`].
    fn yaml_schema() -> Result<String> {
        Self::custom_resource_definition().generate_yaml_schema(SerializeOptions::default())
    }
}

/// Serializes the given data structure and writes it to a [`Writer`](Write).
///
/// Enums are serialized as a YAML map containing one entry in which the key identifies the variant
/// name, unless [`SerializeOptions::singleton_map`] is disabled.
pub fn serialize<T, W>(value: &T, mut writer: W, options: SerializeOptions) -> Result<()>
where
    T: serde::Serialize,
    W: Write,
{
    if options.explicit_document {
        writer
            .write_all(b"---\n")
            .context(WriteDocumentSeparatorSnafu)?;
    }

    let mut serializer = serde_yaml::Serializer::new(writer);

    if options.singleton_map {
        serde_yaml::with::singleton_map_recursive::serialize(value, &mut serializer)
            .context(SerializeYamlSnafu)?;
    } else {
        value
            .serialize(&mut serializer)
            .context(SerializeYamlSnafu)?;
    }

    Ok(())
}
