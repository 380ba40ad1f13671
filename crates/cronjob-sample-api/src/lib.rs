//! API types of the `CronJobSample` custom resource and the machinery to register them.
//!
//! - [`v1`] contains the resource, its spec, status and list types, and [`v1::add_to_scheme`].
//! - [`scheme`] contains the [`Scheme`](scheme::Scheme) type registry used to decode objects by
//!   `apiVersion` and `kind`.
//! - [`yaml`] contains helpers to write objects and the generated CRD as YAML.

pub mod scheme;
pub mod v1;
pub mod yaml;

// External re-exports
pub use k8s_openapi;
pub use kube;
pub use schemars;
// Internal re-exports
pub use yaml::{CustomResourceExt, YamlSchema};
