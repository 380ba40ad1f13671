//! A registry mapping `GroupVersionKind`s to the Rust types that represent them.
//!
//! A [`Scheme`] is constructed once at start-up, API packages add their kinds to it (see
//! [`crate::v1::add_to_scheme`]) and afterwards it is only read. Decoders consult it to turn an
//! untyped payload carrying `apiVersion` and `kind` into the registered type.
//!
//! ```
//! use cronjob_sample_api::{scheme::Scheme, v1};
//! use serde_json::json;
//!
//! let mut scheme = Scheme::new();
//! v1::add_to_scheme(&mut scheme).unwrap();
//!
//! let sample: v1::CronJobSample = scheme
//!     .decode_as(json!({
//!         "apiVersion": "batch.example.com/v1",
//!         "kind": "CronJobSample",
//!         "metadata": { "name": "nightly" },
//!         "spec": { "foo": "bar" },
//!     }))
//!     .unwrap();
//!
//! assert_eq!(sample.spec.foo, "bar");
//! ```
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
};

use kube::core::GroupVersionKind;
use serde::{Deserialize, de::DeserializeOwned};
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::{debug, trace};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(
        "kind {gvk} is already registered as {registered:?}, refusing to register {requested:?}"
    ))]
    ConflictingKind {
        gvk: DisplayGvk,
        registered: &'static str,
        requested: &'static str,
    },

    #[snafu(display("no kind {gvk} is registered in the scheme"))]
    UnknownKind { gvk: DisplayGvk },

    #[snafu(display("object is missing the {field:?} type field"))]
    MissingTypeField { field: &'static str },

    #[snafu(display("failed to parse apiVersion {api_version:?}"))]
    ParseApiVersion { api_version: String },

    #[snafu(display("failed to decode object of kind {gvk}"))]
    DecodeObject {
        source: serde_json::Error,
        gvk: DisplayGvk,
    },

    #[snafu(display("failed to parse YAML document"))]
    ParseYaml { source: serde_yaml::Error },

    #[snafu(display("decoded object of kind {gvk} is a {actual:?}, not a {expected:?}"))]
    UnexpectedType {
        gvk: DisplayGvk,
        actual: &'static str,
        expected: &'static str,
    },
}

/// Formats a [`GroupVersionKind`] as `group/version, Kind=Kind` (or `version, Kind=Kind` for the
/// core group) in error messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayGvk(pub GroupVersionKind);

impl fmt::Display for DisplayGvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.0.api_version(), self.0.kind)
    }
}

impl From<&GroupVersionKind> for DisplayGvk {
    fn from(gvk: &GroupVersionKind) -> Self {
        Self(gvk.clone())
    }
}

/// A type that can be registered in a [`Scheme`].
///
/// The [`Default`] value is what [`Scheme::construct`] hands out for the kind.
pub trait SchemeKind: Default + DeserializeOwned + Send + Sync + 'static {
    /// The key under which this type is registered.
    fn group_version_kind() -> GroupVersionKind;

    /// Decodes an untyped payload into this type.
    ///
    /// Override this when the wire format allows omitting fields that the Rust type requires.
    fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

type BoxedObject = Box<dyn Any + Send + Sync>;

#[derive(Clone, Copy)]
struct Registration {
    type_id: TypeId,
    type_name: &'static str,
    construct: fn() -> BoxedObject,
    decode: fn(serde_json::Value) -> Result<BoxedObject, serde_json::Error>,
}

impl Registration {
    fn of<K: SchemeKind>() -> Self {
        Self {
            type_id: TypeId::of::<K>(),
            type_name: std::any::type_name::<K>(),
            construct: construct_boxed::<K>,
            decode: decode_boxed::<K>,
        }
    }
}

fn construct_boxed<K: SchemeKind>() -> BoxedObject {
    Box::new(K::default())
}

fn decode_boxed<K: SchemeKind>(value: serde_json::Value) -> Result<BoxedObject, serde_json::Error> {
    Ok(Box::new(K::from_value(value)?))
}

/// The type registry consulted when decoding objects by `apiVersion` and `kind`.
#[derive(Default)]
pub struct Scheme {
    kinds: HashMap<GroupVersionKind, Registration>,
}

impl fmt::Debug for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.kinds()
                    .into_iter()
                    .map(|gvk| (DisplayGvk::from(gvk).to_string(), self.kinds[gvk].type_name)),
            )
            .finish()
    }
}

impl Scheme {
    /// Creates an empty scheme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `K` under [`SchemeKind::group_version_kind`].
    ///
    /// Registering the same type under the same key again is a no-op. Registering a different
    /// type under an existing key fails with [`Error::ConflictingKind`] and leaves the scheme
    /// unchanged.
    pub fn register<K: SchemeKind>(&mut self) -> Result<()> {
        let gvk = K::group_version_kind();
        let registration = Registration::of::<K>();

        if let Some(existing) = self.kinds.get(&gvk) {
            if existing.type_id == registration.type_id {
                trace!(gvk = %DisplayGvk::from(&gvk), "kind already registered");
                return Ok(());
            }

            return ConflictingKindSnafu {
                gvk: &gvk,
                registered: existing.type_name,
                requested: registration.type_name,
            }
            .fail();
        }

        debug!(
            gvk = %DisplayGvk::from(&gvk),
            type_name = registration.type_name,
            "registering kind"
        );
        self.kinds.insert(gvk, registration);

        Ok(())
    }

    /// Returns whether a type is registered under `gvk`.
    pub fn recognizes(&self, gvk: &GroupVersionKind) -> bool {
        self.kinds.contains_key(gvk)
    }

    /// Returns all registered keys, sorted by group, version and kind.
    pub fn kinds(&self) -> Vec<&GroupVersionKind> {
        let mut kinds: Vec<_> = self.kinds.keys().collect();
        kinds.sort_by(|a, b| {
            (&a.group, &a.version, &a.kind).cmp(&(&b.group, &b.version, &b.kind))
        });
        kinds
    }

    /// Returns the Rust type name registered under `gvk`.
    pub fn type_name_of(&self, gvk: &GroupVersionKind) -> Option<&'static str> {
        self.kinds.get(gvk).map(|r| r.type_name)
    }

    /// Returns the [`TypeId`] registered under `gvk`.
    pub fn type_id_of(&self, gvk: &GroupVersionKind) -> Option<TypeId> {
        self.kinds.get(gvk).map(|r| r.type_id)
    }

    /// Constructs the default value of the type registered under `gvk`.
    pub fn construct(&self, gvk: &GroupVersionKind) -> Result<SchemeObject> {
        let registration = self.registration(gvk)?;

        Ok(SchemeObject {
            gvk: gvk.clone(),
            type_name: registration.type_name,
            inner: (registration.construct)(),
        })
    }

    /// Decodes an untyped object into the type registered for its `apiVersion` and `kind`.
    pub fn decode(&self, value: serde_json::Value) -> Result<SchemeObject> {
        let gvk = group_version_kind_of(&value)?;
        let registration = self.registration(&gvk)?;

        trace!(gvk = %DisplayGvk::from(&gvk), "decoding object");
        let inner = (registration.decode)(value).context(DecodeObjectSnafu { gvk: &gvk })?;

        Ok(SchemeObject {
            gvk,
            type_name: registration.type_name,
            inner,
        })
    }

    /// Decodes an untyped object and downcasts it to `K`.
    pub fn decode_as<K: SchemeKind>(&self, value: serde_json::Value) -> Result<K> {
        self.decode(value)?.downcast()
    }

    /// Decodes every document in a (possibly multi-document) YAML stream.
    ///
    /// Documents that are empty or hold nothing but `null`, such as a trailing `---` or `--- ~`,
    /// are skipped. Both parse to the same value, so an explicit `null` is not reported.
    pub fn decode_yaml(&self, input: &str) -> Result<Vec<SchemeObject>> {
        let mut objects = Vec::new();

        for document in serde_yaml::Deserializer::from_str(input) {
            let value = serde_json::Value::deserialize(document).context(ParseYamlSnafu)?;
            if value.is_null() {
                trace!("skipping empty YAML document");
                continue;
            }

            objects.push(self.decode(value)?);
        }

        Ok(objects)
    }

    fn registration(&self, gvk: &GroupVersionKind) -> Result<&Registration> {
        self.kinds.get(gvk).context(UnknownKindSnafu { gvk })
    }
}

/// Reads the `apiVersion` and `kind` fields of an untyped object.
fn group_version_kind_of(value: &serde_json::Value) -> Result<GroupVersionKind> {
    let type_field = move |field: &'static str| {
        value
            .get(field)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
            .context(MissingTypeFieldSnafu { field })
    };

    let api_version = type_field("apiVersion")?;
    let kind = type_field("kind")?;

    let (group, version) = match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    };

    if version.is_empty() || version.contains('/') || (api_version.contains('/') && group.is_empty())
    {
        return ParseApiVersionSnafu { api_version }.fail();
    }

    Ok(GroupVersionKind::gvk(group, version, kind))
}

/// An object produced by a [`Scheme`], holding a value of the registered type.
pub struct SchemeObject {
    gvk: GroupVersionKind,
    type_name: &'static str,
    inner: BoxedObject,
}

impl fmt::Debug for SchemeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeObject")
            .field("gvk", &DisplayGvk::from(&self.gvk).to_string())
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl SchemeObject {
    pub fn group_version_kind(&self) -> &GroupVersionKind {
        &self.gvk
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<K: SchemeKind>(&self) -> bool {
        self.inner.is::<K>()
    }

    pub fn downcast_ref<K: SchemeKind>(&self) -> Option<&K> {
        self.inner.downcast_ref()
    }

    /// Takes the value out of the object if it is a `K`.
    pub fn downcast<K: SchemeKind>(self) -> Result<K> {
        match self.inner.downcast::<K>() {
            Ok(value) => Ok(*value),
            Err(_) => UnexpectedTypeSnafu {
                gvk: &self.gvk,
                actual: self.type_name,
                expected: std::any::type_name::<K>(),
            }
            .fail(),
        }
    }
}
