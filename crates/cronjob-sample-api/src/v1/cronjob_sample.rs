use k8s_openapi::{
    apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition,
    apimachinery::pkg::apis::meta::v1::ListMeta,
};
use kube::{
    CustomResource, Resource,
    core::{GroupVersionKind, TypeMeta},
};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{scheme::SchemeKind, yaml::CustomResourceExt};

/// Top-level fields that may be left out on the wire and then decode to their default.
const OPTIONAL_FIELDS: [&str; 2] = ["metadata", "spec"];

/// The desired state of a [`CronJobSample`].
///
/// Add new fields here as the API grows. Every field needs a serde name in camelCase and should
/// be omitted from the output while unset.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "batch.example.com",
    version = "v1",
    kind = "CronJobSample",
    plural = "cronjobsamples",
    status = "CronJobSampleStatus",
    derive = "Default",
    derive = "PartialEq",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct CronJobSampleSpec {
    /// An example field of CronJobSample. Left empty, it is omitted from the object.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub foo: String,
}

/// The observed state of a [`CronJobSample`].
///
/// Written through the `status` subresource by a controller, never by the user.
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJobSampleStatus {}

impl SchemeKind for CronJobSample {
    fn group_version_kind() -> GroupVersionKind {
        GroupVersionKind::gvk(&Self::group(&()), &Self::version(&()), &Self::kind(&()))
    }

    /// Decodes a resource, treating an absent or `null` `spec` (or `metadata`) as empty.
    fn from_value(mut value: serde_json::Value) -> Result<Self, serde_json::Error> {
        if let Some(object) = value.as_object_mut() {
            for field in OPTIONAL_FIELDS {
                if object.get(field).is_none_or(serde_json::Value::is_null) {
                    object.insert(field.to_owned(), serde_json::json!({}));
                }
            }
        }

        serde_json::from_value(value)
    }
}

impl CustomResourceExt for CronJobSample {
    /// The generated definition with `spec` removed from the required top-level properties.
    fn custom_resource_definition() -> CustomResourceDefinition {
        let mut crd = <Self as kube::CustomResourceExt>::crd();

        let schemas = crd
            .spec
            .versions
            .iter_mut()
            .filter_map(|version| version.schema.as_mut())
            .filter_map(|validation| validation.open_api_v3_schema.as_mut());

        for schema in schemas {
            if let Some(required) = &mut schema.required {
                required.retain(|field| !OPTIONAL_FIELDS.contains(&field.as_str()));
            }
            if schema.required.as_ref().is_some_and(Vec::is_empty) {
                schema.required = None;
            }
        }

        crd
    }
}

/// An ordered collection of [`CronJobSample`]s, as returned by list and watch calls.
///
/// `items` is always serialized, also when empty, and is required when deserializing. Items
/// without a `spec` decode to an empty spec.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJobSampleList {
    /// `apiVersion` and `kind`, inline. Defaults to this list's own type when absent.
    #[serde(flatten, deserialize_with = "CronJobSampleList::deserialize_type_meta")]
    pub types: TypeMeta,

    #[serde(default)]
    pub metadata: ListMeta,

    #[serde(deserialize_with = "CronJobSampleList::deserialize_items")]
    pub items: Vec<CronJobSample>,
}

impl CronJobSampleList {
    pub const KIND: &'static str = "CronJobSampleList";

    pub fn new(items: Vec<CronJobSample>) -> Self {
        Self {
            types: Self::type_meta(),
            metadata: ListMeta::default(),
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CronJobSample> {
        self.items.iter()
    }

    fn type_meta() -> TypeMeta {
        TypeMeta {
            api_version: CronJobSample::api_version(&()).into_owned(),
            kind: Self::KIND.to_owned(),
        }
    }

    fn deserialize_type_meta<'de, D>(deserializer: D) -> Result<TypeMeta, D::Error>
    where
        D: Deserializer<'de>,
    {
        let types = Option::<TypeMeta>::deserialize(deserializer)?;
        Ok(types.unwrap_or_else(Self::type_meta))
    }

    fn deserialize_items<'de, D>(deserializer: D) -> Result<Vec<CronJobSample>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<serde_json::Value>::deserialize(deserializer)?
            .into_iter()
            .map(|item| CronJobSample::from_value(item).map_err(serde::de::Error::custom))
            .collect()
    }
}

impl Default for CronJobSampleList {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<CronJobSample>> for CronJobSampleList {
    fn from(items: Vec<CronJobSample>) -> Self {
        Self::new(items)
    }
}

impl FromIterator<CronJobSample> for CronJobSampleList {
    fn from_iter<I: IntoIterator<Item = CronJobSample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for CronJobSampleList {
    type IntoIter = std::vec::IntoIter<CronJobSample>;
    type Item = CronJobSample;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a CronJobSampleList {
    type IntoIter = std::slice::Iter<'a, CronJobSample>;
    type Item = &'a CronJobSample;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl SchemeKind for CronJobSampleList {
    fn group_version_kind() -> GroupVersionKind {
        GroupVersionKind::gvk(
            &CronJobSample::group(&()),
            &CronJobSample::version(&()),
            Self::KIND,
        )
    }
}

#[cfg(test)]
mod tests {
    use kube::core::ObjectMeta;
    use serde_json::json;

    use super::*;

    fn sample(name: &str, foo: &str) -> CronJobSample {
        CronJobSample {
            metadata: ObjectMeta {
                name: Some(name.to_owned()),
                namespace: Some("default".to_owned()),
                ..ObjectMeta::default()
            },
            spec: CronJobSampleSpec {
                foo: foo.to_owned(),
            },
            status: None,
        }
    }

    #[test]
    fn spec_omits_empty_foo() {
        let spec = serde_json::to_value(CronJobSampleSpec::default()).unwrap();
        assert_eq!(spec, json!({}));
    }

    #[test]
    fn spec_missing_foo_defaults_to_empty() {
        let spec: CronJobSampleSpec = serde_json::from_value(json!({})).unwrap();
        assert_eq!(spec, CronJobSampleSpec::default());
    }

    #[test]
    fn status_serializes_as_empty_object() {
        let status = serde_json::to_value(CronJobSampleStatus {}).unwrap();
        assert_eq!(status, json!({}));
    }

    #[test]
    fn resource_includes_type_meta() {
        let value = serde_json::to_value(sample("nightly", "bar")).unwrap();

        assert_eq!(value["apiVersion"], "batch.example.com/v1");
        assert_eq!(value["kind"], "CronJobSample");
        assert_eq!(value["metadata"]["name"], "nightly");
    }

    #[test]
    fn list_default_sets_type_meta() {
        let list = CronJobSampleList::default();

        assert!(list.is_empty());
        assert_eq!(
            list.types,
            TypeMeta {
                api_version: "batch.example.com/v1".to_owned(),
                kind: "CronJobSampleList".to_owned(),
            }
        );
    }

    #[test]
    fn list_collects_in_order() {
        let list: CronJobSampleList = ["a", "b", "c"]
            .into_iter()
            .map(|name| sample(name, ""))
            .collect();

        let names: Vec<_> = list
            .iter()
            .filter_map(|s| s.metadata.name.as_deref())
            .collect();

        assert_eq!(list.len(), 3);
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn list_type_fields_default_when_absent() {
        let list: CronJobSampleList = serde_json::from_value(json!({"items": []})).unwrap();
        assert_eq!(list, CronJobSampleList::default());
    }

    #[test]
    fn list_type_fields_are_kept_when_present() {
        let list: CronJobSampleList = serde_json::from_value(json!({
            "apiVersion": "batch.example.com/v1",
            "kind": "CronJobSampleList",
            "metadata": { "resourceVersion": "42" },
            "items": [],
        }))
        .unwrap();

        assert_eq!(list.types, CronJobSampleList::default().types);
        assert_eq!(list.metadata.resource_version.as_deref(), Some("42"));
    }

    #[test]
    fn list_serializes_type_fields_inline() {
        let value = serde_json::to_value(CronJobSampleList::default()).unwrap();

        assert_eq!(
            value,
            json!({
                "apiVersion": "batch.example.com/v1",
                "kind": "CronJobSampleList",
                "metadata": {},
                "items": [],
            })
        );
    }

    #[test]
    fn missing_spec_decodes_to_default() {
        let sample = CronJobSample::from_value(json!({
            "apiVersion": "batch.example.com/v1",
            "kind": "CronJobSample",
            "metadata": { "name": "nightly" },
        }))
        .unwrap();

        assert_eq!(sample.spec, CronJobSampleSpec::default());
        assert_eq!(sample.metadata.name.as_deref(), Some("nightly"));
    }

    #[test]
    fn null_spec_and_missing_metadata_decode_to_default() {
        let sample = CronJobSample::from_value(json!({
            "apiVersion": "batch.example.com/v1",
            "kind": "CronJobSample",
            "spec": null,
            "status": {},
        }))
        .unwrap();

        assert_eq!(sample.metadata, ObjectMeta::default());
        assert_eq!(sample.spec, CronJobSampleSpec::default());
        assert_eq!(sample.status, Some(CronJobSampleStatus {}));
    }

    #[test]
    fn list_items_without_spec_decode_to_default() {
        let list: CronJobSampleList = serde_json::from_value(json!({
            "items": [
                { "apiVersion": "batch.example.com/v1", "kind": "CronJobSample", "metadata": { "name": "a" } },
                { "apiVersion": "batch.example.com/v1", "kind": "CronJobSample", "metadata": { "name": "b" }, "spec": { "foo": "bar" } },
            ],
        }))
        .unwrap();

        assert_eq!(list.items[0].spec, CronJobSampleSpec::default());
        assert_eq!(list.items[1].spec.foo, "bar");
    }

    #[test]
    fn malformed_list_item_is_rejected() {
        let result = serde_json::from_value::<CronJobSampleList>(json!({
            "items": [{ "spec": { "foo": 42 } }],
        }));

        assert!(result.is_err());
    }

    #[test]
    fn crd_keeps_spec_optional() {
        let crd = CronJobSample::custom_resource_definition();
        let schema = crd.spec.versions[0]
            .schema
            .as_ref()
            .and_then(|validation| validation.open_api_v3_schema.as_ref())
            .unwrap();

        let properties = schema.properties.as_ref().unwrap();
        assert!(properties.contains_key("spec"));
        assert!(properties.contains_key("status"));
        assert!(!schema.required.iter().flatten().any(|field| field == "spec"));
    }

    #[test]
    fn crd_yaml_uses_optional_spec() {
        let yaml = CronJobSample::yaml_schema().unwrap();
        let crd: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let schema = &crd["spec"]["versions"][0]["schema"]["openAPIV3Schema"];

        assert!(schema["properties"]["spec"].is_mapping());
        let required = schema["required"].as_sequence().cloned().unwrap_or_default();
        assert!(!required.contains(&serde_yaml::Value::from("spec")));
    }

    #[test]
    fn clone_is_deep() {
        let original = sample("nightly", "bar");
        let mut copy = original.clone();
        copy.spec.foo = "baz".to_owned();
        copy.status = Some(CronJobSampleStatus {});

        assert_eq!(original.spec.foo, "bar");
        assert_eq!(original.status, None);
    }

    #[test]
    fn gvks_share_group_version() {
        let resource = CronJobSample::group_version_kind();
        let list = CronJobSampleList::group_version_kind();

        assert_eq!(resource.group, list.group);
        assert_eq!(resource.version, list.version);
        assert_eq!(resource.kind, "CronJobSample");
        assert_eq!(list.kind, "CronJobSampleList");
    }
}
