use std::path::{Path, PathBuf};

use cronjob_sample_api::{
    kube::{Resource, ResourceExt},
    scheme::{self, Scheme, SchemeObject},
    v1::{CronJobSample, CronJobSampleList},
};
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to read manifest file {path:?}"))]
    ReadManifest {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to decode manifests in {path:?}"))]
    DecodeManifest { source: scheme::Error, path: PathBuf },
}

/// Decodes all manifests in `path` and returns one summary line per object.
pub fn describe_file(scheme: &Scheme, path: &Path) -> Result<Vec<String>, Error> {
    let input = std::fs::read_to_string(path).context(ReadManifestSnafu { path })?;
    let objects = scheme
        .decode_yaml(&input)
        .context(DecodeManifestSnafu { path })?;

    info!(path = %path.display(), objects = objects.len(), "decoded manifests");
    Ok(objects.iter().flat_map(describe).collect())
}

/// Formats a decoded object as `<apiVersion> <kind> <namespace>/<name>`.
///
/// Lists are expanded into one line for the list followed by one line per item.
fn describe(object: &SchemeObject) -> Vec<String> {
    let gvk = object.group_version_kind();

    if let Some(sample) = object.downcast_ref::<CronJobSample>() {
        vec![describe_sample(sample)]
    } else if let Some(list) = object.downcast_ref::<CronJobSampleList>() {
        std::iter::once(format!(
            "{api_version} {kind} items={count}",
            api_version = gvk.api_version(),
            kind = gvk.kind,
            count = list.len()
        ))
        .chain(list.iter().map(describe_sample))
        .collect()
    } else {
        debug!(type_name = object.type_name(), "no description for type");
        vec![format!("{} {}", gvk.api_version(), gvk.kind)]
    }
}

fn describe_sample(sample: &CronJobSample) -> String {
    format!(
        "{api_version} {kind} {namespace}/{name}",
        api_version = CronJobSample::api_version(&()),
        kind = CronJobSample::kind(&()),
        namespace = sample.namespace().unwrap_or_default(),
        name = sample.name_any()
    )
}
