//! Version `v1` of the `batch.example.com` API group.
//!
//! Kinds in this group version must be added to a [`Scheme`] with [`add_to_scheme`] before any
//! payload of them can be decoded through it.
use kube::core::GroupVersion;
use tracing::debug;

use crate::scheme::{self, Scheme};

mod cronjob_sample;

pub use cronjob_sample::*;

/// The API group of all kinds in this module.
pub const GROUP: &str = "batch.example.com";

/// The API version of all kinds in this module.
pub const VERSION: &str = "v1";

/// The group version used to register the kinds in this module.
pub fn group_version() -> GroupVersion {
    GroupVersion::gv(GROUP, VERSION)
}

/// Registers [`CronJobSample`] and [`CronJobSampleList`] with `scheme`.
///
/// Calling this more than once with the same scheme is harmless.
pub fn add_to_scheme(scheme: &mut Scheme) -> Result<(), scheme::Error> {
    scheme.register::<CronJobSample>()?;
    scheme.register::<CronJobSampleList>()?;

    debug!(group_version = %group_version().api_version(), "added kinds to scheme");
    Ok(())
}
