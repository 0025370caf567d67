//! Repository card domain - entities, hosting backend and pipeline events

mod entity;
mod hosting;
mod observer;

pub use entity::{
    DisplayCard, ManifestDocument, RepositorySummary, DEFAULT_BANNER, DEFAULT_DESCRIPTION,
    MANIFEST_FILE_NAME,
};
pub use hosting::{HostingClient, ManifestFetch};
pub use observer::{ExclusionReason, NoopObserver, PipelineEvent, PipelineObserver};

#[cfg(test)]
pub use hosting::mock::MockHostingClient;
#[cfg(test)]
pub use observer::mock::RecordingObserver;
