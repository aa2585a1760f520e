use provaudit_types::Channel;
use serde::{Deserialize, Serialize};

/// Artifact download events, one stream per channel and version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    Started {
        channel: Channel,
        version: String,
        url: String,
    },

    Completed {
        channel: Channel,
        version: String,
        bytes: u64,
    },

    Failed {
        channel: Channel,
        version: String,
        error: String,
    },
}
