use serde::{Deserialize, Serialize};

use crate::hash::ActionHash;

/// A signal pushed by the store when something changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// The zome that emitted the signal, e.g. `"posts"`.
    pub zome_name: String,
    pub payload: SignalPayload,
}

impl Signal {
    pub fn new(zome_name: impl Into<String>, payload: SignalPayload) -> Self {
        Self {
            zome_name: zome_name.into(),
            payload,
        }
    }
}

/// Signal body, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SignalPayload {
    EntryCreated {
        action_hash: ActionHash,
        app_entry: AppEntry,
    },
    EntryUpdated {
        action_hash: ActionHash,
        app_entry: AppEntry,
        original_app_entry: AppEntry,
    },
    EntryDeleted {
        action_hash: ActionHash,
        original_app_entry: AppEntry,
    },
    LinkCreated {
        link_type: String,
    },
    LinkDeleted {
        link_type: String,
    },
}

impl SignalPayload {
    /// Name of the variant as it appears on the wire.
    pub fn variant(&self) -> &'static str {
        match self {
            SignalPayload::EntryCreated { .. } => "EntryCreated",
            SignalPayload::EntryUpdated { .. } => "EntryUpdated",
            SignalPayload::EntryDeleted { .. } => "EntryDeleted",
            SignalPayload::LinkCreated { .. } => "LinkCreated",
            SignalPayload::LinkDeleted { .. } => "LinkDeleted",
        }
    }

    /// Entry carried by the signal, if it is an entry signal.
    pub fn app_entry(&self) -> Option<&AppEntry> {
        match self {
            SignalPayload::EntryCreated { app_entry, .. }
            | SignalPayload::EntryUpdated { app_entry, .. } => Some(app_entry),
            SignalPayload::EntryDeleted {
                original_app_entry, ..
            } => Some(original_app_entry),
            SignalPayload::LinkCreated { .. } | SignalPayload::LinkDeleted { .. } => None,
        }
    }
}

/// App entries defined by the posts zome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AppEntry {
    Post { title: String, content: String },
    Comment { comment: String, post_hash: ActionHash },
}

impl AppEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            AppEntry::Post { .. } => "Post",
            AppEntry::Comment { .. } => "Comment",
        }
    }
}
