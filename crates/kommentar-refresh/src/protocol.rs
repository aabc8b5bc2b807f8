use serde::{Deserialize, Serialize};

use kommentar_core::ActionHash;

pub const DEFAULT_ROLE_NAME: &str = "forum";
pub const POSTS_ZOME: &str = "posts";
pub const GET_COMMENTS_FOR_POST: &str = "get_comments_for_post";

/// A zome function call as sent to the conductor gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZomeCallRequest<P> {
    pub cap_secret: Option<String>,
    pub role_name: String,
    pub zome_name: String,
    pub fn_name: String,
    pub payload: P,
}

impl ZomeCallRequest<ActionHash> {
    /// Call `posts/get_comments_for_post` in the given role.
    pub fn get_comments_for_post(role_name: impl Into<String>, post_hash: ActionHash) -> Self {
        Self {
            cap_secret: None,
            role_name: role_name.into(),
            zome_name: POSTS_ZOME.to_string(),
            fn_name: GET_COMMENTS_FOR_POST.to_string(),
            payload: post_hash,
        }
    }
}

impl<P> ZomeCallRequest<P> {
    pub fn with_cap_secret(mut self, secret: impl Into<String>) -> Self {
        self.cap_secret = Some(secret.into());
        self
    }
}
