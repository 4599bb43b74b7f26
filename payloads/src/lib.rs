pub mod api_client;
pub mod responses;

use derive_more::Display;
use serde::{Deserialize, Serialize};

pub use api_client::{APIClient, ClientError};

/// Id type wrapper helps ensure we don't mix up ids for different resources.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PostId(pub u64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);
