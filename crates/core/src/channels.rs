//! Paid media channels that feed spend and performance records into the
//! pipeline.
//!
//! The channel universe is fixed: output column groups are derived from
//! [`Channel::ALL`], never from whatever channels happen to appear in a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Channel {
    Facebook,
    Google,
    TikTok,
}

impl Channel {
    /// Every channel, in output column order.
    pub const ALL: [Channel; 3] = [Channel::Facebook, Channel::Google, Channel::TikTok];

    pub const COUNT: usize = Self::ALL.len();

    /// Identifier used for the `channel` column and for column suffixes
    /// such as `spend_Facebook`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Facebook => "Facebook",
            Channel::Google => "Google",
            Channel::TikTok => "TikTok",
        }
    }

    /// Position of this channel inside per-channel arrays.
    pub fn index(&self) -> usize {
        match self {
            Channel::Facebook => 0,
            Channel::Google => 1,
            Channel::TikTok => 2,
        }
    }

    /// Suffix a metric column name with this channel, e.g. `spend_Google`.
    pub fn column(&self, metric: &str) -> String {
        format!("{}_{}", metric, self.as_str())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facebook" => Ok(Channel::Facebook),
            "google" => Ok(Channel::Google),
            "tiktok" => Ok(Channel::TikTok),
            other => Err(format!("unknown channel '{other}'")),
        }
    }
}
