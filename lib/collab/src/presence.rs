//! Presence set.
//!
//! `user:joined` and `user:left` may arrive out of order. Each user keeps
//! the timestamp of the newest presence message applied for them, and any
//! message not newer than that is ignored, so applying the same messages in
//! any order yields the same set.

use crate::message::{USER_JOINED, USER_LEFT, WireMessage};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Seen {
    at: DateTime<Utc>,
    online: bool,
}

/// Users currently online in a collaboration room.
#[derive(Debug, Clone, Default)]
pub struct Presence {
    users: BTreeMap<String, Seen>,
}

impl Presence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a presence message. Returns true if the set changed.
    ///
    /// Messages with other event names, without a `userId`, or older than
    /// what was already seen for the user are ignored.
    pub fn apply(&mut self, message: &WireMessage) -> bool {
        let online = match message.event.as_str() {
            USER_JOINED => true,
            USER_LEFT => false,
            _ => return false,
        };
        let Some(user_id) = message.user_id() else {
            return false;
        };

        if let Some(seen) = self.users.get(user_id) {
            if seen.at >= message.timestamp {
                debug!(user_id, event = %message.event, "stale presence message ignored");
                return false;
            }
        }

        let was_online = self.is_online(user_id);
        self.users.insert(
            user_id.to_string(),
            Seen {
                at: message.timestamp,
                online,
            },
        );
        was_online != online
    }

    #[must_use]
    pub fn is_online(&self, user_id: &str) -> bool {
        self.users.get(user_id).is_some_and(|seen| seen.online)
    }

    /// Online user ids, sorted.
    #[must_use]
    pub fn online_users(&self) -> Vec<String> {
        self.users
            .iter()
            .filter(|(_, seen)| seen.online)
            .map(|(user_id, _)| user_id.clone())
            .collect()
    }
}
