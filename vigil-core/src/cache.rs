//! In-process session cache
//!
//! Holds the latest session per user. It is never authoritative: a miss falls through to
//! storage and [`SessionCache::rebuild`] repopulates it from the durable registry.

use dashmap::DashMap;

use crate::{session::DeviceSession, user::UserId};

#[derive(Debug, Default)]
pub struct SessionCache {
    latest: DashMap<UserId, DeviceSession>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &UserId) -> Option<DeviceSession> {
        self.latest.get(user_id).map(|entry| entry.value().clone())
    }

    /// Keep `session` if it is at least as recent as what is cached for its user.
    pub fn put(&self, session: DeviceSession) {
        self.latest
            .entry(session.user_id.clone())
            .and_modify(|cached| {
                if session.updated_at >= cached.updated_at {
                    *cached = session.clone();
                }
            })
            .or_insert(session);
    }

    /// Forget the cached session for `user_id` if it belongs to `fingerprint`.
    pub fn evict(&self, user_id: &UserId, fingerprint: &str) {
        self.latest
            .remove_if(user_id, |_, s| s.fingerprint.as_str() == fingerprint);
    }

    /// Replace the whole cache with the newest session per user from `sessions`.
    pub fn rebuild(&self, sessions: impl IntoIterator<Item = DeviceSession>) -> usize {
        self.latest.clear();
        for session in sessions {
            self.put(session);
        }
        self.latest.len()
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::{credential::Credential, session::Fingerprint};

    fn session(user: &str, fp: &str, token: &str, age_minutes: i64) -> DeviceSession {
        let at = Utc::now() - Duration::minutes(age_minutes);
        DeviceSession::builder()
            .user_id(UserId::new(user))
            .fingerprint(Fingerprint::new(fp))
            .credential(Credential::new(token))
            .created_at(at)
            .updated_at(at)
            .build()
            .unwrap()
    }

    #[test]
    fn test_put_keeps_newest() {
        let cache = SessionCache::new();
        cache.put(session("usr_a", "fp1", "new", 1));
        cache.put(session("usr_a", "fp2", "old", 10));

        let cached = cache.get(&UserId::new("usr_a")).unwrap();
        assert_eq!(cached.credential.as_str(), "new");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evict_only_matching_fingerprint() {
        let cache = SessionCache::new();
        cache.put(session("usr_a", "fp1", "t", 0));

        cache.evict(&UserId::new("usr_a"), "fp2");
        assert!(cache.get(&UserId::new("usr_a")).is_some());

        cache.evict(&UserId::new("usr_a"), "fp1");
        assert!(cache.get(&UserId::new("usr_a")).is_none());
    }

    #[test]
    fn test_rebuild() {
        let cache = SessionCache::new();
        cache.put(session("usr_stale", "fp", "t", 0));

        let count = cache.rebuild(vec![
            session("usr_a", "fp1", "old", 5),
            session("usr_a", "fp2", "new", 1),
            session("usr_b", "fp3", "b", 2),
        ]);

        assert_eq!(count, 2);
        assert!(cache.get(&UserId::new("usr_stale")).is_none());
        assert_eq!(
            cache
                .get(&UserId::new("usr_a"))
                .unwrap()
                .credential
                .as_str(),
            "new"
        );
    }
}
