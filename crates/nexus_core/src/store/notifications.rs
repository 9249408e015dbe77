//! Toast notification queue with time-based expiry.
//!
//! # Invariants
//! - Dismissing an unknown or already expired id is a no-op.
//! - Expiry is driven by the caller's clock; nothing runs in the background.

use crate::model::new_entity_id;
use crate::model::notification::{Notification, NotificationKind};
use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct NotificationCenter {
    items: Vec<Notification>,
    ttl: chrono::Duration,
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    pub fn as_slice(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn push(
        &mut self,
        kind: NotificationKind,
        title: String,
        message: String,
        now: DateTime<Utc>,
    ) -> &Notification {
        let index = self.items.len();
        self.items.push(Notification {
            id: new_entity_id(),
            kind,
            title,
            message,
            created_at: now,
        });
        &self.items[index]
    }

    /// Removes one notification; returns whether it was present.
    pub(crate) fn dismiss(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        before != self.items.len()
    }

    /// Drops notifications whose age reached the TTL; returns how many.
    pub(crate) fn expire(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.items.len();
        let ttl = self.ttl;
        self.items.retain(|item| now - item.created_at < ttl);
        before - self.items.len()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

impl crate::store::CrmStore {
    /// Dismisses a toast early. Unknown ids are ignored.
    pub fn dismiss_notification(&mut self, id: &str) -> bool {
        self.notifications.dismiss(id)
    }

    /// Drops toasts older than the configured TTL.
    pub fn expire_notifications(&mut self) -> usize {
        let now = self.now();
        self.notifications.expire(now)
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::NotificationCenter;
    use crate::model::notification::NotificationKind;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use std::time::Duration;

    #[test]
    fn expire_keeps_fresh_items_and_drops_stale_ones() {
        let start = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let mut center = NotificationCenter::new(Duration::from_secs(5));
        center.push(NotificationKind::Info, "old".into(), String::new(), start);
        center.push(
            NotificationKind::Info,
            "new".into(),
            String::new(),
            start + ChronoDuration::seconds(3),
        );

        let dropped = center.expire(start + ChronoDuration::seconds(5));
        assert_eq!(dropped, 1);
        assert_eq!(center.as_slice()[0].title, "new");
    }

    #[test]
    fn dismiss_twice_is_harmless() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let mut center = NotificationCenter::new(Duration::from_secs(5));
        let id = center
            .push(NotificationKind::Success, "ok".into(), String::new(), now)
            .id
            .clone();

        assert!(center.dismiss(&id));
        assert!(!center.dismiss(&id));
        assert_eq!(center.expire(now + ChronoDuration::seconds(10)), 0);
    }
}
