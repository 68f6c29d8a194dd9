//! AsyncNotificationManager implementation

use crate::notifications::error::NotificationError;
use crate::notifications::event::{Event, EventFilter};
use crate::notifications::statistics::SubscriberStatistics;
use std::collections::HashMap;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

struct SubscriberInfo {
    filter: EventFilter,
    source: String,
    sender: UnboundedSender<Event>,
    statistics: SubscriberStatistics,
}

/// Fan-out of events to filtered, unbounded subscriber channels
pub struct AsyncNotificationManager {
    subscribers: HashMap<String, SubscriberInfo>,
}

impl Default for AsyncNotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncNotificationManager {
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    /// Register a subscriber and return its receiving end
    ///
    /// Re-using an id replaces the earlier subscription; its receiver will
    /// see the channel close.
    pub fn subscribe(
        &mut self,
        subscriber_id: String,
        filter: EventFilter,
        source: String,
    ) -> UnboundedReceiver<Event> {
        let (sender, receiver) = unbounded_channel();

        let subscriber_info = SubscriberInfo {
            filter,
            source: source.clone(),
            sender,
            statistics: SubscriberStatistics::new(),
        };

        if let Some(existing) = self.subscribers.insert(subscriber_id.clone(), subscriber_info) {
            log::warn!(
                "Subscriber '{}' replaced existing subscription (source: {} -> {})",
                subscriber_id,
                existing.source,
                source
            );
        } else {
            log::trace!("Subscriber '{}' registered (source: {})", subscriber_id, source);
        }

        receiver
    }

    /// Remove a subscriber; returns whether it was registered
    pub fn unsubscribe(&mut self, subscriber_id: &str) -> bool {
        let removed = self.subscribers.remove(subscriber_id).is_some();
        if removed {
            log::trace!("Subscriber '{}' unsubscribed", subscriber_id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.subscribers.contains_key(subscriber_id)
    }

    pub fn get_subscriber_statistics(&self, subscriber_id: &str) -> Option<&SubscriberStatistics> {
        self.subscribers.get(subscriber_id).map(|info| &info.statistics)
    }

    /// Drop subscribers whose receivers are gone, returning their ids
    pub fn prune_closed(&mut self) -> Vec<String> {
        let closed: Vec<String> = self
            .subscribers
            .iter()
            .filter(|(_, info)| info.sender.is_closed())
            .map(|(id, _)| id.clone())
            .collect();

        for subscriber_id in &closed {
            self.subscribers.remove(subscriber_id);
        }
        closed
    }

    /// Deliver an event to every subscriber whose filter accepts it
    ///
    /// Subscribers with closed channels are removed and reported in
    /// [`NotificationError::PublishFailed`]; delivery to the others still
    /// happens.
    pub async fn publish(&mut self, event: Event) -> Result<(), NotificationError> {
        let mut failed_subscribers = Vec::new();

        for (subscriber_id, subscriber_info) in &self.subscribers {
            if !subscriber_info.filter.accepts(&event) {
                continue;
            }
            if subscriber_info.sender.send(event.clone()).is_err() {
                failed_subscribers.push(subscriber_id.clone());
            } else {
                subscriber_info.statistics.record_delivery();
            }
        }

        for subscriber_id in &failed_subscribers {
            self.subscribers.remove(subscriber_id);
        }

        if !failed_subscribers.is_empty() {
            return Err(NotificationError::PublishFailed {
                event_type: event.kind().to_string(),
                failed_subscribers,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::event::{LifecycleEvent, SessionEvent, SessionEventType};
    use crate::scan::state::{Generation, LifecyclePhase};

    fn lifecycle(phase: LifecyclePhase) -> Event {
        Event::Lifecycle(LifecycleEvent::new(phase))
    }

    fn session(event_type: SessionEventType) -> Event {
        Event::Session(SessionEvent::new(
            event_type,
            "scan-1".to_string(),
            Generation::FIRST,
        ))
    }

    #[tokio::test]
    async fn test_subscriber_registration_with_source() {
        let mut manager = AsyncNotificationManager::new();

        let _session = manager.subscribe(
            "session".to_string(),
            EventFilter::LifecycleOnly,
            "scan:session".to_string(),
        );
        let _console = manager.subscribe(
            "console".to_string(),
            EventFilter::NoticeAndSession,
            "app:console".to_string(),
        );

        assert_eq!(manager.subscriber_count(), 2);
        assert!(manager.has_subscriber("session"));
        assert!(manager.has_subscriber("console"));
        assert!(!manager.has_subscriber("nonexistent"));
    }

    #[tokio::test]
    async fn test_publish_respects_filters() {
        let mut manager = AsyncNotificationManager::new();
        let mut lifecycle_rx = manager.subscribe(
            "session".to_string(),
            EventFilter::LifecycleOnly,
            "test".to_string(),
        );
        let mut all_rx = manager.subscribe("logger".to_string(), EventFilter::All, "test".to_string());

        manager
            .publish(lifecycle(LifecyclePhase::Background))
            .await
            .unwrap();
        manager.publish(session(SessionEventType::Locked)).await.unwrap();

        assert!(matches!(lifecycle_rx.recv().await, Some(Event::Lifecycle(_))));
        assert!(lifecycle_rx.try_recv().is_err());

        assert!(matches!(all_rx.recv().await, Some(Event::Lifecycle(_))));
        assert!(matches!(all_rx.recv().await, Some(Event::Session(_))));

        let stats = manager.get_subscriber_statistics("logger").unwrap();
        assert_eq!(stats.events_delivered(), 2);
        let stats = manager.get_subscriber_statistics("session").unwrap();
        assert_eq!(stats.events_delivered(), 1);
    }

    #[tokio::test]
    async fn test_closed_subscriber_is_removed_on_publish() {
        let mut manager = AsyncNotificationManager::new();
        let _kept = manager.subscribe("kept".to_string(), EventFilter::All, "test".to_string());
        let dropped = manager.subscribe("dropped".to_string(), EventFilter::All, "test".to_string());
        drop(dropped);

        let result = manager.publish(lifecycle(LifecyclePhase::Foreground)).await;

        assert_eq!(
            result,
            Err(NotificationError::PublishFailed {
                event_type: "Lifecycle".to_string(),
                failed_subscribers: vec!["dropped".to_string()],
            })
        );
        assert!(!manager.has_subscriber("dropped"));
        assert!(manager.has_subscriber("kept"));
    }

    #[tokio::test]
    async fn test_filtered_out_closed_subscriber_survives_publish() {
        let mut manager = AsyncNotificationManager::new();
        let dropped = manager.subscribe(
            "notices".to_string(),
            EventFilter::NoticeOnly,
            "test".to_string(),
        );
        drop(dropped);

        assert!(manager
            .publish(lifecycle(LifecyclePhase::Foreground))
            .await
            .is_ok());
        assert_eq!(manager.prune_closed(), vec!["notices".to_string()]);
        assert_eq!(manager.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_resubscribe_replaces_channel() {
        let mut manager = AsyncNotificationManager::new();
        let mut first = manager.subscribe("dup".to_string(), EventFilter::All, "a".to_string());
        let mut second = manager.subscribe("dup".to_string(), EventFilter::All, "b".to_string());

        assert_eq!(manager.subscriber_count(), 1);
        manager.publish(session(SessionEventType::Armed)).await.unwrap();

        assert!(first.recv().await.is_none());
        assert!(second.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let mut manager = AsyncNotificationManager::new();
        let mut rx = manager.subscribe("gone".to_string(), EventFilter::All, "test".to_string());

        assert!(manager.unsubscribe("gone"));
        assert!(!manager.unsubscribe("gone"));
        assert!(rx.recv().await.is_none());
    }
}
