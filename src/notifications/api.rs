//! Public API for the notification system
//!
//! External modules import from here rather than from the internal modules.

use std::sync::{Arc, LazyLock};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;

pub use crate::notifications::error::NotificationError;
pub use crate::notifications::event::{
    Event, EventFilter, LifecycleEvent, NoticeEvent, SessionEvent, SessionEventType,
};
pub use crate::notifications::manager::AsyncNotificationManager;
pub use crate::notifications::statistics::SubscriberStatistics;

/// Shared handle to a notification manager
pub type NotificationService = Arc<Mutex<AsyncNotificationManager>>;

static NOTIFICATION_SERVICE: LazyLock<NotificationService> = LazyLock::new(|| {
    log::trace!("Initializing notification service");
    Arc::new(Mutex::new(AsyncNotificationManager::new()))
});

/// Lock the process-wide notification service
///
/// # Examples
/// ```no_run
/// # use qrcheckin::notifications::api::{get_notification_service, Event, LifecycleEvent};
/// # use qrcheckin::scan::api::LifecyclePhase;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut manager = get_notification_service().await;
/// manager
///     .publish(Event::Lifecycle(LifecycleEvent::new(LifecyclePhase::Background)))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub async fn get_notification_service() -> tokio::sync::MutexGuard<'static, AsyncNotificationManager>
{
    log::trace!("Acquiring notification service lock");
    NOTIFICATION_SERVICE.lock().await
}

/// Shared reference to the process-wide service, for injection into sessions
pub fn notification_service() -> NotificationService {
    NOTIFICATION_SERVICE.clone()
}

/// A fresh, unshared service (tests and embedded hosts)
pub fn isolated_notification_service() -> NotificationService {
    Arc::new(Mutex::new(AsyncNotificationManager::new()))
}

/// Publish one event, logging instead of failing when subscribers have gone away
pub async fn publish_event(service: &NotificationService, event: Event) {
    if let Err(e) = service.lock().await.publish(event).await {
        log::debug!("{}", e);
    }
}

/// Scoped subscription to a notification service
///
/// Call [`dispose`](Self::dispose) to unregister. A subscription dropped
/// without it unregisters if the service is not locked at that moment;
/// otherwise its closed channel is pruned on the next publish.
pub struct Subscription {
    id: String,
    receiver: UnboundedReceiver<Event>,
    service: NotificationService,
    disposed: bool,
}

impl Subscription {
    pub async fn open(
        service: &NotificationService,
        id: impl Into<String>,
        filter: EventFilter,
        source: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let receiver = service
            .lock()
            .await
            .subscribe(id.clone(), filter, source.into());
        Self {
            id,
            receiver,
            service: service.clone(),
            disposed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Next event, or `None` once the service dropped this subscriber
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    pub async fn dispose(mut self) {
        self.disposed = true;
        self.receiver.close();
        self.service.lock().await.unsubscribe(&self.id);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.disposed {
            return;
        }
        match self.service.try_lock() {
            Ok(mut manager) => {
                manager.unsubscribe(&self.id);
            }
            Err(_) => log::trace!(
                "Subscription '{}' dropped while service busy; pruned on next publish",
                self.id
            ),
        }
    }
}
