//! Cross-view notification channel.
//!
//! One channel lives for the whole application. Saving an entity publishes it under the
//! entity's update event (`{app}:{entity}Update`); every view subscribed at that moment
//! receives it synchronously. There is no history: a subscriber registered after a
//! publish never sees it.
//!
//! [`NotificationChannel::subscribe`] returns a [`Subscription`] guard. Dropping the guard
//! unsubscribes, so a view's subscription ends with the view.

use crate::config::CoreConfig;
use crate::entities::{Entity, Persisted};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Handler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<String, Vec<(u64, Handler)>>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Typed publish/subscribe bus keyed by entity update event.
#[derive(Clone)]
pub struct NotificationChannel {
    app_name: Arc<str>,
    registry: Arc<Mutex<Registry>>,
}

impl NotificationChannel {
    pub fn new(cfg: &CoreConfig) -> Self {
        Self {
            app_name: Arc::from(cfg.app_name()),
            registry: Arc::default(),
        }
    }

    /// Name of the update event for `E`, e.g. `hospitalManagementApp:patientUpdate`.
    pub fn event_name<E: Entity>(&self) -> String {
        format!("{}:{}Update", self.app_name, E::NAME)
    }

    /// Register `handler` for updates of `E`.
    pub fn subscribe<E, F>(&self, handler: F) -> Subscription
    where
        E: Entity,
        F: Fn(&Persisted<E>) + Send + Sync + 'static,
    {
        let event = self.event_name::<E>();
        let handler: Handler = Arc::new(move |payload: &dyn Any| {
            if let Some(entity) = payload.downcast_ref::<Persisted<E>>() {
                handler(entity);
            }
        });

        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .handlers
            .entry(event.clone())
            .or_default()
            .push((id, handler));
        tracing::debug!("subscribed #{} to {}", id, event);

        Subscription {
            registry: Arc::downgrade(&self.registry),
            event,
            id,
        }
    }

    /// Deliver `entity` to the current subscribers of its update event.
    ///
    /// Returns the number of handlers invoked. Handlers run after the registry lock is
    /// released, so they may subscribe, unsubscribe or publish themselves.
    pub fn publish<E: Entity>(&self, entity: &Persisted<E>) -> usize {
        let event = self.event_name::<E>();
        let handlers: Vec<Handler> = lock(&self.registry)
            .handlers
            .get(&event)
            .map(|hs| hs.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        tracing::debug!("{} {} -> {} subscriber(s)", event, entity.id, handlers.len());
        for handler in &handlers {
            handler(entity as &dyn Any);
        }
        handlers.len()
    }

    pub fn subscriber_count<E: Entity>(&self) -> usize {
        lock(&self.registry)
            .handlers
            .get(&self.event_name::<E>())
            .map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationChannel")
            .field("app_name", &self.app_name)
            .finish_non_exhaustive()
    }
}

/// Live subscription; unsubscribes when dropped.
#[derive(Debug)]
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    event: String,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        if let Some(handlers) = registry.handlers.get_mut(&self.event) {
            handlers.retain(|(id, _)| *id != self.id);
            if handlers.is_empty() {
                registry.handlers.remove(&self.event);
            }
        }
        tracing::debug!("unsubscribed #{} from {}", self.id, self.event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{District, State};
    use crate::testing::test_config;

    fn texas(id: i64) -> Persisted<State> {
        Persisted::new(
            id,
            State {
                state: Some("Texas".into()),
            },
        )
    }

    #[test]
    fn test_publish_reaches_current_subscribers() {
        let channel = NotificationChannel::new(&test_config());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let _a = channel.subscribe::<State, _>(move |s| sink.lock().unwrap().push(s.clone()));
        let sink = seen.clone();
        let _b = channel.subscribe::<State, _>(move |s| sink.lock().unwrap().push(s.clone()));

        assert_eq!(channel.publish(&texas(42)), 2);
        assert_eq!(*seen.lock().unwrap(), vec![texas(42), texas(42)]);
    }

    #[test]
    fn test_event_name_follows_app_and_entity() {
        let channel = NotificationChannel::new(&test_config());
        assert_eq!(
            channel.event_name::<State>(),
            "hospitalManagementApp:stateUpdate"
        );
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let channel = NotificationChannel::new(&test_config());
        let hits = Arc::new(Mutex::new(0));

        let counter = hits.clone();
        let subscription = channel.subscribe::<State, _>(move |_| *counter.lock().unwrap() += 1);
        assert_eq!(channel.subscriber_count::<State>(), 1);

        drop(subscription);
        assert_eq!(channel.subscriber_count::<State>(), 0);
        assert_eq!(channel.publish(&texas(1)), 0);
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[test]
    fn test_late_subscriber_sees_no_history() {
        let channel = NotificationChannel::new(&test_config());
        channel.publish(&texas(1));

        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        let _s = channel.subscribe::<State, _>(move |_| *counter.lock().unwrap() += 1);

        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[test]
    fn test_events_are_scoped_by_entity() {
        let channel = NotificationChannel::new(&test_config());
        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        let _s = channel.subscribe::<District, _>(move |_| *counter.lock().unwrap() += 1);

        assert_eq!(channel.publish(&texas(1)), 0);
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[test]
    fn test_handler_may_unsubscribe_during_publish() {
        let channel = NotificationChannel::new(&test_config());
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::default();

        let inner = slot.clone();
        let subscription = channel.subscribe::<State, _>(move |_| {
            inner.lock().unwrap().take();
        });
        *slot.lock().unwrap() = Some(subscription);

        assert_eq!(channel.publish(&texas(1)), 1);
        assert_eq!(channel.subscriber_count::<State>(), 0);
    }

    #[test]
    fn test_subscription_outliving_channel_drops_cleanly() {
        let channel = NotificationChannel::new(&test_config());
        let subscription = channel.subscribe::<State, _>(|_| {});
        drop(channel);
        drop(subscription);
    }
}
