use crate::entities::{Entity, Persisted};
use crate::events::{NotificationChannel, Subscription};
use crate::router::PreviousState;
use std::sync::{Arc, PoisonError, RwLock};

/// Read-only view of one entity.
///
/// Listens on the entity's update event for as long as it lives and swaps in any update
/// carrying the same id, so an edit saved from a dialog shows up without a refetch.
#[derive(Debug)]
pub struct DetailController<E: Entity> {
    entity: Arc<RwLock<Persisted<E>>>,
    previous_state: PreviousState,
    _subscription: Subscription,
}

impl<E: Entity> DetailController<E> {
    pub fn new(
        entity: Persisted<E>,
        previous_state: PreviousState,
        channel: &NotificationChannel,
    ) -> Self {
        let entity = Arc::new(RwLock::new(entity));
        let shown = Arc::clone(&entity);
        let subscription = channel.subscribe::<E, _>(move |updated| {
            let mut current = shown.write().unwrap_or_else(PoisonError::into_inner);
            if current.id == updated.id {
                *current = updated.clone();
            }
        });

        Self {
            entity,
            previous_state,
            _subscription: subscription,
        }
    }

    pub fn entity(&self) -> Persisted<E> {
        self.entity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn previous_state(&self) -> &PreviousState {
        &self.previous_state
    }

    /// Tear the view down, ending its subscription.
    pub fn destroy(self) {
        tracing::debug!("closing {} detail", E::NAME);
    }
}
