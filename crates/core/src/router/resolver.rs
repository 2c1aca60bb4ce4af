use super::navigator::Transition;
use super::states::{Resolve, StateKind};
use crate::controllers::{DeleteController, DetailController, DialogController, ListController};
use crate::entities::{Entity, EntityId, Lookups, Persisted, Record};
use crate::events::NotificationChannel;
use crate::modal::{self, PendingModal};
use crate::resource::{Api, Pageable};
use crate::{AdminError, AdminResult};

/// A state after its data has been resolved.
///
/// Views are rendered as-is. Modal states come with the [`PendingModal`] the navigator
/// awaits before following the state's exit table.
#[derive(Debug)]
pub enum Activation<E: Entity> {
    List(ListController<E>),
    Detail(DetailController<E>),
    Dialog {
        controller: DialogController<E>,
        pending: PendingModal<Persisted<E>>,
    },
    Delete {
        controller: DeleteController<E>,
        pending: PendingModal<EntityId>,
    },
}

/// Fetches what a state needs and builds its controller.
#[derive(Clone, Debug)]
pub struct StateResolver<E: Entity> {
    api: Api,
    channel: NotificationChannel,
    _entity: std::marker::PhantomData<fn() -> E>,
}

impl<E: Entity> StateResolver<E> {
    pub fn new(api: Api, channel: NotificationChannel) -> Self {
        Self {
            api,
            channel,
            _entity: std::marker::PhantomData,
        }
    }

    /// Resolve `transition` and build its controller.
    ///
    /// Every fetch completes before this returns. A "new" dialog performs no read of its
    /// own; an id-based state performs exactly one.
    pub async fn activate(&self, transition: &Transition) -> AdminResult<Activation<E>> {
        let state = &transition.state;
        if state.entity != Some(E::NAME) {
            return Err(AdminError::EntityMismatch {
                state: state.name.clone(),
                expected: E::NAME,
                found: state.entity.unwrap_or("none").to_string(),
            });
        }

        match state.kind {
            StateKind::Abstract => Err(AdminError::AbstractState(state.name.clone())),
            StateKind::List => {
                let pageable = Pageable::first(self.api.config().page_size());
                let list = ListController::load(self.api.resource(), pageable).await?;
                Ok(Activation::List(list))
            }
            StateKind::Detail => {
                let entity = self.fetch(transition).await?;
                Ok(Activation::Detail(DetailController::new(
                    entity,
                    transition.previous.clone(),
                    &self.channel,
                )))
            }
            StateKind::Dialog => {
                let record = match state.resolve {
                    Resolve::Blank => Record::blank(),
                    _ => self.fetch(transition).await?.into(),
                };
                let lookups = <E::Lookups as Lookups>::load(&self.api).await?;
                let (instance, pending) = modal::open();
                let controller = DialogController::new(
                    self.api.resource(),
                    self.channel.clone(),
                    record,
                    lookups,
                    instance,
                );
                Ok(Activation::Dialog {
                    controller,
                    pending,
                })
            }
            StateKind::Delete => {
                let entity = self.fetch(transition).await?;
                let (instance, pending) = modal::open();
                let controller = DeleteController::new(self.api.resource(), entity, instance);
                Ok(Activation::Delete {
                    controller,
                    pending,
                })
            }
        }
    }

    async fn fetch(&self, transition: &Transition) -> AdminResult<Persisted<E>> {
        let id = transition.id_param()?;
        self.api
            .resource::<E>()
            .get(id)
            .await?
            .ok_or(AdminError::NotFound {
                entity: E::NAME,
                id,
            })
    }
}
