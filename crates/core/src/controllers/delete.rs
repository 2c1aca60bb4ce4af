use crate::entities::{Entity, EntityId, Persisted};
use crate::modal::ModalInstance;
use crate::resource::ResourceClient;
use crate::{AdminError, AdminResult};

/// Confirmation dialog for deleting one entity.
#[derive(Debug)]
pub struct DeleteController<E: Entity> {
    client: ResourceClient<E>,
    entity: Persisted<E>,
    modal: ModalInstance<EntityId>,
}

impl<E: Entity> DeleteController<E> {
    pub fn new(
        client: ResourceClient<E>,
        entity: Persisted<E>,
        modal: ModalInstance<EntityId>,
    ) -> Self {
        Self {
            client,
            entity,
            modal,
        }
    }

    pub fn entity(&self) -> &Persisted<E> {
        &self.entity
    }

    pub fn is_open(&self) -> bool {
        self.modal.is_open()
    }

    /// Delete the entity, then close the dialog with its id.
    ///
    /// On failure the dialog stays open.
    pub async fn confirm_delete(&mut self) -> AdminResult<()> {
        if !self.modal.is_open() {
            return Err(AdminError::DialogClosed);
        }
        let id = self.entity.id;
        if let Err(e) = self.client.delete(id).await {
            tracing::warn!("failed to delete {} {}: {}", E::NAME, id, e);
            return Err(e);
        }
        self.modal.close(id);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.modal.dismiss("cancel");
    }
}
