use crate::entities::{Entity, Persisted, Record};
use crate::events::NotificationChannel;
use crate::modal::ModalInstance;
use crate::resource::ResourceClient;
use crate::{AdminError, AdminResult};

/// Create/edit form shown as a modal.
///
/// The record is a [`Record::Draft`] for "new" dialogs and a [`Record::Persisted`] for
/// edits; [`save`](Self::save) creates or updates accordingly. A successful save
/// broadcasts the stored entity and closes the modal with it. A failed save leaves the
/// form open with the user's input intact.
#[derive(Debug)]
pub struct DialogController<E: Entity> {
    client: ResourceClient<E>,
    channel: NotificationChannel,
    record: Record<E>,
    lookups: E::Lookups,
    modal: ModalInstance<Persisted<E>>,
    is_saving: bool,
}

impl<E: Entity> DialogController<E> {
    pub fn new(
        client: ResourceClient<E>,
        channel: NotificationChannel,
        record: Record<E>,
        lookups: E::Lookups,
        modal: ModalInstance<Persisted<E>>,
    ) -> Self {
        Self {
            client,
            channel,
            record,
            lookups,
            modal,
            is_saving: false,
        }
    }

    pub fn record(&self) -> &Record<E> {
        &self.record
    }

    /// Form fields, for editing.
    pub fn draft_mut(&mut self) -> &mut E {
        self.record.fields_mut()
    }

    pub fn lookups(&self) -> &E::Lookups {
        &self.lookups
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    pub fn is_open(&self) -> bool {
        self.modal.is_open()
    }

    pub async fn save(&mut self) -> AdminResult<Persisted<E>> {
        if !self.modal.is_open() {
            return Err(AdminError::DialogClosed);
        }

        self.is_saving = true;
        let result = self.client.save(&self.record).await;
        match result {
            Ok(saved) => {
                self.channel.publish(&saved);
                self.modal.close(saved.clone());
                self.is_saving = false;
                Ok(saved)
            }
            Err(e) => {
                self.is_saving = false;
                tracing::warn!("failed to save {}: {}", E::NAME, e);
                Err(e)
            }
        }
    }

    /// Dismiss the dialog without saving.
    pub fn clear(&mut self) {
        self.modal.dismiss("cancel");
    }
}
