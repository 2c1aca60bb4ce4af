use crate::entities::{Entity, Persisted};
use crate::resource::{Links, Page, Pageable, ResourceClient, SortOrder};
use crate::AdminResult;

/// A page of a collection and the paging that produced it.
///
/// Every refresh goes through [`ResourceClient::query`]. A failed query leaves both the
/// rows and the paging as they were.
#[derive(Debug)]
pub struct ListController<E: Entity> {
    client: ResourceClient<E>,
    pageable: Pageable,
    page: Page<E>,
}

impl<E: Entity> ListController<E> {
    pub async fn load(client: ResourceClient<E>, pageable: Pageable) -> AdminResult<Self> {
        let page = client.query(Some(&pageable)).await?;
        Ok(Self {
            client,
            pageable,
            page,
        })
    }

    pub fn items(&self) -> &[Persisted<E>] {
        &self.page.items
    }

    pub fn pageable(&self) -> &Pageable {
        &self.pageable
    }

    pub fn total_count(&self) -> Option<u64> {
        self.page.total_count
    }

    pub fn links(&self) -> &Links {
        &self.page.links
    }

    pub async fn reload(&mut self) -> AdminResult<()> {
        self.fetch(self.pageable.clone()).await
    }

    pub async fn load_page(&mut self, page: u32) -> AdminResult<()> {
        let pageable = Pageable {
            page,
            ..self.pageable.clone()
        };
        self.fetch(pageable).await
    }

    /// Sort by `order` and go back to the first page.
    pub async fn sort_by(&mut self, order: SortOrder) -> AdminResult<()> {
        let pageable = Pageable {
            page: 0,
            size: self.pageable.size,
            sort: vec![order],
        };
        self.fetch(pageable).await
    }

    /// Load the page the server linked as `next`. Returns `false` on the last page.
    pub async fn next_page(&mut self) -> AdminResult<bool> {
        match self.page.links.get("next").copied() {
            Some(next) => {
                self.load_page(next).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn fetch(&mut self, pageable: Pageable) -> AdminResult<()> {
        match self.client.query(Some(&pageable)).await {
            Ok(page) => {
                self.page = page;
                self.pageable = pageable;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("failed to load {} list: {}", E::NAME, e);
                Err(e)
            }
        }
    }
}
