//! In-memory entity storage backing the development REST API.

use hms_core::entities::{Entity, EntityId, Persisted};
use hms_core::resource::{Direction, Pageable, SortOrder};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
struct Rows<E> {
    next_id: EntityId,
    rows: BTreeMap<EntityId, E>,
}

/// All rows of one entity type. Identifiers are assigned from 1 upwards and never reused.
#[derive(Debug)]
pub struct EntityStore<E> {
    inner: RwLock<Rows<E>>,
}

impl<E> Default for EntityStore<E> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Rows {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl<E: Entity> EntityStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Rows<E>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Rows<E>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store new fields under the next free id.
    pub fn insert(&self, fields: E) -> Persisted<E> {
        let mut inner = self.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.rows.insert(id, fields.clone());
        Persisted::new(id, fields)
    }

    pub fn get(&self, id: EntityId) -> Option<Persisted<E>> {
        self.read()
            .rows
            .get(&id)
            .map(|fields| Persisted::new(id, fields.clone()))
    }

    /// Overwrite an existing row. Returns `None` if `entity.id` is unknown.
    pub fn replace(&self, entity: Persisted<E>) -> Option<Persisted<E>> {
        let mut inner = self.write();
        let slot = inner.rows.get_mut(&entity.id)?;
        *slot = entity.fields.clone();
        Some(entity)
    }

    pub fn remove(&self, id: EntityId) -> bool {
        self.write().rows.remove(&id).is_some()
    }

    /// Rows ordered by id, or the requested page of them, plus the total row count.
    pub fn list(&self, pageable: Option<&Pageable>) -> (Vec<Persisted<E>>, u64) {
        let mut rows: Vec<Persisted<E>> = self
            .read()
            .rows
            .iter()
            .map(|(id, fields)| Persisted::new(*id, fields.clone()))
            .collect();
        let total = rows.len() as u64;

        let Some(pageable) = pageable else {
            return (rows, total);
        };

        if !pageable.sort.is_empty() {
            rows = sort_rows(rows, &pageable.sort);
        }
        let start = (pageable.page as usize).saturating_mul(pageable.size as usize);
        let page = rows
            .into_iter()
            .skip(start)
            .take(pageable.size as usize)
            .collect();
        (page, total)
    }
}

/// Sort by JSON property (dotted paths reach into nested references). Nulls sort first.
fn sort_rows<E: Entity>(rows: Vec<Persisted<E>>, sort: &[SortOrder]) -> Vec<Persisted<E>> {
    let pointers: Vec<String> = sort
        .iter()
        .map(|order| format!("/{}", order.property.replace('.', "/")))
        .collect();

    let mut keyed: Vec<(Persisted<E>, Value)> = rows
        .into_iter()
        .map(|row| {
            let value = serde_json::to_value(&row).unwrap_or(Value::Null);
            (row, value)
        })
        .collect();

    keyed.sort_by(|(_, a), (_, b)| {
        sort.iter()
            .zip(&pointers)
            .map(|(order, pointer)| {
                let ordering = compare_values(a.pointer(pointer), b.pointer(pointer));
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    keyed.into_iter().map(|(row, _)| row).collect()
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hms_core::entities::{District, Patient, State};

    fn state(name: &str) -> State {
        State {
            state: Some(name.into()),
        }
    }

    #[test]
    fn test_ids_are_never_reused() {
        let store = EntityStore::<State>::new();
        let first = store.insert(state("Ohio"));
        assert!(store.remove(first.id));
        let second = store.insert(state("Utah"));
        assert_eq!((first.id, second.id), (1, 2));
        assert!(!store.remove(first.id));
    }

    #[test]
    fn test_replace_requires_existing_row() {
        let store = EntityStore::<State>::new();
        let saved = store.insert(state("Ohio"));
        assert!(store.replace(Persisted::new(saved.id, state("Iowa"))).is_some());
        assert_eq!(store.get(saved.id).unwrap().fields, state("Iowa"));
        assert!(store.replace(Persisted::new(99, state("Iowa"))).is_none());
    }

    #[test]
    fn test_list_sorts_and_pages() {
        let store = EntityStore::<State>::new();
        for name in ["Ohio", "Alaska", "Texas"] {
            store.insert(state(name));
        }
        let pageable = Pageable {
            page: 0,
            size: 2,
            sort: vec![SortOrder::desc("state")],
        };

        let (rows, total) = store.list(Some(&pageable));
        assert_eq!(total, 3);
        let names: Vec<_> = rows.iter().filter_map(|r| r.fields.state.clone()).collect();
        assert_eq!(names, vec!["Texas", "Ohio"]);

        let (rows, _) = store.list(Some(&Pageable { page: 1, ..pageable }));
        assert_eq!(rows[0].fields, state("Alaska"));
    }

    #[test]
    fn test_sort_by_nested_property_puts_nulls_first() {
        let store = EntityStore::<Patient>::new();
        let with_district = |name: &str| Patient {
            district: Some(Persisted::new(
                1,
                District {
                    district: Some(name.into()),
                },
            )),
            ..Patient::default()
        };
        store.insert(with_district("Zeta"));
        store.insert(Patient::default());
        store.insert(with_district("Alpha"));

        let (rows, _) = store.list(Some(&Pageable {
            page: 0,
            size: 10,
            sort: vec![SortOrder::asc("district.district")],
        }));
        let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
