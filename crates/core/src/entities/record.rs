use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Server-assigned identifier.
pub type EntityId = i64;

/// An entity the server has stored under `id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Persisted<E> {
    pub id: EntityId,
    pub fields: E,
}

impl<E> Persisted<E> {
    pub fn new(id: EntityId, fields: E) -> Self {
        Self { id, fields }
    }
}

/// Either an unsaved draft or a persisted entity.
///
/// Both variants travel as the same flat JSON object; a draft carries `"id": null`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record<E> {
    Draft(E),
    Persisted(Persisted<E>),
}

impl<E: Default> Record<E> {
    /// A draft with default fields, as opened by a "new" dialog.
    pub fn blank() -> Self {
        Record::Draft(E::default())
    }
}

impl<E> Record<E> {
    pub fn id(&self) -> Option<EntityId> {
        match self {
            Record::Draft(_) => None,
            Record::Persisted(p) => Some(p.id),
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Record::Draft(_))
    }

    pub fn fields(&self) -> &E {
        match self {
            Record::Draft(fields) => fields,
            Record::Persisted(p) => &p.fields,
        }
    }

    pub fn fields_mut(&mut self) -> &mut E {
        match self {
            Record::Draft(fields) => fields,
            Record::Persisted(p) => &mut p.fields,
        }
    }
}

impl<E> From<Persisted<E>> for Record<E> {
    fn from(value: Persisted<E>) -> Self {
        Record::Persisted(value)
    }
}

#[derive(Serialize)]
struct WireOut<'a, E> {
    id: Option<EntityId>,
    #[serde(flatten)]
    fields: &'a E,
}

#[derive(Deserialize)]
struct WireIn<E> {
    #[serde(default)]
    id: Option<EntityId>,
    #[serde(flatten)]
    fields: E,
}

impl<E: Serialize> Serialize for Persisted<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireOut {
            id: Some(self.id),
            fields: &self.fields,
        }
        .serialize(serializer)
    }
}

impl<'de, E: DeserializeOwned> Deserialize<'de> for Persisted<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireIn::<E>::deserialize(deserializer)?;
        let id = wire
            .id
            .ok_or_else(|| serde::de::Error::custom("persisted entity without id"))?;
        Ok(Persisted::new(id, wire.fields))
    }
}

impl<E: Serialize> Serialize for Record<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireOut {
            id: self.id(),
            fields: self.fields(),
        }
        .serialize(serializer)
    }
}

impl<'de, E: DeserializeOwned> Deserialize<'de> for Record<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireIn::<E>::deserialize(deserializer)?;
        Ok(match wire.id {
            Some(id) => Record::Persisted(Persisted::new(id, wire.fields)),
            None => Record::Draft(wire.fields),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Appointment, District, Patient, State};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_draft_serializes_with_null_id() {
        let draft = Record::Draft(State {
            state: Some("Texas".into()),
        });
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value, json!({"id": null, "state": "Texas"}));
    }

    #[test]
    fn test_blank_draft_has_null_fields() {
        let value = serde_json::to_value(Record::<State>::blank()).unwrap();
        assert_eq!(value, json!({"id": null, "state": null}));
    }

    #[test]
    fn test_record_variant_follows_id() {
        let draft: Record<State> = serde_json::from_value(json!({"state": "Ohio"})).unwrap();
        assert!(draft.is_draft());

        let draft: Record<State> =
            serde_json::from_value(json!({"id": null, "state": "Ohio"})).unwrap();
        assert!(draft.is_draft());

        let persisted: Record<State> =
            serde_json::from_value(json!({"id": 42, "state": "Ohio"})).unwrap();
        assert_eq!(persisted.id(), Some(42));
        assert_eq!(persisted.fields().state.as_deref(), Some("Ohio"));
    }

    #[test]
    fn test_persisted_requires_id() {
        let err = serde_json::from_value::<Persisted<State>>(json!({"state": "Ohio"}));
        assert!(err.is_err());
    }

    #[test]
    fn test_nested_references_decode() {
        let patient: Persisted<Patient> = serde_json::from_value(json!({
            "id": 5,
            "name": "Ada",
            "dateOfBirth": "1985-06-20",
            "district": {"id": 3, "district": "North"},
            "state": {"id": 4},
            "country": null
        }))
        .unwrap();

        assert_eq!(patient.id, 5);
        assert_eq!(
            patient.fields.district,
            Some(Persisted::new(3, District {
                district: Some("North".into())
            }))
        );
        assert_eq!(patient.fields.state, Some(Persisted::new(4, State::default())));
        assert_eq!(patient.fields.country, None);
        assert_eq!(
            patient.fields.date_of_birth,
            chrono::NaiveDate::from_ymd_opt(1985, 6, 20)
        );
    }

    #[test]
    fn test_date_fields_convert_on_decode() {
        let appointment: Persisted<Appointment> = serde_json::from_value(json!({
            "id": 9,
            "date": "2016-10-19T08:30:00Z",
            "patient": {"id": 5, "name": "Ada"}
        }))
        .unwrap();

        assert_eq!(
            appointment.fields.date,
            Some(Utc.with_ymd_and_hms(2016, 10, 19, 8, 30, 0).unwrap())
        );

        let value = serde_json::to_value(&appointment).unwrap();
        assert_eq!(value["date"], json!("2016-10-19T08:30:00Z"));
        assert_eq!(value["patient"]["id"], json!(5));
    }
}
