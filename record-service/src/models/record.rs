use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A record as exchanged over HTTP.
///
/// The identifier travels as a 24-character hex string and is absent until
/// the store assigns one. Inbound JSON also accepts `ID`, `Title` and `Body`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct Record {
    #[serde(
        default,
        alias = "ID",
        with = "object_id_hex",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "65a1f0c2e4b0a1b2c3d4e5f6")]
    pub id: Option<ObjectId>,
    #[serde(default, alias = "Title")]
    #[schema(example = "Groceries")]
    pub title: String,
    #[serde(default, alias = "Body")]
    #[schema(example = "Milk, eggs, bread")]
    pub body: String,
}

impl Record {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Stored shape of a record in the `records` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub body: String,
}

impl RecordDocument {
    pub fn new(id: ObjectId, title: String, body: String) -> Self {
        Self { id, title, body }
    }
}

impl From<RecordDocument> for Record {
    fn from(doc: RecordDocument) -> Self {
        Self {
            id: Some(doc.id),
            title: doc.title,
            body: doc.body,
        }
    }
}

mod object_id_hex {
    use mongodb::bson::oid::ObjectId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &Option<ObjectId>, s: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => s.serialize_str(&id.to_hex()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ObjectId>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(hex) => ObjectId::parse_str(hex)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
