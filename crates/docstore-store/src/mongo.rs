//! MongoDB-backed table.
//!
//! Documents live in one collection as `{ _id: <ObjectId>, body: <fields> }`.
//! The body is written and read as raw BSON, field by field, so client
//! fields named `_id` or shaped like extended JSON (`{"$numberLong": "5"}`)
//! are stored as plain data and come back unchanged. The derived `id` field
//! is not persisted; it is rebuilt from `_id` on the way out.
//!
//! Integers are stored as 64-bit ints and other numbers as doubles, so an
//! unsigned value above `i64::MAX` comes back as a float.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use docstore_types::{Document, DocumentKey, TypeError};
use mongodb::bson::{
    doc, oid::ObjectId, Bson, RawArrayBuf, RawBson, RawBsonRef, RawDocument, RawDocumentBuf,
};
use mongodb::{Client, Collection};
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::traits::StoreBackend;

const MONGO_ID_FIELD: &str = "_id";
const BODY_FIELD: &str = "body";

/// MongoDB ObjectId key: 12 bytes, written as 24 hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectKey(ObjectId);

impl ObjectKey {
    /// A fresh ObjectId, unique per driver process.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0.bytes()
    }
}

impl DocumentKey for ObjectKey {}

impl FromStr for ObjectKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(TypeError::EmptyKey);
        }
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| TypeError::InvalidKey(s.to_string()))
    }
}

impl From<ObjectId> for ObjectKey {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectKey({})", self.0.to_hex())
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Convert a document into its stored form under `key`.
fn to_stored(key: &ObjectKey, document: &Document) -> StoreResult<RawDocumentBuf> {
    let fields = document
        .as_map()
        .iter()
        .filter(|(field, _)| field.as_str() != Document::ID_FIELD);
    let mut stored = RawDocumentBuf::new();
    stored.append(MONGO_ID_FIELD, RawBson::ObjectId(key.0));
    stored.append(BODY_FIELD, RawBson::Document(object_to_raw(fields)?));
    Ok(stored)
}

/// Convert a stored document back into JSON. `_id` is not part of the result.
fn from_stored(stored: &RawDocument) -> StoreResult<Document> {
    let body = stored.get_document(BODY_FIELD).map_err(serialization)?;
    Ok(Document::from(raw_to_object(body)?))
}

fn serialization(err: impl fmt::Display) -> StoreError {
    StoreError::Serialization(err.to_string())
}

fn object_to_raw<'a>(
    fields: impl Iterator<Item = (&'a String, &'a Value)>,
) -> StoreResult<RawDocumentBuf> {
    let mut raw = RawDocumentBuf::new();
    for (field, value) in fields {
        // BSON field names are NUL-terminated.
        if field.contains('\0') {
            return Err(StoreError::Serialization(format!(
                "field name {field:?} contains a NUL byte"
            )));
        }
        raw.append(field, json_to_raw(value)?);
    }
    Ok(raw)
}

fn json_to_raw(value: &Value) -> StoreResult<RawBson> {
    Ok(match value {
        Value::Null => RawBson::Null,
        Value::Bool(b) => RawBson::Boolean(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => RawBson::Int64(i),
            (None, Some(f)) => RawBson::Double(f),
            (None, None) => return Err(serialization(format!("unsupported number {n}"))),
        },
        Value::String(s) => RawBson::String(s.clone()),
        Value::Array(items) => {
            let mut array = RawArrayBuf::new();
            for item in items {
                array.push(json_to_raw(item)?);
            }
            RawBson::Array(array)
        }
        Value::Object(map) => RawBson::Document(object_to_raw(map.iter())?),
    })
}

fn raw_to_object(raw: &RawDocument) -> StoreResult<Map<String, Value>> {
    let mut map = Map::new();
    for entry in raw {
        let (field, value) = entry.map_err(serialization)?;
        map.insert(field.to_string(), raw_to_json(value)?);
    }
    Ok(map)
}

fn raw_to_json(value: RawBsonRef<'_>) -> StoreResult<Value> {
    Ok(match value {
        RawBsonRef::Null => Value::Null,
        RawBsonRef::Boolean(b) => Value::Bool(b),
        RawBsonRef::Int32(i) => Value::from(i),
        RawBsonRef::Int64(i) => Value::from(i),
        RawBsonRef::Double(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        RawBsonRef::String(s) => Value::String(s.to_string()),
        RawBsonRef::Array(array) => {
            let mut items = Vec::new();
            for item in array {
                items.push(raw_to_json(item.map_err(serialization)?)?);
            }
            Value::Array(items)
        }
        RawBsonRef::Document(raw) => Value::Object(raw_to_object(raw)?),
        // Types this store never writes, e.g. from documents edited by hand.
        other => Bson::try_from(other)
            .map_err(serialization)?
            .into_relaxed_extjson(),
    })
}

/// One MongoDB collection used as the document table.
pub struct MongoBackend {
    collection: Collection<RawDocumentBuf>,
}

impl MongoBackend {
    /// Connect and verify the server answers a `ping`.
    ///
    /// `host` is either a bare `host:port` or a full `mongodb://` URI.
    pub async fn connect(host: &str, database: &str, collection: &str) -> StoreResult<Self> {
        let uri = if host.starts_with("mongodb://") || host.starts_with("mongodb+srv://") {
            host.to_string()
        } else {
            format!("mongodb://{host}")
        };
        let client = Client::with_uri_str(&uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        info!(%host, database, collection, "connected to MongoDB");
        Ok(Self {
            collection: db.collection(collection),
        })
    }
}

#[async_trait]
impl StoreBackend for MongoBackend {
    type Key = ObjectKey;

    fn name(&self) -> &'static str {
        "mongo"
    }

    fn generate_key(&mut self) -> ObjectKey {
        ObjectKey::generate()
    }

    async fn insert(&mut self, key: &ObjectKey, document: &Document) -> StoreResult<()> {
        let stored = to_stored(key, document)?;
        self.collection.insert_one(stored).await?;
        debug!(%key, collection = self.collection.name(), "inserted document");
        Ok(())
    }

    async fn replace(&mut self, key: &ObjectKey, document: &Document) -> StoreResult<()> {
        let stored = to_stored(key, document)?;
        let result = self
            .collection
            .replace_one(doc! { "_id": key.0 }, stored)
            .upsert(true)
            .await?;
        debug!(
            %key,
            matched = result.matched_count,
            upserted = result.upserted_id.is_some(),
            "replaced document"
        );
        Ok(())
    }

    async fn fetch(&mut self, key: &ObjectKey) -> StoreResult<Option<Document>> {
        let found = self
            .collection
            .find_one(doc! { "_id": key.0 })
            .await?;
        found.map(|raw| from_stored(&raw)).transpose()
    }
}

impl fmt::Debug for MongoBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoBackend")
            .field("collection", &self.collection.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HEX: &str = "507f1f77bcf86cd799439011";

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    fn roundtrip(document: &Document) -> Document {
        let stored = to_stored(&ObjectKey::generate(), document).unwrap();
        from_stored(&stored).unwrap()
    }

    #[test]
    fn object_key_parses_24_hex_chars() {
        let key: ObjectKey = HEX.parse().unwrap();
        assert_eq!(key.to_string(), HEX);
        assert_eq!(key.bytes().len(), 12);
    }

    #[test]
    fn object_key_rejects_malformed_text() {
        assert_eq!(
            "not-a-valid-id".parse::<ObjectKey>(),
            Err(TypeError::InvalidKey("not-a-valid-id".into()))
        );
        assert_eq!(
            "507f1f77".parse::<ObjectKey>(),
            Err(TypeError::InvalidKey("507f1f77".into()))
        );
        assert_eq!("".parse::<ObjectKey>(), Err(TypeError::EmptyKey));
    }

    #[test]
    fn generated_keys_are_distinct() {
        assert_ne!(ObjectKey::generate(), ObjectKey::generate());
    }

    // -----------------------------------------------------------------------
    // Stored form
    // -----------------------------------------------------------------------

    #[test]
    fn stored_form_wraps_body_under_object_id() {
        let key: ObjectKey = HEX.parse().unwrap();
        let document = doc(json!({"id": HEX, "test": "oui"}));

        let stored = to_stored(&key, &document).unwrap();
        assert_eq!(stored.get_object_id("_id").unwrap(), key.object_id());
        let body = stored.get_document("body").unwrap();
        assert_eq!(body.get_str("test").unwrap(), "oui");
        assert!(body.get("id").unwrap().is_none());
    }

    #[test]
    fn stored_form_converts_back_to_json() {
        let document = doc(json!({
            "test": "non",
            "count": 3,
            "nested": {"flag": true, "list": ["a", "b", null]},
        }));
        let back = roundtrip(&document);
        assert_eq!(back, document);
        assert!(back.get("_id").is_none());
    }

    #[test]
    fn client_underscore_id_is_kept() {
        let document = doc(json!({"_id": "x", "a": 1}));
        assert_eq!(roundtrip(&document), document);
    }

    #[test]
    fn extended_json_shapes_are_plain_data() {
        let document = doc(json!({
            "n": {"$numberLong": "5"},
            "o": {"$oid": HEX},
            "d": [{"$date": {"$numberLong": "0"}}],
        }));
        assert_eq!(roundtrip(&document), document);
    }

    #[test]
    fn numbers_keep_their_kind() {
        let document = doc(json!({
            "zero": 0,
            "negative": -3,
            "max": i64::MAX,
            "float": 2.5,
            "whole_float": 2.0,
        }));
        assert_eq!(roundtrip(&document), document);
    }

    #[test]
    fn nul_in_field_name_is_rejected() {
        let document = doc(json!({"a\u{0}b": 1}));
        let err = to_stored(&ObjectKey::generate(), &document).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn stored_document_without_body_is_an_error() {
        let stored = RawDocumentBuf::from_document(&doc! { "_id": ObjectId::new() }).unwrap();
        assert!(matches!(
            from_stored(&stored),
            Err(StoreError::Serialization(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Live server
    //
    // DOCSTORE_TEST_MONGO=localhost:27017 cargo test -p docstore-store -- --ignored
    // -----------------------------------------------------------------------

    async fn live_backend() -> MongoBackend {
        let host =
            std::env::var("DOCSTORE_TEST_MONGO").unwrap_or_else(|_| "localhost:27017".into());
        let collection = format!("test_{}", ObjectId::new().to_hex());
        MongoBackend::connect(&host, "docstore_test", &collection)
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore = "needs a MongoDB server, see DOCSTORE_TEST_MONGO"]
    async fn live_insert_then_fetch() {
        let mut backend = live_backend().await;
        let key = backend.generate_key();
        let document = doc(json!({"_id": "x", "n": {"$numberLong": "5"}, "test": "oui"}));

        backend.insert(&key, &document).await.unwrap();
        assert_eq!(backend.fetch(&key).await.unwrap(), Some(document));

        backend.collection.drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "needs a MongoDB server, see DOCSTORE_TEST_MONGO"]
    async fn live_fetch_unknown_key_is_none() {
        let mut backend = live_backend().await;
        assert_eq!(backend.fetch(&ObjectKey::generate()).await.unwrap(), None);
        backend.collection.drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "needs a MongoDB server, see DOCSTORE_TEST_MONGO"]
    async fn live_replace_upserts_then_overwrites() {
        let mut backend = live_backend().await;
        let key: ObjectKey = HEX.parse().unwrap();

        backend.replace(&key, &doc(json!({"test": "oui", "extra": true}))).await.unwrap();
        assert_eq!(
            backend.fetch(&key).await.unwrap(),
            Some(doc(json!({"test": "oui", "extra": true})))
        );

        backend.replace(&key, &doc(json!({"test": "non"}))).await.unwrap();
        assert_eq!(
            backend.fetch(&key).await.unwrap(),
            Some(doc(json!({"test": "non"})))
        );

        backend.collection.drop().await.unwrap();
    }
}
