//! Provisions the Atlas vector search index used for retrieval over
//! embedded document chunks. Run manually with `finaxial-api create-vector-index`.

use mongodb::bson::{doc, Document};
use mongodb::{Client, Database};

pub const VECTOR_COLLECTION: &str = "vectordocuments";
pub const VECTOR_INDEX_NAME: &str = "vector_index";
pub const EMBEDDING_PATH: &str = "embedding";
pub const EMBEDDING_DIMENSIONS: i32 = 1536;
pub const SIMILARITY: &str = "cosine";

/// `createSearchIndexes` command for the vector index.
pub fn create_index_command() -> Document {
    doc! {
        "createSearchIndexes": VECTOR_COLLECTION,
        "indexes": [{
            "name": VECTOR_INDEX_NAME,
            "type": "vectorSearch",
            "definition": {
                "fields": [
                    {
                        "type": "vector",
                        "path": EMBEDDING_PATH,
                        "numDimensions": EMBEDDING_DIMENSIONS,
                        "similarity": SIMILARITY,
                    },
                    {
                        "type": "filter",
                        "path": "workspaceId",
                    }
                ]
            }
        }]
    }
}

pub fn drop_index_command() -> Document {
    doc! {
        "dropSearchIndex": VECTOR_COLLECTION,
        "name": VECTOR_INDEX_NAME,
    }
}

/// Ensures the collection exists, then drops and recreates the index.
/// A failed drop (usually "index not found") is logged and ignored.
pub async fn provision(db: &Database) -> Result<(), mongodb::error::Error> {
    let collections = db.list_collection_names().await?;
    if collections.iter().any(|c| c == VECTOR_COLLECTION) {
        log::info!("📁 Collection '{}' already exists", VECTOR_COLLECTION);
    } else {
        db.create_collection(VECTOR_COLLECTION).await?;
        log::info!("📁 Created collection '{}'", VECTOR_COLLECTION);
    }

    match db.run_command(drop_index_command()).await {
        Ok(_) => log::info!("🗑️  Dropped existing index '{}'", VECTOR_INDEX_NAME),
        Err(e) => log::warn!("⚠️  Could not drop index '{}' (continuing): {}", VECTOR_INDEX_NAME, e),
    }

    let result = db.run_command(create_index_command()).await?;
    log::info!("✅ Vector search index '{}' requested: {}", VECTOR_INDEX_NAME, result);
    log::info!("ℹ️  Atlas builds the index asynchronously; it may take a minute to become queryable");

    Ok(())
}

/// Connects with `uri` and provisions the index in `db_name`.
pub async fn run(uri: &str, db_name: &str) -> Result<(), mongodb::error::Error> {
    log::info!("🔗 Connecting to MongoDB database '{}'...", db_name);
    let client = Client::with_uri_str(uri).await?;
    let result = provision(&client.database(db_name)).await;
    client.shutdown().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_command_targets_vector_collection() {
        let cmd = create_index_command();
        assert_eq!(cmd.get_str("createSearchIndexes").unwrap(), "vectordocuments");

        let index = cmd.get_array("indexes").unwrap()[0].as_document().unwrap();
        assert_eq!(index.get_str("name").unwrap(), "vector_index");
        assert_eq!(index.get_str("type").unwrap(), "vectorSearch");

        let fields = index
            .get_document("definition")
            .unwrap()
            .get_array("fields")
            .unwrap();
        let vector = fields[0].as_document().unwrap();
        assert_eq!(vector.get_i32("numDimensions").unwrap(), 1536);
        assert_eq!(vector.get_str("similarity").unwrap(), "cosine");
        assert_eq!(vector.get_str("path").unwrap(), "embedding");
    }

    #[test]
    fn drop_command_names_the_index() {
        let cmd = drop_index_command();
        assert_eq!(cmd.get_str("dropSearchIndex").unwrap(), VECTOR_COLLECTION);
        assert_eq!(cmd.get_str("name").unwrap(), VECTOR_INDEX_NAME);
    }
}
