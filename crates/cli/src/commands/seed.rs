//! Seed the document store from YAML.
//!
//! The file is a YAML list of records written with the same field names as
//! the JSON API:
//!
//! ```yaml
//! - name: Widget
//!   description: A widget
//!   price: 9.99
//!   stock: 5
//!   category: misc
//!   imageUrl: https://cdn.example.org/widget.png
//! ```
//!
//! Every record is validated before the database is touched; one bad record
//! aborts the whole run.

use std::path::Path;

use serde_json::Value;
use tracing::{error, info};

use eko_store_api::db::Gateway;
use eko_store_api::models::Resource;
use eko_store_api::services::ResourceService;

use super::{CommandError, database_url};

/// Read and validate seed records, returning them untouched.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a YAML list, or any
/// record fails validation.
pub async fn load<R: Resource>(file_path: &Path) -> Result<Vec<Value>, CommandError> {
    let content =
        tokio::fs::read_to_string(file_path)
            .await
            .map_err(|source| CommandError::Io {
                path: file_path.display().to_string(),
                source,
            })?;
    let records: Vec<Value> = serde_yaml::from_str(&content)?;
    info!(records = records.len(), collection = R::COLLECTION, "Parsed seed file");

    let mut invalid = 0;
    for (index, record) in records.iter().enumerate() {
        if let Err(errors) = R::from_input(record) {
            invalid += 1;
            error!("Record {index}: {errors}");
        }
    }
    if invalid > 0 {
        return Err(CommandError::InvalidRecords(invalid));
    }

    Ok(records)
}

/// Insert every record from `file_path` into the entity's collection.
///
/// # Errors
///
/// Returns an error if validation fails or the database is unreachable.
pub async fn run<R: Resource>(file_path: &Path) -> Result<(), CommandError> {
    let records = load::<R>(file_path).await?;

    let gateway = Gateway::connect(&database_url()?).await?;
    info!("Connected to database");

    let service = ResourceService::<R>::new(&gateway)?;
    for record in &records {
        service.create(record).await?;
    }

    info!(inserted = records.len(), collection = R::COLLECTION, "Seeding complete");
    Ok(())
}
