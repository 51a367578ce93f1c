//! JSON:API repository demo: a users resource walkthrough.
//!
//! 1. Create a user
//! 2. Look it up by filter, sorted and paged
//! 3. Update, delete and restore it
//!
//! ```bash
//! JSONAPI_BASE_URI=http://localhost:8080/api/users RUST_LOG=debug cargo run --example users
//! ```

use jsonapi_repository::{Criteria, Error, OrderBy, Repository, RepositoryConfig, Resolved};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn describe(resolved: &Resolved) -> String {
    match resolved {
        Resolved::Entity(entity) => format!("entity {}", entity.id().unwrap_or("?")),
        Resolved::Entities(entities) => format!("{} entities", entities.len()),
        Resolved::Document(body) => format!("document {body}"),
        Resolved::Raw(response) => format!("HTTP {}", response.status_code),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== JSON:API Repository Demo ===\n");

    let config = RepositoryConfig::from_env()?;
    println!("Resource: {}", config.base_uri());
    let users = Repository::new(config)?.as_entity();

    // Step 1: Create
    println!("\n1. Creating user...");
    let created = users
        .create(&json!({"data": {"type": "users", "attributes": {"name": "Bob", "role": "admin"}}}))
        .await?;
    if let Some(errors) = created.errors() {
        for error in errors {
            println!("   ✗ {}", error.detail.unwrap_or_default());
        }
        return Ok(());
    }
    println!("   ✓ Created {}", describe(&created));
    let id = created
        .into_entity()
        .and_then(|e| e.id().map(str::to_string))
        .ok_or("create response carried no id")?;

    // Step 2: Query
    println!("\n2. Querying admins...");
    let admins = users
        .find_by(
            &Criteria::new().with("role", ["admin", "owner"]),
            Some(&OrderBy::new().then("created_at", "desc")),
            Some(10),
            Some(0),
        )
        .await?;
    println!("   ✓ Found {}", describe(&admins));

    // Step 3: Update, delete, restore
    println!("\n3. Updating, deleting and restoring {id}...");
    users
        .update(&id, &json!({"data": {"type": "users", "id": id, "attributes": {"name": "Robert"}}}))
        .await?;
    users.delete(&id).await?;
    match users.restore(&id).await {
        Ok(restored) => println!("   ✓ Restored {}", describe(&restored)),
        Err(Error::Api(e)) if e.status_code() == 404 => println!("   - Restore not supported"),
        Err(e) => return Err(e.into()),
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
