//! Reads, replaces and finally removes a JSON document.
//!
//! ```text
//! cargo run --example mutable_document -- http://localhost:8080/documents/1
//! ```

use restkit::prelude::*;

type Document = Representation<Writable<Json>>;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(&LogConfig::default());

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8080/documents/1".to_owned());

    let resource = Resource::open(&url)?;
    let mut document = Document::new(resource.clone());

    match document.value().await {
        Ok(value) => println!("current: {value}"),
        Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => println!("current: none"),
        Err(err) => {
            resource.close();
            return Err(err);
        }
    }

    document
        .assign(Some(json!({"title": "Hello", "tags": ["demo"]})))
        .await?;
    println!("after post: {}", document.value().await?);

    document.assign(None).await?;
    println!("after delete: {:?}", document.state());

    resource.close();
    Ok(())
}
