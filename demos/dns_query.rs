//! Queries a DNS-over-HTTPS resolver that answers with the obsolete
//! `application/x-javascript` content type.
//!
//! ```text
//! cargo run --example dns_query -- example.com AAAA
//! ```

use restkit::prelude::*;
use restkit::wrapper::Json as JsonWrapper;

struct Dns;

impl Kind for Dns {
    type Wrapper = JsonWrapper;

    fn wrapper() -> &'static JsonWrapper {
        static DNS: JsonWrapper = JsonWrapper::new("application/x-javascript");
        &DNS
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(&LogConfig::development());

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "example.com".to_owned());
    let kind = args.next().unwrap_or_else(|| "AAAA".to_owned());

    Resource::scoped("https://dns.google.com/resolve", |resource| async move {
        let query = resource
            .get::<Dns>([("name", name.as_str()), ("type", kind.as_str())])
            .await?;

        let value = query.value().await?;
        tracing::info!(question = %value["Question"], "Resolved");
        for answer in value["Answer"].as_array().into_iter().flatten() {
            println!("{} {} {}", answer["name"], answer["TTL"], answer["data"]);
        }
        Ok::<_, Error>(())
    })
    .await
}
