use dotenvy::dotenv;
use drivegen_sdk::{SimilaritySearchClient, DEFAULT_SEARCH_RESULTS};

mod common;

#[tokio::main]
async fn main() {
    dotenv().ok();
    common::init_tracing();

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "electric sports car".to_string());

    let search = SimilaritySearchClient::new(common::get_transport());
    let results = search.query(&query, DEFAULT_SEARCH_RESULTS).await.unwrap();

    for result in results {
        let similarity = result
            .similarity()
            .map_or_else(|| "n/a".to_string(), |score| format!("{score:.1}%"));
        let prompt = result.metadata.prompt.as_deref().unwrap_or("(no prompt)");
        println!("{similarity:>7}  {}  {prompt}", result.id);
    }
}
