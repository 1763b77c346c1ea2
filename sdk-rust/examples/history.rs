use dotenvy::dotenv;
use drivegen_sdk::{HistoryClient, DEFAULT_HISTORY_LIMIT};

mod common;

#[tokio::main]
async fn main() {
    dotenv().ok();
    common::init_tracing();

    let mut history = HistoryClient::new(common::get_transport());
    let records = history.list(DEFAULT_HISTORY_LIMIT).await.unwrap();

    for record in &records {
        println!(
            "{} [{}] {}",
            record.id,
            record
                .created_at
                .map(|created_at| created_at.to_rfc3339())
                .unwrap_or_default(),
            record.prompt
        );
    }

    // Pass an id as the first argument to delete it.
    if let Some(id) = std::env::args().nth(1) {
        history.delete(&id).await.unwrap();
        println!("deleted {id}, {} records left", history.records().len());
    }
}
