use dotenvy::dotenv;
use drivegen_sdk::{ConfigStore, HealthClient};

mod common;

#[tokio::main]
async fn main() {
    dotenv().ok();
    common::init_tracing();

    let transport = common::get_transport();
    let report = HealthClient::new(transport).check().await;
    println!("{report:#?}");
    if !report.is_healthy() {
        println!("service is not fully healthy, generation may fail");
    }

    let path = ConfigStore::default_path().unwrap();
    let mut store = ConfigStore::load(path).unwrap();
    store.record_health(&report).unwrap();
    println!("saved health status to {:?}", store.path());
}
