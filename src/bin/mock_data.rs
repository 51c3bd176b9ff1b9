use anyhow::{bail, Result};
use chronicle::common::{Activity, ChronicleConfig, StoreClient};
use chronicle::context::connect_store;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

const SAMPLE_DAY: &[(&str, &str, Option<&str>)] = &[
    ("Coffee", "07:30", Some("First cup on the balcony")),
    ("Morning run", "06:15", Some("5k along the river")),
    ("Standup", "09:30", None),
    ("Deep work", "10:00", Some("Timeline rendering")),
    ("Lunch", "12:30", None),
    ("Reading", "21:00", Some("Two chapters")),
];

#[tokio::main]
async fn main() -> Result<()> {
    // Set up environment and logging
    dotenv::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting mock data generation");

    let config = ChronicleConfig::from_env()?;
    let client = StoreClient::new(connect_store(&config).await?);

    let mut failures = 0;
    for (name, time, description) in SAMPLE_DAY {
        let activity = Activity::new(*name, *time, description.map(str::to_string));
        if client.upsert_activity(&activity).await {
            info!("Seeded {} at {}", activity.name, activity.time);
        } else {
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} of {} activities could not be stored", failures, SAMPLE_DAY.len());
    }

    info!("Mock data generation complete");
    Ok(())
}
