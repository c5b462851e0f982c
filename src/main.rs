use ascend::{database, services, utils};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::config::load_dotenv();
    env_logger::init();

    // Initialize the store
    let data_dir = utils::config::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("ascend.db");
    database::init_database(&db_path)?;

    let settings = utils::config::load_settings(&data_dir);

    // Start the periodic insight generation pass
    services::insight_engine::start_insight_engine(db_path.clone(), settings);

    log::info!("ascend backend ready ({})", db_path.display());

    tokio::signal::ctrl_c().await?;
    log::info!("shutting down");

    Ok(())
}
