//! Render a single garment mockup from environment / .env settings.

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting mockup studio");

    let config = mockup_studio::init_config()?;

    let registry = mockup_studio::decoder_registry();

    let output = mockup_studio::run(&config, &registry)?;
    tracing::info!("Done: {}", output.display());
    Ok(())
}
