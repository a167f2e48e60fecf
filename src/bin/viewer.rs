use lumina::app::App;
use lumina::renderer::RendererSettings;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let asset_root = std::env::args().nth(1).unwrap_or_else(|| "assets".to_string());
    log::info!("Asset root: {asset_root}");

    App::new()
        .with_title("Lumina - Deferred PBR")
        .with_settings(RendererSettings::default())
        .with_asset_root(asset_root)
        .run()?;
    Ok(())
}
