//! Config command handler.

use podgen_engine::EngineConfig;
use podgen_server::ServerConfig;

/// Handle the `config` command
pub fn handle_config_command() -> anyhow::Result<()> {
    let engine = EngineConfig::from_env()?;
    let server = ServerConfig::from_env()?;

    println!("{:#?}", engine);
    println!("{:#?}", server);
    match engine.base_url() {
        Some(url) => println!("engine: attach to {}", url),
        None => println!(
            "engine: {} {}",
            engine.engine_command(),
            engine.launch_args().join(" ")
        ),
    }
    Ok(())
}
