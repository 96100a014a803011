use std::env;

use tessera_server::config::load_config;

#[tokio::main]
async fn main() {
    // Load .env if present; environment variables may come from it in
    // local development.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: failed to load .env file: {e}");
        }
    }

    tessera_server::observability::init_tracing();

    // Config path from TESSERA_CONFIG, falling back to tessera.toml if one
    // exists next to the process.
    let config_path = env::var("TESSERA_CONFIG").ok();
    let cfg = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = tessera_server::run(cfg).await {
        tracing::error!(error = %e, "server exited with error");
        std::process::exit(1);
    }
}
