//! Serve command implementation for cb2m CLI.

use std::path::PathBuf;
use std::time::Duration;

use cb2m_core::paths::DEFAULT_TEMP_ROOT;
use cb2m_core::template::DEFAULT_SITE_URL;
use cb2m_server::ServerConfig;
use clap::Args;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long, env = "CB2M_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "CB2M_PORT", default_value = "4226")]
    port: u16,

    /// Directory build jobs are created in
    #[arg(long, env = "CB2M_TMP", default_value = DEFAULT_TEMP_ROOT)]
    temp_dir: PathBuf,

    /// JSON snapshot of snippets to serve
    #[arg(short, long, env = "CB2M_SNIPPETS")]
    snippets: Option<PathBuf>,

    /// Descriptor template (defaults to the built-in POM)
    #[arg(long, env = "CB2M_TEMPLATE")]
    template: Option<PathBuf>,

    /// javac binary (defaults to javac in PATH)
    #[arg(long, env = "CB2M_JAVAC")]
    javac: Option<PathBuf>,

    /// Compiler timeout in seconds
    #[arg(long, env = "CB2M_COMPILE_TIMEOUT", default_value = "60")]
    compile_timeout: u64,

    /// Base URL for revision links in descriptors
    #[arg(long, env = "CB2M_SITE_URL", default_value = DEFAULT_SITE_URL)]
    site_url: String,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            temp_dir: args.temp_dir,
            snapshot: args.snippets,
            template: args.template,
            javac: args.javac,
            compile_timeout: Duration::from_secs(args.compile_timeout),
            site_url: args.site_url,
        }
    }
}

/// Start the artifact server.
pub async fn execute(args: ServeArgs) -> anyhow::Result<()> {
    if let Some(path) = &args.snippets {
        if !path.exists() {
            anyhow::bail!("Snippet snapshot not found: {}", path.display());
        }
    }

    let config = ServerConfig::from(args);

    println!("\ncb2m - codebottle snippets as Maven artifacts");
    println!("{}", "─".repeat(50));
    println!("  ◆ Server:   http://{}:{}", config.host, config.port);
    println!("  ◆ Jobs:     {}", config.temp_dir.display());
    match &config.snapshot {
        Some(path) => println!("  ◆ Snippets: {}", path.display()),
        None => println!("  ◆ Snippets: (none)"),
    }
    println!("{}", "─".repeat(50));
    println!("Press Ctrl+C to stop");
    println!();

    cb2m_server::serve(config).await?;

    Ok(())
}
