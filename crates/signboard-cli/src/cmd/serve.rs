use anyhow::{anyhow, Result};
use signboard_core::config::Config;
use std::path::Path;

pub fn run(root: &Path, port: Option<u16>, no_refresh: bool) -> Result<()> {
    let config = Config::load(root).map_err(|e| anyhow!("{e}"))?;
    let port = port.unwrap_or(config.server.port);

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!("signboard → http://localhost:{actual_port}  (root {})", root_buf.display());

        tokio::select! {
            res = signboard_server::serve_on(root_buf, listener, !no_refresh) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
