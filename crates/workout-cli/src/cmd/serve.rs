use anyhow::Result;
use workout_core::Config;

pub fn run(config: Config, port: u16) -> Result<()> {
    let service = super::build_service(config)?;
    let rt = super::runtime()?;

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

        tokio::select! {
            res = workout_server::serve_on(service, listener) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
