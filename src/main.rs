use std::sync::atomic::{AtomicU32, Ordering};

use clap::Parser;
use inkpot::{mongo, Config};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

async fn async_main(config: Config) {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let app = match mongo(&config).await {
        Ok(a) => a,
        Err(e) => return eprintln!("cannot build application: {}", e),
    };

    let address = format!("{}:{}", config.host, config.port);
    let listener = match TcpListener::bind(&address).await {
        Ok(l) => l,
        Err(e) => return eprintln!("cannot bind {}: {}", address, e),
    };

    info!("database running on {}", config.mongo_uri);
    info!("server running on http://{}", address);

    match axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        Ok(o) => o,
        Err(e) => eprintln!("server returned: {}", e),
    }
}

fn main() {
    let config = Config::parse();

    static NUM: AtomicU32 = AtomicU32::new(0);
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name_fn(|| format!("inkpot-worker-{}", NUM.fetch_add(1, Ordering::Relaxed)))
        .build()
    {
        Ok(r) => r,
        Err(e) => return eprintln!("{}", e),
    };

    rt.block_on(async_main(config))
}

async fn shutdown_signal() {
    let interrupt = async {
        match ctrl_c().await {
            Ok(o) => o,
            Err(e) => return eprintln!("cannot install Ctrl+C handler: {}", e),
        }

        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => return eprintln!("cannot install signal handler: {}", e),
        }

        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
}
