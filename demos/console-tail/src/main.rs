//! Tails console output and lifecycle notices from a supervising daemon.
//!
//! Usage: `console-tail <endpoint> <name> <key> <server-id>`
//!
//! Connects, probes the target server's status once the session is up,
//! then prints pushed console lines and lifecycle notices until Ctrl-C.

use std::time::Duration;

use foreman_client::{ClientConfig, ForemanClient};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(endpoint), Some(name), Some(key), Some(server_id)) =
        (args.next(), args.next(), args.next(), args.next())
    else {
        eprintln!("usage: console-tail <endpoint> <name> <key> <server-id>");
        std::process::exit(2);
    };

    let client: ForemanClient = ForemanClient::new(ClientConfig::new(name, endpoint, key));

    client
        .on_connect(|err| match err {
            None => tracing::info!("session ready"),
            Some(reason) => tracing::error!(%reason, "authentication rejected"),
        })
        .await;
    client
        .on_disconnect(|| tracing::warn!("link lost"))
        .await;
    client
        .on_line(|server, line| println!("[{server}] {}", line.text))
        .await;
    client
        .on_status(|server, ev| {
            tracing::info!(%server, status = %ev.status, "status changed");
        })
        .await;
    client
        .on_login(|server, ev| {
            tracing::info!(%server, player = %ev.player, "player joined");
        })
        .await;
    client
        .on_logout(|server, ev| {
            tracing::info!(%server, player = %ev.player, "player left");
        })
        .await;

    client.connect();

    // Give the handshake a moment, then probe once; pushed events carry
    // everything from here on.
    tokio::time::sleep(Duration::from_millis(300)).await;
    match client.status(&server_id).await {
        Ok(status) => tracing::info!(%server_id, %status, "current status"),
        Err(e) => tracing::error!(error = %e, "status probe failed"),
    }

    tokio::signal::ctrl_c().await.ok();
    let _ = client.disconnect().await;
}
