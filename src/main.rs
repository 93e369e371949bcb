#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod config;
mod control;
mod input;
mod link;
mod logger;

use crate::config::Settings;
use crate::control::ControlSession;
use crate::input::{OrientationEndpoint, run_key_input};
use crate::link::{DroneClient, FlightCommand};
use std::{process, sync::Arc, time::Duration};
use tokio::sync::mpsc;

/// Grace period allowing the link writer to flush a final stop/land pair
/// before the process goes away.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);
const ORIENTATION_QUEUE: usize = 64;
const KEY_QUEUE: usize = 16;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let settings = match Settings::load() {
        Ok(settings) => Arc::new(settings),
        Err(e) => fatal!("{e}"),
    };
    if settings.debug {
        info!("bridging head tracker to drone link at {}", settings.drone_address);
    }

    let (client, telemetry_rx) = match DroneClient::connect(&settings.drone_address).await {
        Ok(pair) => pair,
        Err(e) => fatal!("{e}"),
    };

    let endpoint = match OrientationEndpoint::bind(settings.orientation_port).await {
        Ok(endpoint) => endpoint,
        Err(e) => fatal!("cannot open orientation endpoint: {e}"),
    };
    let (sample_tx, orientation_rx) = mpsc::channel(ORIENTATION_QUEUE);
    tokio::spawn(endpoint.serve(sample_tx));

    let key_rx = if settings.key_mapping {
        let (key_tx, key_rx) = mpsc::channel(KEY_QUEUE);
        tokio::spawn(run_key_input(key_tx));
        Some(key_rx)
    } else {
        None
    };

    let session = ControlSession::new(
        client.clone(),
        Arc::clone(&settings),
        orientation_rx,
        telemetry_rx,
        key_rx,
    );

    match tokio::spawn(session.run()).await {
        Ok(Ok(())) => {
            tokio::time::sleep(SHUTDOWN_GRACE).await;
            info!("session closed");
        }
        Ok(Err(e)) => {
            error!("control session failed: {e}");
            emergency_stop(&client).await;
            process::exit(1);
        }
        Err(e) => {
            error!("control session panicked: {e}");
            emergency_stop(&client).await;
            process::exit(1);
        }
    }
}

/// Best-effort stop and land. Dispatch errors are already swallowed by the
/// client; the sleep gives the writer a chance to flush before exit.
async fn emergency_stop(client: &DroneClient) {
    client.dispatch(FlightCommand::Stop);
    client.dispatch(FlightCommand::Land);
    tokio::time::sleep(SHUTDOWN_GRACE).await;
}
