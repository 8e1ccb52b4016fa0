//! Subscribes to link/address/route/neighbor events and prints each one
//! as it arrives, stopping on Ctrl-C.

use std::sync::Arc;

use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;

use rtaco_core::{Listener, NetlinkEndpoint, Policy};

#[tokio::main]
async fn main() {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .expect("logger already initialized");

    let listener = Arc::new(Listener::new(NetlinkEndpoint::new()));

    listener.on_link.connect(Policy::Sync, |event| {
        println!(
            "link: action={:?} index={} name={} flags={:?} change={:#x}",
            event.action, event.index, event.name, event.flags, event.change
        );
    });
    listener.on_address.connect(Policy::Sync, |event| {
        println!(
            "address: action={:?} index={} addr={} prefix_len={} label={:?}",
            event.action, event.index, event.address, event.prefix_len, event.label
        );
    });
    listener.on_route.connect(Policy::Sync, |event| {
        println!(
            "route: action={:?} dst={:?} gateway={:?} oif={:?} table={}",
            event.action, event.dst, event.gateway, event.oif, event.table
        );
    });
    listener.on_neighbor.connect(Policy::Sync, |event| {
        println!(
            "neighbor: action={:?} index={} addr={} lladdr={:?} state={:?}",
            event.action, event.index, event.address, event.lladdr, event.state
        );
    });
    listener.on_error.connect(Policy::Sync, |event| {
        error!("netlink error {} on message type {}", event.code, event.header.message_type);
    });

    if let Err(error) = listener.start().await {
        error!("failed to start listener: {error}");
        return;
    }
    info!("listener started, press Ctrl-C to stop");

    let run_handle = {
        let listener = Arc::clone(&listener);
        tokio::spawn(async move {
            if let Err(error) = listener.run().await {
                error!("listener run loop exited with error: {error}");
            }
        })
    };

    if let Err(error) = tokio::signal::ctrl_c().await {
        error!("failed to install Ctrl-C handler: {error}");
    }

    info!("stopping listener");
    listener.stop().await;
    let _ = run_handle.await;
}
