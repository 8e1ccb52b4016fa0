//! Issues the four dump operations concurrently against one `Control`
//! façade and prints what came back.

use log::{error, LevelFilter};
use simple_logger::SimpleLogger;

use rtaco_core::{Control, NetlinkEndpoint};

#[tokio::main]
async fn main() {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .expect("logger already initialized");

    let control = Control::new(NetlinkEndpoint::new());

    let (links, addresses, routes, neighbors) = tokio::join!(
        control.dump_links(),
        control.dump_addresses(),
        control.dump_routes(),
        control.dump_neighbors(),
    );

    match links {
        Ok(links) => {
            println!("links: {}", links.len());
            for link in links {
                println!(
                    "  index={} name={} flags={:?} change={:#x}",
                    link.index, link.name, link.flags, link.change
                );
            }
        }
        Err(error) => error!("dump_links failed: {error}"),
    }

    match addresses {
        Ok(addresses) => {
            println!("addresses: {}", addresses.len());
            for address in addresses {
                println!(
                    "  index={} addr={} prefix_len={} label={:?}",
                    address.index, address.address, address.prefix_len, address.label
                );
            }
        }
        Err(error) => error!("dump_addresses failed: {error}"),
    }

    match routes {
        Ok(routes) => {
            println!("routes: {}", routes.len());
            for route in routes {
                println!(
                    "  dst={:?} gateway={:?} oif={:?} table={}",
                    route.dst, route.gateway, route.oif, route.table
                );
            }
        }
        Err(error) => error!("dump_routes failed: {error}"),
    }

    match neighbors {
        Ok(neighbors) => {
            println!("neighbors: {}", neighbors.len());
            for neighbor in neighbors {
                println!(
                    "  index={} addr={} state={:?}",
                    neighbor.index, neighbor.address, neighbor.state
                );
            }
        }
        Err(error) => error!("dump_neighbors failed: {error}"),
    }

    control.stop().await;
}
