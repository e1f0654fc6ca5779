//! Relay CLI demo
//!
//! Runs one chat-style relay command against a real device, the way a chat
//! front-end would. Registered devices are kept in a JSON file so later runs
//! can refer to them by index.
//!
//! # Prerequisites
//!
//! - A Cisco IOS device reachable over SSH
//!
//! # Usage
//!
//! ```bash
//! cargo run --example relay_cli -- --user alice create_connection 192.168.1.1 admin secret
//! cargo run --example relay_cli -- --user alice show_connection
//! cargo run --example relay_cli -- --user alice eigrp 65000 10.0.0.0/24,192.168.1.0/30
//! cargo run --example relay_cli -- --user alice show_eigrp 1
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use netrelay::registry::{JsonFileStore, UserId};
use netrelay::relay::RelayBuilder;
use netrelay::transport::{HostKeyVerification, SshConnector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let Some((name, rest)) = args.command.split_first() else {
        Args::print_help();
        std::process::exit(1);
    };

    let mut connector = SshConnector::new()
        .port(args.port)
        .timeout(Duration::from_secs(args.timeout));
    if args.insecure {
        connector = connector.host_key_verification(HostKeyVerification::Disabled);
    }

    let relay = RelayBuilder::new()
        .platform(connector.platform_definition())
        .connect_timeout(Duration::from_secs(args.timeout))
        .build(connector, JsonFileStore::new(&args.store))?;

    let user = UserId::new(args.user);
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

    match relay.dispatch(&user, name, &rest).await {
        Ok(report) => println!("{report}"),
        Err(e) => {
            log::debug!("{e}");
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }

    Ok(())
}

struct Args {
    user: String,
    store: PathBuf,
    port: u16,
    timeout: u64,
    insecure: bool,
    command: Vec<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut user = env::var("USER").unwrap_or_else(|_| "local".to_string());
        let mut store = PathBuf::from("devices.json");
        let mut port = 22u16;
        let mut timeout = 30u64;
        let mut insecure = false;
        let mut command = Vec::new();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = args[i].clone();
                    }
                }
                "--store" | "-s" => {
                    i += 1;
                    if i < args.len() {
                        store = PathBuf::from(&args[i]);
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().unwrap_or(22);
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse().unwrap_or(30);
                    }
                }
                "--insecure" => insecure = true,
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {
                    // First positional argument starts the relay command.
                    command.extend(args[i..].iter().cloned());
                    break;
                }
            }
            i += 1;
        }

        Self {
            user,
            store,
            port,
            timeout,
            insecure,
            command,
        }
    }

    fn print_help() {
        println!(
            r#"netrelay relay_cli demo

USAGE:
    cargo run --example relay_cli -- [OPTIONS] <COMMAND> [ARGS...]

OPTIONS:
    -u, --user <ID>          Chat user id [default: $USER]
    -s, --store <PATH>       Device store file [default: devices.json]
    -p, --port <PORT>        SSH port [default: 22]
    -t, --timeout <SECS>     Connect timeout [default: 30]
    --insecure               Skip host key verification
    --help                   Print this help message

EXAMPLES:
    # Register a device (becomes device 1)
    relay_cli create_connection 192.168.1.1 admin secret

    # Configure OSPF on device 2
    relay_cli ospf 10.0.0.0/24/0,10.1.0.0/16/1 2

    # BGP with one neighbor
    relay_cli bgp 65000 10.0.0.0/24 192.168.1.1:65001
"#
        );
    }
}
