//! Probe binary for `classicwire`.
//!
//! Connects to a server, drives the connection at 60 ticks per second and
//! prints the server identity and negotiated capabilities.

mod cli;

use std::{
    net::ToSocketAddrs,
    process::ExitCode,
    thread,
    time::{Duration, Instant},
};

use classicwire::{ClientEvents, ConnectionBuilder, DisconnectReason, Phase, TraceCodec, dispatch::opcode};
use clap::Parser;
use tracing_subscriber::EnvFilter;

const TICK: Duration = Duration::from_micros(16_667);

/// Prints disconnects and warnings to stderr.
struct Console;

impl ClientEvents for Console {
    fn disconnected(&mut self, reason: &DisconnectReason) { eprintln!("{reason}"); }

    fn warning(&mut self, message: &str) { eprintln!("warning: {message}"); }
}

fn main() -> ExitCode {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = cli::Cli::parse();
    let addr = match (cli.host.as_str(), cli.port).to_socket_addrs().map(|mut a| a.next()) {
        Ok(Some(addr)) => addr,
        Ok(None) => {
            eprintln!("{}: no addresses found", cli.host);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{}: {e}", cli.host);
            return ExitCode::FAILURE;
        }
    };

    let mut connection = ConnectionBuilder::new(TraceCodec::new())
        .events(Console)
        .username(cli.username.as_str())
        .mppass(cli.mppass.as_str())
        .extensions(!cli.vanilla)
        .build();
    connection.begin_connect(addr);

    let deadline = Instant::now() + cli.duration();
    while connection.phase() != Phase::Disconnected && Instant::now() < deadline {
        connection.tick(TICK);
        thread::sleep(TICK);
    }

    let state = connection.state();
    println!("server:   {}", state.server_name);
    println!("motd:     {}", state.motd);
    println!("operator: {}", state.operator);
    if let Some(app) = connection.registry().server_app() {
        println!("software: {app}");
    }
    println!("features: {:?}", connection.features());
    for entry in connection.registry().entries().iter().filter(|e| e.announced) {
        println!("  {} v{}{}", entry.name, entry.version, if entry.enabled { "" } else { " (unused)" });
    }
    if let Some(latency) = state.pings.average() {
        println!("latency:  {} ms", latency.as_millis());
    }
    let codec = connection.codec();
    for (op, count) in codec.counts().iter().enumerate().filter(|(_, c)| **c > 0) {
        let op = u8::try_from(op).unwrap_or(u8::MAX);
        println!("  {:<28} {count}", opcode::name(op));
    }
    if let Some([x, y, z]) = codec.level_size() {
        println!("level:    {x} x {y} x {z}");
    }

    if connection.phase() == Phase::Disconnected && connection.last_disconnect().is_some() {
        ExitCode::FAILURE
    } else {
        connection.disconnect(DisconnectReason::new("Disconnected", "Probe finished"));
        ExitCode::SUCCESS
    }
}
