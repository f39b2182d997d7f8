//! Logger module
//!
//! Provides logging utilities for the relay including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Delivery outcome logging for streamed assets
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::stream::{AssetReference, Delivery, FetchError};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Gallery relay started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Immich upstream: {}", config.immich.url));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(max) = config.performance.max_connections {
        write_info(&format!("Max connections: {max}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        write_info(&format!("[Headers] Count: {count}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}

/// Log how a streamed asset ended
pub fn log_delivery(asset: &AssetReference, delivery: &Delivery) {
    let (kind, id) = (asset.kind, &asset.id);
    match delivery {
        Delivery::NotFound => write_info(&format!("[Stream] {kind} {id}: not found")),
        Delivery::Complete {
            status,
            chunks,
            bytes,
        } => write_info(&format!(
            "[Stream] {kind} {id}: {status}, {bytes} bytes in {chunks} chunks"
        )),
        Delivery::Cancelled {
            status,
            chunks,
            bytes,
        } => write_info(&format!(
            "[Stream] {kind} {id}: {status}, client left after {bytes} bytes in {chunks} chunks"
        )),
    }
}

/// Log an upstream failure that cut a stream short
pub fn log_delivery_failed(asset: &AssetReference, err: &FetchError) {
    write_error(&format!(
        "[ERROR] [Stream] {} {}: upstream failed mid-stream, resetting client: {err}",
        asset.kind, asset.id
    ));
}

pub fn log_shutdown_requested(signal: &str) {
    write_info(&format!("\n[Shutdown] {signal} received, no longer accepting connections"));
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        write_info("[Shutdown] All connections drained");
    } else {
        write_info(&format!(
            "[Shutdown] Drain timeout, abandoning {remaining} connection(s)"
        ));
    }
}
