//! # MedChat Server Utilities
//!
//! File: cli/src/commands/srv/utils.rs
//!
//! Startup diagnostics for `medchat srv`: a short summary of the site
//! directory being served, and the machine's LAN address for the
//! "Network URL" line.
//!
use std::net::{IpAddr, UdpSocket};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// What `log_site_summary` found in a site directory.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SiteSummary {
    pub html_pages: usize,
    pub has_index: bool,
}

/// Counts the HTML pages under `root` (recursively).
pub fn summarize_site(root: &Path) -> SiteSummary {
    let mut summary = SiteSummary {
        has_index: root.join("index.html").is_file(),
        ..SiteSummary::default()
    };
    // Symlinks are not followed, so a link back into the tree cannot loop.
    for entry_result in WalkDir::new(root) {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to access entry under '{}': {}", root.display(), e);
                continue;
            }
        };
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "html")
        {
            summary.html_pages += 1;
        }
    }
    summary
}

/// Logs the site summary, warning when there is no top-level `index.html`.
pub fn log_site_summary(root: &Path) {
    let summary = summarize_site(root);
    info!(
        "Site directory {} contains {} HTML page(s)",
        root.display(),
        summary.html_pages
    );
    if !summary.has_index {
        warn!(
            "No index.html in {}; the base path will return 404.",
            root.display()
        );
    }
}

/// Local address of the interface that routes to the outside world.
///
/// `connect` on a UDP socket only selects a route; no packet is sent.
pub fn local_network_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    if ip.is_loopback() || ip.is_unspecified() {
        debug!("No non-loopback network address found");
        return None;
    }
    Some(ip)
}
