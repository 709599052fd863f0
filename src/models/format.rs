// Human-readable formatting for the inventory and log surfaces

/// Format a byte count as B / KB / MB / GB with two decimals.
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < MB {
        format!("{:.2} KB", b / KB)
    } else if b < GB {
        format!("{:.2} MB", b / MB)
    } else {
        format!("{:.2} GB", b / GB)
    }
}

/// Format an uptime as e.g. "2d 3h 15m"; below one minute as seconds.
pub fn format_uptime(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{} seconds", seconds);
    }
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 || days > 0 {
        parts.push(format!("{}h", hours % 24));
    }
    parts.push(format!("{}m", minutes % 60));
    parts.join(" ")
}
