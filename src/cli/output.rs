//! Shared CLI output helpers.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success
//! - Red: errors
//! - Yellow: warnings
//! - Cyan: paths and hints
//! - Bold: headers and values
//! - Dimmed: secondary info

use console::style;
use std::fmt::Display;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none() && console::colors_enabled()
}

fn stderr_colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none() && console::colors_enabled_stderr()
}

/// Print a success message with checkmark.
///
/// Example: `✓ initialized ~/.password-store`
pub fn success(msg: &str) {
    if colors_enabled() {
        println!("{} {}", style("✓").green(), msg);
    } else {
        println!("✓ {}", msg);
    }
}

/// Print an error message to stderr.
pub fn error(msg: &str) {
    if stderr_colors_enabled() {
        eprintln!("{} {}", style("✗").red().for_stderr(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a warning message to stderr.
pub fn warn(msg: &str) {
    if stderr_colors_enabled() {
        eprintln!("{} {}", style("⚠").yellow().for_stderr(), msg);
    } else {
        eprintln!("⚠ {}", msg);
    }
}

/// Print a hint to stderr, usually after an error.
///
/// Example: `→ run: cellar init <key-id>`
pub fn hint(msg: &str) {
    if stderr_colors_enabled() {
        eprintln!(
            "{} {}",
            style("→").cyan().for_stderr(),
            style(msg).cyan().for_stderr()
        );
    } else {
        eprintln!("→ {}", msg);
    }
}

pub fn header(title: &str) {
    if colors_enabled() {
        println!("{}", style(title).bold());
    } else {
        println!("{}", title);
    }
}

/// Print a key-value pair (label dimmed, value bold).
///
/// Example: `  binary:  /usr/bin/gpg`
pub fn kv(label: &str, value: impl Display) {
    if colors_enabled() {
        println!("  {}  {}", style(label).dim(), style(value).bold());
    } else {
        println!("  {}  {}", label, value);
    }
}

/// Print a list item with bullet.
pub fn list_item(item: &str) {
    println!("  • {}", item);
}

/// Format a path in cyan for inline use.
pub fn path(p: impl Display) -> String {
    if colors_enabled() {
        style(p).cyan().to_string()
    } else {
        p.to_string()
    }
}

/// Format secondary text for inline use.
pub fn dimmed(s: &str) -> String {
    if colors_enabled() {
        style(s).dim().to_string()
    } else {
        s.to_string()
    }
}
