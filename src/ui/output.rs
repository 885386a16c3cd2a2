//! Output functions for consistent CLI formatting

use super::context::UiContext;
use console::style;

/// Display a title line
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        println!("{}", style(title).cyan().bold());
    } else {
        println!("{}", title);
    }
}

/// Display a backend command
pub fn command(ctx: &UiContext, command: &str) {
    if ctx.use_fancy_output() {
        println!("  {} {}", style("$").dim(), command);
    } else {
        println!("{}", command);
    }
}

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        println!("{} {}", style("✔").green(), message);
    } else {
        println!("[OK] {}", message);
    }
}

/// Display a success step with detail
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        println!("{} {} ({})", style("✔").green(), message, style(detail).dim());
    } else {
        println!("[OK] {} ({})", message, detail);
    }
}

/// Display an info step
pub fn step_info(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        println!("{} {}", style("•").cyan(), message);
    } else {
        println!("[INFO] {}", message);
    }
}

/// Display a warning step with hint
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.use_fancy_output() {
        println!("{} {} - {}", style("!").yellow(), message, style(hint).dim());
    } else {
        println!("[WARN] {} - {}", message, hint);
    }
}

/// Print a key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}
