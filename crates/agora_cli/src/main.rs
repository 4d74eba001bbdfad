//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `agora_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("agora_core ping={}", agora_core::ping());
    println!("agora_core version={}", agora_core::core_version());
}
