//! Manifest audit tests.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
//! The SD backend locks through `embassy-sync`'s `CriticalSectionRawMutex`;
//! the critical-section implementation itself is chosen by the firmware
//! (`cortex-m/critical-section-single-core`), never by this crate.
//!
//! Run with: cargo test -p platform --test manifest_audit

const MANIFEST: &str = include_str!("../Cargo.toml");

fn section(name: &str) -> &'static str {
    let header = format!("[{name}]");
    let start = MANIFEST
        .find(&header)
        .unwrap_or_else(|| panic!("Cargo.toml has no {header} section"));
    let body = &MANIFEST[start + header.len()..];
    let end = body.find("\n[").unwrap_or(body.len());
    &body[..end]
}

#[test]
fn platform_does_not_pick_a_critical_section_impl() {
    assert!(
        !section("dependencies").contains("critical-section"),
        "platform must not depend on critical-section directly; the mutex comes from embassy-sync"
    );
}

#[test]
fn sdmmc_feature_pulls_only_storage_and_mutex() {
    let features = section("features");
    let sdmmc = features
        .lines()
        .find(|line| line.trim_start().starts_with("sdmmc"))
        .expect("sdmmc feature must exist");
    assert!(sdmmc.contains("dep:embedded-sdmmc"));
    assert!(sdmmc.contains("dep:embassy-sync"));
    assert!(!sdmmc.contains("critical-section"));
}
