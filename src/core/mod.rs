// ─── Haven Launcher Core ───
// Interprets launch files and bootstraps the Java application they describe.
//
// Architecture:
//   core/
//     config/     — Launch-file interpreter (expansion, `when`, directives)
//     validate/   — Digest validators attached to resources
//     props       — Host properties visible as `${p:NAME}`
//     downloader/ — Validated, cached resource fetches
//     launch/     — Include/chain loader, launch plan, process spawner
//     java/       — Java binary discovery
//     state/      — Persisted launcher settings

pub mod config;
pub mod downloader;
pub mod error;
pub mod java;
pub mod launch;
pub mod props;
pub mod state;
pub mod validate;
