//! Renderer adapter trait
//!
//! `build` hands the default-merged spec to a [`Renderer`] and writes
//! whatever bytes come back. The stock [`ManifestRenderer`] produces a TOML
//! build manifest describing the spec.

use chrono::Local;
use serde::Serialize;

use crate::cli::error::CliResult;
use crate::profile::PAYLOAD_TYPE;
use crate::session::SessionConfig;

/// Turns a merged spec into artifact bytes
pub trait Renderer {
    /// File extension for artifacts rendered from `spec`, without the dot
    fn extension(&self, spec: &SessionConfig) -> String;

    /// Render `spec`
    fn render(&self, spec: &SessionConfig) -> CliResult<Vec<u8>>;
}

#[derive(Serialize)]
struct Manifest<'a> {
    build: BuildSection<'a>,
    options: &'a SessionConfig,
}

#[derive(Serialize)]
struct BuildSection<'a> {
    tool: String,
    payload_type: &'a str,
    artifact_extension: &'static str,
    generated_at: String,
}

/// Source file extension for a payload `language`, `txt` when unknown
pub fn extension_for_language(language: &str) -> &'static str {
    match language.to_ascii_lowercase().as_str() {
        "python" => "py",
        "c" => "c",
        "cpp" => "cpp",
        "go" => "go",
        "bash" => "sh",
        "powershell" => "ps1",
        "javascript" => "js",
        "ruby" => "rb",
        "perl" => "pl",
        _ => "txt",
    }
}

/// Renders the spec as a TOML manifest. The manifest itself is always
/// `.toml`; `build.artifact_extension` names the extension of the source the
/// spec's `language` would produce.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestRenderer;

impl Renderer for ManifestRenderer {
    fn extension(&self, _spec: &SessionConfig) -> String {
        "toml".to_string()
    }

    fn render(&self, spec: &SessionConfig) -> CliResult<Vec<u8>> {
        let manifest = Manifest {
            build: BuildSection {
                tool: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
                payload_type: spec.get(PAYLOAD_TYPE).unwrap_or_default(),
                artifact_extension: extension_for_language(spec.get("language").unwrap_or_default()),
                generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            },
            options: spec,
        };
        Ok(toml::to_string_pretty(&manifest)?.into_bytes())
    }
}
