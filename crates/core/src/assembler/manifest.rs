//! Concat manifest format: one `file '<path>'` line per input.

use std::path::PathBuf;

/// Renders the manifest for `inputs`, preserving their order.
///
/// Relative paths are made absolute, since the encoder resolves them
/// against the manifest's own directory.
pub fn render_manifest(inputs: &[PathBuf]) -> std::io::Result<String> {
    let mut manifest = String::new();
    for input in inputs {
        let absolute = std::path::absolute(input)?;
        let escaped = absolute.to_string_lossy().replace('\'', r"'\''");
        manifest.push_str("file '");
        manifest.push_str(&escaped);
        manifest.push_str("'\n");
    }
    Ok(manifest)
}

/// Parses a manifest back into its ordered input paths.
pub fn parse_manifest(manifest: &str) -> Vec<PathBuf> {
    manifest
        .lines()
        .filter_map(|line| line.trim().strip_prefix("file "))
        .map(|quoted| {
            let inner = quoted
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .unwrap_or(quoted);
            PathBuf::from(inner.replace(r"'\''", "'"))
        })
        .collect()
}
