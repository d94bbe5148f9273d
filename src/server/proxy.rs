use url::Url;

/// Join the upstream base URL with the completion endpoint path,
/// tolerating trailing/leading slashes on either side.
pub fn join_upstream_url(base_url: &str, path: &str) -> Result<String, String> {
    let mut parsed = Url::parse(base_url).map_err(|e| e.to_string())?;

    let normalized_base = parsed.path().trim_end_matches('/');
    let trimmed_path = path.trim_start_matches('/');

    let full_path = if normalized_base.is_empty() || normalized_base == "/" {
        if trimmed_path.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed_path}")
        }
    } else if trimmed_path.is_empty() {
        normalized_base.to_string()
    } else {
        format!("{normalized_base}/{trimmed_path}")
    };

    parsed.set_path(&full_path);
    parsed.set_query(None);

    Ok(parsed.to_string())
}
