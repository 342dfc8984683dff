/// Join a service base URL and an endpoint path with exactly one `/`.
///
/// Strips at most one trailing slash from `base` and at most one leading slash
/// from `endpoint`, so the result is the same whether or not the base URL was
/// configured with a trailing slash.
pub fn join_url(base: &str, endpoint: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
    format!("{}/{}", base, endpoint)
}
