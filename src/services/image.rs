//! Image URL helpers for the external content host.

/// Ask the content host for a resized, recompressed rendition of `url`.
///
/// Local paths (the fallback placeholder) are returned untouched.
pub fn optimize_image(url: &str, width: u32, quality: u32) -> String {
    if url.is_empty() || url.starts_with('/') {
        return url.to_string();
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}width={width}&quality={quality}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_width_and_quality() {
        assert_eq!(
            optimize_image("https://cdn/logo.png", 200, 70),
            "https://cdn/logo.png?width=200&quality=70"
        );
    }

    #[test]
    fn extends_existing_query() {
        assert_eq!(
            optimize_image("https://cdn/logo.png?v=2", 150, 70),
            "https://cdn/logo.png?v=2&width=150&quality=70"
        );
    }

    #[test]
    fn leaves_local_placeholder_alone() {
        assert_eq!(optimize_image("/placeholder.svg", 200, 70), "/placeholder.svg");
    }
}
