use serde::{Deserialize, Serialize};

/// One object written to a storage bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
}

/// Result of an asset upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub object: StoredObject,
    /// Public URL for public-bucket assets, bare storage path for restricted ones.
    pub reference: String,
}

/// Recovers the object path of a previously stored asset reference in `bucket`.
///
/// Accepts Supabase public URLs (`.../object/public/<bucket>/<path>`) and bare
/// paths. URLs pointing anywhere else return `None`.
pub fn object_path_from_reference(reference: &str, bucket: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    let marker = format!("/object/public/{}/", bucket);
    if let Some(idx) = reference.find(&marker) {
        let path = &reference[idx + marker.len()..];
        let path = path.split(['?', '#']).next().unwrap_or(path);
        return (!path.is_empty()).then(|| path.to_string());
    }

    if reference.starts_with("http://") || reference.starts_with("https://") {
        return None;
    }

    let path = reference.trim_start_matches('/');
    let path = path
        .strip_prefix(&format!("{}/", bucket))
        .unwrap_or(path);
    (!path.is_empty()).then(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_path_from_public_url() {
        let url = "https://abc.supabase.co/storage/v1/object/public/products/u1/covers/1_art.png?t=1";
        assert_eq!(
            object_path_from_reference(url, "products").as_deref(),
            Some("u1/covers/1_art.png")
        );
    }

    #[test]
    fn bare_paths_are_kept() {
        assert_eq!(
            object_path_from_reference("u1/wav/1_take.wav", "secure-products").as_deref(),
            Some("u1/wav/1_take.wav")
        );
        assert_eq!(
            object_path_from_reference("secure-products/u1/wav/1_take.wav", "secure-products")
                .as_deref(),
            Some("u1/wav/1_take.wav")
        );
    }

    #[test]
    fn foreign_urls_are_ignored() {
        assert_eq!(
            object_path_from_reference("https://res.cloudinary.com/x/image/upload/a.png", "products"),
            None
        );
        assert_eq!(object_path_from_reference("   ", "products"), None);
    }
}
