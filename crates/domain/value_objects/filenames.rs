use mime_guess::MimeGuess;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::domain::value_objects::enums::asset_slots::AssetSlot;

const MAX_FILENAME_LEN: usize = 100;
const MAX_EXTENSION_LEN: usize = 10;
const FALLBACK_FILENAME: &str = "file";

/// Reduces a client filename to `[A-Za-z0-9_]`, dropping the extension.
///
/// Diacritics are stripped through NFD decomposition, other non-word characters
/// are removed and whitespace runs collapse to a single `_`. The result is capped
/// at 100 characters. Sanitizing an already sanitized name returns it unchanged.
pub fn sanitize_filename(file_name: &str) -> String {
    let (stem, _) = split_extension(file_name);

    let stripped: String = stem.nfd().filter(|c| !is_combining_mark(*c)).collect();

    let mut sanitized = String::with_capacity(stripped.len());
    let mut pending_space = false;
    for c in stripped.trim().chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if !(c.is_ascii_alphanumeric() || c == '_') {
            continue;
        }
        if pending_space && !sanitized.is_empty() {
            sanitized.push('_');
        }
        pending_space = false;
        sanitized.push(c);
    }

    sanitized.truncate(MAX_FILENAME_LEN);

    if sanitized.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Lower-cased extension (without the dot) when it looks like one.
pub fn file_extension(file_name: &str) -> Option<String> {
    let (_, extension) = split_extension(file_name);
    extension
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| ext.to_ascii_lowercase())
}

/// `{userId}/{category}/{timestamp}_{sanitizedName}[.ext]`
pub fn asset_object_path(
    owner_id: Uuid,
    slot: AssetSlot,
    timestamp_millis: i64,
    file_name: &str,
) -> String {
    let sanitized = sanitize_filename(file_name);
    match file_extension(file_name) {
        Some(ext) => format!(
            "{}/{}/{}_{}.{}",
            owner_id,
            slot.category(),
            timestamp_millis,
            sanitized,
            ext
        ),
        None => format!(
            "{}/{}/{}_{}",
            owner_id,
            slot.category(),
            timestamp_millis,
            sanitized
        ),
    }
}

/// Content type for an uploaded file. A specific declared type wins over the guess
/// from the file name.
pub fn content_type_for(file_name: &str, declared: Option<&str>) -> String {
    match declared.map(str::trim) {
        Some(declared) if !declared.is_empty() && declared != "application/octet-stream" => {
            declared.to_string()
        }
        _ => MimeGuess::from_path(file_name)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string(),
    }
}

fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    match base.rfind('.') {
        Some(idx) if idx > 0 => (&base[..idx], Some(&base[idx + 1..])),
        _ => (base, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics_punctuation_and_extension() {
        assert_eq!(sanitize_filename("Über Beat (Final) v2.wav"), "Uber_Beat_Final_v2");
    }

    #[test]
    fn sanitizing_is_idempotent() {
        for raw in [
            "Über Beat (Final) v2.wav",
            "  trap   loop ñandú 140bpm .mp3",
            "stems.final.zip",
            "***",
        ] {
            let once = sanitize_filename(raw);
            assert_eq!(sanitize_filename(&once), once, "input: {raw}");
        }
    }

    #[test]
    fn long_names_are_truncated() {
        let raw = format!("{}.wav", "a".repeat(250));
        assert_eq!(sanitize_filename(&raw).len(), 100);
    }

    #[test]
    fn empty_result_falls_back() {
        assert_eq!(sanitize_filename("(((.png"), "file");
        assert_eq!(sanitize_filename(""), "file");
    }

    #[test]
    fn content_type_prefers_declared_type() {
        assert_eq!(content_type_for("beat.mp3", Some("audio/mpeg")), "audio/mpeg");
        assert_eq!(content_type_for("cover.png", Some("application/octet-stream")), "image/png");
        assert_eq!(content_type_for("unknown", None), "application/octet-stream");
    }

    #[test]
    fn hidden_file_keeps_its_name() {
        assert_eq!(sanitize_filename(".env"), "env");
        assert_eq!(file_extension(".env"), None);
    }

    #[test]
    fn object_path_follows_bucket_layout() {
        let owner_id = Uuid::nil();
        let path = asset_object_path(owner_id, AssetSlot::Stems, 1_700_000_000_000, "My Stems.ZIP");
        assert_eq!(
            path,
            "00000000-0000-0000-0000-000000000000/stems/1700000000000_My_Stems.zip"
        );
    }
}
