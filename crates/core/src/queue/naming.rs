//! Artifact filename convention.
//!
//! The destination identifier is base64-encoded (url-safe alphabet, no
//! padding) so any chat id embeds losslessly in a filename. The uniqueness
//! token never contains `_`, which makes the name parseable from the right
//! even though the encoded destination may itself contain `_`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::extractor::TransformKind;

/// Prefix of every artifact file.
pub const FILE_PREFIX: &str = "tgbot_";

/// Marker appended to the stem once an artifact is fully written.
pub const FINISHED_MARKER: &str = "tgok";

/// Errors that can occur while parsing an artifact filename.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamingError {
    #[error("filename does not start with '{FILE_PREFIX}'")]
    MissingPrefix,

    #[error("filename has no extension")]
    MissingExtension,

    #[error("unknown artifact extension: {ext}")]
    UnknownExtension { ext: String },

    #[error("filename carries no completion marker")]
    NotFinished,

    #[error("filename has no uniqueness token")]
    MissingToken,

    #[error("destination token is not decodable: {reason}")]
    BadDestination { reason: String },
}

/// Encodes a destination identifier as a filename-safe token.
pub fn encode_destination(destination: i64) -> String {
    URL_SAFE_NO_PAD.encode(destination.to_string())
}

/// Decodes a destination token back to the identifier.
pub fn decode_destination(token: &str) -> Result<i64, NamingError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| NamingError::BadDestination {
            reason: e.to_string(),
        })?;
    let text = String::from_utf8(bytes).map_err(|e| NamingError::BadDestination {
        reason: e.to_string(),
    })?;
    text.parse().map_err(|_| NamingError::BadDestination {
        reason: format!("not a chat id: {text:?}"),
    })
}

/// Builds the working (unmarked) filename for an artifact.
pub fn working_file_name(destination: i64, uniqueness: &str, kind: TransformKind) -> String {
    format!(
        "{FILE_PREFIX}{}_{uniqueness}.{}",
        encode_destination(destination),
        kind.extension()
    )
}

/// Completion-marked sibling of a working path.
pub fn finished_path(working: &Path) -> PathBuf {
    let stem = working
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let ext = working
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    working.with_file_name(format!("{stem}_{FINISHED_MARKER}.{ext}"))
}

/// Parses a completion-marked filename into its routing metadata.
///
/// Returns `NamingError::NotFinished` for in-progress names; callers must
/// treat those as invisible rather than malformed.
pub fn parse_finished_name(name: &str) -> Result<(i64, TransformKind), NamingError> {
    let rest = name
        .strip_prefix(FILE_PREFIX)
        .ok_or(NamingError::MissingPrefix)?;

    let (stem, ext) = rest.rsplit_once('.').ok_or(NamingError::MissingExtension)?;

    let kind = TransformKind::from_extension(ext).ok_or_else(|| NamingError::UnknownExtension {
        ext: ext.to_string(),
    })?;

    let marker_suffix = format!("_{FINISHED_MARKER}");
    let stem = stem
        .strip_suffix(marker_suffix.as_str())
        .ok_or(NamingError::NotFinished)?;

    // Encoded destination first, uniqueness token last; the token never
    // contains '_' so splitting from the right is unambiguous.
    let (encoded, token) = stem.rsplit_once('_').ok_or(NamingError::MissingToken)?;
    if encoded.is_empty() || token.is_empty() {
        return Err(NamingError::MissingToken);
    }

    let destination = decode_destination(encoded)?;
    Ok((destination, kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        for id in [0i64, 42, -42, 123_456_789, -1_001_234_567_890, i64::MAX, i64::MIN] {
            let token = encode_destination(id);
            assert_eq!(decode_destination(&token).unwrap(), id, "id {id}");
        }
    }

    #[test]
    fn test_encoded_destination_is_filename_safe() {
        for id in [-1_001_234_567_890i64, i64::MIN, i64::MAX] {
            let token = encode_destination(id);
            assert!(!token.contains('/'), "token {token}");
            assert!(!token.contains('='), "token {token}");
        }
    }

    #[test]
    fn test_working_file_name_shape() {
        let name = working_file_name(42, "a1b2c3", TransformKind::Video);
        assert!(name.starts_with(FILE_PREFIX));
        assert!(name.ends_with("_a1b2c3.mp4"));
        assert!(!name.contains(FINISHED_MARKER));
    }

    #[test]
    fn test_finished_path_appends_marker() {
        let working = Path::new("/tmp/tgbot_NDI_abc123.mp4");
        let finished = finished_path(working);
        assert_eq!(
            finished,
            Path::new("/tmp/tgbot_NDI_abc123_tgok.mp4").to_path_buf()
        );
    }

    #[test]
    fn test_parse_finished_round_trip() {
        for (id, kind) in [
            (42i64, TransformKind::Video),
            (-1_001_234i64, TransformKind::Audio),
            (7i64, TransformKind::Clip),
        ] {
            let working = working_file_name(id, "0f8fad5b-d9cb-469f-a165-70867728950e", kind);
            let finished = finished_path(Path::new(&working));
            let name = finished.file_name().unwrap().to_str().unwrap();
            assert_eq!(parse_finished_name(name).unwrap(), (id, kind));
        }
    }

    #[test]
    fn test_parse_rejects_unmarked_name() {
        let working = working_file_name(42, "abc123", TransformKind::Video);
        assert_eq!(
            parse_finished_name(&working).unwrap_err(),
            NamingError::NotFinished
        );
    }

    #[test]
    fn test_parse_rejects_foreign_prefix() {
        assert_eq!(
            parse_finished_name("media_NDI_abc_tgok.mp4").unwrap_err(),
            NamingError::MissingPrefix
        );
    }

    #[test]
    fn test_parse_rejects_bad_destination_token() {
        assert!(matches!(
            parse_finished_name("tgbot_%%%_abc_tgok.mp4").unwrap_err(),
            NamingError::BadDestination { .. }
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_extension() {
        let err = parse_finished_name("tgbot_NDI_abc_tgok.mkv").unwrap_err();
        assert!(matches!(err, NamingError::UnknownExtension { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_extension() {
        assert_eq!(
            parse_finished_name("tgbot_NDI_abc_tgok").unwrap_err(),
            NamingError::MissingExtension
        );
    }
}
