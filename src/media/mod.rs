//! Attachment codec.
//!
//! Images and voice notes are stored inside entries as self-describing text
//! tokens of the form `data:<mime>;base64,<payload>`. The token carries both the
//! media type and the bytes, so it can be decoded back without any side-channel
//! metadata, and it only contains printable ASCII, which keeps it safe inside the
//! JSON snapshot.
//!
//! # Example
//!
//! ```
//! use soulpages::media::{self, MediaType};
//!
//! let png = MediaType::new("image/png")?;
//! let token = media::encode(b"\x89PNG", &png);
//! assert!(token.starts_with("data:image/png;base64,"));
//!
//! let (bytes, media_type) = media::decode(&token)?;
//! assert_eq!(bytes, b"\x89PNG");
//! assert_eq!(media_type, png);
//! # Ok::<(), soulpages::errors::MediaError>(())
//! ```

use crate::constants::{TOKEN_BASE64_MARKER, TOKEN_PREFIX};
use crate::errors::MediaError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;
use std::path::Path;

/// The two attachment sequences an entry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    /// Pictures, stored in `Entry::images`.
    Image,
    /// Voice recordings, stored in `Entry::audios`.
    Audio,
}

impl AttachmentKind {
    /// The top-level MIME type accepted for this kind.
    pub fn mime_family(self) -> &'static str {
        match self {
            AttachmentKind::Image => "image",
            AttachmentKind::Audio => "audio",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_family())
    }
}

/// A validated image or audio MIME type, optionally with parameters
/// (`audio/webm;codecs=opus`).
///
/// The type and subtype are lowercased on construction; parameters are kept as
/// given so tokens produced by other recorders survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    mime: String,
    kind: AttachmentKind,
}

impl MediaType {
    /// Parses a MIME string, accepting only `image/*` and `audio/*`.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::UnsupportedMedia` for any other top-level type or a
    /// string that is not shaped like `type/subtype[;param=value]*`.
    pub fn new(mime: &str) -> Result<Self, MediaError> {
        let mut parts = mime.split(';');
        let essence = parts.next().unwrap_or_default().trim().to_ascii_lowercase();

        let (family, subtype) = essence
            .split_once('/')
            .ok_or_else(|| MediaError::UnsupportedMedia(mime.to_string()))?;

        let kind = match family {
            "image" => AttachmentKind::Image,
            "audio" => AttachmentKind::Audio,
            _ => return Err(MediaError::UnsupportedMedia(mime.to_string())),
        };

        if subtype.is_empty() || !subtype.chars().all(is_mime_char) {
            return Err(MediaError::UnsupportedMedia(mime.to_string()));
        }

        let mut normalized = essence.clone();
        for param in parts {
            let param = param.trim();
            match param.split_once('=') {
                Some((name, value))
                    if !name.is_empty()
                        && !value.is_empty()
                        && name.chars().all(is_mime_char)
                        && value.chars().all(is_mime_char) =>
                {
                    normalized.push(';');
                    normalized.push_str(param);
                }
                _ => return Err(MediaError::UnsupportedMedia(mime.to_string())),
            }
        }

        Ok(MediaType {
            mime: normalized,
            kind,
        })
    }

    /// Guesses the media type of a file from its extension.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::UnsupportedMedia` when the extension is missing or is
    /// not a known image or audio format.
    pub fn from_path(path: &Path) -> Result<Self, MediaError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| MediaError::UnsupportedMedia(path.display().to_string()))?;

        let mime = match extension.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            "svg" => "image/svg+xml",
            "heic" => "image/heic",
            "avif" => "image/avif",
            "webm" => "audio/webm",
            "ogg" | "oga" => "audio/ogg",
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            "m4a" => "audio/mp4",
            "aac" => "audio/aac",
            "flac" => "audio/flac",
            other => return Err(MediaError::UnsupportedMedia(format!(".{}", other))),
        };

        MediaType::new(mime)
    }

    /// Which attachment sequence this media type belongs in.
    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    /// The normalized MIME string.
    pub fn as_str(&self) -> &str {
        &self.mime
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mime)
    }
}

fn is_mime_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-' | '_')
}

/// Summary of a token, used for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    /// The media type carried in the token header
    pub media_type: MediaType,
    /// Size of the decoded payload in bytes
    pub payload_len: usize,
}

/// Encodes a payload as a `data:` token.
///
/// Only validated media types can be encoded, so an unsupported payload is
/// rejected when its `MediaType` is built.
pub fn encode(bytes: &[u8], media_type: &MediaType) -> String {
    format!(
        "{}{}{}{}",
        TOKEN_PREFIX,
        media_type.as_str(),
        TOKEN_BASE64_MARKER,
        STANDARD.encode(bytes)
    )
}

/// Decodes a token back into its payload and media type.
///
/// # Errors
///
/// Returns `MediaError::MalformedToken` if the token lacks the `data:` prefix or
/// the `;base64,` marker, carries an unsupported media type, or has an invalid
/// base64 payload.
pub fn decode(token: &str) -> Result<(Vec<u8>, MediaType), MediaError> {
    let (media_type, payload) = split_token(token)?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| MediaError::MalformedToken(format!("invalid base64 payload: {}", e)))?;
    Ok((bytes, media_type))
}

/// Checks that a token is well formed and returns its media type.
///
/// The payload is run through the same base64 engine as [`decode`], so
/// non-canonical padding bits are rejected here too.
///
/// # Errors
///
/// Returns `MediaError::MalformedToken` under the same conditions as [`decode`].
pub fn validate(token: &str) -> Result<MediaType, MediaError> {
    let (_, media_type) = decode(token)?;
    Ok(media_type)
}

/// Decodes a token and reports its media type and payload size.
///
/// # Errors
///
/// Same as [`decode`].
pub fn inspect(token: &str) -> Result<TokenInfo, MediaError> {
    let (bytes, media_type) = decode(token)?;
    Ok(TokenInfo {
        media_type,
        payload_len: bytes.len(),
    })
}

fn split_token(token: &str) -> Result<(MediaType, &str), MediaError> {
    let rest = token
        .strip_prefix(TOKEN_PREFIX)
        .ok_or_else(|| MediaError::MalformedToken("missing 'data:' prefix".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| MediaError::MalformedToken("missing payload separator".to_string()))?;

    let mime = header
        .strip_suffix(&TOKEN_BASE64_MARKER[..TOKEN_BASE64_MARKER.len() - 1])
        .ok_or_else(|| MediaError::MalformedToken("payload is not base64 encoded".to_string()))?;

    let media_type = MediaType::new(mime).map_err(|e| match e {
        MediaError::UnsupportedMedia(mime) => {
            MediaError::MalformedToken(format!("unsupported media type '{}'", mime))
        }
        other => other,
    })?;

    Ok((media_type, payload))
}
