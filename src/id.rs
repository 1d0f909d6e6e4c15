//! Message id resolution.
//!
//! Sites that declare message content but no static `id` still need one. The
//! resolution chain is: explicit static id, then the host's override function,
//! then the id interpolation pattern. When none of these can produce an id the
//! pass fails with a configuration error (handled by the visitor).
//!
//! The interpolation pattern mirrors the webpack `interpolateName` mini
//! language: `[folder]`, `[name]` and `[ext]` come from the file path, and
//! `[<algo>:contenthash:<digest>:<len>]` digests the message content. The
//! digest content is `defaultMessage`, or `defaultMessage + "#" + description`
//! when a description is present, so two identical messages with different
//! descriptions get distinct generated ids.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256, Sha512};

static HASH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(?:([^:\]]+):)?(?:hash|contenthash)(?::([a-z]+\d*))?(?::(\d+))?\]").unwrap()
});

/// Build the content string the `contenthash` placeholder digests.
pub fn hash_content(default_message: &str, description: Option<&str>) -> String {
    match description {
        Some(description) => format!("{}#{}", default_message, description),
        None => default_message.to_string(),
    }
}

/// Expand an id interpolation pattern for one message.
///
/// `content` is the [`hash_content`] of the message. Unknown `[...]` tokens
/// are left as-is.
pub fn interpolate_pattern(pattern: &str, file_path: &str, content: &str) -> String {
    let path = Path::new(file_path);
    let folder = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    let id = HASH_RE.replace_all(pattern, |caps: &regex::Captures| {
        let algorithm = caps.get(1).map(|m| m.as_str()).unwrap_or("sha512");
        let length = caps.get(3).and_then(|m| m.as_str().parse::<usize>().ok());
        digest(algorithm, content, length)
    });

    id.replace("[folder]", folder)
        .replace("[name]", name)
        .replace("[ext]", ext)
}

/// Hex digest of `content`, truncated to `length` when given. Unrecognized
/// algorithm names fall back to sha512, the pattern language's default.
fn digest(algorithm: &str, content: &str, length: Option<usize>) -> String {
    let mut hex = match algorithm.to_ascii_lowercase().as_str() {
        "sha256" => {
            let mut hasher = Sha256::new();
            hasher.update(content.as_bytes());
            format!("{:x}", hasher.finalize())
        }
        _ => {
            let mut hasher = Sha512::new();
            hasher.update(content.as_bytes());
            format!("{:x}", hasher.finalize())
        }
    };
    if let Some(length) = length
        && length < hex.len()
    {
        hex.truncate(length);
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_content_without_description() {
        assert_eq!(hash_content("Hello World!", None), "Hello World!");
    }

    #[test]
    fn test_hash_content_with_description() {
        assert_eq!(
            hash_content("Hello World!", Some("Greeting to the world")),
            "Hello World!#Greeting to the world"
        );
    }

    #[test]
    fn test_contenthash_sha512_truncated() {
        assert_eq!(
            interpolate_pattern("[sha512:contenthash:hex:6]", "src/App.tsx", "Hello World!"),
            "861844"
        );
    }

    #[test]
    fn test_contenthash_defaults_to_sha512() {
        assert_eq!(
            interpolate_pattern("[contenthash:hex:12]", "src/App.tsx", "Hello World!"),
            "861844d6704e"
        );
    }

    #[test]
    fn test_contenthash_sha256() {
        assert_eq!(
            interpolate_pattern("[sha256:contenthash:hex:8]", "src/App.tsx", "Hello World!"),
            "7f83b165"
        );
    }

    #[test]
    fn test_hash_alias() {
        assert_eq!(
            interpolate_pattern("[sha512:hash:hex:6]", "src/App.tsx", "Hello"),
            "3615f8"
        );
    }

    #[test]
    fn test_path_placeholders() {
        assert_eq!(
            interpolate_pattern(
                "[folder].[name].[sha512:contenthash:hex:6]",
                "app/components/Greeting.tsx",
                "Hello World!"
            ),
            "components.Greeting.861844"
        );
        assert_eq!(
            interpolate_pattern("[name].[ext]", "src/App.tsx", ""),
            "App.tsx"
        );
    }

    #[test]
    fn test_description_changes_generated_id() {
        let plain = interpolate_pattern(
            "[sha512:contenthash:hex:6]",
            "src/App.tsx",
            &hash_content("Hello World!", None),
        );
        let described = interpolate_pattern(
            "[sha512:contenthash:hex:6]",
            "src/App.tsx",
            &hash_content("Hello World!", Some("Greeting to the world")),
        );
        assert_eq!(plain, "861844");
        assert_eq!(described, "72f020");
        assert_ne!(plain, described);
    }
}
