//! Path templating for work folder organization.
//!
//! Converts [`WorkMetadata`] into deterministic relative paths using
//! user-configured [upon] templates. The template syntax follows upon's
//! Mustache-like conventions (`{{ variable }}`, `{{ value|formatter }}`,
//! `{% if value %}...{% endif %}`), extended with path-specific formatters and
//! functions:
//!
//! - **`sanitize`**: Replaces path separators (and NUL) with `_`, then trims
//!   surrounding whitespace and trailing dots. Use it on every free-text
//!   field, otherwise a `/` in a work's name becomes a directory.
//! - **`slug`**: Converts strings to URL-safe slugs, stripping quotation marks
//!   first to avoid artifacts like leading/trailing hyphens.
//! - **`truncate`**: Truncates strings to a maximum byte length at a character
//!   boundary, usable as either `truncate(value, n)` or `{{ value|truncate: n }}`.
//!
//! # Template Variables
//!
//! | Variable | Type             | Description                    |
//! |----------|------------------|--------------------------------|
//! | `id`     | `String`         | Catalog code, e.g. `RJ123456`  |
//! | `name`   | `String`         | Work title                     |
//! | `maker`  | `String`         | Circle/brand that published it |
//! | `series` | `Option<String>` | Series name, if the work has one |
//!
//! # Example
//!
//! ```
//! use dlorg_library::{DEFAULT_TEMPLATE, PathGenerator};
//! use dlorg_extract::models::WorkMetadata;
//! use std::path::Path;
//!
//! let metadata = WorkMetadata {
//!     id: "RJ111111".parse().unwrap(),
//!     name: "Foo".into(),
//!     maker: "Bar".into(),
//!     series: None,
//! };
//! let generator: PathGenerator = DEFAULT_TEMPLATE.parse().unwrap();
//! assert_eq!(generator.generate(&metadata).unwrap(), Path::new("RJ111111 [Bar] Foo"));
//! ```

use crate::error::{Error, ErrorKind, Result};
use dlorg_extract::models::WorkMetadata;
use dlorg_storage::validate_path;
use exn::ResultExt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::instrument;
use upon::{Engine, Template};

/// Works that belong to a series are grouped in a directory named after it.
pub const DEFAULT_TEMPLATE: &str =
    "{% if series %}{{ series|sanitize }}/{% endif %}{{ id }} [{{ maker|sanitize }}] {{ name|sanitize }}";

/// Longest file name most filesystems accept, in bytes.
const MAX_COMPONENT_BYTES: usize = 255;

/// Generates deterministic relative paths from [`WorkMetadata`] and a
/// user-defined template string.
///
/// Constructed via [`FromStr`], which compiles the template eagerly so that
/// syntax errors surface at creation time rather than at render time. The
/// compiled template is reusable across many [`generate`](Self::generate) calls.
///
/// Generated paths are normalized (trimmed, deduplicated separators) and
/// validated by [`dlorg_storage::validate_path`] to prevent directory traversal.
pub struct PathGenerator {
    engine: Engine<'static>,
    template: Template<'static>,
}
impl FromStr for PathGenerator {
    type Err = Error;

    /// Compiles the given template string into a reusable [`PathGenerator`].
    ///
    /// Registers the `sanitize` and `slug` formatters and the `truncate`
    /// function before compiling. Returns [`ErrorKind::Template`] if the
    /// template syntax is invalid.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        // Compile the template early so we can fail-fast in construction.
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }
}
impl PathGenerator {
    /// Renders the template against the given [`WorkMetadata`], returning the
    /// normalized relative path of the work's folder.
    ///
    /// The resulting path is trimmed, segment-wise normalized, and validated to
    /// ensure it stays within the library root (no directory traversal).
    #[instrument(skip_all, fields(id = %metadata.id))]
    pub fn generate(&self, metadata: &WorkMetadata) -> Result<PathBuf> {
        let path = self
            .template
            .render(&self.engine, Self::parameters(metadata))
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        Self::normalize(path)
    }

    /// Trims each path segment, joins them with `/`, then validates via
    /// [`dlorg_storage::validate_path`]. Segments longer than
    /// [`MAX_COMPONENT_BYTES`] are rejected.
    fn normalize(s: impl Into<String>) -> Result<PathBuf> {
        let path = s.into().trim().split('/').map(str::trim).collect::<Vec<_>>().join("/");
        let path = validate_path(&path).or_raise(|| ErrorKind::Template)?;
        if path.components().any(|c| c.as_os_str().len() > MAX_COMPONENT_BYTES) {
            exn::bail!(ErrorKind::Template);
        }
        Ok(path)
    }

    /// Builds the [`upon::Value`] map exposed to the template engine.
    fn parameters(metadata: &WorkMetadata) -> upon::Value {
        upon::value! {
            id: metadata.id.as_str(),
            name: &metadata.name,
            maker: &metadata.maker,
            series: metadata.series.as_deref(),
        }
    }
}

/// Custom [`upon`] extensions for path-safe string manipulation.
mod addons {
    use rslug::slugify;
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    /// Makes a value safe to use as (part of) a single path component.
    pub(super) fn sanitize(s: &str) -> String {
        let replaced: String = s.chars().map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c }).collect();
        // Trailing dots are stripped by some filesystems, and a lone ".." must
        // never survive as a component.
        replaced.trim().trim_end_matches('.').trim_end().to_string()
    }

    fn sanitize_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", sanitize(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Custom formatter that converts strings to URL-safe slugs.
    ///
    /// Strips quotation marks before slugifying to avoid awkward slug output
    /// like `"hello"` becoming `-hello-`.
    fn slug_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => {
                // Various quotation marks: '"''""„"`«» and the CJK brackets
                // that titles on the storefront are fond of.
                let marks = [
                    '\u{0027}', '\u{0022}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201B}',
                    '\u{0060}', '\u{00AB}', '\u{00BB}', '\u{2039}', '\u{203A}', '\u{300C}', '\u{300D}', '\u{300E}',
                    '\u{300F}',
                ];
                let stripped: String = s.chars().filter(|c| !marks.contains(c)).collect();
                write!(f, "{}", slugify!(&stripped))?
            },
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Truncates a string to a maximum byte length at a character boundary.
    ///
    /// This prevents cutting UTF-8 characters in the middle, which would produce
    /// invalid strings. Japanese titles are three bytes per character, so the
    /// limit is in bytes to match filesystem name limits.
    fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> String {
        s[..s.floor_char_boundary(max_bytes)].to_string()
    }

    /// Registers the `sanitize` and `slug` formatters and `truncate` function
    /// on the given engine.
    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("sanitize", sanitize_formatter);
        engine.add_formatter("slug", slug_formatter);
        engine.add_function("truncate", truncate_to_char_boundary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::Path;

    fn make_metadata(id: &str, name: &str, maker: &str, series: Option<&str>) -> WorkMetadata {
        WorkMetadata {
            id: id.parse().unwrap(),
            name: name.to_string(),
            maker: maker.to_string(),
            series: series.map(str::to_string),
        }
    }

    #[test]
    fn test_default_template_without_series() {
        let generator: PathGenerator = DEFAULT_TEMPLATE.parse().unwrap();
        let path = generator.generate(&make_metadata("RJ111111", "Foo", "Bar", None)).unwrap();
        assert_eq!(path, Path::new("RJ111111 [Bar] Foo"));
    }

    #[test]
    fn test_default_template_with_series() {
        let generator: PathGenerator = DEFAULT_TEMPLATE.parse().unwrap();
        let path = generator.generate(&make_metadata("RJ111111", "Foo", "Bar", Some("Saga"))).unwrap();
        assert_eq!(path, Path::new("Saga/RJ111111 [Bar] Foo"));
    }

    #[test]
    fn test_default_template_sanitizes_separators() {
        let generator: PathGenerator = DEFAULT_TEMPLATE.parse().unwrap();
        let metadata = make_metadata("RJ111111", "Yes/No", "A\\B", Some("../.."));
        let path = generator.generate(&metadata).unwrap();
        // The series sanitizes to ".._" and does not escape the root.
        assert_eq!(path, Path::new(".._/RJ111111 [A_B] Yes_No"));
        assert_eq!(path.components().count(), 2);
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("  padded  ", "padded")]
    #[case("a/b", "a_b")]
    #[case("a\\b", "a_b")]
    #[case("nul\0byte", "nul_byte")]
    #[case("ends with dots...", "ends with dots")]
    #[case("dot then space. ", "dot then space")]
    #[case("..", "")]
    #[case("日本語/タイトル", "日本語_タイトル")]
    fn test_sanitize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(addons::sanitize(input), expected);
    }

    #[test]
    fn test_name_that_sanitizes_to_nothing() {
        let generator: PathGenerator = "{{ name|sanitize }}".parse().unwrap();
        let err = generator.generate(&make_metadata("RJ111111", "...", "Bar", None)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }

    #[rstest]
    #[case::at_limit(85, true)]
    #[case::over_limit(86, false)]
    fn test_component_length_limit(#[case] chars: usize, #[case] ok: bool) {
        // Three bytes per character.
        let generator: PathGenerator = "Saga/{{ name }}".parse().unwrap();
        let result = generator.generate(&make_metadata("RJ111111", &"長".repeat(chars), "Bar", None));
        match result {
            Ok(path) => assert!(ok && path.starts_with("Saga")),
            Err(err) => assert!(!ok && matches!(&*err, ErrorKind::Template)),
        }
    }

    #[test]
    fn test_segments_are_trimmed() {
        let generator: PathGenerator = " {{ maker }} / {{ id }} ".parse().unwrap();
        let path = generator.generate(&make_metadata("RJ111111", "Foo", "Bar", None)).unwrap();
        assert_eq!(path, Path::new("Bar/RJ111111"));
    }

    #[test]
    fn test_invalid_template_fails_at_construction() {
        assert!("{{ id ".parse::<PathGenerator>().is_err());
        assert!("{% if series %}unterminated".parse::<PathGenerator>().is_err());
    }

    #[test]
    fn test_unknown_variable_fails_at_render() {
        let generator: PathGenerator = "{{ rating }}".parse().unwrap();
        assert!(generator.generate(&make_metadata("RJ111111", "Foo", "Bar", None)).is_err());
    }

    #[test]
    fn test_slug_strips_quotes() {
        let generator: PathGenerator = "{{ id }}-{{ name|slug }}".parse().unwrap();
        let metadata = make_metadata("RJ111111", "\"Hello\" World's 'Test'", "Bar", None);
        assert_eq!(generator.generate(&metadata).unwrap(), Path::new("RJ111111-hello-worlds-test"));
    }

    #[test]
    fn test_truncate_classic_function() {
        let generator: PathGenerator = "{{ truncate(name, 10)|slug }}".parse().unwrap();
        let metadata = make_metadata("RJ111111", "A Very Long Title Indeed", "Bar", None);
        // "A Very Lon" truncated to 10 bytes, then slugified
        assert_eq!(generator.generate(&metadata).unwrap(), Path::new("a-very-lon"));
    }

    #[test]
    fn test_truncate_filter_function_on_multibyte() {
        let generator: PathGenerator = "{{ name|truncate: 7|sanitize }}".parse().unwrap();
        let metadata = make_metadata("RJ111111", "日本語タイトル", "Bar", None);
        // Seven bytes lands inside the third character; only two survive.
        assert_eq!(generator.generate(&metadata).unwrap(), Path::new("日本"));
    }
}
