//! Path template compilation.
//!
//! Templates use `{name}`, `{name:type}`, `{name?}` and `{name:type?}`
//! placeholders. Each placeholder, together with the slash before it, becomes
//! a named capture group:
//!
//! | Placeholder | Compiled |
//! |-------------|----------|
//! | `/{id:int}` | `/(?P<id>[0-9]+)` |
//! | `/{name:alpha}` | `/(?P<name>[a-zA-Z]+)` |
//! | `/{ref}` | `/(?P<ref>[a-zA-Z0-9-+_]+)` |
//! | `/{slug?}` | `(?:/(?P<slug>[a-zA-Z0-9-+_]+))?` |
//!
//! Unknown types use the default class. Anything that is not a placeholder is
//! copied through unchanged, and a template that already contains a named
//! group is returned as-is.

use regex::{Captures, Regex};
use restfluent_core::{RouteError, RouteResult};
use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

/// Character class for `{name:int}`.
pub const INT_CLASS: &str = "[0-9]+";
/// Character class for `{name:alpha}`.
pub const ALPHA_CLASS: &str = "[a-zA-Z]+";
/// Character class for untyped or unknown-typed placeholders.
pub const DEFAULT_CLASS: &str = "[a-zA-Z0-9-+_]+";

/// Marker of an already-compiled named group.
const NAMED_GROUP: &str = "(?P<";

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"/\{([A-Za-z0-9_]+)(?::([A-Za-z0-9_]+))?(\?)?\}")
            .expect("placeholder pattern is a valid regex")
    })
}

/// Returns the capture class for a placeholder type.
pub fn type_class(kind: &str) -> &'static str {
    match kind {
        "int" => INT_CLASS,
        "alpha" => ALPHA_CLASS,
        _ => DEFAULT_CLASS,
    }
}

/// Compiles a path template into a pattern with named capture groups.
///
/// # Example
///
/// ```
/// use restfluent_router::compile_path;
///
/// assert_eq!(compile_path("/product/{id:int}"), "/product/(?P<id>[0-9]+)");
/// assert_eq!(
///     compile_path("/category/{slug?}"),
///     "/category(?:/(?P<slug>[a-zA-Z0-9-+_]+))?"
/// );
/// ```
pub fn compile_path(template: &str) -> String {
    compile(template).into_owned()
}

fn compile(template: &str) -> Cow<'_, str> {
    if template.contains(NAMED_GROUP) {
        return Cow::Borrowed(template);
    }

    placeholder().replace_all(template, |caps: &Captures<'_>| {
        let name = &caps[1];
        let class = type_class(caps.get(2).map_or("", |m| m.as_str()));
        if caps.get(3).is_some() {
            format!("(?:/(?P<{name}>{class}))?")
        } else {
            format!("/(?P<{name}>{class})")
        }
    })
}

/// A compiled path pattern and the parameter names it captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPath {
    template: String,
    pattern: String,
    params: Vec<String>,
}

impl CompiledPath {
    /// Compiles a template.
    pub fn compile(template: &str) -> Self {
        let pattern = compile_path(template);
        let params = param_names_of(&pattern);
        Self {
            template: template.to_string(),
            pattern,
            params,
        }
    }

    /// Returns the template as declared.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the compiled pattern.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns the captured parameter names in left-to-right order.
    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    /// Returns the full route under a namespace prefix, e.g. `/v1/users/(?P<id>[0-9]+)`.
    pub fn full_route(&self, prefix: &str) -> String {
        let prefix = prefix.trim_matches('/');
        let pattern = self.pattern.as_str();
        let needs_slash =
            !pattern.is_empty() && !pattern.starts_with('/') && !pattern.starts_with("(?:/");

        let mut route = String::with_capacity(prefix.len() + pattern.len() + 2);
        if !prefix.is_empty() {
            route.push('/');
            route.push_str(prefix);
        }
        if needs_slash || (route.is_empty() && pattern.is_empty()) {
            route.push('/');
        }
        match pattern.strip_prefix("(?:/") {
            // Leading optional segment at the root: `/` must still match.
            Some(rest) if route.is_empty() => {
                route.push_str("/(?:");
                route.push_str(rest);
            }
            _ => route.push_str(pattern),
        }
        route
    }

    /// Builds an anchored matcher for the full route under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] if a hand-written pattern is not
    /// a valid regular expression.
    pub fn matcher(&self, prefix: &str) -> RouteResult<Regex> {
        let full = self.full_route(prefix);
        Regex::new(&format!("^{full}$"))
            .map_err(|e| RouteError::invalid_pattern(full, e.to_string()))
    }
}

impl fmt::Display for CompiledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl From<&str> for CompiledPath {
    fn from(template: &str) -> Self {
        Self::compile(template)
    }
}

fn param_names_of(pattern: &str) -> Vec<String> {
    pattern
        .match_indices(NAMED_GROUP)
        .filter_map(|(start, _)| {
            let rest = &pattern[start + NAMED_GROUP.len()..];
            rest.find('>').map(|end| rest[..end].to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_typed_placeholders() {
        assert_eq!(compile_path("/product/{id:int}"), "/product/(?P<id>[0-9]+)");
        assert_eq!(compile_path("/user/{name:alpha}"), "/user/(?P<name>[a-zA-Z]+)");
        assert_eq!(
            compile_path("/invoice/{ref}"),
            "/invoice/(?P<ref>[a-zA-Z0-9-+_]+)"
        );
    }

    #[test]
    fn test_unknown_type_uses_default_class() {
        assert_eq!(
            compile_path("/file/{name:uuid}"),
            "/file/(?P<name>[a-zA-Z0-9-+_]+)"
        );
    }

    #[test]
    fn test_optional_placeholder_absorbs_slash() {
        assert_eq!(
            compile_path("/category/{slug?}"),
            "/category(?:/(?P<slug>[a-zA-Z0-9-+_]+))?"
        );
        assert_eq!(
            compile_path("/archive/{year:int}/{month:int?}"),
            "/archive/(?P<year>[0-9]+)(?:/(?P<month>[0-9]+))?"
        );
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(compile_path("/health"), "/health");
        assert_eq!(compile_path("/broken/{id"), "/broken/{id");
        assert_eq!(compile_path("/bad/{na-me}"), "/bad/{na-me}");

        let native = "/product/(?P<id>\\d+)/{keep}";
        assert_eq!(compile_path(native), native);
    }

    #[test]
    fn test_compile_is_idempotent() {
        let once = compile_path("/users/{id:int}/posts/{slug?}");
        assert_eq!(compile_path(&once), once);
    }

    #[test]
    fn test_param_names() {
        let path = CompiledPath::compile("/orgs/{org}/repos/{repo:alpha}/{tag?}");
        assert_eq!(path.param_names(), ["org", "repo", "tag"]);
        assert_eq!(path.template(), "/orgs/{org}/repos/{repo:alpha}/{tag?}");
    }

    #[test]
    fn test_full_route() {
        let path = CompiledPath::compile("/users/{id:int}");
        assert_eq!(path.full_route("v1"), "/v1/users/(?P<id>[0-9]+)");
        assert_eq!(path.full_route("/v1/"), "/v1/users/(?P<id>[0-9]+)");
        assert_eq!(path.full_route(""), "/users/(?P<id>[0-9]+)");

        assert_eq!(CompiledPath::compile("users").full_route("v1"), "/v1/users");
        assert_eq!(
            CompiledPath::compile("/{slug?}").full_route("v1"),
            "/v1(?:/(?P<slug>[a-zA-Z0-9-+_]+))?"
        );
    }

    #[test]
    fn test_matcher_captures() {
        let matcher = CompiledPath::compile("/category/{slug?}").matcher("v1").unwrap();

        let caps = matcher.captures("/v1/category/rust-lang").unwrap();
        assert_eq!(&caps["slug"], "rust-lang");
        assert!(matcher.captures("/v1/category").unwrap().name("slug").is_none());
        assert!(!matcher.is_match("/v1/category/"));
        assert!(!matcher.is_match("/v2/category/x"));
    }

    #[test]
    fn test_root_optional_segment_without_prefix() {
        let path = CompiledPath::compile("/{slug?}");
        assert_eq!(path.full_route(""), "/(?:(?P<slug>[a-zA-Z0-9-+_]+))?");

        let matcher = path.matcher("").unwrap();
        assert!(matcher.is_match("/"));
        assert_eq!(&matcher.captures("/intro").unwrap()["slug"], "intro");
        assert!(!matcher.is_match(""));
        assert!(!matcher.is_match("//intro"));
    }

    #[test]
    fn test_default_class_allows_plus_and_dash() {
        let matcher = CompiledPath::compile("/tag/{name}").matcher("v1").unwrap();
        assert!(matcher.is_match("/v1/tag/c++_x-1"));
        assert!(!matcher.is_match("/v1/tag/a.b"));
    }

    #[test]
    fn test_invalid_native_pattern() {
        let path = CompiledPath::compile("/x/(?P<id>[0-9+");
        assert!(matches!(
            path.matcher("v1"),
            Err(RouteError::InvalidPattern { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_int_group_accepts_digits_only(
            name in "[a-z]{1,8}",
            digits in "[0-9]{1,12}",
            junk in "[0-9]{0,4}[a-zA-Z][0-9a-zA-Z]{0,4}",
        ) {
            let template = format!("/item/{{{name}:int}}");
            let matcher = CompiledPath::compile(&template).matcher("").unwrap();

            let path = format!("/item/{digits}");
            let caps = matcher.captures(&path);
            prop_assert!(caps.is_some());
            prop_assert_eq!(&caps.unwrap()[name.as_str()], digits.as_str());

            let rejected = format!("/item/{junk}");
            prop_assert!(!matcher.is_match(&rejected));
        }

        #[test]
        fn prop_no_double_slash(
            segments in proptest::collection::vec(
                ("[a-z]{1,6}", prop_oneof![Just(""), Just(":int"), Just(":alpha"), Just(":x")], any::<bool>()),
                1..6,
            ),
        ) {
            let template: String = segments
                .iter()
                .enumerate()
                .map(|(i, (name, kind, optional))| {
                    let q = if *optional { "?" } else { "" };
                    format!("/seg{i}/{{{name}{i}{kind}{q}}}")
                })
                .collect();

            let compiled = compile_path(&template);
            prop_assert!(!compiled.contains("//"), "{}", compiled);
            prop_assert!(!compiled.contains('{'), "{}", compiled);
        }
    }
}
