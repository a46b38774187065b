//! Folder and asset addressing.
//!
//! Asset ids are slash-delimited paths (`events/2024/poster`). A folder owns
//! an asset only when the id starts with the folder path *plus* a separator,
//! so `events` never claims `events_archive/poster`.
//!
//! Some deployments store the same tree either directly (`events/...`) or
//! below a fixed root segment (`home/events/...`). [`RootAlias`] produces both
//! spellings so walks do not silently skip assets stored under either one.

use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// Validates and normalizes a folder path.
///
/// Leading and trailing separators and surrounding whitespace are dropped.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the path is empty or contains an
/// empty, `.` or `..` segment.
pub fn normalize_folder(path: &str) -> Result<String> {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(Error::invalid_argument("folder path cannot be empty"));
    }

    for segment in trimmed.split('/') {
        match segment.trim() {
            "" => {
                return Err(Error::invalid_argument(format!(
                    "folder path contains an empty segment: {path}"
                )));
            },
            "." | ".." => {
                return Err(Error::invalid_argument(format!(
                    "folder path cannot contain '.' or '..': {path}"
                )));
            },
            _ => {},
        }
    }

    Ok(trimmed.to_string())
}

/// Validates a single folder name (one path segment).
pub fn validate_segment(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid_argument("folder name cannot be empty"));
    }
    if name.contains('/') || name == "." || name == ".." {
        return Err(Error::invalid_argument(format!(
            "folder name must be a single path segment: {name}"
        )));
    }
    Ok(name)
}

/// Returns true iff `candidate_id` lives somewhere below `folder_path`.
///
/// ```
/// use mediafold::paths::is_strict_child;
///
/// assert!(is_strict_child("folder/x", "folder"));
/// assert!(!is_strict_child("folder_suffix/x", "folder"));
/// assert!(!is_strict_child("folder", "folder"));
/// ```
pub fn is_strict_child(candidate_id: &str, folder_path: &str) -> bool {
    candidate_id
        .strip_prefix(folder_path)
        .is_some_and(|rest| rest.len() > 1 && rest.starts_with('/'))
}

/// Moves `candidate_id` from below `from_path` to below `to_path`.
///
/// Returns `None` when the candidate is not a strict child of `from_path`.
///
/// ```
/// use mediafold::paths::rebase;
///
/// assert_eq!(rebase("a/b/img1", "a/b", "a/c").as_deref(), Some("a/c/img1"));
/// assert_eq!(rebase("a/bb/img1", "a/b", "a/c"), None);
/// ```
pub fn rebase(candidate_id: &str, from_path: &str, to_path: &str) -> Option<String> {
    if !is_strict_child(candidate_id, from_path) {
        return None;
    }
    let relative = &candidate_id[from_path.len() + 1..];
    Some(format!("{to_path}/{relative}"))
}

/// Joins a folder path and a child segment.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Last segment of a path.
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Folder part of an asset id, or `None` for ids at the root.
pub fn parent_folder(id: &str) -> Option<&str> {
    id.rsplit_once('/').map(|(parent, _)| parent)
}

/// Direct child folders of `parent` (or of the root) implied by `paths`.
///
/// With `are_folders` false the paths are asset ids, so only their folder
/// part counts; otherwise each path is itself a folder.
pub fn child_folders<'a, I>(paths: I, parent: Option<&str>, are_folders: bool) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut children = BTreeSet::new();
    for path in paths {
        let rest = match parent {
            Some(parent) if is_strict_child(path, parent) => &path[parent.len() + 1..],
            Some(_) => continue,
            None => path,
        };
        let (segment, deeper) = match rest.split_once('/') {
            Some((segment, _)) => (segment, true),
            None => (rest, false),
        };
        if segment.is_empty() || !(deeper || are_folders) {
            continue;
        }
        children.insert(parent.map_or_else(|| segment.to_string(), |p| join(p, segment)));
    }
    children
}

/// Generates the direct and root-aliased spellings of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootAlias {
    token: String,
}

impl Default for RootAlias {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_ROOT_ALIAS)
    }
}

impl RootAlias {
    /// Create an alias rule for the given root segment.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into().trim_matches('/').to_string(),
        }
    }

    /// The root segment.
    pub fn token(&self) -> &str {
        &self.token
    }

    fn prefix(&self) -> String {
        format!("{}/", self.token)
    }

    /// Returns true if `path` is spelled below the root segment.
    pub fn is_aliased(&self, path: &str) -> bool {
        !self.token.is_empty() && path.starts_with(&self.prefix())
    }

    /// `path` without the root segment.
    pub fn unaliased<'a>(&self, path: &'a str) -> &'a str {
        if self.is_aliased(path) {
            &path[self.token.len() + 1..]
        } else {
            path
        }
    }

    /// Every spelling of `path`, original first, without duplicates.
    ///
    /// ```
    /// use mediafold::paths::RootAlias;
    ///
    /// let alias = RootAlias::new("home");
    /// assert_eq!(alias.variants("events"), vec!["events", "home/events"]);
    /// assert_eq!(alias.variants("home/events"), vec!["home/events", "events"]);
    /// ```
    pub fn variants(&self, path: &str) -> Vec<String> {
        let mut variants = vec![path.to_string()];
        if self.token.is_empty() || path == self.token {
            return variants;
        }

        let other = match path.strip_prefix(&self.prefix()) {
            Some(stripped) => stripped.to_string(),
            None => format!("{}{path}", self.prefix()),
        };
        if !other.is_empty() && other != path {
            variants.push(other);
        }
        variants
    }

    /// Computes the target id of `candidate_id` when `from_path` moves to
    /// `to_path`, trying every spelling of `from_path`.
    ///
    /// An id owned by `from_path` as given moves below `to_path` as given.
    /// An id owned by the other spelling keeps that spelling's root segment
    /// in its target. Returns `None` if no spelling owns the id.
    ///
    /// ```
    /// use mediafold::paths::RootAlias;
    ///
    /// let alias = RootAlias::new("home");
    /// assert_eq!(alias.rebase("a/b/x", "a/b", "home/a/c").as_deref(), Some("home/a/c/x"));
    /// assert_eq!(alias.rebase("home/a/b/x", "a/b", "a/c").as_deref(), Some("home/a/c/x"));
    /// ```
    pub fn rebase(&self, candidate_id: &str, from_path: &str, to_path: &str) -> Option<String> {
        self.variants(from_path)
            .into_iter()
            .find(|from| is_strict_child(candidate_id, from))
            .and_then(|from| {
                if from == from_path {
                    rebase(candidate_id, from_path, to_path)
                } else {
                    let target_base = self.respell(to_path, self.is_aliased(&from));
                    rebase(candidate_id, &from, &target_base)
                }
            })
    }

    /// Spells `path` with or without the root segment.
    fn respell(&self, path: &str, aliased: bool) -> String {
        match path.strip_prefix(&self.prefix()) {
            Some(stripped) if !aliased => stripped.to_string(),
            None if aliased && path != self.token => format!("{}{path}", self.prefix()),
            _ => path.to_string(),
        }
    }
}
