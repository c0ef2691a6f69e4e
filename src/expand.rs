// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Placeholder expansion for path templates.
//!
//! Base directory templates may refer to the repository and the worktree
//! being created through `${NAME}` placeholders:
//!
//! | Placeholder                         | Value                                   |
//! |-------------------------------------|-----------------------------------------|
//! | `${DIRNAME}`                        | Last path segment of repository root    |
//! | `${PATHNAME}`                       | Absolute path of repository root        |
//! | `${BRANCH}`, `${TARGET_BRANCH}`     | Branch or worktree name as given        |
//! | `${BRANCH_SLUG}`, `${TARGET_SLUG}`  | Branch name with every `/` as `-`       |
//!
//! Placeholder names are case-sensitive. Unknown placeholders are left alone.

use crate::path::absolute;

use std::path::Path;

/// Replace every `/` in a branch name with `-`.
pub fn slugify(branch: impl AsRef<str>) -> String {
    branch.as_ref().replace('/', "-")
}

/// Expand placeholders in template.
///
/// The template is scanned once from left to right. Substituted text is never
/// scanned again, so a branch name that happens to contain `${DIRNAME}` ends up
/// in the result verbatim. Expansion never fails: if the repository root
/// cannot be made absolute it is used as given.
pub fn expand_variables(
    template: impl AsRef<str>,
    repository_root: impl AsRef<Path>,
    branch: impl AsRef<str>,
) -> String {
    let vars = Variables::new(repository_root.as_ref(), branch.as_ref());
    let mut expanded = String::with_capacity(template.as_ref().len());
    let mut rest = template.as_ref();

    while let Some(start) = rest.find("${") {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let value = after
            .find('}')
            .and_then(|end| vars.lookup(&after[..end]).map(|value| (value, end)));

        match value {
            Some((value, end)) => {
                expanded.push_str(value);
                rest = &after[end + 1..];
            }
            // INVARIANT: Keep scanning right after "${" so nested tokens expand.
            None => {
                expanded.push_str("${");
                rest = after;
            }
        }
    }
    expanded.push_str(rest);

    expanded
}

#[derive(Debug)]
struct Variables {
    dirname: String,
    pathname: String,
    branch: String,
    slug: String,
}

impl Variables {
    fn new(repository_root: &Path, branch: &str) -> Self {
        let root = absolute(repository_root).unwrap_or_else(|_| repository_root.to_path_buf());
        let dirname = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.to_string_lossy().into_owned());

        Self {
            dirname,
            pathname: root.to_string_lossy().into_owned(),
            branch: branch.to_owned(),
            slug: slugify(branch),
        }
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "DIRNAME" => Some(self.dirname.as_str()),
            "PATHNAME" => Some(self.pathname.as_str()),
            "BRANCH" | "TARGET_BRANCH" => Some(self.branch.as_str()),
            "BRANCH_SLUG" | "TARGET_SLUG" => Some(self.slug.as_str()),
            _ => None,
        }
    }
}
