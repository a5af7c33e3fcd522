// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Default configuration values.

/// Generate an example configuration file.
pub fn example_config() -> &'static str {
    r#"# chartbump configuration
# Author: Eshan Roy
# SPDX-License-Identifier: MIT

# Chart discovery
[charts]
root = "charts"
metadata_file = "Chart.yaml"
exclude = []
# Changed paths matching these globs never trigger a bump, e.g. ["**/*.md"]
exclude_paths = []

# Version resolution
[versioning]
default_message = "chore: bump charts"
fallback_message = "chore: bump"
manual_label = "manual-versioning"

# Packaging
[helm]
binary = "helm"
output_dir = "docs/interledger"
repo_url = "https://interledger.org/charts/"
dependency_update = true

# Commit and push
[publish]
remote = "origin"
user_name = "github-actions[bot]"
user_email = "github-actions[bot]@users.noreply.github.com"
message_template = "chore(version): bump charts {{charts}}"

# GitHub
[github]
api_url = "https://api.github.com"
per_page = 100
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parseable() {
        let config = crate::config::parse_config(example_config()).unwrap();
        assert!(config.charts.exclude_paths.is_empty());
        assert_eq!(config.versioning.fallback_message, "chore: bump");
    }
}
