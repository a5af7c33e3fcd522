// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Release commit message rendering.

use crate::bump::VersionResult;
use crate::error::{ConfigError, Result};
use handlebars::Handlebars;
use serde::Serialize;

#[derive(Serialize)]
struct MessageData<'a> {
    charts: String,
    count: usize,
    versions: &'a VersionResult,
}

/// `name@version` pairs joined by `, `, in chart-name order.
pub fn format_chart_list(versions: &VersionResult) -> String {
    versions
        .iter()
        .map(|(name, version)| format!("{}@{}", name, version))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the release commit message.
///
/// The template sees `charts` (the formatted list), `count`, and the raw
/// `versions` map.
pub fn render_commit_message(template: &str, versions: &VersionResult) -> Result<String> {
    let mut hb = Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);
    hb.set_strict_mode(true);

    let data = MessageData {
        charts: format_chart_list(versions),
        count: versions.len(),
        versions,
    };

    hb.render_template(template, &data).map_err(|e| {
        ConfigError::InvalidValue {
            key: "publish.message_template".to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions() -> VersionResult {
        [("web", "1.3.0"), ("auth", "0.4.0")]
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_chart_list_is_sorted() {
        assert_eq!(format_chart_list(&versions()), "auth@0.4.0, web@1.3.0");
    }

    #[test]
    fn test_default_template() {
        let msg = render_commit_message("chore(version): bump charts {{charts}}", &versions())
            .unwrap();
        assert_eq!(msg, "chore(version): bump charts auth@0.4.0, web@1.3.0");
    }

    #[test]
    fn test_custom_template() {
        let msg = render_commit_message(
            "release: {{count}} chart(s)\n\n{{#each versions}}- {{@key}} {{this}}\n{{/each}}",
            &versions(),
        )
        .unwrap();
        assert_eq!(msg, "release: 2 chart(s)\n\n- auth 0.4.0\n- web 1.3.0\n");
    }

    #[test]
    fn test_unknown_variable_is_rejected() {
        assert!(render_commit_message("bump {{nope}}", &versions()).is_err());
    }
}
