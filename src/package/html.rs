//! Self-contained HTML page that plays a compiled story in the Mol* stories viewer.

use base64::Engine as _;

use crate::{
    compile::story::{MvsOutput, generate},
    foundation::error::StoryResult,
    story::model::Story,
};

/// Viewer release loaded from the CDN when none is requested.
pub const DEFAULT_VIEWER_VERSION: &str = "5.0.0-dev.2";

const UNTITLED: &str = "Untitled Story";

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Options for HTML export.
pub struct HtmlOptions {
    /// Page title; falls back to the story title.
    pub title: Option<String>,
    /// Viewer release; defaults to [`DEFAULT_VIEWER_VERSION`].
    pub viewer_version: Option<String>,
}

/// Compile `story` and wrap the result in an HTML page.
#[tracing::instrument(skip_all, fields(title = %story.metadata.title))]
pub fn generate_html(story: &Story, opts: &HtmlOptions) -> StoryResult<String> {
    let output = generate(story)?;
    render_html(&output, opts, Some(&story.metadata.title))
}

/// Embed an already compiled story in an HTML page.
///
/// The page title is `opts.title`, else `fallback_title`, else `"Untitled Story"`.
/// An empty story title is kept as is.
pub fn render_html(
    output: &MvsOutput,
    opts: &HtmlOptions,
    fallback_title: Option<&str>,
) -> StoryResult<String> {
    let state = match output {
        MvsOutput::Index(index) => index.to_json()?,
        MvsOutput::Archive(bytes) => format!(
            "\"base64,{}\"",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        ),
    };

    let title = opts
        .title
        .as_deref()
        .or(fallback_title)
        .unwrap_or(UNTITLED);
    let version = opts
        .viewer_version
        .as_deref()
        .unwrap_or(DEFAULT_VIEWER_VERSION);

    let html = fill_template(TEMPLATE, |name| match name {
        "version" => Some(version.to_string()),
        "title" => Some(escape_html(title)),
        "format" => Some(output.format().to_string()),
        "state" => Some(state.replace("</", "<\\/")),
        _ => None,
    });
    tracing::debug!(format = output.format(), bytes = html.len(), "html rendered");
    Ok(html)
}

/// Substitute `{{name}}` placeholders in one pass; substituted text is never rescanned.
fn fill_template(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let name = &rest[start + 2..start + 2 + len];
        out.push_str(&rest[..start]);
        match lookup(name) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + 4 + len]),
        }
        rest = &rest[start + 4 + len..];
    }
    out.push_str(rest);
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{{title}}</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        #viewer {
            position: absolute;
            left: 0;
            top: 0;
            right: 34%;
            bottom: 0;
        }

        #controls {
            position: absolute;
            left: 66%;
            top: 0;
            right: 0;
            bottom: 0;
            padding: 16px;
            padding-bottom: 20px;
            border: 1px solid #ccc;
            border-left: none;
            background: #F6F5F3;
            z-index: -2;
            display: flex;
            flex-direction: column;
            gap: 16px;
        }

        @media (orientation:portrait) {
            #viewer {
                right: 0;
                bottom: 40%;
            }

            #controls {
                left: 0;
                top: 60%;
                border-top: none;
            }

            .msp-viewport-controls-buttons {
                display: none;
            }
        }
    </style>
    <script src="https://cdn.jsdelivr.net/npm/molstar@{{version}}/build/mvs-stories/mvs-stories.js"></script>
    <link rel="stylesheet" type="text/css" href="https://cdn.jsdelivr.net/npm/molstar@{{version}}/build/mvs-stories/mvs-stories.css" />
</head>
<body>
    <div id="viewer">
        <mvs-stories-viewer></mvs-stories-viewer>
    </div>
    <div id="controls">
        <mvs-stories-snapshot-markdown style="flex-grow: 1;"></mvs-stories-snapshot-markdown>
    </div>

    <script>
        var mvsData = {{state}};

        mvsStories.loadFromData(mvsData, { format: '{{format}}' });
    </script>
</body>
</html>
"#;

#[cfg(test)]
#[path = "../../tests/unit/package/html.rs"]
mod tests;
