//! GraphQL Playground page

use serde_json::{Map, Value};
use trellis_core::PlaygroundConfig;

const CDN_ROOT: &str = "//cdn.jsdelivr.net/npm/@apollographql/graphql-playground-react";

/// What the explorer page is pointed at
#[derive(Debug, Clone, PartialEq)]
pub struct PlaygroundRenderOptions {
    pub endpoint: String,
    pub subscription_endpoint: Option<String>,
    pub version: String,
    pub title: Option<String>,
    pub settings: Option<Value>,
}

impl PlaygroundRenderOptions {
    pub fn from_config(
        endpoint: impl Into<String>,
        subscription_endpoint: Option<String>,
        config: &PlaygroundConfig,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            subscription_endpoint,
            version: config.version.clone(),
            title: config.title.clone(),
            settings: config.settings.clone(),
        }
    }
}

/// Render the Playground HTML document
pub fn render_playground_page(options: &PlaygroundRenderOptions) -> String {
    let mut config = Map::new();
    config.insert("endpoint".to_string(), Value::String(options.endpoint.clone()));
    if let Some(subscription_endpoint) = &options.subscription_endpoint {
        config.insert(
            "subscriptionEndpoint".to_string(),
            Value::String(subscription_endpoint.clone()),
        );
    }
    if let Some(settings) = &options.settings {
        config.insert("settings".to_string(), settings.clone());
    }
    // `<` can only occur inside JSON strings, where \u003c is equivalent
    let config = Value::Object(config).to_string().replace('<', "\\u003c");

    let title = escape_html(options.title.as_deref().unwrap_or("GraphQL Playground"));
    let base = format!("{}@{}/build", CDN_ROOT, escape_html(&options.version));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="user-scalable=no, initial-scale=1.0, minimum-scale=1.0, maximum-scale=1.0, minimal-ui" />
  <title>{title}</title>
  <link rel="stylesheet" href="{base}/static/css/index.css" />
  <link rel="shortcut icon" href="{base}/favicon.png" />
  <script src="{base}/static/js/middleware.js"></script>
</head>
<body>
  <div id="root"></div>
  <script>
    window.addEventListener('load', function () {{
      var root = document.getElementById('root');
      root.classList.add('playgroundIn');
      GraphQLPlayground.init(root, {config});
    }});
  </script>
</body>
</html>
"#,
    )
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
