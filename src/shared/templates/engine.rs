//! Jinja template rendering for WhatsApp replies and model prompts.
//!
//! Templates live under `templates/` and are compiled into the binary, so
//! rendering never depends on the working directory.

use minijinja::{Environment, Value};
use std::sync::OnceLock;
use thiserror::Error;

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const TEMPLATES: &[(&str, &str)] = &[
    (
        "whatsapp/help.jinja",
        include_str!("../../../templates/whatsapp/help.jinja"),
    ),
    (
        "whatsapp/status.jinja",
        include_str!("../../../templates/whatsapp/status.jinja"),
    ),
    (
        "whatsapp/file_list.jinja",
        include_str!("../../../templates/whatsapp/file_list.jinja"),
    ),
    (
        "whatsapp/search_results.jinja",
        include_str!("../../../templates/whatsapp/search_results.jinja"),
    ),
    (
        "prompts/classification.jinja",
        include_str!("../../../templates/prompts/classification.jinja"),
    ),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        }
    }
    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render `template_name` with a context built by `minijinja::context!`
pub fn render_template(template_name: &str, ctx: Value) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}
