//! Template binding.
//!
//! Templates are Handlebars sources registered in strict mode: a reference
//! to a key the context does not carry fails the render instead of
//! producing an empty string. Output is manifest text, so HTML escaping is
//! disabled.
use crate::context::{BindingContext, RenderUnit};
use crate::error::{RenderError, Result};
use crate::templates::EMBEDDED;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderErrorReason,
};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Extension marker carried by template identifiers.
pub const TEMPLATE_EXTENSION: &str = "hbs";

/// Name under which the encoding helper is registered.
pub const B64ENCODE_HELPER: &str = "b64encode";

/// Standard base64 (padded) of the UTF-8 bytes of `text`.
pub fn b64encode(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

fn b64encode_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param = h
        .param(0)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex(B64ENCODE_HELPER, 0))?;
    if param.is_value_missing() {
        return Err(RenderErrorReason::MissingVariable(param.relative_path().cloned()).into());
    }
    let text = match param.value() {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return Err(RenderErrorReason::InvalidParamType("string").into()),
    };
    out.write(&b64encode(&text))?;
    Ok(())
}

/// The set of templates available to a run.
pub struct TemplateSet {
    registry: Handlebars<'static>,
}

impl TemplateSet {
    fn empty() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper(B64ENCODE_HELPER, Box::new(b64encode_helper));
        Self { registry }
    }

    /// Templates compiled into the binary.
    pub fn embedded() -> Result<Self> {
        let mut set = Self::empty();
        for (id, source) in EMBEDDED {
            set.register(id, source)?;
        }
        Ok(set)
    }

    /// Every `*.hbs` file directly under `dir`, keyed by file name.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let read_failure = |reason: String| RenderError::TemplateMalformed {
            template: dir.display().to_string(),
            reason,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(|err| read_failure(err.to_string()))? {
            let path = entry.map_err(|err| read_failure(err.to_string()))?.path();
            let is_template = path
                .extension()
                .is_some_and(|ext| ext == TEMPLATE_EXTENSION);
            if path.is_file() && is_template {
                files.push(path);
            }
        }
        files.sort();

        let mut set = Self::empty();
        for path in files {
            let Some(id) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let source = fs::read_to_string(&path).map_err(|err| RenderError::TemplateMalformed {
                template: id.to_string(),
                reason: err.to_string(),
            })?;
            set.register(id, &source)?;
        }
        tracing::debug!(dir = %dir.display(), templates = set.ids().len(), "loaded templates");
        Ok(set)
    }

    /// Register (or replace) one template.
    pub fn register(&mut self, id: &str, source: &str) -> Result<()> {
        self.registry
            .register_template_string(id, source)
            .map_err(|err| RenderError::TemplateMalformed {
                template: id.to_string(),
                reason: err.to_string(),
            })
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .registry
            .get_templates()
            .keys()
            .map(String::as_str)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Render `unit.template` against `context`.
    pub fn bind(&self, unit: &RenderUnit, context: &BindingContext) -> Result<String> {
        if !self.registry.has_template(&unit.template) {
            return Err(RenderError::TemplateNotFound {
                unit: unit.label(),
                template: unit.template.clone(),
            });
        }
        self.registry
            .render(&unit.template, context)
            .map_err(|err| classify(unit, err))
    }
}

fn classify(unit: &RenderUnit, err: handlebars::RenderError) -> RenderError {
    match err.reason() {
        RenderErrorReason::MissingVariable(path) => RenderError::UnboundReference {
            unit: unit.label(),
            template: unit.template.clone(),
            key: path.clone().unwrap_or_else(|| "<unknown>".to_string()),
        },
        RenderErrorReason::TemplateNotFound(name) => RenderError::TemplateNotFound {
            unit: unit.label(),
            template: name.clone(),
        },
        _ => RenderError::RenderFailure {
            unit: unit.label(),
            template: unit.template.clone(),
            reason: err.to_string(),
        },
    }
}

#[cfg(test)]
#[path = "binder_tests.rs"]
mod tests;
