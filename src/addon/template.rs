// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Manifest template rendering.

use crate::addon::Values;
use crate::error::{AddonError, Result};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};

/// Render the template `source` (registered as `name`) with `values`.
///
/// Undefined variables are errors; templates that want an optional value must
/// guard it with `is defined`.
pub fn render(name: &str, source: &str, values: &Values) -> Result<String> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    // Manifests are YAML; values are substituted verbatim
    env.set_auto_escape_callback(|_| AutoEscape::None);

    env.add_template(name, source)
        .map_err(|e| render_error(name, e))?;

    env.get_template(name)
        .and_then(|t| t.render(values))
        .map_err(|e| render_error(name, e))
}

fn render_error(name: &str, e: minijinja::Error) -> AddonError {
    AddonError::RenderError {
        template: name.to_string(),
        reason: e.to_string(),
    }
}
