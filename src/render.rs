//! gprMax input rendering.
//!
//! The input file is a fixed template with `{key}` placeholders. Values are
//! inserted verbatim; the simulator owns the grammar of the result.
use crate::case::CaseParameters;
use crate::config::SweepConfig;
use crate::paths::SweepPaths;
use crate::templates::GPRMAX_INPUT_TEMPLATE;
use crate::util::{format_value, sha256_hex};
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

const PLACEHOLDER_PATTERN: &str = r"\{([A-Za-z_][A-Za-z0-9_]*)\}";

/// Render the simulator input for one case.
pub fn render_input(params: &CaseParameters, config: &SweepConfig) -> Result<String> {
    let values = template_values(params, config);
    render_template(GPRMAX_INPUT_TEMPLATE, &values)
        .with_context(|| format!("render input for {}", params.case_id))
}

/// SHA-256 of the input `render_input` would produce for this case.
pub fn input_digest(params: &CaseParameters, config: &SweepConfig) -> Result<String> {
    let text = render_input(params, config)?;
    Ok(sha256_hex(text.as_bytes()))
}

/// Write rendered input to `<case_dir>/<case_id>.in`, creating the case dir.
pub fn write_input(paths: &SweepPaths, params: &CaseParameters, text: &str) -> Result<PathBuf> {
    let case_dir = paths.case_dir(&params.case_id);
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("create case dir {}", case_dir.display()))?;
    let path = paths.input_path(&params.case_id);
    fs::write(&path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

fn template_values(
    params: &CaseParameters,
    config: &SweepConfig,
) -> BTreeMap<&'static str, String> {
    BTreeMap::from([
        ("radius", format_value(params.radius)),
        ("depth", format_value(params.depth_cm)),
        ("soil_perm", format_value(params.soil_permittivity)),
        ("root_perm", format_value(params.root_permittivity)),
        ("z_start", format_value(params.z_start)),
        ("name", params.case_id.clone()),
        ("antenna_label", config.antenna_label.clone()),
    ])
}

/// Substitute every `{key}` in `template`; an unknown key is an error.
pub fn render_template(template: &str, values: &BTreeMap<&str, String>) -> Result<String> {
    let pattern = Regex::new(PLACEHOLDER_PATTERN).context("compile placeholder pattern")?;
    let mut unknown = Vec::new();
    let rendered = pattern.replace_all(template, |caps: &regex::Captures<'_>| {
        let key = &caps[1];
        match values.get(key) {
            Some(value) => value.clone(),
            None => {
                unknown.push(key.to_string());
                caps[0].to_string()
            }
        }
    });
    if !unknown.is_empty() {
        unknown.sort();
        unknown.dedup();
        return Err(anyhow!("unknown template placeholder(s): {}", unknown.join(", ")));
    }
    Ok(rendered.into_owned())
}
