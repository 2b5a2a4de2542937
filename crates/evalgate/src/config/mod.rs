use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::models::EvalThresholds;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    pub home_dir: PathBuf,
    pub cwd: PathBuf,
    pub out_dir: PathBuf,
}

pub fn resolve_runtime_paths(
    home_dir: &Path,
    cwd: &Path,
    out_dir_override: Option<&Path>,
) -> Result<RuntimePaths> {
    if !home_dir.is_absolute() {
        bail!("home_dir must be absolute: {}", home_dir.display());
    }
    if !cwd.is_absolute() {
        bail!("cwd must be absolute: {}", cwd.display());
    }

    let home_dir = normalize_lexical(home_dir);
    let cwd = normalize_lexical(cwd);
    let out_dir = match out_dir_override {
        Some(path) => resolve_user_path(path, &home_dir, &cwd)?,
        None => cwd.join("artifacts").join("evals"),
    };

    Ok(RuntimePaths {
        home_dir,
        cwd,
        out_dir: normalize_lexical(&out_dir),
    })
}

impl RuntimePaths {
    /// Resolves a user-supplied path (`~`, relative, or absolute) against these paths.
    pub fn resolve(&self, path: &Path) -> Result<PathBuf> {
        resolve_user_path(path, &self.home_dir, &self.cwd)
    }
}

fn resolve_user_path(path: &Path, home_dir: &Path, cwd: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(path, home_dir)?;
    let resolved = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };

    Ok(normalize_lexical(&resolved))
}

fn expand_tilde(path: &Path, home_dir: &Path) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let mut expanded = home_dir.to_path_buf();
            for component in components {
                expanded.push(component.as_os_str());
            }
            Ok(expanded)
        }
        Some(Component::Normal(first))
            if first
                .to_str()
                .is_some_and(|segment| segment.starts_with('~')) =>
        {
            bail!(
                "unsupported home expansion syntax (only `~` and `~/...` are supported): {}",
                path.display()
            )
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            _ => normalized.push(component.as_os_str()),
        }
    }

    normalized
}

/// Per-metric overrides layered over the defaults or a thresholds file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdOverrides {
    pub schema_valid_rate: Option<f64>,
    pub patch_apply_success: Option<f64>,
    pub edit_after_generate_rate: Option<f64>,
    pub publish_conversion_proxy: Option<f64>,
    pub safety_html_tailwind_compliance: Option<f64>,
    pub fallback_rate_max: Option<f64>,
    pub p95_latency_ms_max: Option<i64>,
}

impl ThresholdOverrides {
    #[must_use]
    pub fn apply(self, base: EvalThresholds) -> EvalThresholds {
        EvalThresholds {
            schema_valid_rate: self.schema_valid_rate.unwrap_or(base.schema_valid_rate),
            patch_apply_success: self.patch_apply_success.unwrap_or(base.patch_apply_success),
            edit_after_generate_rate: self
                .edit_after_generate_rate
                .unwrap_or(base.edit_after_generate_rate),
            publish_conversion_proxy: self
                .publish_conversion_proxy
                .unwrap_or(base.publish_conversion_proxy),
            safety_html_tailwind_compliance: self
                .safety_html_tailwind_compliance
                .unwrap_or(base.safety_html_tailwind_compliance),
            fallback_rate_max: self.fallback_rate_max.unwrap_or(base.fallback_rate_max),
            p95_latency_ms_max: self.p95_latency_ms_max.unwrap_or(base.p95_latency_ms_max),
        }
    }
}

/// Reads a JSON thresholds document. Missing keys keep their defaults.
pub fn load_thresholds_file(path: &Path) -> Result<EvalThresholds> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read thresholds file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid thresholds file: {}", path.display()))
}

pub fn resolve_thresholds(
    file: Option<&Path>,
    overrides: ThresholdOverrides,
) -> Result<EvalThresholds> {
    let base = match file {
        Some(path) => load_thresholds_file(path)?,
        None => EvalThresholds::default(),
    };
    Ok(overrides.apply(base))
}
