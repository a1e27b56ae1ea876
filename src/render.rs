//! Template rendering with an explicit development hot-reload.

use std::{
    path::Path,
    sync::{RwLock, RwLockReadGuard},
};

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AppConfig;

/// Templates compiled into the binary, keyed by the name pages refer to them with.
const EMBEDDED: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("timers.html", include_str!("../templates/timers.html")),
    ("timer.html", include_str!("../templates/timer.html")),
    ("play.html", include_str!("../templates/play.html")),
    ("error.html", include_str!("../templates/error.html")),
    (
        "partials/masthead.html",
        include_str!("../templates/partials/masthead.html"),
    ),
    (
        "partials/levels.html",
        include_str!("../templates/partials/levels.html"),
    ),
    (
        "partials/timers_list.html",
        include_str!("../templates/partials/timers_list.html"),
    ),
];

/// Failures raised while loading or rendering templates.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera failed to parse or render a template.
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    /// A render panicked while holding the template registry.
    #[error("template registry lock poisoned")]
    Poisoned,
}

/// Rendering collaborator turning view-models into HTML.
pub struct Renderer {
    tera: RwLock<Tera>,
    hot_reload: bool,
}

impl Renderer {
    /// Renderer over the templates compiled into the binary.
    pub fn embedded() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(EMBEDDED.iter().copied())?;
        Ok(Self {
            tera: RwLock::new(tera),
            hot_reload: false,
        })
    }

    /// Renderer reading templates from `dir` and re-reading them before every render.
    pub fn from_dir(dir: &Path) -> Result<Self, RenderError> {
        let tera = Tera::new(&format!("{}/**/*.html", dir.display()))?;
        Ok(Self {
            tera: RwLock::new(tera),
            hot_reload: true,
        })
    }

    /// Hot-reload from `templates_dir` in development, embedded templates otherwise.
    pub fn for_config(config: &AppConfig) -> Result<Self, RenderError> {
        if config.is_development() && config.templates_dir.is_dir() {
            info!(dir = %config.templates_dir.display(), "template hot-reload enabled");
            match Self::from_dir(&config.templates_dir) {
                Ok(renderer) => return Ok(renderer),
                Err(err) => warn!(error = %err, "failed to load templates from disk; using embedded set"),
            }
        }
        Self::embedded()
    }

    /// Whether templates are re-read from disk before each render.
    pub fn hot_reload(&self) -> bool {
        self.hot_reload
    }

    /// Re-read every template from disk. A no-op for embedded templates.
    pub fn reload(&self) -> Result<(), RenderError> {
        if !self.hot_reload {
            return Ok(());
        }
        let mut tera = self.tera.write().map_err(|_| RenderError::Poisoned)?;
        tera.full_reload()?;
        Ok(())
    }

    /// Render `template` with the fields of `data` as its context.
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String, RenderError> {
        self.reload()?;
        let context = Context::from_serialize(data)?;
        let tera = self.registry()?;
        Ok(tera.render(template, &context)?)
    }

    fn registry(&self) -> Result<RwLockReadGuard<'_, Tera>, RenderError> {
        self.tera.read().map_err(|_| RenderError::Poisoned)
    }
}
