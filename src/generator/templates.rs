use askama::Template;
use std::path::PathBuf;

use super::rules::ValidationRule;
use crate::error::{ScaffoldError, ScaffoldResult};
use crate::schema::{FieldDescriptor, ModelName};

/// A column as the templates see it
///
/// Everything a template needs is precomputed here so templates stay free of
/// logic beyond loops.
#[derive(Debug, Clone)]
pub struct FieldView {
    /// Property name (column name, verbatim)
    pub name: String,
    /// class-validator decorator, e.g. `IsInt`
    pub decorator: String,
    /// TypeScript property type
    pub ts_type: String,
    /// JSON literal used in sample request bodies
    pub placeholder: String,
}

impl FieldView {
    pub fn from_descriptor(field: &FieldDescriptor) -> Self {
        let rule = ValidationRule::for_data_type(&field.data_type);
        Self {
            name: field.column_name.clone(),
            decorator: rule.decorator().to_string(),
            ts_type: rule.ts_type().to_string(),
            placeholder: rule.placeholder().to_string(),
        }
    }
}

/// Model reference used by the app bootstrap to import and mount routers
#[derive(Debug, Clone)]
pub struct ModelRef {
    /// Class prefix, e.g. `User`
    pub name: String,
    /// File/resource name, e.g. `user`
    pub lower: String,
}

impl From<&ModelName> for ModelRef {
    fn from(model: &ModelName) -> Self {
        Self {
            name: model.as_str().to_string(),
            lower: model.lower(),
        }
    }
}

/// Template data for a model's router
#[derive(Template)]
#[template(path = "route.ts.txt", escape = "none")]
pub struct RouteTemplateData {
    pub model: String,
    pub lower: String,
}

/// Template data for a model's DTO (one validated property per column)
#[derive(Template)]
#[template(path = "dto.ts.txt", escape = "none")]
pub struct DtoTemplateData {
    pub model: String,
    pub fields: Vec<FieldView>,
}

/// Template data for a model's controller
#[derive(Template)]
#[template(path = "controller.ts.txt", escape = "none")]
pub struct ControllerTemplateData {
    pub model: String,
    pub lower: String,
}

/// Template data for a model's sample request script
#[derive(Template)]
#[template(path = "request.http.txt", escape = "none")]
pub struct HttpSampleTemplateData {
    pub model: String,
    pub lower: String,
    /// Base URL including the API prefix
    pub base_url: String,
    pub fields: Vec<FieldView>,
}

/// Base exception carrying status, message and per-field errors
#[derive(Template)]
#[template(path = "http_exception.ts.txt", escape = "none")]
pub struct HttpExceptionTemplate;

/// Routing capability interface implemented by every generated router
#[derive(Template)]
#[template(path = "routes.interface.ts.txt", escape = "none")]
pub struct RoutesInterfaceTemplate;

/// Request validation middleware used by every generated route
#[derive(Template)]
#[template(path = "validation.middleware.ts.txt", escape = "none")]
pub struct ValidationMiddlewareTemplate;

/// Template data for the stage-specific environment loader
#[derive(Template)]
#[template(path = "config.ts.txt", escape = "none")]
pub struct EnvConfigTemplateData {
    /// Variable names re-exported from `process.env`
    pub env_names: Vec<String>,
}

/// Template data for the application bootstrap
#[derive(Template)]
#[template(path = "app.ts.txt", escape = "none")]
pub struct AppTemplateData {
    pub models: Vec<ModelRef>,
    /// Common prefix every router is mounted under
    pub api_prefix: String,
}

/// Process bootstrap: connect to the database, then listen
#[derive(Template)]
#[template(path = "server.ts.txt", escape = "none")]
pub struct ServerTemplate;

/// Settings shared by every template render in a run
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Base URL of the running service, e.g. `http://localhost:3000`
    pub base_url: String,
    /// Prefix routers are mounted under, e.g. `/api`
    pub api_prefix: String,
    /// Names re-exported by the environment loader
    pub env_names: Vec<String>,
}

impl RenderContext {
    /// Base URL with the API prefix appended, without doubled slashes
    pub fn api_base_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        }
    }

    /// API prefix normalised to a single leading slash
    pub fn mount_prefix(&self) -> String {
        format!("/{}", self.api_prefix.trim_matches('/'))
    }
}

/// One rendered file, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Path relative to the project root
    pub path: PathBuf,
    pub content: String,
}

/// Per-model artifact kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelArtifact {
    Route,
    Dto,
    Controller,
    HttpSample,
}

impl ModelArtifact {
    /// Every per-model artifact, in write order
    pub const ALL: [ModelArtifact; 4] = [
        ModelArtifact::Route,
        ModelArtifact::Dto,
        ModelArtifact::Controller,
        ModelArtifact::HttpSample,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ModelArtifact::Route => "route",
            ModelArtifact::Dto => "dto",
            ModelArtifact::Controller => "controller",
            ModelArtifact::HttpSample => "http sample",
        }
    }

    /// Output path relative to the project root
    pub fn relative_path(self, model: &ModelName) -> PathBuf {
        let lower = model.lower();
        let (dir, file) = match self {
            ModelArtifact::Route => ("routes", format!("{lower}.route.ts")),
            ModelArtifact::Dto => ("dtos", format!("{lower}.dto.ts")),
            ModelArtifact::Controller => ("controllers", format!("{lower}.controller.ts")),
            ModelArtifact::HttpSample => ("http", format!("{lower}.http")),
        };
        PathBuf::from("src").join(dir).join(file)
    }

    /// Render this artifact for `model`
    ///
    /// # Errors
    ///
    /// Returns the template engine's error; no I/O happens here.
    pub fn render(
        self,
        model: &ModelName,
        fields: &[FieldDescriptor],
        ctx: &RenderContext,
    ) -> askama::Result<String> {
        let name = model.as_str().to_string();
        let lower = model.lower();
        match self {
            ModelArtifact::Route => RouteTemplateData { model: name, lower }.render(),
            ModelArtifact::Dto => DtoTemplateData {
                model: name,
                fields: fields.iter().map(FieldView::from_descriptor).collect(),
            }
            .render(),
            ModelArtifact::Controller => ControllerTemplateData { model: name, lower }.render(),
            ModelArtifact::HttpSample => HttpSampleTemplateData {
                model: name,
                lower,
                base_url: ctx.api_base_url(),
                fields: fields.iter().map(FieldView::from_descriptor).collect(),
            }
            .render(),
        }
    }
}

/// Artifacts rendered once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedArtifact {
    HttpException,
    RoutesInterface,
    ValidationMiddleware,
    EnvConfig,
    App,
    Server,
}

impl SharedArtifact {
    /// Always generated
    pub const CORE: [SharedArtifact; 4] = [
        SharedArtifact::HttpException,
        SharedArtifact::RoutesInterface,
        SharedArtifact::ValidationMiddleware,
        SharedArtifact::EnvConfig,
    ];

    /// Generated only in full-application mode
    pub const APP: [SharedArtifact; 2] = [SharedArtifact::App, SharedArtifact::Server];

    /// Shared artifacts for the requested scope
    pub fn for_scope(full_app: bool) -> Vec<SharedArtifact> {
        let mut kinds = Self::CORE.to_vec();
        if full_app {
            kinds.extend(Self::APP);
        }
        kinds
    }

    pub fn label(self) -> &'static str {
        match self {
            SharedArtifact::HttpException => "http exception",
            SharedArtifact::RoutesInterface => "routes interface",
            SharedArtifact::ValidationMiddleware => "validation middleware",
            SharedArtifact::EnvConfig => "env config",
            SharedArtifact::App => "app bootstrap",
            SharedArtifact::Server => "server bootstrap",
        }
    }

    /// Output path relative to the project root
    pub fn relative_path(self) -> PathBuf {
        let src = PathBuf::from("src");
        match self {
            SharedArtifact::HttpException => src.join("exceptions").join("HttpException.ts"),
            SharedArtifact::RoutesInterface => src.join("interfaces").join("routes.interface.ts"),
            SharedArtifact::ValidationMiddleware => {
                src.join("middlewares").join("validation.middleware.ts")
            }
            SharedArtifact::EnvConfig => src.join("config").join("index.ts"),
            SharedArtifact::App => src.join("app.ts"),
            SharedArtifact::Server => src.join("server.ts"),
        }
    }

    /// Render this artifact; `models` are the models generated this run
    ///
    /// # Errors
    ///
    /// Returns the template engine's error; no I/O happens here.
    pub fn render(self, models: &[ModelName], ctx: &RenderContext) -> askama::Result<String> {
        match self {
            SharedArtifact::HttpException => HttpExceptionTemplate.render(),
            SharedArtifact::RoutesInterface => RoutesInterfaceTemplate.render(),
            SharedArtifact::ValidationMiddleware => ValidationMiddlewareTemplate.render(),
            SharedArtifact::EnvConfig => EnvConfigTemplateData {
                env_names: ctx.env_names.clone(),
            }
            .render(),
            SharedArtifact::App => AppTemplateData {
                models: models.iter().map(ModelRef::from).collect(),
                api_prefix: ctx.mount_prefix(),
            }
            .render(),
            SharedArtifact::Server => ServerTemplate.render(),
        }
    }

    /// Render into an artifact with its output path
    ///
    /// # Errors
    ///
    /// Returns [`ScaffoldError::Render`] naming this artifact.
    pub fn to_artifact(
        self,
        models: &[ModelName],
        ctx: &RenderContext,
    ) -> ScaffoldResult<GeneratedArtifact> {
        let content = self
            .render(models, ctx)
            .map_err(|source| ScaffoldError::Render {
                artifact: self.label().to_string(),
                source,
            })?;
        Ok(GeneratedArtifact {
            path: self.relative_path(),
            content,
        })
    }
}

/// Render all four per-model artifacts in memory
///
/// All-or-nothing: if any template fails, nothing for this model is returned,
/// so a model is never half-written.
///
/// # Errors
///
/// Returns [`ScaffoldError::Render`] naming the model and artifact.
pub fn render_model_artifacts(
    model: &ModelName,
    fields: &[FieldDescriptor],
    ctx: &RenderContext,
) -> ScaffoldResult<Vec<GeneratedArtifact>> {
    ModelArtifact::ALL
        .iter()
        .map(|kind| {
            let content = kind
                .render(model, fields, ctx)
                .map_err(|source| ScaffoldError::Render {
                    artifact: format!("{} for {model}", kind.label()),
                    source,
                })?;
            Ok(GeneratedArtifact {
                path: kind.relative_path(model),
                content,
            })
        })
        .collect()
}
