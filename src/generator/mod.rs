//! # Generator Module
//!
//! Turns database metadata into an Express/Prisma API skeleton.
//!
//! ## Overview
//!
//! For every base table discovered in the target schema the generator writes
//! four files:
//!
//! - **Route** - router class wiring CRUD endpoints to the controller
//! - **DTO** - class-validator annotated data transfer object, one property
//!   per column
//! - **Controller** - handlers calling the Prisma client for the model
//! - **HTTP sample** - request script exercising every endpoint
//!
//! Shared scaffolding is written once per run: the HTTP exception, the routes
//! interface, the validation middleware, the environment loader and, in
//! full-application mode, `app.ts` and `server.ts`.
//!
//! ## Architecture
//!
//! ```text
//! MetadataSource → SchemaReader → ValidationRule → Askama templates → files
//!                                                      ↓
//!                             package.json / .env reconciliation → tree report
//! ```
//!
//! 1. **Schema** - base tables and columns from `information_schema`
//! 2. **Rules** - each column's declared type becomes a validation rule
//! 3. **Templates** - pure renders from `(model, fields)` to text
//! 4. **Materialize** - write each file, replacing what was there
//! 5. **Pipeline** - sequences the above and owns failure handling
//!
//! ## Generated Structure
//!
//! ```text
//! src/
//! ├── app.ts                  # full-application mode only
//! ├── server.ts               # full-application mode only
//! ├── config/index.ts
//! ├── controllers/<model>.controller.ts
//! ├── dtos/<model>.dto.ts
//! ├── exceptions/HttpException.ts
//! ├── http/<model>.http
//! ├── interfaces/routes.interface.ts
//! ├── middlewares/validation.middleware.ts
//! └── routes/<model>.route.ts
//! ```
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use api_scaffold::config::ScaffoldConfig;
//! use api_scaffold::generator::Pipeline;
//! use api_scaffold::reconcile::CommandInstaller;
//! use api_scaffold::schema::PgMetadataSource;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScaffoldConfig::load(None, std::path::Path::new("."))?;
//! let source = PgMetadataSource::connect(config.require_database_url()?).await?;
//! let installer = CommandInstaller::new(&config.installer, &config.project_root);
//! let report = Pipeline::new(source, installer, config)
//!     .run(&mut std::io::stdout())
//!     .await?;
//! assert!(report.is_clean());
//! # Ok(())
//! # }
//! ```
//!
//! ## Template Customization
//!
//! Templates live in the `templates/` directory and are compiled in:
//!
//! - `route.ts.txt`, `dto.ts.txt`, `controller.ts.txt`, `request.http.txt`
//! - `http_exception.ts.txt`, `routes.interface.ts.txt`,
//!   `validation.middleware.ts.txt`, `config.ts.txt`
//! - `app.ts.txt`, `server.ts.txt`

mod materialize;
mod pipeline;
mod rules;
mod templates;
#[cfg(test)]
mod tests;

pub use materialize::{create_layout, ensure_dir, write_and_log};
pub use pipeline::{check_prerequisites, GenerationReport, Pipeline};
pub use rules::ValidationRule;
pub use templates::*;
