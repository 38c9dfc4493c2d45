#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::schema::{FieldDescriptor, ModelName};

fn ctx() -> RenderContext {
    RenderContext {
        base_url: "http://localhost:3000".to_string(),
        api_prefix: "/api".to_string(),
        env_names: vec!["NODE_ENV".to_string(), "PORT".to_string()],
    }
}

fn user() -> ModelName {
    ModelName::parse("User").unwrap()
}

fn user_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("email", "email"),
        FieldDescriptor::new("age", "integer"),
        FieldDescriptor::new("name", "character varying"),
    ]
}

#[test]
fn test_dto_field_rules() {
    let dto = ModelArtifact::Dto
        .render(&user(), &user_fields(), &ctx())
        .unwrap();
    assert!(dto.contains("export class UserDto {"));
    assert!(dto.contains("  @IsEmail()\n  public email: string;"));
    assert!(dto.contains("  @IsInt()\n  public age: number;"));
    assert!(dto.contains("  @IsString()\n  public name: string;"));
    // Properties keep column order
    let email = dto.find("email").unwrap();
    let age = dto.find("public age").unwrap();
    assert!(email < age);
}

#[test]
fn test_dto_without_fields() {
    let dto = ModelArtifact::Dto.render(&user(), &[], &ctx()).unwrap();
    assert!(dto.contains("export class UserDto {\n}"));
}

#[test]
fn test_route_wires_validation_and_controller() {
    let route = ModelArtifact::Route
        .render(&user(), &user_fields(), &ctx())
        .unwrap();
    assert!(route.contains("export class UserRoute implements Routes"));
    assert!(route.contains("public path = '/user';"));
    assert!(route.contains("import { UserDto } from '@dtos/user.dto';"));
    assert!(route.contains("ValidationMiddleware(UserDto), this.userController.create"));
}

#[test]
fn test_controller_uses_lowercase_accessor() {
    let model = ModelName::parse("OrderItem").unwrap();
    let controller = ModelArtifact::Controller
        .render(&model, &[], &ctx())
        .unwrap();
    assert!(controller.contains("export class OrderItemController"));
    assert!(controller.contains("await prisma.orderitem.create({"));
}

#[test]
fn test_http_sample_body_and_base_url() {
    let sample = ModelArtifact::HttpSample
        .render(&user(), &user_fields(), &ctx())
        .unwrap();
    assert!(sample.contains("@baseURL = http://localhost:3000/api"));
    assert!(sample.contains("POST {{ baseURL }}/user/create"));
    assert!(sample.contains("DELETE {{ baseURL }}/user/1"));
    assert!(sample.contains(
        "{\n  \"email\": \"user@example.com\",\n  \"age\": 1,\n  \"name\": \"value\"\n}"
    ));
    // One create request, one update request
    assert_eq!(sample.matches("Content-Type: application/json").count(), 2);
}

#[test]
fn test_model_artifact_paths() {
    let model = ModelName::parse("BlogPost").unwrap();
    let paths: Vec<String> = ModelArtifact::ALL
        .iter()
        .map(|kind| kind.relative_path(&model).to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        paths,
        vec![
            "src/routes/blogpost.route.ts",
            "src/dtos/blogpost.dto.ts",
            "src/controllers/blogpost.controller.ts",
            "src/http/blogpost.http",
        ]
    );
}

#[test]
fn test_render_model_artifacts_yields_four() {
    let artifacts = render_model_artifacts(&user(), &user_fields(), &ctx()).unwrap();
    assert_eq!(artifacts.len(), 4);
    assert!(artifacts.iter().all(|a| !a.content.is_empty()));
}

#[test]
fn test_env_config_exports_names() {
    let config = SharedArtifact::EnvConfig.render(&[], &ctx()).unwrap();
    assert!(config.contains("export const { NODE_ENV, PORT } = process.env;"));
}

#[test]
fn test_app_mounts_every_model() {
    let models = vec![user(), ModelName::parse("Order").unwrap()];
    let app = SharedArtifact::App.render(&models, &ctx()).unwrap();
    assert!(app.contains("import { UserRoute } from '@routes/user.route';"));
    assert!(app.contains("import { OrderRoute } from '@routes/order.route';"));
    assert!(app.contains("new UserRoute(),"));
    assert!(app.contains("new OrderRoute(),"));
    assert!(app.contains("this.app.use('/api', route.router);"));
}

#[test]
fn test_shared_scope() {
    assert_eq!(SharedArtifact::for_scope(false).len(), 4);
    let full = SharedArtifact::for_scope(true);
    assert_eq!(full.len(), 6);
    assert!(full.contains(&SharedArtifact::Server));
    for kind in full {
        let artifact = kind.to_artifact(&[user()], &ctx()).unwrap();
        assert!(artifact.path.starts_with("src"));
    }
}

#[test]
fn test_render_context_urls() {
    let mut c = ctx();
    c.base_url = "http://localhost:3000/".to_string();
    c.api_prefix = "api/".to_string();
    assert_eq!(c.api_base_url(), "http://localhost:3000/api");
    assert_eq!(c.mount_prefix(), "/api");
    c.api_prefix = String::new();
    assert_eq!(c.api_base_url(), "http://localhost:3000");
    assert_eq!(c.mount_prefix(), "/");
}
