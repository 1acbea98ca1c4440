//! Authorizer scaffolding
//!
//! Generates a Rust module containing a unit struct that implements
//! [`Authorizer`](crate::core::auth::Authorizer) with every operation
//! allowed.
//!
//! | Invocation                         | File                                     | Type              |
//! |------------------------------------|------------------------------------------|-------------------|
//! | `blog`                             | `{app}/authorizers/blog_authorizer.rs`   | `BlogAuthorizer`  |
//! | `posts --resource` (server `v1`)   | `{app}/v1/posts/post_authorizer.rs`      | `PostAuthorizer`  |

use crate::config::{GeneratorConfig, JsonApiConfig};
use crate::core::{AUTHORIZER_METHODS, GeneratorError, Inflector, JsonApiResult};
use crate::generator::writer::write_atomic;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "authorizer.rs";

const TEMPLATE: &str = r#"//! {{ class_name }}: authorizer for {% if resource_type %}the `{{ resource_type }}` resource{% else %}any resource{% endif %}.
//!
//! Module: `{{ namespace }}`

use jsonapi::core::auth::{AuthRequest, Authorizer};

#[derive(Debug, Clone, Copy, Default)]
pub struct {{ class_name }};

impl Authorizer for {{ class_name }} {
{%- for method in methods %}
    fn {{ method }}(&self, _request: &AuthRequest) -> bool {
        true
    }
{% endfor -%}
}
"#;

/// Name of the implemented capability
pub const AUTHORIZER_INTERFACE: &str = "jsonapi::core::auth::Authorizer";

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("authorizer name pattern is valid")
});

/// Options of a generation run
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Generate a resource-scoped authorizer inside a server namespace
    pub resource: bool,
    /// Explicit server; required for resource generation with several servers
    pub server: Option<String>,
    /// Replace an existing file
    pub force: bool,
}

/// Description of a generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub path: PathBuf,
    pub namespace: String,
    pub class_name: String,
    pub interface: String,
    /// Resource type for resource-scoped authorizers
    pub resource_type: Option<String>,
}

/// Generator of authorizer scaffolds
pub struct AuthorizerGenerator {
    config: GeneratorConfig,
    servers: Vec<String>,
    tera: Tera,
}

impl AuthorizerGenerator {
    /// Create a generator for the given configured server names
    pub fn new<I, S>(config: GeneratorConfig, servers: I) -> JsonApiResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)
            .map_err(|e| GeneratorError::Template {
                message: e.to_string(),
            })?;

        Ok(Self {
            config,
            servers: servers.into_iter().map(Into::into).collect(),
            tera,
        })
    }

    pub fn from_config(config: &JsonApiConfig) -> JsonApiResult<Self> {
        Self::new(config.generator.clone(), config.server_names())
    }

    /// Resolve the server of a resource-scoped authorizer
    ///
    /// An explicit name must be configured; without one, a single configured
    /// server is used implicitly.
    pub fn resolve_server(&self, explicit: Option<&str>) -> Result<String, GeneratorError> {
        if let Some(name) = explicit {
            return self
                .servers
                .iter()
                .find(|s| s.as_str() == name)
                .cloned()
                .ok_or_else(|| GeneratorError::UnknownServer {
                    name: name.to_string(),
                });
        }

        match self.servers.as_slice() {
            [] => Err(GeneratorError::NoServers),
            [only] => Ok(only.clone()),
            many => Err(GeneratorError::AmbiguousServer {
                available: many.to_vec(),
            }),
        }
    }

    /// Work out the artifact without touching the filesystem
    pub fn plan(&self, name: &str, options: &GenerateOptions) -> JsonApiResult<GeneratedArtifact> {
        if !NAME_PATTERN.is_match(name) {
            return Err(GeneratorError::InvalidName {
                name: name.to_string(),
            }
            .into());
        }

        let root = self.config.root_namespace.trim_end_matches("::");

        if !options.resource {
            let module = Inflector::snake(name);
            return Ok(GeneratedArtifact {
                path: self
                    .config
                    .app_path
                    .join("authorizers")
                    .join(format!("{}_authorizer.rs", module)),
                namespace: format!("{}::authorizers", root),
                class_name: format!("{}Authorizer", Inflector::studly(name)),
                interface: AUTHORIZER_INTERFACE.to_string(),
                resource_type: None,
            });
        }

        let server = self.resolve_server(options.server.as_deref())?;
        let server_module = Inflector::snake(&server);
        let resource_module = Inflector::snake(name);
        let singular = Inflector::singularize(name);

        Ok(GeneratedArtifact {
            path: self
                .config
                .app_path
                .join(&server_module)
                .join(&resource_module)
                .join(format!("{}_authorizer.rs", Inflector::snake(&singular))),
            namespace: format!("{}::{}::{}", root, server_module, resource_module),
            class_name: format!("{}Authorizer", Inflector::studly(&singular)),
            interface: AUTHORIZER_INTERFACE.to_string(),
            resource_type: Some(name.to_string()),
        })
    }

    /// Render the source of an artifact
    pub fn render(&self, artifact: &GeneratedArtifact) -> JsonApiResult<String> {
        let mut context = Context::new();
        context.insert("class_name", &artifact.class_name);
        context.insert("namespace", &artifact.namespace);
        context.insert(
            "resource_type",
            artifact.resource_type.as_deref().unwrap_or(""),
        );
        context.insert("methods", &AUTHORIZER_METHODS);

        let source = self
            .tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| GeneratorError::Template {
                message: e.to_string(),
            })?;
        Ok(source)
    }

    /// Plan, render and write an authorizer
    ///
    /// Nothing is written when any step fails.
    pub fn generate(
        &self,
        name: &str,
        options: &GenerateOptions,
    ) -> JsonApiResult<GeneratedArtifact> {
        let artifact = self.plan(name, options)?;
        let source = self.render(&artifact)?;

        write_atomic(&artifact.path, &source, options.force)?;

        tracing::info!(
            path = %artifact.path.display(),
            class = %artifact.class_name,
            namespace = %artifact.namespace,
            "authorizer created"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::JsonApiError;

    fn generator(servers: &[&str]) -> AuthorizerGenerator {
        AuthorizerGenerator::new(
            GeneratorConfig {
                app_path: PathBuf::from("app"),
                root_namespace: "crate::json_api".to_string(),
            },
            servers.iter().copied(),
        )
        .unwrap()
    }

    fn resource(server: Option<&str>) -> GenerateOptions {
        GenerateOptions {
            resource: true,
            server: server.map(str::to_string),
            force: false,
        }
    }

    #[test]
    fn test_plan_generic() {
        let artifact = generator(&["beta", "v1"])
            .plan("blog", &GenerateOptions::default())
            .unwrap();

        assert_eq!(artifact.path, PathBuf::from("app/authorizers/blog_authorizer.rs"));
        assert_eq!(artifact.namespace, "crate::json_api::authorizers");
        assert_eq!(artifact.class_name, "BlogAuthorizer");
        assert_eq!(artifact.interface, AUTHORIZER_INTERFACE);
    }

    #[test]
    fn test_plan_resource_single_server() {
        let artifact = generator(&["v1"]).plan("posts", &resource(None)).unwrap();

        assert_eq!(artifact.path, PathBuf::from("app/v1/posts/post_authorizer.rs"));
        assert_eq!(artifact.namespace, "crate::json_api::v1::posts");
        assert_eq!(artifact.class_name, "PostAuthorizer");
    }

    #[test]
    fn test_resolve_server() {
        assert_eq!(generator(&["v1"]).resolve_server(None).unwrap(), "v1");
        assert_eq!(
            generator(&["beta", "v1"]).resolve_server(Some("v1")).unwrap(),
            "v1"
        );
        assert!(matches!(
            generator(&["beta", "v1"]).resolve_server(None),
            Err(GeneratorError::AmbiguousServer { .. })
        ));
        assert!(matches!(
            generator(&["v1"]).resolve_server(Some("v2")),
            Err(GeneratorError::UnknownServer { .. })
        ));
        assert!(matches!(
            generator(&[]).resolve_server(None),
            Err(GeneratorError::NoServers)
        ));
    }

    #[test]
    fn test_generic_ignores_server() {
        let options = GenerateOptions {
            resource: false,
            server: Some("missing".to_string()),
            force: false,
        };
        assert!(generator(&["v1"]).plan("blog", &options).is_ok());
    }

    #[test]
    fn test_invalid_name() {
        let err = generator(&["v1"])
            .plan("../posts", &GenerateOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            JsonApiError::Generator(GeneratorError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_render_contents() {
        let generator = generator(&["v1"]);
        let artifact = generator.plan("posts", &resource(None)).unwrap();
        let source = generator.render(&artifact).unwrap();

        assert!(source.contains("//! Module: `crate::json_api::v1::posts`"));
        assert!(source.contains("use jsonapi::core::auth::{AuthRequest, Authorizer};"));
        assert!(source.contains("pub struct PostAuthorizer;"));
        assert!(source.contains("impl Authorizer for PostAuthorizer {"));
        assert!(source.contains("the `posts` resource"));
        for method in AUTHORIZER_METHODS {
            assert!(
                source.contains(&format!("fn {}(&self, _request: &AuthRequest) -> bool", method)),
                "missing {}",
                method
            );
        }
    }

    #[test]
    fn test_render_generic_contents() {
        let generator = generator(&[]);
        let artifact = generator.plan("blog", &GenerateOptions::default()).unwrap();
        let source = generator.render(&artifact).unwrap();

        assert!(source.contains("any resource"));
        assert!(source.contains("impl Authorizer for BlogAuthorizer {"));
    }
}
