//! Built-in schema of a configuration module, before any provider is attached.

use crate::schema::{AttributeSchema, BlockSchema, BlockType, BodySchema, ExprConstraint, LiteralType};

fn string() -> Vec<ExprConstraint> {
    vec![ExprConstraint::string()]
}

fn number() -> Vec<ExprConstraint> {
    vec![ExprConstraint::number()]
}

fn dynamic() -> Vec<ExprConstraint> {
    vec![ExprConstraint::literal(LiteralType::Dynamic)]
}

fn references() -> Vec<ExprConstraint> {
    vec![ExprConstraint::list_of(vec![ExprConstraint::Reference])]
}

fn for_each() -> Vec<ExprConstraint> {
    vec![
        ExprConstraint::Map { elem: dynamic() },
        ExprConstraint::Set { elem: string(), min_items: 0, max_items: 0 },
    ]
}

/// Root body with the top-level blocks every module accepts. Provider-specific bodies are
/// attached later as dependent bodies of `provider`, `resource` and `data`.
pub fn core_module_schema() -> BodySchema {
    BodySchema::new()
        .block("terraform", terraform_block())
        .block("provider", provider_block())
        .block("resource", resource_block())
        .block("data", data_block())
        .block("module", module_block())
        .block("variable", variable_block())
        .block("output", output_block())
        .block("locals", locals_block())
}

fn terraform_block() -> BlockSchema {
    let requirement = BodySchema::new()
        .attribute("source", AttributeSchema::optional(string()).described("Source address of the provider"))
        .attribute("version", AttributeSchema::optional(string()).described("Version constraint for the provider"));
    let required_providers = BlockSchema::new(BlockType::Object)
        .described("Providers required by this module")
        .items(0, 1)
        .body(BodySchema::new().any_attribute(AttributeSchema::optional(vec![ExprConstraint::Object {
            attributes: requirement.attributes,
        }])));
    let backend = BlockSchema::new(BlockType::Object)
        .described("Where state snapshots are stored")
        .label("type", true)
        .items(0, 1);

    BlockSchema::new(BlockType::Object)
        .described("Terraform settings")
        .body(
            BodySchema::new()
                .attribute("required_version", AttributeSchema::optional(string()).described("Terraform CLI version constraint"))
                .attribute("experiments", AttributeSchema::optional(vec![ExprConstraint::Set {
                    elem: vec![ExprConstraint::Keyword("experiment".into())],
                    min_items: 0,
                    max_items: 0,
                }]))
                .block("required_providers", required_providers)
                .block("backend", backend),
        )
}

fn provider_block() -> BlockSchema {
    BlockSchema::new(BlockType::Object).described("Provider configuration").label("name", true).body(
        BodySchema::new()
            .attribute("alias", AttributeSchema::optional(string()).described("Alias for an additional configuration"))
            .attribute("version", AttributeSchema::optional(string()).described("Deprecated provider version constraint")),
    )
}

fn meta_arguments() -> BodySchema {
    BodySchema::new()
        .attribute("count", AttributeSchema::optional(number()).described("Number of instances to create"))
        .attribute("for_each", AttributeSchema::optional(for_each()).described("One instance per map key or set member"))
        .attribute("provider", AttributeSchema::optional(vec![ExprConstraint::Reference]).described("Provider configuration to use"))
        .attribute("depends_on", AttributeSchema::optional(references()).described("Explicit dependencies"))
}

fn resource_block() -> BlockSchema {
    let lifecycle = BlockSchema::new(BlockType::Object).described("Lifecycle customizations").items(0, 1).body(
        BodySchema::new()
            .attribute("create_before_destroy", AttributeSchema::optional(vec![ExprConstraint::bool()]))
            .attribute("prevent_destroy", AttributeSchema::optional(vec![ExprConstraint::bool()]))
            .attribute("ignore_changes", AttributeSchema::optional(references()))
            .attribute("replace_triggered_by", AttributeSchema::optional(references())),
    );
    BlockSchema::new(BlockType::Object)
        .described("Managed resource")
        .label("type", true)
        .label("name", false)
        .body(meta_arguments().block("lifecycle", lifecycle))
}

fn data_block() -> BlockSchema {
    BlockSchema::new(BlockType::Object)
        .described("Data source")
        .label("type", true)
        .label("name", false)
        .body(meta_arguments())
}

fn module_block() -> BlockSchema {
    BlockSchema::new(BlockType::Nil).described("Module call").label("name", false).body(
        BodySchema::new()
            .attribute("source", AttributeSchema::required(string()).described("Source of the module"))
            .attribute("version", AttributeSchema::optional(string()).described("Module version constraint"))
            .attribute("count", AttributeSchema::optional(number()))
            .attribute("for_each", AttributeSchema::optional(for_each()))
            .attribute("providers", AttributeSchema::optional(vec![ExprConstraint::Map { elem: vec![ExprConstraint::Reference] }]))
            .attribute("depends_on", AttributeSchema::optional(references())),
    )
}

fn variable_block() -> BlockSchema {
    BlockSchema::new(BlockType::Nil).described("Input variable").label("name", false).body(
        BodySchema::new()
            .attribute("description", AttributeSchema::optional(string()))
            .attribute("default", AttributeSchema::optional(dynamic()))
            .attribute("type", AttributeSchema::optional(vec![ExprConstraint::Keyword("type".into())]))
            .attribute("sensitive", AttributeSchema::optional(vec![ExprConstraint::bool()]))
            .attribute("nullable", AttributeSchema::optional(vec![ExprConstraint::bool()])),
    )
}

fn output_block() -> BlockSchema {
    BlockSchema::new(BlockType::Nil).described("Output value").label("name", false).body(
        BodySchema::new()
            .attribute("value", AttributeSchema::required(dynamic()))
            .attribute("description", AttributeSchema::optional(string()))
            .attribute("sensitive", AttributeSchema::optional(vec![ExprConstraint::bool()]))
            .attribute("depends_on", AttributeSchema::optional(references())),
    )
}

fn locals_block() -> BlockSchema {
    BlockSchema::new(BlockType::Nil)
        .described("Local values")
        .body(BodySchema::new().any_attribute(AttributeSchema::optional(dynamic())))
}
