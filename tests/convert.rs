use serde_json::{json, Value};
use tempfile::TempDir;
use tf_schema_ir::source::{load_module_schema, SourceError};
use tf_schema_ir::{generate, lower, Error, ErrorKind, Type};

fn write(dir: &std::path::Path, rel: &str, value: Value) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}

fn aws_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "providers.json", json!({ "aws": { "source": "hashicorp/aws", "version": "5.31.0" } }));
    write(
        dir.path(),
        "schemas/aws.json",
        json!({
            "format_version": "1.0",
            "provider_schemas": {
                "registry.terraform.io/hashicorp/aws": {
                    "provider": {
                        "version": 0,
                        "block": { "attributes": { "region": { "type": "string", "optional": true } } }
                    },
                    "resource_schemas": {
                        "aws_x": {
                            "version": 0,
                            "block": {
                                "description": "An X",
                                "attributes": {
                                    "id": { "type": "string", "optional": true, "computed": true },
                                    "arn": { "type": "string", "computed": true },
                                    "name": { "type": "string", "required": true },
                                    "tags": { "type": ["map", "string"], "optional": true },
                                    "zones": { "type": ["list", "string"], "computed": true }
                                },
                                "block_types": {
                                    "rule": {
                                        "nesting_mode": "list",
                                        "min_items": 1,
                                        "block": {
                                            "attributes": { "rule_id": { "type": "string", "computed": true } }
                                        }
                                    },
                                    "timeouts": {
                                        "nesting_mode": "single",
                                        "block": { "attributes": { "create": { "type": "string", "optional": true } } }
                                    }
                                }
                            }
                        }
                    },
                    "data_source_schemas": {
                        "aws_y": {
                            "version": 0,
                            "block": { "attributes": { "owner": { "type": "string", "computed": true } } }
                        }
                    }
                }
            }
        }),
    );
    dir
}

#[test]
fn provider_directory_lowers_to_expected_ir() {
    let dir = aws_fixture();
    let ir = generate(dir.path()).unwrap();
    let wire = serde_json::to_value(&ir).unwrap();

    let resource = &wire["schema"]["resource"]["type"]["Object"];
    assert_eq!(resource["open"], json!(true));

    let instances = &resource["content"]["aws_x"];
    assert_eq!(instances["description"], json!("Managed resource"));
    let aws_x = &instances["type"]["Dictionary"]["Object"];
    assert_eq!(aws_x["open"], json!(false));
    assert_eq!(
        aws_x["content"]["arn"],
        json!({ "description": "", "optional": true, "computed": true, "type": "String" })
    );
    assert_eq!(aws_x["content"]["id"]["optional"], json!(false));
    assert_eq!(aws_x["content"]["name"]["computed"], json!(false));
    assert_eq!(aws_x["content"]["tags"]["type"], json!("Dynamic"));
    assert_eq!(aws_x["content"]["zones"]["type"], json!({ "List": { "content": "String" } }));
    assert_eq!(aws_x["content"]["zones"]["computed"], json!(false));
    assert_eq!(aws_x["content"]["rule"]["type"]["List"]["min"], json!(1));
    assert!(aws_x["content"]["rule"]["type"]["List"].get("max").is_none());
    assert_eq!(aws_x["content"]["timeouts"]["type"]["Object"]["open"], json!(false));

    let paths: Vec<(bool, String)> = ir.computed_fields.iter().map(|f| (f.force, f.path.join("."))).collect();
    assert_eq!(
        paths,
        vec![
            (true, "resource.aws_x._.id".to_string()),
            (true, "resource.aws_x._.arn".to_string()),
            (true, "data.aws_y._.owner".to_string()),
        ]
    );
}

#[test]
fn provider_and_data_blocks_are_open() {
    let dir = aws_fixture();
    let ir = generate(dir.path()).unwrap();
    for key in ["provider", "resource", "data"] {
        assert!(matches!(ir.schema[key].ty, Type::Object { open: true, .. }), "{key}");
    }
    let Type::Object { content, .. } = &ir.schema["provider"].ty else { panic!("expected object") };
    assert!(matches!(content["aws"].ty, Type::Object { open: false, .. }));
}

#[test]
fn merged_schema_dump_lowers_identically() {
    let dir = aws_fixture();
    let merged = load_module_schema(dir.path()).unwrap();
    let dumped = serde_json::to_string(&merged).unwrap();
    let reloaded = tf_schema_ir::path_de::from_str_with_path(&dumped).unwrap();
    assert_eq!(lower::lower_module(&reloaded).unwrap(), generate(dir.path()).unwrap());
}

#[test]
fn malformed_version_is_a_provider_resolution_failure() {
    let dir = aws_fixture();
    write(dir.path(), "providers.json", json!({ "aws": { "source": "hashicorp/aws", "version": "not-a-version" } }));
    let err = generate(dir.path()).unwrap_err();
    assert!(matches!(err, Error::Source(SourceError::InvalidVersion { .. })));
    assert_eq!(err.kind(), ErrorKind::ProviderResolution);
    assert_eq!(err.kind().exit_code(), 3);
}

#[test]
fn map_nested_blocks_become_dictionaries() {
    let dir = aws_fixture();
    write(
        dir.path(),
        "schemas/aws.json",
        json!({
            "format_version": "1.0",
            "provider_schemas": {
                "registry.terraform.io/hashicorp/aws": {
                    "provider": { "version": 0, "block": {} },
                    "resource_schemas": {
                        "aws_z": {
                            "version": 0,
                            "block": {
                                "block_types": {
                                    "listener": {
                                        "nesting_mode": "map",
                                        "block": { "attributes": { "port": { "type": "number", "required": true } } }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }),
    );
    let wire = serde_json::to_value(generate(dir.path()).unwrap()).unwrap();
    let aws_z = &wire["schema"]["resource"]["type"]["Object"]["content"]["aws_z"]["type"]["Dictionary"]["Object"];
    assert_eq!(
        aws_z["content"]["listener"]["type"],
        json!({
            "Dictionary": {
                "Object": {
                    "open": false,
                    "content": { "port": { "description": "", "optional": true, "computed": false, "type": "Number" } }
                }
            }
        })
    );
}
