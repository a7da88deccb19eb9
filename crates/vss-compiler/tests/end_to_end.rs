//! Full pipeline runs against files on disk.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use vss_compiler::deploy::{Cardinality, DeployFlatMap, DeployType};
use vss_compiler::permissions::PermissionRegistry;
use vss_compiler::schema::vss_name_candidates;
use vss_compiler::{collect_implementations, Compiler, CompilerConfig, CompilerError};

const PRELUDE: &str = r#"
directive @range(min: Float, max: Float) on FIELD_DEFINITION | INPUT_FIELD_DEFINITION | ARGUMENT_DEFINITION | INPUT_OBJECT
directive @hasPermissions(permissions: [String]) on FIELD_DEFINITION | INPUT_FIELD_DEFINITION | ARGUMENT_DEFINITION | OBJECT | INPUT_OBJECT
"#;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn write(&self, name: &str, content: &str) {
        fs::write(self.dir.path().join(name), content).unwrap();
    }

    fn schema(&self, sdl: &str) {
        self.write("schema.graphql", &format!("{PRELUDE}{sdl}"));
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    fn compiler(&self) -> Compiler {
        Compiler::new(CompilerConfig {
            schema_path: self.path("schema.graphql"),
            layer_path: self.path("vspec.depl"),
            permissions_path: self.path("permissions.yaml"),
            ..CompilerConfig::default()
        })
    }
}

#[test]
fn custom_can_binding_resolves_through_layer_files() {
    let project = Project::new();
    project.schema("type Query { vehicle: Vehicle }\ntype Vehicle { speed: Float }\n");
    project.write("vspec.depl", "Vehicle: !include vehicle.depl\n");
    project.write(
        "vehicle.depl",
        r#"
Speed:
  _custom:
    origin: CAN
    sharedOrigin: true
    methods:
      read:
        source:
          attribute: speed
"#,
    );

    let output = project.compiler().compile().unwrap();
    let vehicle = output.schema.object("Vehicle").unwrap();
    assert!(vehicle.is_entry_point);

    let speed = &vehicle.fields["speed"];
    assert!(!speed.is_list);
    let Some(DeployType::CustomBinding(custom)) = &speed.deploy else {
        panic!("expected a custom binding on Vehicle.speed");
    };
    assert_eq!(custom.origin, "CAN");
    assert!(custom.shared_origin);
    assert!(!custom.shared_attribute);

    let includes: Vec<String> = collect_implementations(&output.schema).into_iter().collect();
    assert_eq!(includes, vec!["cAN/vehicle".to_string()]);
}

#[test]
fn permission_ids_survive_across_runs() {
    let project = Project::new();
    project.write("vspec.depl", "Vehicle: {}\n");

    project.schema(
        r#"type Query { vehicle: Vehicle }
type Vehicle { speed: Float @hasPermissions(permissions: ["Vehicle.Speed_READ"]) }
"#,
    );
    let first = project.compiler().compile().unwrap();
    assert!(first.permissions_saved);
    assert_eq!(first.permissions.get("Vehicle.Speed_READ"), Some(0));

    project.schema(
        r#"type Query { vehicle: Vehicle }
type Vehicle {
  speed: Float @hasPermissions(permissions: ["Vehicle.Speed_READ", "Vehicle.Cabin_READ"])
}
"#,
    );
    let second = project.compiler().compile().unwrap();
    assert!(second.permissions_changed);
    assert_eq!(second.permissions.get("Vehicle.Speed_READ"), Some(0));
    assert_eq!(second.permissions.get("Vehicle.Cabin_READ"), Some(1));

    let persisted = PermissionRegistry::create(&project.path("permissions.yaml")).unwrap();
    let ids: Vec<(String, u32)> = persisted.iter().map(|(p, id)| (p.to_string(), id)).collect();
    assert_eq!(
        ids,
        vec![
            ("Vehicle.Speed_READ".to_string(), 0),
            ("Vehicle.Cabin_READ".to_string(), 1),
        ]
    );
    assert!(!persisted.changed());
}

#[test]
fn check_never_writes_the_registry() {
    let project = Project::new();
    project.write("vspec.depl", "{}\n");
    project.schema(
        r#"type Query { vehicle: Vehicle }
type Vehicle { speed: Float @hasPermissions(permissions: ["Vehicle.Speed_READ"]) }
"#,
    );

    let output = project.compiler().check().unwrap();
    assert!(output.permissions_changed);
    assert!(!Path::new(&project.path("permissions.yaml")).exists());
}

#[test]
fn name_candidates() {
    assert_eq!(vss_name_candidates("isOpen"), vec!["IsOpen"]);
    assert_eq!(vss_name_candidates("speed"), vec!["Speed", "SPEED", "speed"]);
    assert_eq!(vss_name_candidates("ABS"), vec!["ABS"]);
}

#[test]
fn flat_map_keeps_list_entries_in_order() {
    let project = Project::new();
    project.write(
        "vspec.depl",
        r#"
Vehicle:
  Cabin:
    Door:
      - Row: 1
      - Row: 2
"#,
    );

    let layer = vss_compiler::deploy::load_layer(&project.path("vspec.depl")).unwrap();
    let flat = DeployFlatMap::from_tree(&layer);

    assert!(flat.contains("Vehicle"));
    assert!(flat.contains("Vehicle_Cabin"));
    let door = flat.get("Vehicle_Cabin_Door").unwrap();
    assert!(!door.is_many());
    assert_eq!(door.first().unwrap().cardinality, Cardinality::Many);

    let rows = flat.get("Vehicle_Cabin_Door_Row").unwrap();
    assert!(rows.is_many());
    let values: Vec<&serde_json::Value> =
        rows.entries().iter().map(|e| &e.config["_constants"]).collect();
    assert_eq!(values, vec![&serde_json::json!(1), &serde_json::json!(2)]);
}

#[test]
fn cyclic_list_items_terminate() {
    let project = Project::new();
    project.write("vspec.depl", "{}\n");
    project.schema(
        r#"type Query { doors: [Door] }
type Door { window: Window }
type Window { door: Door }
"#,
    );

    let compiler = project.compiler();
    let first = compiler.check().unwrap();
    for name in ["Door", "Window"] {
        assert!(first.schema.object(name).unwrap().is_list_item, "{name}");
    }

    let second = compiler.check().unwrap();
    let flags = |out: &vss_compiler::CompileOutput| {
        out.schema
            .objects()
            .map(|o| (o.name.clone(), o.is_list_item, o.is_list))
            .collect::<Vec<_>>()
    };
    assert_eq!(flags(&first), flags(&second));
}

#[test]
fn unions_are_rejected() {
    let project = Project::new();
    project.write("vspec.depl", "{}\n");
    project.schema(
        r#"type Query { thing: Thing }
type A { x: Int }
type B { y: Int }
union Thing = A | B
"#,
    );

    let err = project.compiler().check().unwrap_err();
    assert!(matches!(err, CompilerError::UnsupportedType { ref name, .. } if name == "Thing"));
}

#[test]
fn missing_include_is_reported() {
    let project = Project::new();
    project.schema("type Query { x: Int }\n");
    project.write("vspec.depl", "Vehicle: !include missing.depl\n");

    let err = project.compiler().check().unwrap_err();
    assert!(matches!(err, CompilerError::IncludeNotFound { .. }));
}
