//! vss-codegen: compiles a VSS GraphQL schema and its deployment layers into
//! the resolver model, and inspects the result.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vss_compiler::schema::{NamedType, VssSchema};
use vss_compiler::vss::{filter_vss_tree, VssNode};
use vss_compiler::{collect_implementations, CompileOutput, Compiler, CompilerConfig};

mod ui;

#[derive(Parser)]
#[command(name = "vss-codegen")]
#[command(about = "VSS schema compiler - GraphQL schema + deployment layers to resolver model")]
#[command(version)]
struct Cli {
    /// GraphQL schema file
    #[arg(long, global = true, default_value = "schema.graphql")]
    graphql: PathBuf,

    /// Root deployment layer (.depl)
    #[arg(long, global = true, default_value = "vspec.depl")]
    layer: PathBuf,

    /// Permission registry (YAML), created if missing
    #[arg(long, global = true, default_value = "permissions.yaml")]
    perms: PathBuf,

    /// Schema language
    #[arg(short, long, global = true, default_value = "graphql")]
    language: String,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the IR and print summary counts, without writing the registry
    Check,

    /// Print every IR node in scalar, enum, input, object order
    Dump,

    /// Print the implementation include set
    Includes,

    /// Print the permission registry
    Permissions,

    /// Print the synthesized directives for each deployed VSS node
    Directives {
        /// vss-tools JSON export of the signal tree
        #[arg(long)]
        vss: PathBuf,
    },
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let compiler = Compiler::new(CompilerConfig {
        schema_path: cli.graphql,
        layer_path: cli.layer,
        permissions_path: cli.perms,
        language: cli.language,
    });

    match cli.command {
        Commands::Check => {
            let start = Instant::now();
            let spinner = ui::spinner("Checking schema...");
            let output = match compiler.check() {
                Ok(output) => output,
                Err(e) => {
                    spinner.finish_and_clear();
                    ui::nope_header();
                    return Err(e.into());
                }
            };
            spinner.finish_and_clear();

            ui::print_compact_header(env!("CARGO_PKG_VERSION"));
            ui::looking_good();
            let stats = output.stats();
            println!();
            println!(
                "    {} scalars {} {} enums {} {} inputs {} {} objects",
                stats.scalars,
                ui::symbols::DOT,
                stats.enums,
                ui::symbols::DOT,
                stats.inputs,
                ui::symbols::DOT,
                stats.objects
            );
            println!(
                "    {} deploy entries {} {} permissions",
                stats.deploy_entries,
                ui::symbols::DOT,
                stats.permissions
            );
            if output.permissions_changed {
                ui::dim("New permissions found; run another command to persist them.");
            }
            ui::timing("Checked", start.elapsed().as_millis());
        }

        Commands::Dump => {
            let output = compiler.compile()?;
            dump_schema(&output.schema);
            report_permissions(&output);
        }

        Commands::Includes => {
            let output = compiler.compile()?;
            for include in collect_implementations(&output.schema) {
                println!("{include}");
            }
        }

        Commands::Permissions => {
            let output = compiler.compile()?;
            for (permission, id) in output.permissions.iter() {
                ui::permission_line(id, permission);
            }
        }

        Commands::Directives { vss } => {
            let mut output = compiler.compile()?;
            let tree = VssNode::load(&vss)?;
            let root = filter_vss_tree(&tree, Some(&output.flat_map), &mut output.permissions)?;
            for node in root.walk() {
                if node.directives.is_empty() {
                    ui::dim(&node.qualified_name("."));
                } else {
                    ui::node_line(&format!("{}{}", node.qualified_name("."), node.directives));
                }
            }
            if compiler.save_permissions(&output.permissions)? {
                ui::success("Permissions updated");
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report_permissions(output: &CompileOutput) {
    if output.permissions_saved {
        ui::success("Permissions updated");
    }
}

fn dump_schema(schema: &VssSchema) {
    for (kind, ids) in schema.sections() {
        ui::section(kind.as_str(), ids.len());
        for id in ids {
            let ty = schema.get(*id);
            ui::node_line(&ty.to_string());
            match ty {
                NamedType::Enum(e) => {
                    for value in &e.values {
                        ui::child_line(value);
                    }
                }
                NamedType::InputObject(input) => {
                    for field in input.fields.values() {
                        ui::child_line(&schema.render_input_field(field));
                    }
                }
                NamedType::Object(object) => {
                    for field in object.fields.values() {
                        ui::child_line(&schema.render_field(field));
                    }
                    if let Some(locals) = &object.local_attributes {
                        let names: Vec<&str> = locals.keys().map(String::as_str).collect();
                        ui::dim(&format!("    local attributes: {}", names.join(", ")));
                    }
                }
                NamedType::Scalar(_) => {}
            }
        }
    }
}
