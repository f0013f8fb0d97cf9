use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use clap::ArgMatches;
use colored::Colorize;
use tracing::{error, info, warn};

use envx_core::config::{Config, EnvxConfig};
use envx_core::display::{display_value, mask_secret};
use envx_core::events;
use envx_core::validation::check_variable_key;
use envx_core::{JsonFileStore, ProfileManager, Variable};

use crate::table::VariableTable;

/// Everything a command handler needs for one invocation.
struct CliContext {
    manager: ProfileManager,
    config: EnvxConfig,
}

impl CliContext {
    /// Environment from `--env`, else the configured default.
    fn resolve_env<'a>(&'a self, matches: &'a ArgMatches) -> &'a str {
        matches
            .get_one::<String>("env")
            .map(String::as_str)
            .unwrap_or_else(|| self.config.default_environment())
    }
}

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
fn load_config_with_warning(paths: &Config) -> EnvxConfig {
    match EnvxConfig::load_hierarchy(paths) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check {} and ./.envx/config.toml for syntax errors.",
                e,
                paths.config_file().display()
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            EnvxConfig::default()
        }
    }
}

/// Split a `KEY=value` argument on the first '=' and check the key.
fn parse_assignment(pair: &str) -> Result<(&str, &str), String> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => {
            check_variable_key(key)
                .map_err(|reason| format!("invalid key '{}': {}", key, reason))?;
            Ok((key, value))
        }
        _ => Err(format!("invalid format: {} (expected KEY=value)", pair)),
    }
}

fn is_confirmation_accepted(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let paths = Config::new();
    let ctx = CliContext {
        manager: ProfileManager::new(JsonFileStore::from_config(&paths)),
        config: load_config_with_warning(&paths),
    };

    match matches.subcommand() {
        Some(("init", sub_matches)) => handle_init_command(&ctx, sub_matches),
        Some(("set", sub_matches)) => handle_set_command(&ctx, sub_matches),
        Some(("get", sub_matches)) => handle_get_command(&ctx, sub_matches),
        Some(("list", sub_matches)) => handle_list_command(&ctx, sub_matches),
        Some(("delete", sub_matches)) => handle_delete_command(&ctx, sub_matches),
        Some(("projects", sub_matches)) => handle_projects_command(&ctx, sub_matches),
        Some(("envs", sub_matches)) => handle_envs_command(&ctx, sub_matches),
        Some(("remove", sub_matches)) => handle_remove_command(&ctx, sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}

fn project_arg(matches: &ArgMatches) -> Result<&str, Box<dyn std::error::Error>> {
    matches
        .get_one::<String>("project")
        .map(String::as_str)
        .ok_or_else(|| "Project argument is required".into())
}

fn handle_init_command(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let project = project_arg(matches)?;
    let env = ctx.resolve_env(matches);
    let description = matches
        .get_one::<String>("desc")
        .map(String::as_str)
        .unwrap_or("");

    info!(event = "cli.init_started", project = project, env = env);

    match ctx.manager.init_project(project, description, env) {
        Ok(_) => {
            println!(
                "{} Initialized project '{}' with environment '{}'",
                "✓".green(),
                project,
                env
            );
            info!(event = "cli.init_completed", project = project);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} Failed to initialize project: {}", "✗".red(), e);
            error!(event = "cli.init_failed", project = project, error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn handle_set_command(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let project = project_arg(matches)?;
    let env = ctx.resolve_env(matches);
    let description = matches
        .get_one::<String>("desc")
        .map(String::as_str)
        .unwrap_or("");
    let is_secret = matches.get_flag("secret");

    // Reject malformed input before writing anything
    let mut assignments = Vec::new();
    for pair in matches.get_many::<String>("pairs").into_iter().flatten() {
        match parse_assignment(pair) {
            Ok(assignment) => assignments.push(assignment),
            Err(message) => {
                eprintln!("{} {}", "✗".red(), message);
                error!(event = "cli.set_invalid_pair", project = project);
                return Err(message.into());
            }
        }
    }

    info!(
        event = "cli.set_started",
        project = project,
        env = env,
        count = assignments.len()
    );

    for (key, value) in assignments {
        match ctx
            .manager
            .set_variable(project, env, key, value, description, is_secret)
        {
            Ok(variable) => {
                let shown = if variable.is_secret {
                    mask_secret(&variable.value)
                } else {
                    variable.value
                };
                println!("{} Set {}={}", "✓".green(), key, shown);
            }
            Err(e) => {
                eprintln!("{} Failed to set {}: {}", "✗".red(), key, e);
                error!(
                    event = "cli.set_failed",
                    project = project,
                    env = env,
                    key = key,
                    error = %e
                );
                events::log_app_error(&e);
                return Err(e.into());
            }
        }
    }

    info!(event = "cli.set_completed", project = project, env = env);
    Ok(())
}

fn handle_get_command(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let project = project_arg(matches)?;
    let env = ctx.resolve_env(matches);
    let key = matches
        .get_one::<String>("key")
        .ok_or("Key argument is required")?;

    info!(event = "cli.get_started", project = project, env = env, key = %key);

    match ctx.manager.get_variable(project, env, key) {
        Ok(variable) => {
            if matches.get_flag("no-newline") {
                print!("{}", variable.value);
                io::stdout().flush()?;
            } else {
                println!("{}", variable.value);
            }
            info!(event = "cli.get_completed", project = project, env = env, key = %key);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            error!(event = "cli.get_failed", project = project, env = env, error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn handle_list_command(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let project = project_arg(matches)?;
    let env = ctx.resolve_env(matches);
    let json_output = matches.get_flag("json");
    let show_secrets = matches.get_flag("show-secrets") || ctx.config.show_secrets();

    info!(event = "cli.list_started", project = project, env = env);

    let variables = match ctx.manager.list_variables(project, env) {
        Ok(variables) => variables,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            error!(event = "cli.list_failed", project = project, env = env, error = %e);
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    if json_output {
        let masked: BTreeMap<String, Variable> = variables
            .into_iter()
            .map(|(key, mut variable)| {
                variable.value = display_value(&variable, show_secrets);
                (key, variable)
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&masked)?);
        return Ok(());
    }

    println!();
    println!("{}", format!("📦 {} ({})", project, env).cyan());
    println!();

    if variables.is_empty() {
        println!("{}", "No variables set".yellow());
    } else {
        VariableTable::new(&variables, show_secrets).print(&variables);
        println!();
        match variables.len() {
            1 => println!("1 variable"),
            n => println!("{} variables", n),
        }
    }
    println!();

    info!(
        event = "cli.list_completed",
        project = project,
        count = variables.len()
    );
    Ok(())
}

fn handle_delete_command(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let project = project_arg(matches)?;
    let env = ctx.resolve_env(matches);
    let key = matches
        .get_one::<String>("key")
        .ok_or("Key argument is required")?;

    info!(event = "cli.delete_started", project = project, env = env, key = %key);

    match ctx.manager.delete_variable(project, env, key) {
        Ok(_) => {
            println!(
                "{} Deleted {} from {} ({})",
                "✓".green(),
                key,
                project,
                env
            );
            info!(event = "cli.delete_completed", project = project, env = env, key = %key);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} Failed to delete {}: {}", "✗".red(), key, e);
            error!(event = "cli.delete_failed", project = project, env = env, error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn handle_projects_command(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.projects_started");

    let projects = match ctx.manager.list_projects() {
        Ok(projects) => projects,
        Err(e) => {
            eprintln!("{} Failed to list projects: {}", "✗".red(), e);
            error!(event = "cli.projects_failed", error = %e);
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else if projects.is_empty() {
        println!("No projects found. Create one with: envx init <project>");
    } else {
        for name in &projects {
            println!("{}", name);
        }
    }

    info!(event = "cli.projects_completed", count = projects.len());
    Ok(())
}

fn handle_envs_command(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let project_name = project_arg(matches)?;

    info!(event = "cli.envs_started", project = project_name);

    let project = match ctx.manager.get_project(project_name) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            error!(event = "cli.envs_failed", project = project_name, error = %e);
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    for (name, env) in &project.environments {
        let marker = if *name == project.default_env {
            " (default)".cyan().to_string()
        } else {
            String::new()
        };
        println!("{}{}  {} variables", name, marker, env.len());
    }

    info!(
        event = "cli.envs_completed",
        project = project_name,
        count = project.environments.len()
    );
    Ok(())
}

fn handle_remove_command(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let project = project_arg(matches)?;

    if !matches.get_flag("force") {
        print!(
            "Remove project '{}' and all of its variables? [y/N] ",
            project
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        if !is_confirmation_accepted(&input) {
            println!("Aborted.");
            return Ok(());
        }
    }

    info!(event = "cli.remove_started", project = project);

    match ctx.manager.delete_project(project) {
        Ok(()) => {
            println!("{} Removed project '{}'", "✓".green(), project);
            info!(event = "cli.remove_completed", project = project);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} Failed to remove project: {}", "✗".red(), e);
            error!(event = "cli.remove_failed", project = project, error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}
