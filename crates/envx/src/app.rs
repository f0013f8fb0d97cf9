use clap::{Arg, ArgAction, Command};

fn env_arg() -> Arg {
    Arg::new("env")
        .long("env")
        .short('e')
        .help("Environment name (default: from config, else 'development')")
}

fn project_arg() -> Arg {
    Arg::new("project")
        .help("Project name")
        .required(true)
        .index(1)
}

pub fn build_cli() -> Command {
    Command::new("envx")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Lightning-fast environment variable management")
        .long_about("envx is a local-first CLI tool to manage environment variables across all your projects. Each project holds named environments (development, production, ...) and each environment holds key/value variables, optionally marked secret.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("init")
                .about("Initialize a new project")
                .arg(project_arg())
                .arg(env_arg())
                .arg(
                    Arg::new("desc")
                        .long("desc")
                        .short('d')
                        .help("Project description")
                )
        )
        .subcommand(
            Command::new("set")
                .about("Set one or more environment variables")
                .arg(project_arg())
                .arg(
                    Arg::new("pairs")
                        .help("Assignments in KEY=value form")
                        .required(true)
                        .num_args(1..)
                        .index(2)
                )
                .arg(env_arg())
                .arg(
                    Arg::new("desc")
                        .long("desc")
                        .short('d')
                        .help("Variable description")
                )
                .arg(
                    Arg::new("secret")
                        .long("secret")
                        .short('s')
                        .help("Mark the variables as secret (masked in list output)")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("get")
                .about("Print the value of an environment variable")
                .arg(project_arg())
                .arg(
                    Arg::new("key")
                        .help("Variable key")
                        .required(true)
                        .index(2)
                )
                .arg(env_arg())
                .arg(
                    Arg::new("no-newline")
                        .short('n')
                        .help("Don't print a trailing newline (useful for piping)")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("list")
                .about("List all variables of an environment")
                .arg(project_arg())
                .arg(env_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("show-secrets")
                        .long("show-secrets")
                        .help("Print secret values unmasked")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("delete")
                .about("Delete an environment variable")
                .arg(project_arg())
                .arg(
                    Arg::new("key")
                        .help("Variable key to delete")
                        .required(true)
                        .index(2)
                )
                .arg(env_arg())
        )
        .subcommand(
            Command::new("projects")
                .about("List all projects")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("envs")
                .about("List the environments of a project")
                .arg(project_arg())
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a project and all of its variables")
                .arg(project_arg())
                .arg(
                    Arg::new("force")
                        .long("force")
                        .short('f')
                        .help("Skip the confirmation prompt")
                        .action(ArgAction::SetTrue)
                )
        )
}
