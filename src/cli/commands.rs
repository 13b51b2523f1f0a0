//! Command dispatch and execution

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use serde_json::json;
use tracing::{debug, instrument};

use crate::application::services::{ChartSession, MentorService};
use crate::cli::args::{Cli, Commands, ConfigCommands, MentorCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{MutationResult, NodeView, RenderTreeNode, Size, TreeNodeConvert};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Execute the CLI command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, run `orgtree --help`".into(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            cmd_completion(*shell);
            Ok(())
        }
        Commands::Config { command } => cmd_config(cli, command),
        Commands::Tree { unassigned } => cmd_tree(&create_container(cli)?, *unassigned),
        Commands::Unassigned => cmd_unassigned(&create_container(cli)?),
        Commands::Render { pretty } => cmd_render(&create_container(cli)?, *pretty),
        Commands::Fit { width, height } => cmd_fit(&create_container(cli)?, *width, *height),
        Commands::Mentor { command } => cmd_mentor(&create_container(cli)?, command),
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("resolve current directory", e).into()),
    }
}

/// Layered settings with command line overrides applied last.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = project_dir(cli)?;
    let mut settings = Settings::load(Some(dir.as_path()))?;
    if settings.members_file.is_relative() {
        settings.members_file = dir.join(&settings.members_file);
    }
    if let Some(file) = &cli.members_file {
        settings.members_file = file.clone();
    }
    if let Some(org) = &cli.organization {
        settings.organization_id = Some(org.clone());
    }
    debug!(members_file = %settings.members_file.display(), "settings loaded");
    Ok(settings)
}

fn create_container(cli: &Cli) -> CliResult<ServiceContainer> {
    Ok(ServiceContainer::new(load_settings(cli)?)?)
}

/// Fetch members and build the chart.
fn load_chart(container: &ServiceContainer) -> CliResult<(MentorService, ChartSession)> {
    let mut service = container.mentor_service();
    service.refresh()?;
    let mut session = container.chart_session()?;
    session.set_members(service.members());
    Ok((service, session))
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::action("global", "(no config directory)"),
            }
            output::action("local", &local_config_path(&project_dir(cli)?).display());
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_tree(container: &ServiceContainer, show_unassigned: bool) -> CliResult<()> {
    let (_, session) = load_chart(container)?;
    if session.is_empty() {
        output::warning("no founder hierarchies, every member is unassigned");
    }
    output::info(&session.tree().to_tree_string());

    for cycle in session.forest().cycles() {
        output::warning(&format!("mentor cycle broken: {}", cycle.join(" -> ")));
    }

    if show_unassigned {
        print_unassigned(session.unassigned());
    }
    Ok(())
}

fn cmd_unassigned(container: &ServiceContainer) -> CliResult<()> {
    let (_, session) = load_chart(container)?;
    print_unassigned(session.unassigned());
    Ok(())
}

fn print_unassigned(nodes: &[RenderTreeNode]) {
    output::header(&format!("Unassigned ({})", nodes.len()));
    for node in nodes {
        let view = NodeView::new(node);
        output::detail(&format!(
            "{}  {}",
            node.member_id().unwrap_or("-"),
            view.label()
        ));
    }
}

fn cmd_render(container: &ServiceContainer, pretty: bool) -> CliResult<()> {
    let (_, session) = load_chart(container)?;
    let document = json!({
        "organization": session.tree(),
        "unassigned": session.unassigned(),
    });
    let text = if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
    .map_err(InfraError::from)?;
    output::info(&text);
    Ok(())
}

fn cmd_fit(container: &ServiceContainer, width: f64, height: f64) -> CliResult<()> {
    if !(width > 0.0 && height > 0.0) {
        return Err(CliError::InvalidArgs(format!(
            "viewport must be positive, got {width}x{height}"
        )));
    }
    let (_, mut session) = load_chart(container)?;
    let bbox = (!session.is_empty()).then(|| session.measure());
    let transform = session.fit_measured(Size::new(width, height));
    let document = json!({
        "container": Size::new(width, height),
        "bbox": bbox,
        "transform": transform,
    });
    output::info(&serde_json::to_string_pretty(&document).map_err(InfraError::from)?);
    Ok(())
}

fn cmd_mentor(container: &ServiceContainer, command: &MentorCommands) -> CliResult<()> {
    let mut service = container.mentor_service();
    service.refresh()?;

    match command {
        MentorCommands::Assign {
            member,
            mentor,
            query,
        } => {
            let mentor = match mentor {
                Some(id) => id.clone(),
                None => match service.pick_mentor(member, query, container.selector.as_ref())? {
                    Some(id) => id,
                    None => {
                        output::info("No mentor selected");
                        return Ok(());
                    }
                },
            };
            let result = service.assign(member, &mentor)?;
            report(container, &service, member, result)
        }
        MentorCommands::Remove { member } => {
            let result = service.remove(member)?;
            report(container, &service, member, result)
        }
        MentorCommands::Candidates { member, query } => {
            let items = service.selection_items(member, query)?;
            if items.is_empty() {
                output::warning(&format!("no candidates match '{query}'"));
            }
            for item in items {
                output::info(&format!("{}\t{}", item.value, item.display));
            }
            Ok(())
        }
    }
}

/// Print the member's new chain of mentors, or fail with the store's message.
fn report(
    container: &ServiceContainer,
    service: &MentorService,
    member: &str,
    result: MutationResult,
) -> CliResult<()> {
    if !result.success {
        return Err(CliError::Rejected(
            result.message.unwrap_or_else(|| "unknown error".into()),
        ));
    }

    let mut session = container.chart_session()?;
    session.set_members(service.members());
    let path = session.forest().path_to_root(member);
    output::success(&format!("Updated {member}"));
    output::detail(&path.join(" -> "));
    Ok(())
}
