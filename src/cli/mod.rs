#![forbid(unsafe_code)]

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::config;
use crate::error::AutodevError;
use crate::output::table::Table;
use crate::sim::roster;
use crate::sim::script::Script;
use crate::sim::timeline::AgentTimeline;
use crate::task::model::{Priority, Task, TaskDraft, TaskPatch, TaskStatus};
use crate::task::snapshot::FileSnapshot;
use crate::task::store::TaskStore;

#[derive(Debug, Parser)]
#[command(
    name = "autodev",
    version,
    about = "Task manager with a scripted agent-team collaboration feed"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Add(AddArgs),
    List(ListArgs),
    Show(ShowArgs),
    Update(UpdateArgs),
    #[command(alias = "rm")]
    Remove(RemoveArgs),
    Agents(AgentsArgs),
    Simulate(SimulateArgs),
    Config(ConfigArgs),
    Version,
}

#[derive(Debug, Parser)]
pub struct AddArgs {
    /// Task title (must be non-empty)
    pub title: String,
    #[arg(short = 'd', long = "description", default_value = "")]
    pub description: String,
    /// todo|in-progress|completed
    #[arg(short = 's', long = "status", default_value = "todo")]
    pub status: String,
    /// low|medium|high
    #[arg(short = 'p', long = "priority", default_value = "medium")]
    pub priority: String,
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Only tasks with this status
    #[arg(long = "status")]
    pub status: Option<String>,
    /// Only tasks with this priority
    #[arg(long = "priority")]
    pub priority: Option<String>,
    /// Output in JSON format
    #[arg(long = "json")]
    pub json: bool,
    /// Output in CSV format
    #[arg(long = "csv")]
    pub csv: bool,
    /// Include descriptions and completion times
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(Debug, Parser)]
pub struct ShowArgs {
    pub id: String,
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct UpdateArgs {
    pub id: String,
    #[arg(long = "title")]
    pub title: Option<String>,
    #[arg(short = 'd', long = "description")]
    pub description: Option<String>,
    /// todo|in-progress|completed
    #[arg(short = 's', long = "status")]
    pub status: Option<String>,
    /// low|medium|high
    #[arg(short = 'p', long = "priority")]
    pub priority: Option<String>,
}

#[derive(Debug, Parser)]
pub struct RemoveArgs {
    pub id: String,
}

#[derive(Debug, Parser)]
pub struct AgentsArgs {
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct SimulateArgs {
    /// Dump the full message sequence as JSON after the run settles
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    /// Print the config file path
    Path,
    /// Print the resolved configuration
    List,
    /// Print one value by dot path
    Get { key: String },
    /// Set one value by dot path
    Set { key: String, value: String },
}

pub async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.cmd {
        Commands::Add(args) => cmd_add(args)?,
        Commands::List(args) => cmd_list(&args)?,
        Commands::Show(args) => cmd_show(&args)?,
        Commands::Update(args) => cmd_update(args)?,
        Commands::Remove(args) => cmd_remove(&args)?,
        Commands::Agents(args) => cmd_agents(&args)?,
        Commands::Simulate(args) => cmd_simulate(&args).await?,
        Commands::Config(args) => cmd_config(&args)?,
        Commands::Version => println!("{}", version_string()),
    }
    Ok(ExitCode::SUCCESS)
}

fn version_string() -> String {
    format!("autodev {}", env!("CARGO_PKG_VERSION"))
}

fn load_cfg() -> anyhow::Result<config::Config> {
    let (cfg, _paths) = config::load()?;
    Ok(cfg)
}

fn open_store(cfg: &config::Config) -> anyhow::Result<TaskStore> {
    let path = config::expand_path(&cfg.store.snapshot_path)?;
    Ok(TaskStore::open(Box::new(FileSnapshot::new(path))))
}

fn cmd_add(args: AddArgs) -> anyhow::Result<()> {
    // The store treats a non-empty title as a precondition; this boundary
    // enforces it.
    if args.title.trim().is_empty() {
        anyhow::bail!("task title must not be empty");
    }
    let status: TaskStatus = args.status.parse()?;
    let priority: Priority = args.priority.parse()?;

    let cfg = load_cfg()?;
    let mut store = open_store(&cfg)?;
    let task = store.create(TaskDraft {
        title: args.title.trim().to_owned(),
        description: args.description,
        status,
        priority,
    });

    println!("Task '{}' added (ID: {})", task.title, task.id);
    println!(
        "Status: {}, Priority: {}",
        task.status.as_str(),
        task.priority.as_str()
    );
    Ok(())
}

fn cmd_list(args: &ListArgs) -> anyhow::Result<()> {
    let status = args
        .status
        .as_deref()
        .map(str::parse::<TaskStatus>)
        .transpose()?;
    let priority = args
        .priority
        .as_deref()
        .map(str::parse::<Priority>)
        .transpose()?;

    let cfg = load_cfg()?;
    let store = open_store(&cfg)?;
    let tasks: Vec<&Task> = store
        .tasks()
        .iter()
        .filter(|t| status.is_none_or(|s| t.status == s))
        .filter(|t| priority.is_none_or(|p| t.priority == p))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    let mut table = if args.verbose {
        Table::new(["ID", "TITLE", "STATUS", "PRIORITY", "CREATED", "COMPLETED", "DESCRIPTION"])
            .max_cell_width(48)
    } else {
        Table::new(["ID", "TITLE", "STATUS", "PRIORITY", "CREATED"])
    };
    for t in &tasks {
        if args.verbose {
            table.row([
                t.id.clone(),
                t.title.clone(),
                t.status.as_str().to_owned(),
                t.priority.as_str().to_owned(),
                format_ts(t.created_at),
                t.completed_at.map(format_ts).unwrap_or_default(),
                t.description.clone(),
            ]);
        } else {
            table.row([
                t.id.clone(),
                t.title.clone(),
                t.status.as_str().to_owned(),
                t.priority.as_str().to_owned(),
                format_ts(t.created_at),
            ]);
        }
    }

    if args.csv {
        table.write_csv()?;
    } else {
        table.print()?;
    }
    Ok(())
}

fn cmd_show(args: &ShowArgs) -> anyhow::Result<()> {
    let cfg = load_cfg()?;
    let store = open_store(&cfg)?;
    let task = store
        .get(&args.id)
        .ok_or_else(|| AutodevError::TaskNotFound(args.id.clone()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(task)?);
        return Ok(());
    }

    println!("ID:          {}", task.id);
    println!("Title:       {}", task.title);
    if !task.description.is_empty() {
        println!("Description: {}", task.description);
    }
    println!("Status:      {}", task.status.as_str());
    println!("Priority:    {}", task.priority.as_str());
    println!("Created:     {}", format_ts(task.created_at));
    if let Some(at) = task.completed_at {
        println!("Completed:   {}", format_ts(at));
    }
    Ok(())
}

fn cmd_update(args: UpdateArgs) -> anyhow::Result<()> {
    if let Some(title) = args.title.as_deref()
        && title.trim().is_empty()
    {
        anyhow::bail!("task title must not be empty");
    }
    let patch = TaskPatch {
        title: args.title.map(|t| t.trim().to_owned()),
        description: args.description,
        status: args.status.as_deref().map(str::parse).transpose()?,
        priority: args.priority.as_deref().map(str::parse).transpose()?,
        completed_at: None,
    };
    if patch.title.is_none()
        && patch.description.is_none()
        && patch.status.is_none()
        && patch.priority.is_none()
    {
        anyhow::bail!("nothing to update (pass --title, --description, --status or --priority)");
    }

    let cfg = load_cfg()?;
    let mut store = open_store(&cfg)?;
    if !store.update(&args.id, &patch) {
        return Err(AutodevError::TaskNotFound(args.id).into());
    }

    let task = store.get(&args.id).ok_or(AutodevError::TaskNotFound(args.id))?;
    println!(
        "Task '{}' updated (status: {}, priority: {})",
        task.title,
        task.status.as_str(),
        task.priority.as_str()
    );
    Ok(())
}

fn cmd_remove(args: &RemoveArgs) -> anyhow::Result<()> {
    let cfg = load_cfg()?;
    let mut store = open_store(&cfg)?;
    if !store.delete(&args.id) {
        return Err(AutodevError::TaskNotFound(args.id.clone()).into());
    }
    println!("Task {} removed", args.id);
    Ok(())
}

fn cmd_agents(args: &AgentsArgs) -> anyhow::Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(roster::ROSTER)?);
        return Ok(());
    }

    let cfg = load_cfg()?;
    let mut table = Table::new(["ID", "NAME", "ROLE", "STATUS"]);
    for agent in roster::ROSTER {
        let name = if cfg.ui.avatars {
            format!("{} {}", agent.avatar, agent.name)
        } else {
            agent.name.to_owned()
        };
        table.row([
            agent.id.to_owned(),
            name,
            agent.role.to_owned(),
            format!("{:?}", agent.status).to_lowercase(),
        ]);
    }
    table.print()?;
    Ok(())
}

async fn cmd_simulate(args: &SimulateArgs) -> anyhow::Result<()> {
    let cfg = load_cfg()?;
    let mut script = Script::standard();
    script.grace = Duration::from_millis(cfg.simulation.grace_ms);

    let timeline = AgentTimeline::new(script);
    timeline.start();
    println!("Agent collaboration started ({} agents)\n", timeline.roster().len());

    let poll = Duration::from_millis(cfg.simulation.poll_interval_ms);
    let mut printed = 0usize;
    loop {
        tokio::time::sleep(poll).await;
        let messages = timeline.messages();
        for m in &messages[printed..] {
            // Unknown agent references are skipped, never fatal.
            let Some(agent) = roster::find(&m.agent_id) else {
                continue;
            };
            if cfg.ui.avatars {
                println!("{} {} ({}) [{}]", agent.avatar, agent.name, agent.role, m.kind.as_str());
            } else {
                println!("{} ({}) [{}]", agent.name, agent.role, m.kind.as_str());
            }
            println!("  {}\n", m.content);
        }
        printed = messages.len();
        if !timeline.is_active() {
            break;
        }
    }
    println!("Simulation settled ({printed} messages)");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&timeline.messages())?);
    }
    Ok(())
}

fn cmd_config(args: &ConfigArgs) -> anyhow::Result<()> {
    match &args.cmd {
        ConfigCmd::Path => {
            let paths = config::default_paths()?;
            println!("{}", paths.config_file.display());
        }
        ConfigCmd::List => {
            print!("{}", config::list_resolved_toml()?);
        }
        ConfigCmd::Get { key } => {
            let value = config::get_value_string(key)?
                .ok_or_else(|| AutodevError::InvalidConfigKey(key.clone()))?;
            println!("{value}");
        }
        ConfigCmd::Set { key, value } => {
            config::set_value_string(key, value)?;
        }
    }
    Ok(())
}

fn format_ts(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| "unknown".to_owned())
}
