#![forbid(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use pkf_manager::config::Config;
use pkf_manager::groups::{self, Group};
use pkf_manager::{JsonPreferenceStore, NodeStorage, PrefValue, PreferenceStore, SettingsSession, SysfsNodes};

/// Phantom key press filter settings manager
#[derive(Debug, Parser)]
#[command(name = "pkf-manager", version, about)]
struct Cli {
    /// Root the driver nodes are resolved against
    #[arg(long, global = true)]
    sysfs_root: Option<PathBuf>,

    /// Preference file
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reapply stored preferences to the driver nodes (run at boot)
    Restore,
    /// Refresh stored preferences from the current node values
    Reconcile {
        #[arg(long, value_enum)]
        group: Option<GroupArg>,
    },
    /// Show every setting with its node and stored values
    Status,
    /// Print the current node value of one setting
    Get { id: String },
    /// Store a new value for one setting and apply it to its node
    Set { id: String, value: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GroupArg {
    HomeKey,
    TouchKeys,
}

impl From<GroupArg> for Group {
    fn from(arg: GroupArg) -> Self {
        match arg {
            GroupArg::HomeKey => Group::HomeKey,
            GroupArg::TouchKeys => Group::TouchKeys,
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let log_level = match level {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to install log subscriber")
}

/// Group that owns `id`
fn find_group(id: &str, nodes: &Arc<dyn NodeStorage>) -> Result<Group> {
    Group::ALL
        .into_iter()
        .find(|group| group.registry(nodes.clone()).contains(id))
        .with_context(|| format!("Unknown setting '{}'", id))
}

fn restore(nodes: Arc<dyn NodeStorage>, store: &dyn PreferenceStore) -> Result<()> {
    if !groups::is_module_supported(nodes.as_ref()) {
        bail!("Phantom key presses filter module not found");
    }

    info!("Restoring phantom key presses filter preferences...");
    for group in Group::ALL {
        // One failed group must not keep the other from being restored
        match group.registry(nodes.clone()).restore(store) {
            Ok(report) if report.failed.is_empty() => {
                info!(group = group.name(), applied = report.applied.len(), "Group restored");
            }
            Ok(report) => {
                warn!(group = group.name(), failed = ?report.failed, "Group restored with failures");
            }
            Err(e) => error!(group = group.name(), error = ?e, "Failed to restore group"),
        }
    }
    info!("Restoring preferences completed");
    Ok(())
}

fn reconcile(nodes: Arc<dyn NodeStorage>, store: &dyn PreferenceStore, only: Option<Group>) -> Result<()> {
    let selected: Vec<Group> = match only {
        Some(group) => vec![group],
        None => Group::ALL.to_vec(),
    };

    for group in selected {
        let report = group
            .registry(nodes.clone())
            .reconcile(store)
            .with_context(|| format!("Failed to reconcile {}", group.name()))?;
        println!("{}: {} updated", group.name(), report.staged.len());
        for id in &report.staged {
            println!("  {}", id);
        }
    }
    Ok(())
}

fn status(nodes: Arc<dyn NodeStorage>, store: &dyn PreferenceStore) -> Result<()> {
    let prefs = store.snapshot()?;
    let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    println!(
        "module: {}",
        if groups::is_module_supported(nodes.as_ref()) { "loaded" } else { "not found" }
    );
    for group in Group::ALL {
        let registry = group.registry(nodes.clone());
        println!("\n[{}]", group.name());
        println!("{:<28} {:<8} {:<10} {:<12} {:<12} {}", "id", "kind", "access", "node", "stored", "default");
        for id in registry.ids() {
            let Some(setting) = registry.lookup(id) else { continue };
            let node = if setting.is_supported() {
                show(setting.pref_value().map(|v| v.to_string()))
            } else {
                "unsupported".to_string()
            };
            println!(
                "{:<28} {:<8} {:<10} {:<12} {:<12} {}",
                id,
                setting.kind().as_str(),
                if setting.is_read_only() { "read-only" } else { "rw" },
                node,
                show(prefs.get(id).map(|v| v.to_string())),
                show(setting.default_pref_value().map(|v| v.to_string())),
            );
        }
    }
    Ok(())
}

fn get(nodes: Arc<dyn NodeStorage>, id: &str) -> Result<()> {
    let registry = find_group(id, &nodes)?.registry(nodes);
    let Some(setting) = registry.lookup(id) else {
        bail!("Unknown setting '{}'", id);
    };

    if !setting.is_supported() {
        bail!("Setting '{}' is not supported on this kernel", id);
    }
    match setting.pref_value().or_else(|| setting.default_pref_value()) {
        Some(value) => println!("{}", value),
        None => bail!("Node for '{}' holds no valid {} value", id, setting.kind()),
    }
    Ok(())
}

fn set(nodes: Arc<dyn NodeStorage>, store: Arc<dyn PreferenceStore>, id: &str, input: &str) -> Result<()> {
    let registry = Arc::new(find_group(id, &nodes)?.registry(nodes));
    let Some(kind) = registry.lookup(id).map(|setting| setting.kind()) else {
        bail!("Unknown setting '{}'", id);
    };
    let value = PrefValue::parse(kind, input)?;

    // Same path as an interactive edit: the store change reaches the node through the session
    let (mut session, _) = SettingsSession::attach(registry, store)?;
    session.set_preference(id, &value)?;
    session.detach();

    info!(id = %id, value = %value, "Setting updated");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(root) = cli.sysfs_root {
        config.sysfs_root = root;
    }
    if let Some(prefs) = cli.prefs {
        config.preferences_path = Some(prefs);
    }

    let rejected_level = config.validate();

    init_logging(&config.log_level)?;
    if let Some(level) = rejected_level {
        warn!(log_level = %level, "Unknown log_level, using info");
    }
    info!(path = %Config::path().display(), config = ?config, "Starting");

    let nodes: Arc<dyn NodeStorage> = Arc::new(SysfsNodes::new(config.sysfs_root.clone()));
    let store: Arc<dyn PreferenceStore> = Arc::new(JsonPreferenceStore::open(config.preferences_path()));

    match cli.command {
        Command::Restore => restore(nodes, store.as_ref()),
        Command::Reconcile { group } => reconcile(nodes, store.as_ref(), group.map(Group::from)),
        Command::Status => status(nodes, store.as_ref()),
        Command::Get { id } => get(nodes, &id),
        Command::Set { id, value } => set(nodes, store, &id, &value),
    }
}
