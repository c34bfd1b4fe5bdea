use bevy::prelude::*;

use clap::Parser;
use rand::Rng;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::fs;
use std::path::{Path, PathBuf};

use wayfinder::ai::components::{HierarchyStatus, PathRequest, RebuildHierarchy, WaypointPath};
use wayfinder::ai::error::GraphResult;
use wayfinder::ai::fixed_math::FixedVec3;
use wayfinder::ai::fsm::{tick_state_machines, NpcBrain, State, StateMachine};
use wayfinder::ai::graph::{save_graph, WaypointGraph};
use wayfinder::ai::waypoint::WaypointId;
use wayfinder::ai::WaypointPlugin;

const DEMO_GRID_SIZE: usize = 12;
const DEMO_SPACING: f32 = 2.0;
const DEMO_EDGE_DROP_CHANCE: f64 = 0.15;
const DEMO_AGENTS: usize = 8;
const LOG_PREFIX: &str = "wayfinder";

/// Builds a waypoint hierarchy and answers a few random path requests headlessly
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RON navmesh to load; a random grid is generated when omitted
    nav_mesh: Option<PathBuf>,

    /// Write the built graph to this file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Directory for run logs
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Number of older run logs to keep
    #[arg(long, default_value_t = 25)]
    keep_logs: usize,
}

/// Routes tracing to stdout and to a per-run file in `dir`. Returns the file path.
fn init_logging(dir: &Path, keep: usize) -> PathBuf {
    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!("Failed to create log directory {}: {}", dir.display(), e);
    }
    prune_run_logs(dir, keep);

    let file_name = format!("{}_{}.log", LOG_PREFIX, chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let file_layer = fmt::layer()
        .with_writer(RollingFileAppender::new(Rotation::NEVER, dir, &file_name))
        .with_ansi(false);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bevy_ecs=info,{}=info", LOG_PREFIX)));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    dir.join(file_name)
}

/// Deletes the oldest run logs so at most `keep` remain before this run's file.
fn prune_run_logs(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| n.starts_with(LOG_PREFIX) && n.ends_with(".log"))
        })
        .collect();
    logs.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));
    let excess = logs.len().saturating_sub(keep);
    for entry in logs.into_iter().take(excess) {
        let _ = fs::remove_file(entry.path());
    }
}

/// Square grid of waypoints with 4-neighbor edges, a few of them removed at random.
fn random_grid() -> GraphResult<WaypointGraph> {
    let mut rng = rand::rng();
    let mut graph = WaypointGraph::new();
    let mut ids = Vec::with_capacity(DEMO_GRID_SIZE * DEMO_GRID_SIZE);
    for y in 0..DEMO_GRID_SIZE {
        for x in 0..DEMO_GRID_SIZE {
            let pos = FixedVec3::from_f32(x as f32 * DEMO_SPACING, y as f32 * DEMO_SPACING, 0.0);
            ids.push(graph.add_waypoint(pos)?);
        }
    }
    for y in 0..DEMO_GRID_SIZE {
        for x in 0..DEMO_GRID_SIZE {
            let here = ids[y * DEMO_GRID_SIZE + x];
            if x + 1 < DEMO_GRID_SIZE && !rng.random_bool(DEMO_EDGE_DROP_CHANCE) {
                graph.connect(here, ids[y * DEMO_GRID_SIZE + x + 1])?;
            }
            if y + 1 < DEMO_GRID_SIZE && !rng.random_bool(DEMO_EDGE_DROP_CHANCE) {
                graph.connect(here, ids[(y + 1) * DEMO_GRID_SIZE + x])?;
            }
        }
    }
    Ok(graph)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum AgentMode {
    Waiting,
    Walking,
    Stuck,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum AgentSignal {
    PathReady,
    PathFailed,
}

fn agent_brain() -> NpcBrain<AgentMode, AgentSignal> {
    let mut fsm = StateMachine::new(State::new(AgentMode::Waiting, "Waiting"));
    fsm.add_state(State::new(AgentMode::Walking, "Walking"));
    fsm.add_state(State::new(AgentMode::Stuck, "Stuck"));
    for (event, to) in [(AgentSignal::PathReady, AgentMode::Walking), (AgentSignal::PathFailed, AgentMode::Stuck)] {
        if let Err(e) = fsm.add_transition(event, AgentMode::Waiting, to) {
            error!("[FSM] {}", e);
        }
    }
    NpcBrain::new(fsm)
}

#[derive(Component)]
struct Agent(usize);

fn report_paths(
    mut agents: Query<(&Agent, &WaypointPath, &mut NpcBrain<AgentMode, AgentSignal>), Added<WaypointPath>>,
) {
    for (agent, path, mut brain) in &mut agents {
        match path {
            WaypointPath::Found(found) => {
                info!(
                    "Agent {}: {} waypoints, cost {:.2}, {} nodes explored",
                    agent.0,
                    found.path.len(),
                    found.cost.to_num::<f32>(),
                    found.nodes_explored
                );
                brain.send(AgentSignal::PathReady);
            }
            WaypointPath::Failed(reason) => {
                info!("Agent {}: no path ({:?})", agent.0, reason);
                brain.send(AgentSignal::PathFailed);
            }
        }
    }
}

fn main() {
    let args = Args::parse();
    let log_file = init_logging(&args.log_dir, args.keep_logs);
    info!("Logging to {}", log_file.display());

    let graph = match &args.nav_mesh {
        Some(path) => WaypointGraph::load_nav_mesh(path),
        None => random_grid(),
    };
    let graph = match graph {
        Ok(graph) => graph,
        Err(e) => {
            error!("Failed to prepare navmesh: {}", e);
            return;
        }
    };
    info!("Navmesh ready: {} waypoints", graph.waypoint_count());
    let waypoints: Vec<WaypointId> = graph.levels()[0].nodes().collect();

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(WaypointPlugin::default())
        .insert_resource(graph)
        .add_systems(Update, (report_paths, tick_state_machines::<AgentMode, AgentSignal>).chain());

    app.world_mut().write_message(RebuildHierarchy);
    app.update();

    if let Some(report) = &app.world().resource::<HierarchyStatus>().last_build {
        info!("Hierarchy levels: {:?} ({:?})", report.level_sizes, report.stop);
    }

    if waypoints.len() >= 2 {
        let mut rng = rand::rng();
        for i in 0..DEMO_AGENTS {
            let start = waypoints[rng.random_range(0..waypoints.len())];
            let goal = waypoints[rng.random_range(0..waypoints.len())];
            let entity = app.world_mut().spawn((Agent(i), agent_brain())).id();
            app.world_mut().write_message(PathRequest { entity, start, goal });
        }
        // One frame answers the requests, the next one reports and ticks the brains
        app.update();
        app.update();
    }

    let mut brains = app.world_mut().query::<(&Agent, &NpcBrain<AgentMode, AgentSignal>)>();
    for (agent, brain) in brains.iter(app.world()) {
        info!("Agent {} is {}", agent.0, brain.machine.current_state_name());
    }

    if let Some(path) = &args.save {
        match save_graph(path, app.world().resource::<WaypointGraph>()) {
            Ok(()) => info!("Saved graph to {}", path.display()),
            Err(e) => error!("Failed to save graph: {}", e),
        }
    }
}
