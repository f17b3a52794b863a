mod session;
mod world;

use anyhow::{Context, Result, ensure};
use clap::{Parser, ValueEnum};
use maze_agent_core::{
    Agent, GameQuery, Move, Position,
    agent::RandomWalker,
    learning::QLearningAgent,
    load_maze_from_file,
    maze::Tile,
    planner::PlanningAgent,
};
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    collections::HashMap,
    io::{self, Stdout},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    session::SessionConfig,
    world::{Status, World},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AgentKind {
    /// Risk-aware greedy path planner
    Planner,
    /// Tabular Q-learning
    Learner,
    /// Random walk without reversals
    Random,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Map file to load
    #[arg(short, long, value_name = "MAP_FILE", default_value = "maps/classic.txt")]
    map: PathBuf,

    /// Strategy playing the game
    #[arg(short, long, value_enum, default_value_t = AgentKind::Planner)]
    agent: AgentKind,

    /// JSON session file (tick timing, lives, strategy settings)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Seed for the agents and the ghosts
    #[arg(short, long)]
    seed: Option<u64>,

    /// Headless learner episodes to run before playing
    #[arg(long, default_value_t = 0)]
    train_episodes: u32,

    /// Write the learner's Q-table here after training
    #[arg(long, value_name = "FILE")]
    export_q_table: Option<PathBuf>,

    /// Play one episode without the terminal UI and print the result
    #[arg(long)]
    headless: bool,

    /// Directory for the log file
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

struct App {
    /// The simulated game.
    world: World,
    /// The strategy choosing Pac-Man's moves.
    agent: Box<dyn Agent>,
    /// Time the agent gets per decision.
    deadline: Duration,
    last_move: Move,
    /// Flag to control the main loop.
    should_quit: bool,
    paused: bool,
}

impl App {
    fn new(world: World, agent: Box<dyn Agent>, deadline: Duration) -> Self {
        App {
            world,
            agent,
            deadline,
            last_move: Move::Neutral,
            should_quit: false,
            paused: false,
        }
    }

    /// Asks the agent for a move and advances the world by one tick.
    fn tick(&mut self) -> Status {
        if self.world.status().is_over() {
            return self.world.status();
        }
        let deadline = Instant::now() + self.deadline;
        self.last_move = self.agent.get_move(&self.world.view(), deadline);
        self.world.step(self.last_move)
    }

    fn restart(&mut self) {
        self.world.restart();
        self.last_move = Move::Neutral;
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(&args.log_dir)?;

    let mut session = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        session = session.with_seed(seed);
    }
    ensure!(
        args.agent == AgentKind::Learner
            || (args.train_episodes == 0 && args.export_q_table.is_none()),
        "--train-episodes and --export-q-table need --agent learner"
    );

    let maze = load_maze_from_file(&args.map)
        .with_context(|| format!("Failed to load map {}", args.map.display()))?;
    info!(
        "Loaded {} with {} nodes, {} pills, {} power pills, {} ghosts",
        args.map.display(),
        maze.node_count(),
        maze.pill_nodes().len(),
        maze.power_pill_nodes().len(),
        maze.ghost_spawns().len()
    );

    let world_seed = args.seed.unwrap_or_else(rand::random);
    let mut world = World::new(maze, session.rules(), world_seed);
    let agent = build_agent(&args, &session, &mut world)?;
    let mut app = App::new(world, agent, session.deadline());

    if args.headless {
        while !app.tick().is_over() {}
        println!(
            "{}: {:?} after {} ticks, score {}, lives {}",
            app.agent.name(),
            app.world.status(),
            app.world.ticks(),
            app.world.score(),
            app.world.lives()
        );
        return Ok(());
    }

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app, session.tick_rate());
    restore_terminal(&mut terminal)?;
    result
}

/// Logs go to a file only; anything written to stdout would tear the UI.
fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(log_dir, "maze_agent.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    info!("Log file: {}/maze_agent.log", log_dir.display());
    Ok(guard)
}

fn build_agent(args: &Args, session: &SessionConfig, world: &mut World) -> Result<Box<dyn Agent>> {
    let agent: Box<dyn Agent> = match args.agent {
        AgentKind::Planner => Box::new(PlanningAgent::new(session.planner.clone())),
        AgentKind::Random => {
            let seed = args.seed.unwrap_or_else(rand::random);
            Box::new(RandomWalker::new(seed))
        }
        AgentKind::Learner => {
            let mut learner = QLearningAgent::new(session.learning.clone());
            if args.train_episodes > 0 {
                train(&mut learner, world, args.train_episodes, session.deadline());
            }
            if let Some(path) = &args.export_q_table {
                learner
                    .export_q_table(path)
                    .with_context(|| format!("Failed to export Q-table to {}", path.display()))?;
            }
            if args.train_episodes > 0 {
                learner.reset(0.0);
            }
            Box::new(learner)
        }
    };
    info!("Agent: {}", agent.name());
    Ok(agent)
}

/// Runs whole episodes without rendering, restarting the world after each.
fn train(learner: &mut QLearningAgent, world: &mut World, episodes: u32, deadline: Duration) {
    info!("Training for {} episodes", episodes);
    for _ in 0..episodes {
        while !world.status().is_over() {
            let mv = learner.get_move(&world.view(), Instant::now() + deadline);
            world.step(mv);
        }
        info!(
            "Training episode {}: {:?} score={} reward={:.2}",
            world.episode(),
            world.status(),
            world.score(),
            learner.total_reward()
        );
        let exploration_rate = learner.exploration_rate();
        learner.reset(exploration_rate);
        world.restart();
    }
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                    KeyCode::Char(' ') => app.paused = !app.paused,
                    KeyCode::Char('r') => app.restart(),
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if !app.paused {
                app.tick();
            }
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(9),
            Constraint::Length(2),
        ])
        .split(frame.area());

    render_map(frame, main_layout[0], app);
    render_status(frame, main_layout[1], app);

    let help_text = Paragraph::new("'q'/'Esc' quit  'space' pause  'r' restart")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Renders the episode counters and the last planned route.
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let world = &app.world;
    let snapshot = world.snapshot();
    let status = match world.status() {
        Status::Running if app.paused => "paused".to_string(),
        status => format!("{status:?}"),
    };

    let mut items = vec![
        ListItem::new(format!(
            "Agent: {}  Episode: {}  Status: {}",
            app.agent.name(),
            world.episode(),
            status
        )),
        ListItem::new(format!(
            "Tick: {}  Score: {}  Lives: {}  Last move: {}",
            world.ticks(),
            world.score(),
            world.lives(),
            app.last_move
        )),
        ListItem::new(format!(
            "Pills left: {}  Power pills left: {}",
            snapshot.remaining_pills(),
            snapshot.remaining_power_pills()
        )),
    ];

    if let Some(path) = app.agent.planned_path() {
        let safety = if path.is_safe() {
            Span::styled("safe", Style::default().fg(Color::Green))
        } else {
            Span::styled("unsafe", Style::default().fg(Color::Red))
        };
        items.push(ListItem::new(Line::from(vec![
            Span::raw(format!(
                "Target: {:?}  Length: {}  Value: {}  ",
                path.target_kind(),
                path.length(),
                path.value()
            )),
            safety,
        ])));
        items.push(ListItem::new(format!("Route: {}", path.description())));
    }

    let status_widget =
        List::new(items).block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status_widget, area);
}

/// Renders the maze with pills, ghosts, Pac-Man and the planned route.
fn render_map(frame: &mut Frame, area: Rect, app: &App) {
    let world = &app.world;
    let maze = world.maze();
    let view = world.view();
    let snapshot = world.snapshot();

    // Route cells coloured by the safety of the segment landing on them.
    let route: HashMap<usize, bool> = app
        .agent
        .planned_path()
        .map(|path| {
            path.segments()
                .iter()
                .map(|segment| (segment.start, segment.safe))
                .collect()
        })
        .unwrap_or_default();

    let mut lines: Vec<Line> = Vec::with_capacity(maze.height());
    for y in 0..maze.height() {
        let mut spans: Vec<Span> = Vec::with_capacity(maze.width());
        for x in 0..maze.width() {
            let Some(node) = maze.node_at(Position { x, y }) else {
                let tile_char = match maze.tile(x, y) {
                    Some(Tile::Wall) | None => "#",
                    Some(Tile::Corridor) => " ",
                };
                spans.push(Span::styled(tile_char, Style::default().fg(Color::DarkGray)));
                continue;
            };

            let ghost = snapshot.obstacles.iter().find(|g| g.node == node);
            let span = if node == snapshot.pacman {
                Span::styled("@", Style::default().fg(Color::Yellow).bold())
            } else if let Some(ghost) = ghost {
                let color = if ghost.edible { Color::Blue } else { Color::Red };
                Span::styled("G", Style::default().fg(color).bold())
            } else {
                let glyph = if view.has_available_power_pill(node) {
                    "o"
                } else if view.has_available_pill(node) {
                    "."
                } else {
                    " "
                };
                match route.get(&node) {
                    Some(&safe) => {
                        let color = if safe { Color::Green } else { Color::Red };
                        let glyph = if glyph == " " { "*" } else { glyph };
                        Span::styled(glyph, Style::default().fg(color))
                    }
                    None => Span::styled(glyph, Style::default().fg(Color::White)),
                }
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Maze Agent").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}
