//! Headless command-line front end for the native build.
//!
//! Every subcommand goes through the same [`SectorApp`] messages the browser
//! build uses, so confirmation and persistence behave identically.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::{Effect, SectorApp};
use crate::config::{AppConfig, ConfigError, LogLevel};
use crate::format::FormatError;
use crate::geometry::{self, GeometryError, LngLat};
use crate::map::MapEvent;
use crate::message::Message;
use crate::model::{FrequencyField, SectorColor, SectorId};
use crate::panel::{AlwaysConfirm, Confirm, EMPTY_HINT, EMPTY_TITLE, PANEL_TITLE, PanelCommand};
use crate::storage::FileStore;

#[derive(Parser, Debug)]
#[command(name = "sectormap", version, about = "Hamilton Map Editor")]
pub struct Cli {
    /// Directory holding the saved sector list
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all sectors
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show the details of one sector
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Add a sector from a ring of "lng,lat" pairs separated by ';'
    Create {
        #[arg(long)]
        ring: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Replace the shape of a sector
    Edit {
        id: String,
        #[arg(long)]
        ring: String,
    },
    Rename {
        id: String,
        name: String,
    },
    Recolor {
        id: String,
        color: String,
    },
    /// Set `days` or `offset`
    Frequency {
        id: String,
        field: String,
        value: String,
    },
    Delete {
        id: String,
    },
    /// Discard all changes and restore the bundled sectors
    Reset,
    /// Write every sector to an export file
    Export {
        /// File or directory (defaults to the current directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show the initial base map view
    Map,
    /// List the color palette
    Palette,
    /// Print the active configuration, or write the defaults with --init
    Config {
        #[arg(long)]
        init: bool,
    },
}

/// Errors reported by the command-line front end.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("No sector with id '{0}'")]
    UnknownSector(String),

    #[error("Invalid ring: {0}")]
    InvalidRing(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Could not determine a data directory, pass --data-dir")]
    NoDataDir,
}

/// Asks on the terminal.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                log::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }
}

/// Parse `"lng,lat; lng,lat; ..."` into vertices.
pub fn parse_ring(text: &str) -> Result<Vec<LngLat>, CliError> {
    text.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (lng, lat) = pair
                .split_once(',')
                .ok_or_else(|| CliError::InvalidRing(format!("'{}' is not a lng,lat pair", pair)))?;
            let parse = |value: &str| {
                value
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| CliError::InvalidRing(format!("'{}': {}", value.trim(), e)))
            };
            Ok(LngLat::new(parse(lng)?, parse(lat)?))
        })
        .collect()
}

fn init_logging(level: LogLevel, verbose: u8) {
    let level = (0..verbose).fold(level, |level, _| level.more_verbose());
    let result = env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .try_init();
    if let Err(e) = result {
        eprintln!("Logger already initialised: {}", e);
    }
}

/// Load the config file, falling back to defaults. A broken file is handed
/// back so it can be reported once logging is up.
fn load_config(cli: &Cli) -> (AppConfig, Option<ConfigError>) {
    let Some(path) = cli.config.clone().or_else(AppConfig::default_path) else {
        return (AppConfig::default(), None);
    };
    match AppConfig::read_from_path(&path) {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(e) => (AppConfig::default(), Some(e)),
    }
}

fn sector_id(app: &SectorApp, id: &str) -> Result<SectorId, CliError> {
    let id = SectorId::from(id);
    if app.store().contains(&id) {
        Ok(id)
    } else {
        Err(CliError::UnknownSector(id.to_string()))
    }
}

/// Run the parsed command line.
pub fn run(cli: Cli) -> Result<(), CliError> {
    let (config, config_error) = load_config(&cli);
    init_logging(config.preferences.log_level, cli.verbose);
    if let Some(e) = config_error {
        log::warn!("Ignoring config file, using defaults: {}", e);
    }

    if let Command::Config { init } = &cli.command {
        return show_config(&cli, &config, *init);
    }

    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => FileStore::default_dir().ok_or(CliError::NoDataDir)?,
    };
    log::debug!("Using data directory {:?}", data_dir);
    let confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(StdinConfirm)
    };
    let mut app = SectorApp::new(config, Box::new(FileStore::new(data_dir)), confirm);

    match cli.command {
        Command::List { json } => print_list(&app, json)?,
        Command::Show { id, json } => {
            let id = sector_id(&app, &id)?;
            app.update(Message::command(PanelCommand::Select(id)));
            print_detail(&app, json)?;
        }
        Command::Create { ring, name } => {
            let geometry = geometry::feature_from_vertices(&parse_ring(&ring)?)?;
            app.update(Message::MapEvent(MapEvent::ShapeCreated { geometry }));
            let Some(id) = app.store().selected().cloned() else {
                return Err(CliError::InvalidArgument("sector was not created".into()));
            };
            if let Some(name) = name {
                app.update(Message::command(PanelCommand::Rename {
                    id: id.clone(),
                    name,
                }));
            }
            println!("{}", id);
        }
        Command::Edit { id, ring } => {
            let id = sector_id(&app, &id)?;
            let geometry = geometry::feature_from_vertices(&parse_ring(&ring)?)?;
            app.update(Message::MapEvent(MapEvent::ShapeEdited { id, geometry }));
        }
        Command::Rename { id, name } => {
            let id = sector_id(&app, &id)?;
            if name.trim().is_empty() {
                return Err(CliError::InvalidArgument("name must not be empty".into()));
            }
            app.update(Message::command(PanelCommand::Rename { id, name }));
        }
        Command::Recolor { id, color } => {
            let id = sector_id(&app, &id)?;
            let color = SectorColor::from(color.trim().to_lowercase());
            if !color.is_palette() {
                return Err(CliError::InvalidArgument(format!(
                    "'{}' is not a palette color (see `sectormap palette`)",
                    color
                )));
            }
            app.update(Message::command(PanelCommand::Recolor { id, color }));
        }
        Command::Frequency { id, field, value } => {
            let id = sector_id(&app, &id)?;
            let field: FrequencyField = field.parse().map_err(CliError::InvalidArgument)?;
            let value = crate::panel::parse_frequency_input(&value);
            app.update(Message::command(PanelCommand::SetFrequency { id, field, value }));
        }
        Command::Delete { id } => {
            let id = sector_id(&app, &id)?;
            app.update(Message::command(PanelCommand::Delete(id)));
        }
        Command::Reset => {
            app.update(Message::command(PanelCommand::ResetToSeed));
        }
        Command::Export { output } => {
            match app.update(Message::command(PanelCommand::Export)) {
                Some(Effect::Download(file)) => {
                    let target = output.unwrap_or_else(|| PathBuf::from("."));
                    let written = file.write(&target)?;
                    println!("{}", written.display());
                }
                None => println!("{}", EMPTY_TITLE),
            }
        }
        Command::Map => print_map(&app),
        Command::Palette => {
            for color in SectorColor::PALETTE.iter() {
                println!("{}", color);
            }
        }
        Command::Config { .. } => {}
    }
    Ok(())
}

fn show_config(cli: &Cli, config: &AppConfig, init: bool) -> Result<(), CliError> {
    if init {
        match &cli.config {
            Some(path) => config.save_to_path(path)?,
            None => config.save_to_default_path()?,
        }
    }
    if let Some(path) = cli.config.clone().or_else(AppConfig::default_path) {
        println!("# {}", path.display());
    }
    println!("{}", config.to_json()?);
    Ok(())
}

fn print_list(app: &SectorApp, json: bool) -> Result<(), CliError> {
    let view = app.panel_view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view.rows)?);
        return Ok(());
    }
    println!("{} ({})", PANEL_TITLE, view.rows.len());
    if view.is_empty() {
        println!("{}", EMPTY_TITLE);
        println!("{}", EMPTY_HINT);
    }
    for row in &view.rows {
        println!("{:<24} {:<8} {}", row.id.as_str(), row.color, row.name);
    }
    Ok(())
}

fn print_detail(app: &SectorApp, json: bool) -> Result<(), CliError> {
    let Some(detail) = app.panel_view().detail else {
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }
    let color = detail
        .colors
        .iter()
        .find(|choice| choice.selected)
        .map(|choice| choice.color.to_string())
        .or_else(|| {
            app.store()
                .get(&detail.id)
                .map(|sector| sector.color.to_string())
        })
        .unwrap_or_default();
    println!("Name:              {}", detail.name);
    println!("Id:                {}", detail.id);
    println!("Color:             {}", color);
    println!("Frequency in Days: {}", detail.frequency_in_days);
    println!("Frequency Offset:  {}", detail.frequency_offset);
    println!("Area:              {}", detail.area_label());
    println!("Points:            {}", detail.point_count);
    println!("First point:       {}", detail.first_position);
    Ok(())
}

fn print_map(app: &SectorApp) {
    let view = app.surface().view();
    let center = view.center();
    println!("{}", app.title());
    println!("{}", app.subtitle());
    println!("Center: {:.4}, {:.4}  zoom {}", center.lat, center.lng, view.zoom());
    println!("Tile:   {}", view.tile_url(view.tile_for(center)));
    println!("Tiles in view: {}", view.visible_tiles().len());
    println!("{}", view.attribution());
}
