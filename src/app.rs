use std::process::ExitCode;
use std::sync::Arc;

use color_eyre::Result;
use color_eyre::eyre::{bail, eyre};
use serde::Serialize;
use tracing::{debug, info};

use overlay_themer::config::{AppConfig, BackendKind, data_dir};
use overlay_themer::gateway::device::Transport;
use overlay_themer::gateway::{DeviceGateway, StateFileGateway};
use overlay_themer::search::Matcher;
use overlay_themer::settings::{self, SettingsStore, TomlSettingsStore};
use overlay_themer::{
    ApplyReport, BatchReport, Coordinator, FamilyKind, OverlayError, OverlayGateway, OverlayId,
    PackageMetadataSource, SubstratumDetector, ThemeState, UserId,
};

use crate::cli::{Args, Command};

const SETTINGS_FILE: &str = "settings.toml";
const STATE_FILE: &str = "device.toml";
const STOCK_ACCENT_NAMES: [&str; 2] = ["none", "stock"];

#[derive(Serialize)]
struct Status {
    user: UserId,
    theme: ThemeState,
    accents: Vec<OverlayId>,
    clocks: Vec<OverlayId>,
    third_party_engine: Option<bool>,
}

pub struct App {
    config: AppConfig,
    user: UserId,
    json: bool,
    gateway: Arc<dyn OverlayGateway>,
    packages: Option<Arc<dyn PackageMetadataSource>>,
    settings: TomlSettingsStore,
    coordinator: Coordinator,
}

impl App {
    pub fn new(config: AppConfig, args: &Args) -> Result<Self> {
        let (gateway, packages) = connect(&config);

        let settings_path = match &config.settings_file {
            Some(path) => path.clone(),
            None => overlay_themer::config::config_dir()
                .ok_or_else(|| eyre!("Could not determine config directory"))?
                .join(SETTINGS_FILE),
        };

        let coordinator = Coordinator::build(
            gateway.clone(),
            &config.catalog,
            config.coordinator.accent_policy,
            args.user,
        );

        Ok(Self {
            config,
            user: args.user,
            json: args.json,
            gateway,
            packages,
            settings: TomlSettingsStore::new(settings_path),
            coordinator,
        })
    }

    pub fn run(&mut self, command: &Command) -> Result<ExitCode> {
        debug!(?command, user = %self.user, "Running command");
        match command {
            Command::Status => self.status(),
            Command::Accents => {
                self.list_accents();
                Ok(ExitCode::SUCCESS)
            }
            Command::Accent { selection } => {
                let selection = self.resolve_accent(selection)?;
                self.settings
                    .put_int_for_user(settings::ACCENT_PICKER, selection, self.user)?;
                let report = self.coordinator.update_accents(&self.settings, self.user)?;
                self.finish(&report)
            }
            Command::Theme { theme } => {
                let (dark, black) = theme.bundles();
                self.settings
                    .put_bool_for_user(settings::DARK_THEME, dark, self.user)?;
                self.settings
                    .put_bool_for_user(settings::BLACK_THEME, black, self.user)?;
                let report = self
                    .coordinator
                    .set_dark_and_black_theme(dark, black, self.user);
                self.finish(&report)
            }
            Command::Clock { selection } => {
                self.settings
                    .put_int_for_user(settings::CLOCK_STYLE, *selection, self.user)?;
                let (report, rejected) = switch_clock(&self.coordinator, *selection, self.user);
                if let Some(err) = rejected {
                    self.print(&report)?;
                    return Err(err.into());
                }
                self.finish(&report)
            }
            Command::Apply => {
                let report = self.coordinator.apply_settings(&self.settings, self.user);
                self.finish_apply(&report)
            }
            Command::Substratum => {
                let active = self
                    .detector()
                    .ok_or_else(|| eyre!("Package metadata is not available with this backend"))?
                    .is_third_party_overlay_engine_active(self.user);
                println!("{}", if active { "active" } else { "inactive" });
                Ok(if active {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                })
            }
        }
    }

    fn detector(&self) -> Option<SubstratumDetector> {
        self.packages.as_ref().map(|packages| {
            SubstratumDetector::new(
                self.gateway.clone(),
                packages.clone(),
                self.config.substratum.clone(),
            )
        })
    }

    fn status(&self) -> Result<ExitCode> {
        let status = Status {
            user: self.user,
            theme: self.coordinator.theme_state(self.user),
            accents: self
                .coordinator
                .enabled_members(FamilyKind::Accents, self.user),
            clocks: self.coordinator.enabled_members(FamilyKind::Clocks, self.user),
            third_party_engine: self
                .detector()
                .map(|d| d.is_third_party_overlay_engine_active(self.user)),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
            return Ok(ExitCode::SUCCESS);
        }

        let theme = match (status.theme.dark_enabled, status.theme.black_enabled) {
            (false, false) => "light",
            (true, false) => "dark",
            (false, true) => "black",
            (true, true) => "dark + black (conflicting)",
        };
        println!("user:   {}", status.user);
        println!("theme:  {theme}");
        println!("accent: {}", join_or(&status.accents, "stock"));
        println!("clock:  {}", join_or(&status.clocks, "stock"));
        if let Some(active) = status.third_party_engine {
            println!("third-party overlay engine: {}", if active { "yes" } else { "no" });
        }
        Ok(ExitCode::SUCCESS)
    }

    fn list_accents(&self) {
        let accents = self.coordinator.catalog().family(FamilyKind::Accents);
        println!("{:>3}  stock", 0);
        for (i, id) in accents.members().iter().enumerate() {
            println!("{:>3}  {}", i + 1, self.accent_name(id));
        }
    }

    fn accent_name<'a>(&self, id: &'a OverlayId) -> &'a str {
        id.as_str()
            .strip_prefix(self.config.catalog.accent_prefix.as_str())
            .unwrap_or_else(|| id.as_str())
    }

    /// Turn a number, "none" or an accent name into a picker selection.
    fn resolve_accent(&self, input: &str) -> Result<i64> {
        if let Ok(selection) = input.parse::<i64>() {
            return Ok(selection);
        }
        if STOCK_ACCENT_NAMES
            .iter()
            .any(|name| name.eq_ignore_ascii_case(input))
        {
            return Ok(0);
        }

        let accents = self.coordinator.catalog().family(FamilyKind::Accents);
        let names: Vec<&str> = accents
            .members()
            .iter()
            .map(|id| self.accent_name(id))
            .collect();
        let index = Matcher::default()
            .best_match(names.iter().copied(), input)
            .ok_or_else(|| eyre!("No accent matches '{}'. Available: {}", input, names.join(", ")))?;

        info!(input, accent = names[index], "Resolved accent name");
        Ok(i64::try_from(index)? + 1)
    }

    fn print(&self, report: &BatchReport) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
        } else {
            print_report(report);
        }
        Ok(())
    }

    fn finish(&self, report: &BatchReport) -> Result<ExitCode> {
        self.print(report)?;
        check(report.failures().count())
    }

    fn finish_apply(&self, report: &ApplyReport) -> Result<ExitCode> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
        } else {
            print_report(&report.toggles);
            for rejected in &report.rejected {
                println!("rejected: {rejected}");
            }
        }
        if !report.rejected.is_empty() {
            bail!("{} stored selection(s) were rejected", report.rejected.len());
        }
        check(report.toggles.failures().count())
    }
}

/// Build the gateway and, when the backend can provide it, package metadata.
fn connect(
    config: &AppConfig,
) -> (
    Arc<dyn OverlayGateway>,
    Option<Arc<dyn PackageMetadataSource>>,
) {
    let transport = match config.backend.kind {
        BackendKind::StateFile => {
            let path = config
                .backend
                .state_file
                .clone()
                .unwrap_or_else(|| data_dir().join(STATE_FILE));
            info!(path = %path.display(), "Using state file backend");
            let state = Arc::new(StateFileGateway::new(path));
            let gateway: Arc<dyn OverlayGateway> = state.clone();
            let packages: Arc<dyn PackageMetadataSource> = state;
            return (gateway, Some(packages));
        }
        BackendKind::Device => Transport::Local,
        BackendKind::Adb => Transport::Adb {
            serial: config.backend.serial.clone(),
        },
    };

    info!(?transport, "Using device backend");
    let gateway: Arc<dyn OverlayGateway> = Arc::new(DeviceGateway::new(transport));
    (gateway, None)
}

/// Unload every clock, then apply `selection`. The unload outcomes are kept
/// even when the selection is rejected.
fn switch_clock(
    coordinator: &Coordinator,
    selection: i64,
    user: UserId,
) -> (BatchReport, Option<OverlayError>) {
    let mut report = coordinator.unload_clocks(user);
    match coordinator.apply_clock(selection, user) {
        Ok(applied) => {
            report.extend(applied);
            (report, None)
        }
        Err(err) => (report, Some(err)),
    }
}

fn print_report(report: &BatchReport) {
    if report.is_empty() {
        println!("nothing to change");
    }
    for outcome in report.outcomes() {
        println!("{outcome}");
    }
}

fn check(failures: usize) -> Result<ExitCode> {
    if failures > 0 {
        bail!("{failures} overlay toggle(s) failed");
    }
    Ok(ExitCode::SUCCESS)
}

fn join_or(ids: &[OverlayId], empty: &str) -> String {
    if ids.is_empty() {
        return empty.to_string();
    }
    ids.iter()
        .map(OverlayId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
