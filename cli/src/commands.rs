//! Command handlers. Each returns the text to print; persistence happens
//! once, after the handler, via [`Session::save_if_dirty`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use banker_config::{BankerConfig, ExportFormat};
use banker_core::{AllocationState, Dimensions, TraceMode, codec, presets};
use banker_utils::{WriteOptions, read_state_file, write_state_file};

use crate::{Command, PresetAction, SetTarget, render};

/// The live state plus where it came from.
///
/// The state file is parsed on first use, so commands that replace the
/// state wholesale still work when the file on disk is unreadable.
pub struct Session<'a> {
    path: PathBuf,
    config: Option<&'a BankerConfig>,
    state: Option<AllocationState>,
    dirty: bool,
}

impl<'a> Session<'a> {
    pub fn new(path: PathBuf, config: Option<&'a BankerConfig>) -> Self {
        Self {
            path,
            config,
            state: None,
            dirty: false,
        }
    }

    #[cfg(test)]
    fn in_memory(path: PathBuf, state: AllocationState) -> Self {
        Self {
            path,
            config: None,
            state: Some(state),
            dirty: false,
        }
    }

    /// The live state, loading it from the state file (or starting fresh
    /// from the configured preset or dimensions) on first access.
    fn state(&mut self) -> Result<&mut AllocationState> {
        let state = match self.state.take() {
            Some(state) => state,
            None => self.load()?,
        };
        Ok(self.state.insert(state))
    }

    fn load(&self) -> Result<AllocationState> {
        let text = read_state_file(&self.path)
            .with_context(|| format!("failed to read state file {}", self.path.display()))?;
        match text {
            Some(text) => codec::from_json(&text).with_context(|| {
                format!(
                    "invalid state file {}; `banker init`, `banker preset load` or \
                     `banker import` replace it",
                    self.path.display()
                )
            }),
            None => fresh_state(self.config),
        }
    }

    fn replace(&mut self, state: AllocationState) {
        self.state = Some(state);
        self.dirty = true;
    }

    pub fn save_if_dirty(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let Some(state) = &self.state else {
            return Ok(());
        };
        let json = codec::to_json(state).context("failed to encode state")?;
        write_state_file(&self.path, json.as_bytes(), WriteOptions::default())
            .with_context(|| format!("failed to write state file {}", self.path.display()))?;
        info!(path = %self.path.display(), dims = %state.dimensions(), "state saved");
        self.dirty = false;
        Ok(())
    }
}

fn fresh_state(config: Option<&BankerConfig>) -> Result<AllocationState> {
    let Some(config) = config else {
        return Ok(AllocationState::default());
    };

    if let Some(slug) = config.preset() {
        match presets::find(slug) {
            Some(preset) => return Ok(preset.to_state()?),
            None => warn!(slug, "configured preset not found; using configured dimensions"),
        }
    }

    let (processes, resources) = config.dimensions();
    Ok(AllocationState::new(Dimensions::new(processes, resources)))
}

pub fn run(command: Command, session: &mut Session) -> Result<String> {
    match command {
        Command::Init {
            processes,
            resources,
        } => {
            let dims = Dimensions::try_new(processes, resources)?;
            session.replace(AllocationState::new(dims));
            Ok(format!("initialized {dims} state"))
        }
        Command::Preset { action } => preset(action, session),
        Command::Set { target } => set(target, session),
        Command::Show => Ok(render::state_table(session.state()?)),
        Command::Check { trace, json } => {
            let mode = if trace {
                TraceMode::Steps
            } else {
                TraceMode::Off
            };
            let report = banker_core::check(session.state()?, mode)?;
            if json {
                return Ok(serde_json::to_string_pretty(&report)?);
            }
            Ok(render::report(&report))
        }
        Command::Request {
            process,
            units,
            commit,
            json,
        } => request(session, process, &units, commit, json),
        Command::Export { format, output } => {
            let format = format
                .map(ExportFormat::from)
                .or_else(|| session.config.map(BankerConfig::export_format))
                .unwrap_or_default();
            export(session.state()?, format, output.as_deref())
        }
        Command::Import { path } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let state = codec::from_json(&text)
                .with_context(|| format!("failed to import {}", path.display()))?;
            let dims = state.dimensions();
            session.replace(state);
            Ok(format!("imported {dims} state from {}", path.display()))
        }
    }
}

fn preset(action: PresetAction, session: &mut Session) -> Result<String> {
    match action {
        PresetAction::List => Ok(render::preset_list(presets::all())),
        PresetAction::Load { slug, remember } => {
            let Some(preset) = presets::find(&slug) else {
                bail!("unknown preset `{slug}`; run `banker preset list`");
            };
            session.replace(preset.to_state()?);
            if remember {
                BankerConfig::persist_preset(preset.slug)?;
            }
            Ok(format!("loaded preset {} ({})", preset.slug, preset.name))
        }
    }
}

fn set(target: SetTarget, session: &mut Session) -> Result<String> {
    let state = session.state()?;
    let message = match target {
        SetTarget::Available { units } => {
            state.set_available(&units)?;
            "available updated".to_string()
        }
        SetTarget::Max { process, units } => {
            state.set_max_row(process, &units)?;
            format!("max row P{process} updated")
        }
        SetTarget::Allocation { process, units } => {
            state.set_allocation_row(process, &units)?;
            format!("allocation row P{process} updated")
        }
    };
    let over_max = state.allocation_over_max();
    session.dirty = true;

    match over_max {
        Some((i, j)) => Ok(format!(
            "{message}\nwarning: Allocation[{i}][{j}] exceeds Max; requests are refused until \
             it is repaired"
        )),
        None => Ok(message),
    }
}

fn request(
    session: &mut Session,
    process: usize,
    units: &[i64],
    commit: bool,
    json: bool,
) -> Result<String> {
    let state = session.state()?;
    let result = banker_core::evaluate(state, process, units)?;

    let mut committed = false;
    if commit && let Some(approved) = result.approved() {
        approved.commit(state)?;
        session.dirty = true;
        committed = true;
    }

    if json {
        return Ok(serde_json::to_string_pretty(&result.summary())?);
    }

    let mut out = render::evaluation(&result);
    if committed {
        out.push_str("\ncommitted");
    } else if result.is_approved() {
        out.push_str("\n(preview only; pass --commit to apply)");
    }
    Ok(out)
}

fn export(state: &AllocationState, format: ExportFormat, output: Option<&Path>) -> Result<String> {
    let body = match format {
        ExportFormat::Json => codec::to_json(state)?,
        ExportFormat::Csv => codec::to_csv(state),
    };

    let Some(output) = output else {
        return Ok(body.trim_end().to_string());
    };
    write_state_file(output, body.as_bytes(), WriteOptions::default())
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(format!(
        "exported {} to {}",
        format.as_str(),
        output.display()
    ))
}
