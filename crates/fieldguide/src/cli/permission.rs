//! Camera permission on a terminal: the `permission` command and the prompt
//! shown before the camera is first used.

use std::path::Path;

use clap::{Args, Subcommand};
use console::Style;
use dialoguer::Select;
use fieldguide_core::{
    Config, PermissionAction, PermissionCoordinator, PermissionError, PermissionSource,
    PermissionState, PermissionStore,
};

use super::interactive::theme::fieldguide_theme;

const RATIONALE: &str =
    "Fieldguide needs the camera to take the photo it identifies. Photos stay on this device.";

const PROMPT_ITEMS: &[&str] = &["Allow", "Don't allow", "Don't allow and don't ask again"];

/// Arguments for the `permission` command.
#[derive(Args, Debug)]
pub struct PermissionArgs {
    #[command(subcommand)]
    pub command: PermissionCommand,
}

#[derive(Subcommand, Debug)]
pub enum PermissionCommand {
    /// Show the recorded camera permission
    Status,

    /// Grant camera access without prompting
    Grant,

    /// Forget all answers so the next capture asks again
    Reset,
}

/// Camera permission backed by the on-disk registry and a terminal prompt.
pub struct TerminalPermissions {
    store: PermissionStore,
}

impl TerminalPermissions {
    pub fn new(store: PermissionStore) -> Self {
        Self { store }
    }

    pub fn open(data_dir: &Path) -> Result<Self, PermissionError> {
        PermissionStore::open(data_dir).map(Self::new)
    }
}

impl PermissionSource for TerminalPermissions {
    fn is_granted(&self) -> bool {
        self.store.is_granted()
    }

    fn should_show_rationale(&self) -> bool {
        self.store.should_show_rationale()
    }

    fn request(&mut self) -> Result<bool, PermissionError> {
        // The user opted out of prompts; answer for them.
        if self.store.record().never_ask_again {
            return Ok(false);
        }
        if !console::Term::stderr().is_term() {
            return Err(PermissionError::Prompt(
                "no terminal to ask on; run `fieldguide permission grant`".into(),
            ));
        }

        let choice = Select::with_theme(&fieldguide_theme())
            .with_prompt("Allow Fieldguide to use the camera?")
            .items(PROMPT_ITEMS)
            .default(0)
            .interact_opt()
            .map_err(|e| PermissionError::Prompt(e.to_string()))?;

        let (granted, never_ask_again) = match choice {
            Some(0) => (true, false),
            Some(2) => (false, true),
            // "Don't allow" or Esc
            _ => (false, false),
        };
        self.store.record_response(granted, never_ask_again)?;
        Ok(granted)
    }
}

/// Make sure the camera may be used, asking at most once.
///
/// Returns the state after the check; anything but `Granted` means the
/// camera must not be activated.
pub fn ensure_camera_permission(data_dir: &Path) -> anyhow::Result<PermissionState> {
    let mut coordinator = PermissionCoordinator::new(TerminalPermissions::open(data_dir)?);
    coordinator.evaluate();
    resolve(&mut coordinator)
}

fn resolve<S: PermissionSource>(
    coordinator: &mut PermissionCoordinator<S>,
) -> anyhow::Result<PermissionState> {
    match coordinator.next_action() {
        PermissionAction::Proceed | PermissionAction::Blocked => Ok(coordinator.state()),
        PermissionAction::Request => ask(coordinator),
        PermissionAction::ShowRationale => {
            let dim = Style::new().for_stderr().dim();
            eprintln!();
            eprintln!("  {}", dim.apply_to(RATIONALE));
            eprintln!();
            ask(coordinator)
        }
    }
}

/// Show the prompt. A prompt that cannot be shown leaves the state as it was.
fn ask<S: PermissionSource>(
    coordinator: &mut PermissionCoordinator<S>,
) -> anyhow::Result<PermissionState> {
    match coordinator.request() {
        Ok(state) => Ok(state),
        Err(PermissionError::Prompt(reason)) => {
            tracing::warn!("Camera permission prompt unavailable: {reason}");
            Ok(coordinator.state())
        }
        Err(e) => Err(e.into()),
    }
}

/// Execute the permission command.
pub fn execute(args: PermissionArgs) -> anyhow::Result<()> {
    let mut store = PermissionStore::open(&Config::data_dir())?;

    match args.command {
        PermissionCommand::Status => {
            let record = store.record();
            let state = if record.granted {
                "granted"
            } else if record.never_ask_again {
                "denied (will not ask again)"
            } else if record.denials > 0 {
                "denied (will ask again)"
            } else {
                "not yet asked"
            };
            println!("Camera permission: {state}");
            println!("Registry: {}", store.path().display());
        }
        PermissionCommand::Grant => {
            store.record_response(true, false)?;
            println!("Camera permission granted.");
        }
        PermissionCommand::Reset => {
            store.reset()?;
            tracing::info!("Permission registry reset: {}", store.path().display());
            println!("Camera permission reset; the next capture will ask again.");
        }
    }

    Ok(())
}
