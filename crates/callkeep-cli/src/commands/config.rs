//! Show or change persisted configuration.

use anyhow::Result;
use console::style;

use crate::args::ConfigArgs;
use callkeep_core::Settings;
use callkeep_core::config::validate_base_url;

pub fn run(mut settings: Settings, args: ConfigArgs) -> Result<()> {
    let mut changed = false;

    if let Some(agent_id) = args.agent_id {
        settings.agent_id = Some(agent_id);
        changed = true;
    }
    if let Some(base_url) = args.base_url {
        settings.api.base_url = validate_base_url(&base_url)?;
        changed = true;
    }
    if let Some(auth_url) = args.auth_url {
        settings.api.auth_url = validate_base_url(&auth_url)?;
        changed = true;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.api.timeout_secs = timeout_secs;
        changed = true;
    }

    if changed {
        settings.save()?;
        println!("{} Configuration saved.", style("✓").green());
        return Ok(());
    }

    let show = |value: &str| {
        if value.is_empty() {
            style("(not set)").dim().to_string()
        } else {
            value.to_string()
        }
    };
    println!("agent-id:     {}", show(settings.agent_id.as_deref().unwrap_or("")));
    println!("base-url:     {}", show(&settings.api.base_url));
    println!("auth-url:     {}", show(&settings.api.auth_url));
    println!("timeout-secs: {}", settings.api.timeout_secs);
    println!("ledger:       {}", settings.ledger_path().display());
    println!("recordings:   {}", settings.recordings_dir().display());
    Ok(())
}
