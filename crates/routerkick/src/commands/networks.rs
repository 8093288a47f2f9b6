//! Known-network list handlers.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{GlobalOpts, NetworksArgs, NetworksCommand, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct KnownNetwork<'a> {
    priority: usize,
    name: &'a str,
}

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "#")]
    priority: usize,
    #[tabled(rename = "Network")]
    name: String,
}

pub fn handle(args: NetworksArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load(global)?;
    let name = config::require_profile(global, &cfg)?;

    match args.command {
        NetworksCommand::List => {
            let profile = cfg.profile(&name)?;
            if profile.wifi_list.is_empty() && global.output == OutputFormat::Table {
                let hint = format!(
                    "No known networks in profile '{name}'. Add one with: routerkick networks add <SSID>"
                );
                output::print_output(&hint, global.quiet);
                return Ok(());
            }
            let networks: Vec<KnownNetwork<'_>> = profile
                .wifi_list
                .iter()
                .enumerate()
                .map(|(i, n)| KnownNetwork {
                    priority: i + 1,
                    name: n,
                })
                .collect();
            let out = output::render_list(
                global.output,
                &networks,
                |n| NetworkRow {
                    priority: n.priority,
                    name: n.name.to_owned(),
                },
                |n| n.name.to_owned(),
            );
            output::print_output(&out, global.quiet);
        }

        NetworksCommand::Add { name: network } => {
            cfg.profile_mut(&name)?.add_network(&name, &network)?;
            config::save(global, &cfg)?;
            output::print_done(global, &format!("added '{}' to profile '{name}'", network.trim()));
        }

        NetworksCommand::Rename { from, to } => {
            cfg.profile_mut(&name)?.rename_network(&name, &from, &to)?;
            config::save(global, &cfg)?;
            output::print_done(global, &format!("renamed '{from}' to '{}'", to.trim()));
        }

        NetworksCommand::Remove { name: network } => {
            cfg.profile_mut(&name)?.remove_network(&name, &network)?;
            config::save(global, &cfg)?;
            output::print_done(global, &format!("removed '{network}' from profile '{name}'"));
        }
    }

    Ok(())
}
