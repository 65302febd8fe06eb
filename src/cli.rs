use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

use crate::brew::{BrewClient, PackageKind, PackageRecord, SearchOptions, ServiceAction};
use crate::config::Config;
use crate::tags::TagStore;
use crate::utils::{self, confirm, run_command_interactive};

#[derive(Parser)]
#[clap(name = "brewdeck")]
#[clap(about = "A desktop GUI and CLI for the Homebrew package manager", long_about = "A desktop GUI and CLI for the Homebrew package manager.\n\nRun with no arguments to open the GUI.\n\nPackages can be labelled with user-defined tags (name, color, optional\ndescription); use the 'tag' subcommand to manage them.")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for packages
    Search {
        /// Search query
        query: String,
        /// Search casks instead of formulae
        #[clap(long)]
        cask: bool,
        /// Fetch descriptions for the first results (slower)
        #[clap(short, long)]
        descriptions: bool,
    },
    /// List installed packages
    List {
        /// List casks instead of formulae
        #[clap(long)]
        cask: bool,
    },
    /// List outdated packages
    Outdated,
    /// Show package information
    Info {
        /// Package name
        package: String,
    },
    /// List the dependencies of a package
    Deps {
        /// Package name
        package: String,
    },
    /// List installed packages that depend on a package
    Uses {
        /// Package name
        package: String,
    },
    /// Install packages
    Install {
        /// Package names to install
        packages: Vec<String>,
        /// Don't ask for confirmation
        #[clap(short, long)]
        yes: bool,
    },
    /// Uninstall packages
    Uninstall {
        /// Package names to uninstall
        packages: Vec<String>,
        /// Don't ask for confirmation
        #[clap(short, long)]
        yes: bool,
    },
    /// Update Homebrew itself and its package lists
    Update,
    /// Upgrade installed packages
    Upgrade {
        /// Package names to upgrade (if empty, upgrade all)
        packages: Vec<String>,
        /// Don't ask for confirmation
        #[clap(short, long)]
        yes: bool,
    },
    /// Check the Homebrew installation for problems
    Doctor,
    /// Remove stale downloads and cache entries
    Cleanup,
    /// Manage Homebrew services
    Services {
        #[clap(subcommand)]
        subcommand: ServicesSubcommand,
    },
    /// Manage package tags
    Tag {
        #[clap(subcommand)]
        subcommand: TagSubcommand,
    },
}

#[derive(Subcommand)]
pub enum ServicesSubcommand {
    /// List services and their status
    List,
    /// Start a service
    Start {
        /// Service name
        name: String,
    },
    /// Stop a service
    Stop {
        /// Service name
        name: String,
    },
    /// Restart a service
    Restart {
        /// Service name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum TagSubcommand {
    /// List all tags
    List,
    /// Create a new tag
    Create {
        /// Tag name
        name: String,
        /// Tag color
        #[clap(long, default_value = "#007AFF")]
        color: String,
        /// Optional description
        #[clap(long, default_value = "")]
        description: String,
    },
    /// Delete a tag (removes it from every package)
    Delete {
        /// Tag name
        name: String,
    },
    /// Show the tags assigned to a package
    Show {
        /// Package name
        package: String,
    },
    /// Assign a tag to a package
    Add {
        /// Package name
        package: String,
        /// Tag name
        tag: String,
    },
    /// Remove a tag from a package
    Remove {
        /// Package name
        package: String,
        /// Tag name
        tag: String,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Search {
                query,
                cask,
                descriptions,
            } => {
                let config = Config::load().unwrap_or_default();
                let options = SearchOptions {
                    kind: if cask { Some(PackageKind::Cask) } else { None },
                    include_descriptions: descriptions || config.include_descriptions,
                };
                let records = BrewClient::new()?.search(&query, &options)?;
                if records.is_empty() {
                    utils::print_info("No packages found");
                } else {
                    print_records(&records);
                }
            }
            Commands::List { cask } => {
                let kind = if cask {
                    PackageKind::Cask
                } else {
                    PackageKind::Formula
                };
                let records = BrewClient::new()?.installed_packages(kind)?;
                print_records(&records);
            }
            Commands::Outdated => {
                let records = BrewClient::new()?.outdated_packages()?;
                if records.is_empty() {
                    utils::print_success("Everything is up to date");
                } else {
                    print_records(&records);
                }
            }
            Commands::Info { package } => {
                let record = BrewClient::new()?.package_info(&package)?;
                print_details(&record);
            }
            Commands::Deps { package } => {
                for dep in BrewClient::new()?.dependencies(&package)? {
                    println!("{}", dep);
                }
            }
            Commands::Uses { package } => {
                for dependent in BrewClient::new()?.dependents(&package)? {
                    println!("{}", dependent);
                }
            }
            Commands::Install { packages, yes } => {
                run_brew_mutation("install", &packages, yes, true)?;
                utils::print_success(&format!(
                    "Successfully installed {} package(s)",
                    packages.len()
                ));
            }
            Commands::Uninstall { packages, yes } => {
                run_brew_mutation("uninstall", &packages, yes, true)?;
                utils::print_success(&format!(
                    "Successfully uninstalled {} package(s)",
                    packages.len()
                ));
            }
            Commands::Update => {
                utils::print_info("Updating Homebrew...");
                run_brew_mutation("update", &[], true, false)?;
                utils::print_success("Homebrew updated");
            }
            Commands::Upgrade { packages, yes } => {
                if !yes && !auto_confirm() && !confirm("Upgrade packages?")? {
                    utils::print_info("Upgrade cancelled");
                    return Ok(());
                }
                run_brew_mutation("upgrade", &packages, true, false)?;
                utils::print_success("Packages upgraded");
            }
            Commands::Doctor => {
                run_brew_mutation("doctor", &[], true, false)?;
            }
            Commands::Cleanup => {
                utils::print_info("Cleaning up stale downloads and cache entries...");
                let config = Config::load().unwrap_or_default();
                run_command_interactive(&config.brew_path, &["cleanup", "--prune=all"])?;
                utils::print_success("Cleanup finished");
            }
            Commands::Services { subcommand } => {
                let client = BrewClient::new()?;
                match subcommand {
                    ServicesSubcommand::List => {
                        for service in client.services()? {
                            println!(
                                "{:<28} {:<12} {:<12} {}",
                                service.name, service.status, service.user, service.plist
                            );
                        }
                    }
                    ServicesSubcommand::Start { name } => {
                        client.service_action(&name, ServiceAction::Start)?;
                        utils::print_success(&format!("Started {}", name));
                    }
                    ServicesSubcommand::Stop { name } => {
                        client.service_action(&name, ServiceAction::Stop)?;
                        utils::print_success(&format!("Stopped {}", name));
                    }
                    ServicesSubcommand::Restart { name } => {
                        client.service_action(&name, ServiceAction::Restart)?;
                        utils::print_success(&format!("Restarted {}", name));
                    }
                }
            }
            Commands::Tag { subcommand } => {
                let store = TagStore::new()?;
                match subcommand {
                    TagSubcommand::List => {
                        for tag in store.list_tags()? {
                            if tag.description.is_empty() {
                                println!("{} {}", tag.name.bold(), tag.color.dimmed());
                            } else {
                                println!(
                                    "{} {} - {}",
                                    tag.name.bold(),
                                    tag.color.dimmed(),
                                    tag.description
                                );
                            }
                        }
                    }
                    TagSubcommand::Create {
                        name,
                        color,
                        description,
                    } => {
                        let tag = store.create_tag(&name, &color, &description)?;
                        utils::print_success(&format!("Created tag {}", tag.name));
                    }
                    TagSubcommand::Delete { name } => {
                        let tag = find_tag(&store, &name)?;
                        store.delete_tag(&tag.id)?;
                        utils::print_success(&format!("Deleted tag {}", name));
                    }
                    TagSubcommand::Show { package } => {
                        for tag in store.package_tags(&package)? {
                            println!("{} {}", tag.name.bold(), tag.color.dimmed());
                        }
                    }
                    TagSubcommand::Add { package, tag } => {
                        let tag = find_tag(&store, &tag)?;
                        store.add_package_tag(&package, &tag)?;
                        utils::print_success(&format!("Tagged {} with {}", package, tag.name));
                    }
                    TagSubcommand::Remove { package, tag } => {
                        let tag = find_tag(&store, &tag)?;
                        store.remove_package_tag(&package, &tag.id)?;
                        utils::print_success(&format!("Removed {} from {}", tag.name, package));
                    }
                }
            }
        }
        Ok(())
    }
}

fn auto_confirm() -> bool {
    Config::load().unwrap_or_default().auto_confirm
}

/// Mutating brew operations stream their output to the terminal so the user
/// sees download and build progress.
fn run_brew_mutation(verb: &str, packages: &[String], yes: bool, needs_confirm: bool) -> Result<()> {
    if needs_confirm {
        if packages.is_empty() {
            anyhow::bail!("No packages specified");
        }
        if !yes
            && !auto_confirm()
            && !confirm(&format!("{} {} package(s)?", verb, packages.len()))?
        {
            utils::print_info("Cancelled");
            return Ok(());
        }
    }

    let config = Config::load().unwrap_or_default();
    let mut args = vec![verb];
    args.extend(packages.iter().map(|s| s.as_str()));
    run_command_interactive(&config.brew_path, &args)
}

fn find_tag(store: &TagStore, name: &str) -> Result<crate::tags::Tag> {
    store
        .list_tags()?
        .into_iter()
        .find(|tag| tag.name == name)
        .ok_or_else(|| anyhow::anyhow!("No tag named '{}'", name))
}

fn print_records(records: &[PackageRecord]) {
    for record in records {
        let mut line = record.name.bold().to_string();
        if !record.version.is_empty() {
            line.push_str(&format!(" {}", record.version.dimmed()));
        }
        if record.kind == PackageKind::Cask {
            line.push_str(&format!(" {}", "[cask]".cyan()));
        }
        if record.outdated {
            line.push_str(&format!(" {}", "(outdated)".yellow()));
        }
        if !record.description.is_empty() {
            line.push_str(&format!(" - {}", record.description));
        }
        println!("{}", line);
    }
}

fn print_details(record: &PackageRecord) {
    println!("{} ({})", record.name.bold(), record.kind);
    if !record.version.is_empty() {
        println!("Version: {}", record.version);
    }
    if !record.description.is_empty() {
        println!("Description: {}", record.description);
    }
    if !record.homepage.is_empty() {
        println!("Homepage: {}", record.homepage);
    }
    if !record.dependencies.is_empty() {
        println!("Dependencies: {}", record.dependencies.join(", "));
    }
    println!(
        "Installed: {}",
        if record.installed { "yes" } else { "no" }
    );
}
