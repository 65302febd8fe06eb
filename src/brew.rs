use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;
use crate::utils::run_command;

/// Hard cap on per-name `brew info` enrichment calls for one search, since
/// each enrichment is a separate external-process invocation.
pub const MAX_ENRICHED_RESULTS: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    #[default]
    Formula,
    Cask,
}

impl PackageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::Formula => "formula",
            PackageKind::Cask => "cask",
        }
    }

    fn list_flag(&self) -> &'static str {
        match self {
            PackageKind::Formula => "--formula",
            PackageKind::Cask => "--cask",
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One package as parsed from `brew` text output. Every field is always
/// populated; anything the output didn't carry stays at its default, so
/// `name` is the only field guaranteed non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub description: String,
    pub homepage: String,
    pub dependencies: Vec<String>,
    pub kind: PackageKind,
    pub installed: bool,
    pub outdated: bool,
    pub pinned: bool,
}

impl PackageRecord {
    pub fn minimal(name: &str, kind: PackageKind) -> Self {
        Self {
            name: name.to_string(),
            version: String::new(),
            description: String::new(),
            homepage: String::new(),
            dependencies: Vec::new(),
            kind,
            installed: false,
            outdated: false,
            pinned: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub kind: Option<PackageKind>,
    pub include_descriptions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    pub status: String,
    pub user: String,
    pub plist: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
}

impl ServiceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
        }
    }
}

/// Executes one external command and hands back its captured stdout.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    fn run<'a>(&self, program: &str, args: &[&'a str]) -> Result<String>;
}

pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run<'a>(&self, program: &str, args: &[&'a str]) -> Result<String> {
        Ok(run_command(program, args)?)
    }
}

pub struct BrewClient<R = ShellRunner> {
    brew_path: String,
    runner: R,
}

impl BrewClient<ShellRunner> {
    pub fn new() -> Result<Self> {
        let config = Config::load().unwrap_or_default();
        let client = Self {
            brew_path: config.brew_path,
            runner: ShellRunner,
        };

        if client.brew(&["--version"]).is_err() {
            anyhow::bail!("Homebrew not found; install it from https://brew.sh");
        }

        Ok(client)
    }
}

impl<R: CommandRunner> BrewClient<R> {
    #[allow(dead_code)]
    pub fn with_runner(runner: R) -> Self {
        Self {
            brew_path: "brew".to_string(),
            runner,
        }
    }

    fn brew(&self, args: &[&str]) -> Result<String> {
        self.runner.run(&self.brew_path, args)
    }

    /// Search for packages by name. Without `include_descriptions` every
    /// result is a minimal record built from the name alone; with it, the
    /// first `MAX_ENRICHED_RESULTS` names are enriched through `brew info`
    /// and anything past the cap is dropped.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<PackageRecord>> {
        let mut args = vec!["search"];
        if options.kind == Some(PackageKind::Cask) {
            args.push("--cask");
        }
        args.push(query);

        let output = self.brew(&args)?;
        let names = parse_name_lines(&output);
        let kind = options.kind.unwrap_or_default();

        if !options.include_descriptions {
            return Ok(names
                .iter()
                .map(|name| PackageRecord::minimal(name, kind))
                .collect());
        }

        let mut records = Vec::new();
        for name in names.iter().take(MAX_ENRICHED_RESULTS) {
            let mut record = match self.package_info(name) {
                Ok(record) => record,
                Err(_) => PackageRecord::minimal(name, kind),
            };
            // Whether a result is installed is the caller's cross-reference
            // against the installed set, never this mapper's.
            record.installed = false;
            records.push(record);
        }
        Ok(records)
    }

    pub fn installed_packages(&self, kind: PackageKind) -> Result<Vec<PackageRecord>> {
        let output = self.brew(&["list", kind.list_flag()])?;
        Ok(self.enrich_names(&output, kind, false))
    }

    pub fn outdated_packages(&self) -> Result<Vec<PackageRecord>> {
        let output = self.brew(&["outdated"])?;
        Ok(self.enrich_names(&output, PackageKind::Formula, true))
    }

    /// Enrich one name per listing line through the info path, in listing
    /// order, duplicates kept. Installed status and kind come from the
    /// listing context, not from the info text; a failed lookup yields the
    /// minimal record and the batch carries on.
    fn enrich_names(&self, listing: &str, kind: PackageKind, outdated: bool) -> Vec<PackageRecord> {
        let mut records = Vec::new();
        for name in parse_name_lines(listing) {
            let mut record = match self.package_info(&name) {
                Ok(record) => record,
                Err(_) => PackageRecord::minimal(&name, kind),
            };
            record.kind = kind;
            record.installed = true;
            record.outdated = outdated;
            records.push(record);
        }
        records
    }

    pub fn package_info(&self, name: &str) -> Result<PackageRecord> {
        let output = self.brew(&["info", name])?;
        Ok(parse_info_output(name, &output))
    }

    pub fn dependencies(&self, name: &str) -> Result<Vec<String>> {
        let output = self.brew(&["deps", name])?;
        Ok(parse_name_lines(&output))
    }

    pub fn dependents(&self, name: &str) -> Result<Vec<String>> {
        let output = self.brew(&["uses", "--installed", name])?;
        Ok(parse_name_lines(&output))
    }

    pub fn install(&self, name: &str) -> Result<String> {
        self.brew(&["install", name])
    }

    pub fn uninstall(&self, name: &str) -> Result<String> {
        self.brew(&["uninstall", name])
    }

    pub fn update(&self) -> Result<String> {
        self.brew(&["update"])
    }

    pub fn upgrade(&self, name: Option<&str>) -> Result<String> {
        match name {
            Some(name) => self.brew(&["upgrade", name]),
            None => self.brew(&["upgrade"]),
        }
    }

    pub fn doctor(&self) -> Result<String> {
        self.brew(&["doctor"])
    }

    pub fn cleanup(&self) -> Result<String> {
        self.brew(&["cleanup", "--prune=all"])
    }

    pub fn services(&self) -> Result<Vec<ServiceRecord>> {
        let output = self.brew(&["services", "list"])?;
        Ok(parse_services_output(&output))
    }

    pub fn service_action(&self, name: &str, action: ServiceAction) -> Result<String> {
        self.brew(&["services", action.as_str(), name])
    }
}

/// One package name per line, trimmed, blank lines dropped, duplicates kept.
fn parse_name_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Best-effort line scrape of `brew info` output. The output format is not
/// a stable contract, so unmatched lines are ignored and absent fields keep
/// their defaults; this never fails. Last match wins per field.
fn parse_info_output(name: &str, output: &str) -> PackageRecord {
    let mut record = PackageRecord::minimal(name, PackageKind::Formula);

    for line in output.lines() {
        let line = line.trim();

        if line.contains("==> Cask ") {
            record.kind = PackageKind::Cask;
        }
        if line.contains("==> Formula ") {
            record.kind = PackageKind::Formula;
        }
        if let Some(rest) = line.strip_prefix("Description:") {
            record.description = rest.trim().to_string();
        }
        if let Some(rest) = line.strip_prefix("Homepage:") {
            record.homepage = rest.trim().to_string();
        }
        if line.contains("Installed") {
            record.installed = true;
            if let Some(version) = extract_version(line) {
                record.version = version;
            }
        }
        if let Some(idx) = line.find("Dependencies:") {
            let rest = line[idx + "Dependencies:".len()..].trim();
            if !rest.is_empty() && rest != "None" {
                record.dependencies = rest.split(',').map(|dep| dep.trim().to_string()).collect();
            }
        }
    }

    record
}

fn extract_version(line: &str) -> Option<String> {
    let pattern = Regex::new(r"\d+\.\d+(?:\.\d+)*").ok()?;
    pattern.find(line).map(|found| found.as_str().to_string())
}

/// `brew services list` prints a header row, then one service per line with
/// whitespace-separated name/status and optional user/plist columns.
fn parse_services_output(output: &str) -> Vec<ServiceRecord> {
    let mut services = Vec::new();

    for line in output.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            continue;
        }
        services.push(ServiceRecord {
            name: fields[0].to_string(),
            status: fields[1].to_string(),
            user: fields.get(2).unwrap_or(&"").to_string(),
            plist: fields.get(3).unwrap_or(&"").to_string(),
        });
    }

    services
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_minimal_except_name(record: &PackageRecord, name: &str) {
        assert_eq!(record.name, name);
        assert_eq!(record.version, "");
        assert_eq!(record.description, "");
        assert_eq!(record.homepage, "");
        assert!(record.dependencies.is_empty());
        assert_eq!(record.kind, PackageKind::Formula);
        assert!(!record.installed);
        assert!(!record.outdated);
        assert!(!record.pinned);
    }

    #[test]
    fn info_without_markers_keeps_all_defaults() {
        let record = parse_info_output("wget", "some output\nthe parser does not recognize\n");
        assert_minimal_except_name(&record, "wget");
    }

    #[test]
    fn info_parses_formula_fields() {
        let output = "==> Formula git\n\
                      Description: A revision control system\n\
                      Homepage: https://git-scm.com\n";
        let record = parse_info_output("git", output);
        assert_eq!(record.kind, PackageKind::Formula);
        assert_eq!(record.description, "A revision control system");
        assert_eq!(record.homepage, "https://git-scm.com");
        assert!(!record.installed);
        assert_eq!(record.version, "");
    }

    #[test]
    fn info_cask_marker_sets_kind() {
        let record = parse_info_output("firefox", "==> Cask firefox\nDescription: Web browser\n");
        assert_eq!(record.kind, PackageKind::Cask);
        assert_eq!(record.description, "Web browser");
    }

    #[test]
    fn installed_line_sets_flag_and_extracts_version() {
        let output = "==> Formula git\nInstalled\n/opt/homebrew/Cellar/git/2.44.0 (1,678 files)\n";
        let record = parse_info_output("git", output);
        assert!(record.installed);
        // The bare "Installed" line carries no version, so it stays empty
        // until a later Installed-marked line matches.
        assert_eq!(record.version, "");

        let output = "Installed versions: 2.39.0, 2.44.0\n";
        let record = parse_info_output("git", output);
        assert!(record.installed);
        assert_eq!(record.version, "2.39.0");
    }

    #[test]
    fn dependencies_split_on_commas() {
        let record = parse_info_output("git", "Dependencies: gettext, pcre2, openssl@3\n");
        assert_eq!(record.dependencies, vec!["gettext", "pcre2", "openssl@3"]);
    }

    #[test]
    fn dependencies_none_stays_empty() {
        let record = parse_info_output("wget", "Dependencies: None\n");
        assert!(record.dependencies.is_empty());

        let record = parse_info_output("wget", "Dependencies:\n");
        assert!(record.dependencies.is_empty());
    }

    #[test]
    fn name_lines_trim_and_drop_blanks_keeping_duplicates() {
        let names = parse_name_lines("git\n\n  node  \ngit\n");
        assert_eq!(names, vec!["git", "node", "git"]);
    }

    #[test]
    fn services_skip_header_and_default_optional_columns() {
        let output = "Name    Status  User  File\n\
                      postgresql started alice /Users/alice/Library/LaunchAgents/pg.plist\n\
                      redis   none\n\
                      \n\
                      nginx   started root\n";
        let services = parse_services_output(output);
        assert_eq!(services.len(), 3);
        assert_eq!(services[0].name, "postgresql");
        assert_eq!(services[0].status, "started");
        assert_eq!(services[0].user, "alice");
        assert_eq!(
            services[0].plist,
            "/Users/alice/Library/LaunchAgents/pg.plist"
        );
        assert_eq!(services[1].name, "redis");
        assert_eq!(services[1].status, "none");
        assert_eq!(services[1].user, "");
        assert_eq!(services[1].plist, "");
        assert_eq!(services[2].user, "root");
        assert_eq!(services[2].plist, "");
    }

    #[test]
    fn list_installed_isolates_per_name_failures() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, args| args == ["list", "--formula"])
            .returning(|_, _| Ok("git\nnode\n".to_string()));
        runner
            .expect_run()
            .withf(|_, args| args == ["info", "git"])
            .returning(|_, _| {
                Ok("==> Formula git\nDescription: A revision control system\n".to_string())
            });
        runner
            .expect_run()
            .withf(|_, args| args == ["info", "node"])
            .returning(|_, _| Err(anyhow::anyhow!("info lookup failed")));

        let client = BrewClient::with_runner(runner);
        let records = client.installed_packages(PackageKind::Formula).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "git");
        assert_eq!(records[0].description, "A revision control system");
        assert!(records[0].installed);
        assert!(!records[0].outdated);

        let fallback = &records[1];
        assert_eq!(fallback.name, "node");
        assert_eq!(fallback.kind, PackageKind::Formula);
        assert!(fallback.installed);
        assert!(!fallback.outdated);
        assert!(!fallback.pinned);
        assert_eq!(fallback.description, "");
        assert_eq!(fallback.homepage, "");
        assert_eq!(fallback.version, "");
        assert!(fallback.dependencies.is_empty());
    }

    #[test]
    fn outdated_marks_records_and_forces_installed() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, args| args == ["outdated"])
            .returning(|_, _| Ok("git\n".to_string()));
        runner
            .expect_run()
            .withf(|_, args| args == ["info", "git"])
            .returning(|_, _| Ok("==> Formula git\n".to_string()));

        let client = BrewClient::with_runner(runner);
        let records = client.outdated_packages().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].outdated);
        assert!(records[0].installed);
    }

    #[test]
    fn search_without_descriptions_never_enriches() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, args| args == ["search", "wget"])
            .times(1)
            .returning(|_, _| Ok("wget\nwget2\n".to_string()));

        let client = BrewClient::with_runner(runner);
        let records = client
            .search("wget", &SearchOptions::default())
            .unwrap();

        assert_eq!(records.len(), 2);
        for record in &records {
            assert!(!record.installed);
            assert_eq!(record.kind, PackageKind::Formula);
            assert_eq!(record.description, "");
        }
    }

    #[test]
    fn cask_search_passes_flag_and_tags_results() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, args| args == ["search", "--cask", "browser"])
            .returning(|_, _| Ok("firefox\n".to_string()));

        let client = BrewClient::with_runner(runner);
        let options = SearchOptions {
            kind: Some(PackageKind::Cask),
            include_descriptions: false,
        };
        let records = client.search("browser", &options).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, PackageKind::Cask);
    }

    #[test]
    fn search_enrichment_caps_at_twenty() {
        let listing = (0..25)
            .map(|i| format!("pkg{}\n", i))
            .collect::<String>();

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, args| args.first() == Some(&"search"))
            .times(1)
            .returning(move |_, _| Ok(listing.clone()));
        runner
            .expect_run()
            .withf(|_, args| args.first() == Some(&"info"))
            .times(MAX_ENRICHED_RESULTS)
            .returning(|_, _| Ok("Description: something\n".to_string()));

        let client = BrewClient::with_runner(runner);
        let options = SearchOptions {
            kind: None,
            include_descriptions: true,
        };
        let records = client.search("pkg", &options).unwrap();

        assert_eq!(records.len(), MAX_ENRICHED_RESULTS);
        assert_eq!(records[0].description, "something");
        assert!(records.iter().all(|record| !record.installed));
    }

    #[test]
    fn search_enrichment_failure_falls_back_to_minimal() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, args| args == ["search", "--cask", "fire"])
            .returning(|_, _| Ok("firefox\n".to_string()));
        runner
            .expect_run()
            .withf(|_, args| args == ["info", "firefox"])
            .returning(|_, _| Err(anyhow::anyhow!("boom")));

        let client = BrewClient::with_runner(runner);
        let options = SearchOptions {
            kind: Some(PackageKind::Cask),
            include_descriptions: true,
        };
        let records = client.search("fire", &options).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "firefox");
        assert_eq!(records[0].kind, PackageKind::Cask);
        assert_eq!(records[0].description, "");
    }

    #[test]
    fn dependents_query_uses_installed_flag() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, args| args == ["uses", "--installed", "openssl@3"])
            .returning(|_, _| Ok("curl\nwget\n".to_string()));

        let client = BrewClient::with_runner(runner);
        let dependents = client.dependents("openssl@3").unwrap();
        assert_eq!(dependents, vec!["curl", "wget"]);
    }
}
