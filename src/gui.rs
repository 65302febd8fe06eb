use iced::{
    alignment, executor, Color,
    widget::{button, checkbox, column, container, row, scrollable, text, text_input, Space},
    Application, Command, Element, Length, Padding, Pixels, Settings, Theme as IcedTheme,
};
use std::collections::HashSet;

use crate::brew::{
    BrewClient, PackageKind, PackageRecord, SearchOptions, ServiceAction, ServiceRecord,
};
use crate::config::Config;
use crate::tags::{Tag, TagStore};

mod styles;
mod theme;

use styles::{
    AccentCheckboxStyle, AccentTextInputStyle, CustomScrollableStyle, RoundedButtonStyle,
    RoundedContainerStyle,
};
use theme::Theme as AppTheme;

// Swatches offered when creating a tag; free-form hex input works too.
const TAG_COLORS: [&str; 8] = [
    "#007AFF", "#34C759", "#FF3B30", "#FF9500", "#AF52DE", "#FF2D92", "#5AC8FA", "#FFCC00",
];

pub fn run() -> iced::Result {
    let window_settings = iced::window::Settings {
        size: iced::Size::new(1200.0, 800.0),
        resizable: true,
        min_size: Some(iced::Size::new(800.0, 600.0)),
        ..Default::default()
    };

    let settings = Settings {
        window: window_settings,
        default_text_size: Pixels(14.0),
        antialiasing: true,
        ..Default::default()
    };

    BrewdeckGui::run(settings)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Search,
    Installed,
    Outdated,
    Services,
    Tags,
}

#[derive(Debug, Clone)]
pub enum Message {
    TabChanged(Tab),
    ThemeToggled,
    // Search
    SearchQueryChanged(String),
    SearchCasksToggled(bool),
    SearchDescriptionsToggled(bool),
    Search,
    SearchResults(Result<Vec<PackageRecord>, String>),
    ToggleSearchSelection(String),
    InstallSelected,
    // Installed
    InstalledFilterChanged(String),
    InstalledLoaded(Vec<PackageRecord>),
    ToggleInstalledSelection(String),
    UninstallSelected,
    RefreshInstalled,
    // Outdated / maintenance
    OutdatedLoaded(Result<Vec<PackageRecord>, String>),
    UpgradePackage(String),
    UpgradeAll,
    UpdateBrew,
    RunDoctor,
    RunCleanup,
    // Details
    ShowDetails(String),
    DetailsLoaded(Result<(PackageRecord, Vec<Tag>), String>),
    CloseDetails,
    InstallOne(String),
    UninstallOne(String),
    AssignTag(String, Tag),
    UnassignTag(String, String),
    PackageTagsUpdated(Result<Vec<Tag>, String>),
    // Services
    ServicesLoaded(Result<Vec<ServiceRecord>, String>),
    ServiceCommand(String, ServiceAction),
    // Tags
    TagsLoaded(Vec<Tag>),
    TagNameChanged(String),
    TagColorChanged(String),
    TagDescriptionChanged(String),
    CreateTag,
    TagCreated(Result<Tag, String>),
    DeleteTag(String),
    TagDeleted(Result<String, String>),
    // Plumbing
    OperationFinished(Result<String, String>),
    ClearOutput,
}

pub struct BrewdeckGui {
    current_tab: Tab,
    theme: AppTheme,
    border_radius: f32,

    search_query: String,
    search_casks: bool,
    search_descriptions: bool,
    search_results: Vec<PackageRecord>,
    search_loading: bool,
    selected_results: HashSet<String>,

    installed_packages: Vec<PackageRecord>,
    installed_filter: String,
    selected_installed: HashSet<String>,
    installed_loaded: bool,
    installed_loading: bool,

    outdated_packages: Vec<PackageRecord>,
    outdated_loaded: bool,
    outdated_loading: bool,

    services: Vec<ServiceRecord>,
    services_loaded: bool,
    services_loading: bool,

    tags: Vec<Tag>,
    tags_loaded: bool,
    tag_name: String,
    tag_color: String,
    tag_description: String,

    details: Option<(PackageRecord, Vec<Tag>)>,
    details_loading: bool,

    output_log: Vec<String>,
    error_log: Vec<String>,
}

impl Application for BrewdeckGui {
    type Message = Message;
    type Theme = IcedTheme;
    type Executor = executor::Default;
    type Flags = ();

    fn new(_flags: ()) -> (BrewdeckGui, Command<Message>) {
        let config = Config::load().unwrap_or_default();

        let gui = BrewdeckGui {
            current_tab: Tab::Search,
            theme: AppTheme::Dark,
            border_radius: 12.0,
            search_query: String::new(),
            search_casks: false,
            search_descriptions: config.include_descriptions,
            search_results: Vec::new(),
            search_loading: false,
            selected_results: HashSet::new(),
            installed_packages: Vec::new(),
            installed_filter: String::new(),
            selected_installed: HashSet::new(),
            installed_loaded: false,
            installed_loading: true,
            outdated_packages: Vec::new(),
            outdated_loaded: false,
            outdated_loading: false,
            services: Vec::new(),
            services_loaded: false,
            services_loading: false,
            tags: Vec::new(),
            tags_loaded: false,
            tag_name: String::new(),
            tag_color: TAG_COLORS[0].to_string(),
            tag_description: String::new(),
            details: None,
            details_loading: false,
            output_log: Vec::new(),
            error_log: Vec::new(),
        };

        // Preload the installed set (so search results can show it right
        // away) and the tag definitions used by the details pane
        let cmd = Command::batch(vec![
            Command::perform(load_installed_packages(), Message::InstalledLoaded),
            Command::perform(load_all_tags(), Message::TagsLoaded),
        ]);
        (gui, cmd)
    }

    fn title(&self) -> String {
        String::from("Brewdeck - Homebrew Package Manager")
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::TabChanged(tab) => {
                self.current_tab = tab;
                self.details = None;
                match tab {
                    Tab::Installed if !self.installed_loaded && !self.installed_loading => {
                        self.installed_loading = true;
                        Command::perform(load_installed_packages(), Message::InstalledLoaded)
                    }
                    Tab::Outdated if !self.outdated_loaded && !self.outdated_loading => {
                        self.outdated_loading = true;
                        Command::perform(load_outdated_packages(), Message::OutdatedLoaded)
                    }
                    Tab::Services if !self.services_loaded && !self.services_loading => {
                        self.services_loading = true;
                        Command::perform(load_services(), Message::ServicesLoaded)
                    }
                    Tab::Tags if !self.tags_loaded => {
                        Command::perform(load_all_tags(), Message::TagsLoaded)
                    }
                    _ => Command::none(),
                }
            }
            Message::ThemeToggled => {
                self.theme = match self.theme {
                    AppTheme::Light => AppTheme::Dark,
                    AppTheme::Dark => AppTheme::Light,
                };
                Command::none()
            }
            Message::SearchQueryChanged(query) => {
                self.search_query = query;
                Command::none()
            }
            Message::SearchCasksToggled(value) => {
                self.search_casks = value;
                Command::none()
            }
            Message::SearchDescriptionsToggled(value) => {
                self.search_descriptions = value;
                Command::none()
            }
            Message::Search => {
                if self.search_query.is_empty() {
                    return Command::none();
                }
                self.search_loading = true;
                self.selected_results.clear();
                let query = self.search_query.clone();
                let options = SearchOptions {
                    kind: if self.search_casks {
                        Some(PackageKind::Cask)
                    } else {
                        None
                    },
                    include_descriptions: self.search_descriptions,
                };
                self.output_log.push(format!("Searching for: {}", query));
                Command::perform(search_packages(query, options), Message::SearchResults)
            }
            Message::SearchResults(result) => {
                self.search_loading = false;
                match result {
                    Ok(results) => self.search_results = results,
                    Err(e) => self.error_log.push(e),
                }
                Command::none()
            }
            Message::ToggleSearchSelection(name) => {
                if !self.selected_results.remove(&name) {
                    self.selected_results.insert(name);
                }
                Command::none()
            }
            Message::InstallSelected => {
                let names: Vec<String> = self.selected_results.iter().cloned().collect();
                if names.is_empty() {
                    return Command::none();
                }
                self.selected_results.clear();
                self.output_log
                    .push(format!("Installing {} package(s)...", names.len()));
                Command::perform(install_packages(names), Message::OperationFinished)
            }
            Message::InstalledFilterChanged(filter) => {
                self.installed_filter = filter;
                Command::none()
            }
            Message::InstalledLoaded(packages) => {
                self.installed_packages = packages;
                self.installed_loaded = true;
                self.installed_loading = false;
                Command::none()
            }
            Message::ToggleInstalledSelection(name) => {
                if !self.selected_installed.remove(&name) {
                    self.selected_installed.insert(name);
                }
                Command::none()
            }
            Message::UninstallSelected => {
                let names: Vec<String> = self.selected_installed.iter().cloned().collect();
                if names.is_empty() {
                    return Command::none();
                }
                self.selected_installed.clear();
                self.output_log
                    .push(format!("Uninstalling {} package(s)...", names.len()));
                Command::perform(uninstall_packages(names), Message::OperationFinished)
            }
            Message::RefreshInstalled => {
                self.installed_loading = true;
                self.installed_loaded = false;
                Command::perform(load_installed_packages(), Message::InstalledLoaded)
            }
            Message::OutdatedLoaded(result) => {
                self.outdated_loading = false;
                match result {
                    Ok(packages) => {
                        self.outdated_packages = packages;
                        self.outdated_loaded = true;
                    }
                    Err(e) => self.error_log.push(e),
                }
                Command::none()
            }
            Message::UpgradePackage(name) => {
                self.output_log.push(format!("Upgrading {}...", name));
                Command::perform(upgrade_packages(Some(name)), Message::OperationFinished)
            }
            Message::UpgradeAll => {
                self.output_log.push("Upgrading all packages...".to_string());
                Command::perform(upgrade_packages(None), Message::OperationFinished)
            }
            Message::UpdateBrew => {
                self.output_log.push("Updating Homebrew...".to_string());
                Command::perform(run_update(), Message::OperationFinished)
            }
            Message::RunDoctor => {
                self.output_log.push("Running brew doctor...".to_string());
                Command::perform(run_doctor(), Message::OperationFinished)
            }
            Message::RunCleanup => {
                self.output_log.push("Cleaning up...".to_string());
                Command::perform(run_cleanup(), Message::OperationFinished)
            }
            Message::ShowDetails(name) => {
                self.details_loading = true;
                Command::perform(load_details(name), Message::DetailsLoaded)
            }
            Message::DetailsLoaded(result) => {
                self.details_loading = false;
                match result {
                    Ok((record, tags)) => self.details = Some((record, tags)),
                    Err(e) => self.error_log.push(e),
                }
                Command::none()
            }
            Message::CloseDetails => {
                self.details = None;
                Command::none()
            }
            Message::InstallOne(name) => {
                self.output_log.push(format!("Installing {}...", name));
                Command::perform(install_packages(vec![name]), Message::OperationFinished)
            }
            Message::UninstallOne(name) => {
                self.output_log.push(format!("Uninstalling {}...", name));
                Command::perform(uninstall_packages(vec![name]), Message::OperationFinished)
            }
            Message::AssignTag(package, tag) => {
                Command::perform(assign_tag(package, tag), Message::PackageTagsUpdated)
            }
            Message::UnassignTag(package, tag_id) => {
                Command::perform(unassign_tag(package, tag_id), Message::PackageTagsUpdated)
            }
            Message::PackageTagsUpdated(result) => {
                match result {
                    Ok(tags) => {
                        if let Some((_, details_tags)) = self.details.as_mut() {
                            *details_tags = tags;
                        }
                    }
                    Err(e) => self.error_log.push(e),
                }
                Command::none()
            }
            Message::ServicesLoaded(result) => {
                self.services_loading = false;
                match result {
                    Ok(services) => {
                        self.services = services;
                        self.services_loaded = true;
                    }
                    Err(e) => self.error_log.push(e),
                }
                Command::none()
            }
            Message::ServiceCommand(name, action) => {
                self.services_loading = true;
                self.output_log
                    .push(format!("brew services {} {}", action.as_str(), name));
                Command::perform(run_service_action(name, action), Message::ServicesLoaded)
            }
            Message::TagsLoaded(tags) => {
                self.tags = tags;
                self.tags_loaded = true;
                Command::none()
            }
            Message::TagNameChanged(name) => {
                self.tag_name = name;
                Command::none()
            }
            Message::TagColorChanged(color) => {
                self.tag_color = color;
                Command::none()
            }
            Message::TagDescriptionChanged(description) => {
                self.tag_description = description;
                Command::none()
            }
            Message::CreateTag => {
                if self.tag_name.trim().is_empty() {
                    return Command::none();
                }
                let name = self.tag_name.trim().to_string();
                let color = self.tag_color.clone();
                let description = self.tag_description.trim().to_string();
                Command::perform(create_tag(name, color, description), Message::TagCreated)
            }
            Message::TagCreated(result) => {
                match result {
                    Ok(tag) => {
                        self.tags.push(tag);
                        self.tag_name.clear();
                        self.tag_description.clear();
                        self.tag_color = TAG_COLORS[0].to_string();
                    }
                    Err(e) => self.error_log.push(e),
                }
                Command::none()
            }
            Message::DeleteTag(id) => Command::perform(delete_tag(id), Message::TagDeleted),
            Message::TagDeleted(result) => {
                match result {
                    Ok(id) => {
                        self.tags.retain(|tag| tag.id != id);
                        if let Some((_, details_tags)) = self.details.as_mut() {
                            details_tags.retain(|tag| tag.id != id);
                        }
                    }
                    Err(e) => self.error_log.push(e),
                }
                Command::none()
            }
            Message::OperationFinished(result) => {
                match result {
                    Ok(msg) => {
                        self.output_log.push(msg);
                        // Installed and outdated sets are stale after any
                        // mutating operation
                        self.installed_loaded = false;
                        self.outdated_loaded = false;
                        self.installed_loading = true;
                        return Command::perform(
                            load_installed_packages(),
                            Message::InstalledLoaded,
                        );
                    }
                    Err(e) => self.error_log.push(e),
                }
                Command::none()
            }
            Message::ClearOutput => {
                self.output_log.clear();
                self.error_log.clear();
                Command::none()
            }
        }
    }

    fn view(&self) -> Element<Message> {
        let theme = self.theme;

        let content: Element<Message> = if let Some((record, tags)) = &self.details {
            self.view_details(record, tags)
        } else if self.details_loading {
            self.centered_note("Loading package details...")
        } else {
            match self.current_tab {
                Tab::Search => self.view_search(),
                Tab::Installed => self.view_installed(),
                Tab::Outdated => self.view_outdated(),
                Tab::Services => self.view_services(),
                Tab::Tags => self.view_tags(),
            }
        };

        let main_content = column![self.view_tabs(), content, self.view_log()]
            .spacing(14)
            .padding(Padding::new(18.0));

        container(main_content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(iced::theme::Container::Custom(Box::new(
                RoundedContainerStyle {
                    radius: 0.0,
                    background: Some(theme.background()),
                    elevation: 0.0,
                },
            )))
            .into()
    }

    fn theme(&self) -> IcedTheme {
        match self.theme {
            AppTheme::Light => IcedTheme::Light,
            AppTheme::Dark => IcedTheme::Dark,
        }
    }
}

impl BrewdeckGui {
    fn card_style(&self, elevation: f32) -> iced::theme::Container {
        iced::theme::Container::Custom(Box::new(RoundedContainerStyle {
            radius: self.border_radius,
            background: Some(self.theme.card_background()),
            elevation,
        }))
    }

    fn button_style(&self, is_primary: bool) -> iced::theme::Button {
        iced::theme::Button::Custom(Box::new(RoundedButtonStyle {
            is_primary,
            radius: self.border_radius,
            primary_color: self.theme.primary(),
            text_color: if is_primary {
                Color::BLACK
            } else {
                self.theme.text()
            },
        }))
    }

    fn danger_button_style(&self) -> iced::theme::Button {
        iced::theme::Button::Custom(Box::new(RoundedButtonStyle {
            is_primary: true,
            radius: self.border_radius,
            primary_color: self.theme.danger(),
            text_color: Color::WHITE,
        }))
    }

    fn input_style(&self) -> iced::theme::TextInput {
        iced::theme::TextInput::Custom(Box::new(AccentTextInputStyle {
            radius: self.border_radius,
            primary_color: self.theme.primary(),
            background_color: self.theme.background(),
            text_color: self.theme.text(),
        }))
    }

    fn checkbox_style(&self) -> iced::theme::Checkbox {
        iced::theme::Checkbox::Custom(Box::new(AccentCheckboxStyle {
            radius: 4.0,
            primary_color: self.theme.primary(),
            text_color: self.theme.text(),
        }))
    }

    fn scrollable_style(&self) -> iced::theme::Scrollable {
        iced::theme::Scrollable::Custom(Box::new(CustomScrollableStyle {
            primary_color: self.theme.primary(),
            border_radius: self.border_radius,
        }))
    }

    fn view_tabs(&self) -> Element<Message> {
        container(
            row![
                self.tab_button("Search", Tab::Search),
                self.tab_button("Installed", Tab::Installed),
                self.tab_button("Outdated", Tab::Outdated),
                self.tab_button("Services", Tab::Services),
                self.tab_button("Tags", Tab::Tags),
                Space::with_width(Length::Fill),
                button(text(if self.theme == AppTheme::Dark {
                    "Light"
                } else {
                    "Dark"
                }))
                .on_press(Message::ThemeToggled)
                .style(self.button_style(false))
                .padding(Padding::new(10.0)),
            ]
            .spacing(10)
            .align_items(alignment::Alignment::Center)
            .padding(Padding::new(10.0)),
        )
        .width(Length::Fill)
        .style(self.card_style(1.0))
        .into()
    }

    fn tab_button(&self, label: &str, tab: Tab) -> Element<Message> {
        let is_active = self.current_tab == tab;
        button(text(label).size(16.0))
            .on_press(Message::TabChanged(tab))
            .style(self.button_style(is_active))
            .padding(Padding::new(10.0))
            .into()
    }

    fn view_search(&self) -> Element<Message> {
        let controls = container(
            column![
                row![
                    text_input("Search packages...", &self.search_query)
                        .on_input(Message::SearchQueryChanged)
                        .on_submit(Message::Search)
                        .padding(Padding::new(10.0))
                        .width(Length::Fill)
                        .style(self.input_style()),
                    button(text("Search").size(16.0))
                        .on_press(Message::Search)
                        .style(self.button_style(true))
                        .padding(Padding::new(12.0)),
                ]
                .spacing(10)
                .width(Length::Fill),
                row![
                    checkbox("Casks", self.search_casks)
                        .on_toggle(Message::SearchCasksToggled)
                        .style(self.checkbox_style()),
                    checkbox("Fetch descriptions", self.search_descriptions)
                        .on_toggle(Message::SearchDescriptionsToggled)
                        .style(self.checkbox_style()),
                    Space::with_width(Length::Fill),
                    if self.selected_results.is_empty() {
                        Element::from(Space::with_width(Length::Fixed(0.0)))
                    } else {
                        Element::from(
                            button(
                                text(format!("Install {} Selected", self.selected_results.len()))
                                    .size(15.0),
                            )
                            .on_press(Message::InstallSelected)
                            .style(self.button_style(true))
                            .padding(Padding::new(10.0)),
                        )
                    },
                ]
                .spacing(16)
                .align_items(alignment::Alignment::Center),
            ]
            .spacing(12),
        )
        .width(Length::Fill)
        .padding(Padding::new(16.0))
        .style(self.card_style(1.5));

        let results: Element<Message> = if self.search_loading {
            self.centered_note("Searching...")
        } else if self.search_results.is_empty() {
            self.centered_note(if self.search_query.is_empty() {
                "Enter a search query to find packages"
            } else {
                "No packages found"
            })
        } else {
            let installed: HashSet<&str> = self
                .installed_packages
                .iter()
                .map(|p| p.name.as_str())
                .collect();
            self.package_list(&self.search_results, |pkg| {
                let selected = self.selected_results.contains(&pkg.name);
                (
                    selected,
                    Message::ToggleSearchSelection(pkg.name.clone()),
                    installed.contains(pkg.name.as_str()),
                )
            })
        };

        column![controls, results].spacing(14).into()
    }

    fn view_installed(&self) -> Element<Message> {
        let controls = container(
            row![
                text_input("Filter installed packages...", &self.installed_filter)
                    .on_input(Message::InstalledFilterChanged)
                    .padding(Padding::new(10.0))
                    .width(Length::Fill)
                    .style(self.input_style()),
                button(text("Refresh"))
                    .on_press(Message::RefreshInstalled)
                    .style(self.button_style(false))
                    .padding(Padding::new(10.0)),
                if self.selected_installed.is_empty() {
                    Element::from(Space::with_width(Length::Fixed(0.0)))
                } else {
                    Element::from(
                        button(
                            text(format!(
                                "Uninstall {} Selected",
                                self.selected_installed.len()
                            ))
                            .size(15.0),
                        )
                        .on_press(Message::UninstallSelected)
                        .style(self.danger_button_style())
                        .padding(Padding::new(10.0)),
                    )
                },
            ]
            .spacing(10)
            .align_items(alignment::Alignment::Center),
        )
        .width(Length::Fill)
        .padding(Padding::new(16.0))
        .style(self.card_style(1.5));

        let listing: Element<Message> = if self.installed_loading {
            self.centered_note("Loading installed packages...")
        } else if self.installed_packages.is_empty() {
            self.centered_note("No packages installed")
        } else {
            let filter = self.installed_filter.to_lowercase();
            let filtered: Vec<&PackageRecord> = self
                .installed_packages
                .iter()
                .filter(|p| filter.is_empty() || p.name.to_lowercase().contains(&filter))
                .collect();
            self.package_ref_list(&filtered, |pkg| {
                let selected = self.selected_installed.contains(&pkg.name);
                (
                    selected,
                    Message::ToggleInstalledSelection(pkg.name.clone()),
                    false,
                )
            })
        };

        column![controls, listing].spacing(14).into()
    }

    fn view_outdated(&self) -> Element<Message> {
        let maintenance = container(
            row![
                button(text("Update Homebrew"))
                    .on_press(Message::UpdateBrew)
                    .style(self.button_style(false))
                    .padding(Padding::new(10.0)),
                button(text("Upgrade All"))
                    .on_press(Message::UpgradeAll)
                    .style(self.button_style(true))
                    .padding(Padding::new(10.0)),
                button(text("Doctor"))
                    .on_press(Message::RunDoctor)
                    .style(self.button_style(false))
                    .padding(Padding::new(10.0)),
                button(text("Cleanup"))
                    .on_press(Message::RunCleanup)
                    .style(self.button_style(false))
                    .padding(Padding::new(10.0)),
            ]
            .spacing(10),
        )
        .width(Length::Fill)
        .padding(Padding::new(16.0))
        .style(self.card_style(1.5));

        let listing: Element<Message> = if self.outdated_loading {
            self.centered_note("Checking for outdated packages...")
        } else if self.outdated_packages.is_empty() {
            self.centered_note("Everything is up to date")
        } else {
            let theme = self.theme;
            container(
                scrollable(
                    column(
                        self.outdated_packages
                            .iter()
                            .map(|pkg| {
                                container(
                                    row![
                                        column![
                                            text(&pkg.name)
                                                .size(18.0)
                                                .style(iced::theme::Text::Color(theme.text())),
                                            text(if pkg.version.is_empty() {
                                                "installed version unknown".to_string()
                                            } else {
                                                format!("installed: {}", pkg.version)
                                            })
                                            .size(12.0)
                                            .style(iced::theme::Text::Color(
                                                theme.secondary_text()
                                            )),
                                        ]
                                        .spacing(2)
                                        .width(Length::Fill),
                                        button(text("Details"))
                                            .on_press(Message::ShowDetails(pkg.name.clone()))
                                            .style(self.button_style(false))
                                            .padding(Padding::new(8.0)),
                                        button(text("Upgrade"))
                                            .on_press(Message::UpgradePackage(pkg.name.clone()))
                                            .style(self.button_style(true))
                                            .padding(Padding::new(8.0)),
                                    ]
                                    .spacing(10)
                                    .align_items(alignment::Alignment::Center)
                                    .padding(Padding::new(10.0)),
                                )
                                .style(self.card_style(1.0))
                                .into()
                            })
                            .collect::<Vec<_>>(),
                    )
                    .spacing(6)
                    .padding(8),
                )
                .style(self.scrollable_style()),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
        };

        column![maintenance, listing].spacing(14).into()
    }

    fn view_services(&self) -> Element<Message> {
        let theme = self.theme;

        if self.services_loading {
            return self.centered_note("Loading services...");
        }
        if self.services.is_empty() {
            return self.centered_note("No Homebrew services found");
        }

        container(
            scrollable(
                column(
                    self.services
                        .iter()
                        .map(|service| {
                            let status_color = match service.status.as_str() {
                                "started" | "running" => theme.success(),
                                "stopped" | "none" => theme.secondary_text(),
                                "error" => theme.danger(),
                                _ => theme.secondary_text(),
                            };
                            container(
                                row![
                                    column![
                                        text(&service.name)
                                            .size(18.0)
                                            .style(iced::theme::Text::Color(theme.text())),
                                        text(if service.user.is_empty() {
                                            service.status.clone()
                                        } else {
                                            format!("{} ({})", service.status, service.user)
                                        })
                                        .size(12.0)
                                        .style(iced::theme::Text::Color(status_color)),
                                    ]
                                    .spacing(2)
                                    .width(Length::Fill),
                                    button(text("Start"))
                                        .on_press(Message::ServiceCommand(
                                            service.name.clone(),
                                            ServiceAction::Start,
                                        ))
                                        .style(self.button_style(false))
                                        .padding(Padding::new(8.0)),
                                    button(text("Stop"))
                                        .on_press(Message::ServiceCommand(
                                            service.name.clone(),
                                            ServiceAction::Stop,
                                        ))
                                        .style(self.button_style(false))
                                        .padding(Padding::new(8.0)),
                                    button(text("Restart"))
                                        .on_press(Message::ServiceCommand(
                                            service.name.clone(),
                                            ServiceAction::Restart,
                                        ))
                                        .style(self.button_style(false))
                                        .padding(Padding::new(8.0)),
                                ]
                                .spacing(10)
                                .align_items(alignment::Alignment::Center)
                                .padding(Padding::new(10.0)),
                            )
                            .style(self.card_style(1.0))
                            .into()
                        })
                        .collect::<Vec<_>>(),
                )
                .spacing(6)
                .padding(8),
            )
            .style(self.scrollable_style()),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }

    fn view_tags(&self) -> Element<Message> {
        let theme = self.theme;

        let swatches = row(TAG_COLORS
            .iter()
            .map(|&color| {
                let selected = self.tag_color == color;
                button(Space::new(Length::Fixed(22.0), Length::Fixed(22.0)))
                    .on_press(Message::TagColorChanged(color.to_string()))
                    .style(iced::theme::Button::Custom(Box::new(RoundedButtonStyle {
                        is_primary: true,
                        radius: if selected { 4.0 } else { 11.0 },
                        primary_color: parse_hex_color(color)
                            .unwrap_or_else(|| theme.primary()),
                        text_color: Color::WHITE,
                    })))
                    .padding(Padding::new(2.0))
                    .into()
            })
            .collect::<Vec<_>>())
        .spacing(8);

        let editor = container(
            column![
                text("Create a tag")
                    .size(16.0)
                    .style(iced::theme::Text::Color(theme.text())),
                row![
                    text_input("Tag name", &self.tag_name)
                        .on_input(Message::TagNameChanged)
                        .on_submit(Message::CreateTag)
                        .padding(Padding::new(10.0))
                        .width(Length::Fill)
                        .style(self.input_style()),
                    text_input("Description (optional)", &self.tag_description)
                        .on_input(Message::TagDescriptionChanged)
                        .padding(Padding::new(10.0))
                        .width(Length::Fill)
                        .style(self.input_style()),
                ]
                .spacing(10),
                row![
                    swatches,
                    Space::with_width(Length::Fill),
                    button(text("Create"))
                        .on_press(Message::CreateTag)
                        .style(self.button_style(true))
                        .padding(Padding::new(10.0)),
                ]
                .spacing(10)
                .align_items(alignment::Alignment::Center),
            ]
            .spacing(12),
        )
        .width(Length::Fill)
        .padding(Padding::new(16.0))
        .style(self.card_style(1.5));

        let listing: Element<Message> = if self.tags.is_empty() {
            self.centered_note("No tags yet")
        } else {
            container(
                scrollable(
                    column(
                        self.tags
                            .iter()
                            .map(|tag| {
                                container(
                                    row![
                                        container(Space::new(
                                            Length::Fixed(14.0),
                                            Length::Fixed(14.0)
                                        ))
                                        .style(iced::theme::Container::Custom(Box::new(
                                            RoundedContainerStyle {
                                                radius: 7.0,
                                                background: parse_hex_color(&tag.color),
                                                elevation: 0.5,
                                            }
                                        ))),
                                        column![
                                            text(&tag.name)
                                                .size(16.0)
                                                .style(iced::theme::Text::Color(theme.text())),
                                            if tag.description.is_empty() {
                                                Element::from(Space::with_height(Length::Shrink))
                                            } else {
                                                Element::from(
                                                    text(&tag.description).size(12.0).style(
                                                        iced::theme::Text::Color(
                                                            theme.secondary_text(),
                                                        ),
                                                    ),
                                                )
                                            },
                                        ]
                                        .spacing(2)
                                        .width(Length::Fill),
                                        button(text("Delete"))
                                            .on_press(Message::DeleteTag(tag.id.clone()))
                                            .style(self.danger_button_style())
                                            .padding(Padding::new(8.0)),
                                    ]
                                    .spacing(12)
                                    .align_items(alignment::Alignment::Center)
                                    .padding(Padding::new(10.0)),
                                )
                                .style(self.card_style(1.0))
                                .into()
                            })
                            .collect::<Vec<_>>(),
                    )
                    .spacing(6)
                    .padding(8),
                )
                .style(self.scrollable_style()),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
        };

        column![editor, listing].spacing(14).into()
    }

    fn view_details(&self, record: &PackageRecord, tags: &[Tag]) -> Element<Message> {
        let theme = self.theme;

        let mut info = column![
            row![
                text(&record.name)
                    .size(26.0)
                    .style(iced::theme::Text::Color(theme.text())),
                text(format!("[{}]", record.kind))
                    .size(14.0)
                    .style(iced::theme::Text::Color(theme.secondary_text())),
                Space::with_width(Length::Fill),
                button(text("Close"))
                    .on_press(Message::CloseDetails)
                    .style(self.button_style(false))
                    .padding(Padding::new(8.0)),
            ]
            .spacing(10)
            .align_items(alignment::Alignment::Center),
        ]
        .spacing(10);

        if !record.version.is_empty() {
            info = info.push(
                text(format!("Version: {}", record.version))
                    .size(14.0)
                    .style(iced::theme::Text::Color(theme.secondary_text())),
            );
        }
        if !record.description.is_empty() {
            info = info.push(
                text(&record.description)
                    .size(15.0)
                    .style(iced::theme::Text::Color(theme.text())),
            );
        }
        if !record.homepage.is_empty() {
            info = info.push(
                text(&record.homepage)
                    .size(13.0)
                    .style(iced::theme::Text::Color(theme.primary())),
            );
        }
        if !record.dependencies.is_empty() {
            info = info.push(
                text(format!("Dependencies: {}", record.dependencies.join(", ")))
                    .size(13.0)
                    .style(iced::theme::Text::Color(theme.secondary_text())),
            );
        }
        info = info.push(
            text(if record.installed {
                "Installed"
            } else {
                "Not installed"
            })
            .size(13.0)
            .style(iced::theme::Text::Color(if record.installed {
                theme.success()
            } else {
                theme.secondary_text()
            })),
        );

        // Assigned tags with unassign buttons
        let mut tag_row = row![].spacing(8).align_items(alignment::Alignment::Center);
        tag_row = tag_row.push(
            text("Tags:")
                .size(14.0)
                .style(iced::theme::Text::Color(theme.text())),
        );
        if tags.is_empty() {
            tag_row = tag_row.push(
                text("none")
                    .size(13.0)
                    .style(iced::theme::Text::Color(theme.secondary_text())),
            );
        }
        for tag in tags {
            tag_row = tag_row.push(
                button(text(format!("{} ✕", tag.name)).size(13.0))
                    .on_press(Message::UnassignTag(record.name.clone(), tag.id.clone()))
                    .style(iced::theme::Button::Custom(Box::new(RoundedButtonStyle {
                        is_primary: true,
                        radius: self.border_radius,
                        primary_color: parse_hex_color(&tag.color)
                            .unwrap_or_else(|| theme.primary()),
                        text_color: Color::WHITE,
                    })))
                    .padding(Padding::new(6.0)),
            );
        }

        // Tags not yet assigned to this package
        let assigned: HashSet<&str> = tags.iter().map(|t| t.id.as_str()).collect();
        let mut assignable = row![].spacing(8).align_items(alignment::Alignment::Center);
        let unassigned: Vec<&Tag> = self
            .tags
            .iter()
            .filter(|t| !assigned.contains(t.id.as_str()))
            .collect();
        if !unassigned.is_empty() {
            assignable = assignable.push(
                text("Add:")
                    .size(14.0)
                    .style(iced::theme::Text::Color(theme.secondary_text())),
            );
            for tag in unassigned {
                assignable = assignable.push(
                    button(text(format!("+ {}", tag.name)).size(13.0))
                        .on_press(Message::AssignTag(record.name.clone(), tag.clone()))
                        .style(self.button_style(false))
                        .padding(Padding::new(6.0)),
                );
            }
        }

        let actions = row![
            if record.installed {
                Element::from(
                    button(text("Uninstall"))
                        .on_press(Message::UninstallOne(record.name.clone()))
                        .style(self.danger_button_style())
                        .padding(Padding::new(10.0)),
                )
            } else {
                Element::from(
                    button(text("Install"))
                        .on_press(Message::InstallOne(record.name.clone()))
                        .style(self.button_style(true))
                        .padding(Padding::new(10.0)),
                )
            },
        ]
        .spacing(10);

        container(
            scrollable(
                column![info, tag_row, assignable, actions]
                    .spacing(16)
                    .padding(Padding::new(16.0)),
            )
            .style(self.scrollable_style()),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .style(self.card_style(1.5))
        .into()
    }

    fn view_log(&self) -> Element<Message> {
        let theme = self.theme;

        if self.output_log.is_empty() && self.error_log.is_empty() {
            return Element::from(Space::with_height(Length::Fixed(0.0)));
        }

        let mut lines = column![].spacing(2);
        for line in self.output_log.iter().rev().take(4).rev() {
            lines = lines.push(
                text(line)
                    .size(12.0)
                    .style(iced::theme::Text::Color(theme.secondary_text())),
            );
        }
        for line in self.error_log.iter().rev().take(4).rev() {
            lines = lines.push(
                text(line)
                    .size(12.0)
                    .style(iced::theme::Text::Color(theme.danger())),
            );
        }

        container(
            row![
                lines.width(Length::Fill),
                button(text("Clear").size(12.0))
                    .on_press(Message::ClearOutput)
                    .style(self.button_style(false))
                    .padding(Padding::new(6.0)),
            ]
            .spacing(10)
            .align_items(alignment::Alignment::Center)
            .padding(Padding::new(10.0)),
        )
        .width(Length::Fill)
        .style(self.card_style(1.0))
        .into()
    }

    fn centered_note(&self, note: &str) -> Element<'static, Message> {
        container(
            text(note.to_string())
                .size(16.0)
                .style(iced::theme::Text::Color(self.theme.text())),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x()
        .center_y()
        .into()
    }

    fn package_list<'a, F>(
        &'a self,
        packages: &'a [PackageRecord],
        state: F,
    ) -> Element<'a, Message>
    where
        F: Fn(&PackageRecord) -> (bool, Message, bool),
    {
        let refs: Vec<&PackageRecord> = packages.iter().collect();
        self.package_ref_list(&refs, state)
    }

    fn package_ref_list<'a, F>(
        &'a self,
        packages: &[&'a PackageRecord],
        state: F,
    ) -> Element<'a, Message>
    where
        F: Fn(&PackageRecord) -> (bool, Message, bool),
    {
        let theme = self.theme;
        container(
            scrollable(
                column(
                    packages
                        .iter()
                        .map(|pkg| {
                            let (selected, toggle, installed) = state(pkg);
                            let mut meta = row![].spacing(10);
                            if !pkg.version.is_empty() {
                                meta = meta.push(
                                    text(format!("v{}", pkg.version)).size(12.0).style(
                                        iced::theme::Text::Color(theme.secondary_text()),
                                    ),
                                );
                            }
                            if pkg.kind == PackageKind::Cask {
                                meta = meta.push(
                                    text("cask")
                                        .size(12.0)
                                        .style(iced::theme::Text::Color(theme.primary())),
                                );
                            }
                            if installed {
                                meta = meta.push(
                                    text("installed")
                                        .size(12.0)
                                        .style(iced::theme::Text::Color(theme.success())),
                                );
                            }

                            button(
                                container(
                                    row![
                                        checkbox("", selected).style(self.checkbox_style()),
                                        column![
                                            text(&pkg.name)
                                                .size(18.0)
                                                .style(iced::theme::Text::Color(theme.text()))
                                                .width(Length::Fill),
                                            if pkg.description.is_empty() {
                                                Element::from(Space::with_height(Length::Shrink))
                                            } else {
                                                Element::from(
                                                    text(truncate(&pkg.description, 120))
                                                        .size(12.0)
                                                        .style(iced::theme::Text::Color(
                                                            theme.secondary_text(),
                                                        ))
                                                        .width(Length::Fill),
                                                )
                                            },
                                            meta,
                                        ]
                                        .spacing(3)
                                        .width(Length::Fill),
                                        button(text("Details").size(13.0))
                                            .on_press(Message::ShowDetails(pkg.name.clone()))
                                            .style(self.button_style(false))
                                            .padding(Padding::new(8.0)),
                                    ]
                                    .spacing(12)
                                    .align_items(alignment::Alignment::Center)
                                    .padding(Padding::new(10.0)),
                                )
                                .style(iced::theme::Container::Custom(Box::new(
                                    RoundedContainerStyle {
                                        radius: self.border_radius,
                                        background: if selected {
                                            Some(Color {
                                                a: 0.25,
                                                ..theme.primary()
                                            })
                                        } else {
                                            Some(theme.card_background())
                                        },
                                        elevation: 1.0,
                                    },
                                ))),
                            )
                            .on_press(toggle)
                            .style(iced::theme::Button::Custom(Box::new(RoundedButtonStyle {
                                is_primary: false,
                                radius: self.border_radius,
                                primary_color: theme.primary(),
                                text_color: theme.text(),
                            })))
                            .into()
                        })
                        .collect::<Vec<_>>(),
                )
                .spacing(6)
                .padding(8),
            )
            .style(self.scrollable_style()),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }
}

fn truncate(value: &str, limit: usize) -> String {
    if value.chars().count() > limit {
        let cut: String = value.chars().take(limit).collect();
        format!("{}...", cut)
    } else {
        value.to_string()
    }
}

fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::from_rgb8(r, g, b))
}

async fn search_packages(
    query: String,
    options: SearchOptions,
) -> Result<Vec<PackageRecord>, String> {
    tokio::task::spawn_blocking(move || {
        let client = BrewClient::new().map_err(|e| e.to_string())?;
        client.search(&query, &options).map_err(|e| e.to_string())
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

/// Formula and cask listings are independent top-level queries, so load
/// them concurrently and concatenate.
async fn load_installed_packages() -> Vec<PackageRecord> {
    let formulae = tokio::task::spawn_blocking(|| list_installed_kind(PackageKind::Formula));
    let casks = tokio::task::spawn_blocking(|| list_installed_kind(PackageKind::Cask));
    let (formulae, casks) = futures::future::join(formulae, casks).await;

    let mut packages = formulae.unwrap_or_default();
    packages.extend(casks.unwrap_or_default());
    packages
}

fn list_installed_kind(kind: PackageKind) -> Vec<PackageRecord> {
    match BrewClient::new() {
        Ok(client) => client.installed_packages(kind).unwrap_or_default(),
        Err(_) => Vec::new(),
    }
}

async fn load_outdated_packages() -> Result<Vec<PackageRecord>, String> {
    tokio::task::spawn_blocking(|| {
        let client = BrewClient::new().map_err(|e| e.to_string())?;
        client.outdated_packages().map_err(|e| e.to_string())
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

async fn load_services() -> Result<Vec<ServiceRecord>, String> {
    tokio::task::spawn_blocking(|| {
        let client = BrewClient::new().map_err(|e| e.to_string())?;
        client.services().map_err(|e| e.to_string())
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

async fn load_all_tags() -> Vec<Tag> {
    tokio::task::spawn_blocking(|| match TagStore::new() {
        Ok(store) => store.list_tags().unwrap_or_default(),
        Err(_) => Vec::new(),
    })
    .await
    .unwrap_or_default()
}

async fn load_details(name: String) -> Result<(PackageRecord, Vec<Tag>), String> {
    tokio::task::spawn_blocking(move || {
        let client = BrewClient::new().map_err(|e| e.to_string())?;
        let record = client.package_info(&name).map_err(|e| e.to_string())?;
        let tags = TagStore::new()
            .and_then(|store| store.package_tags(&name))
            .unwrap_or_default();
        Ok((record, tags))
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

async fn install_packages(names: Vec<String>) -> Result<String, String> {
    tokio::task::spawn_blocking(move || {
        let client = BrewClient::new().map_err(|e| e.to_string())?;
        for name in &names {
            client.install(name).map_err(|e| e.to_string())?;
        }
        Ok(format!("Installed {} package(s)", names.len()))
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

async fn uninstall_packages(names: Vec<String>) -> Result<String, String> {
    tokio::task::spawn_blocking(move || {
        let client = BrewClient::new().map_err(|e| e.to_string())?;
        for name in &names {
            client.uninstall(name).map_err(|e| e.to_string())?;
        }
        Ok(format!("Uninstalled {} package(s)", names.len()))
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

async fn upgrade_packages(name: Option<String>) -> Result<String, String> {
    tokio::task::spawn_blocking(move || {
        let client = BrewClient::new().map_err(|e| e.to_string())?;
        client
            .upgrade(name.as_deref())
            .map_err(|e| e.to_string())?;
        Ok(match name {
            Some(name) => format!("Upgraded {}", name),
            None => "Upgraded all packages".to_string(),
        })
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

async fn run_update() -> Result<String, String> {
    tokio::task::spawn_blocking(|| {
        let client = BrewClient::new().map_err(|e| e.to_string())?;
        client.update().map_err(|e| e.to_string())?;
        Ok("Homebrew updated".to_string())
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

async fn run_doctor() -> Result<String, String> {
    tokio::task::spawn_blocking(|| {
        let client = BrewClient::new().map_err(|e| e.to_string())?;
        let output = client.doctor().map_err(|e| e.to_string())?;
        let report = output.trim();
        Ok(if report.is_empty() {
            "Your system is ready to brew".to_string()
        } else {
            report.to_string()
        })
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

async fn run_cleanup() -> Result<String, String> {
    tokio::task::spawn_blocking(|| {
        let client = BrewClient::new().map_err(|e| e.to_string())?;
        client.cleanup().map_err(|e| e.to_string())?;
        Ok("Cleanup finished".to_string())
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

async fn create_tag(name: String, color: String, description: String) -> Result<Tag, String> {
    tokio::task::spawn_blocking(move || {
        let store = TagStore::new().map_err(|e| e.to_string())?;
        store
            .create_tag(&name, &color, &description)
            .map_err(|e| e.to_string())
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

async fn delete_tag(id: String) -> Result<String, String> {
    tokio::task::spawn_blocking(move || {
        let store = TagStore::new().map_err(|e| e.to_string())?;
        store.delete_tag(&id).map_err(|e| e.to_string())?;
        Ok(id)
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

async fn assign_tag(package: String, tag: Tag) -> Result<Vec<Tag>, String> {
    tokio::task::spawn_blocking(move || {
        let store = TagStore::new().map_err(|e| e.to_string())?;
        store
            .add_package_tag(&package, &tag)
            .map_err(|e| e.to_string())?;
        store.package_tags(&package).map_err(|e| e.to_string())
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

async fn unassign_tag(package: String, tag_id: String) -> Result<Vec<Tag>, String> {
    tokio::task::spawn_blocking(move || {
        let store = TagStore::new().map_err(|e| e.to_string())?;
        store
            .remove_package_tag(&package, &tag_id)
            .map_err(|e| e.to_string())?;
        store.package_tags(&package).map_err(|e| e.to_string())
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

async fn run_service_action(
    name: String,
    action: ServiceAction,
) -> Result<Vec<ServiceRecord>, String> {
    tokio::task::spawn_blocking(move || {
        let client = BrewClient::new().map_err(|e| e.to_string())?;
        client
            .service_action(&name, action)
            .map_err(|e| e.to_string())?;
        client.services().map_err(|e| e.to_string())
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}
