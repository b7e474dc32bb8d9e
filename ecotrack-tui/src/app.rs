use ecotrack_core::{Bin, BinId, EcoTrack, UserRole, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Login,
    Main,
}

pub(crate) struct App {
    pub service: EcoTrack,

    pub screen: Screen,
    pub role_list_index: usize,

    pub views: Vec<View>,
    pub view_index: usize,

    pub search_input: String,
    pub is_searching: bool,
    pub bin_list_index: usize,
    pub route_list_index: usize,

    pub is_loading: bool,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(service: EcoTrack) -> Self {
        Self {
            service,
            screen: Screen::Login,
            role_list_index: 0,
            views: Vec::new(),
            view_index: 0,
            search_input: String::new(),
            is_searching: false,
            bin_list_index: 0,
            route_list_index: 0,
            is_loading: false,
            status_message: None,
            error_message: None,
        }
    }

    pub(crate) fn current_view(&self) -> View {
        self.views
            .get(self.view_index)
            .copied()
            .unwrap_or(View::Dashboard)
    }

    pub(crate) fn selected_role(&self) -> UserRole {
        UserRole::ALL
            .get(self.role_list_index)
            .copied()
            .unwrap_or(UserRole::Admin)
    }

    pub(crate) fn login(&mut self, role: UserRole) {
        if let Some(user) = self.service.login(role) {
            self.views = View::for_role(user.role);
            self.view_index = 0;
            self.screen = Screen::Main;
            self.status_message = Some(format!("Welcome, {}", user.name));
            self.error_message = None;
        }
    }

    pub(crate) fn logout(&mut self) {
        self.service.logout();
        self.views.clear();
        self.view_index = 0;
        self.bin_list_index = 0;
        self.route_list_index = 0;
        self.search_input.clear();
        self.is_searching = false;
        self.screen = Screen::Login;
        self.status_message = None;
        self.error_message = None;
    }

    pub(crate) fn next_view(&mut self) {
        if !self.views.is_empty() {
            self.view_index = (self.view_index + 1) % self.views.len();
        }
    }

    pub(crate) fn previous_view(&mut self) {
        if !self.views.is_empty() {
            self.view_index = self
                .view_index
                .checked_sub(1)
                .unwrap_or(self.views.len() - 1);
        }
    }

    /// Bins shown in the bin table, filtered by the search input.
    pub(crate) fn visible_bins(&self) -> Vec<Bin> {
        self.service.read(|store| {
            store
                .search(&self.search_input)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub(crate) fn selected_bin_id(&self) -> Option<BinId> {
        self.visible_bins()
            .get(self.bin_list_index)
            .map(|bin| bin.id.clone())
    }

    pub(crate) fn clamp_selection(&mut self) {
        let bins = self.visible_bins().len();
        self.bin_list_index = self.bin_list_index.min(bins.saturating_sub(1));
        let routes = self.service.read(|store| store.routes().len());
        self.route_list_index = self.route_list_index.min(routes.saturating_sub(1));
    }
}
