use std::sync::Arc;

use ratatui::widgets::ListState;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::info;

use crate::controller::{FetchController, FetchState};
use crate::source::{public_gists_url, user_gists_url, Gist, Retrieve};
use crate::toggle::Accordion;

pub const FAQ_ANSWER: &str = "This is the answer to the question.";

/// One list of gists bound to one fetch controller.
pub struct GistPanel {
    pub title: String,
    /// Text shown while the retrieval is outstanding.
    pub loading_text: String,
    controller: FetchController<Vec<Gist>>,
    /// Marks when the controller has published something not yet drawn.
    updates: watch::Receiver<FetchState<Vec<Gist>>>,
    /// List selection state for scrolling.
    pub list_state: ListState,
}

impl GistPanel {
    pub fn new(
        title: impl Into<String>,
        loading_text: impl Into<String>,
        controller: FetchController<Vec<Gist>>,
    ) -> Self {
        let updates = controller.subscribe();
        Self {
            title: title.into(),
            loading_text: loading_text.into(),
            controller,
            updates,
            list_state: ListState::default(),
        }
    }

    /// Start (or keep) showing the gists at `url`.
    pub fn mount(&mut self, url: &str) {
        if self.controller.url() == Some(url) {
            return;
        }
        self.list_state.select(None);
        self.controller.observe(url);
        info!(panel = %self.title, url, "panel mounted");
    }

    /// Stop showing; any retrieval in flight is abandoned.
    pub fn unmount(&mut self) {
        if let Some(url) = self.controller.url() {
            info!(panel = %self.title, url, "panel unmounted");
        }
        self.controller.stop();
        self.list_state.select(None);
    }

    pub fn is_mounted(&self) -> bool {
        self.controller.url().is_some()
    }

    /// Whether the state changed since the last call.
    pub fn take_update(&mut self) -> bool {
        match self.updates.has_changed() {
            Ok(true) => {
                self.updates.borrow_and_update();
                true
            }
            _ => false,
        }
    }

    pub fn reload(&mut self) {
        self.controller.reload();
    }

    pub fn state(&self) -> FetchState<Vec<Gist>> {
        self.controller.state()
    }

    /// Number of gists currently listed (zero while loading or failed).
    pub fn len(&self) -> usize {
        self.state().data.map_or(0, |gists| gists.len())
    }

    pub fn selected_gist(&self) -> Option<Gist> {
        let index = self.list_state.selected()?;
        self.state().data?.into_iter().nth(index)
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.len() == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.len() > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }
}

/// Which gist panel receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Public,
    User,
}

pub struct App {
    api_base: String,
    users: Vec<String>,
    user_index: usize,
    /// Page-level Show/Hide: both gist panels are mounted only while open.
    pub page: Accordion,
    pub faq: Accordion,
    pub public: GistPanel,
    pub user: GistPanel,
    pub focus: Focus,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last action message.
    pub status: String,
}

impl App {
    /// Build the page with both panels unmounted.
    ///
    /// `users` must not be empty.
    pub fn new(
        api_base: impl Into<String>,
        users: Vec<String>,
        source: Arc<dyn Retrieve<Vec<Gist>>>,
        runtime: Handle,
    ) -> Self {
        let user = users.first().cloned().unwrap_or_default();
        let public = GistPanel::new(
            "Public Gists",
            "Loading public gists...",
            FetchController::new(Arc::clone(&source), runtime.clone()),
        );
        let user_panel = GistPanel::new(
            format!("{user}'s Gists"),
            format!("Loading {user}'s gists..."),
            FetchController::new(source, runtime),
        );

        Self {
            api_base: api_base.into(),
            users,
            user_index: 0,
            page: Accordion::new(),
            faq: Accordion::new(),
            public,
            user: user_panel,
            focus: Focus::Public,
            quit: false,
            status: "Press space to show gists".into(),
        }
    }

    /// Whether either panel published a state change since the last call.
    pub fn take_updates(&mut self) -> bool {
        let public = self.public.take_update();
        let user = self.user.take_update();
        public || user
    }

    pub fn current_user(&self) -> &str {
        self.users
            .get(self.user_index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    // -- page accordion ------------------------------------------------------

    pub fn toggle_page(&mut self) {
        self.page.toggle();
        self.sync_panels();
    }

    pub fn set_page_open(&mut self, open: bool) {
        self.page.set_open(open);
        self.sync_panels();
    }

    /// Mount both panels while the page is open, unmount them otherwise.
    fn sync_panels(&mut self) {
        if self.page.is_open() {
            let public_url = public_gists_url(&self.api_base);
            let user_url = user_gists_url(&self.api_base, self.current_user());
            self.public.mount(&public_url);
            self.user.mount(&user_url);
            self.status = "Showing gists".into();
        } else if self.public.is_mounted() || self.user.is_mounted() {
            self.public.unmount();
            self.user.unmount();
            self.status = "Gists hidden".into();
        }
        info!(open = self.page.is_open(), "page accordion changed");
    }

    pub fn toggle_faq(&mut self) {
        self.faq.toggle();
    }

    // -- user switching ------------------------------------------------------

    /// Point the user panel at the next configured account.
    pub fn next_user(&mut self) {
        if self.users.len() < 2 {
            self.status = "Only one user configured".into();
            return;
        }
        self.user_index = (self.user_index + 1) % self.users.len();
        let user = self.current_user().to_string();
        self.user.title = format!("{user}'s Gists");
        self.user.loading_text = format!("Loading {user}'s gists...");

        if self.user.is_mounted() {
            let url = user_gists_url(&self.api_base, &user);
            self.user.mount(&url);
        }
        info!(user = %user, "switched user");
        self.status = format!("Now showing {user}");
    }

    // -- focus & navigation --------------------------------------------------

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Public => Focus::User,
            Focus::User => Focus::Public,
        };
    }

    pub fn focused_mut(&mut self) -> &mut GistPanel {
        match self.focus {
            Focus::Public => &mut self.public,
            Focus::User => &mut self.user,
        }
    }

    pub fn focused(&self) -> &GistPanel {
        match self.focus {
            Focus::Public => &self.public,
            Focus::User => &self.user,
        }
    }

    pub fn reload_focused(&mut self) {
        let panel = self.focused_mut();
        if !panel.is_mounted() {
            return;
        }
        panel.reload();
        self.status = format!("Reloading {}", self.focused().title);
    }

    /// Show the selected gist's link in the status bar.
    pub fn open_selected(&mut self) {
        if let Some(gist) = self.focused().selected_gist() {
            self.status = gist.html_url;
        }
    }
}
