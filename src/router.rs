use crate::observer::{lock, Subscription};
use crate::session::{SessionState, SessionStatus, SessionStore};
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Splash,
    LoginSignup,
    Login,
    Signup,
    Home,
}

impl Screen {
    pub fn group(&self) -> ScreenGroup {
        match self {
            Screen::Splash => ScreenGroup::Splash,
            Screen::LoginSignup | Screen::Login | Screen::Signup => ScreenGroup::Auth,
            Screen::Home => ScreenGroup::App,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Splash => "Splash",
            Screen::LoginSignup => "LoginSignUp",
            Screen::Login => "Login",
            Screen::Signup => "Signup",
            Screen::Home => "Home",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenGroup {
    Splash,
    Auth,
    App,
}

impl ScreenGroup {
    pub fn for_status(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Loading => ScreenGroup::Splash,
            SessionStatus::Unauthenticated => ScreenGroup::Auth,
            SessionStatus::Authenticated => ScreenGroup::App,
        }
    }

    pub fn initial_screen(&self) -> Screen {
        match self {
            ScreenGroup::Splash => Screen::Splash,
            ScreenGroup::Auth => Screen::LoginSignup,
            ScreenGroup::App => Screen::Home,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("screen {screen} is not available while {group:?} screens are shown")]
    NotInGroup { screen: Screen, group: ScreenGroup },
}

/// Picks the presented screen from session state. Navigation only moves
/// within the current group; switching groups happens through `on_state`.
#[derive(Debug)]
pub struct ScreenRouter {
    group: ScreenGroup,
    stack: Vec<Screen>,
}

impl ScreenRouter {
    pub fn new() -> Self {
        Self {
            group: ScreenGroup::Splash,
            stack: vec![Screen::Splash],
        }
    }

    /// Subscribe a shared router to `store`. The router follows the store for
    /// as long as the returned subscription is alive.
    pub fn attach(store: &SessionStore) -> (Arc<Mutex<ScreenRouter>>, Subscription) {
        let router = Arc::new(Mutex::new(ScreenRouter::new()));
        let shared = Arc::clone(&router);
        let subscription = store.subscribe(move |state| {
            lock(&shared).on_state(state);
        });
        (router, subscription)
    }

    /// Follow a session state change. Returns true when the group changed.
    pub fn on_state(&mut self, state: &SessionState) -> bool {
        let group = ScreenGroup::for_status(state.status());
        if group == self.group {
            return false;
        }
        tracing::debug!(from = ?self.group, to = ?group, "switching screen group");
        self.group = group;
        self.stack = vec![group.initial_screen()];
        true
    }

    pub fn navigate(&mut self, screen: Screen) -> Result<(), RouteError> {
        if screen.group() != self.group {
            return Err(RouteError::NotInGroup {
                screen,
                group: self.group,
            });
        }
        if self.current() != screen {
            self.stack.push(screen);
        }
        Ok(())
    }

    /// Pop one screen; the group's root is never popped.
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Screen {
        self.stack
            .last()
            .copied()
            .unwrap_or_else(|| self.group.initial_screen())
    }

    pub fn group(&self) -> ScreenGroup {
        self.group
    }

    pub fn stack(&self) -> &[Screen] {
        &self.stack
    }
}

impl Default for ScreenRouter {
    fn default() -> Self {
        Self::new()
    }
}
