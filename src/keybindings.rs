//! Keybinding registry: maps key events to actions per screen, with config
//! overrides.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    Select,
    Back,
    Refresh,
    EnterSearch,
    ExitSearch,
    CommitSearch,
    OpenFilters,
    ShowFavorites,
    ToggleFavorite,
    RemoveFavorite,
    Share,
    Download,
    Logout,
    BiometricLogin,
    PlainLogin,
    CycleTheme,
    ShowHelp,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    NextField,
    PrevField,
    NextValue,
    PrevValue,
    ApplyFilters,
    ResetFilters,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::Select => "Open article",
            Self::Back => "Go back / dismiss",
            Self::Refresh => "Refresh (retry after an error)",
            Self::EnterSearch => "Search articles",
            Self::ExitSearch => "Clear search",
            Self::CommitSearch => "Search now",
            Self::OpenFilters => "Filter articles",
            Self::ShowFavorites => "Show favorites",
            Self::ToggleFavorite => "Save / unsave article",
            Self::RemoveFavorite => "Remove from favorites",
            Self::Share => "Open in browser",
            Self::Download => "Download article",
            Self::Logout => "Log out",
            Self::BiometricLogin => "Log in with biometrics",
            Self::PlainLogin => "Log in",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Show help",
            Self::ScrollDown => "Scroll down one line",
            Self::ScrollUp => "Scroll up one line",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::NextField => "Next filter",
            Self::PrevField => "Previous filter",
            Self::NextValue => "Next value",
            Self::PrevValue => "Previous value",
            Self::ApplyFilters => "Apply filters",
            Self::ResetFilters => "Reset to defaults",
        }
    }
}

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Login,
    Browse,
    Detail,
    Favorites,
    Search,
    Filters,
}

impl Context {
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Login => "Login",
            Self::Browse => "Articles",
            Self::Detail => "Article detail",
            Self::Favorites => "Favorites",
            Self::Search => "Search",
            Self::Filters => "Filters",
        }
    }

    /// Text-entry and modal contexts must not leak global keys like `q`.
    fn falls_back_to_global(self) -> bool {
        !matches!(self, Self::Global | Self::Search | Self::Filters)
    }
}

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }
}

const DEFAULT_BINDINGS: &[(Context, KeySpec, Action)] = &[
    // Global
    (Context::Global, KeySpec::ch('q'), Action::Quit),
    (Context::Global, KeySpec::ch('j'), Action::NavDown),
    (Context::Global, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::Global, KeySpec::ch('k'), Action::NavUp),
    (Context::Global, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::Global, KeySpec::plain(KeyCode::Enter), Action::Select),
    (Context::Global, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Global, KeySpec::ch('T'), Action::CycleTheme),
    (Context::Global, KeySpec::ch('?'), Action::ShowHelp),
    // Login
    (Context::Login, KeySpec::ch('b'), Action::BiometricLogin),
    (Context::Login, KeySpec::plain(KeyCode::Enter), Action::PlainLogin),
    // Article list
    (Context::Browse, KeySpec::ch('r'), Action::Refresh),
    (Context::Browse, KeySpec::ch('/'), Action::EnterSearch),
    (Context::Browse, KeySpec::ch('f'), Action::OpenFilters),
    (Context::Browse, KeySpec::ch('F'), Action::ShowFavorites),
    (Context::Browse, KeySpec::ch('L'), Action::Logout),
    // Detail
    (Context::Detail, KeySpec::ch('j'), Action::ScrollDown),
    (Context::Detail, KeySpec::plain(KeyCode::Down), Action::ScrollDown),
    (Context::Detail, KeySpec::ch('k'), Action::ScrollUp),
    (Context::Detail, KeySpec::plain(KeyCode::Up), Action::ScrollUp),
    (Context::Detail, KeySpec::ctrl('d'), Action::PageDown),
    (Context::Detail, KeySpec::ctrl('u'), Action::PageUp),
    (Context::Detail, KeySpec::ch('s'), Action::ToggleFavorite),
    (Context::Detail, KeySpec::ch('o'), Action::Share),
    (Context::Detail, KeySpec::ch('d'), Action::Download),
    (Context::Detail, KeySpec::ch('b'), Action::Back),
    // Favorites
    (Context::Favorites, KeySpec::ch('x'), Action::RemoveFavorite),
    (Context::Favorites, KeySpec::ch('o'), Action::Share),
    (Context::Favorites, KeySpec::ch('b'), Action::Back),
    (Context::Favorites, KeySpec::ch('L'), Action::Logout),
    // Search input
    (Context::Search, KeySpec::plain(KeyCode::Esc), Action::ExitSearch),
    (Context::Search, KeySpec::plain(KeyCode::Enter), Action::CommitSearch),
    // Filter overlay
    (Context::Filters, KeySpec::ch('j'), Action::NextField),
    (Context::Filters, KeySpec::plain(KeyCode::Down), Action::NextField),
    (Context::Filters, KeySpec::plain(KeyCode::Tab), Action::NextField),
    (Context::Filters, KeySpec::ch('k'), Action::PrevField),
    (Context::Filters, KeySpec::plain(KeyCode::Up), Action::PrevField),
    (Context::Filters, KeySpec::ch('l'), Action::NextValue),
    (Context::Filters, KeySpec::plain(KeyCode::Right), Action::NextValue),
    (Context::Filters, KeySpec::ch('h'), Action::PrevValue),
    (Context::Filters, KeySpec::plain(KeyCode::Left), Action::PrevValue),
    (Context::Filters, KeySpec::plain(KeyCode::Enter), Action::ApplyFilters),
    (Context::Filters, KeySpec::ch('x'), Action::ResetFilters),
    (Context::Filters, KeySpec::plain(KeyCode::Esc), Action::Back),
];

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Backspace"
/// - Modifier combos: "Ctrl+d", "Ctrl+u"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    // Named keys (case-insensitive)
    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|rest| rest.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::plain(KeyCode::Char(c))),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts. Screen
/// contexts fall back to `Global`; search input and the filter overlay do not.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        for &(context, key, action) in DEFAULT_BINDINGS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    /// Apply user overrides from the config `[keybindings]` table.
    ///
    /// Keys in the map are action names (e.g., "quit", "toggle_favorite").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). An override
    /// replaces every default key of that action, in every context it was
    /// bound in.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        // Shifted letters arrive with SHIFT set; the char already carries the case.
        let modifiers = match code {
            KeyCode::Char(_) => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }
        if context.falls_back_to_global() {
            return self.lookup.get(&(Context::Global, key)).copied();
        }
        None
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "select" | "open" => Some(Action::Select),
        "back" => Some(Action::Back),
        "refresh" | "retry" => Some(Action::Refresh),
        "search" | "enter_search" => Some(Action::EnterSearch),
        "exit_search" => Some(Action::ExitSearch),
        "commit_search" => Some(Action::CommitSearch),
        "filters" | "open_filters" => Some(Action::OpenFilters),
        "favorites" | "show_favorites" => Some(Action::ShowFavorites),
        "toggle_favorite" | "favorite" | "save" => Some(Action::ToggleFavorite),
        "remove_favorite" => Some(Action::RemoveFavorite),
        "share" | "open_in_browser" => Some(Action::Share),
        "download" => Some(Action::Download),
        "logout" => Some(Action::Logout),
        "biometric_login" => Some(Action::BiometricLogin),
        "login" => Some(Action::PlainLogin),
        "theme" | "cycle_theme" => Some(Action::CycleTheme),
        "help" | "show_help" => Some(Action::ShowHelp),
        "scroll_down" => Some(Action::ScrollDown),
        "scroll_up" => Some(Action::ScrollUp),
        "page_down" => Some(Action::PageDown),
        "page_up" => Some(Action::PageUp),
        "next_field" => Some(Action::NextField),
        "prev_field" => Some(Action::PrevField),
        "next_value" => Some(Action::NextValue),
        "prev_value" => Some(Action::PrevValue),
        "apply_filters" => Some(Action::ApplyFilters),
        "reset_filters" => Some(Action::ResetFilters),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(reg: &KeybindingRegistry, c: char, context: Context) -> Option<Action> {
        reg.action_for_key(KeyCode::Char(c), KeyModifiers::NONE, context)
    }

    #[test]
    fn test_default_nav_keys() {
        let reg = KeybindingRegistry::new();
        assert_eq!(lookup(&reg, 'j', Context::Browse), Some(Action::NavDown));
        assert_eq!(
            reg.action_for_key(KeyCode::Up, KeyModifiers::NONE, Context::Favorites),
            Some(Action::NavUp)
        );
    }

    #[test]
    fn test_detail_context_overrides_global() {
        let reg = KeybindingRegistry::new();
        assert_eq!(lookup(&reg, 'j', Context::Detail), Some(Action::ScrollDown));
        assert_eq!(lookup(&reg, 'q', Context::Detail), Some(Action::Quit));
        assert_eq!(
            reg.action_for_key(KeyCode::Char('d'), KeyModifiers::CONTROL, Context::Detail),
            Some(Action::PageDown)
        );
        assert_eq!(lookup(&reg, 'd', Context::Detail), Some(Action::Download));
    }

    #[test]
    fn test_search_does_not_fall_back() {
        let reg = KeybindingRegistry::new();
        assert_eq!(lookup(&reg, 'q', Context::Search), None);
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Search),
            Some(Action::CommitSearch)
        );
        assert_eq!(lookup(&reg, 'q', Context::Filters), None);
    }

    #[test]
    fn test_shifted_letters_match() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('F'), KeyModifiers::SHIFT, Context::Browse),
            Some(Action::ShowFavorites)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('?'), KeyModifiers::SHIFT, Context::Login),
            Some(Action::ShowHelp)
        );
    }

    #[test]
    fn test_context_specific_keys() {
        let reg = KeybindingRegistry::new();
        assert_eq!(lookup(&reg, 'x', Context::Favorites), Some(Action::RemoveFavorite));
        assert_eq!(lookup(&reg, 'x', Context::Browse), None);
        assert_eq!(lookup(&reg, 'b', Context::Login), Some(Action::BiometricLogin));
        assert_eq!(lookup(&reg, 'b', Context::Detail), Some(Action::Back));
    }

    #[test]
    fn test_apply_overrides_valid() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("quit".to_string(), "Ctrl+q".to_string())]);

        let warnings = reg.apply_overrides(&overrides);
        assert!(warnings.is_empty());

        assert_eq!(lookup(&reg, 'q', Context::Global), None);
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::CONTROL, Context::Browse),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_override_preserves_contexts() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("share".to_string(), "w".to_string())]);
        assert!(reg.apply_overrides(&overrides).is_empty());

        assert_eq!(lookup(&reg, 'w', Context::Detail), Some(Action::Share));
        assert_eq!(lookup(&reg, 'w', Context::Favorites), Some(Action::Share));
        assert_eq!(lookup(&reg, 'o', Context::Detail), None);
    }

    #[test]
    fn test_apply_overrides_warnings() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([
            ("nonexistent_action".to_string(), "q".to_string()),
            ("quit".to_string(), "Ctrl+Alt+Q".to_string()),
        ]);

        let mut warnings = reg.apply_overrides(&overrides);
        warnings.sort();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Cannot parse key"));
        assert!(warnings[1].contains("Unknown action"));
        assert_eq!(lookup(&reg, 'q', Context::Global), Some(Action::Quit));
    }

    #[test]
    fn test_parse_key_string() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("esc"), Some(KeySpec::plain(KeyCode::Esc)));
        assert_eq!(parse_key_string("space"), Some(KeySpec::ch(' ')));
        assert_eq!(parse_key_string("F12"), Some(KeySpec::plain(KeyCode::F(12))));
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("Ctrl+d"), Some(KeySpec::ctrl('d')));
        assert_eq!(parse_key_string("/"), Some(KeySpec::ch('/')));
        assert_eq!(parse_key_string("é"), Some(KeySpec::ch('é')));
        assert_eq!(parse_key_string("xyz"), None);
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::ch('q')), "q");
        assert_eq!(format_key(&KeySpec::ctrl('d')), "Ctrl+d");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Enter)), "Enter");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::F(5))), "F5");
    }

    #[test]
    fn test_all_bindings_cover_every_context() {
        let reg = KeybindingRegistry::new();
        let bindings = reg.all_bindings();
        for context in [
            Context::Global,
            Context::Login,
            Context::Browse,
            Context::Detail,
            Context::Favorites,
            Context::Search,
            Context::Filters,
        ] {
            assert!(bindings.iter().any(|(c, _, _)| *c == context), "{context:?}");
        }
    }
}
