use ledger_app::{AppState, BadgeQueue};

#[derive(Clone)]
pub struct AppContext {
    pub app_state: AppState,
    pub badges: BadgeQueue,
}
