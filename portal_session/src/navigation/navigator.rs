use std::sync::Mutex;

/// Side effect of moving the user to another view.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, route: &str);
}

/// Navigator that only remembers where it was sent, for headless clients.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        match self.history.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<String> {
        self.history().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        tracing::debug!("Navigating to {}", route);
        match self.history.lock() {
            Ok(mut history) => history.push(route.to_string()),
            Err(poisoned) => poisoned.into_inner().push(route.to_string()),
        }
    }
}
