use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
};

use tracing::debug;

/// Target of every render call: replaces a container's contents wholesale.
pub trait DomRenderer: Send + Sync {
    /// Replaces the markup of `container_id`. Unknown containers are ignored.
    fn replace(&self, container_id: &str, markup: String);

    fn set_title(&self, _title: &str) {}
}

/// In-memory page made of named containers.
#[derive(Default)]
pub struct HtmlDocument {
    containers: Mutex<BTreeMap<String, String>>,
    title: Mutex<Option<String>>,
}

impl HtmlDocument {
    pub fn with_containers<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            containers: Mutex::new(
                ids.into_iter()
                    .map(|id| (id.into(), String::new()))
                    .collect(),
            ),
            title: Mutex::new(None),
        }
    }

    pub fn content(&self, container_id: &str) -> Option<String> {
        self.containers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(container_id)
            .cloned()
    }

    pub fn title(&self) -> Option<String> {
        self.title
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Concatenates every container as a `<section id=...>` block, in id order.
    pub fn to_html(&self) -> String {
        let containers = self
            .containers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut html = String::new();
        if let Some(title) = self.title() {
            html.push_str(&format!(
                "<title>{}</title>\n",
                html_escape::encode_text(&title)
            ));
        }
        for (id, markup) in containers.iter() {
            html.push_str(&format!("<section id=\"{id}\">{markup}</section>\n"));
        }
        html
    }
}

impl DomRenderer for HtmlDocument {
    fn replace(&self, container_id: &str, markup: String) {
        let mut containers = self
            .containers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match containers.get_mut(container_id) {
            Some(slot) => *slot = markup,
            None => debug!(container_id, "render target missing; skipped"),
        }
    }

    fn set_title(&self, title: &str) {
        *self.title.lock().unwrap_or_else(PoisonError::into_inner) = Some(title.to_string());
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
