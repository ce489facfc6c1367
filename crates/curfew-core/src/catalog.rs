//! Static destination catalog

use curfew_api::DestinationView;
use curfew_host_api::LoadRequest;
use curfew_util::DestinationId;

/// Desktop browser user agent. Some destinations serve a reduced site to
/// embedded mobile browsers.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/105.0.0.0 Safari/537.36";

/// A whitelisted destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    pub id: &'static str,
    pub label: &'static str,
    pub address: &'static str,
    pub user_agent: Option<&'static str>,
}

impl Destination {
    pub fn destination_id(&self) -> DestinationId {
        DestinationId::new(self.id)
    }

    /// What the browser surface is asked to open
    pub fn load_request(&self) -> LoadRequest {
        LoadRequest::new(self.address).with_user_agent(self.user_agent)
    }

    pub fn to_view(&self) -> DestinationView {
        DestinationView {
            id: self.destination_id(),
            label: self.label.to_string(),
            address: self.address.to_string(),
        }
    }
}

static BUILTIN_DESTINATIONS: [Destination; 5] = [
    Destination {
        id: "instagram",
        label: "Instagram",
        address: "https://instagram.com",
        user_agent: None,
    },
    Destination {
        id: "youtube",
        label: "Youtube",
        address: "https://youtube.com.br",
        user_agent: None,
    },
    Destination {
        id: "linkedin",
        label: "Linkedin",
        address: "https://www.linkedin.com",
        user_agent: None,
    },
    Destination {
        id: "duolingo",
        label: "Duolingo",
        address: "https://www.duolingo.com",
        user_agent: Some(DESKTOP_USER_AGENT),
    },
    Destination {
        id: "fluency",
        label: "Fluency",
        address: "https://fluencyacademy.io",
        user_agent: None,
    },
];

/// Fixed, ordered set of destinations. Order is presentation order.
#[derive(Debug, Clone, Copy)]
pub struct DestinationCatalog {
    entries: &'static [Destination],
}

impl DestinationCatalog {
    pub fn builtin() -> Self {
        Self {
            entries: &BUILTIN_DESTINATIONS,
        }
    }

    pub fn list(&self) -> &'static [Destination] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &DestinationId) -> Option<&'static Destination> {
        self.entries.iter().find(|d| d.id == id.as_str())
    }

    /// Case-insensitive label lookup
    pub fn find_by_label(&self, label: &str) -> Option<&'static Destination> {
        let label = label.trim();
        self.entries
            .iter()
            .find(|d| d.label.eq_ignore_ascii_case(label))
    }

    /// Look up by id first, then by label
    pub fn resolve(&self, query: &str) -> Option<&'static Destination> {
        self.get(&DestinationId::new(query.trim()))
            .or_else(|| self.find_by_label(query))
    }

    pub fn views(&self) -> Vec<DestinationView> {
        self.entries.iter().map(Destination::to_view).collect()
    }
}

impl Default for DestinationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
