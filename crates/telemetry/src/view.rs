use serde::Serialize;

/// Identifies one issued fetch. A completion may change a view only if no
/// newer fetch has already been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum ViewStatus {
    Loading,
    Ready,
    Error(String),
}

/// Per-view `{loading, error, data}` triple.
///
/// A failed fetch sets `error` but keeps whatever `data` the last
/// success left behind. `loading` stays set until the newest issued
/// fetch settles.
#[derive(Clone, Debug, Serialize)]
pub struct ViewState<T> {
    pub loading: bool,
    pub error: String,
    pub data: Option<T>,
    #[serde(skip)]
    issued: u64,
    #[serde(skip)]
    applied: u64,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            error: String::new(),
            data: None,
            issued: 0,
            applied: 0,
        }
    }
}

impl<T> ViewState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.loading = true;
        FetchTicket(self.issued)
    }

    /// False once a newer fetch has been applied.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 > self.applied
    }

    /// Returns false when a newer fetch already settled and nothing changed.
    pub fn apply(&mut self, ticket: FetchTicket, outcome: Result<T, String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.applied = ticket.0;
        self.loading = self.applied < self.issued;
        match outcome {
            Ok(data) => {
                self.data = Some(data);
                self.error.clear();
            }
            Err(message) => {
                self.error = message;
            }
        }
        true
    }

    /// Records an error found before any request was made. Outstanding
    /// fetches are superseded.
    pub fn fail_locally(&mut self, message: String) {
        self.issued += 1;
        self.applied = self.issued;
        self.loading = false;
        self.error = message;
    }

    /// Reflects the last settled outcome; `Loading` until anything settles.
    pub fn status(&self) -> ViewStatus {
        if !self.error.is_empty() {
            ViewStatus::Error(self.error.clone())
        } else if self.data.is_some() {
            ViewStatus::Ready
        } else {
            ViewStatus::Loading
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Checking,
    Connected,
    Disconnected,
}

/// Top-level API status badge, independent of the per-view states.
#[derive(Clone, Debug)]
pub struct ConnectivityBadge {
    state: Connectivity,
    issued: u64,
}

impl Default for ConnectivityBadge {
    fn default() -> Self {
        Self {
            state: Connectivity::Checking,
            issued: 0,
        }
    }
}

impl ConnectivityBadge {
    pub fn state(&self) -> Connectivity {
        self.state
    }

    pub fn begin_check(&mut self) -> FetchTicket {
        self.issued += 1;
        self.state = Connectivity::Checking;
        FetchTicket(self.issued)
    }

    pub fn settle(&mut self, ticket: FetchTicket, healthy: bool) -> bool {
        if ticket.0 != self.issued {
            return false;
        }
        self.state = if healthy {
            Connectivity::Connected
        } else {
            Connectivity::Disconnected
        };
        true
    }
}
