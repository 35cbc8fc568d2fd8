//! The selector's state record and its transitions.

use onboard_types::SelectOption;

/// A query that left the debounce stage and must be sent to the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub generation: u64,
    pub query: String,
}

/// What happened to a service answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Accepted,
    /// A newer query was dispatched meanwhile; the answer was dropped.
    Stale { current: u64 },
}

/// What a renderer should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorView<'a> {
    Loading,
    Empty,
    Results(&'a [SelectOption]),
}

/// Query, generation counter, accepted options and selection of one selector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorState {
    query: String,
    /// Bumped on every dispatch, never decreases.
    generation: u64,
    pending_generation: Option<u64>,
    /// A query was typed and is waiting out the debounce window.
    scheduled: bool,
    options: Vec<SelectOption>,
    /// Selected option; the label is the one shown at selection time.
    selected: Option<SelectOption>,
    open: bool,
}

impl SelectorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_generation(&self) -> Option<u64> {
        self.pending_generation
    }

    /// Options from the most recently accepted answer.
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn is_loading(&self) -> bool {
        self.pending_generation.is_some()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Nothing is waiting on the timer or on the service.
    pub fn is_settled(&self) -> bool {
        !self.scheduled && !self.is_loading()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected_value(&self) -> Option<&str> {
        self.selected.as_ref().map(|o| o.value.as_str())
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.selected.as_ref().map(|o| o.label.as_str())
    }

    /// Record new query text. The caller restarts the debounce timer.
    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
        self.scheduled = true;
    }

    /// The debounce window expired: start a new generation for the current
    /// query.
    pub fn dispatch(&mut self) -> Dispatch {
        self.generation += 1;
        self.pending_generation = Some(self.generation);
        self.scheduled = false;
        Dispatch {
            generation: self.generation,
            query: self.query.clone(),
        }
    }

    /// Apply the service's answer for `generation`. Anything but the current
    /// generation leaves the state untouched.
    pub fn resolve(&mut self, generation: u64, options: Vec<SelectOption>) -> Resolution {
        if generation != self.generation {
            return Resolution::Stale {
                current: self.generation,
            };
        }
        self.options = options;
        self.pending_generation = None;
        Resolution::Accepted
    }

    /// Select `value`. It need not be among the current options; the label
    /// is taken from them when it is, and otherwise kept from an earlier
    /// selection of the same value.
    pub fn select(&mut self, value: &str) {
        let label = self
            .options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.clone())
            .or_else(|| {
                self.selected
                    .as_ref()
                    .filter(|o| o.value == value)
                    .map(|o| o.label.clone())
            })
            .unwrap_or_else(|| value.to_string());
        self.selected = Some(SelectOption::new(value, label));
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Show or hide the option list. Pending and in-flight queries are not
    /// affected.
    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub fn view(&self) -> SelectorView<'_> {
        if self.is_loading() {
            SelectorView::Loading
        } else if self.options.is_empty() {
            SelectorView::Empty
        } else {
            SelectorView::Results(&self.options)
        }
    }
}
