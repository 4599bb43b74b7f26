use serde_json::Value;

use crate::error::FetchError;
use crate::poller::{FetchControls, FetchData};
use crate::state::{FetchState, Phase};

/// What a renderer receives: the current state plus the controls to act
/// on it.
pub struct FetchView<'a, T = Value> {
    pub data: Option<&'a T>,
    pub loading: bool,
    pub error: Option<&'a FetchError>,
    pub controls: &'a FetchControls<T>,
    state: &'a FetchState<T>,
}

impl<'a, T> FetchView<'a, T> {
    pub(crate) fn new(
        state: &'a FetchState<T>,
        controls: &'a FetchControls<T>,
    ) -> Self {
        Self {
            data: state.data.as_ref(),
            loading: state.loading,
            error: state.error.as_ref(),
            controls,
            state,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Render based on fetch state with contextual loading/error messages.
    ///
    /// This handles the common pattern of:
    /// - No data + loading: "Loading {context}..."
    /// - No data + error: "Error loading {context}: ..."
    /// - Has data: call `render_fn` with (data, is_loading, error)
    ///
    /// `render_fn` receives the loading flag and error of a refetch so it can
    /// show them next to the previous data.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use fetcher::FetchView;
    /// # use serde_json::Value;
    /// fn posts_panel(view: &FetchView<'_, Vec<Value>>) -> String {
    ///     view.render("posts", |posts, is_loading, error| {
    ///         let mut out = format!("{} posts", posts.len());
    ///         if is_loading {
    ///             out.push_str(" (refreshing...)");
    ///         }
    ///         if let Some(e) = error {
    ///             out.push_str(&format!(" [{e}]"));
    ///         }
    ///         out
    ///     })
    /// }
    /// ```
    pub fn render<F>(&self, context: &str, render_fn: F) -> String
    where
        F: FnOnce(&T, bool, Option<&FetchError>) -> String,
    {
        match self.data {
            Some(data) => render_fn(data, self.loading, self.error),
            None if self.loading => format!("Loading {context}..."),
            None => match self.error {
                Some(error) => format!("Error loading {context}: {error}"),
                // not loading, no error, nothing fetched
                None => format!("No {context} found"),
            },
        }
    }
}

impl<T: FetchData> FetchView<'_, T> {
    pub fn refetch(&self) {
        self.controls.refetch();
    }

    pub fn update_data<F>(&self, f: F)
    where
        F: FnOnce(Option<T>) -> Option<T>,
    {
        self.controls.update_data(f);
    }

    pub fn set_data(&self, data: T) {
        self.controls.set_data(data);
    }
}
